//! Messaging API client methods

use super::{ApiClient, ClientError};
use crate::types::marketplace::SendMessageRequest;
use crate::types::{ChatRoom, Message};

impl ApiClient {
    pub async fn chat_rooms(&self) -> Result<Vec<ChatRoom>, ClientError> {
        self.get("/api/messages/rooms/").await
    }

    pub async fn chat_room(&self, room_id: i64) -> Result<ChatRoom, ClientError> {
        self.get(&format!("/api/messages/rooms/{room_id}/")).await
    }

    pub async fn room_messages(&self, room_id: i64) -> Result<Vec<Message>, ClientError> {
        self.get(&format!("/api/messages/rooms/{room_id}/messages/"))
            .await
    }

    pub async fn send_message(&self, room_id: i64, content: &str) -> Result<Message, ClientError> {
        self.post(
            &format!("/api/messages/rooms/{room_id}/messages/"),
            &SendMessageRequest {
                chat_room: room_id,
                content,
            },
        )
        .await
    }
}
