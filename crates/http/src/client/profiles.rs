//! Profile API client methods
//!
//! Profile documents differ per role and are passed through as JSON.

use super::{ApiClient, ClientError};
use crate::types::UserType;
use serde_json::Value as JsonValue;

impl ApiClient {
    pub async fn profile(&self, role: UserType) -> Result<JsonValue, ClientError> {
        self.get(&format!("/api/auth/{role}/profile/")).await
    }

    pub async fn update_profile(
        &self,
        role: UserType,
        profile: &JsonValue,
    ) -> Result<JsonValue, ClientError> {
        self.put(&format!("/api/auth/{role}/profile/"), profile)
            .await
    }

    /// Dashboard counters for the role
    pub async fn stats(&self, role: UserType) -> Result<JsonValue, ClientError> {
        self.get(&format!("/api/auth/{role}/stats/")).await
    }

    pub async fn add_portfolio_item(&self, item: &JsonValue) -> Result<JsonValue, ClientError> {
        self.post("/api/auth/portfolio/", item).await
    }

    pub async fn delete_portfolio_item(&self, item_id: i64) -> Result<(), ClientError> {
        self.delete(&format!("/api/auth/portfolio/{item_id}/"))
            .await
    }
}
