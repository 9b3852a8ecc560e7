//! Marketplace resources: jobs, proposals, payments, messages, notifications

use super::auth::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Paginated list envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobType {
    Fixed,
    Hourly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub client: User,
    pub category: i64,
    #[serde(default)]
    pub category_name: String,
    #[serde(default)]
    pub skills_required: Vec<String>,
    /// Decimal amount as rendered by the API
    pub budget: String,
    pub job_type: JobType,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub total_proposals: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// Job search filters; unset fields are left out of the query string
#[derive(Debug, Clone, Default, Serialize)]
pub struct JobFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_budget: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_budget: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_type: Option<JobType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordering: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewJob {
    pub title: String,
    pub description: String,
    pub category: i64,
    pub skills_required: Vec<String>,
    pub budget: f64,
    pub job_type: JobType,
}

/// Lifecycle transitions a client can apply to its own job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobAction {
    MarkInProgress,
    MarkCompleted,
    Cancel,
}

impl JobAction {
    pub const fn as_path_segment(self) -> &'static str {
        match self {
            Self::MarkInProgress => "mark_in_progress",
            Self::MarkCompleted => "mark_completed",
            Self::Cancel => "cancel",
        }
    }
}

impl fmt::Display for JobAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_path_segment())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    pub id: i64,
    pub job: i64,
    #[serde(default)]
    pub job_details: Option<Job>,
    pub freelancer: i64,
    #[serde(default)]
    pub freelancer_details: Option<User>,
    pub cover_letter: String,
    pub bid_amount: String,
    /// Estimated delivery time in days
    pub estimated_time: u32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewProposal {
    pub job: i64,
    pub cover_letter: String,
    pub bid_amount: f64,
    pub estimated_time: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProposalFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordering: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    #[serde(default)]
    pub sender: Option<i64>,
    #[serde(default)]
    pub sender_details: Option<User>,
    #[serde(default)]
    pub recipient: Option<i64>,
    #[serde(default)]
    pub recipient_details: Option<User>,
    #[serde(default)]
    pub job: Option<i64>,
    #[serde(default)]
    pub job_details: Option<Job>,
    pub amount: String,
    pub payment_type: String,
    pub status: String,
    #[serde(default)]
    pub stripe_payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PaymentFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordering: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DepositRequest {
    pub amount: f64,
}

#[derive(Debug, Serialize)]
pub struct WithdrawalRequest {
    pub amount: f64,
    pub bank_account_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankAccount {
    pub id: i64,
    pub user: i64,
    pub account_holder_name: String,
    pub account_number: String,
    pub routing_number: String,
    pub bank_name: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewBankAccount {
    pub account_holder_name: String,
    pub account_number: String,
    pub routing_number: String,
    pub bank_name: String,
    pub is_default: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagePreview {
    pub id: i64,
    pub content: String,
    pub sender: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRoom {
    pub id: i64,
    pub job: i64,
    #[serde(default)]
    pub job_details: Option<Job>,
    #[serde(default)]
    pub participants: Vec<i64>,
    #[serde(default)]
    pub participants_details: Vec<User>,
    #[serde(default)]
    pub last_message: Option<MessagePreview>,
    #[serde(default)]
    pub unread_count: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub chat_room: i64,
    pub sender: i64,
    #[serde(default)]
    pub sender_details: Option<User>,
    pub content: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SendMessageRequest<'a> {
    pub chat_room: i64,
    pub content: &'a str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub recipient: i64,
    #[serde(default)]
    pub sender: Option<i64>,
    #[serde(default)]
    pub sender_details: Option<User>,
    pub notification_type: String,
    pub content: String,
    pub is_read: bool,
    #[serde(default)]
    pub related_job: Option<i64>,
    #[serde(default)]
    pub job_details: Option<Job>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UnreadCount {
    pub unread_count: u64,
}
