//! Wire types for the marketplace REST API

pub mod auth;
pub mod marketplace;

pub use auth::{RegisterData, User, UserType};
pub use marketplace::{
    BankAccount, Category, ChatRoom, Job, JobAction, JobFilter, JobType, Message, NewBankAccount,
    NewJob, NewProposal, Notification, Page, Payment, PaymentFilter, Proposal, ProposalFilter,
    UnreadCount,
};
