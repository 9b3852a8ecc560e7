//! Payment API client methods

use super::{ApiClient, ApiRequest, ClientError};
use crate::types::marketplace::{DepositRequest, WithdrawalRequest};
use crate::types::{BankAccount, NewBankAccount, Payment, PaymentFilter};
use serde_json::Value as JsonValue;

impl ApiClient {
    pub async fn list_payments(&self, filter: &PaymentFilter) -> Result<Vec<Payment>, ClientError> {
        let request = ApiRequest::get("/api/payments/").query_params(filter)?;
        self.execute(request).await
    }

    /// Add funds to the client's wallet
    pub async fn deposit(&self, amount: f64) -> Result<JsonValue, ClientError> {
        self.post("/api/payments/deposit/", &DepositRequest { amount })
            .await
    }

    /// Pay out to one of the freelancer's bank accounts
    pub async fn withdraw(&self, amount: f64, bank_account_id: i64) -> Result<JsonValue, ClientError> {
        self.post(
            "/api/payments/withdrawal/",
            &WithdrawalRequest {
                amount,
                bank_account_id,
            },
        )
        .await
    }

    pub async fn bank_accounts(&self) -> Result<Vec<BankAccount>, ClientError> {
        self.get("/api/payments/bank-accounts/").await
    }

    pub async fn add_bank_account(&self, account: &NewBankAccount) -> Result<BankAccount, ClientError> {
        self.post("/api/payments/bank-accounts/", account).await
    }

    pub async fn delete_bank_account(&self, account_id: i64) -> Result<(), ClientError> {
        self.delete(&format!("/api/payments/bank-accounts/{account_id}/"))
            .await
    }

    pub async fn set_default_bank_account(&self, account_id: i64) -> Result<(), ClientError> {
        self.send(ApiRequest::post(format!(
            "/api/payments/bank-accounts/{account_id}/set_default/"
        )))
        .await
        .map(|_| ())
    }
}
