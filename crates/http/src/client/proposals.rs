//! Proposal API client methods

use super::{ApiClient, ApiRequest, ClientError};
use crate::types::{NewProposal, Proposal, ProposalFilter};

impl ApiClient {
    /// Submit a proposal for a job (freelancers only)
    pub async fn submit_proposal(&self, proposal: &NewProposal) -> Result<Proposal, ClientError> {
        self.post(&format!("/api/proposals/job/{}/", proposal.job), proposal)
            .await
    }

    /// Proposals received for one of the client's jobs
    pub async fn job_proposals(&self, job_id: i64) -> Result<Vec<Proposal>, ClientError> {
        self.get(&format!("/api/proposals/job/{job_id}/")).await
    }

    /// Proposals sent by the signed-in freelancer
    pub async fn my_proposals(&self, filter: &ProposalFilter) -> Result<Vec<Proposal>, ClientError> {
        let request = ApiRequest::get("/api/proposals/my/").query_params(filter)?;
        self.execute(request).await
    }

    pub async fn get_proposal(&self, proposal_id: i64) -> Result<Proposal, ClientError> {
        self.get(&format!("/api/proposals/{proposal_id}/")).await
    }

    pub async fn accept_proposal(&self, proposal_id: i64) -> Result<(), ClientError> {
        self.proposal_action(proposal_id, "accept").await
    }

    pub async fn reject_proposal(&self, proposal_id: i64) -> Result<(), ClientError> {
        self.proposal_action(proposal_id, "reject").await
    }

    pub async fn withdraw_proposal(&self, proposal_id: i64) -> Result<(), ClientError> {
        self.proposal_action(proposal_id, "withdraw").await
    }

    async fn proposal_action(&self, proposal_id: i64, action: &str) -> Result<(), ClientError> {
        self.send(ApiRequest::post(format!(
            "/api/proposals/{proposal_id}/{action}/"
        )))
        .await
        .map(|_| ())
    }
}
