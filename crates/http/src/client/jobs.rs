//! Job API client methods

use super::{ApiClient, ApiRequest, ClientError};
use crate::types::{Category, Job, JobAction, JobFilter, NewJob, Page};

impl ApiClient {
    /// Search jobs
    pub async fn list_jobs(&self, filter: &JobFilter) -> Result<Page<Job>, ClientError> {
        let request = ApiRequest::get("/api/jobs/").query_params(filter)?;
        self.execute(request).await
    }

    /// Get a single job
    pub async fn get_job(&self, job_id: i64) -> Result<Job, ClientError> {
        self.get(&format!("/api/jobs/{job_id}/")).await
    }

    /// Post a new job (clients only)
    pub async fn create_job(&self, job: &NewJob) -> Result<Job, ClientError> {
        self.post("/api/jobs/", job).await
    }

    /// List job categories
    pub async fn job_categories(&self) -> Result<Vec<Category>, ClientError> {
        self.get("/api/jobs/categories/").await
    }

    /// Move a job through its lifecycle
    pub async fn job_action(&self, job_id: i64, action: JobAction) -> Result<(), ClientError> {
        self.send(ApiRequest::post(format!("/api/jobs/{job_id}/{action}/")))
            .await
            .map(|_| ())
    }
}
