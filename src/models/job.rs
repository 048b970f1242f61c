// src/models/job.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Kind of generation a tracked job produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobType {
    Quiz,
    Essay,
}

/// A generation request dispatched to the backend and awaiting completion.
///
/// `content_name` is captured at registration and never re-fetched.
/// `created_at` is the local registration time, not the backend's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedJob {
    pub job_id: String,
    pub project_id: i64,
    pub content_id: i64,
    pub content_name: String,
    pub job_type: JobType,
    pub created_at: DateTime<Utc>,
}

/// DTO for registering a job that was dispatched elsewhere.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewTrackedJob {
    #[validate(length(min = 1, max = 200))]
    pub job_id: String,
    pub project_id: i64,
    pub content_id: i64,
    #[validate(length(max = 500))]
    pub content_name: String,
    pub job_type: JobType,
}

impl NewTrackedJob {
    pub fn into_tracked(self) -> TrackedJob {
        TrackedJob {
            job_id: self.job_id,
            project_id: self.project_id,
            content_id: self.content_id,
            content_name: self.content_name,
            job_type: self.job_type,
            created_at: Utc::now(),
        }
    }
}

/// Status values reported by the backend. Anything unrecognised is non-terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
    #[serde(other)]
    Other,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// Payload of a finished job. Only one of the ids is set, depending on the job type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    pub quiz_id: Option<i64>,
    pub essay_id: Option<i64>,
    pub topic: Option<String>,
}

/// Response of `GET jobs/{job_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatusResponse {
    pub status: JobStatus,
    #[serde(default)]
    pub result: Option<JobResult>,
}

/// Response of a generation dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchResponse {
    #[serde(alias = "jobId")]
    pub job_id: String,
}

/// DTO for dispatching a quiz generation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GenerateQuizRequest {
    pub project_id: i64,
    pub content_id: i64,
    #[validate(length(max = 500))]
    pub content_name: String,
    #[validate(range(min = 1, max = 50))]
    pub num_questions: Option<u32>,
    #[validate(custom(function = validate_difficulty))]
    pub difficulty: Option<String>,
}

/// DTO for dispatching an essay Q&A generation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GenerateEssayRequest {
    pub project_id: i64,
    pub content_id: i64,
    #[validate(length(max = 500))]
    pub content_name: String,
    #[validate(range(min = 1, max = 20))]
    pub num_questions: Option<u32>,
}

/// Restricts difficulty to the levels the backend understands.
fn validate_difficulty(difficulty: &str) -> Result<(), validator::ValidationError> {
    match difficulty {
        "easy" | "medium" | "hard" => Ok(()),
        _ => Err(validator::ValidationError::new("invalid_difficulty")),
    }
}
