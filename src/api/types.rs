use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::SearchHistoryRecord;
use crate::models::{Job, SalaryRange};
use crate::services::ProviderStatus;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Wire shape of a job, as the web client expects it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDto {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub platform: String,
    #[serde(rename = "type")]
    pub job_type: String,
    pub experience_level: String,
    pub salary: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub salary_range: Option<SalaryRange>,
    pub description: String,
    pub requirements: Vec<String>,
    pub application_url: String,
    pub posted_date: String,
    pub is_remote: bool,
    pub tags: Vec<String>,
}

impl From<Job> for JobDto {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            title: job.title,
            company: job.company,
            location: job.location,
            platform: job.platform,
            job_type: job.job_type.as_str().to_string(),
            experience_level: job.experience_level.as_str().to_string(),
            salary: job.salary,
            salary_range: job.salary_range,
            description: job.description,
            requirements: job.requirements,
            application_url: job.application_url,
            posted_date: iso(job.posted_date),
            is_remote: job.is_remote,
            tags: job.tags,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHistoryDto {
    pub title: String,
    pub location: Option<String>,
    pub platform: String,
    pub results_count: usize,
    pub searched_at: String,
}

impl From<SearchHistoryRecord> for SearchHistoryDto {
    fn from(record: SearchHistoryRecord) -> Self {
        Self {
            title: record.title,
            location: record.location,
            platform: record.platform,
            results_count: record.results_count,
            searched_at: iso(record.searched_at),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformDto {
    pub name: String,
    pub domain: Option<String>,
    /// "active" or "coming_soon"
    pub status: String,
    pub requests: u64,
    pub errors: u64,
    pub jobs_returned: u64,
    pub last_success: Option<String>,
    pub last_error: Option<String>,
}

impl PlatformDto {
    #[must_use]
    pub fn new(name: &str, domain: Option<&str>, active: bool, status: &ProviderStatus) -> Self {
        Self {
            name: name.to_string(),
            domain: domain.map(str::to_string),
            status: if active { "active" } else { "coming_soon" }.to_string(),
            requests: status.requests,
            errors: status.errors,
            jobs_returned: status.jobs_returned,
            last_success: status.last_success.map(iso),
            last_error: status.last_error.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub database: Option<bool>,
}

fn iso(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
