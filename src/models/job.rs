use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobType {
    #[default]
    FullTime,
    PartTime,
    Contract,
    Internship,
}

impl JobType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FullTime => "full-time",
            Self::PartTime => "part-time",
            Self::Contract => "contract",
            Self::Internship => "internship",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Entry,
    #[default]
    Mid,
    Senior,
}

impl ExperienceLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Entry => "entry",
            Self::Mid => "mid",
            Self::Senior => "senior",
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SalaryPeriod {
    Hour,
    Day,
    Week,
    Month,
    #[default]
    Year,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: i64,
    pub max: i64,
    pub currency: String,
    pub period: SalaryPeriod,
}

/// Canonical job record produced by the normalizer.
///
/// `title`, `company` and `platform` are never empty, and the two
/// classifications are always one of their enum values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub platform: String,
    pub job_type: JobType,
    pub experience_level: ExperienceLevel,
    pub salary: String,
    pub salary_range: Option<SalaryRange>,
    pub description: String,
    pub requirements: Vec<String>,
    pub application_url: String,
    pub posted_date: DateTime<Utc>,
    pub is_remote: bool,
    pub tags: Vec<String>,
}

impl Job {
    /// Key used to drop cross-provider duplicates.
    #[must_use]
    pub fn dedup_key(&self) -> (String, String, String) {
        (
            self.title.trim().to_lowercase(),
            self.company.trim().to_lowercase(),
            self.application_url.trim().to_string(),
        )
    }
}

/// Provider-agnostic bag of fields handed to the normalizer.
///
/// Adapters fill whatever their upstream offers and leave the rest empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawJob {
    pub id: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub experience_level: Option<String>,
    pub salary: Option<String>,
    pub description: Option<String>,
    pub requirements: Vec<String>,
    pub application_url: Option<String>,
    pub posted_date: Option<String>,
    pub tags: Vec<String>,
    /// Upstream flags the job as remote regardless of its text.
    pub remote: bool,
}

impl From<&Job> for RawJob {
    fn from(job: &Job) -> Self {
        Self {
            id: Some(job.id.clone()),
            title: Some(job.title.clone()),
            company: Some(job.company.clone()),
            location: Some(job.location.clone()),
            job_type: Some(job.job_type.as_str().to_string()),
            experience_level: Some(job.experience_level.as_str().to_string()),
            salary: Some(job.salary.clone()),
            description: Some(job.description.clone()),
            requirements: job.requirements.clone(),
            application_url: Some(job.application_url.clone()),
            posted_date: Some(job.posted_date.to_rfc3339()),
            tags: job.tags.clone(),
            remote: job.is_remote,
        }
    }
}
