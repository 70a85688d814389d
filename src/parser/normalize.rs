//! Canonicalizes provider records into [`Job`].
//!
//! Everything here is pure and infallible: missing or unrecognized input
//! degrades to a default rather than rejecting the record.

use crate::models::{ExperienceLevel, Job, JobType, RawJob};
use crate::parser::salary::parse_salary;
use chrono::{DateTime, NaiveDate, Utc};

const DEFAULT_TITLE: &str = "Untitled position";
const DEFAULT_COMPANY: &str = "Unknown company";
const DEFAULT_PLATFORM: &str = "unknown";

/// Checked in order; the first group with a matching keyword wins.
const JOB_TYPE_KEYWORDS: &[(JobType, &[&str])] = &[
    (JobType::FullTime, &["full-time", "full time", "permanent"]),
    (JobType::PartTime, &["part-time", "part time"]),
    (JobType::Contract, &["contract", "contractor", "freelance"]),
    (JobType::Internship, &["intern", "internship"]),
];

const EXPERIENCE_KEYWORDS: &[(ExperienceLevel, &[&str])] = &[
    (
        ExperienceLevel::Senior,
        &["senior", "sr", "lead", "principal", "staff"],
    ),
    (
        ExperienceLevel::Entry,
        &["junior", "jr", "entry", "associate", "graduate"],
    ),
];

const REMOTE_KEYWORDS: &[&str] = &[
    "remote",
    "work from home",
    "wfh",
    "telecommute",
    "virtual",
];

#[must_use]
pub fn normalize(platform: &str, raw: RawJob) -> Job {
    let title = non_empty_or(raw.title.as_deref(), DEFAULT_TITLE);
    let company = non_empty_or(raw.company.as_deref(), DEFAULT_COMPANY);
    let platform = non_empty_or(Some(platform), DEFAULT_PLATFORM);

    let location = trimmed(raw.location.as_deref());
    let description = trimmed(raw.description.as_deref());
    let salary = trimmed(raw.salary.as_deref());
    let salary_range = parse_salary(&salary);
    let is_remote = raw.remote || is_remote_job(&location, &description);

    Job {
        id: trimmed(raw.id.as_deref()),
        title,
        company,
        location,
        platform,
        job_type: classify_job_type(raw.job_type.as_deref().unwrap_or_default()),
        experience_level: classify_experience(raw.experience_level.as_deref().unwrap_or_default()),
        salary,
        salary_range,
        description,
        requirements: clean_list(raw.requirements),
        application_url: trimmed(raw.application_url.as_deref()),
        posted_date: parse_posted_date(raw.posted_date.as_deref()),
        is_remote,
        tags: dedup_tags(raw.tags),
    }
}

#[must_use]
pub fn classify_job_type(raw: &str) -> JobType {
    let lower = raw.to_lowercase();
    JOB_TYPE_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map_or(JobType::FullTime, |(job_type, _)| *job_type)
}

#[must_use]
pub fn classify_experience(raw: &str) -> ExperienceLevel {
    let lower = raw.to_lowercase();
    EXPERIENCE_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map_or(ExperienceLevel::Mid, |(level, _)| *level)
}

#[must_use]
pub fn is_remote_job(location: &str, description: &str) -> bool {
    let combined = format!("{location} {description}").to_lowercase();
    REMOTE_KEYWORDS.iter().any(|k| combined.contains(k))
}

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates.
///
/// Relative strings such as "3 days ago" are not interpreted and fall back
/// to the current time.
#[must_use]
pub fn parse_posted_date(raw: Option<&str>) -> DateTime<Utc> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Utc::now();
    };

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return ts.with_timezone(&Utc);
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map_or_else(Utc::now, |dt| dt.and_utc())
}

fn trimmed(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

fn non_empty_or(value: Option<&str>, fallback: &str) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => fallback.to_string(),
    }
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    clean_list(tags)
        .into_iter()
        .filter(|t| seen.insert(t.to_lowercase()))
        .collect()
}
