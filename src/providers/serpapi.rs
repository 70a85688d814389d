use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use super::{JobProvider, ProviderError};
use crate::clients::SerpApiClient;
use crate::clients::serpapi::GoogleJob;
use crate::config::PlatformConfig;
use crate::models::{Job, RawJob};
use crate::parser::normalize;

/// One job board served through the shared SerpApi Google Jobs feed.
///
/// Google Jobs mixes listings from every board, so only results whose
/// primary apply link points at this platform's domain are kept.
pub struct SerpApiProvider {
    platform: PlatformConfig,
    client: Arc<SerpApiClient>,
    max_results: usize,
}

impl SerpApiProvider {
    #[must_use]
    pub const fn new(
        platform: PlatformConfig,
        client: Arc<SerpApiClient>,
        max_results: usize,
    ) -> Self {
        Self {
            platform,
            client,
            max_results,
        }
    }

    #[must_use]
    pub fn accepts(&self, job: &GoogleJob) -> bool {
        let domain = self.platform.domain.to_lowercase();
        job.primary_apply_link()
            .is_some_and(|link| link.to_lowercase().contains(&domain))
    }

    /// Converts accepted upstream records into canonical jobs, capped at
    /// `max_results`.
    #[must_use]
    pub fn process(&self, results: Vec<GoogleJob>) -> Vec<Job> {
        let total = results.len();
        let jobs: Vec<Job> = results
            .into_iter()
            .filter(|job| self.accepts(job))
            .take(self.max_results)
            .map(|job| normalize(&self.platform.name, self.to_raw(job)))
            .collect();

        debug!(
            provider = %self.platform.name,
            upstream = total,
            kept = jobs.len(),
            "Filtered Google Jobs results"
        );
        jobs
    }

    fn to_raw(&self, job: GoogleJob) -> RawJob {
        let requirements = job.qualifications();
        let application_url = job.primary_apply_link().map(str::to_string);
        let ext = job.detected_extensions;

        RawJob {
            id: job.job_id,
            // Google Jobs rarely states seniority, the title usually does
            experience_level: ext.experience_level.or_else(|| job.title.clone()),
            title: job.title,
            company: job.company_name,
            location: job.location,
            job_type: ext.schedule_type.or(ext.job_type),
            salary: ext.salary,
            description: job.description,
            requirements,
            application_url,
            posted_date: ext.posted_at,
            tags: vec![self.platform.name.clone()],
            remote: ext.work_from_home,
        }
    }
}

#[async_trait]
impl JobProvider for SerpApiProvider {
    fn name(&self) -> &str {
        &self.platform.name
    }

    async fn fetch(&self, title: &str, location: &str) -> Result<Vec<Job>, ProviderError> {
        let results = self.client.search_jobs(title, location).await?;
        Ok(self.process(results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::serpapi::{ApplyOption, DetectedExtensions, parse_google_jobs};
    use crate::models::{ExperienceLevel, JobType};

    fn provider(max_results: usize) -> SerpApiProvider {
        let client = Arc::new(SerpApiClient::with_shared_client(
            reqwest::Client::new(),
            "https://serpapi.com/search.json",
            "key",
        ));
        SerpApiProvider::new(
            PlatformConfig::new("Indeed", "indeed.com", true),
            client,
            max_results,
        )
    }

    fn listing(title: &str, link: &str) -> GoogleJob {
        GoogleJob {
            title: Some(title.to_string()),
            company_name: Some("Initech".to_string()),
            apply_options: vec![ApplyOption {
                title: None,
                link: link.to_string(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_acceptance_filter_by_domain() {
        let provider = provider(50);

        assert!(provider.accepts(&listing("a", "https://www.Indeed.com/viewjob?jk=1")));
        assert!(!provider.accepts(&listing("b", "https://www.linkedin.com/jobs/view/2")));
        assert!(!provider.accepts(&GoogleJob::default()));
    }

    #[test]
    fn test_process_filters_and_caps() {
        let provider = provider(2);
        let results = vec![
            listing("One", "https://indeed.com/1"),
            listing("Other board", "https://glassdoor.com/2"),
            listing("Two", "https://indeed.com/3"),
            listing("Three", "https://indeed.com/4"),
        ];

        let jobs = provider.process(results);
        let titles: Vec<&str> = jobs.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, vec!["One", "Two"]);
        assert!(jobs.iter().all(|j| j.platform == "Indeed"));
        assert!(jobs.iter().all(|j| j.tags == vec!["Indeed"]));
    }

    #[test]
    fn test_process_maps_fields() {
        let body = r#"{
            "jobs_results": [{
                "job_id": "xyz",
                "title": "Senior Software Engineer",
                "company_name": "Globex",
                "location": "Anywhere",
                "description": "This role is fully remote.",
                "job_highlights": [{"title": "Qualifications", "items": ["Rust"]}],
                "detected_extensions": {
                    "schedule_type": "Permanent",
                    "salary": "$150K–$180K a year",
                    "posted_at": "2024-03-01"
                },
                "apply_options": [{"title": "Indeed", "link": "https://www.indeed.com/viewjob?jk=9"}]
            }]
        }"#;

        let jobs = provider(50).process(parse_google_jobs(body).unwrap());
        assert_eq!(jobs.len(), 1);

        let job = &jobs[0];
        assert_eq!(job.id, "xyz");
        assert_eq!(job.company, "Globex");
        assert_eq!(job.job_type, JobType::FullTime);
        assert_eq!(job.experience_level, ExperienceLevel::Senior);
        assert!(job.is_remote);
        assert_eq!(job.requirements, vec!["Rust"]);
        assert_eq!(job.application_url, "https://www.indeed.com/viewjob?jk=9");
        assert_eq!(job.posted_date.date_naive().to_string(), "2024-03-01");
        assert_eq!(job.salary_range.as_ref().map(|r| r.max), Some(180_000));
    }

    #[test]
    fn test_work_from_home_flag_marks_remote() {
        let mut flagged = listing("Analyst", "https://indeed.com/1");
        flagged.location = Some("Berlin".to_string());
        flagged.detected_extensions = DetectedExtensions {
            work_from_home: true,
            ..Default::default()
        };
        let mut office = listing("Analyst", "https://indeed.com/2");
        office.location = Some("Berlin".to_string());

        let jobs = provider(50).process(vec![flagged, office]);
        assert!(jobs[0].is_remote);
        assert!(!jobs[1].is_remote);
    }

    #[test]
    fn test_explicit_experience_beats_title() {
        let mut job = listing("Senior Analyst", "https://indeed.com/1");
        job.detected_extensions = DetectedExtensions {
            experience_level: Some("Entry level".to_string()),
            ..Default::default()
        };

        let jobs = provider(50).process(vec![job]);
        assert_eq!(jobs[0].experience_level, ExperienceLevel::Entry);
    }
}
