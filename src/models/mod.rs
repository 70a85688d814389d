pub mod job;
pub mod query;

pub use job::{ExperienceLevel, Job, JobType, RawJob, SalaryPeriod, SalaryRange};
pub use query::{CacheKey, SearchQuery, ValidationError};
