pub mod prelude;

pub mod job_cache;
pub mod search_history;
