pub use super::job_cache::Entity as JobCache;
pub use super::search_history::Entity as SearchHistory;
