pub mod aggregator;
pub use aggregator::{AggregateError, Aggregation, Aggregator, ProviderOutcome};

pub mod provider_status;
pub use provider_status::{ProviderStatus, ProviderStatusTracker};

pub mod search;
pub use search::{SearchError, SearchService};
