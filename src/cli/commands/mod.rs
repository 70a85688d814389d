mod history;
mod search;

pub use history::cmd_history;
pub use search::cmd_search;
