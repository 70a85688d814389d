use chrono::Local;

use crate::config::Config;
use crate::state::SharedState;

pub async fn cmd_history(config: Config, limit: u64) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;
    let searches = state.search_service.recent_searches(limit).await?;

    if searches.is_empty() {
        println!("No search history.");
        return Ok(());
    }

    println!("Recent Searches (last {}):", searches.len());
    println!("{:-<70}", "");

    for search in searches {
        let location = search.location.as_deref().unwrap_or("anywhere");
        println!("• {} in {} [{}]", search.title, location, search.platform);
        println!(
            "  {} results | {}",
            search.results_count,
            search.searched_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}
