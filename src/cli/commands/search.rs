use crate::config::Config;
use crate::models::SearchQuery;
use crate::state::SharedState;

pub async fn cmd_search(
    config: Config,
    title: &str,
    location: Option<&str>,
    platform: &str,
) -> anyhow::Result<()> {
    let mut query = SearchQuery::new(title).with_platform(platform);
    if let Some(location) = location {
        query = query.with_location(location);
    }

    let state = SharedState::new(config).await?;

    println!("Searching for: {}", query.title());
    let jobs = state.search_service.search(&query).await?;

    if jobs.is_empty() {
        println!("No jobs found matching '{}'", query.title());
        return Ok(());
    }

    println!();
    println!("Found {} jobs:", jobs.len());
    println!("{:-<70}", "");

    for job in &jobs {
        let remote = if job.is_remote { " | remote" } else { "" };
        println!("[{}] {} @ {}", job.id, job.title, job.company);
        println!(
            "    {} | {} | {} | {}{}",
            job.platform, job.location, job.job_type, job.experience_level, remote
        );
        if !job.salary.is_empty() {
            println!("    Salary: {}", job.salary);
        }
        if !job.application_url.is_empty() {
            println!("    {}", job.application_url);
        }
        println!();
    }

    Ok(())
}
