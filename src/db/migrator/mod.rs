use sea_orm_migration::prelude::*;

mod m20261012_create_job_cache;
mod m20261012_create_search_history;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261012_create_job_cache::Migration),
            Box::new(m20261012_create_search_history::Migration),
        ]
    }
}
