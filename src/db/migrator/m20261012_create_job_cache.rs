use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(JobCache::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(JobCache::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(JobCache::CacheKey).string().not_null())
                    .col(ColumnDef::new(JobCache::SearchParams).text().not_null())
                    .col(ColumnDef::new(JobCache::ResultsJson).text().not_null())
                    .col(ColumnDef::new(JobCache::CreatedAt).string().not_null())
                    .col(ColumnDef::new(JobCache::ExpiresAt).string().not_null())
                    .col(
                        ColumnDef::new(JobCache::HitCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_job_cache_key_unique")
                    .table(JobCache::Table)
                    .col(JobCache::CacheKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_job_cache_expires_at")
                    .table(JobCache::Table)
                    .col(JobCache::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(JobCache::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum JobCache {
    Table,
    Id,
    CacheKey,
    SearchParams,
    ResultsJson,
    CreatedAt,
    ExpiresAt,
    HitCount,
}
