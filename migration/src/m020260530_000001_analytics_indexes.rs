//! Analytics 查询索引
//!
//! clicks 表按链接 + 时间范围聚合，补充复合索引。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_clicks_code_clicked_at")
                    .table(Click::Table)
                    .col(Click::RedirectCode)
                    .col(Click::ClickedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_clicks_country")
                    .table(Click::Table)
                    .col(Click::Country)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_clicks_country").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_clicks_code_clicked_at").to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Click {
    #[sea_orm(iden = "clicks")]
    Table,
    RedirectCode,
    ClickedAt,
    Country,
}
