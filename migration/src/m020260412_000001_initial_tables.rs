use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建 redirects 表
        manager
            .create_table(
                Table::create()
                    .table(Redirect::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Redirect::ShortCode)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Redirect::TargetUrl).text().null())
                    .col(ColumnDef::new(Redirect::Description).text().null())
                    .col(
                        ColumnDef::new(Redirect::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Redirect::OwnerId).string().not_null())
                    .col(
                        ColumnDef::new(Redirect::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Redirect::StartsAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Redirect::ExpiresAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Redirect::Password).string().null())
                    .col(ColumnDef::new(Redirect::OgTitle).string().null())
                    .col(ColumnDef::new(Redirect::OgDescription).text().null())
                    .col(ColumnDef::new(Redirect::OgImage).text().null())
                    .to_owned(),
            )
            .await?;

        // 创建 targeting_rules 表（随属主 redirect 级联删除）
        manager
            .create_table(
                Table::create()
                    .table(TargetingRule::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TargetingRule::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TargetingRule::RedirectCode)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TargetingRule::Position).integer().not_null())
                    .col(ColumnDef::new(TargetingRule::Kind).string().not_null())
                    .col(ColumnDef::new(TargetingRule::MatchKey).string().not_null())
                    .col(ColumnDef::new(TargetingRule::TargetUrl).text().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_targeting_rules_redirect")
                            .from(TargetingRule::Table, TargetingRule::RedirectCode)
                            .to(Redirect::Table, Redirect::ShortCode)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建 clicks 表（随属主 redirect 级联删除）
        manager
            .create_table(
                Table::create()
                    .table(Click::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Click::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Click::RedirectCode).string().not_null())
                    .col(
                        ColumnDef::new(Click::ClickedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Click::UserAgent).text().null())
                    .col(ColumnDef::new(Click::Browser).string().null())
                    .col(ColumnDef::new(Click::Os).string().null())
                    .col(ColumnDef::new(Click::Device).string().null())
                    .col(ColumnDef::new(Click::IpAddress).string().null())
                    .col(ColumnDef::new(Click::Referrer).text().null())
                    .col(ColumnDef::new(Click::Country).string().null())
                    .col(ColumnDef::new(Click::City).string().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_clicks_redirect")
                            .from(Click::Table, Click::RedirectCode)
                            .to(Redirect::Table, Redirect::ShortCode)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // owner 列表查询索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_redirects_owner_created")
                    .table(Redirect::Table)
                    .col(Redirect::OwnerId)
                    .col(Redirect::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // 规则按属主 + 顺序读取
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_targeting_rules_code_position")
                    .table(TargetingRule::Table)
                    .col(TargetingRule::RedirectCode)
                    .col(TargetingRule::Position)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_targeting_rules_code_position").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_redirects_owner_created").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Click::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(TargetingRule::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Redirect::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Redirect {
    #[sea_orm(iden = "redirects")]
    Table,
    ShortCode,
    TargetUrl,
    Description,
    Active,
    OwnerId,
    CreatedAt,
    StartsAt,
    ExpiresAt,
    Password,
    OgTitle,
    OgDescription,
    OgImage,
}

#[derive(DeriveIden)]
enum TargetingRule {
    #[sea_orm(iden = "targeting_rules")]
    Table,
    Id,
    RedirectCode,
    Position,
    Kind,
    MatchKey,
    TargetUrl,
}

#[derive(DeriveIden)]
enum Click {
    #[sea_orm(iden = "clicks")]
    Table,
    Id,
    RedirectCode,
    ClickedAt,
    UserAgent,
    Browser,
    Os,
    Device,
    IpAddress,
    Referrer,
    Country,
    City,
}
