//! Query operations for SeaOrmStorage
//!
//! This module contains all read-only database operations.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use tracing::error;

use super::SeaOrmStorage;
use super::converters::model_to_redirect;
use super::retry;
use crate::errors::{Result, ShortgateError};
use crate::services::resolver::RedirectStore;
use crate::storage::models::{DashboardStats, Redirect, RedirectFilter};

use migration::entities::{click, redirect, targeting_rule};

impl SeaOrmStorage {
    /// 访客路径查找：按短码取记录 + 规则（按 position 升序）
    pub async fn find_by_code(&self, code: &str) -> Result<Option<Redirect>> {
        let db = self.get_db();
        let code_owned = code.to_string();

        let model = retry::with_retry(
            &format!("find_by_code({})", code),
            self.retry_config(),
            || async { redirect::Entity::find_by_id(&code_owned).one(db).await },
        )
        .await
        .map_err(ShortgateError::from)?;

        let Some(model) = model else {
            return Ok(None);
        };

        let rules = targeting_rule::Entity::find()
            .filter(targeting_rule::Column::RedirectCode.eq(code))
            .order_by_asc(targeting_rule::Column::Position)
            .all(db)
            .await?;

        Ok(Some(model_to_redirect(model, rules)))
    }

    /// 仪表盘查找：按短码 + owner 取记录，不属于该 owner 视为不存在
    pub async fn find_for_owner(&self, code: &str, owner_id: &str) -> Result<Option<Redirect>> {
        match self.find_by_code(code).await? {
            Some(link) if link.owner_id == owner_id => Ok(Some(link)),
            _ => Ok(None),
        }
    }

    /// owner 名下链接的分页列表（含每条的点击计数）
    ///
    /// 返回 (记录 + 点击数, 总条数)。
    pub async fn list_for_owner(
        &self,
        owner_id: &str,
        page: u64,
        page_size: u64,
        filter: RedirectFilter,
    ) -> Result<(Vec<(Redirect, u64)>, u64)> {
        let db = self.get_db();
        let now = Utc::now();

        let mut condition = Condition::all().add(redirect::Column::OwnerId.eq(owner_id));

        // search: 模糊匹配 code 或 target
        if let Some(ref search) = filter.search {
            condition = condition.add(
                Condition::any()
                    .add(redirect::Column::ShortCode.contains(search))
                    .add(redirect::Column::TargetUrl.contains(search)),
            );
        }

        if let Some(after) = filter.created_after {
            condition = condition.add(redirect::Column::CreatedAt.gte(after));
        }
        if let Some(before) = filter.created_before {
            condition = condition.add(redirect::Column::CreatedAt.lte(before));
        }

        // 过期状态过滤
        if filter.only_expired {
            condition = condition.add(redirect::Column::ExpiresAt.lt(now));
        }
        if filter.only_active {
            condition = condition.add(
                Condition::any()
                    .add(redirect::Column::ExpiresAt.is_null())
                    .add(redirect::Column::ExpiresAt.gte(now)),
            );
        }

        let paginator = redirect::Entity::find()
            .filter(condition)
            .order_by_desc(redirect::Column::CreatedAt)
            .paginate(db, page_size);

        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page.saturating_sub(1)).await?;

        let mut links = Vec::with_capacity(models.len());
        for model in models {
            let code = model.short_code.clone();
            let rules = targeting_rule::Entity::find()
                .filter(targeting_rule::Column::RedirectCode.eq(&code))
                .order_by_asc(targeting_rule::Column::Position)
                .all(db)
                .await?;
            let clicks = self.count_clicks(&code).await?;
            links.push((model_to_redirect(model, rules), clicks));
        }

        Ok((links, total))
    }

    /// 单链接点击计数
    pub async fn count_clicks(&self, code: &str) -> Result<u64> {
        let count = click::Entity::find()
            .filter(click::Column::RedirectCode.eq(code))
            .count(self.get_db())
            .await?;
        Ok(count)
    }

    /// owner 名下汇总统计
    pub async fn stats_for_owner(&self, owner_id: &str) -> Result<DashboardStats> {
        let db = self.get_db();
        let now = Utc::now();

        let total_links = redirect::Entity::find()
            .filter(redirect::Column::OwnerId.eq(owner_id))
            .count(db)
            .await?;

        let active_links = redirect::Entity::find()
            .filter(redirect::Column::OwnerId.eq(owner_id))
            .filter(redirect::Column::Active.eq(true))
            .filter(
                Condition::any()
                    .add(redirect::Column::ExpiresAt.is_null())
                    .add(redirect::Column::ExpiresAt.gte(now)),
            )
            .count(db)
            .await?;

        // owner 名下所有短码的点击总数
        let codes: Vec<String> = redirect::Entity::find()
            .filter(redirect::Column::OwnerId.eq(owner_id))
            .all(db)
            .await?
            .into_iter()
            .map(|m| m.short_code)
            .collect();

        let total_clicks = if codes.is_empty() {
            0
        } else {
            click::Entity::find()
                .filter(click::Column::RedirectCode.is_in(codes))
                .count(db)
                .await?
        };

        Ok(DashboardStats {
            total_links,
            total_clicks,
            active_links,
        })
    }
}

#[async_trait]
impl RedirectStore for SeaOrmStorage {
    async fn find_by_code(&self, code: &str) -> Result<Option<Redirect>> {
        match SeaOrmStorage::find_by_code(self, code).await {
            Ok(link) => Ok(link),
            Err(e) => {
                error!("Redirect lookup failed: {}", e);
                Err(e)
            }
        }
    }
}
