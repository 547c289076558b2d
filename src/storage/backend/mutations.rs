//! Mutation operations for SeaOrmStorage
//!
//! This module contains all write database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, TransactionTrait,
};
use tracing::info;

use super::SeaOrmStorage;
use super::converters::{redirect_to_active_model, rule_to_active_model};
use crate::errors::{Result, ShortgateError};
use crate::storage::models::Redirect;

use migration::entities::{click, redirect, targeting_rule};

impl SeaOrmStorage {
    /// 创建链接（连同规则，单事务）
    ///
    /// 短码已存在 → Conflict。
    pub async fn create(&self, link: Redirect) -> Result<()> {
        let existing = redirect::Entity::find_by_id(&link.short_code)
            .one(self.get_db())
            .await?;
        if existing.is_some() {
            return Err(ShortgateError::conflict(format!(
                "Short code '{}' already exists",
                link.short_code
            )));
        }

        let txn = self.get_db().begin().await?;

        redirect_to_active_model(&link, true).insert(&txn).await?;

        for (position, rule) in link.rules.iter().enumerate() {
            rule_to_active_model(&link.short_code, position as i32, rule)
                .insert(&txn)
                .await?;
        }

        txn.commit().await?;
        info!("Redirect created: {}", link.short_code);
        Ok(())
    }

    /// 更新 owner 名下的链接，规则整体替换（单事务）
    pub async fn update(&self, link: Redirect, owner_id: &str) -> Result<()> {
        let existing = self.find_for_owner(&link.short_code, owner_id).await?;
        if existing.is_none() {
            return Err(ShortgateError::not_found(format!(
                "Redirect '{}' not found",
                link.short_code
            )));
        }

        let txn = self.get_db().begin().await?;

        redirect_to_active_model(&link, false).update(&txn).await?;

        // 规则没有独立身份，整体替换
        targeting_rule::Entity::delete_many()
            .filter(targeting_rule::Column::RedirectCode.eq(&link.short_code))
            .exec(&txn)
            .await?;
        for (position, rule) in link.rules.iter().enumerate() {
            rule_to_active_model(&link.short_code, position as i32, rule)
                .insert(&txn)
                .await?;
        }

        txn.commit().await?;
        info!("Redirect updated: {}", link.short_code);
        Ok(())
    }

    /// 删除 owner 名下的链接，级联点击与规则（单事务，不可逆）
    pub async fn delete(&self, code: &str, owner_id: &str) -> Result<()> {
        let existing = self.find_for_owner(code, owner_id).await?;
        if existing.is_none() {
            return Err(ShortgateError::not_found(format!(
                "Redirect '{}' not found",
                code
            )));
        }

        let txn = self.get_db().begin().await?;

        // 显式删除子表，不依赖各后端的 FK 行为
        click::Entity::delete_many()
            .filter(click::Column::RedirectCode.eq(code))
            .exec(&txn)
            .await?;
        targeting_rule::Entity::delete_many()
            .filter(targeting_rule::Column::RedirectCode.eq(code))
            .exec(&txn)
            .await?;
        redirect::Entity::delete_by_id(code).exec(&txn).await?;

        txn.commit().await?;
        info!("Redirect deleted: {}", code);
        Ok(())
    }
}
