//! ClickSink implementation for SeaOrmStorage
//!
//! # Security Note
//!
//! All `code` values are validated via `utils::is_valid_short_code()`
//! as defense-in-depth before touching SQL.

use async_trait::async_trait;
use sea_orm::{ActiveValue::Set, EntityTrait};
use tracing::debug;

use super::SeaOrmStorage;
use super::retry;
use crate::analytics::{ClickRecord, ClickSink};
use crate::utils::is_valid_short_code;

use migration::entities::click;

#[async_trait]
impl ClickSink for SeaOrmStorage {
    async fn log_clicks_batch(&self, records: Vec<ClickRecord>) -> anyhow::Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        // 安全校验：确保所有短码格式合法
        for record in &records {
            if !is_valid_short_code(&record.code) {
                anyhow::bail!(
                    "Invalid short code format detected: '{}' - refusing to execute SQL",
                    record.code
                );
            }
        }

        let total_count = records.len();

        // 构建批量插入的 ActiveModel 列表
        let models: Vec<click::ActiveModel> = records
            .iter()
            .map(|record| click::ActiveModel {
                redirect_code: Set(record.code.clone()),
                clicked_at: Set(record.clicked_at),
                user_agent: Set(record.user_agent.clone()),
                browser: Set(record.browser.clone()),
                os: Set(record.os.clone()),
                device: Set(record.device.clone()),
                ip_address: Set(record.ip_address.clone()),
                referrer: Set(record.referrer.clone()),
                country: Set(record.country.clone()),
                city: Set(record.city.clone()),
                ..Default::default()
            })
            .collect();

        // 使用 insert_many 进行批量插入
        let db = self.get_db();
        retry::with_retry("log_clicks_batch", self.retry_config(), || async {
            click::Entity::insert_many(models.clone()).exec(db).await
        })
        .await
        .map_err(|e| anyhow::anyhow!("Failed to batch insert click logs: {}", e))?;

        debug!(
            "Click logs written to {} database ({} records)",
            self.backend_name().to_uppercase(),
            total_count
        );

        Ok(())
    }
}
