//! Analytics API 端点
//!
//! 单链接点击数据读取：原始点击行（近 100 条）加上按日趋势与
//! 浏览器 / 系统 / 设备 / 国家 / 来源的分布，仪表盘据此画图。

use actix_web::http::StatusCode;
use actix_web::{Responder, Result as ActixResult, web};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::error;
use ts_rs::TS;

use crate::api::middleware::OwnerId;
use crate::storage::SeaOrmStorage;

use migration::entities::click;

use super::error_code::ErrorCode;
use super::helpers::{error_response, success_response};
use super::types::TS_EXPORT_PATH;

/// 原始点击行数限制（最近 N 条）
const RECENT_CLICKS_LIMIT: usize = 100;

/// 单条点击行
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct ClickRow {
    pub clicked_at: String,
    pub browser: Option<String>,
    pub os: Option<String>,
    pub device: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub referrer: Option<String>,
}

/// 按日点击数
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct DailyCount {
    /// YYYY-MM-DD
    pub date: String,
    pub count: u64,
}

/// 维度分布条目
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct BreakdownEntry {
    pub key: String,
    pub count: u64,
}

/// 单链接分析响应
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct AnalyticsResponse {
    pub code: String,
    pub total_clicks: u64,
    /// 最近的点击行（按时间倒序，最多 100 条）
    pub recent_clicks: Vec<ClickRow>,
    /// 按日趋势（升序）
    pub daily: Vec<DailyCount>,
    pub browsers: Vec<BreakdownEntry>,
    pub operating_systems: Vec<BreakdownEntry>,
    pub devices: Vec<BreakdownEntry>,
    pub countries: Vec<BreakdownEntry>,
    pub referrers: Vec<BreakdownEntry>,
}

fn breakdown(counter: BTreeMap<String, u64>) -> Vec<BreakdownEntry> {
    let mut entries: Vec<BreakdownEntry> = counter
        .into_iter()
        .map(|(key, count)| BreakdownEntry { key, count })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    entries
}

/// 获取单链接分析数据
pub async fn get_redirect_analytics(
    owner: OwnerId,
    code: web::Path<String>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> ActixResult<impl Responder> {
    // 先验证归属，不属于该 owner 一律 404
    match storage.find_for_owner(&code, &owner.0).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(error_response(
                StatusCode::NOT_FOUND,
                ErrorCode::LinkNotFound,
                "Redirect not found",
            ));
        }
        Err(e) => {
            error!("Analytics: ownership check failed: {}", e);
            return Ok(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::AnalyticsQueryFailed,
                "Analytics query failed",
            ));
        }
    }

    // 点击全量按时间升序取出，在内存聚合
    let clicks = match click::Entity::find()
        .filter(click::Column::RedirectCode.eq(code.as_str()))
        .order_by_asc(click::Column::ClickedAt)
        .all(storage.get_db())
        .await
    {
        Ok(clicks) => clicks,
        Err(e) => {
            error!("Analytics: click query failed: {}", e);
            return Ok(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::AnalyticsQueryFailed,
                "Analytics query failed",
            ));
        }
    };

    let total_clicks = clicks.len() as u64;

    let mut daily: BTreeMap<String, u64> = BTreeMap::new();
    let mut browsers: BTreeMap<String, u64> = BTreeMap::new();
    let mut operating_systems: BTreeMap<String, u64> = BTreeMap::new();
    let mut devices: BTreeMap<String, u64> = BTreeMap::new();
    let mut countries: BTreeMap<String, u64> = BTreeMap::new();
    let mut referrers: BTreeMap<String, u64> = BTreeMap::new();

    for c in &clicks {
        *daily
            .entry(c.clicked_at.format("%Y-%m-%d").to_string())
            .or_insert(0) += 1;
        *browsers
            .entry(c.browser.clone().unwrap_or_else(|| "Unknown".to_string()))
            .or_insert(0) += 1;
        *operating_systems
            .entry(c.os.clone().unwrap_or_else(|| "Unknown".to_string()))
            .or_insert(0) += 1;
        *devices
            .entry(c.device.clone().unwrap_or_else(|| "Unknown".to_string()))
            .or_insert(0) += 1;
        *countries
            .entry(c.country.clone().unwrap_or_else(|| "Unknown".to_string()))
            .or_insert(0) += 1;
        *referrers
            .entry(c.referrer.clone().unwrap_or_else(|| "direct".to_string()))
            .or_insert(0) += 1;
    }

    let recent_clicks: Vec<ClickRow> = clicks
        .iter()
        .rev()
        .take(RECENT_CLICKS_LIMIT)
        .map(|c| ClickRow {
            clicked_at: c.clicked_at.to_rfc3339(),
            browser: c.browser.clone(),
            os: c.os.clone(),
            device: c.device.clone(),
            country: c.country.clone(),
            city: c.city.clone(),
            referrer: c.referrer.clone(),
        })
        .collect();

    let daily: Vec<DailyCount> = daily
        .into_iter()
        .map(|(date, count)| DailyCount { date, count })
        .collect();

    Ok(success_response(AnalyticsResponse {
        code: code.into_inner(),
        total_clicks,
        recent_clicks,
        daily,
        browsers: breakdown(browsers),
        operating_systems: breakdown(operating_systems),
        devices: breakdown(devices),
        countries: breakdown(countries),
        referrers: breakdown(referrers),
    }))
}
