//! Targeting rule entity: per-redirect device/geo overrides

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "targeting_rules")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub redirect_code: String,
    /// 插入顺序，匹配按此排序，首个命中生效
    pub position: i32,
    /// "device" | "geo"
    pub kind: String,
    pub match_key: String,
    #[sea_orm(column_type = "Text")]
    pub target_url: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
