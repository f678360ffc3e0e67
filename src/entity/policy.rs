use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::coupon;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
  #[sea_orm(string_value = "percentage")]
  Percentage,
  #[sea_orm(string_value = "fixed")]
  Fixed,
}

/// Discount terms are never edited in place: an update soft-deletes the row
/// and inserts a new one, so coupons keep resolving the terms they were
/// issued under.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "coupon_policies")]
#[serde(rename_all = "camelCase")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  pub name: String,
  pub min_purchase_amount: i32,
  pub discount_type: DiscountType,
  pub discount_value: i32,
  pub max_discount_amount: Option<i32>,
  pub event_type: Option<String>,
  pub is_deleted: bool,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "coupon::Entity")]
  Coupons,
}

impl Related<coupon::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Coupons.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
