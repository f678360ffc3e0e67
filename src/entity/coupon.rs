use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::policy;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "coupons")]
#[serde(rename_all = "camelCase")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  pub policy_id: i64,
  pub name: String,
  pub target: String,
  pub target_id: Option<i64>,
  pub deadline: DateTime,
  pub created_at: DateTime,
  pub is_active: bool,
  pub used_at: Option<DateTime>,
}

impl Model {
  pub fn is_used(&self) -> bool {
    self.used_at.is_some()
  }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "policy::Entity",
    from = "Column::PolicyId",
    to = "policy::Column::Id"
  )]
  Policy,
}

impl Related<policy::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Policy.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
