use sea_orm::sea_query::Expr;
use serde::Deserialize;

use crate::{
  entity::{coupon, policy},
  prelude::*,
};

const MAX_NAME_LEN: usize = 50;
const MAX_TARGET_LEN: usize = 20;

/// Upper bound for one issuing batch.
pub const MAX_BATCH: i64 = 10_000;

/// Template every coupon of an issuing batch is cloned from.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponRequest {
  #[serde(alias = "couponPolicyId")]
  pub policy_id: i64,
  #[serde(alias = "couponName")]
  pub name: String,
  #[serde(alias = "couponTarget")]
  pub target: String,
  #[serde(default, alias = "couponTargetId")]
  pub target_id: Option<i64>,
  #[serde(alias = "couponDeadline")]
  pub deadline: chrono::DateTime<Utc>,
}

impl CouponRequest {
  pub fn validate(&self, now: DateTime) -> Result<()> {
    let name = self.name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
      return Err(Error::invalid(format!(
        "Coupon name must be 1 to {MAX_NAME_LEN} characters"
      )));
    }

    let target = self.target.trim();
    if target.is_empty() || target.chars().count() > MAX_TARGET_LEN {
      return Err(Error::invalid(format!(
        "Coupon target must be 1 to {MAX_TARGET_LEN} characters"
      )));
    }

    if self.deadline.naive_utc() <= now {
      return Err(Error::invalid("Coupon deadline must be in the future"));
    }

    Ok(())
  }
}

pub struct Coupon<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Coupon<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Issues `count` identical coupons from one template. The batch is
  /// written in a single transaction.
  pub async fn create(
    &self,
    req: CouponRequest,
    count: i64,
  ) -> Result<Vec<coupon::Model>> {
    if count < 1 {
      return Err(Error::invalid("Coupon count must be at least 1"));
    }
    if count > MAX_BATCH {
      return Err(Error::invalid(format!(
        "Coupon count must be at most {MAX_BATCH}"
      )));
    }

    let now = now();
    req.validate(now)?;

    let txn = self.db.begin().await?;

    // deleted policies still back historical terms
    let policy = policy::Entity::find_by_id(req.policy_id)
      .one(&txn)
      .await?
      .ok_or_else(|| Error::invalid("Invalid coupon policy ID"))?;

    let mut coupons = Vec::with_capacity(count as usize);
    for _ in 0..count {
      let coupon = coupon::ActiveModel {
        id: NotSet,
        policy_id: Set(policy.id),
        name: Set(req.name.trim().to_string()),
        target: Set(req.target.trim().to_string()),
        target_id: Set(req.target_id),
        deadline: Set(req.deadline.naive_utc()),
        created_at: Set(now),
        is_active: Set(true),
        used_at: Set(None),
      };
      coupons.push(coupon.insert(&txn).await?);
    }

    txn.commit().await?;

    info!("Issued {count} coupon(s) under policy #{}", policy.id);
    Ok(coupons)
  }

  /// Marks a coupon as used. The write only applies to an active, unused
  /// row, so concurrent redemptions cannot both succeed.
  pub async fn redeem(&self, id: i64) -> Result<coupon::Model> {
    let result = coupon::Entity::update_many()
      .col_expr(coupon::Column::UsedAt, Expr::value(now()))
      .col_expr(coupon::Column::IsActive, Expr::value(false))
      .filter(coupon::Column::Id.eq(id))
      .filter(coupon::Column::UsedAt.is_null())
      .filter(coupon::Column::IsActive.eq(true))
      .exec(self.db)
      .await?;

    let coupon = self.by_id(id).await?;

    if result.rows_affected == 0 {
      let state = if coupon.is_used() {
        CouponState::AlreadyUsed
      } else {
        CouponState::Inactive
      };
      warn!("Rejected use of coupon #{id}: {state}");
      return Err(state.into());
    }

    info!("Coupon #{id} used");
    Ok(coupon)
  }

  pub async fn deactivate(&self, id: i64) -> Result<coupon::Model> {
    let result = coupon::Entity::update_many()
      .col_expr(coupon::Column::IsActive, Expr::value(false))
      .filter(coupon::Column::Id.eq(id))
      .filter(coupon::Column::IsActive.eq(true))
      .exec(self.db)
      .await?;

    let coupon = self.by_id(id).await?;

    if result.rows_affected == 0 {
      warn!("Rejected deactivation of coupon #{id}: already inactive");
      return Err(CouponState::Inactive.into());
    }

    info!("Coupon #{id} deactivated");
    Ok(coupon)
  }

  pub async fn by_id(&self, id: i64) -> Result<coupon::Model> {
    coupon::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or(Error::CouponNotFound(id))
  }

  pub async fn all(&self) -> Result<Vec<coupon::Model>> {
    Ok(
      coupon::Entity::find()
        .order_by_asc(coupon::Column::Id)
        .all(self.db)
        .await?,
    )
  }

  pub async fn by_ids(&self, ids: &[i64]) -> Result<Vec<coupon::Model>> {
    require_ids(ids)?;
    Ok(
      coupon::Entity::find()
        .filter(coupon::Column::Id.is_in(ids.iter().copied()))
        .order_by_asc(coupon::Column::Id)
        .all(self.db)
        .await?,
    )
  }

  pub async fn by_active(&self, active: bool) -> Result<Vec<coupon::Model>> {
    Ok(
      coupon::Entity::find()
        .filter(coupon::Column::IsActive.eq(active))
        .order_by_asc(coupon::Column::Id)
        .all(self.db)
        .await?,
    )
  }

  pub async fn by_ids_and_active(
    &self,
    ids: &[i64],
    active: bool,
  ) -> Result<Vec<coupon::Model>> {
    require_ids(ids)?;
    Ok(
      coupon::Entity::find()
        .filter(coupon::Column::Id.is_in(ids.iter().copied()))
        .filter(coupon::Column::IsActive.eq(active))
        .order_by_asc(coupon::Column::Id)
        .all(self.db)
        .await?,
    )
  }

  pub async fn used(&self) -> Result<Vec<coupon::Model>> {
    Ok(
      coupon::Entity::find()
        .filter(coupon::Column::UsedAt.is_not_null())
        .order_by_asc(coupon::Column::Id)
        .all(self.db)
        .await?,
    )
  }

  pub async fn used_by_ids(&self, ids: &[i64]) -> Result<Vec<coupon::Model>> {
    require_ids(ids)?;
    Ok(
      coupon::Entity::find()
        .filter(coupon::Column::Id.is_in(ids.iter().copied()))
        .filter(coupon::Column::UsedAt.is_not_null())
        .order_by_asc(coupon::Column::Id)
        .all(self.db)
        .await?,
    )
  }
}

fn require_ids(ids: &[i64]) -> Result<()> {
  if ids.is_empty() {
    return Err(Error::invalid("Coupon ID list cannot be empty"));
  }
  Ok(())
}

#[cfg(test)]
pub mod tests {
  use std::collections::HashSet;

  use chrono::Timelike;

  use super::*;
  use crate::sv::{self, policy::tests::request, test_utils::test_db};

  pub fn template(policy_id: i64) -> CouponRequest {
    let deadline =
      (Utc::now() + TimeDelta::hours(1)).with_nanosecond(0).unwrap();
    CouponRequest {
      policy_id,
      name: "Welcome 10%".to_string(),
      target: "USER".to_string(),
      target_id: Some(7),
      deadline,
    }
  }

  async fn issue(db: &DatabaseConnection, count: i64) -> Vec<coupon::Model> {
    let policy = sv::Policy::new(db).create(request("Ten off")).await.unwrap();
    Coupon::new(db).create(template(policy.id), count).await.unwrap()
  }

  #[tokio::test]
  async fn test_create_coupons() {
    let db = test_db::setup().await;

    let coupons = issue(&db, 3).await;

    assert_eq!(coupons.len(), 3);
    for coupon in &coupons {
      assert!(coupon.is_active);
      assert_eq!(coupon.used_at, None);
      assert_eq!(coupon.name, coupons[0].name);
      assert_eq!(coupon.target, coupons[0].target);
      assert_eq!(coupon.deadline, coupons[0].deadline);
    }

    let ids: HashSet<_> = coupons.iter().map(|c| c.id).collect();
    assert_eq!(ids.len(), 3);
  }

  #[tokio::test]
  async fn test_create_rejects_bad_count() {
    let db = test_db::setup().await;
    let policy = sv::Policy::new(&db).create(request("Ten off")).await.unwrap();
    let sv = Coupon::new(&db);

    for count in [0, -1, MAX_BATCH + 1] {
      assert!(matches!(
        sv.create(template(policy.id), count).await,
        Err(Error::InvalidRequest(_))
      ));
    }

    assert!(sv.all().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_create_requires_policy() {
    let db = test_db::setup().await;

    let result = Coupon::new(&db).create(template(999), 1).await;

    assert!(matches!(result, Err(Error::InvalidRequest(_))));
  }

  #[tokio::test]
  async fn test_create_from_deleted_policy() {
    let db = test_db::setup().await;
    let policies = sv::Policy::new(&db);

    let policy = policies.create(request("Retired")).await.unwrap();
    policies.delete(policy.id).await.unwrap();

    let coupons =
      Coupon::new(&db).create(template(policy.id), 1).await.unwrap();
    assert_eq!(coupons[0].policy_id, policy.id);
  }

  #[tokio::test]
  async fn test_create_rejects_past_deadline() {
    let db = test_db::setup().await;
    let policy = sv::Policy::new(&db).create(request("Ten off")).await.unwrap();

    let req = CouponRequest {
      deadline: Utc::now() - TimeDelta::minutes(1),
      ..template(policy.id)
    };

    assert!(matches!(
      Coupon::new(&db).create(req, 1).await,
      Err(Error::InvalidRequest(_))
    ));
  }

  #[tokio::test]
  async fn test_deadline_round_trip() {
    let db = test_db::setup().await;
    let policy = sv::Policy::new(&db).create(request("Ten off")).await.unwrap();
    let req = template(policy.id);
    let deadline = req.deadline.naive_utc();

    let created = Coupon::new(&db).create(req, 1).await.unwrap();
    let fetched = Coupon::new(&db).by_id(created[0].id).await.unwrap();

    assert_eq!(fetched.deadline, deadline);
  }

  #[tokio::test]
  async fn test_use_coupon_once() {
    let db = test_db::setup().await;
    let sv = Coupon::new(&db);
    let coupon = issue(&db, 1).await.remove(0);

    let used = sv.redeem(coupon.id).await.unwrap();
    assert!(used.used_at.is_some());
    assert!(!used.is_active);

    assert!(matches!(
      sv.redeem(coupon.id).await,
      Err(Error::Coupon(CouponState::AlreadyUsed))
    ));
    assert_eq!(sv.by_id(coupon.id).await.unwrap().used_at, used.used_at);
  }

  #[tokio::test]
  async fn test_use_missing_coupon() {
    let db = test_db::setup().await;

    assert!(matches!(
      Coupon::new(&db).redeem(1).await,
      Err(Error::CouponNotFound(1))
    ));
  }

  #[tokio::test]
  async fn test_deactivate_coupon_once() {
    let db = test_db::setup().await;
    let sv = Coupon::new(&db);
    let coupon = issue(&db, 1).await.remove(0);

    let inactive = sv.deactivate(coupon.id).await.unwrap();
    assert!(!inactive.is_active);
    assert_eq!(inactive.used_at, None);

    assert!(matches!(
      sv.deactivate(coupon.id).await,
      Err(Error::Coupon(CouponState::Inactive))
    ));
    // a deactivated coupon can no longer be used
    assert!(matches!(
      sv.redeem(coupon.id).await,
      Err(Error::Coupon(CouponState::Inactive))
    ));
  }

  #[tokio::test]
  async fn test_lookups() {
    let db = test_db::setup().await;
    let sv = Coupon::new(&db);
    let coupons = issue(&db, 3).await;
    let ids: Vec<_> = coupons.iter().map(|c| c.id).collect();

    sv.redeem(ids[0]).await.unwrap();
    sv.deactivate(ids[1]).await.unwrap();

    assert_eq!(sv.all().await.unwrap().len(), 3);
    assert_eq!(sv.by_ids(&ids[..2]).await.unwrap().len(), 2);
    assert_eq!(sv.by_active(true).await.unwrap()[0].id, ids[2]);
    assert_eq!(sv.by_active(false).await.unwrap().len(), 2);
    assert_eq!(sv.by_ids_and_active(&ids, false).await.unwrap().len(), 2);
    assert_eq!(sv.used().await.unwrap()[0].id, ids[0]);
    assert!(sv.used_by_ids(&ids[1..]).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_empty_id_list_is_rejected() {
    let db = test_db::setup().await;
    let sv = Coupon::new(&db);

    assert!(matches!(sv.by_ids(&[]).await, Err(Error::InvalidRequest(_))));
    assert!(matches!(
      sv.by_ids_and_active(&[], true).await,
      Err(Error::InvalidRequest(_))
    ));
    assert!(matches!(
      sv.used_by_ids(&[]).await,
      Err(Error::InvalidRequest(_))
    ));
  }
}
