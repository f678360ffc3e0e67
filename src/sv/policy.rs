use serde::Deserialize;

use crate::{
  entity::{DiscountType, policy},
  prelude::*,
};

const MAX_NAME_LEN: usize = 50;
const MAX_EVENT_LEN: usize = 20;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRequest {
  #[serde(alias = "couponPolicyName")]
  pub name: String,
  #[serde(alias = "minPurchase")]
  pub min_purchase_amount: i32,
  pub discount_type: DiscountType,
  pub discount_value: i32,
  #[serde(default, alias = "maxDiscount")]
  pub max_discount_amount: Option<i32>,
  #[serde(default)]
  pub event_type: Option<String>,
}

impl PolicyRequest {
  pub fn validate(&self) -> Result<()> {
    let name = self.name.trim();
    if name.is_empty() {
      return Err(Error::invalid("Policy name must not be blank"));
    }
    if name.chars().count() > MAX_NAME_LEN {
      return Err(Error::invalid(format!(
        "Policy name must be at most {MAX_NAME_LEN} characters"
      )));
    }

    if self.min_purchase_amount < 0 {
      return Err(Error::invalid("Minimum purchase amount must not be negative"));
    }
    if self.discount_value < 0 {
      return Err(Error::invalid("Discount value must not be negative"));
    }
    if self.discount_type == DiscountType::Percentage
      && self.discount_value > 100
    {
      return Err(Error::invalid("Percentage discount must not exceed 100"));
    }
    if self.max_discount_amount.is_some_and(|max| max < 0) {
      return Err(Error::invalid("Maximum discount amount must not be negative"));
    }

    if let Some(event) = self.event_type()
      && event.chars().count() > MAX_EVENT_LEN
    {
      return Err(Error::invalid(format!(
        "Event type must be at most {MAX_EVENT_LEN} characters"
      )));
    }

    Ok(())
  }

  /// Blank event types are treated as absent.
  pub fn event_type(&self) -> Option<&str> {
    self.event_type.as_deref().map(str::trim).filter(|e| !e.is_empty())
  }
}

pub struct Policy<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Policy<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn create(&self, req: PolicyRequest) -> Result<policy::Model> {
    req.validate()?;

    let txn = self.db.begin().await?;
    let policy = insert(&txn, &req).await?;
    txn.commit().await?;

    info!("Created coupon policy #{} `{}`", policy.id, policy.name);
    Ok(policy)
  }

  /// Supersedes a live policy: the old row is soft-deleted and a new row
  /// carrying the requested terms is returned.
  pub async fn update(
    &self,
    id: i64,
    req: PolicyRequest,
  ) -> Result<policy::Model> {
    req.validate()?;

    let txn = self.db.begin().await?;

    let old = live(&txn, id).await?.ok_or(Error::PolicyNotFound(id))?;

    policy::ActiveModel { is_deleted: Set(true), ..old.into() }
      .update(&txn)
      .await?;

    let policy = insert(&txn, &req).await?;

    txn.commit().await?;

    info!("Coupon policy #{id} superseded by #{}", policy.id);
    Ok(policy)
  }

  pub async fn delete(&self, id: i64) -> Result<()> {
    let policy = live(self.db, id).await?.ok_or(Error::PolicyNotFound(id))?;

    policy::ActiveModel { is_deleted: Set(true), ..policy.into() }
      .update(self.db)
      .await?;

    info!("Deleted coupon policy #{id}");
    Ok(())
  }

  pub async fn by_id(&self, id: i64) -> Result<policy::Model> {
    live(self.db, id).await?.ok_or(Error::PolicyNotFound(id))
  }

  pub async fn all(&self, deleted: bool) -> Result<Vec<policy::Model>> {
    Ok(
      policy::Entity::find()
        .filter(policy::Column::IsDeleted.eq(deleted))
        .order_by_asc(policy::Column::Id)
        .all(self.db)
        .await?,
    )
  }

  pub async fn by_event_type(&self, event: &str) -> Result<policy::Model> {
    live_by_event(self.db, event)
      .await?
      .ok_or_else(|| Error::EventPolicyNotFound(event.to_string()))
  }
}

async fn live<C: ConnectionTrait>(
  db: &C,
  id: i64,
) -> Result<Option<policy::Model>> {
  Ok(
    policy::Entity::find_by_id(id)
      .filter(policy::Column::IsDeleted.eq(false))
      .one(db)
      .await?,
  )
}

async fn live_by_event<C: ConnectionTrait>(
  db: &C,
  event: &str,
) -> Result<Option<policy::Model>> {
  Ok(
    policy::Entity::find()
      .filter(policy::Column::EventType.eq(event))
      .filter(policy::Column::IsDeleted.eq(false))
      .one(db)
      .await?,
  )
}

async fn insert<C: ConnectionTrait>(
  db: &C,
  req: &PolicyRequest,
) -> Result<policy::Model> {
  let event_type = req.event_type().map(str::to_string);

  // at most one live policy per campaign
  if let Some(event) = &event_type
    && live_by_event(db, event).await?.is_some()
  {
    warn!("Rejected duplicate policy for event `{event}`");
    return Err(Error::invalid(format!(
      "A live policy for event `{event}` already exists"
    )));
  }

  let policy = policy::ActiveModel {
    id: NotSet,
    name: Set(req.name.trim().to_string()),
    min_purchase_amount: Set(req.min_purchase_amount),
    discount_type: Set(req.discount_type),
    discount_value: Set(req.discount_value),
    max_discount_amount: Set(req.max_discount_amount),
    event_type: Set(event_type),
    is_deleted: Set(false),
    created_at: Set(now()),
  };

  Ok(policy.insert(db).await?)
}
