pub use std::{sync::Arc, time::Duration};

pub use chrono::{NaiveDateTime as DateTime, TimeDelta, Utc};
pub use sea_orm::{
  ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
  EntityTrait, NotSet, QueryFilter, QueryOrder, Set, TransactionTrait,
};
pub use tracing::{error, info, warn};

pub use crate::error::{CouponState, Error, Result};

pub fn now() -> DateTime {
  Utc::now().naive_utc()
}
