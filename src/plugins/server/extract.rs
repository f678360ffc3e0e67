//! Extractors that report malformed input as `Error::InvalidRequest`.

use axum::extract::{FromRequest, FromRequestParts};

use crate::prelude::*;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct Payload<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct Params<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct Id<T>(pub T);

/// Parses a comma separated id list, e.g. `ids=1,2,3`.
pub fn parse_ids(raw: &str) -> Result<Vec<i64>> {
  raw
    .split(',')
    .map(str::trim)
    .filter(|id| !id.is_empty())
    .map(|id| {
      id.parse().map_err(|_| Error::invalid(format!("Invalid coupon ID `{id}`")))
    })
    .collect()
}
