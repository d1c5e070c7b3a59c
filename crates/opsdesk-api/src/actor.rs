//! The calling identity, resolved from the `X-Actor-Id` header.
//!
//! Authentication happens upstream (the gateway in front of this service);
//! by the time a request arrives the header names an identity the gateway
//! has already vouched for. This extractor only resolves it.

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use opsdesk_core::{ErrorKind, Scheduler, identity::Identity, store::ScheduleStore};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ApiError;

pub const ACTOR_HEADER: &str = "x-actor-id";

/// Present in a handler means the request carried a known identity.
#[derive(Debug, Clone)]
pub struct Actor(pub Identity);

impl Actor {
  pub fn id(&self) -> Uuid { self.0.identity_id }
}

impl<S> FromRequestParts<Arc<Scheduler<S>>> for Actor
where
  S: ScheduleStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    scheduler: &Arc<Scheduler<S>>,
  ) -> Result<Self, Self::Rejection> {
    let id = parts
      .headers
      .get(ACTOR_HEADER)
      .and_then(|v| v.to_str().ok())
      .and_then(|v| Uuid::parse_str(v.trim()).ok())
      .ok_or_else(|| {
        debug!("missing or malformed actor header");
        ApiError::Unauthorized
      })?;

    match scheduler.get_identity(id).await {
      Ok(identity) => Ok(Actor(identity)),
      Err(e) if e.kind() == ErrorKind::NotFound => {
        warn!(actor_id = %id, "request names an unknown actor");
        Err(ApiError::Unauthorized)
      }
      Err(e) => Err(e.into()),
    }
  }
}
