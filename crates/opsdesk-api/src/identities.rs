//! Handlers for `/identities` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/me` | The calling identity |
//! | `GET`  | `/identities` | Administrators only; newest first |
//! | `POST` | `/identities` | Administrators only; body: `{"name","email","role"?}` |
//! | `GET`  | `/identities/{id}` | Administrators, or the identity itself |
//! | `PUT`  | `/identities/{id}/role` | Administrators only; body: `{"role":"manager"}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use opsdesk_core::{
  Scheduler,
  access::can_manage_identities,
  identity::{Identity, NewIdentity, Role},
  store::ScheduleStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  actor::Actor,
  error::{ApiError, ensure},
};

/// `GET /me`
pub async fn me(actor: Actor) -> Json<Identity> { Json(actor.0) }

/// `GET /identities`
pub async fn list<S>(
  State(scheduler): State<Arc<Scheduler<S>>>,
  actor: Actor,
) -> Result<Json<Vec<Identity>>, ApiError>
where
  S: ScheduleStore + 'static,
{
  ensure(can_manage_identities(&actor.0), "list identities")?;
  Ok(Json(scheduler.list_identities().await?))
}

/// `POST /identities`
pub async fn create<S>(
  State(scheduler): State<Arc<Scheduler<S>>>,
  actor: Actor,
  Json(body): Json<NewIdentity>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ScheduleStore + 'static,
{
  ensure(can_manage_identities(&actor.0), "create identities")?;
  let identity = scheduler.create_identity(body).await?;
  Ok((StatusCode::CREATED, Json(identity)))
}

/// `GET /identities/{id}`
pub async fn get_one<S>(
  State(scheduler): State<Arc<Scheduler<S>>>,
  actor: Actor,
  Path(id): Path<Uuid>,
) -> Result<Json<Identity>, ApiError>
where
  S: ScheduleStore + 'static,
{
  ensure(
    can_manage_identities(&actor.0) || actor.id() == id,
    "view this identity",
  )?;
  Ok(Json(scheduler.get_identity(id).await?))
}

#[derive(Debug, Deserialize)]
pub struct RoleBody {
  pub role: Role,
}

/// `PUT /identities/{id}/role`
pub async fn set_role<S>(
  State(scheduler): State<Arc<Scheduler<S>>>,
  actor: Actor,
  Path(id): Path<Uuid>,
  Json(body): Json<RoleBody>,
) -> Result<Json<Identity>, ApiError>
where
  S: ScheduleStore + 'static,
{
  ensure(can_manage_identities(&actor.0), "change roles")?;
  Ok(Json(scheduler.set_role(id, body.role).await?))
}
