//! Handlers for `/shifts` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/shifts` | `?start=&end=`; members see only shifts they cover |
//! | `POST`   | `/shifts` | Managers and administrators; 409 on an overlap |
//! | `GET`    | `/shifts/current` | Whoever is on call now, or `null` |
//! | `GET`    | `/shifts/stats` | `?days=`; managers and administrators |
//! | `GET`    | `/shifts/{id}` | Assignee, backup, or privileged |
//! | `PATCH`  | `/shifts/{id}` | Managers and administrators; `null` clears `backup_id` / `notes` |
//! | `DELETE` | `/shifts/{id}` | Managers and administrators |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use opsdesk_core::{
  Scheduler,
  access::{can_manage_shifts, can_view_shift, sees_all_shifts},
  shift::{HandoverChecklist, NewShift, OnCallShift, ShiftCategory, ShiftPatch},
  stats::ShiftStats,
  store::{ScheduleStore, ShiftFilter},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  actor::Actor,
  double_option,
  error::{ApiError, ensure},
};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub start: Option<DateTime<Utc>>,
  pub end:   Option<DateTime<Utc>>,
}

/// `GET /shifts`
pub async fn list<S>(
  State(scheduler): State<Arc<Scheduler<S>>>,
  actor: Actor,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<OnCallShift>>, ApiError>
where
  S: ScheduleStore + 'static,
{
  let involving = (!sees_all_shifts(&actor.0)).then(|| actor.id());
  let filter = ShiftFilter {
    involving,
    window: scheduler.window(params.start, params.end),
    started_from: None,
  };
  Ok(Json(scheduler.list_shifts(filter).await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub category:           ShiftCategory,
  pub start_at:           DateTime<Utc>,
  pub end_at:             DateTime<Utc>,
  pub assignee_id:        Uuid,
  pub backup_id:          Option<Uuid>,
  pub notes:              Option<String>,
  #[serde(default)]
  pub handover_checklist: HandoverChecklist,
}

impl From<CreateBody> for NewShift {
  fn from(b: CreateBody) -> Self {
    NewShift {
      category:           b.category,
      start_at:           b.start_at,
      end_at:             b.end_at,
      assignee_id:        b.assignee_id,
      backup_id:          b.backup_id,
      notes:              b.notes,
      handover_checklist: b.handover_checklist,
    }
  }
}

/// `POST /shifts`
pub async fn create<S>(
  State(scheduler): State<Arc<Scheduler<S>>>,
  actor: Actor,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ScheduleStore + 'static,
{
  ensure(can_manage_shifts(&actor.0), "schedule shifts")?;
  let shift = scheduler.create_shift(body.into()).await?;
  Ok((StatusCode::CREATED, Json(shift)))
}

// ─── Current / stats ─────────────────────────────────────────────────────────

/// `GET /shifts/current`
pub async fn current<S>(
  State(scheduler): State<Arc<Scheduler<S>>>,
  _actor: Actor,
) -> Result<Json<Option<OnCallShift>>, ApiError>
where
  S: ScheduleStore + 'static,
{
  Ok(Json(scheduler.current_shift(Utc::now()).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct StatsParams {
  pub days: Option<u32>,
}

/// `GET /shifts/stats[?days=<n>]`
pub async fn stats<S>(
  State(scheduler): State<Arc<Scheduler<S>>>,
  actor: Actor,
  Query(params): Query<StatsParams>,
) -> Result<Json<Vec<ShiftStats>>, ApiError>
where
  S: ScheduleStore + 'static,
{
  ensure(can_manage_shifts(&actor.0), "view shift statistics")?;
  Ok(Json(scheduler.shift_stats(params.days, Utc::now()).await?))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /shifts/{id}`
pub async fn get_one<S>(
  State(scheduler): State<Arc<Scheduler<S>>>,
  actor: Actor,
  Path(id): Path<Uuid>,
) -> Result<Json<OnCallShift>, ApiError>
where
  S: ScheduleStore + 'static,
{
  let shift = scheduler.get_shift(id).await?;
  ensure(can_view_shift(&actor.0, &shift), "view this shift")?;
  Ok(Json(shift))
}

// ─── Update ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct PatchBody {
  pub category:           Option<ShiftCategory>,
  pub start_at:           Option<DateTime<Utc>>,
  pub end_at:             Option<DateTime<Utc>>,
  pub assignee_id:        Option<Uuid>,
  #[serde(default, deserialize_with = "double_option")]
  pub backup_id:          Option<Option<Uuid>>,
  #[serde(default, deserialize_with = "double_option")]
  pub notes:              Option<Option<String>>,
  pub handover_checklist: Option<HandoverChecklist>,
}

impl From<PatchBody> for ShiftPatch {
  fn from(b: PatchBody) -> Self {
    ShiftPatch {
      category:           b.category,
      start_at:           b.start_at,
      end_at:             b.end_at,
      assignee_id:        b.assignee_id,
      backup_id:          b.backup_id,
      notes:              b.notes,
      handover_checklist: b.handover_checklist,
    }
  }
}

/// `PATCH /shifts/{id}`
pub async fn update<S>(
  State(scheduler): State<Arc<Scheduler<S>>>,
  actor: Actor,
  Path(id): Path<Uuid>,
  Json(body): Json<PatchBody>,
) -> Result<Json<OnCallShift>, ApiError>
where
  S: ScheduleStore + 'static,
{
  ensure(can_manage_shifts(&actor.0), "modify shifts")?;
  Ok(Json(scheduler.update_shift(id, body.into()).await?))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /shifts/{id}`
pub async fn delete<S>(
  State(scheduler): State<Arc<Scheduler<S>>>,
  actor: Actor,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ScheduleStore + 'static,
{
  ensure(can_manage_shifts(&actor.0), "delete shifts")?;
  scheduler.delete_shift(id).await?;
  Ok(StatusCode::NO_CONTENT)
}
