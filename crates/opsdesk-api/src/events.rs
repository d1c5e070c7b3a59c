//! Handlers for `/events` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/events` | `?category=&owner_id=&priority=&start=&end=`; members see only their own |
//! | `POST`   | `/events` | Managers and administrators; 409 on a scheduling conflict |
//! | `GET`    | `/events/{id}` | Owner, participants, or privileged |
//! | `PATCH`  | `/events/{id}` | Owner or privileged; omitted fields stay, `null` clears `description` |
//! | `DELETE` | `/events/{id}` | Owner or privileged |

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
  access::{can_create_event, can_modify_event, can_view_event, sees_all_events},
  event::{
    CalendarEvent, EventCategory, EventPatch, ImpactScope, NewEvent, Priority,
  },
  store::{EventFilter, ScheduleStore},
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
  pub category: Option<EventCategory>,
  pub owner_id: Option<Uuid>,
  pub priority: Option<Priority>,
  pub start:    Option<DateTime<Utc>>,
  pub end:      Option<DateTime<Utc>>,
}

/// `GET /events`
pub async fn list<S>(
  State(scheduler): State<Arc<Scheduler<S>>>,
  actor: Actor,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<CalendarEvent>>, ApiError>
where
  S: ScheduleStore + 'static,
{
  let owner_id = if sees_all_events(&actor.0) {
    params.owner_id
  } else {
    Some(actor.id())
  };

  let filter = EventFilter {
    category: params.category,
    owner_id,
    priority: params.priority,
    involving: None,
    window: scheduler.window(params.start, params.end),
  };
  Ok(Json(scheduler.list_events(filter).await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub title:           String,
  pub description:     Option<String>,
  pub category:        EventCategory,
  #[serde(default)]
  pub priority:        Priority,
  #[serde(default)]
  pub impact:          ImpactScope,
  pub start_at:        DateTime<Utc>,
  pub end_at:          DateTime<Utc>,
  /// Defaults to the caller.
  pub owner_id:        Option<Uuid>,
  #[serde(default)]
  pub participant_ids: Vec<Uuid>,
  #[serde(default)]
  pub tags:            Vec<String>,
}

impl CreateBody {
  fn into_new_event(self, actor: &Actor) -> NewEvent {
    NewEvent {
      title:           self.title,
      description:     self.description,
      category:        self.category,
      priority:        self.priority,
      impact:          self.impact,
      start_at:        self.start_at,
      end_at:          self.end_at,
      owner_id:        self.owner_id.unwrap_or(actor.id()),
      participant_ids: self.participant_ids,
      tags:            self.tags,
    }
  }
}

/// `POST /events`
pub async fn create<S>(
  State(scheduler): State<Arc<Scheduler<S>>>,
  actor: Actor,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ScheduleStore + 'static,
{
  ensure(can_create_event(&actor.0), "create events")?;
  let event = scheduler.create_event(body.into_new_event(&actor)).await?;
  Ok((StatusCode::CREATED, Json(event)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /events/{id}`
pub async fn get_one<S>(
  State(scheduler): State<Arc<Scheduler<S>>>,
  actor: Actor,
  Path(id): Path<Uuid>,
) -> Result<Json<CalendarEvent>, ApiError>
where
  S: ScheduleStore + 'static,
{
  let event = scheduler.get_event(id).await?;
  ensure(can_view_event(&actor.0, &event), "view this event")?;
  Ok(Json(event))
}

// ─── Update ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct PatchBody {
  pub title:           Option<String>,
  #[serde(default, deserialize_with = "double_option")]
  pub description:     Option<Option<String>>,
  pub category:        Option<EventCategory>,
  pub priority:        Option<Priority>,
  pub impact:          Option<ImpactScope>,
  pub start_at:        Option<DateTime<Utc>>,
  pub end_at:          Option<DateTime<Utc>>,
  pub owner_id:        Option<Uuid>,
  pub participant_ids: Option<Vec<Uuid>>,
  pub tags:            Option<Vec<String>>,
}

impl From<PatchBody> for EventPatch {
  fn from(b: PatchBody) -> Self {
    EventPatch {
      title:           b.title,
      description:     b.description,
      category:        b.category,
      priority:        b.priority,
      impact:          b.impact,
      start_at:        b.start_at,
      end_at:          b.end_at,
      owner_id:        b.owner_id,
      participant_ids: b.participant_ids,
      tags:            b.tags,
    }
  }
}

/// `PATCH /events/{id}`
pub async fn update<S>(
  State(scheduler): State<Arc<Scheduler<S>>>,
  actor: Actor,
  Path(id): Path<Uuid>,
  Json(body): Json<PatchBody>,
) -> Result<Json<CalendarEvent>, ApiError>
where
  S: ScheduleStore + 'static,
{
  let existing = scheduler.get_event(id).await?;
  ensure(can_modify_event(&actor.0, &existing), "modify this event")?;
  Ok(Json(scheduler.update_event(id, body.into()).await?))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /events/{id}`
pub async fn delete<S>(
  State(scheduler): State<Arc<Scheduler<S>>>,
  actor: Actor,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ScheduleStore + 'static,
{
  let existing = scheduler.get_event(id).await?;
  ensure(can_modify_event(&actor.0, &existing), "delete this event")?;
  scheduler.delete_event(id).await?;
  Ok(StatusCode::NO_CONTENT)
}
