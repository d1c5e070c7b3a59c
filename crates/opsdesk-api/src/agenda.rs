//! `GET /agenda`: the caller's dashboard.

use std::sync::Arc;

use axum::{Json, extract::State};
use chrono::Utc;
use opsdesk_core::{Scheduler, availability::Agenda, store::ScheduleStore};

use crate::{actor::Actor, error::ApiError};

/// `GET /agenda`
pub async fn handler<S>(
  State(scheduler): State<Arc<Scheduler<S>>>,
  actor: Actor,
) -> Result<Json<Agenda>, ApiError>
where
  S: ScheduleStore + 'static,
{
  Ok(Json(scheduler.agenda(actor.id(), Utc::now()).await?))
}
