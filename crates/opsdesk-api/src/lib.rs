//! JSON REST API for opsdesk.
//!
//! Exposes an axum [`Router`] over a shared [`Scheduler`]. Every route
//! requires an `X-Actor-Id` header naming a known identity; see [`actor`].
//! TLS and authentication are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", opsdesk_api::api_router(scheduler.clone()))
//! ```

pub mod actor;
pub mod agenda;
pub mod error;
pub mod events;
pub mod identities;
pub mod shifts;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, put},
};
use opsdesk_core::{Scheduler, store::ScheduleStore};
use serde::{Deserialize, Deserializer};
use tower_http::trace::TraceLayer;

pub use actor::{ACTOR_HEADER, Actor};
pub use error::ApiError;

/// Build a fully-materialised API router for `scheduler`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(scheduler: Arc<Scheduler<S>>) -> Router<()>
where
  S: ScheduleStore + 'static,
{
  Router::new()
    // Identities
    .route("/me", get(identities::me))
    .route(
      "/identities",
      get(identities::list::<S>).post(identities::create::<S>),
    )
    .route("/identities/{id}", get(identities::get_one::<S>))
    .route("/identities/{id}/role", put(identities::set_role::<S>))
    // Events
    .route("/events", get(events::list::<S>).post(events::create::<S>))
    .route(
      "/events/{id}",
      get(events::get_one::<S>)
        .patch(events::update::<S>)
        .delete(events::delete::<S>),
    )
    // Shifts
    .route("/shifts", get(shifts::list::<S>).post(shifts::create::<S>))
    .route("/shifts/current", get(shifts::current::<S>))
    .route("/shifts/stats", get(shifts::stats::<S>))
    .route(
      "/shifts/{id}",
      get(shifts::get_one::<S>)
        .patch(shifts::update::<S>)
        .delete(shifts::delete::<S>),
    )
    // Dashboard
    .route("/agenda", get(agenda::handler::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(scheduler)
}

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`) in patch bodies. Use with `#[serde(default)]`.
pub(crate) fn double_option<'de, T, D>(d: D) -> Result<Option<Option<T>>, D::Error>
where
  T: Deserialize<'de>,
  D: Deserializer<'de>,
{
  Option::<T>::deserialize(d).map(Some)
}
