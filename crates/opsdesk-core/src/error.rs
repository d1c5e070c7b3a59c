//! Error types for `opsdesk-core`.

use thiserror::Error;
use uuid::Uuid;

/// Coarse classification of an [`Error`], used by outer layers to pick a
/// denial response without matching on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Validation,
  Conflict,
  NotFound,
  Store,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("validation failed: {0}")]
  Validation(String),

  #[error("conflicting events: {}", .titles.join(", "))]
  EventConflict {
    titles:    Vec<String>,
    event_ids: Vec<Uuid>,
  },

  #[error(
    "identity {identity_id} is already on call in this period: {}",
    join_ids(.shift_ids)
  )]
  ShiftConflict {
    identity_id: Uuid,
    shift_ids:   Vec<Uuid>,
  },

  #[error("identity not found: {0}")]
  IdentityNotFound(Uuid),

  #[error("event not found: {0}")]
  EventNotFound(Uuid),

  #[error("shift not found: {0}")]
  ShiftNotFound(Uuid),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::Validation(_) => ErrorKind::Validation,
      Self::EventConflict { .. } | Self::ShiftConflict { .. } => {
        ErrorKind::Conflict
      }
      Self::IdentityNotFound(_)
      | Self::EventNotFound(_)
      | Self::ShiftNotFound(_) => ErrorKind::NotFound,
      Self::Store(_) => ErrorKind::Store,
    }
  }

  /// Wrap a backend error.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }

  pub(crate) fn validation(msg: impl Into<String>) -> Self {
    Self::Validation(msg.into())
  }
}

fn join_ids(ids: &[Uuid]) -> String {
  ids.iter().map(Uuid::to_string).collect::<Vec<_>>().join(", ")
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
