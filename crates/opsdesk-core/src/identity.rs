//! Identities: the people events and shifts refer to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{Error, Result};

/// Closed set of roles. Write permissions derive from this.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
  Administrator,
  Manager,
  #[default]
  Member,
}

impl Role {
  /// Administrators and managers may perform managerial writes.
  pub fn is_privileged(self) -> bool {
    matches!(self, Self::Administrator | Self::Manager)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
  pub identity_id: Uuid,
  pub name:        String,
  pub email:       String,
  pub role:        Role,
  pub created_at:  DateTime<Utc>,
}

/// Input to [`crate::schedule::Scheduler::create_identity`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewIdentity {
  pub name:  String,
  pub email: String,
  #[serde(default)]
  pub role:  Role,
}

impl NewIdentity {
  /// Trim the fields, lowercase the email and check their shape.
  pub(crate) fn normalized(self) -> Result<Self> {
    let name = self.name.trim().to_owned();
    if name.is_empty() {
      return Err(Error::validation("name must not be empty"));
    }
    let email = self.email.trim().to_lowercase();
    if !looks_like_email(&email) {
      return Err(Error::validation(format!("invalid email address: {email:?}")));
    }
    Ok(Self { name, email, role: self.role })
  }
}

fn looks_like_email(s: &str) -> bool {
  let Some((local, domain)) = s.split_once('@') else {
    return false;
  };
  !local.is_empty()
    && !domain.starts_with('.')
    && !domain.ends_with('.')
    && domain.contains('.')
    && !domain.contains('@')
    && !s.chars().any(char::is_whitespace)
}
