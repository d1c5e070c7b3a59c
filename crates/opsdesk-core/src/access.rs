//! Who may read or change what.
//!
//! These are plain predicates; the transport layer decides how to deny.

use crate::{
  event::CalendarEvent,
  identity::{Identity, Role},
  shift::OnCallShift,
};

pub fn can_manage_identities(actor: &Identity) -> bool {
  actor.role == Role::Administrator
}

pub fn can_create_event(actor: &Identity) -> bool { actor.role.is_privileged() }

/// Owners may edit and delete their own events.
pub fn can_modify_event(actor: &Identity, event: &CalendarEvent) -> bool {
  actor.role.is_privileged() || event.owner_id == actor.identity_id
}

pub fn can_view_event(actor: &Identity, event: &CalendarEvent) -> bool {
  actor.role.is_privileged() || event.involves(actor.identity_id)
}

/// Members only ever see the events they own in listings.
pub fn sees_all_events(actor: &Identity) -> bool { actor.role.is_privileged() }

pub fn can_manage_shifts(actor: &Identity) -> bool { actor.role.is_privileged() }

pub fn can_view_shift(actor: &Identity, shift: &OnCallShift) -> bool {
  actor.role.is_privileged() || shift.involves(actor.identity_id)
}

/// Members only see shifts where they are assignee or backup.
pub fn sees_all_shifts(actor: &Identity) -> bool { actor.role.is_privileged() }
