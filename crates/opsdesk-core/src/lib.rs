//! Core types, conflict policies and the scheduling service for opsdesk.
//!
//! This crate is free of HTTP and database dependencies. Storage backends
//! implement [`store::ScheduleStore`]; everything else goes through
//! [`schedule::Scheduler`].

pub mod access;
pub mod availability;
pub mod conflict;
pub mod error;
pub mod event;
pub mod identity;
pub mod interval;
pub mod schedule;
pub mod shift;
pub mod stats;
pub mod store;

pub use error::{Error, ErrorKind, Result};
pub use schedule::{Scheduler, SchedulerConfig};
