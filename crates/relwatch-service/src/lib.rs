//! # relwatch Service
//!
//! A [`Service`] ties together the lookups, status and change dispatcher of
//! one monitored service and runs its check loop.

mod builder;
mod error;
mod service;

pub use builder::{build_service, build_services};
pub use error::ServiceError;
pub use service::{CheckOutcome, CheckReport, Service, ServiceSchedule};
