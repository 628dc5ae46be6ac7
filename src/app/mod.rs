//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules for the Vapor controller:
//! the per-tick control loop, alert text, operator commands and the
//! sensor data model.  All interaction with hardware happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod alerts;
pub mod commands;
pub mod events;
pub mod ports;
pub mod reading;
pub mod service;
