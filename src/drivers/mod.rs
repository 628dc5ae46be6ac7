//! Actuator and display drivers, hardware initialisation, and peripheral helpers.

pub mod hw_init;
pub mod lcd;
pub mod relay;
pub mod watchdog;
