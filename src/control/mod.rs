//! Control policies: sprinkler hysteresis and alert rate limiting.

pub mod cooldown;
pub mod irrigation;
