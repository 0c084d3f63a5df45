//! Cooldown gating.
//!
//! A [`CooldownRegistry`] remembers when each actor last completed a gated
//! action. The cooldown length belongs to the gated thing (a command or an
//! ability) and is passed in on every check, so one registry type serves
//! both.

mod registry;

pub use registry::CooldownRegistry;
