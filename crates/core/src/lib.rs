//! Pure domain logic for the reward platform: id/timestamp aliases, the
//! error taxonomy, phone normalization, bundle sizing, and reward plans.
//!
//! Nothing in this crate performs I/O.

pub mod bundle;
pub mod error;
pub mod phone;
pub mod reward;
pub mod types;
