//! Outbound telecom gateway: wire types, retry executor, and the HTTP
//! client that delivers real, billable data bundles.
//!
//! The [`client::BundleSender`] trait is the seam the ledger depends
//! on; [`client::TelcoClient`] is the production implementation.

pub mod api;
pub mod client;
pub mod error;
pub mod retry;

pub use client::{BundleReceipt, BundleSender, TelcoClient, TelcoConfig};
pub use error::TelcoError;
pub use retry::RetryPolicy;
