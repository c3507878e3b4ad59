//! Response envelope shared by the JSON handlers.
//!
//! Every JSON endpoint wraps its payload in `{ "data": ... }` so
//! clients can rely on one shape for successes and on the error body
//! from [`crate::error`] otherwise. The one deliberate exception is the
//! webhook receiver, whose unenveloped acknowledgement bodies follow
//! the provider's callback contract instead.

use serde::Serialize;

/// `{ "data": T }` envelope for successful JSON responses.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
