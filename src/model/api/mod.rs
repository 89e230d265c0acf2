//! API-compatible types.
//!
//! The types in this module are serialised the way clients expect:
//! camelCase field names, datetimes as epoch-second timestamps, and
//! passcodes and emails as strings.

pub mod email;
pub mod instance;
pub mod otp;

pub use email::Email;

use serde::{Deserialize, Serialize};

/// Plain `{"message": ...}` acknowledgement body.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiMessage {
    pub message: String,
}
