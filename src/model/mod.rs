//! Domain model: API types, shared entities, the ledger, and passcodes.

pub mod api;
pub mod common;
pub mod ledger;
pub mod otp;
