//! One-time passcodes: generation, storage and expiry.

pub mod code;
pub mod store;
pub mod sweeper;

pub use code::Code;
pub use store::{MemoryOtpStore, OtpRecord, OtpStore, SharedOtpStore, VerifyOutcome};
pub use sweeper::OtpSweeperFairing;
