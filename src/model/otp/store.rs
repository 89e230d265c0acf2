use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rocket::tokio::sync::RwLock;

use crate::model::api::Email;
use crate::model::otp::Code;

/// Shared handle to the passcode store.
pub type SharedOtpStore = Arc<dyn OtpStore>;

/// A stored passcode issuance.
#[derive(Clone, Debug)]
pub struct OtpRecord {
    pub email: Email,
    pub issued_at: DateTime<Utc>,
}

impl OtpRecord {
    pub fn new(email: Email) -> Self {
        Self {
            email,
            issued_at: Utc::now(),
        }
    }

    /// Whether this record has outlived the validity window.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        Utc::now() - self.issued_at > ttl
    }
}

/// Outcome of a verification attempt. The record is handed back on the
/// paths that found (and therefore consumed) one.
#[derive(Debug)]
pub enum VerifyOutcome {
    Verified(OtpRecord),
    Expired(OtpRecord),
    Unknown,
}

/// Storage for live passcodes, keyed by the code itself.
///
/// Verification consumes: whatever the backing, a code can succeed at
/// most once.
#[rocket::async_trait]
pub trait OtpStore: Send + Sync {
    /// Store a fresh issuance under its code. A colliding code replaces
    /// the earlier record, silently revoking it.
    async fn issue(&self, code: Code, record: OtpRecord);

    /// Look up the record for `code` and consume it, whether it turns
    /// out fresh or expired.
    async fn verify(&self, code: &Code, ttl: Duration) -> VerifyOutcome;

    /// Drop every record older than `ttl`, returning how many went.
    async fn sweep_expired(&self, ttl: Duration) -> usize;

    /// Number of live records.
    async fn pending(&self) -> usize;
}

/// The standard in-process store.
#[derive(Debug, Default)]
pub struct MemoryOtpStore {
    records: RwLock<HashMap<Code, OtpRecord>>,
}

#[rocket::async_trait]
impl OtpStore for MemoryOtpStore {
    async fn issue(&self, code: Code, record: OtpRecord) {
        self.records.write().await.insert(code, record);
    }

    async fn verify(&self, code: &Code, ttl: Duration) -> VerifyOutcome {
        match self.records.write().await.remove(code) {
            Some(record) if record.is_expired(ttl) => VerifyOutcome::Expired(record),
            Some(record) => VerifyOutcome::Verified(record),
            None => VerifyOutcome::Unknown,
        }
    }

    async fn sweep_expired(&self, ttl: Duration) -> usize {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, record| !record.is_expired(ttl));
        before - records.len()
    }

    async fn pending(&self) -> usize {
        self.records.read().await.len()
    }
}
