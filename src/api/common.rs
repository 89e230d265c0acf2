use crate::error::Result;
use crate::model::api::instance::{CandidateDescription, InstanceDescription};
use crate::model::common::{Candidate, CandidateId, InstanceId};
use crate::model::ledger::{decode_instance, LedgerError, SharedLedger};

/// Fetch an instance and decode it into its client-facing form.
pub async fn described_instance(
    ledger: &SharedLedger,
    instance: InstanceId,
) -> Result<InstanceDescription> {
    let raw = ledger.get_instance(instance).await?;
    Ok(decode_instance(raw)?.into())
}

/// Fetch one candidate of an instance in its client-facing form.
pub async fn described_candidate(
    ledger: &SharedLedger,
    instance: InstanceId,
    candidate: CandidateId,
) -> Result<CandidateDescription> {
    let raw = ledger.get_candidates(instance).await?;
    raw.into_iter()
        .find(|entry| entry.id == candidate)
        .map(Candidate::from)
        .map(Into::into)
        .ok_or_else(|| {
            LedgerError::UnknownCandidate {
                instance,
                candidate,
            }
            .into()
        })
}
