//! Typed decoding of ledger replies.
//!
//! Every shape the ledger can answer with has one decoder here, so a
//! malformed reply surfaces as a [`DecodeError`] instead of leaking a
//! raw encoding into a response.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::common::{Candidate, Instance, InstanceState, LedgerEvent, VoterRoles};
use crate::model::ledger::{event_kind, RawCandidate, RawEvent, RawInstance, RawVoterRoles};

/// A ledger reply that does not decode to a well-formed domain value.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum DecodeError {
    #[error("unknown instance status code {0}")]
    UnknownStatus(u8),
    #[error("unknown event kind {0}")]
    UnknownEventKind(u8),
    #[error("timestamp {0} is outside the representable range")]
    TimestampOutOfRange(u64),
    #[error("voter and role arrays differ in length: {voters} voters, {roles} role lists")]
    MismatchedVoterRoles { voters: usize, roles: usize },
}

/// Decode a raw instance, translating the status code and epoch times.
pub fn decode_instance(raw: RawInstance) -> Result<Instance, DecodeError> {
    let state = InstanceState::try_from(raw.status).map_err(DecodeError::UnknownStatus)?;
    Ok(Instance {
        id: raw.id,
        name: raw.name,
        organization_name: raw.organization_name,
        description: raw.description,
        creator: raw.creator,
        state,
        start_time: decode_time(raw.start_time)?,
        end_time: decode_time(raw.end_time)?,
        candidate_count: raw.candidate_count,
        is_private: raw.is_private,
    })
}

impl From<RawCandidate> for Candidate {
    // Nothing in a candidate reply can fail to decode.
    fn from(raw: RawCandidate) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            role: raw.role,
            description: raw.description,
            vote_count: raw.vote_count,
        }
    }
}

/// Zip the parallel voter/role arrays into per-voter rows.
pub fn decode_voter_roles(raw: RawVoterRoles) -> Result<Vec<VoterRoles>, DecodeError> {
    if raw.voters.len() != raw.roles.len() {
        return Err(DecodeError::MismatchedVoterRoles {
            voters: raw.voters.len(),
            roles: raw.roles.len(),
        });
    }
    Ok(raw
        .voters
        .into_iter()
        .zip(raw.roles)
        .map(|(voter, roles)| VoterRoles { voter, roles })
        .collect())
}

/// Decode one event record by its kind code.
pub fn decode_event(raw: RawEvent) -> Result<LedgerEvent, DecodeError> {
    let at = required_time(raw.timestamp)?;
    match raw.kind {
        event_kind::INSTANCE_CREATED => Ok(LedgerEvent::InstanceCreated { at }),
        event_kind::CANDIDATE_ADDED => Ok(LedgerEvent::CandidateAdded {
            candidate: raw.candidate_id,
            at,
        }),
        event_kind::CANDIDATE_UPDATED => Ok(LedgerEvent::CandidateUpdated {
            candidate: raw.candidate_id,
            at,
        }),
        event_kind::VOTE_CAST => Ok(LedgerEvent::VoteCast {
            candidate: raw.candidate_id,
            voter: raw.actor,
            at,
        }),
        unknown => Err(DecodeError::UnknownEventKind(unknown)),
    }
}

/// Zero means "not set"; anything else is epoch seconds.
fn decode_time(secs: u64) -> Result<Option<DateTime<Utc>>, DecodeError> {
    if secs == 0 {
        return Ok(None);
    }
    let signed = i64::try_from(secs).map_err(|_| DecodeError::TimestampOutOfRange(secs))?;
    DateTime::from_timestamp(signed, 0)
        .map(Some)
        .ok_or(DecodeError::TimestampOutOfRange(secs))
}

fn required_time(secs: u64) -> Result<DateTime<Utc>, DecodeError> {
    decode_time(secs)?.ok_or(DecodeError::TimestampOutOfRange(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_instance(status: u8, start_time: u64, end_time: u64) -> RawInstance {
        RawInstance {
            id: 1,
            name: "Test".to_string(),
            organization_name: "Org".to_string(),
            description: "About".to_string(),
            creator: "0x01".to_string(),
            status,
            start_time,
            end_time,
            candidate_count: 0,
            is_private: false,
        }
    }

    #[test]
    fn pending_instance_has_no_times() {
        let instance = decode_instance(raw_instance(0, 0, 0)).unwrap();
        assert_eq!(InstanceState::Pending, instance.state);
        assert_eq!(None, instance.start_time);
        assert_eq!(None, instance.end_time);
    }

    #[test]
    fn active_instance_times_decode_to_utc() {
        let instance = decode_instance(raw_instance(1, 1_700_000_000, 1_700_003_600)).unwrap();
        assert_eq!(InstanceState::Active, instance.state);
        assert_eq!(1_700_000_000, instance.start_time.unwrap().timestamp());
        assert_eq!(1_700_003_600, instance.end_time.unwrap().timestamp());
    }

    #[test]
    fn unknown_status_is_an_error() {
        assert_eq!(
            Err(DecodeError::UnknownStatus(7)),
            decode_instance(raw_instance(7, 0, 0))
        );
    }

    #[test]
    fn absurd_timestamp_is_an_error() {
        assert_eq!(
            Err(DecodeError::TimestampOutOfRange(u64::MAX)),
            decode_instance(raw_instance(1, u64::MAX, 0))
        );
    }

    #[test]
    fn voter_roles_zip_by_position() {
        let rows = decode_voter_roles(RawVoterRoles {
            voters: vec!["alice".to_string(), "bob".to_string()],
            roles: vec![vec!["President".to_string()], vec![]],
        })
        .unwrap();
        assert_eq!(2, rows.len());
        assert_eq!("alice", rows[0].voter);
        assert_eq!(vec!["President"], rows[0].roles);
        assert!(rows[1].roles.is_empty());
    }

    #[test]
    fn mismatched_voter_roles_are_an_error() {
        assert_eq!(
            Err(DecodeError::MismatchedVoterRoles {
                voters: 2,
                roles: 1
            }),
            decode_voter_roles(RawVoterRoles {
                voters: vec!["alice".to_string(), "bob".to_string()],
                roles: vec![vec![]],
            })
        );
    }

    #[test]
    fn events_decode_by_kind() {
        let event = decode_event(RawEvent {
            kind: event_kind::VOTE_CAST,
            instance_id: 1,
            candidate_id: 4,
            actor: "alice".to_string(),
            timestamp: 1_700_000_000,
        })
        .unwrap();
        assert_eq!(
            LedgerEvent::VoteCast {
                candidate: 4,
                voter: "alice".to_string(),
                at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            },
            event
        );
    }

    #[test]
    fn unknown_event_kind_is_an_error() {
        let result = decode_event(RawEvent {
            kind: 9,
            instance_id: 1,
            candidate_id: 0,
            actor: String::new(),
            timestamp: 1_700_000_000,
        });
        assert_eq!(Err(DecodeError::UnknownEventKind(9)), result);
    }
}
