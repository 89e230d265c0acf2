use log::{error, warn};
use rocket::http::Status;
use rocket::response::Responder;
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ledger::{DecodeError, LedgerError};

pub type Result<T = ()> = std::result::Result<T, Error>;

/// Anything that can go wrong while serving a request.
///
/// Every variant maps to a distinct, deliberate HTTP rendering; clients
/// can tell them apart by status and message.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input, rejected before any state changed.
    #[error("{0}")]
    Validation(String),
    /// The operation is not legal in the target's current lifecycle
    /// state.
    #[error("{0}")]
    StateConflict(String),
    /// A second vote for the same role by the same voter.
    #[error("{0}")]
    DuplicateVote(String),
    /// The requested entity does not exist.
    #[error("{0}")]
    NotFound(String),
    /// Unknown or already-consumed passcode. A fixed message: the body
    /// must not reveal whether a near-miss code exists.
    #[error("Invalid OTP")]
    InvalidOtp,
    /// The passcode outlived its validity window.
    #[error("OTP has expired")]
    ExpiredOtp,
    /// A downstream collaborator failed; the cause is carried verbatim.
    #[error("{0}")]
    Transport(String),
    /// The ledger answered with something undecodable.
    #[error("malformed ledger reply: {0}")]
    Decode(#[from] DecodeError),
}

impl Error {
    fn status(&self) -> Status {
        match self {
            Self::Validation(_) | Self::InvalidOtp | Self::ExpiredOtp => Status::BadRequest,
            Self::StateConflict(_) => Status::Conflict,
            Self::DuplicateVote(_) => Status::UnprocessableEntity,
            Self::NotFound(_) => Status::NotFound,
            Self::Transport(_) | Self::Decode(_) => Status::InternalServerError,
        }
    }
}

impl From<LedgerError> for Error {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::UnknownInstance(_) | LedgerError::UnknownCandidate { .. } => {
                Self::NotFound(err.to_string())
            }
            LedgerError::WrongState { .. } => Self::StateConflict(err.to_string()),
            LedgerError::AlreadyVoted { .. } => Self::DuplicateVote(err.to_string()),
            LedgerError::Invalid(message) => Self::Validation(message),
            LedgerError::Transport(cause) => Self::Transport(cause),
        }
    }
}

/// JSON body of every error response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, request: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        if status.class().is_server_error() {
            error!("{status}: {self}");
        } else {
            warn!("{status}: {self}");
        }
        let body = Json(ErrorBody {
            message: self.to_string(),
        });
        (status, body).respond_to(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_errors_map_to_their_api_classes() {
        assert!(matches!(
            Error::from(LedgerError::UnknownInstance(7)),
            Error::NotFound(_)
        ));
        assert!(matches!(
            Error::from(LedgerError::UnknownCandidate {
                instance: 1,
                candidate: 2
            }),
            Error::NotFound(_)
        ));
        assert!(matches!(
            Error::from(LedgerError::AlreadyVoted {
                instance: 1,
                voter: "alice".to_string(),
                role: "President".to_string(),
            }),
            Error::DuplicateVote(_)
        ));
        assert!(matches!(
            Error::from(LedgerError::Invalid("bad".to_string())),
            Error::Validation(_)
        ));
        assert!(matches!(
            Error::from(LedgerError::Transport("down".to_string())),
            Error::Transport(_)
        ));
    }

    #[test]
    fn statuses_distinguish_the_taxonomy() {
        assert_eq!(Status::BadRequest, Error::Validation(String::new()).status());
        assert_eq!(Status::BadRequest, Error::InvalidOtp.status());
        assert_eq!(Status::BadRequest, Error::ExpiredOtp.status());
        assert_eq!(
            Status::Conflict,
            Error::StateConflict(String::new()).status()
        );
        assert_eq!(
            Status::UnprocessableEntity,
            Error::DuplicateVote(String::new()).status()
        );
        assert_eq!(Status::NotFound, Error::NotFound(String::new()).status());
        assert_eq!(
            Status::InternalServerError,
            Error::Transport(String::new()).status()
        );
    }

    #[test]
    fn otp_messages_are_exact() {
        assert_eq!("Invalid OTP", Error::InvalidOtp.to_string());
        assert_eq!("OTP has expired", Error::ExpiredOtp.to_string());
    }
}
