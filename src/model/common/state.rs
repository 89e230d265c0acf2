use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// States in the lifecycle of a voting instance.
///
/// Instances only ever move forwards: `Pending` to `Active` to `Ended`,
/// one step at a time (except that ending is allowed straight from
/// `Pending`). The recorded state is authoritative; an `Active` instance
/// whose end time has passed stays `Active` until it is explicitly ended.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum InstanceState {
    /// Created but not yet open for votes; fully editable.
    Pending,
    /// Open for votes between its start and end times.
    Active,
    /// Closed for good; nothing mutates any more.
    Ended,
}

impl InstanceState {
    /// The ledger-native status code.
    pub fn code(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Active => 1,
            Self::Ended => 2,
        }
    }
}

impl TryFrom<u8> for InstanceState {
    type Error = u8;

    /// Decode a ledger status code, handing back the offending code on
    /// failure.
    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Pending),
            1 => Ok(Self::Active),
            2 => Ok(Self::Ended),
            unknown => Err(unknown),
        }
    }
}

impl Display for InstanceState {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Active => write!(f, "Active"),
            Self::Ended => write!(f, "Ended"),
        }
    }
}
