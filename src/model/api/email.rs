use std::{
    fmt::{self, Display, Formatter},
    ops::Deref,
    str::FromStr,
};

use lettre::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A voter's email address.
///
/// Wraps the SMTP mailbox syntax check and additionally requires a dot
/// in the domain, so bare hostnames like `user@localhost` are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email {
    inner: Address,
}

impl Deref for Email {
    type Target = Address;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FromStr for Email {
    type Err = EmailParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s.parse::<Address>()?;
        if !inner.domain().contains('.') {
            return Err(EmailParseError::BareDomain);
        }
        Ok(Email { inner })
    }
}

impl TryFrom<String> for Email {
    type Error = EmailParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.to_string()
    }
}

impl From<Email> for Address {
    fn from(email: Email) -> Self {
        email.inner
    }
}

impl Display for Email {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        self.inner.fmt(formatter)
    }
}

#[derive(Debug, Error)]
pub enum EmailParseError {
    #[error("not a valid email address: {0}")]
    Syntax(#[from] lettre::address::AddressError),
    #[error("email domain must contain a dot")]
    BareDomain,
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl Email {
        pub fn example() -> Self {
            "voter@example.com".parse().unwrap()
        }

        pub fn example2() -> Self {
            "second.voter@example.org".parse().unwrap()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plausible_addresses_parse() {
        for address in [
            "voter@example.com",
            "first.last@sub.example.co.uk",
            "tagged+votes@example.org",
        ] {
            assert!(address.parse::<Email>().is_ok(), "rejected {address}");
        }
    }

    #[test]
    fn malformed_addresses_are_rejected() {
        for address in ["", "not-an-email", "@example.com", "user@", "a b@example.com"] {
            assert!(
                matches!(address.parse::<Email>(), Err(EmailParseError::Syntax(_))),
                "accepted {address:?}"
            );
        }
    }

    #[test]
    fn dotless_domains_are_rejected() {
        assert!(matches!(
            "user@localhost".parse::<Email>(),
            Err(EmailParseError::BareDomain)
        ));
    }

    #[test]
    fn round_trips_through_strings() {
        let email = Email::example();
        assert_eq!("voter@example.com", email.to_string());
        let reparsed = Email::try_from("voter@example.com".to_string()).unwrap();
        assert_eq!(email, reparsed);
    }
}
