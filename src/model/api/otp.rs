use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::api::Email;

/// Body of a passcode issuance request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SendOtpRequest {
    pub emails: Vec<String>,
}

impl SendOtpRequest {
    /// Validate the whole batch up front: any bad entry rejects the
    /// request before a single code is issued. Duplicates are allowed
    /// and treated as separate issuances.
    pub fn validated(self) -> Result<Vec<Email>, Error> {
        if self.emails.is_empty() {
            return Err(Error::Validation(
                "at least one email address is required".to_string(),
            ));
        }
        let mut recipients = Vec::with_capacity(self.emails.len());
        let mut problems = Vec::new();
        for (index, raw) in self.emails.iter().enumerate() {
            match raw.parse::<Email>() {
                Ok(email) => recipients.push(email),
                Err(err) => problems.push(format!("emails[{index}] ('{raw}'): {err}")),
            }
        }
        if problems.is_empty() {
            Ok(recipients)
        } else {
            Err(Error::Validation(problems.join("; ")))
        }
    }
}

/// One recipient the mailer could not deliver to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedSend {
    pub email: String,
    pub error: String,
}

/// Outcome of an issuance batch: every input address lands in either
/// `sent` or `failed`, in request order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SendOtpResponse {
    pub message: String,
    pub sent: Vec<String>,
    pub failed: Vec<FailedSend>,
}

impl SendOtpResponse {
    pub fn summarise(sent: Vec<String>, failed: Vec<FailedSend>) -> Self {
        let message = if failed.is_empty() {
            "OTP sent successfully to all provided emails".to_string()
        } else {
            format!(
                "OTP delivery failed for {} of {} recipients",
                failed.len(),
                sent.len() + failed.len()
            )
        };
        Self {
            message,
            sent,
            failed,
        }
    }
}

/// Body of a verification request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerifyOtpRequest {
    pub otp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_valid_batch_parses_in_order() {
        let request = SendOtpRequest {
            emails: vec![
                "a@example.com".to_string(),
                "b@example.org".to_string(),
                "a@example.com".to_string(),
            ],
        };
        let recipients = request.validated().unwrap();
        let strings: Vec<String> = recipients.iter().map(ToString::to_string).collect();
        assert_eq!(vec!["a@example.com", "b@example.org", "a@example.com"], strings);
    }

    #[test]
    fn an_empty_batch_is_rejected() {
        let result = SendOtpRequest { emails: Vec::new() }.validated();
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn one_bad_entry_rejects_the_whole_batch() {
        let result = SendOtpRequest {
            emails: vec!["good@example.com".to_string(), "nonsense".to_string()],
        }
        .validated();
        match result {
            Err(Error::Validation(message)) => {
                assert!(message.contains("emails[1]"), "got: {message}");
                assert!(message.contains("nonsense"), "got: {message}");
            }
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn summaries_report_partial_failure() {
        let all_good = SendOtpResponse::summarise(vec!["a@example.com".to_string()], Vec::new());
        assert_eq!("OTP sent successfully to all provided emails", all_good.message);

        let partial = SendOtpResponse::summarise(
            vec!["a@example.com".to_string()],
            vec![FailedSend {
                email: "b@example.org".to_string(),
                error: "refused".to_string(),
            }],
        );
        assert_eq!("OTP delivery failed for 1 of 2 recipients", partial.message);
    }
}
