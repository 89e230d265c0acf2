use rocket::{serde::json::Json, Route, State};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::mailer::SharedMailer;
use crate::model::api::otp::{FailedSend, SendOtpRequest, SendOtpResponse, VerifyOtpRequest};
use crate::model::api::ApiMessage;
use crate::model::otp::{Code, OtpRecord, SharedOtpStore, VerifyOutcome};

pub fn routes() -> Vec<Route> {
    routes![send_otp, verify_otp]
}

#[post("/send-otp", data = "<request>", format = "json")]
pub async fn send_otp(
    request: Json<SendOtpRequest>,
    store: &State<SharedOtpStore>,
    mailer: &State<SharedMailer>,
) -> Result<Json<SendOtpResponse>> {
    // The whole batch is validated up front; nothing is issued if any
    // entry is malformed.
    let recipients = request.into_inner().validated()?;

    let mut sent = Vec::new();
    let mut failed = Vec::new();
    for email in recipients {
        let code = Code::random();
        // Store before sending, so a code whose delivery report was lost
        // still verifies.
        store.issue(code, OtpRecord::new(email.clone())).await;
        match mailer.send_code(&email, &code).await {
            Ok(()) => {
                info!("Issued OTP to {email}");
                sent.push(email.to_string());
            }
            Err(err) => {
                warn!("Failed to deliver OTP to {email}: {err}");
                failed.push(FailedSend {
                    email: email.to_string(),
                    error: err.to_string(),
                });
            }
        }
    }

    Ok(Json(SendOtpResponse::summarise(sent, failed)))
}

#[post("/verify-otp", data = "<request>", format = "json")]
pub async fn verify_otp(
    request: Json<VerifyOtpRequest>,
    store: &State<SharedOtpStore>,
    config: &State<Config>,
) -> Result<Json<ApiMessage>> {
    // A submission that is not even six digits cannot be in the store.
    let code: Code = request.otp.parse().map_err(|_| Error::InvalidOtp)?;

    match store.verify(&code, config.otp_ttl()).await {
        VerifyOutcome::Verified(record) => {
            info!("Verified OTP for {}", record.email);
            Ok(Json(ApiMessage {
                message: "OTP verified successfully".to_string(),
            }))
        }
        VerifyOutcome::Expired(record) => {
            debug!("Rejected expired OTP for {}", record.email);
            Err(Error::ExpiredOtp)
        }
        VerifyOutcome::Unknown => {
            debug!("Rejected unknown OTP");
            Err(Error::InvalidOtp)
        }
    }
}
