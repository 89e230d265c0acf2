use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{Catcher, Request, Route};

use crate::error::ErrorBody;

mod common;
mod information;
mod instance;
mod otp;
mod public;
mod voting;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(otp::routes());
    routes.extend(instance::routes());
    routes.extend(public::routes());
    routes.extend(voting::routes());
    routes.extend(information::routes());
    routes
}

pub fn catchers() -> Vec<Catcher> {
    catchers![default_catcher]
}

/// Render rocket-level rejections (unknown routes, unparseable bodies)
/// in the same shape as our own errors.
#[catch(default)]
fn default_catcher(status: Status, _request: &Request<'_>) -> (Status, Json<ErrorBody>) {
    (
        status,
        Json(ErrorBody {
            message: status.reason_lossy().to_string(),
        }),
    )
}
