#[macro_use]
extern crate rocket;

#[macro_use]
extern crate log;

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod mailer;
pub mod model;

use rocket::{Build, Rocket};

use crate::config::{ConfigFairing, MailerFairing, StorageFairing};
use crate::logging::LoggerFairing;
use crate::mailer::SharedMailer;
use crate::model::ledger::SharedLedger;
use crate::model::otp::{OtpSweeperFairing, SharedOtpStore};

/// Assemble the full server: routes, catchers and the standard fairing
/// stack.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .mount("/", api::routes())
        .register("/", api::catchers())
        .attach(ConfigFairing)
        .attach(StorageFairing)
        .attach(MailerFairing)
        .attach(OtpSweeperFairing)
        .attach(LoggerFairing)
}

/// Assemble a server around externally-built parts, skipping the
/// fairings that would construct them. Tests inject their own stores
/// and mailer through here.
pub fn rocket_for_parts(
    store: SharedOtpStore,
    ledger: SharedLedger,
    mailer: SharedMailer,
) -> Rocket<Build> {
    rocket::build()
        .mount("/", api::routes())
        .register("/", api::catchers())
        .attach(ConfigFairing)
        .manage(store)
        .manage(ledger)
        .manage(mailer)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use rocket::local::asynchronous::Client;

    use crate::mailer::stub::StubMailer;
    use crate::mailer::SharedMailer;
    use crate::model::ledger::{MemoryLedger, SharedLedger};
    use crate::model::otp::{MemoryOtpStore, SharedOtpStore};

    /// Handles on the state behind a test client.
    pub struct TestParts {
        pub store: SharedOtpStore,
        pub ledger: SharedLedger,
        pub mailer: Arc<StubMailer>,
    }

    /// A local client over a fully in-memory server whose stub mailer
    /// accepts everything.
    pub async fn client() -> (Client, TestParts) {
        client_with_mailer(StubMailer::default()).await
    }

    pub async fn client_with_mailer(mailer: StubMailer) -> (Client, TestParts) {
        let store: SharedOtpStore = Arc::new(MemoryOtpStore::default());
        let ledger: SharedLedger = Arc::new(MemoryLedger::default());
        let mailer = Arc::new(mailer);

        let rocket = crate::rocket_for_parts(
            Arc::clone(&store),
            Arc::clone(&ledger),
            Arc::clone(&mailer) as SharedMailer,
        );
        let client = Client::tracked(rocket)
            .await
            .expect("valid rocket instance");

        (
            client,
            TestParts {
                store,
                ledger,
                mailer,
            },
        )
    }
}
