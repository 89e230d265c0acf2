use std::sync::Arc;

use chrono::Duration;
use lettre::Address;
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::mailer::{NullMailer, SharedMailer, SmtpMailer};
use crate::model::ledger::{MemoryLedger, SharedLedger};
use crate::model::otp::{MemoryOtpStore, SharedOtpStore};

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Deserialize)]
pub struct Config {
    // non-secrets
    #[serde(default = "default_otp_ttl_ms")]
    otp_ttl_ms: u32,
    #[serde(default = "default_otp_sweep_interval_secs")]
    otp_sweep_interval_secs: u32,
}

fn default_otp_ttl_ms() -> u32 {
    7_200_000
}

fn default_otp_sweep_interval_secs() -> u32 {
    300
}

impl Config {
    /// Valid lifetime of an OTP.
    pub fn otp_ttl(&self) -> Duration {
        Duration::milliseconds(self.otp_ttl_ms.into())
    }

    /// How often expired codes get swept out of the store.
    /// Zero disables the sweeper.
    pub fn otp_sweep_interval(&self) -> Duration {
        Duration::seconds(self.otp_sweep_interval_secs.into())
    }
}

/// A fairing that loads the application config and puts it in managed state.
/// This could easily be achieved using `AdHoc::config`, but is written out
/// explicitly for symmetry with the other fairings and control over error
/// messages.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        // Manage the state.
        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// A fairing that constructs the in-memory OTP store and voting ledger
/// and places both into managed state behind their shared handles.
pub struct StorageFairing;

#[rocket::async_trait]
impl Fairing for StorageFairing {
    fn info(&self) -> Info {
        Info {
            name: "Storage",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        let store: SharedOtpStore = Arc::new(MemoryOtpStore::default());
        let ledger: SharedLedger = Arc::new(MemoryLedger::default());
        info!("In-memory OTP store and voting ledger online");

        // Manage the state.
        rocket = rocket.manage(store).manage(ledger);
        Ok(rocket)
    }
}

/// Configuration for the outbound mail relay.
#[derive(Deserialize)]
struct MailConfig {
    // non-secrets
    smtp_host: Option<String>,
    mail_from: Option<String>,
    // secrets
    smtp_username: Option<String>,
    smtp_password: Option<String>,
}

/// A fairing that builds the SMTP mailer and places it into managed state.
/// All four mail keys must be present together; otherwise the server still
/// launches and every delivery attempt reports a not-configured failure.
pub struct MailerFairing;

#[rocket::async_trait]
impl Fairing for MailerFairing {
    fn info(&self) -> Info {
        Info {
            name: "Mailer",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<MailConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load mail config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        let mailer: SharedMailer = match (
            config.smtp_host,
            config.smtp_username,
            config.smtp_password,
            config.mail_from,
        ) {
            (Some(host), Some(username), Some(password), Some(from)) => {
                let from = match from.parse::<Address>() {
                    Ok(from) => from,
                    Err(e) => {
                        error!("Invalid mail_from address: {e}");
                        return Err(rocket);
                    }
                };
                let mailer = match SmtpMailer::new(&host, username, password, from) {
                    Ok(mailer) => mailer,
                    Err(e) => {
                        error!("Failed to build SMTP transport: {e}");
                        return Err(rocket);
                    }
                };
                info!("Loaded SMTP config, relaying via {host}");
                Arc::new(mailer)
            }
            _ => {
                warn!("SMTP configuration is incomplete, OTP delivery is disabled");
                Arc::new(NullMailer)
            }
        };

        // Manage the state.
        rocket = rocket.manage(mailer);
        Ok(rocket)
    }
}
