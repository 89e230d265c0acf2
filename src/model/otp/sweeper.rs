//! Background sweep of expired passcodes.
//!
//! Verification already consumes stale codes on sight, so the sweep only
//! bounds memory growth from codes nobody ever tries.

use log::{debug, info, warn};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::{Orbit, Rocket};

use crate::config::Config;
use crate::model::otp::SharedOtpStore;

/// Spawns the periodic sweep once the server lifts off.
pub struct OtpSweeperFairing;

#[rocket::async_trait]
impl Fairing for OtpSweeperFairing {
    fn info(&self) -> Info {
        Info {
            name: "OTP Sweeper",
            kind: Kind::Liftoff,
        }
    }

    async fn on_liftoff(&self, rocket: &Rocket<Orbit>) {
        let (Some(config), Some(store)) = (
            rocket.state::<Config>(),
            rocket.state::<SharedOtpStore>().cloned(),
        ) else {
            warn!("OTP sweeper not started: config or store missing");
            return;
        };

        let ttl = config.otp_ttl();
        let period = match config.otp_sweep_interval().to_std() {
            Ok(period) if !period.is_zero() => period,
            _ => {
                info!("OTP sweep disabled by configuration");
                return;
            }
        };

        rocket::tokio::spawn(async move {
            let mut timer = rocket::tokio::time::interval(period);
            timer.tick().await; // The first tick completes immediately.
            loop {
                timer.tick().await;
                let swept = store.sweep_expired(ttl).await;
                if swept > 0 {
                    info!("Swept {swept} expired OTPs");
                } else {
                    debug!("OTP sweep found nothing to remove");
                }
            }
        });
    }
}
