use std::{future::Future, time::Duration};

use chrono::{Local, NaiveDate};
use engine::Engine;
use remote::HttpBackend;

use crate::busy::busy;

pub mod closing;
pub mod profit;
pub mod shift;
pub mod status;
pub mod topup;

/// What every command runs against.
pub struct Session {
    pub engine: Engine<HttpBackend>,
    pub loading_timeout: Duration,
}

impl Session {
    /// Business date of the device.
    pub fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    /// Runs a mutating call behind the busy indicator.
    pub async fn busy<F: Future>(&self, label: &str, fut: F) -> F::Output {
        busy(label, self.loading_timeout, fut).await
    }
}
