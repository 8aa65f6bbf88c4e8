use log::{info, warn};

use crate::exchange::{self, Channel, ExchangeConfig, Outcome, TestCase};
use crate::Error;

/// Candidate UART devices on the Pi, in the order they are probed.
pub const DEFAULT_CANDIDATES: &[&str] = &["/dev/ttyAMA0", "/dev/serial0", "/dev/ttyAMA10"];

/// The result of one discovery-and-test attempt.
#[derive(Debug)]
pub struct LinkReport {
    /// The port the exchange actually ran on.
    pub port: String,
    /// One outcome per test case, in order.
    pub outcomes: Vec<Outcome>,
}

impl LinkReport {
    pub fn all_passed(&self) -> bool {
        exchange::all_passed(&self.outcomes)
    }
}

/// Tries each candidate port in order and runs the exchange loop against the
/// first one that opens.
///
/// Remaining candidates are never attempted once a port has opened, even if
/// the exchange reports failures on it. Returns [`Error::NoPortAvailable`]
/// when every candidate fails to open.
pub fn discover_and_run<C, F>(
    candidates: &[String],
    mut open: F,
    cases: &[TestCase],
    config: &ExchangeConfig,
) -> Result<LinkReport, Error>
where
    C: Channel,
    F: FnMut(&str) -> Result<C, Error>,
{
    for candidate in candidates {
        match open(candidate) {
            Ok(mut channel) => {
                info!("Opened serial port {}", candidate);

                let outcomes = exchange::run_exchange(&mut channel, cases, config);

                return Ok(LinkReport {
                    port: candidate.clone(),
                    outcomes,
                });
            }
            Err(err) => warn!("Skipping {}: {}", candidate, err),
        }
    }

    Err(Error::NoPortAvailable)
}
