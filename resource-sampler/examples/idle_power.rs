//! Sample idle power for a few seconds using whichever source is available
//!
//! Usage:
//!   sudo cargo run -p resource-sampler --example idle_power -- 5

use resource_sampler::{powermetrics, profile, rapl, PowerMetricsSummary, RaplSampler};
use std::env;
use std::thread;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let seconds: u64 = env::args()
        .nth(1)
        .map(|s| s.parse())
        .transpose()?
        .unwrap_or(5);
    let idle = || thread::sleep(Duration::from_secs(seconds));

    if powermetrics::is_available() {
        let (_, samples) = profile(PowerMetricsSummary::new(), idle)?;
        println!("{:#?}", powermetrics::aggregate(&samples));
    } else if rapl::is_available() {
        let (_, reading) = profile(RaplSampler::new(), idle)?;
        println!("{} uJ over {:?}", reading.energy_uj, reading.elapsed);
        println!("mW: {}", reading.power_mw());
    } else {
        println!("No power source available (needs root and powermetrics or RAPL)");
    }

    Ok(())
}
