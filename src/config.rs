use std::path::PathBuf;

pub const DEFAULT_DEVICE: &str = "/dev/hidraw0";
pub const DEFAULT_UPDATE_INTERVAL_SECS: u64 = 10;
pub const MAX_POLL_ATTEMPTS: usize = 10;
/// Consecutive empty poll results before a warning is logged.
pub const EMPTY_POLL_WARN_THRESHOLD: u32 = 6;
/// How long shutdown waits for a device read still blocked in the pool.
pub const SHUTDOWN_GRACE_SECS: u64 = 1;

#[derive(clap::Parser, Debug, Clone)]
#[command(name = "airco2ntrol", version, about)]
pub struct Config {
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
    /// hidraw node of the sensor.
    #[arg(long, default_value = DEFAULT_DEVICE)]
    pub device: PathBuf,
    /// Seconds between poll cycles.
    #[arg(long, default_value_t = DEFAULT_UPDATE_INTERVAL_SECS, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,
    /// Give up on a poll cycle after this many seconds.
    #[arg(long)]
    pub poll_timeout: Option<u64>,
    /// Poll once, print the readings and exit.
    #[arg(long)]
    pub once: bool,
    /// Print readings as JSON lines.
    #[arg(long)]
    pub json: bool,
}
