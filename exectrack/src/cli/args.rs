//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::tracking::{DEFAULT_INTERVAL_SECS, DEFAULT_OBJECT_PATH};

#[derive(Parser, Debug)]
#[command(
    name = "exectrack",
    about = "Count process executions per PID with an eBPF tracepoint",
    after_help = "\
EXAMPLES:
    sudo exectrack                           Poll every 2 seconds
    sudo exectrack --interval 5              Poll every 5 seconds
    sudo exectrack --programs                List loaded BPF programs
    sudo exectrack --maps 42                 List maps of program 42"
)]
pub struct Args {
    /// Seconds between map reads
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_INTERVAL_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval: u64,

    /// Compiled eBPF object to load
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_OBJECT_PATH)]
    pub object: PathBuf,

    /// List BPF programs loaded in the kernel and exit
    #[arg(long, conflicts_with = "maps")]
    pub programs: bool,

    /// List the maps of a loaded BPF program and exit
    #[arg(long, value_name = "PROGRAM_ID")]
    pub maps: Option<u32>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Poll period as a [`Duration`].
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["exectrack"]).unwrap();
        assert_eq!(args.poll_interval(), Duration::from_secs(2));
        assert_eq!(args.object, PathBuf::from(DEFAULT_OBJECT_PATH));
        assert!(!args.programs);
        assert!(args.maps.is_none());
    }

    #[test]
    fn test_interval_must_be_positive() {
        assert!(Args::try_parse_from(["exectrack", "--interval", "0"]).is_err());
        assert!(Args::try_parse_from(["exectrack", "--interval", "-3"]).is_err());
        let args = Args::try_parse_from(["exectrack", "-i", "7"]).unwrap();
        assert_eq!(args.interval, 7);
    }

    #[test]
    fn test_listing_modes_conflict() {
        assert!(Args::try_parse_from(["exectrack", "--programs", "--maps", "3"]).is_err());
    }
}
