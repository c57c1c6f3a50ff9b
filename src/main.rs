//! Binary entry point for **tcping**.
//!
//! * Parses CLI arguments and installs the logger.
//! * Runs the probing engine on a current-thread runtime.
//! * On **Windows**, requests a 1 ms system timer for the lifetime of the
//!   process so round trips are not quantised to the default tick.

use clap::Parser;
use log::LevelFilter;
use std::process::ExitCode;
use tcping_latency::{cli::Args, engine, error::Result};

#[cfg(windows)]
mod win_timer {
    #[link(name = "winmm")]
    unsafe extern "system" {
        fn timeBeginPeriod(period: u32) -> u32;
        fn timeEndPeriod(period: u32) -> u32;
    }

    /// Restores the default timer resolution on drop.
    pub struct Resolution(Option<u32>);

    pub fn request(period: u32) -> Resolution {
        // SAFETY: plain winmm call with no pointers involved.
        let granted = unsafe { timeBeginPeriod(period) } == 0;
        Resolution(granted.then_some(period))
    }

    impl Drop for Resolution {
        fn drop(&mut self) {
            if let Some(period) = self.0 {
                // SAFETY: paired with the successful timeBeginPeriod above.
                unsafe { timeEndPeriod(period) };
            }
        }
    }
}

fn init_logger(verbose: bool) {
    let default = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(default)
        .parse_default_env()
        .format_timestamp_millis()
        .init();
}

fn main() -> Result<ExitCode> {
    #[cfg(windows)]
    let _timer = win_timer::request(1);

    let args = Args::parse();
    init_logger(args.verbose);

    let exit_code = engine::run(args)?;
    Ok(if exit_code == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
