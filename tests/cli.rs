//! Basic flag parsing tests.

use clap::Parser;
use tcping_latency::cli::{Args, OutputMode};

#[test]
fn parse_basic() {
    let a = Args::parse_from(["tcping", "127.0.0.1:80", "-c", "5"]);
    assert_eq!(a.address, "127.0.0.1:80");
    assert_eq!(a.count, 5);
    assert_eq!(a.timeout_ms, 5000);
    assert!(!a.verbose);
    assert_eq!(a.output_mode, OutputMode::Normal);
}

#[test]
fn default_count_is_four() {
    let a = Args::parse_from(["tcping", "example.com:443"]);
    assert_eq!(a.count, 4);
}

#[test]
fn output_mode_json() {
    let a = Args::parse_from(["tcping", "127.0.0.1:80", "-o", "json"]);
    assert_eq!(a.output_mode, OutputMode::Json);
}

#[test]
fn verbose_flag() {
    let a = Args::parse_from(["tcping", "[::1]:22", "-v"]);
    assert!(a.verbose);
}

#[test]
fn reject_zero_count() {
    let err = Args::try_parse_from(["tcping", "127.0.0.1:80", "-c", "0"]).unwrap_err();
    assert!(err.to_string().contains(">= 1"));
}

#[test]
fn reject_zero_timeout() {
    let err = Args::try_parse_from(["tcping", "127.0.0.1:80", "--timeout-ms", "0"]).unwrap_err();
    assert!(err.to_string().contains(">= 1"));
}
