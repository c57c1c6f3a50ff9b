//! Argument parsing layer (clap).

use anyhow::{Context, anyhow, bail};
use clap::{Parser, ValueEnum};

/// Global CLI arguments.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Target in the form `<host:port>` (`[v6]:port` for IPv6 literals)
    pub address: String,

    /// Number of concurrent connect attempts (`-c`)
    #[arg(short, long, default_value_t = 4, value_parser = at_least_one_u32)]
    pub count: u32,

    /// Output format (`-o`)
    #[arg(
        short = 'o',
        long,
        value_enum,
        default_value_t = OutputMode::Normal,
        help = "normal | json | csv | md | color"
    )]
    pub output_mode: OutputMode,

    /// Socket-level connect timeout per attempt (ms)
    #[arg(long, default_value_t = 5000, value_parser = at_least_one_u64)]
    pub timeout_ms: u64,

    /// Log probe internals to stderr (`-v`)
    #[arg(short, long)]
    pub verbose: bool,
}

/// Supported output modes.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputMode {
    Normal,
    Json,
    Csv,
    Md,    // Markdown
    Color, // ANSI-colored TTY
}

fn at_least_one_u32(s: &str) -> Result<u32, String> {
    match s.parse::<u32>() {
        Ok(0) => Err("value must be >= 1".into()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn at_least_one_u64(s: &str) -> Result<u64, String> {
    match s.parse::<u64>() {
        Ok(0) => Err("value must be >= 1".into()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

/// Split `<host:port>` into its parts without resolving anything.
pub fn split_target(address: &str) -> anyhow::Result<(String, u16)> {
    let (host, port) = address
        .rsplit_once(':')
        .ok_or_else(|| anyhow!("missing port in `{address}`, expected <host:port>"))?;

    let host = match host.strip_prefix('[') {
        Some(v6) => v6
            .strip_suffix(']')
            .ok_or_else(|| anyhow!("unterminated `[` in `{address}`"))?,
        None if host.contains(':') => {
            bail!("IPv6 targets must be bracketed, e.g. `[{host}]:{port}`")
        }
        None => host,
    };
    if host.is_empty() {
        bail!("missing host in `{address}`");
    }

    let port = port
        .parse::<u16>()
        .with_context(|| format!("invalid port `{port}`"))?;
    if port == 0 {
        bail!("port cannot be 0");
    }
    Ok((host.to_owned(), port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_host_and_port() {
        assert_eq!(
            split_target("example.com:443").unwrap(),
            ("example.com".to_owned(), 443)
        );
        assert_eq!(split_target("[::1]:22").unwrap(), ("::1".to_owned(), 22));
    }

    #[test]
    fn rejects_malformed_targets() {
        assert!(split_target("example.com").is_err());
        assert!(split_target("::1:22").is_err());
        assert!(split_target(":80").is_err());
        assert!(split_target("host:0").is_err());
        assert!(split_target("host:http").is_err());
    }
}
