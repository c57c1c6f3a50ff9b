//! Pluggable output layer.

use crate::{
    cli::OutputMode,
    stats::{AttemptReport, ProbeResult},
};
use serde::Serialize;
use serde_json::to_string;
use std::cell::Cell;

/// Print behaviour contract.
pub trait Formatter {
    fn probe(&self, res: &AttemptReport);
    fn summary(&self, sum: &ProbeResult);
}

fn target(s: &ProbeResult) -> String {
    s.addr
        .map_or_else(|| "unresolved".to_owned(), |addr| addr.to_string())
}

fn print_json<T: Serialize>(value: &T) {
    match to_string(value) {
        Ok(line) => println!("{line}"),
        Err(err) => eprintln!("failed to encode JSON: {err}"),
    }
}

/* ---------- Normal text ---------- */

pub struct Normal;
impl Formatter for Normal {
    fn probe(&self, res: &AttemptReport) {
        match &res.error {
            None => println!(
                "Probing {}/tcp - open - {:.4} ms",
                res.addr, res.duration_ms
            ),
            Some(err) => println!("Probing {}/tcp - closed - {err}", res.addr),
        }
    }

    fn summary(&self, s: &ProbeResult) {
        println!(
            "\n--- {} tcping statistics ---
{} probes sent, {} successful, {:.2}% packet loss",
            target(s),
            s.total_count,
            s.success_count,
            s.loss_percent()
        );
        match s.average() {
            Some(avg) => println!(
                "Round-trip min/avg/max = {:.4}/{:.4}/{:.4} ms",
                s.best_ms, avg, s.worst_ms
            ),
            None => println!("Unreachable: {}", s.error),
        }
    }
}

/* ---------- JSON ---------- */

pub struct Json;
impl Formatter for Json {
    fn probe(&self, res: &AttemptReport) {
        print_json(res)
    }
    fn summary(&self, s: &ProbeResult) {
        print_json(s)
    }
}

/* ---------- CSV ---------- */

pub struct Csv;
impl Formatter for Csv {
    fn probe(&self, res: &AttemptReport) {
        let status = if res.success { "open" } else { "closed" };
        println!("{},{},{status},{:.4}", res.seq, res.addr, res.duration_ms);
    }

    fn summary(&self, s: &ProbeResult) {
        println!("address,total,success,failed,loss,min,avg,max,resolve,error");
        println!(
            "{},{},{},{},{:.2},{:.4},{:.4},{:.4},{:.4},\"{}\"",
            target(s),
            s.total_count,
            s.success_count,
            s.failed_count,
            s.loss_percent(),
            s.best_ms,
            s.avg_ms,
            s.worst_ms,
            s.resolve_time_ms,
            s.error.replace('"', "\"\"")
        );
    }
}

/* ---------- Markdown table ---------- */

pub struct Md {
    header_done: Cell<bool>,
}

impl Md {
    /// Construct a new Markdown formatter.
    pub fn new() -> Self {
        Self {
            header_done: Cell::new(false),
        }
    }
}

impl Default for Md {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for Md {
    fn probe(&self, res: &AttemptReport) {
        // print header once
        if !self.header_done.replace(true) {
            println!("| # | address | status | rtt_ms | error |");
            println!("|---|---------|--------|--------|-------|");
        }

        let status = if res.success { "✓" } else { "✗" };
        println!(
            "| {} | {} | {} | {:.4} | {} |",
            res.seq,
            res.addr,
            status,
            res.duration_ms,
            res.error.as_deref().unwrap_or("-")
        );
    }

    fn summary(&self, s: &ProbeResult) {
        println!("\n### Summary\n");
        println!("| field | value |");
        println!("|-------|-------|");
        println!("| address | {} |", target(s));
        println!("| total probes | {} |", s.total_count);
        println!("| success | {} |", s.success_count);
        println!("| loss % | {:.2} |", s.loss_percent());
        match s.average() {
            Some(avg) => println!(
                "| min / avg / max (ms) | {:.4} / {:.4} / {:.4} |",
                s.best_ms, avg, s.worst_ms
            ),
            None => println!("| error | {} |", s.error),
        }
        println!("| resolve time (ms) | {:.4} |\n", s.resolve_time_ms);
    }
}

/* ---------- ANSI-colored TTY ---------- */

pub struct Color;
impl Formatter for Color {
    fn probe(&self, res: &AttemptReport) {
        let reset = "\x1b[0m";
        match &res.error {
            None => println!(
                "Probing {}/tcp - \x1b[32mopen{reset} - {:.4} ms",
                res.addr, res.duration_ms
            ),
            Some(err) => println!("Probing {}/tcp - \x1b[31mclosed{reset} - {err}", res.addr),
        }
    }

    fn summary(&self, s: &ProbeResult) {
        let ok_color = "\x1b[32m";
        let bad_color = "\x1b[31m";
        let reset = "\x1b[0m";

        let color = if s.failed_count == 0 {
            ok_color
        } else {
            bad_color
        };
        println!(
            "\n--- {} tcping statistics ---\n\
{} probes sent, {} successful, {color}{:.2}%{reset} packet loss",
            target(s),
            s.total_count,
            s.success_count,
            s.loss_percent()
        );
        match s.average() {
            Some(avg) => println!(
                "Round-trip min/avg/max = {:.4}/{:.4}/{:.4} ms",
                s.best_ms, avg, s.worst_ms
            ),
            None => println!("{bad_color}Unreachable{reset}: {}", s.error),
        }
    }
}

/* ---------- Factory ---------- */

pub fn from_mode(mode: OutputMode) -> Box<dyn Formatter> {
    match mode {
        OutputMode::Normal => Box::new(Normal),
        OutputMode::Json => Box::new(Json),
        OutputMode::Csv => Box::new(Csv),
        OutputMode::Md => Box::new(Md::new()),
        OutputMode::Color => Box::new(Color),
    }
}
