use std::io::{self, Write};

use serde::Serialize;

use crate::app::{FetchReport, ProgressEvent, ProgressSink};

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Interactive,
    NonInteractive,
}

/// Plain progress lines on stdout.
pub struct ConsoleOutput;

impl ConsoleOutput {
    pub fn print_summary(report: &FetchReport) {
        println!(
            "{} downloaded, {} with nothing to download ({} targets)",
            report.count("downloaded"),
            report.count("nothing-to-download"),
            report.items.len()
        );
    }

    pub fn print_plan(report: &FetchReport) {
        println!("Files to download:");
        for item in &report.items {
            println!("{}", item.url);
        }
    }
}

impl ProgressSink for ConsoleOutput {
    fn event(&self, event: ProgressEvent) {
        match event.elapsed {
            Some(elapsed) => println!("{} in {:.1}s", event.message, elapsed.as_secs_f64()),
            None => println!("{}", event.message),
        }
    }
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_report(report: &FetchReport) -> io::Result<()> {
        Self::print_json(report)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}
