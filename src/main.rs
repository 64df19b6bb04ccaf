use std::io::{self, Read};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{value_t, App, Arg};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;

use usb_log_convert::pipeline::Timebase;
use usb_log_convert::sink::{Filter, PrintSink};
use usb_log_convert::source::capture::LogWordIterator;
use usb_log_convert::usb::packet::PacketIteratorExt;

fn spinner() -> Result<ProgressBar> {
    // display something while processing
    let progress_bar = ProgressBar::new_spinner();
    progress_bar.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
            .template(" {spinner} {msg}")?,
    );
    progress_bar.set_message("Processing records");
    progress_bar.enable_steady_tick(Duration::from_millis(80));
    Ok(progress_bar)
}

fn main() -> Result<()> {
    env_logger::init();

    let matches = App::new("usb-log-convert")
        .about("Decodes USB sniffer captures and checks their CRCs")
        .args(&[
            Arg::from_usage("-f, --freq [freq] 'Sniffer clock frequency in Hz'")
                .default_value("60000000"),
            Arg::from_usage("--hide-sof 'Do not print SOF packets with a valid CRC'"),
            Arg::from_usage("--no-progress 'Do not display a spinner while reading'"),
            Arg::from_usage("--color 'Force coloured output'"),
            Arg::with_name("file")
                .help("Capture file, '-' reads from stdin.")
                .required(true),
        ])
        .get_matches();

    if matches.is_present("color") {
        colored::control::set_override(true);
    }

    let freq = value_t!(matches, "freq", f64).unwrap_or_else(|e| e.exit());
    let timebase = Timebase::try_new(freq)?;
    let filter = Filter {
        hide_sof: matches.is_present("hide-sof"),
    };

    let path = matches.value_of("file").context("Fetching file argument")?;
    let input: Box<dyn Read> = if path == "-" {
        Box::new(io::stdin())
    } else {
        Box::new(io::BufReader::new(
            std::fs::File::open(path).with_context(|| format!("Opening capture file {}", path))?,
        ))
    };

    let mut words = LogWordIterator::new(input);
    if !matches.is_present("no-progress") && path != "-" {
        words = words.with_progress(spinner()?);
    }

    info!("Decoding {} at {} Hz", path, timebase.freq());
    let stdout = io::stdout();
    let summary = PrintSink::new(stdout.lock(), filter).run(words.into_packet(timebase))?;
    info!(
        "{} packets, {} CRC errors, {} malformed records, {} decode errors",
        summary.packets, summary.crc_errors, summary.malformed, summary.errors
    );

    if summary.crc_errors != 0 {
        eprintln!(
            "{} {} packet(s) failed their CRC check",
            "Warning".yellow().bold(),
            summary.crc_errors
        );
    }
    Ok(())
}
