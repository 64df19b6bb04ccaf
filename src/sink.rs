use std::io::Write;

use colored::*;

use crate::pipeline::Event;
use crate::usb::packet::{CrcCheck, Packet};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub packets: u64,
    pub crc_errors: u64,
    /// Records that decoded into something no valid packet looks like.
    pub malformed: u64,
    pub errors: u64,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Filter {
    pub hide_sof: bool,
}

/// Writes one line per packet.
pub struct PrintSink<W> {
    out: W,
    filter: Filter,
    summary: Summary,
}

fn crc_note<T: PartialEq + std::fmt::UpperHex>(crc: &CrcCheck<T>, width: usize) -> String {
    if crc.is_ok() {
        String::new()
    } else {
        format!(
            " {} expected {:0w$X} got {:0w$X}",
            "CRC error".red().bold(),
            crc.expected,
            crc.embedded,
            w = width
        )
    }
}

fn colored_line(packet: &Packet) -> String {
    let text = packet.to_string();
    match packet {
        Packet::Reset { .. } => format!("{}", text.magenta().bold()),
        Packet::Sof { crc, .. } => format!("{}{}", text.dimmed(), crc_note(crc, 2)),
        Packet::Token { crc, .. } | Packet::Split { crc, .. } => {
            format!("{}{}", text.cyan(), crc_note(crc, 2))
        }
        Packet::HandShake(_) => format!("{}", text.green()),
        Packet::Data { crc: Some(crc), .. } => format!("{}{}", text, crc_note(crc, 4)),
        Packet::Data { crc: None, .. } => {
            format!("{} {}", text, "CRC missing".red().bold())
        }
        Packet::Unknown { .. } | Packet::Mismatch { .. } => format!("{}", text.yellow()),
    }
}

impl<W: Write> PrintSink<W> {
    pub fn new(out: W, filter: Filter) -> Self {
        Self {
            out,
            filter,
            summary: Summary::default(),
        }
    }

    pub fn write(&mut self, (ts, res): Event<Packet>) -> std::io::Result<()> {
        match res {
            Ok(packet) => {
                self.summary.packets += 1;
                if !packet.crc_ok() {
                    self.summary.crc_errors += 1;
                }
                if packet.is_malformed() {
                    self.summary.malformed += 1;
                }
                if self.filter.hide_sof && packet.crc_ok() {
                    if let Packet::Sof { .. } = packet {
                        return Ok(());
                    }
                }
                writeln!(self.out, "{:.9}: {}", ts, colored_line(&packet))
            }
            Err(e) => {
                self.summary.errors += 1;
                writeln!(self.out, "{:.9}: {} {:#}", ts, "Error".red().bold(), e)
            }
        }
    }

    /// Drains `events` into the output.
    pub fn run<I>(mut self, events: I) -> std::io::Result<Summary>
    where
        I: IntoIterator<Item = Event<Packet>>,
    {
        for event in events {
            self.write(event)?;
        }
        self.out.flush()?;
        Ok(self.summary)
    }
}
