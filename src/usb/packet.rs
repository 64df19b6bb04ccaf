use std::convert::TryFrom;
use std::fmt;

use anyhow::{anyhow, Result};
use itertools::Itertools;
use log::{debug, warn};

use super::crc::crc16;
use super::layout::RecordKind;
use super::pid::{Category, Pid};
use super::record;
use crate::pipeline::{Event, Timebase};

/// Expected checksum next to the one found in the capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrcCheck<T> {
    pub expected: T,
    pub embedded: T,
}

impl<T: PartialEq> CrcCheck<T> {
    pub fn is_ok(&self) -> bool {
        self.expected == self.embedded
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    Reset {
        state: u32,
    },
    Sof {
        frame: u16,
        crc: CrcCheck<u8>,
    },
    Token {
        pid: Pid,
        address: u8,
        endpoint: u8,
        crc: CrcCheck<u8>,
    },
    Split {
        hub: u8,
        complete: bool,
        crc: CrcCheck<u8>,
    },
    HandShake(Pid),
    Data {
        pid: Pid,
        payload: Vec<u8>,
        /// `None` when less than 2 bytes were captured.
        crc: Option<CrcCheck<u16>>,
    },
    /// Reserved PID code.
    Unknown {
        pid: u8,
    },
    /// Valid PID stored in a record of the wrong kind.
    Mismatch {
        kind: RecordKind,
        pid: Pid,
    },
}

impl Packet {
    /// Decodes a record that does not carry payload words.
    ///
    /// DATA records get an empty payload, see [`Packet::data`].
    pub fn from_record(value: u32) -> Self {
        match record::kind(value) {
            RecordKind::Sof => Packet::Sof {
                frame: record::sof_frame(value),
                crc: CrcCheck {
                    expected: record::sof_crc5(value),
                    embedded: record::embedded_sof_crc5(value),
                },
            },
            RecordKind::Reset => Packet::Reset {
                state: record::rst_state(value),
            },
            RecordKind::Token => Self::token(value),
            RecordKind::Data => Self::data(value, &[]),
        }
    }

    fn token(value: u32) -> Self {
        let pid = match Pid::try_from(record::pid(value)) {
            Ok(pid) => pid,
            Err(pid) => return Packet::Unknown { pid },
        };
        let crc = CrcCheck {
            expected: record::token_crc5(value),
            embedded: record::embedded_token_crc5(value),
        };
        match pid.category() {
            Category::Token => Packet::Token {
                pid,
                address: record::token_device(value),
                endpoint: record::token_endpoint(value),
                crc,
            },
            Category::Special if pid == Pid::Split => Packet::Split {
                hub: record::split_hub_addr(value),
                complete: record::split_complete(value) == 1,
                crc,
            },
            Category::HandShake | Category::Special => Packet::HandShake(pid),
            Category::Data => Packet::Mismatch {
                kind: RecordKind::Token,
                pid,
            },
        }
    }

    /// Decodes a DATA record given the bytes captured after it, trailing CRC16
    /// included.
    pub fn data(value: u32, captured: &[u8]) -> Self {
        let pid = match Pid::try_from(record::pid(value)) {
            Ok(pid) if pid.category() == Category::Data => pid,
            Ok(pid) => {
                return Packet::Mismatch {
                    kind: RecordKind::Data,
                    pid,
                }
            }
            Err(pid) => return Packet::Unknown { pid },
        };
        let (payload, crc) = if captured.len() >= 2 {
            let (payload, tail) = captured.split_at(captured.len() - 2);
            let crc = CrcCheck {
                expected: crc16(payload),
                embedded: u16::from_le_bytes([tail[0], tail[1]]),
            };
            (payload.to_vec(), Some(crc))
        } else {
            (captured.to_vec(), None)
        };
        Packet::Data { pid, payload, crc }
    }

    /// False when a checksum in the packet does not match the capture.
    ///
    /// A data packet captured without its CRC16 has nothing to compare and is
    /// reported by [`Packet::is_malformed`] instead.
    pub fn crc_ok(&self) -> bool {
        match self {
            Packet::Sof { crc, .. } | Packet::Token { crc, .. } | Packet::Split { crc, .. } => {
                crc.is_ok()
            }
            Packet::Data { crc, .. } => crc.map(|crc| crc.is_ok()).unwrap_or(true),
            Packet::Reset { .. }
            | Packet::HandShake(_)
            | Packet::Unknown { .. }
            | Packet::Mismatch { .. } => true,
        }
    }

    /// True for records the capture could not have produced from a valid
    /// packet: reserved PIDs, kind/PID disagreements and data packets shorter
    /// than their CRC16.
    pub fn is_malformed(&self) -> bool {
        match self {
            Packet::Data { crc, .. } => crc.is_none(),
            Packet::Unknown { .. } | Packet::Mismatch { .. } => true,
            _ => false,
        }
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Packet::Reset { state } => write!(f, "RESET state={}", state),
            Packet::Sof { frame, .. } => write!(f, "SOF frame={}", frame),
            Packet::Token {
                pid,
                address,
                endpoint,
                ..
            } => write!(f, "{} addr={} ep={}", pid, address, endpoint),
            Packet::Split { hub, complete, .. } => write!(
                f,
                "SPLIT hub={} {}",
                hub,
                if *complete { "complete" } else { "start" }
            ),
            Packet::HandShake(pid) => write!(f, "{}", pid),
            Packet::Data { pid, payload, .. } => write!(
                f,
                "{} len={} [{}]",
                pid,
                payload.len(),
                payload
                    .iter()
                    .format_with(" ", |b, f| f(&format_args!("{:02X}", b)))
            ),
            Packet::Unknown { pid } => write!(f, "{}", super::pid::pid_str(*pid)),
            Packet::Mismatch { kind, pid } => write!(f, "{} record with {} PID", kind, pid),
        }
    }
}

/// Turns a stream of log words into timestamped packets.
pub struct PacketIterator<T> {
    it: T,
    timebase: Timebase,
    cycles: u64,
    stopped: bool,
}

impl<T> PacketIterator<T> {
    pub fn new(input: T, timebase: Timebase) -> Self {
        Self {
            it: input,
            timebase,
            cycles: 0,
            stopped: false,
        }
    }
}

impl<T> PacketIterator<T>
where
    T: Iterator<Item = Event<u32>>,
{
    fn read_payload(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(len + 3);
        while bytes.len() < len {
            match self.it.next() {
                Some((_, Ok(word))) => bytes.extend_from_slice(&word.to_le_bytes()),
                Some((_, Err(e))) => return Err(e),
                None => {
                    return Err(anyhow!(
                        "Truncated data packet: {} of {} bytes captured",
                        bytes.len(),
                        len
                    ))
                }
            }
        }
        bytes.truncate(len);
        Ok(bytes)
    }
}

impl<T> Iterator for PacketIterator<T>
where
    T: Iterator<Item = Event<u32>>,
{
    type Item = Event<Packet>;
    fn next(&mut self) -> Option<Self::Item> {
        if self.stopped {
            return None;
        }
        let value = match self.it.next()? {
            (_, Ok(value)) => value,
            (_, Err(e)) => {
                self.stopped = true;
                return Some((self.timebase.seconds(self.cycles), Err(e)));
            }
        };

        self.cycles += u64::from(record::cycle_delta(value));
        let ts = self.timebase.seconds(self.cycles);
        debug!("{:.9}: record {:08X}", ts, value);

        let packet = if record::kind(value) == RecordKind::Data {
            match self.read_payload(usize::from(record::data_length(value))) {
                Ok(captured) => Packet::data(value, &captured),
                Err(e) => {
                    self.stopped = true;
                    return Some((ts, Err(e)));
                }
            }
        } else {
            Packet::from_record(value)
        };

        if !packet.crc_ok() {
            warn!("{:.9}: CRC mismatch on {}", ts, packet);
        } else if packet.is_malformed() {
            warn!("{:.9}: malformed record {:08X}: {}", ts, value, packet);
        }
        Some((ts, Ok(packet)))
    }
}

pub trait PacketIteratorExt: Sized {
    fn into_packet(self, timebase: Timebase) -> PacketIterator<Self> {
        PacketIterator::new(self, timebase)
    }
}
impl<T> PacketIteratorExt for T where T: Iterator<Item = Event<u32>> {}
