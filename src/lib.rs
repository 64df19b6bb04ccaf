//! Decoder for the log records of a hardware USB sniffer.
//!
//! [`usb::record`] extracts protocol fields from a raw 32-bit record and
//! [`usb::crc`] computes the checksums they should carry. The rest is the
//! plumbing used by the `usb-log-convert` binary.

pub mod pipeline;
pub mod sink;
pub mod source;
pub mod usb;
