//! Bit layout of the sniffer's 32-bit log records.
//!
//! ```text
//!         31..30  29..24  23..0
//!  SOF    type    cycle   crc5[15:11] frame[10:0]
//!  RST    type    cycle   state[7:0]
//!  TOKEN  type    cycle   crc5[19:15] data[14:4] pid[3:0]
//!  DATA   type    cycle   length[16:4] pid[3:0]
//! ```
//!
//! A DATA record is followed by `ceil(length / 4)` payload words, bytes packed
//! little-endian. The length includes the two CRC16 bytes.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub shift: u32,
    pub mask: u32,
}

impl Field {
    pub const fn new(shift: u32, mask: u32) -> Self {
        Self { shift, mask }
    }

    pub const fn extract(self, value: u32) -> u32 {
        (value >> self.shift) & self.mask
    }

    /// Places `field` at this position, dropping the bits outside the mask.
    pub const fn insert(self, value: u32, field: u32) -> u32 {
        (value & !(self.mask << self.shift)) | ((field & self.mask) << self.shift)
    }
}

pub const CTRL_TYPE: Field = Field::new(30, 0x3);
pub const CTRL_CYCLE: Field = Field::new(24, 0x3F);

pub const SOF_FRAME: Field = Field::new(0, 0x7FF);
pub const SOF_CRC5: Field = Field::new(11, 0x1F);

pub const RST_STATE: Field = Field::new(0, 0xFF);

pub const TOKEN_PID: Field = Field::new(0, 0xF);
pub const TOKEN_DATA: Field = Field::new(4, 0x7FF);
pub const TOKEN_CRC5: Field = Field::new(15, 0x1F);

pub const SPLIT_DATA: Field = Field::new(4, 0x7FF);

pub const DATA_LEN: Field = Field::new(4, 0x1FFF);

pub const CTRL_TYPE_SOF: u32 = 0;
pub const CTRL_TYPE_RST: u32 = 1;
pub const CTRL_TYPE_TOKEN: u32 = 2;
pub const CTRL_TYPE_DATA: u32 = 3;

/// Discriminant of a record, from its `CTRL_TYPE` bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Sof,
    Reset,
    /// Tokens, handshakes, PRE/ERR and split tokens.
    Token,
    Data,
}

impl RecordKind {
    pub fn of(value: u32) -> Self {
        match CTRL_TYPE.extract(value) {
            CTRL_TYPE_SOF => RecordKind::Sof,
            CTRL_TYPE_RST => RecordKind::Reset,
            CTRL_TYPE_TOKEN => RecordKind::Token,
            _ => RecordKind::Data,
        }
    }

    pub fn ctrl_type(self) -> u32 {
        match self {
            RecordKind::Sof => CTRL_TYPE_SOF,
            RecordKind::Reset => CTRL_TYPE_RST,
            RecordKind::Token => CTRL_TYPE_TOKEN,
            RecordKind::Data => CTRL_TYPE_DATA,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            RecordKind::Sof => "SOF",
            RecordKind::Reset => "RST",
            RecordKind::Token => "TOKEN",
            RecordKind::Data => "DATA",
        })
    }
}
