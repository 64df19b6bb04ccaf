use std::borrow::Cow;
use std::convert::TryFrom;
use std::fmt;

pub const PID_OUT: u8 = 0xE1;
pub const PID_IN: u8 = 0x69;
pub const PID_SOF: u8 = 0xA5;
pub const PID_SETUP: u8 = 0x2D;
pub const PID_PING: u8 = 0xB4;

pub const PID_DATA0: u8 = 0xC3;
pub const PID_DATA1: u8 = 0x4B;
pub const PID_DATA2: u8 = 0x87;
pub const PID_MDATA: u8 = 0x0F;

pub const PID_ACK: u8 = 0xD2;
pub const PID_NAK: u8 = 0x5A;
pub const PID_STALL: u8 = 0x1E;
pub const PID_NYET: u8 = 0x96;

pub const PID_PRE: u8 = 0x3C;
pub const PID_SPLIT: u8 = 0x78;

/// Expands a 4-bit PID code into the byte seen on the wire: the upper nibble
/// is the complement of the code.
pub fn expand(code: u8) -> u8 {
    let code = code & 0x0F;
    code | (!(code << 4) & 0xF0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Token,
    Data,
    HandShake,
    Special,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pid {
    Out,
    In,
    Sof,
    Setup,
    Ping,
    Data0,
    Data1,
    Data2,
    MData,
    Ack,
    Nak,
    Stall,
    NYet,
    /// PRE on full-speed captures, ERR on high-speed ones. Both are
    /// `PID_PRE` on the wire.
    PreErr,
    Split,
}

impl Pid {
    pub const ALL: [Pid; 15] = [
        Pid::Out,
        Pid::In,
        Pid::Sof,
        Pid::Setup,
        Pid::Ping,
        Pid::Data0,
        Pid::Data1,
        Pid::Data2,
        Pid::MData,
        Pid::Ack,
        Pid::Nak,
        Pid::Stall,
        Pid::NYet,
        Pid::PreErr,
        Pid::Split,
    ];

    pub fn byte(self) -> u8 {
        match self {
            Pid::Out => PID_OUT,
            Pid::In => PID_IN,
            Pid::Sof => PID_SOF,
            Pid::Setup => PID_SETUP,
            Pid::Ping => PID_PING,
            Pid::Data0 => PID_DATA0,
            Pid::Data1 => PID_DATA1,
            Pid::Data2 => PID_DATA2,
            Pid::MData => PID_MDATA,
            Pid::Ack => PID_ACK,
            Pid::Nak => PID_NAK,
            Pid::Stall => PID_STALL,
            Pid::NYet => PID_NYET,
            Pid::PreErr => PID_PRE,
            Pid::Split => PID_SPLIT,
        }
    }

    /// 4-bit code, as stored in log records.
    pub fn code(self) -> u8 {
        self.byte() & 0x0F
    }

    pub fn category(self) -> Category {
        match self {
            Pid::Out | Pid::In | Pid::Sof | Pid::Setup | Pid::Ping => Category::Token,
            Pid::Data0 | Pid::Data1 | Pid::Data2 | Pid::MData => Category::Data,
            Pid::Ack | Pid::Nak | Pid::Stall | Pid::NYet => Category::HandShake,
            Pid::PreErr | Pid::Split => Category::Special,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Pid::Out => "OUT",
            Pid::In => "IN",
            Pid::Sof => "SOF",
            Pid::Setup => "SETUP",
            Pid::Ping => "PING",
            Pid::Data0 => "DATA0",
            Pid::Data1 => "DATA1",
            Pid::Data2 => "DATA2",
            Pid::MData => "MDATA",
            Pid::Ack => "ACK",
            Pid::Nak => "NAK",
            Pid::Stall => "STALL",
            Pid::NYet => "NYET",
            Pid::PreErr => "PRE/ERR",
            Pid::Split => "SPLIT",
        }
    }
}

impl TryFrom<u8> for Pid {
    type Error = u8;
    fn try_from(pid: u8) -> Result<Self, Self::Error> {
        Pid::ALL
            .iter()
            .copied()
            .find(|p| p.byte() == pid)
            .ok_or(pid)
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Mnemonic of a PID byte, `UNKNOWN XX` for reserved or malformed values.
pub fn pid_str(pid: u8) -> Cow<'static, str> {
    match Pid::try_from(pid) {
        Ok(pid) => Cow::Borrowed(pid.mnemonic()),
        Err(pid) => Cow::Owned(format!("UNKNOWN {:02X}", pid)),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn expansion_complements_upper_nibble() {
        for code in 0..16u8 {
            let pid = expand(code);
            assert_eq!(pid & 0x0F, code);
            assert_eq!(pid >> 4, !code & 0x0F);
        }
    }

    #[test]
    fn expansion_matches_wire_pids() {
        for pid in Pid::ALL.iter() {
            assert_eq!(expand(pid.code()), pid.byte(), "{}", pid);
        }
    }

    #[test]
    fn known_mnemonics() {
        #[rustfmt::skip]
        let expected = [
            (0xE1, "OUT"), (0x69, "IN"), (0xA5, "SOF"), (0x2D, "SETUP"), (0xB4, "PING"),
            (0xC3, "DATA0"), (0x4B, "DATA1"), (0x87, "DATA2"), (0x0F, "MDATA"),
            (0xD2, "ACK"), (0x5A, "NAK"), (0x1E, "STALL"), (0x96, "NYET"),
            (0x3C, "PRE/ERR"), (0x78, "SPLIT"),
        ];
        for &(pid, name) in expected.iter() {
            assert_eq!(pid_str(pid), name);
        }
    }

    #[test]
    fn unknown_pids_are_formatted() {
        assert_eq!(pid_str(0xF0), "UNKNOWN F0");
        assert_eq!(pid_str(0x00), "UNKNOWN 00");
        // reserved code 0 expands to F0
        assert_eq!(pid_str(expand(0)), "UNKNOWN F0");
        // PID byte with a broken check nibble
        assert_eq!(pid_str(0x2C), "UNKNOWN 2C");
    }

    #[test]
    fn mapping_is_total() {
        let mut known = 0;
        for pid in 0..=255u8 {
            let s = pid_str(pid);
            assert!(!s.is_empty());
            if Pid::try_from(pid).is_ok() {
                known += 1;
            } else {
                assert_eq!(s, format!("UNKNOWN {:02X}", pid));
            }
        }
        assert_eq!(known, 15);
    }

    #[test]
    fn categories() {
        assert_eq!(Pid::Sof.category(), Category::Token);
        assert_eq!(Pid::MData.category(), Category::Data);
        assert_eq!(Pid::NYet.category(), Category::HandShake);
        assert_eq!(Pid::Split.category(), Category::Special);
        assert_eq!(Pid::Setup.to_string(), "SETUP");
    }
}
