//! Field accessors over raw log records.
//!
//! Each accessor only makes sense for the record kind it is named after, the
//! caller is expected to have checked [`kind`] first.

use super::crc::crc5;
use super::layout::{self, RecordKind};
use super::pid;

pub fn kind(value: u32) -> RecordKind {
    RecordKind::of(value)
}

/// Wire PID byte of a TOKEN or DATA record.
pub fn pid(value: u32) -> u8 {
    pid::expand(layout::TOKEN_PID.extract(value) as u8)
}

/// Clock cycles since the previous record, already scaled by 256.
pub fn cycle_delta(value: u32) -> u16 {
    (layout::CTRL_CYCLE.extract(value) << 8) as u16
}

/// Reset state of a RST record, scaled by 256.
pub fn rst_state(value: u32) -> u32 {
    layout::RST_STATE.extract(value) << 8
}

fn token_data(value: u32) -> u16 {
    layout::TOKEN_DATA.extract(value) as u16
}

pub fn token_device(value: u32) -> u8 {
    (token_data(value) & 0x7F) as u8
}

pub fn token_endpoint(value: u32) -> u8 {
    ((token_data(value) >> 7) & 0xF) as u8
}

/// Expected CRC5 of a token record's address and endpoint.
pub fn token_crc5(value: u32) -> u8 {
    crc5(token_data(value))
}

/// CRC5 captured along with a token record.
pub fn embedded_token_crc5(value: u32) -> u8 {
    layout::TOKEN_CRC5.extract(value) as u8
}

pub fn sof_frame(value: u32) -> u16 {
    layout::SOF_FRAME.extract(value) as u16
}

/// Expected CRC5 of a SOF record's frame number.
pub fn sof_crc5(value: u32) -> u8 {
    crc5(sof_frame(value))
}

pub fn embedded_sof_crc5(value: u32) -> u8 {
    layout::SOF_CRC5.extract(value) as u8
}

/// Captured byte count of a DATA record, CRC16 included.
pub fn data_length(value: u32) -> u16 {
    layout::DATA_LEN.extract(value) as u16
}

fn split_data(value: u32) -> u16 {
    layout::SPLIT_DATA.extract(value) as u16
}

pub fn split_hub_addr(value: u32) -> u8 {
    (split_data(value) & 0x7F) as u8
}

/// 1 for a complete-split, 0 for a start-split.
pub fn split_complete(value: u32) -> u8 {
    ((split_data(value) >> 7) & 0x1) as u8
}

#[cfg(test)]
pub(crate) mod build {
    //! Record encoders used by the tests of this crate.
    use super::super::crc::crc5;
    use super::super::layout::*;

    pub fn sof(cycle: u32, frame: u16) -> u32 {
        let v = CTRL_TYPE.insert(0, CTRL_TYPE_SOF);
        let v = CTRL_CYCLE.insert(v, cycle);
        let v = SOF_FRAME.insert(v, frame.into());
        SOF_CRC5.insert(v, crc5(frame & 0x7FF).into())
    }

    pub fn reset(cycle: u32, state: u32) -> u32 {
        let v = CTRL_TYPE.insert(0, CTRL_TYPE_RST);
        let v = CTRL_CYCLE.insert(v, cycle);
        RST_STATE.insert(v, state)
    }

    pub fn token(cycle: u32, pid: u8, address: u8, endpoint: u8) -> u32 {
        let data = u16::from(address & 0x7F) | (u16::from(endpoint & 0xF) << 7);
        let v = CTRL_TYPE.insert(0, CTRL_TYPE_TOKEN);
        let v = CTRL_CYCLE.insert(v, cycle);
        let v = TOKEN_PID.insert(v, pid.into());
        let v = TOKEN_DATA.insert(v, data.into());
        TOKEN_CRC5.insert(v, crc5(data).into())
    }

    pub fn split(cycle: u32, hub: u8, complete: bool) -> u32 {
        let data = u16::from(hub & 0x7F) | (u16::from(complete) << 7);
        let v = CTRL_TYPE.insert(0, CTRL_TYPE_TOKEN);
        let v = CTRL_CYCLE.insert(v, cycle);
        let v = TOKEN_PID.insert(v, 0x8);
        let v = SPLIT_DATA.insert(v, data.into());
        TOKEN_CRC5.insert(v, crc5(data).into())
    }

    pub fn handshake(cycle: u32, pid: u8) -> u32 {
        let v = CTRL_TYPE.insert(0, CTRL_TYPE_TOKEN);
        let v = CTRL_CYCLE.insert(v, cycle);
        TOKEN_PID.insert(v, pid.into())
    }

    /// Header word followed by the payload words.
    pub fn data(cycle: u32, pid: u8, bytes: &[u8]) -> Vec<u32> {
        let v = CTRL_TYPE.insert(0, CTRL_TYPE_DATA);
        let v = CTRL_CYCLE.insert(v, cycle);
        let v = TOKEN_PID.insert(v, pid.into());
        let v = DATA_LEN.insert(v, bytes.len() as u32);
        let mut words = vec![v];
        words.extend(bytes.chunks(4).map(|chunk| {
            let mut word = [0; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            u32::from_le_bytes(word)
        }));
        words
    }
}
