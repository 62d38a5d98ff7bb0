// src/common/frame.rs

use super::error::FrameError;
use super::level::Level;

/// Serial frame formats the transmitter can emit.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameFormat {
    /// 8 data bits, no parity, 1 stop bit. NRZ, idle HIGH, LSB first.
    Async8N1,
}

impl FrameFormat {
    pub const fn data_bits(&self) -> u8 {
        match self {
            FrameFormat::Async8N1 => 8,
        }
    }

    pub const fn stop_bits(&self) -> u8 {
        match self {
            FrameFormat::Async8N1 => 1,
        }
    }

    /// Start + data + stop (no parity).
    pub const fn bits_per_frame(&self) -> u8 {
        1 + self.data_bits() + self.stop_bits()
    }
}

/// Number of bit periods in one 8N1 frame.
pub const FRAME_BITS: usize = FrameFormat::Async8N1.bits_per_frame() as usize;

/// Position of the transmitter within a frame.
///
/// Transitions are strictly sequential: `Idle -> Start -> Data(0) .. Data(7) -> Stop -> Idle`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameState {
    #[default]
    Idle,
    Start,
    /// Data bit index, 0 (LSB) to 7 (MSB).
    Data(u8),
    Stop,
}

impl FrameState {
    pub const fn next(self) -> FrameState {
        match self {
            FrameState::Idle => FrameState::Start,
            FrameState::Start => FrameState::Data(0),
            FrameState::Data(7) => FrameState::Stop,
            FrameState::Data(i) => FrameState::Data(i + 1),
            FrameState::Stop => FrameState::Idle,
        }
    }

    /// Bit periods completed once this state has been entered.
    pub const fn bits_before(self) -> u8 {
        match self {
            FrameState::Idle | FrameState::Start => 0,
            FrameState::Data(i) => 1 + i,
            FrameState::Stop => 9,
        }
    }
}

/// One byte laid out as the ten line levels it occupies on the wire.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Frame(u8);

impl Frame {
    #[inline]
    pub const fn new(value: u8) -> Self {
        Frame(value)
    }

    #[inline]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Level of data bit `index` (0 = LSB).
    #[inline]
    pub const fn data_level(&self, index: u8) -> Level {
        Level::from_bit((self.0 >> index) & 0b0000_0001 != 0)
    }

    /// Levels in transmission order: Start, 8 data bits LSB first, Stop.
    pub fn levels(&self) -> [Level; FRAME_BITS] {
        let mut out = [Level::High; FRAME_BITS];
        out[0] = Level::Low;
        for (index, slot) in out[1..9].iter_mut().enumerate() {
            *slot = self.data_level(index as u8);
        }
        out
    }

    /// Rebuilds a byte from the ten levels a receiver sampled at mid-bit.
    pub fn decode(levels: &[Level; FRAME_BITS]) -> Result<u8, FrameError> {
        if levels[0] != Level::Low {
            return Err(FrameError::MissingStartBit);
        }
        if levels[FRAME_BITS - 1] != Level::High {
            return Err(FrameError::MissingStopBit);
        }
        let value = levels[1..9]
            .iter()
            .enumerate()
            .fold(0u8, |acc, (index, level)| acc | (level.as_bit() << index));
        Ok(value)
    }
}

impl From<u8> for Frame {
    fn from(value: u8) -> Self {
        Frame::new(value)
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::level::Level::{High as H, Low as L};

    #[test]
    fn test_format_bit_counts() {
        assert_eq!(FrameFormat::Async8N1.bits_per_frame() as usize, FRAME_BITS);
    }

    #[test]
    fn test_levels_boundaries() {
        assert_eq!(Frame::new(0x00).levels(), [L, L, L, L, L, L, L, L, L, H]);
        assert_eq!(Frame::new(0xFF).levels(), [L, H, H, H, H, H, H, H, H, H]);
    }

    #[test]
    fn test_levels_lsb_first() {
        // 0b1011_0100 goes out as 0,0,1,0,1,1,0,1
        assert_eq!(Frame::new(180).levels(), [L, L, L, H, L, H, H, L, H, H]);
    }

    #[test]
    fn test_decode_all_values() {
        for value in 0..=255u8 {
            assert_eq!(Frame::decode(&Frame::new(value).levels()), Ok(value));
        }
    }

    #[test]
    fn test_decode_framing_errors() {
        let mut levels = Frame::new(0x41).levels();
        levels[0] = H;
        assert_eq!(Frame::decode(&levels), Err(FrameError::MissingStartBit));

        let brk = [L; FRAME_BITS];
        assert_eq!(Frame::decode(&brk), Err(FrameError::MissingStopBit));
    }

    #[test]
    fn test_state_sequence() {
        let mut state = FrameState::Idle;
        let mut visited = 0;
        loop {
            state = state.next();
            visited += 1;
            if state == FrameState::Idle {
                break;
            }
        }
        // Start, 8 data, Stop, back to Idle
        assert_eq!(visited, FRAME_BITS + 1);
        assert_eq!(FrameState::Data(7).next(), FrameState::Stop);
        assert_eq!(FrameState::Stop.bits_before(), 9);
        assert_eq!(FrameState::Data(0).bits_before(), 1);
    }
}
