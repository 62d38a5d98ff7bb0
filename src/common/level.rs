// src/common/level.rs

use core::ops::Not;

/// Logic level of the serial line.
///
/// `High` is the idle (mark) level and also the Stop bit; `Low` is the Start bit.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Low,
    High,
}

impl Level {
    /// Idle / mark level of an asynchronous serial line.
    pub const IDLE: Level = Level::High;

    /// Maps a data bit onto the line (NRZ: 1 is HIGH, 0 is LOW).
    #[inline]
    pub const fn from_bit(bit: bool) -> Self {
        if bit {
            Level::High
        } else {
            Level::Low
        }
    }

    #[inline]
    pub const fn is_high(&self) -> bool {
        matches!(self, Level::High)
    }

    #[inline]
    pub const fn is_low(&self) -> bool {
        matches!(self, Level::Low)
    }

    #[inline]
    pub const fn as_bit(&self) -> u8 {
        match self {
            Level::Low => 0,
            Level::High => 1,
        }
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::IDLE
    }
}

impl Not for Level {
    type Output = Level;

    fn not(self) -> Self::Output {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

impl From<bool> for Level {
    fn from(value: bool) -> Self {
        Level::from_bit(value)
    }
}

impl From<Level> for bool {
    fn from(value: Level) -> Self {
        value.is_high()
    }
}

impl From<Level> for embedded_hal::digital::PinState {
    fn from(value: Level) -> Self {
        match value {
            Level::Low => embedded_hal::digital::PinState::Low,
            Level::High => embedded_hal::digital::PinState::High,
        }
    }
}

/// Data direction of a single pin.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// High impedance. Pins come out of reset this way.
    #[default]
    Input,
    Output,
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::digital::PinState;

    #[test]
    fn test_from_bit() {
        assert_eq!(Level::from_bit(true), Level::High);
        assert_eq!(Level::from_bit(false), Level::Low);
        assert_eq!(Level::from(true), Level::High);
        assert!(!bool::from(Level::Low));
    }

    #[test]
    fn test_idle_is_high() {
        assert_eq!(Level::default(), Level::High);
        assert!(Level::IDLE.is_high());
        assert_eq!(Direction::default(), Direction::Input);
    }

    #[test]
    fn test_not_and_bits() {
        assert_eq!(!Level::High, Level::Low);
        assert_eq!(!Level::Low, Level::High);
        assert_eq!(Level::High.as_bit(), 1);
        assert_eq!(Level::Low.as_bit(), 0);
    }

    #[test]
    fn test_pin_state_conversion() {
        assert_eq!(PinState::from(Level::High), PinState::High);
        assert_eq!(PinState::from(Level::Low), PinState::Low);
    }
}
