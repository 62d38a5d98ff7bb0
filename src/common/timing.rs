// src/common/timing.rs

use super::error::ConfigError;
use core::time::Duration;

// Reference calibration is 104 us for Start/Stop and 103 us per data bit.
// The 1 us difference absorbs the data loop's per-iteration overhead on the
// original 48 MHz target and must be re-derived for any other target.

/// Default baud rate.
pub const BAUD_9600: u32 = 9600;

/// Start/Stop bit delay of the reference calibration.
pub const REFERENCE_FRAME_BIT: Duration = Duration::from_micros(104);
/// Data-bit delay of the reference calibration.
pub const REFERENCE_DATA_BIT: Duration = Duration::from_micros(103);

/// Receiver tolerance for asynchronous serial, +/- 2 %.
pub const DEFAULT_TOLERANCE_PPM: u32 = 20_000;

/// Settling time after switching the sampled input before converting.
pub const ACQUISITION_SETTLE: Duration = Duration::from_micros(200);
/// Pause between samples in the host loop.
pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

/// Break length used when a frame is aborted: one whole frame of spacing.
pub const ABORT_BREAK_BITS: u32 = 10;

const NANOS_PER_SEC: u32 = 1_000_000_000;

/// Delays used to hold each bit on the line.
///
/// `frame_bit_ns` is held for Start and Stop, `data_bit_ns` for each data bit.
/// On real hardware the effective data period is `data_bit_ns` plus the loop
/// overhead, which is why the two may differ.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BitTiming {
    baud: u32,
    frame_bit_ns: u32,
    data_bit_ns: u32,
}

impl BitTiming {
    /// 9600 bps with the 104 / 103 us reference delays.
    pub const REFERENCE_9600: BitTiming = BitTiming {
        baud: BAUD_9600,
        frame_bit_ns: REFERENCE_FRAME_BIT.as_nanos() as u32,
        data_bit_ns: REFERENCE_DATA_BIT.as_nanos() as u32,
    };

    /// Nominal bit period for `baud`, rounded to the nearest nanosecond.
    pub fn bit_period_ns(baud: u32) -> Result<u32, ConfigError> {
        if baud == 0 {
            return Err(ConfigError::ZeroBaud);
        }
        Ok((NANOS_PER_SEC + baud / 2) / baud)
    }

    /// Same delay for every bit. Right for targets where the loop cost is negligible.
    pub fn uniform(baud: u32) -> Result<Self, ConfigError> {
        Self::calibrated(baud, 0)
    }

    /// Shortens the data-bit delay by the measured per-iteration loop overhead.
    pub fn calibrated(baud: u32, loop_overhead_ns: u32) -> Result<Self, ConfigError> {
        let period_ns = Self::bit_period_ns(baud)?;
        if loop_overhead_ns >= period_ns {
            return Err(ConfigError::OverheadExceedsPeriod {
                period_ns,
                overhead_ns: loop_overhead_ns,
            });
        }
        Ok(BitTiming {
            baud,
            frame_bit_ns: period_ns,
            data_bit_ns: period_ns - loop_overhead_ns,
        })
    }

    /// Explicit delays, e.g. measured on a logic analyser.
    pub fn from_delays(baud: u32, frame_bit: Duration, data_bit: Duration) -> Result<Self, ConfigError> {
        Self::bit_period_ns(baud)?;
        let frame_bit_ns = frame_bit.as_nanos().min(u32::MAX as u128) as u32;
        let data_bit_ns = data_bit.as_nanos().min(u32::MAX as u128) as u32;
        if data_bit_ns == 0 || frame_bit_ns == 0 {
            return Err(ConfigError::ZeroDelay);
        }
        Ok(BitTiming {
            baud,
            frame_bit_ns,
            data_bit_ns,
        })
    }

    #[inline]
    pub const fn baud(&self) -> u32 {
        self.baud
    }

    #[inline]
    pub const fn frame_bit_ns(&self) -> u32 {
        self.frame_bit_ns
    }

    #[inline]
    pub const fn data_bit_ns(&self) -> u32 {
        self.data_bit_ns
    }

    /// Time the transmitter occupies the line for one frame, ignoring loop overhead.
    pub const fn frame_duration(&self) -> Duration {
        Duration::from_nanos(2 * self.frame_bit_ns as u64 + 8 * self.data_bit_ns as u64)
    }

    /// Relative difference between the data-bit and Start/Stop delays.
    pub fn skew_ppm(&self) -> u32 {
        let diff = self.frame_bit_ns.abs_diff(self.data_bit_ns) as u64;
        u32::try_from((diff * 1_000_000) / self.frame_bit_ns as u64).unwrap_or(u32::MAX)
    }

    /// Rejects timings whose bit periods disagree by more than `limit_ppm`.
    pub fn validate(self, limit_ppm: u32) -> Result<Self, ConfigError> {
        let skew_ppm = self.skew_ppm();
        if skew_ppm > limit_ppm {
            return Err(ConfigError::ToleranceExceeded { skew_ppm, limit_ppm });
        }
        Ok(self)
    }
}

impl Default for BitTiming {
    fn default() -> Self {
        Self::REFERENCE_9600
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_values() {
        let t = BitTiming::default();
        assert_eq!(t.baud(), 9600);
        assert_eq!(t.frame_bit_ns(), 104_000);
        assert_eq!(t.data_bit_ns(), 103_000);
        assert_eq!(t.frame_duration(), Duration::from_micros(2 * 104 + 8 * 103));
        // 1 us in 104 us is just under 1 %
        assert_eq!(t.skew_ppm(), 9615);
        assert!(t.validate(DEFAULT_TOLERANCE_PPM).is_ok());
    }

    #[test]
    fn test_bit_period_rounding() {
        assert_eq!(BitTiming::bit_period_ns(9600), Ok(104_167));
        assert_eq!(BitTiming::bit_period_ns(115_200), Ok(8_681));
        assert_eq!(BitTiming::bit_period_ns(0), Err(ConfigError::ZeroBaud));
    }

    #[test]
    fn test_uniform_and_calibrated() {
        let uniform = BitTiming::uniform(9600).unwrap();
        assert_eq!(uniform.frame_bit_ns(), uniform.data_bit_ns());
        assert_eq!(uniform.skew_ppm(), 0);

        let calibrated = BitTiming::calibrated(9600, 1_167).unwrap();
        assert_eq!(calibrated.frame_bit_ns(), 104_167);
        assert_eq!(calibrated.data_bit_ns(), 103_000);
    }

    #[test]
    fn test_overhead_too_large() {
        assert_eq!(
            BitTiming::calibrated(9600, 104_167),
            Err(ConfigError::OverheadExceedsPeriod { period_ns: 104_167, overhead_ns: 104_167 })
        );
    }

    #[test]
    fn test_validate_rejects_skew() {
        // Copying a 1 us trim onto a fast baud rate is exactly the mistake to catch.
        let t = BitTiming::from_delays(115_200, Duration::from_nanos(8_681), Duration::from_nanos(7_681)).unwrap();
        assert!(matches!(
            t.validate(DEFAULT_TOLERANCE_PPM),
            Err(ConfigError::ToleranceExceeded { limit_ppm: DEFAULT_TOLERANCE_PPM, .. })
        ));
    }

    #[test]
    fn test_zero_delay_rejected() {
        assert_eq!(
            BitTiming::from_delays(9600, Duration::ZERO, Duration::from_micros(103)),
            Err(ConfigError::ZeroDelay)
        );
        assert_eq!(
            BitTiming::from_delays(9600, Duration::from_micros(104), Duration::ZERO),
            Err(ConfigError::ZeroDelay)
        );
    }

    #[test]
    fn test_extreme_skew_saturates() {
        let t = BitTiming::from_delays(9600, Duration::from_nanos(1), Duration::from_millis(10)).unwrap();
        assert_eq!(t.skew_ppm(), u32::MAX);
        assert_eq!(
            t.validate(DEFAULT_TOLERANCE_PPM),
            Err(ConfigError::ToleranceExceeded { skew_ppm: u32::MAX, limit_ppm: DEFAULT_TOLERANCE_PPM })
        );
    }
}
