// src/transmitter/sync_transmitter/io_helpers.rs

use super::SoftSerialTx;
use crate::common::{
    error::TxError,
    frame::FrameState,
    hal_traits::TxLine,
    level::Level,
    timing::ABORT_BREAK_BITS,
};
use embedded_hal::delay::DelayNs;

// Bit-level helpers. Nothing in here may log or yield: any extra work between
// `set_level` and the delay lengthens the bit on the wire.
impl<L, D> SoftSerialTx<L, D>
where
    L: TxLine,
    D: DelayNs,
{
    pub(super) fn ensure_configured(&mut self) -> Result<(), TxError<L::Error>> {
        if self.configured {
            return Ok(());
        }
        self.configure()
    }

    /// Sends one frame. A line error part-way through still leaves the
    /// transmitter `Idle` with the line back at mark, so the next Start bit
    /// gets its falling edge.
    pub(super) fn shift_out<F>(&mut self, value: u8, should_abort: &mut F) -> Result<(), TxError<L::Error>>
    where
        F: FnMut() -> bool,
    {
        let result = self.shift_frame(value, should_abort);
        if let Err(TxError::Line(_)) = result {
            let bits_sent = self.state.bits_before();
            // Best effort: the line already failed once, the original error is what gets reported.
            let _ = self.return_to_idle(bits_sent);
        }
        result
    }

    /// Walks one frame through Start, Data(0..8), Stop.
    fn shift_frame<F>(&mut self, value: u8, should_abort: &mut F) -> Result<(), TxError<L::Error>>
    where
        F: FnMut() -> bool,
    {
        let timing = self.config.timing;

        // Start bit
        self.enter(FrameState::Start, should_abort)?;
        self.hold(Level::Low, timing.frame_bit_ns())?;

        // Data bits, LSB first. The shifted value always exposes the next bit at bit 0.
        let mut data = value;
        for index in 0..8u8 {
            self.enter(FrameState::Data(index), should_abort)?;
            self.hold(Level::from_bit(data & 0b0000_0001 != 0), timing.data_bit_ns())?;
            data >>= 1;
        }

        // Stop bit, which is also the return to idle
        self.state = FrameState::Stop;
        self.hold(Level::High, timing.frame_bit_ns())?;
        for _ in 0..self.config.idle_guard_periods {
            self.delay.delay_ns(timing.frame_bit_ns());
        }

        self.state = FrameState::Idle;
        Ok(())
    }

    /// Drives `level` and busy-waits `ns`.
    #[inline(always)]
    pub(super) fn hold(&mut self, level: Level, ns: u32) -> Result<(), TxError<L::Error>> {
        self.line.set_level(level).map_err(TxError::Line)?;
        self.delay.delay_ns(ns);
        Ok(())
    }

    #[inline(always)]
    fn enter<F>(&mut self, next: FrameState, should_abort: &mut F) -> Result<(), TxError<L::Error>>
    where
        F: FnMut() -> bool,
    {
        if should_abort() {
            let bits_sent = next.bits_before();
            if bits_sent > 0 {
                self.return_to_idle(bits_sent)?;
            }
            self.state = FrameState::Idle;
            return Err(TxError::Aborted { bits_sent });
        }
        self.state = next;
        Ok(())
    }

    /// Ends a truncated frame: a break (one frame of spacing) so the receiver
    /// samples a LOW Stop bit, then one bit period of mark.
    /// With nothing on the wire yet only the mark is held.
    fn return_to_idle(&mut self, bits_sent: u8) -> Result<(), TxError<L::Error>> {
        let frame_ns = self.config.timing.frame_bit_ns();
        self.state = FrameState::Idle;
        let spacing = if bits_sent > 0 {
            let driven = self.line.set_level(Level::Low).map_err(TxError::Line);
            for _ in 0..ABORT_BREAK_BITS {
                self.delay.delay_ns(frame_ns);
            }
            driven
        } else {
            Ok(())
        };
        // Mark is attempted even if the break could not be driven.
        let mark = self.hold(Level::IDLE, frame_ns);
        spacing.and(mark)
    }
}
