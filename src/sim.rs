// src/sim.rs

//! Simulated clock, line and delay.
//!
//! `SimDelay` advances a shared virtual clock instead of spinning, and
//! `SimLine` records every level change against that clock. The recorded
//! waveform can be inspected as run-length segments or fed through a
//! mid-bit sampling receiver, which is how the transmitter is verified
//! without hardware.

use crate::common::{
    error::FrameError,
    frame::{Frame, FRAME_BITS},
    hal_traits::TxLine,
    level::{Direction, Level},
};
use arrayvec::ArrayVec;
use core::cell::Cell;
use embedded_hal::delay::DelayNs;

/// Virtual nanosecond clock shared by a `SimLine` and a `SimDelay`.
#[derive(Debug, Default)]
pub struct SimClock {
    now_ns: Cell<u64>,
}

impl SimClock {
    pub const fn new() -> Self {
        SimClock { now_ns: Cell::new(0) }
    }

    #[inline]
    pub fn now_ns(&self) -> u64 {
        self.now_ns.get()
    }

    #[inline]
    pub fn advance(&self, ns: u64) {
        self.now_ns.set(self.now_ns.get().saturating_add(ns));
    }
}

/// Busy-wait stand-in that moves the virtual clock forward.
#[derive(Debug)]
pub struct SimDelay<'a> {
    clock: &'a SimClock,
}

impl<'a> SimDelay<'a> {
    pub fn new(clock: &'a SimClock) -> Self {
        SimDelay { clock }
    }
}

impl DelayNs for SimDelay<'_> {
    fn delay_ns(&mut self, ns: u32) {
        self.clock.advance(ns as u64);
    }
}

/// A level change on the simulated line.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Edge {
    pub at_ns: u64,
    pub level: Level,
}

/// A run of constant level between two edges.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Segment {
    pub level: Level,
    pub start_ns: u64,
    pub end_ns: u64,
}

impl Segment {
    #[inline]
    pub fn duration_ns(&self) -> u64 {
        self.end_ns - self.start_ns
    }

    /// Length in whole bit periods, rounded to nearest.
    pub fn bit_periods(&self, bit_period_ns: u32) -> u64 {
        let period = bit_period_ns as u64;
        (self.duration_ns() + period / 2) / period
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimError {
    #[error("edge capture full ({capacity} edges)")]
    CaptureFull { capacity: usize },
}

/// Output line recording up to `N` edges.
///
/// Comes up as an input, pulled HIGH, like a port pin after reset.
#[derive(Debug)]
pub struct SimLine<'a, const N: usize> {
    clock: &'a SimClock,
    origin_ns: u64,
    initial: Level,
    level: Level,
    direction: Direction,
    edges: ArrayVec<Edge, N>,
    writes: u32,
}

impl<'a, const N: usize> SimLine<'a, N> {
    pub fn new(clock: &'a SimClock) -> Self {
        SimLine {
            clock,
            origin_ns: clock.now_ns(),
            initial: Level::IDLE,
            level: Level::IDLE,
            direction: Direction::Input,
            edges: ArrayVec::new(),
            writes: 0,
        }
    }

    #[inline]
    pub fn level(&self) -> Level {
        self.level
    }

    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Number of `set_level` calls, including ones that did not change the level.
    #[inline]
    pub fn writes(&self) -> u32 {
        self.writes
    }

    /// Drops the capture and starts a new one at the current time.
    pub fn clear(&mut self) {
        self.edges.clear();
        self.origin_ns = self.clock.now_ns();
        self.initial = self.level;
    }

    /// Line level at `at_ns`.
    pub fn level_at(&self, at_ns: u64) -> Level {
        self.edges
            .iter()
            .rev()
            .find(|edge| edge.at_ns <= at_ns)
            .map_or(self.initial, |edge| edge.level)
    }

    /// Run-length view of the capture. The last segment ends at the current time.
    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        let now = self.clock.now_ns();
        let first = Edge {
            at_ns: self.origin_ns,
            level: self.initial,
        };
        let starts = core::iter::once(first).chain(self.edges.iter().copied());
        let ends = self
            .edges
            .iter()
            .map(|edge| edge.at_ns)
            .chain(core::iter::once(now));
        starts
            .zip(ends)
            .filter(|(start, end)| *end > start.at_ns)
            .map(|(start, end)| Segment {
                level: start.level,
                start_ns: start.at_ns,
                end_ns: end,
            })
    }

    /// Software receiver: waits for each falling Start edge and samples the
    /// middle of all ten bit periods, measured with its own `bit_period_ns`.
    ///
    /// After a framing error it waits for the line to return HIGH before
    /// hunting for the next Start edge. Stops after `M` frames.
    pub fn receive<const M: usize>(&self, bit_period_ns: u32) -> ArrayVec<Result<u8, FrameError>, M> {
        let period = bit_period_ns as u64;
        let mut frames = ArrayVec::new();
        let mut from = self.origin_ns;

        while !frames.is_full() {
            let Some(start) = self.next_edge(from, Level::Low) else {
                break;
            };

            let mut levels = [Level::IDLE; FRAME_BITS];
            for (index, slot) in levels.iter_mut().enumerate() {
                *slot = self.level_at(start + period * index as u64 + period / 2);
            }
            let stop_sample = start + period * (FRAME_BITS as u64 - 1) + period / 2;

            let decoded = Frame::decode(&levels);
            frames.push(decoded);

            from = match decoded {
                Ok(_) => stop_sample,
                Err(_) => match self.next_edge(stop_sample, Level::High) {
                    Some(mark) => mark,
                    None => break,
                },
            };
        }
        frames
    }

    fn next_edge(&self, from_ns: u64, level: Level) -> Option<u64> {
        self.edges
            .iter()
            .find(|edge| edge.at_ns >= from_ns && edge.level == level)
            .map(|edge| edge.at_ns)
    }
}

impl<const N: usize> TxLine for SimLine<'_, N> {
    type Error = SimError;

    fn configure_as_output(&mut self) -> Result<(), Self::Error> {
        self.direction = Direction::Output;
        Ok(())
    }

    fn set_level(&mut self, level: Level) -> Result<(), Self::Error> {
        self.writes += 1;
        if level != self.level {
            self.edges
                .try_push(Edge {
                    at_ns: self.clock.now_ns(),
                    level,
                })
                .map_err(|_| SimError::CaptureFull { capacity: N })?;
            self.level = level;
        }
        Ok(())
    }

    fn direction(&self) -> Direction {
        self.direction
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_advances_clock() {
        let clock = SimClock::new();
        let mut delay = SimDelay::new(&clock);
        delay.delay_us(104);
        delay.delay_ms(2);
        assert_eq!(clock.now_ns(), 104_000 + 2_000_000);
    }

    #[test]
    fn test_records_only_changes() {
        let clock = SimClock::new();
        let mut line: SimLine<'_, 8> = SimLine::new(&clock);
        assert_eq!(line.direction(), Direction::Input);

        line.set_level(Level::High).unwrap();
        clock.advance(10);
        line.set_level(Level::Low).unwrap();
        clock.advance(10);
        line.set_level(Level::Low).unwrap();

        assert_eq!(line.writes(), 3);
        assert_eq!(line.edges(), &[Edge { at_ns: 10, level: Level::Low }]);
        assert_eq!(line.level_at(5), Level::High);
        assert_eq!(line.level_at(10), Level::Low);
    }

    #[test]
    fn test_segments() {
        let clock = SimClock::new();
        let mut line: SimLine<'_, 8> = SimLine::new(&clock);
        clock.advance(100);
        line.set_level(Level::Low).unwrap();
        clock.advance(300);
        line.set_level(Level::High).unwrap();
        clock.advance(50);

        let segments: heapless::Vec<Segment, 4> = line.segments().collect();
        assert_eq!(
            segments.as_slice(),
            &[
                Segment { level: Level::High, start_ns: 0, end_ns: 100 },
                Segment { level: Level::Low, start_ns: 100, end_ns: 400 },
                Segment { level: Level::High, start_ns: 400, end_ns: 450 },
            ]
        );
        assert_eq!(segments[1].bit_periods(100), 3);
    }

    #[test]
    fn test_capture_full() {
        let clock = SimClock::new();
        let mut line: SimLine<'_, 1> = SimLine::new(&clock);
        line.set_level(Level::Low).unwrap();
        assert_eq!(line.set_level(Level::High), Err(SimError::CaptureFull { capacity: 1 }));
        line.clear();
        assert!(line.edges().is_empty());
        assert_eq!(line.level(), Level::Low);
    }

    #[test]
    fn test_receive_hand_built_frame() {
        // 'A' = 0x41 -> data LSB first 1,0,0,0,0,0,1,0
        let clock = SimClock::new();
        let mut line: SimLine<'_, 16> = SimLine::new(&clock);
        clock.advance(1_000);
        for level in Frame::new(0x41).levels() {
            line.set_level(level).unwrap();
            clock.advance(1_000);
        }
        let frames: ArrayVec<_, 4> = line.receive(1_000);
        assert_eq!(frames.as_slice(), &[Ok(0x41)]);
    }

    #[test]
    fn test_receive_resyncs_after_break() {
        let clock = SimClock::new();
        let mut line: SimLine<'_, 16> = SimLine::new(&clock);
        clock.advance(1_000);
        line.set_level(Level::Low).unwrap();
        clock.advance(15_000);
        line.set_level(Level::High).unwrap();
        clock.advance(1_000);
        for level in Frame::new(0x0D).levels() {
            line.set_level(level).unwrap();
            clock.advance(1_000);
        }
        let frames: ArrayVec<_, 4> = line.receive(1_000);
        assert_eq!(frames.as_slice(), &[Err(FrameError::MissingStopBit), Ok(0x0D)]);
    }
}
