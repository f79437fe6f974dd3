/*!
    Injected time and randomness.

    Every assembler takes its clock and random draws through these traits,
    so fixed implementations reproduce a token byte for byte.
*/

use chrono::Utc;

use crate::error::{SignError, SignResult};

/**
    Source of the current Unix time.
*/
pub trait Clock {
    fn now_millis(&self) -> u64;

    fn now_secs(&self) -> u64 {
        self.now_millis() / 1000
    }
}

/**
    Wall clock.
*/
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
    }
}

/**
    Clock pinned to a fixed millisecond timestamp.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now_millis(&self) -> u64 {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_millis(&self) -> u64 {
        (**self).now_millis()
    }
}

/**
    Source of uniform integer draws in `[0, DRAW_RANGE)`.
*/
pub trait RandomSource {
    fn next_draw(&mut self) -> u32;
}

/**
    Exclusive upper bound of every draw.
*/
pub const DRAW_RANGE: u32 = 10_000;

/**
    Live draws from the thread-local generator.
*/
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_draw(&mut self) -> u32 {
        rand::random_range(0..DRAW_RANGE)
    }
}

/**
    Replays a fixed sequence of draws, wrapping around at the end.
*/
#[derive(Debug, Clone)]
pub struct CyclicDraws {
    draws: Vec<u32>,
    pos: usize,
}

impl CyclicDraws {
    pub fn new(draws: Vec<u32>) -> SignResult<Self> {
        if draws.is_empty() {
            return Err(SignError::invalid("draws", "sequence is empty"));
        }
        if let Some(bad) = draws.iter().find(|&&d| d >= DRAW_RANGE) {
            return Err(SignError::invalid(
                "draws",
                format!("{bad} is outside [0, {DRAW_RANGE})"),
            ));
        }
        Ok(Self { draws, pos: 0 })
    }
}

impl RandomSource for CyclicDraws {
    fn next_draw(&mut self) -> u32 {
        let draw = self.draws[self.pos];
        self.pos = (self.pos + 1) % self.draws.len();
        draw
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_draw(&mut self) -> u32 {
        (**self).next_draw()
    }
}
