//! Per-session chess clock.
//!
//! The clock is passive: it never reads the system time itself. Callers pass
//! `now` into every operation, which keeps the session deterministic under test.
//!
//! Rules:
//! - Nothing is deducted before the first accepted move; ticks only move the anchor.
//! - After that, elapsed time since the anchor is charged to the side on move.
//! - Remaining time saturates at zero. Zero means the side has flagged.
//! - Once stopped the clock never changes again.

use chrono::{DateTime, Utc};

use crate::{ClockSnapshot, Color, TimeControl};

#[derive(Debug, Clone)]
pub struct GameClock {
    white_remaining_ms: u64,
    black_remaining_ms: u64,
    last_tick_anchor: DateTime<Utc>,
    started: bool,
    stopped: bool,
}

impl GameClock {
    /// Arm a clock with the given allotment. It does not run until [`start`](Self::start).
    pub fn new(time_control: TimeControl, now: DateTime<Utc>) -> Self {
        Self {
            white_remaining_ms: time_control.white_time_ms,
            black_remaining_ms: time_control.black_time_ms,
            last_tick_anchor: now,
            started: false,
            stopped: false,
        }
    }

    pub fn remaining_ms(&self, color: Color) -> u64 {
        match color {
            Color::White => self.white_remaining_ms,
            Color::Black => self.black_remaining_ms,
        }
    }

    pub fn snapshot(&self) -> ClockSnapshot {
        ClockSnapshot {
            white_time_ms: self.white_remaining_ms,
            black_time_ms: self.black_remaining_ms,
        }
    }

    pub fn last_tick_anchor(&self) -> DateTime<Utc> {
        self.last_tick_anchor
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Begin accrual from `now`. Called when the first move is accepted.
    pub fn start(&mut self, now: DateTime<Utc>) {
        if self.stopped {
            return;
        }
        self.started = true;
        self.last_tick_anchor = now;
    }

    /// Move the anchor without charging anyone.
    pub fn reset_anchor(&mut self, now: DateTime<Utc>) {
        if self.stopped {
            return;
        }
        self.last_tick_anchor = now;
    }

    /// Charge the time elapsed since the anchor to `side` and move the anchor to `now`.
    ///
    /// Returns `true` if `side` has no time left afterwards.
    pub fn charge(&mut self, side: Color, now: DateTime<Utc>) -> bool {
        if self.stopped {
            return self.remaining_ms(side) == 0;
        }
        if !self.started {
            self.last_tick_anchor = now;
            return false;
        }

        // A clock going backwards charges nothing.
        let elapsed_ms = u64::try_from(
            now.signed_duration_since(self.last_tick_anchor)
                .num_milliseconds(),
        )
        .unwrap_or(0);

        let remaining = match side {
            Color::White => &mut self.white_remaining_ms,
            Color::Black => &mut self.black_remaining_ms,
        };
        *remaining = remaining.saturating_sub(elapsed_ms);
        self.last_tick_anchor = now;

        *remaining == 0
    }

    /// Freeze both sides permanently.
    pub fn stop(&mut self) {
        self.stopped = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-01-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn nothing_is_charged_before_start() {
        let mut clock = GameClock::new(TimeControl::default(), t0());

        assert!(!clock.charge(Color::White, t0() + Duration::minutes(10)));

        assert_eq!(clock.remaining_ms(Color::White), 300_000);
        assert_eq!(clock.last_tick_anchor(), t0() + Duration::minutes(10));
    }

    #[test]
    fn charges_only_the_given_side() {
        let mut clock = GameClock::new(TimeControl::default(), t0());
        clock.start(t0());

        clock.charge(Color::Black, t0() + Duration::milliseconds(1_500));

        assert_eq!(clock.remaining_ms(Color::Black), 298_500);
        assert_eq!(clock.remaining_ms(Color::White), 300_000);
    }

    #[test]
    fn consecutive_charges_use_the_moving_anchor() {
        let mut clock = GameClock::new(TimeControl::default(), t0());
        clock.start(t0());

        clock.charge(Color::White, t0() + Duration::milliseconds(100));
        clock.charge(Color::White, t0() + Duration::milliseconds(250));

        assert_eq!(clock.remaining_ms(Color::White), 299_750);
    }

    #[test]
    fn flags_and_saturates_at_zero() {
        let tc = TimeControl::symmetric(1_000).unwrap();
        let mut clock = GameClock::new(tc, t0());
        clock.start(t0());

        assert!(clock.charge(Color::White, t0() + Duration::seconds(5)));
        assert_eq!(clock.remaining_ms(Color::White), 0);
    }

    #[test]
    fn backwards_time_charges_nothing() {
        let mut clock = GameClock::new(TimeControl::default(), t0());
        clock.start(t0());

        assert!(!clock.charge(Color::White, t0() - Duration::seconds(3)));
        assert_eq!(clock.remaining_ms(Color::White), 300_000);
    }

    #[test]
    fn stopped_clock_is_frozen() {
        let mut clock = GameClock::new(TimeControl::default(), t0());
        clock.start(t0());
        clock.stop();

        clock.charge(Color::White, t0() + Duration::minutes(1));
        clock.reset_anchor(t0() + Duration::minutes(2));

        assert_eq!(clock.remaining_ms(Color::White), 300_000);
        assert_eq!(clock.last_tick_anchor(), t0());
    }
}
