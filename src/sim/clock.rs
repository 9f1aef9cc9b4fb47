//! World clock and day/night cycle
//!
//! Time of day runs from 0 to 1439 minutes and wraps. Day is [09:00, 15:00).
//! Phase-transition side effects are edge triggered: the clock remembers the
//! last observed phase and reports each boundary crossing exactly once, even
//! when a single frame spans several boundaries.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// A phase boundary crossed during `WorldClock::advance`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseTransition {
    /// Night -> day. The wave number has already been incremented.
    DayBreak,
    /// Day -> night
    NightFall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldClock {
    /// Minutes since midnight, [0, 1440)
    pub game_time_minutes: f32,
    pub is_day: bool,
    last_is_day: bool,
    /// Increments once per night -> day transition
    pub wave_number: u32,
}

impl Default for WorldClock {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldClock {
    pub fn new() -> Self {
        let is_day = Self::is_day_at(START_TIME_MINUTES);
        Self {
            game_time_minutes: START_TIME_MINUTES,
            is_day,
            last_is_day: is_day,
            wave_number: 1,
        }
    }

    /// Day iff the local hour is in [9, 15)
    pub fn is_day_at(minutes: f32) -> bool {
        let hour = (minutes / 60.0).floor() as u32;
        (DAY_START_HOUR..NIGHT_START_HOUR).contains(&hour)
    }

    /// Real seconds that elapse per in-game minute in the given phase
    pub fn seconds_per_game_minute(is_day: bool) -> f32 {
        if is_day {
            DAY_REAL_SECONDS / DAY_GAME_MINUTES
        } else {
            NIGHT_REAL_SECONDS / NIGHT_GAME_MINUTES
        }
    }

    pub fn hour(&self) -> u32 {
        (self.game_time_minutes / 60.0).floor() as u32
    }

    pub fn minute(&self) -> u32 {
        (self.game_time_minutes % 60.0).floor() as u32
    }

    /// "HH:MM"
    pub fn clock_text(&self) -> String {
        format!("{:02}:{:02}", self.hour(), self.minute())
    }

    /// Minute mark of the next phase boundary
    fn next_boundary(&self) -> f32 {
        if self.is_day {
            (NIGHT_START_HOUR * 60) as f32
        } else {
            (DAY_START_HOUR * 60) as f32
        }
    }

    /// Advance by `dt_ms` of real time and return the transitions crossed, in order.
    ///
    /// The frame is split at every boundary so each phase's rate applies to
    /// exactly its share of the frame.
    pub fn advance(&mut self, dt_ms: f32) -> Vec<PhaseTransition> {
        let mut transitions = Vec::new();
        let mut remaining_s = dt_ms.max(0.0) / 1000.0;

        while remaining_s > 0.0 {
            let rate = Self::seconds_per_game_minute(self.is_day);
            let boundary = self.next_boundary();
            let to_boundary = (boundary - self.game_time_minutes).rem_euclid(MINUTES_PER_DAY);
            let wanted = remaining_s / rate;

            if wanted < to_boundary {
                self.game_time_minutes =
                    (self.game_time_minutes + wanted).rem_euclid(MINUTES_PER_DAY);
                remaining_s = 0.0;
            } else {
                self.game_time_minutes = boundary;
                remaining_s -= to_boundary * rate;
            }

            self.is_day = Self::is_day_at(self.game_time_minutes);
            if self.is_day != self.last_is_day {
                self.last_is_day = self.is_day;
                if self.is_day {
                    self.wave_number += 1;
                    log::info!("Dawn breaks: day {}", self.wave_number);
                    transitions.push(PhaseTransition::DayBreak);
                } else {
                    log::info!("Night falls: wave {}", self.wave_number);
                    transitions.push(PhaseTransition::NightFall);
                }
            }
        }

        transitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const CYCLE_MS: f32 = (DAY_REAL_SECONDS + NIGHT_REAL_SECONDS) * 1000.0;

    #[test]
    fn test_starts_at_nine_in_daylight() {
        let clock = WorldClock::new();
        assert!(clock.is_day);
        assert_eq!(clock.wave_number, 1);
        assert_eq!(clock.clock_text(), "09:00");
    }

    #[test]
    fn test_phase_rates_are_distinct_constants() {
        let day = WorldClock::seconds_per_game_minute(true);
        let night = WorldClock::seconds_per_game_minute(false);
        assert!((day * DAY_GAME_MINUTES - 15.0).abs() < 1e-4);
        assert!((night * NIGHT_GAME_MINUTES - 45.0).abs() < 1e-4);
    }

    #[test]
    fn test_day_lasts_fifteen_seconds() {
        let mut clock = WorldClock::new();
        assert!(clock.advance(14_900.0).is_empty());
        assert!(clock.is_day);
        assert_eq!(clock.advance(200.0), vec![PhaseTransition::NightFall]);
        assert!(!clock.is_day);
        assert_eq!(clock.wave_number, 1);
    }

    #[test]
    fn test_full_cycle_at_60fps() {
        let mut clock = WorldClock::new();
        let mut transitions = Vec::new();
        let mut elapsed = 0.0;
        while elapsed < CYCLE_MS + 10.0 {
            transitions.extend(clock.advance(1000.0 / 60.0));
            elapsed += 1000.0 / 60.0;
        }
        assert_eq!(
            transitions,
            vec![PhaseTransition::NightFall, PhaseTransition::DayBreak]
        );
        assert_eq!(clock.wave_number, 2);
    }

    #[test]
    fn test_single_huge_frame_reports_every_boundary() {
        let mut clock = WorldClock::new();
        let transitions = clock.advance(2.0 * CYCLE_MS + 1.0);
        assert_eq!(transitions.len(), 4);
        assert_eq!(clock.wave_number, 3);
        assert!(clock.is_day);
    }

    #[test]
    fn test_clock_wraps_past_midnight() {
        let mut clock = WorldClock::new();
        // 09:00 -> 23:59 is 899 minutes at 24 min/s
        clock.advance(15_000.0 + (23.0 * 60.0 + 59.0 - 900.0) / 24.0 * 1000.0);
        assert_eq!(clock.hour(), 23);
        clock.advance(1000.0);
        assert_eq!(clock.hour(), 0);
        assert!(!clock.is_day);
    }

    #[test]
    fn test_frame_spanning_whole_cycle_reports_both_edges() {
        let mut clock = WorldClock::new();
        let transitions = clock.advance(CYCLE_MS + 5.0);
        assert_eq!(
            transitions,
            vec![PhaseTransition::NightFall, PhaseTransition::DayBreak]
        );
        assert!(clock.is_day);
        assert_eq!(clock.wave_number, 2);
    }

    proptest! {
        #[test]
        fn prop_one_cycle_fires_each_edge_once(weights in prop::collection::vec(1u32..1000, 1..400)) {
            let total: u32 = weights.iter().sum();
            let mut clock = WorldClock::new();
            let mut transitions = Vec::new();
            let mut flips = 0;
            let mut last = clock.is_day;
            for w in &weights {
                let dt = (*w as f32 / total as f32) * CYCLE_MS;
                transitions.extend(clock.advance(dt));
                if clock.is_day != last {
                    flips += 1;
                    last = clock.is_day;
                }
            }
            // Nudge past dawn in case rounding left us a hair short
            transitions.extend(clock.advance(5.0));
            if clock.is_day != last {
                flips += 1;
            }
            prop_assert_eq!(transitions.len(), 2);
            prop_assert_eq!(clock.wave_number, 2);
            // A frame longer than the day can cross both edges between samples
            let longest = weights.iter().max().copied().unwrap_or(0) as f32 / total as f32 * CYCLE_MS;
            if longest < DAY_REAL_SECONDS * 1000.0 {
                prop_assert_eq!(flips, 2);
            }
        }
    }
}
