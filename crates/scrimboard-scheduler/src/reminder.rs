use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use scrimboard_channels::MessageHandle;
use scrimboard_core::ScrimId;

/// Half-width of the window (in minutes) around each threshold.
pub const WINDOW_MINUTES: f64 = 0.5;

/// Fractional minutes from `now` until `start`. Negative once the scrim has begun.
pub fn minutes_until(start: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (start - now).num_milliseconds() as f64 / 60_000.0
}

/// `true` when `diff` lies strictly inside the window around `threshold`.
pub fn within_window(diff: f64, threshold: u32) -> bool {
    (diff - f64::from(threshold)).abs() < WINDOW_MINUTES
}

/// Body of a reminder message, without the configured mention prefix.
pub fn reminder_text(name: &str, diff: f64) -> String {
    format!("{} starting in {} minutes", name, diff.round() as i64)
}

/// In-memory record of which reminders are currently posted.
///
/// At most one live message per `(scrim, threshold)` pair. Lost on restart.
#[derive(Debug, Default)]
pub struct ReminderState {
    posted: HashMap<(ScrimId, u32), MessageHandle>,
}

impl ReminderState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.posted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posted.is_empty()
    }

    pub fn contains(&self, id: ScrimId, threshold: u32) -> bool {
        self.posted.contains_key(&(id, threshold))
    }

    pub fn insert(&mut self, id: ScrimId, threshold: u32, handle: MessageHandle) {
        self.posted.insert((id, threshold), handle);
    }

    /// Thresholds with a live reminder for `id`, largest first.
    pub fn thresholds_for(&self, id: ScrimId) -> Vec<u32> {
        let mut out: Vec<u32> = self
            .posted
            .keys()
            .filter(|(sid, _)| *sid == id)
            .map(|(_, t)| *t)
            .collect();
        out.sort_unstable_by(|a, b| b.cmp(a));
        out
    }

    /// Remove every record for `id`.
    pub fn take_event(&mut self, id: ScrimId) -> Vec<(u32, MessageHandle)> {
        self.take_where(id, |_| true)
    }

    /// Remove the records for `id` at thresholds larger than `threshold`.
    pub fn take_superseded(&mut self, id: ScrimId, threshold: u32) -> Vec<(u32, MessageHandle)> {
        self.take_where(id, |t| t > threshold)
    }

    /// Remove records whose scrim is no longer in `active`.
    pub fn take_orphans(&mut self, active: &HashSet<ScrimId>) -> Vec<(ScrimId, u32, MessageHandle)> {
        let mut keys: Vec<(ScrimId, u32)> = self
            .posted
            .keys()
            .filter(|(id, _)| !active.contains(id))
            .copied()
            .collect();
        keys.sort_unstable_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));
        keys.into_iter()
            .filter_map(|key| self.posted.remove(&key).map(|h| (key.0, key.1, h)))
            .collect()
    }

    fn take_where(&mut self, id: ScrimId, keep: impl Fn(u32) -> bool) -> Vec<(u32, MessageHandle)> {
        let thresholds: Vec<u32> = self
            .thresholds_for(id)
            .into_iter()
            .filter(|t| keep(*t))
            .collect();
        thresholds
            .into_iter()
            .filter_map(|t| self.posted.remove(&(id, t)).map(|h| (t, h)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn h(s: &str) -> MessageHandle {
        MessageHandle(s.to_string())
    }

    #[test]
    fn minutes_until_is_fractional() {
        let now = Utc.with_ymd_and_hms(2025, 12, 23, 8, 0, 0).unwrap();
        let start = now + Duration::seconds(90);
        assert!((minutes_until(start, now) - 1.5).abs() < f64::EPSILON);
        assert!(minutes_until(now - Duration::minutes(2), now) < 0.0);
    }

    #[test]
    fn window_is_open_interval() {
        assert!(within_window(30.0, 30));
        assert!(within_window(29.6, 30));
        assert!(within_window(30.4, 30));
        assert!(!within_window(29.5, 30));
        assert!(!within_window(30.5, 30));
        assert!(!within_window(15.0, 30));
    }

    #[test]
    fn text_rounds_minutes() {
        assert_eq!(reminder_text("Alpha", 29.7), "Alpha starting in 30 minutes");
        assert_eq!(reminder_text("Alpha", 5.2), "Alpha starting in 5 minutes");
    }

    #[test]
    fn superseded_takes_only_larger_thresholds() {
        let mut state = ReminderState::new();
        let id = ScrimId(1);
        state.insert(id, 30, h("a"));
        state.insert(id, 15, h("b"));
        state.insert(ScrimId(2), 30, h("c"));

        let taken = state.take_superseded(id, 15);
        assert_eq!(taken, vec![(30, h("a"))]);
        assert!(state.contains(id, 15));
        assert!(state.contains(ScrimId(2), 30));
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn take_event_clears_all_thresholds_largest_first() {
        let mut state = ReminderState::new();
        let id = ScrimId(7);
        state.insert(id, 5, h("x"));
        state.insert(id, 30, h("y"));
        assert_eq!(state.take_event(id), vec![(30, h("y")), (5, h("x"))]);
        assert!(state.is_empty());
        assert!(state.take_event(id).is_empty());
    }

    #[test]
    fn orphans_are_records_for_inactive_scrims() {
        let mut state = ReminderState::new();
        state.insert(ScrimId(1), 30, h("keep"));
        state.insert(ScrimId(2), 30, h("gone-30"));
        state.insert(ScrimId(2), 15, h("gone-15"));

        let active: HashSet<ScrimId> = [ScrimId(1)].into_iter().collect();
        let orphans = state.take_orphans(&active);
        assert_eq!(
            orphans,
            vec![(ScrimId(2), 30, h("gone-30")), (ScrimId(2), 15, h("gone-15"))]
        );
        assert_eq!(state.thresholds_for(ScrimId(1)), vec![30]);
    }
}
