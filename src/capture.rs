//! Event capture
//!
//! Normalizes raw host input events into the timestamped records of
//! [`crate::types`] and maintains the per-session interaction state:
//! bounded buffers, focus accounting, visibility transitions, and the
//! rolling typing-speed estimate. Every handler is a short synchronous
//! sequence of reads and writes: O(1) work per event, no failure paths.

use crate::buffer::BoundedBuffer;
use crate::config::EngineConfig;
use crate::types::{
    ClickEvent, KeystrokeEvent, Modifiers, PointerButton, PointerSample, ScrollEvent, TargetKind,
    Visibility,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw input event as delivered by the hosting page or runtime.
///
/// Coordinates and offsets are optional to mirror the looseness of real
/// event payloads; missing values are defaulted to 0 rather than rejected,
/// so a malformed event can never interrupt capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RawInputEvent {
    KeyDown {
        key: String,
        key_code: u32,
        #[serde(default)]
        modifiers: Modifiers,
    },
    KeyUp,
    PointerMove {
        x: Option<f64>,
        y: Option<f64>,
    },
    Click {
        x: Option<f64>,
        y: Option<f64>,
        #[serde(default)]
        button: PointerButton,
        #[serde(default)]
        target: TargetKind,
    },
    Scroll {
        offset: Option<f64>,
    },
    FocusIn {
        #[serde(default)]
        target: TargetKind,
    },
    FocusOut,
    VisibilityChange {
        hidden: bool,
    },
}

/// Mutable per-session capture state: buffers plus running counters that
/// must survive buffer trims.
#[derive(Debug)]
pub struct CaptureState {
    keystrokes: BoundedBuffer<KeystrokeEvent>,
    pauses: BoundedBuffer<f64>,
    pointer_samples: BoundedBuffer<PointerSample>,
    clicks: BoundedBuffer<ClickEvent>,
    scrolls: BoundedBuffer<ScrollEvent>,

    session_start: DateTime<Utc>,
    last_keystroke_at: Option<DateTime<Utc>>,
    last_pointer_sample_at: Option<DateTime<Utc>>,
    typing_speed_wpm: f64,
    focus_accumulated_ms: i64,
    active_field_focus_start: Option<DateTime<Utc>>,
    tab_switch_count: u32,
    visibility: Visibility,
    total_keystrokes: u64,
    total_clicks: u64,
    total_scrolls: u64,
}

impl CaptureState {
    /// Fresh state with buffers sized per `config`.
    pub fn new(config: &EngineConfig, session_start: DateTime<Utc>) -> Self {
        Self {
            keystrokes: BoundedBuffer::new(config.keystroke_capacity),
            pauses: BoundedBuffer::new(config.keystroke_capacity),
            pointer_samples: BoundedBuffer::new(config.pointer_capacity),
            clicks: BoundedBuffer::new(config.click_capacity),
            scrolls: BoundedBuffer::new(config.scroll_capacity),
            session_start,
            last_keystroke_at: None,
            last_pointer_sample_at: None,
            typing_speed_wpm: 0.0,
            focus_accumulated_ms: 0,
            active_field_focus_start: None,
            tab_switch_count: 0,
            visibility: Visibility::Visible,
            total_keystrokes: 0,
            total_clicks: 0,
            total_scrolls: 0,
        }
    }

    /// Dispatch one raw event to its handler, stamping it with `now`.
    pub fn handle(&mut self, event: RawInputEvent, now: DateTime<Utc>, config: &EngineConfig) {
        match event {
            RawInputEvent::KeyDown {
                key,
                key_code,
                modifiers,
            } => self.on_key_down(key, key_code, modifiers, now),
            RawInputEvent::KeyUp => self.on_key_up(config.typing_speed_window),
            RawInputEvent::PointerMove { x, y } => {
                self.on_pointer_move(x, y, now, config.pointer_sample_interval_ms)
            }
            RawInputEvent::Click {
                x,
                y,
                button,
                target,
            } => self.on_click(x, y, button, target, now),
            RawInputEvent::Scroll { offset } => self.on_scroll(offset, now),
            RawInputEvent::FocusIn { target } => self.on_focus_in(target, now),
            RawInputEvent::FocusOut => self.on_focus_out(now),
            RawInputEvent::VisibilityChange { hidden } => self.on_visibility_change(hidden),
        }
    }

    /// Record a keystroke and the pause since the previous one.
    fn on_key_down(&mut self, key: String, key_code: u32, modifiers: Modifiers, now: DateTime<Utc>) {
        if let Some(last) = self.last_keystroke_at {
            let gap_ms = (now - last).num_milliseconds().max(0);
            self.pauses.push(gap_ms as f64);
        }
        self.last_keystroke_at = Some(now);

        self.keystrokes.push(KeystrokeEvent {
            key,
            timestamp: now,
            key_code,
            modifiers,
        });
        self.total_keystrokes += 1;
    }

    /// Recompute the rolling typing-speed estimate over the most recent
    /// window of keystrokes. A short or zero-duration window leaves the
    /// previous estimate untouched.
    fn on_key_up(&mut self, window: usize) {
        let keystrokes = self.keystrokes.as_slice();
        if window < 2 || keystrokes.len() < window {
            return;
        }

        let recent = &keystrokes[keystrokes.len() - window..];
        let span_ms = (recent[recent.len() - 1].timestamp - recent[0].timestamp).num_milliseconds();
        if span_ms <= 0 {
            return;
        }

        // Words-per-minute at the conventional 5 keystrokes per word.
        let minutes = span_ms as f64 / 60_000.0;
        self.typing_speed_wpm = (window as f64 / 5.0) / minutes;
    }

    /// Store a pointer sample if the sampling gate admits it: at most one
    /// stored sample per sampling interval, regardless of raw event rate.
    fn on_pointer_move(
        &mut self,
        x: Option<f64>,
        y: Option<f64>,
        now: DateTime<Utc>,
        interval_ms: i64,
    ) {
        if let Some(last) = self.last_pointer_sample_at {
            if (now - last).num_milliseconds() < interval_ms {
                return;
            }
        }

        self.pointer_samples.push(PointerSample {
            x: x.unwrap_or(0.0),
            y: y.unwrap_or(0.0),
            timestamp: now,
        });
        self.last_pointer_sample_at = Some(now);
    }

    fn on_click(
        &mut self,
        x: Option<f64>,
        y: Option<f64>,
        button: PointerButton,
        target: TargetKind,
        now: DateTime<Utc>,
    ) {
        self.clicks.push(ClickEvent {
            x: x.unwrap_or(0.0),
            y: y.unwrap_or(0.0),
            timestamp: now,
            target,
            button,
        });
        self.total_clicks += 1;
    }

    fn on_scroll(&mut self, offset: Option<f64>, now: DateTime<Utc>) {
        self.scrolls.push(ScrollEvent {
            offset: offset.unwrap_or(0.0),
            timestamp: now,
        });
        self.total_scrolls += 1;
    }

    /// Open a focus span for a qualifying field. Nested or duplicate
    /// focus-in events on an already-open span are ignored.
    fn on_focus_in(&mut self, target: TargetKind, now: DateTime<Utc>) {
        if target.is_qualifying() && self.active_field_focus_start.is_none() {
            self.active_field_focus_start = Some(now);
        }
    }

    /// Close the open focus span, folding its elapsed time into the
    /// accumulator exactly once.
    fn on_focus_out(&mut self, now: DateTime<Utc>) {
        if let Some(start) = self.active_field_focus_start.take() {
            self.focus_accumulated_ms += (now - start).num_milliseconds().max(0);
        }
    }

    /// Track visibility transitions; only a visible→hidden transition
    /// counts as a tab switch.
    fn on_visibility_change(&mut self, hidden: bool) {
        if hidden {
            if self.visibility == Visibility::Visible {
                self.tab_switch_count += 1;
            }
            self.visibility = Visibility::Hidden;
        } else {
            self.visibility = Visibility::Visible;
        }
    }

    /// Clear all buffers, counters, and rolling state, restarting the
    /// session at `now`. Current page visibility is environmental, not
    /// accumulated data, so it survives.
    pub fn clear(&mut self, now: DateTime<Utc>) {
        self.keystrokes.clear();
        self.pauses.clear();
        self.pointer_samples.clear();
        self.clicks.clear();
        self.scrolls.clear();
        self.session_start = now;
        self.last_keystroke_at = None;
        self.last_pointer_sample_at = None;
        self.typing_speed_wpm = 0.0;
        self.focus_accumulated_ms = 0;
        self.active_field_focus_start = None;
        self.tab_switch_count = 0;
        self.total_keystrokes = 0;
        self.total_clicks = 0;
        self.total_scrolls = 0;
    }

    pub fn keystrokes(&self) -> &[KeystrokeEvent] {
        self.keystrokes.as_slice()
    }

    pub fn pauses(&self) -> &[f64] {
        self.pauses.as_slice()
    }

    pub fn pointer_samples(&self) -> &[PointerSample] {
        self.pointer_samples.as_slice()
    }

    pub fn clicks(&self) -> &[ClickEvent] {
        self.clicks.as_slice()
    }

    pub fn scrolls(&self) -> &[ScrollEvent] {
        self.scrolls.as_slice()
    }

    /// Elapsed session time at `now`, clamped at zero.
    pub fn session_duration_ms(&self, now: DateTime<Utc>) -> i64 {
        (now - self.session_start).num_milliseconds().max(0)
    }

    pub fn typing_speed_wpm(&self) -> f64 {
        self.typing_speed_wpm
    }

    /// Accumulated qualifying-field focus time at `now`, including an open
    /// span read-only (no fold, no mutation).
    pub fn focus_ms(&self, now: DateTime<Utc>) -> i64 {
        let open_span = self
            .active_field_focus_start
            .map(|start| (now - start).num_milliseconds().max(0))
            .unwrap_or(0);
        self.focus_accumulated_ms + open_span
    }

    pub fn tab_switch_count(&self) -> u32 {
        self.tab_switch_count
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn total_keystrokes(&self) -> u64 {
        self.total_keystrokes
    }

    pub fn total_clicks(&self) -> u64 {
        self.total_clicks
    }

    pub fn total_scrolls(&self) -> u64 {
        self.total_scrolls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn at(ms: i64) -> DateTime<Utc> {
        start() + chrono::Duration::milliseconds(ms)
    }

    fn key_down(key: &str) -> RawInputEvent {
        RawInputEvent::KeyDown {
            key: key.to_string(),
            key_code: 65,
            modifiers: Modifiers::default(),
        }
    }

    fn state() -> (CaptureState, EngineConfig) {
        let config = EngineConfig::default();
        let state = CaptureState::new(&config, start());
        (state, config)
    }

    #[test]
    fn test_pauses_lag_keystrokes_by_one() {
        let (mut state, config) = state();
        for i in 0..7 {
            state.handle(key_down("a"), at(i * 100), &config);
            assert_eq!(state.pauses().len(), state.keystrokes().len() - 1);
        }
        assert_eq!(state.pauses(), &[100.0; 6]);
    }

    #[test]
    fn test_pause_buffer_stays_bounded() {
        let config = EngineConfig {
            keystroke_capacity: 8,
            ..Default::default()
        };
        let mut state = CaptureState::new(&config, start());
        for i in 0..100 {
            state.handle(key_down("a"), at(i * 50), &config);
            assert!(state.pauses().len() <= 8);
            assert!(state.keystrokes().len() <= 8);
        }
        assert_eq!(state.total_keystrokes(), 100);
    }

    #[test]
    fn test_typing_speed_needs_full_window() {
        let (mut state, config) = state();
        for i in 0..9 {
            state.handle(key_down("a"), at(i * 100), &config);
        }
        state.handle(RawInputEvent::KeyUp, at(900), &config);
        assert_eq!(state.typing_speed_wpm(), 0.0);
    }

    #[test]
    fn test_typing_speed_over_recent_window() {
        let (mut state, config) = state();
        // 10 keystrokes 100 ms apart span 900 ms.
        for i in 0..10 {
            state.handle(key_down("a"), at(i * 100), &config);
        }
        state.handle(RawInputEvent::KeyUp, at(950), &config);

        // (10 / 5) words over 0.015 minutes.
        let expected = 2.0 / (900.0 / 60_000.0);
        assert!((state.typing_speed_wpm() - expected).abs() < 0.001);
    }

    #[test]
    fn test_zero_span_window_leaves_estimate_unchanged() {
        let (mut state, config) = state();
        for _ in 0..10 {
            state.handle(key_down("a"), at(0), &config);
        }
        state.handle(RawInputEvent::KeyUp, at(0), &config);
        assert_eq!(state.typing_speed_wpm(), 0.0);
    }

    #[test]
    fn test_pointer_gate_drops_fast_moves() {
        let (mut state, config) = state();
        // 40 raw moves 10 ms apart; only every 10th clears the 100 ms gate.
        for i in 0..40 {
            state.handle(
                RawInputEvent::PointerMove {
                    x: Some(i as f64),
                    y: Some(0.0),
                },
                at(i * 10),
                &config,
            );
        }

        let samples = state.pointer_samples();
        assert_eq!(samples.len(), 4);
        for pair in samples.windows(2) {
            let gap = (pair[1].timestamp - pair[0].timestamp).num_milliseconds();
            assert!(gap >= config.pointer_sample_interval_ms);
        }
    }

    #[test]
    fn test_missing_coordinates_default_to_zero() {
        let (mut state, config) = state();
        state.handle(RawInputEvent::PointerMove { x: None, y: None }, at(0), &config);
        state.handle(
            RawInputEvent::Click {
                x: None,
                y: Some(12.0),
                button: PointerButton::Primary,
                target: TargetKind::Button,
            },
            at(50),
            &config,
        );
        state.handle(RawInputEvent::Scroll { offset: None }, at(60), &config);

        assert_eq!(state.pointer_samples()[0].x, 0.0);
        assert_eq!(state.clicks()[0].x, 0.0);
        assert_eq!(state.clicks()[0].y, 12.0);
        assert_eq!(state.scrolls()[0].offset, 0.0);
    }

    #[test]
    fn test_focus_folds_exactly_once() {
        let (mut state, config) = state();
        state.handle(
            RawInputEvent::FocusIn {
                target: TargetKind::TextInput,
            },
            at(0),
            &config,
        );
        state.handle(RawInputEvent::FocusOut, at(2_000), &config);
        assert_eq!(state.focus_ms(at(2_000)), 2_000);

        // A second focus-out with no open span adds nothing.
        state.handle(RawInputEvent::FocusOut, at(5_000), &config);
        assert_eq!(state.focus_ms(at(5_000)), 2_000);
    }

    #[test]
    fn test_duplicate_focus_in_keeps_original_start() {
        let (mut state, config) = state();
        state.handle(
            RawInputEvent::FocusIn {
                target: TargetKind::TextArea,
            },
            at(0),
            &config,
        );
        state.handle(
            RawInputEvent::FocusIn {
                target: TargetKind::TextInput,
            },
            at(1_000),
            &config,
        );
        state.handle(RawInputEvent::FocusOut, at(3_000), &config);
        assert_eq!(state.focus_ms(at(3_000)), 3_000);
    }

    #[test]
    fn test_non_qualifying_focus_ignored() {
        let (mut state, config) = state();
        state.handle(
            RawInputEvent::FocusIn {
                target: TargetKind::Button,
            },
            at(0),
            &config,
        );
        state.handle(RawInputEvent::FocusOut, at(4_000), &config);
        assert_eq!(state.focus_ms(at(4_000)), 0);
    }

    #[test]
    fn test_open_focus_span_reported_without_fold() {
        let (mut state, config) = state();
        state.handle(
            RawInputEvent::FocusIn {
                target: TargetKind::TextInput,
            },
            at(0),
            &config,
        );
        assert_eq!(state.focus_ms(at(1_500)), 1_500);
        // Reading did not fold: the fold on focus-out is still exact.
        state.handle(RawInputEvent::FocusOut, at(2_000), &config);
        assert_eq!(state.focus_ms(at(2_000)), 2_000);
    }

    #[test]
    fn test_tab_switches_count_transitions_only() {
        let (mut state, config) = state();
        for _ in 0..3 {
            state.handle(RawInputEvent::VisibilityChange { hidden: true }, at(0), &config);
            state.handle(RawInputEvent::VisibilityChange { hidden: true }, at(0), &config);
            state.handle(RawInputEvent::VisibilityChange { hidden: false }, at(0), &config);
        }
        assert_eq!(state.tab_switch_count(), 3);
        assert_eq!(state.visibility(), Visibility::Visible);
    }

    #[test]
    fn test_clear_resets_counters_and_restarts_session() {
        let (mut state, config) = state();
        state.handle(key_down("a"), at(0), &config);
        state.handle(key_down("b"), at(100), &config);
        state.handle(RawInputEvent::VisibilityChange { hidden: true }, at(200), &config);

        state.clear(at(10_000));

        assert!(state.keystrokes().is_empty());
        assert!(state.pauses().is_empty());
        assert_eq!(state.total_keystrokes(), 0);
        assert_eq!(state.tab_switch_count(), 0);
        assert_eq!(state.typing_speed_wpm(), 0.0);
        assert_eq!(state.session_duration_ms(at(10_000)), 0);
        // Visibility is environmental state and survives the reset.
        assert_eq!(state.visibility(), Visibility::Hidden);
    }

    #[test]
    fn test_raw_events_parse_from_tagged_json() {
        let event: RawInputEvent = serde_json::from_str(
            r#"{"type": "key_down", "key": "a", "key_code": 65}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            RawInputEvent::KeyDown {
                key: "a".to_string(),
                key_code: 65,
                modifiers: Modifiers::default(),
            }
        );

        // Missing coordinates stay optional rather than failing the parse.
        let event: RawInputEvent =
            serde_json::from_str(r#"{"type": "pointer_move", "y": 4.5}"#).unwrap();
        assert_eq!(
            event,
            RawInputEvent::PointerMove {
                x: None,
                y: Some(4.5),
            }
        );
    }
}
