//! Pattern analysis
//!
//! Pure reductions of captured buffers into statistics: pause statistics,
//! typing-rhythm classification, pointer-trajectory geometry, device-class
//! inference, and the focus-percentage heuristic. Every function returns a
//! defined default on empty or undersized input; nothing here fails and
//! nothing here mutates.
//!
//! The classification thresholds are fixed policy constants carried for
//! reproducibility; no labeled dataset backs them.

use crate::types::{DeviceClass, PointerPattern, PointerSample, Smoothness, TypingRhythm};
use statrs::statistics::Statistics;

/// Minimum pause samples for a rhythm classification.
pub const RHYTHM_MIN_SAMPLES: usize = 5;

/// Pause variance (ms²) below which typing is very consistent.
pub const VERY_CONSISTENT_MAX_VARIANCE: f64 = 1_000.0;

/// Pause variance (ms²) below which typing is consistent.
pub const CONSISTENT_MAX_VARIANCE: f64 = 5_000.0;

/// Pause variance (ms²) below which typing is variable; above, highly variable.
pub const VARIABLE_MAX_VARIANCE: f64 = 15_000.0;

/// Minimum pointer samples for a trajectory classification.
pub const PATTERN_MIN_SAMPLES: usize = 10;

/// Heading change (radians) above which a step counts as a sharp turn.
pub const SHARP_TURN_THRESHOLD_RAD: f64 = std::f64::consts::FRAC_PI_2;

/// Sharp-turn ratio below which a trajectory is smooth.
pub const SMOOTH_MAX_SHARP_TURN_RATIO: f64 = 0.1;

const TABLET_PATTERNS: [&str; 5] = ["ipad", "tablet", "kindle", "silk", "playbook"];
const MOBILE_PATTERNS: [&str; 7] = [
    "iphone",
    "ipod",
    "android",
    "mobi",
    "windows phone",
    "blackberry",
    "opera mini",
];

/// Arithmetic mean of the inter-keystroke pauses; `0.0` when empty.
pub fn average_pause(pauses: &[f64]) -> f64 {
    if pauses.is_empty() {
        return 0.0;
    }
    pauses.iter().mean()
}

/// Classify the population variance of the pauses into a rhythm bucket.
pub fn typing_rhythm(pauses: &[f64]) -> TypingRhythm {
    if pauses.len() < RHYTHM_MIN_SAMPLES {
        return TypingRhythm::InsufficientData;
    }

    let variance = pauses.iter().population_variance();
    if variance < VERY_CONSISTENT_MAX_VARIANCE {
        TypingRhythm::VeryConsistent
    } else if variance < CONSISTENT_MAX_VARIANCE {
        TypingRhythm::Consistent
    } else if variance < VARIABLE_MAX_VARIANCE {
        TypingRhythm::Variable
    } else {
        TypingRhythm::HighlyVariable
    }
}

/// Geometric reduction of a pointer trajectory.
///
/// Computes the Euclidean step distance for each consecutive sample pair and
/// the heading of each step via `atan2`; a heading change above
/// [`SHARP_TURN_THRESHOLD_RAD`] counts as a sharp turn. Human pointer paths
/// are piecewise-smooth, so a high sharp-turn ratio is a signal (not proof)
/// of synthetic input. Fewer than [`PATTERN_MIN_SAMPLES`] samples yield
/// zeroed statistics classified as insufficient.
pub fn pointer_pattern(samples: &[PointerSample]) -> PointerPattern {
    if samples.len() < PATTERN_MIN_SAMPLES {
        return PointerPattern::insufficient();
    }

    let mut total_distance = 0.0;
    let mut headings = Vec::with_capacity(samples.len() - 1);
    for pair in samples.windows(2) {
        let dx = pair[1].x - pair[0].x;
        let dy = pair[1].y - pair[0].y;
        total_distance += dx.hypot(dy);
        headings.push(dy.atan2(dx));
    }

    let sharp_turns = headings
        .windows(2)
        .filter(|pair| heading_delta(pair[0], pair[1]) > SHARP_TURN_THRESHOLD_RAD)
        .count();

    let avg_movement_distance = total_distance / headings.len() as f64;
    let sharp_turn_ratio = sharp_turns as f64 / (headings.len() - 1) as f64;
    let smoothness = if sharp_turn_ratio < SMOOTH_MAX_SHARP_TURN_RATIO {
        Smoothness::Smooth
    } else {
        Smoothness::Erratic
    };

    PointerPattern {
        avg_movement_distance,
        sharp_turn_ratio,
        smoothness,
    }
}

/// Absolute heading difference folded into [0, π], so a wrap across ±π reads
/// as the small turn it is.
fn heading_delta(a: f64, b: f64) -> f64 {
    let delta = (b - a).abs() % std::f64::consts::TAU;
    if delta > std::f64::consts::PI {
        std::f64::consts::TAU - delta
    } else {
        delta
    }
}

/// Ordered user-agent classification: tablet patterns, then mobile patterns,
/// then the desktop fallback. Tablet first because Android tablets carry no
/// mobile token.
pub fn device_class(user_agent: &str) -> DeviceClass {
    let ua = user_agent.to_lowercase();
    if TABLET_PATTERNS.iter().any(|p| ua.contains(p)) {
        DeviceClass::Tablet
    } else if MOBILE_PATTERNS.iter().any(|p| ua.contains(p)) {
        DeviceClass::Mobile
    } else {
        DeviceClass::Desktop
    }
}

/// Estimated share of the session spent focused, in [0, 100].
///
/// Subtracts an assumed fixed attention cost per tab switch from the session
/// duration. A heuristic, not measured focus; a zero-length session reports
/// 0 rather than dividing by zero.
pub fn focus_percentage(
    session_duration_ms: f64,
    tab_switch_count: u32,
    tab_switch_cost_ms: f64,
) -> f64 {
    if session_duration_ms <= 0.0 || !session_duration_ms.is_finite() {
        return 0.0;
    }

    let focused_ms = session_duration_ms - f64::from(tab_switch_count) * tab_switch_cost_ms;
    (focused_ms / session_duration_ms * 100.0).clamp(0.0, 100.0)
}
