//! Fingerprint emission
//!
//! Assembles the behavioral fingerprint from capture state via the analysis
//! functions, serializes it, and attaches it to an outgoing form submission.
//! Emission is read-only over the buffers, idempotent, and never the reason
//! a submission fails: serialization trouble degrades to an empty JSON
//! object.

use crate::analysis;
use crate::capture::CaptureState;
use crate::config::EngineConfig;
use crate::types::{
    BehaviorFingerprint, FingerprintProducer, PointerSummary, SessionSummary, TypingSummary,
};
use crate::{ENGINE_VERSION, PRODUCER_NAME};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

/// Form field name under which the serialized fingerprint travels.
pub const BEHAVIORAL_DATA_FIELD: &str = "behavioral_data";

/// One named field of an outgoing form submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    pub value: String,
}

/// Outgoing form submission the fingerprint rides along with.
///
/// Collaborating form and view code owns everything else about the
/// submission; the engine's only contract is appending one hidden field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSubmission {
    pub fields: Vec<FormField>,
}

impl FormSubmission {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a named field, preserving order.
    pub fn push_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push(FormField {
            name: name.into(),
            value: value.into(),
        });
    }

    /// Value of the first field with the given name, if any.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}

/// Encoder producing fingerprints stamped with a stable producer identity.
pub struct FingerprintEncoder {
    instance_id: String,
}

impl Default for FingerprintEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FingerprintEncoder {
    /// Create an encoder with a unique instance ID.
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID.
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Assemble a fingerprint from the current capture state.
    ///
    /// Read-only over the buffers; calling it any number of times without
    /// intervening events produces identical output.
    pub fn build(
        &self,
        state: &CaptureState,
        config: &EngineConfig,
        now: DateTime<Utc>,
    ) -> BehaviorFingerprint {
        let producer = FingerprintProducer {
            name: PRODUCER_NAME.to_string(),
            version: ENGINE_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        let pauses = state.pauses();
        let typing = TypingSummary {
            speed_wpm: state.typing_speed_wpm(),
            average_pause_ms: analysis::average_pause(pauses),
            rhythm: analysis::typing_rhythm(pauses),
            keystroke_count: state.total_keystrokes(),
        };

        let pattern = analysis::pointer_pattern(state.pointer_samples());
        let pointer = PointerSummary {
            avg_movement_distance: pattern.avg_movement_distance,
            sharp_turn_ratio: pattern.sharp_turn_ratio,
            smoothness: pattern.smoothness,
            sample_count: state.pointer_samples().len() as u64,
            click_count: state.total_clicks(),
            scroll_count: state.total_scrolls(),
        };

        let duration_ms = state.session_duration_ms(now);
        let session = SessionSummary {
            duration_ms,
            focus_ms: state.focus_ms(now),
            focus_pct: analysis::focus_percentage(
                duration_ms as f64,
                state.tab_switch_count(),
                config.tab_switch_cost_ms,
            ),
            tab_switch_count: state.tab_switch_count(),
            visibility: state.visibility(),
        };

        BehaviorFingerprint {
            producer,
            captured_at_utc: now.to_rfc3339(),
            device_class: analysis::device_class(&config.user_agent),
            typing,
            pointer,
            session,
        }
    }

    /// Serialize a fingerprint, degrading to `{}` rather than failing.
    pub fn encode_to_json(&self, fingerprint: &BehaviorFingerprint) -> String {
        match fingerprint.to_json() {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "fingerprint serialization failed, degrading to empty object");
                "{}".to_string()
            }
        }
    }

    /// Build and attach the fingerprint to `submission` as a hidden field.
    /// Mutates only the submission; cannot fail.
    pub fn attach(
        &self,
        state: &CaptureState,
        config: &EngineConfig,
        now: DateTime<Utc>,
        submission: &mut FormSubmission,
    ) {
        let fingerprint = self.build(state, config, now);
        submission.push_field(BEHAVIORAL_DATA_FIELD, self.encode_to_json(&fingerprint));
    }
}
