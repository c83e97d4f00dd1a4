//! Mid-flight animation snapshot codec.
//!
//! Captures the widget's animation position so a suspended and resumed
//! host does not visibly reset an in-progress transition, and encodes it
//! into a fixed 24-byte big-endian record meant to be appended after any
//! host-owned bytes:
//!
//! `state_ordinal: i32, current_width: i32, size_play_time_ms: i64,
//! indicator_play_time_ms: i64`
//!
//! Restoring from an unrecognized or truncated record falls back to
//! `Normal` with no animation resumed; it never fails.

use std::time::Duration;

use crate::widgets::button::{MorphButton, State};

/// Encoded record length in bytes.
pub const SNAPSHOT_LEN: usize = 24;

/// The persisted animation position of one widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub state: State,
    pub current_width: i32,
    pub size_play_time_ms: i64,
    pub indicator_play_time_ms: i64,
}

impl Snapshot {
    /// Record the widget's live animation position. Only the timeline
    /// that is actually running for the current state is captured; the
    /// other field stays zero.
    pub fn capture(button: &MorphButton) -> Self {
        let size_play_time_ms = match button.state() {
            State::Collapsing | State::Extending => button.size_play_time().as_millis() as i64,
            _ => 0,
        };
        let indicator_play_time_ms = match button.state() {
            State::Loading => button.indicator_play_time().as_millis() as i64,
            _ => 0,
        };
        Self {
            state: button.state(),
            current_width: button.current_width().round() as i32,
            size_play_time_ms,
            indicator_play_time_ms,
        }
    }

    /// Put the widget back where the snapshot left it: state and width
    /// are set directly (no animation), then the relevant timeline
    /// resumes from its saved offset.
    pub fn restore(self, button: &mut MorphButton) {
        let width = self.current_width as f32;
        match self.state {
            State::Collapsing | State::Extending => {
                button.resume_size_morph(
                    width,
                    self.state,
                    Duration::from_millis(self.size_play_time_ms as u64),
                );
            }
            State::Loading => {
                button.resume_loading(
                    width,
                    Duration::from_millis(self.indicator_play_time_ms as u64),
                );
            }
            State::Normal | State::Succeed | State::Failed => {
                button.force_state(self.state, width);
            }
        }
    }

    /// Append the 24-byte record to `out`.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.state.ordinal().to_be_bytes());
        out.extend_from_slice(&self.current_width.to_be_bytes());
        out.extend_from_slice(&self.size_play_time_ms.to_be_bytes());
        out.extend_from_slice(&self.indicator_play_time_ms.to_be_bytes());
    }

    /// Decode a record from the start of `bytes`. Returns `None` for
    /// truncated input, unknown state ordinals, or negative fields.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < SNAPSHOT_LEN {
            return None;
        }
        let state_ordinal = i32::from_be_bytes(bytes[0..4].try_into().ok()?);
        let current_width = i32::from_be_bytes(bytes[4..8].try_into().ok()?);
        let size_play_time_ms = i64::from_be_bytes(bytes[8..16].try_into().ok()?);
        let indicator_play_time_ms = i64::from_be_bytes(bytes[16..24].try_into().ok()?);

        let state = State::from_ordinal(state_ordinal)?;
        if current_width < 0 || size_play_time_ms < 0 || indicator_play_time_ms < 0 {
            return None;
        }
        Some(Self {
            state,
            current_width,
            size_play_time_ms,
            indicator_play_time_ms,
        })
    }
}

impl MorphButton {
    /// Append this widget's snapshot after any host-owned bytes.
    pub fn save_state(&self, out: &mut Vec<u8>) {
        Snapshot::capture(self).encode_into(out);
    }

    /// Restore from bytes produced by [`MorphButton::save_state`]. A
    /// corrupt record resets to `Normal` instead of failing: a visually
    /// reset widget beats a crash.
    pub fn restore_state(&mut self, bytes: &[u8]) {
        match Snapshot::decode(bytes) {
            Some(snapshot) => snapshot.restore(self),
            None => {
                tracing::warn!("Unrecognized widget snapshot, resetting to Normal");
                self.force_state(State::Normal, self.expanded_width());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{RectF, Surface, TextStyle};
    use crate::widgets::button::{Outcome, Padding};
    use crate::widgets::indicator::ArcSpinner;
    use ratatui::style::Color;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    struct FixedMetrics;

    impl Surface for FixedMetrics {
        fn save(&mut self) {}
        fn restore(&mut self) {}
        fn translate(&mut self, _dx: f32, _dy: f32) {}
        fn rotate(&mut self, _degrees: f32, _cx: f32, _cy: f32) {}
        fn stroke_arc(&mut self, _r: RectF, _s: f32, _w: f32, _sw: f32, _c: Color) {}
        fn fill_circle(&mut self, _cx: f32, _cy: f32, _r: f32, _c: Color) {}
        fn draw_text(&mut self, _t: &str, _cx: f32, _cy: f32, _s: &TextStyle) {}
        fn measure_text(&self, text: &str, _size: f32) -> (f32, f32) {
            (text.chars().count() as f32 * 20.0, 20.0)
        }
    }

    fn test_button() -> MorphButton {
        let mut button = MorphButton::new("123456789", Box::new(ArcSpinner::new(Color::White)));
        button.set_padding(Padding::symmetric(10.0, 5.0));
        button.measure(&FixedMetrics);
        button
    }

    #[test]
    fn test_encoded_layout_is_bit_exact() {
        let snapshot = Snapshot {
            state: State::Loading,
            current_width: 40,
            size_play_time_ms: 0,
            indicator_play_time_ms: 0x0102030405060708,
        };
        let mut bytes = Vec::new();
        snapshot.encode_into(&mut bytes);
        assert_eq!(
            bytes,
            vec![
                0, 0, 0, 2, // Loading ordinal
                0, 0, 0, 40, // width
                0, 0, 0, 0, 0, 0, 0, 0, // size play time
                1, 2, 3, 4, 5, 6, 7, 8, // indicator play time
            ]
        );
        assert_eq!(bytes.len(), SNAPSHOT_LEN);
        assert_eq!(Snapshot::decode(&bytes), Some(snapshot));
    }

    #[test]
    fn test_round_trip_collapsing() {
        let mut button = test_button();
        button.start();
        button.tick(ms(200));
        let width = button.current_width();

        let mut bytes = Vec::new();
        button.save_state(&mut bytes);

        let mut restored = test_button();
        restored.restore_state(&bytes);
        assert_eq!(restored.state(), State::Collapsing);
        assert_eq!(restored.current_width(), width.round());
        assert_eq!(restored.size_play_time(), ms(200));

        // Resumes toward the collapsed width from the saved offset.
        restored.tick(ms(300));
        assert_eq!(restored.state(), State::Loading);
        assert_eq!(restored.current_width(), 40.0);
    }

    #[test]
    fn test_round_trip_loading() {
        let mut button = test_button();
        button.start();
        button.tick(ms(500));
        button.tick(ms(3000));

        let mut bytes = Vec::new();
        button.save_state(&mut bytes);

        let mut restored = test_button();
        restored.restore_state(&bytes);
        assert_eq!(restored.state(), State::Loading);
        assert_eq!(restored.current_width(), 40.0);
        assert_eq!(restored.indicator_play_time(), ms(3000));
        assert!((restored.indicator().value() - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_round_trip_extending() {
        let mut button = test_button();
        button.start();
        button.tick(ms(500));
        button.stop(None);
        button.tick(ms(100));
        let width = button.current_width();

        let mut bytes = Vec::new();
        button.save_state(&mut bytes);

        let mut restored = test_button();
        restored.restore_state(&bytes);
        assert_eq!(restored.state(), State::Extending);
        assert_eq!(restored.current_width(), width.round());
        assert_eq!(restored.size_play_time(), ms(100));

        restored.tick(ms(400));
        assert_eq!(restored.state(), State::Normal);
        assert_eq!(restored.current_width(), 200.0);
    }

    #[test]
    fn test_feedback_states_restore_without_animation() {
        let mut button = test_button();
        button.start();
        button.tick(ms(500));
        button.stop(Some(Outcome::Success));

        let mut bytes = Vec::new();
        button.save_state(&mut bytes);

        let mut restored = test_button();
        restored.restore_state(&bytes);
        assert_eq!(restored.state(), State::Succeed);
        assert_eq!(restored.current_width(), 40.0);
        assert!(!restored.indicator().is_running());
    }

    #[test]
    fn test_snapshot_after_host_bytes() {
        let mut button = test_button();
        button.start();
        button.tick(ms(250));

        let mut bytes = vec![0xAB, 0xCD, 0xEF]; // host prefix
        let host_len = bytes.len();
        button.save_state(&mut bytes);
        assert_eq!(bytes.len(), host_len + SNAPSHOT_LEN);

        let mut restored = test_button();
        restored.restore_state(&bytes[host_len..]);
        assert_eq!(restored.state(), State::Collapsing);
    }

    #[test]
    fn test_corrupt_snapshot_falls_back_to_normal() {
        let mut truncated = Vec::new();
        Snapshot {
            state: State::Loading,
            current_width: 40,
            size_play_time_ms: 0,
            indicator_play_time_ms: 100,
        }
        .encode_into(&mut truncated);
        truncated.truncate(10);

        let mut button = test_button();
        button.start();
        button.restore_state(&truncated);
        assert_eq!(button.state(), State::Normal);
        assert_eq!(button.current_width(), 200.0);
        assert!(!button.indicator().is_running());

        // Unknown state ordinal.
        let mut bad = vec![0u8; SNAPSHOT_LEN];
        bad[3] = 9;
        assert_eq!(Snapshot::decode(&bad), None);

        // Negative play time.
        let mut negative = Vec::new();
        Snapshot {
            state: State::Loading,
            current_width: 40,
            size_play_time_ms: 0,
            indicator_play_time_ms: 100,
        }
        .encode_into(&mut negative);
        negative[8] = 0xFF;
        assert_eq!(Snapshot::decode(&negative), None);
    }
}
