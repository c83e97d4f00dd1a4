//! Morphing button state machine (rendering-agnostic).
//!
//! A pill-shaped text button that collapses into a circle on `start()`,
//! runs its progress indicator while loading, optionally reports a
//! success/failure outcome, and expands back on `stop()`. The host feeds
//! frame time into `tick` and draws through a [`Surface`]; no other
//! execution context touches the widget.

use std::time::Duration;

use anyhow::Result;
use ratatui::style::Color;

use crate::anim::Timeline;
use crate::config::ButtonConfig;
use crate::surface::{RectF, Surface, TextStyle};
use crate::theme::{StyleContext, Theme};
use crate::widgets::indicator::{IndicatorFrame, ProgressIndicator};
use crate::widgets::registry::IndicatorRegistry;

pub const SIZE_ANIMATION_DURATION: Duration = Duration::from_millis(500);

const DEFAULT_TEXT_SIZE: f32 = 15.0;

/// Widget lifecycle state. Declaration order is the persisted ordinal
/// order; do not reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Normal,
    Collapsing,
    Loading,
    Extending,
    Succeed,
    Failed,
}

impl State {
    /// States where the indicator draws instead of the text.
    pub fn is_indication(self) -> bool {
        matches!(self, State::Loading | State::Succeed | State::Failed)
    }

    pub(crate) fn ordinal(self) -> i32 {
        match self {
            State::Normal => 0,
            State::Collapsing => 1,
            State::Loading => 2,
            State::Extending => 3,
            State::Succeed => 4,
            State::Failed => 5,
        }
    }

    pub(crate) fn from_ordinal(ordinal: i32) -> Option<Self> {
        match ordinal {
            0 => Some(State::Normal),
            1 => Some(State::Collapsing),
            2 => Some(State::Loading),
            3 => Some(State::Extending),
            4 => Some(State::Succeed),
            5 => Some(State::Failed),
            _ => None,
        }
    }
}

/// Outcome reported when stopping with feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

/// Edge padding around the text, in surface units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Padding {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Padding {
    pub fn symmetric(horizontal: f32, vertical: f32) -> Self {
        Self {
            left: horizontal,
            top: vertical,
            right: horizontal,
            bottom: vertical,
        }
    }

    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

/// Width interpolation between the expanded and collapsed extents.
#[derive(Debug, Clone)]
struct SizeMorph {
    start_width: f32,
    end_width: f32,
    timeline: Timeline,
}

impl SizeMorph {
    fn new() -> Self {
        Self {
            start_width: 0.0,
            end_width: 0.0,
            timeline: Timeline::new(SIZE_ANIMATION_DURATION),
        }
    }

    fn current_width(&self) -> f32 {
        self.timeline.value(self.start_width, self.end_width)
    }
}

/// The morphing button widget.
pub struct MorphButton {
    text: String,
    text_size: f32,
    text_color: Color,
    padding: Padding,

    state: State,

    text_width: f32,
    text_height: f32,
    current_width: f32,

    morph: SizeMorph,
    indicator: Box<dyn ProgressIndicator>,

    dirty: bool,
}

impl MorphButton {
    pub fn new(text: &str, indicator: Box<dyn ProgressIndicator>) -> Self {
        Self {
            text: text.to_string(),
            text_size: DEFAULT_TEXT_SIZE,
            text_color: Color::White,
            padding: Padding::default(),
            state: State::Normal,
            text_width: 0.0,
            text_height: 0.0,
            current_width: 0.0,
            morph: SizeMorph::new(),
            indicator,
            dirty: true,
        }
    }

    /// Build a button from configuration, constructing the configured
    /// indicator variant through the registry. A bad variant name or a
    /// failing constructor is a fatal configuration error.
    pub fn from_config(
        config: &ButtonConfig,
        theme: &Theme,
        registry: &IndicatorRegistry,
    ) -> Result<Self> {
        let ctx = StyleContext {
            theme,
            button: config,
            style_attr: config.style.as_deref().unwrap_or(""),
            default_style: "default",
        };
        let indicator = registry.construct(config.progress_indicator.as_deref(), &ctx)?;

        let mut button = Self::new(&config.text, indicator);
        button.text_size = config.text_size;
        button.text_color = ctx.text_color();
        button.padding = Padding::symmetric(config.padding_horizontal, config.padding_vertical);
        Ok(button)
    }

    /// Measure the text through the surface and size the widget to it.
    /// Call once before the first draw and after any text change.
    pub fn measure(&mut self, surface: &dyn Surface) {
        let (width, height) = surface.measure_text(&self.text, self.text_size);
        self.text_width = width;
        self.text_height = height;
        if self.state == State::Normal {
            self.current_width = self.expanded_width();
        }
        self.dirty = true;
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        // Stale until the host re-measures.
        self.dirty = true;
    }

    pub fn set_text_size(&mut self, text_size: f32) {
        self.text_size = text_size;
        self.dirty = true;
    }

    pub fn set_text_color(&mut self, color: Color) {
        self.text_color = color;
        self.dirty = true;
    }

    pub fn set_padding(&mut self, padding: Padding) {
        self.padding = padding;
        self.dirty = true;
    }

    /// Swap in a caller-constructed indicator. If loading, the new
    /// indicator resumes from the old one's play time.
    pub fn set_indicator(&mut self, indicator: Box<dyn ProgressIndicator>) {
        let play_time = self.indicator.play_time();
        self.indicator = indicator;
        if self.state == State::Loading {
            self.indicator.start_at(play_time);
        }
        self.dirty = true;
    }

    pub fn indicator(&self) -> &dyn ProgressIndicator {
        self.indicator.as_ref()
    }

    /// Width of the control showing full text.
    pub fn expanded_width(&self) -> f32 {
        self.text_width + self.padding.horizontal()
    }

    /// Width of the control reduced to a circle sized to one text line.
    pub fn collapsed_width(&self) -> f32 {
        self.text_height + self.padding.horizontal()
    }

    /// Animated width; equals the expanded width in `Normal`.
    pub fn current_width(&self) -> f32 {
        self.current_width
    }

    /// Width the widget currently occupies.
    pub fn width(&self) -> f32 {
        match self.state {
            State::Normal => self.expanded_width(),
            _ => self.current_width,
        }
    }

    pub fn height(&self) -> f32 {
        self.text_height + self.padding.vertical()
    }

    /// Fractional progress between the collapsed and expanded extents,
    /// clamped to `[0, 1]`. Drives the text fade and shrink.
    pub fn size_multiplier(&self) -> f32 {
        if self.state == State::Normal {
            return 1.0;
        }
        let span = self.expanded_width() - self.collapsed_width();
        if span <= 0.0 {
            return 1.0;
        }
        ((self.current_width - self.collapsed_width()) / span).clamp(0.0, 1.0)
    }

    /// Begin loading: collapse from the current width into the circle,
    /// then run the indicator. No-op while already loading.
    pub fn start(&mut self) {
        if self.state == State::Loading {
            return;
        }
        tracing::debug!(from = ?self.state, "start loading");
        self.begin_size_morph(
            self.current_width,
            self.collapsed_width(),
            State::Collapsing,
            Duration::ZERO,
        );
    }

    /// Stop loading. With an outcome (only honored while `Loading`), play
    /// the indicator's one-shot feedback and stay collapsed; the resize
    /// back happens on a later `stop(None)`. Without an outcome, expand
    /// back to the text form from wherever the width currently is. No-op
    /// while `Normal`.
    pub fn stop(&mut self, outcome: Option<Outcome>) {
        if self.state == State::Normal {
            return;
        }
        match outcome {
            Some(outcome) if self.state == State::Loading => {
                tracing::debug!(?outcome, "stop loading with feedback");
                match outcome {
                    Outcome::Success => {
                        self.state = State::Succeed;
                        self.indicator.on_success();
                    }
                    Outcome::Failure => {
                        self.state = State::Failed;
                        self.indicator.on_failure();
                    }
                }
                self.dirty = true;
            }
            Some(outcome) => {
                tracing::debug!(?outcome, state = ?self.state, "outcome ignored outside Loading");
            }
            None => {
                tracing::debug!(from = ?self.state, "stop loading");
                self.begin_size_morph(
                    self.current_width,
                    self.expanded_width(),
                    State::Extending,
                    Duration::ZERO,
                );
            }
        }
    }

    /// Cancel whatever is in flight and restart the size morph over the
    /// given range at the given play time. Cancellation never fires the
    /// completion transition.
    fn begin_size_morph(&mut self, start: f32, end: f32, state: State, play_time: Duration) {
        self.morph.timeline.cancel();
        self.indicator.cancel();
        self.morph.start_width = start;
        self.morph.end_width = end;
        self.morph.timeline.start();
        self.morph.timeline.set_play_time(play_time);
        self.current_width = self.morph.current_width();
        self.state = state;
        self.dirty = true;
    }

    /// Advance the live animation by one frame. Returns true when the
    /// widget needs a redraw.
    ///
    /// The size morph's completion commits its state transition strictly
    /// before the indicator's first frame: leftover time from the
    /// completing tick is not fed into the indicator.
    pub fn tick(&mut self, dt: Duration) -> bool {
        let mut redraw = std::mem::take(&mut self.dirty);
        match self.state {
            State::Collapsing | State::Extending => {
                let finished = self.morph.timeline.advance(dt);
                self.current_width = self.morph.current_width();
                redraw = true;
                if finished {
                    self.commit_size_morph();
                }
            }
            State::Loading | State::Succeed | State::Failed => {
                redraw |= self.indicator.tick(dt);
            }
            State::Normal => {}
        }
        redraw
    }

    fn commit_size_morph(&mut self) {
        match self.state {
            State::Collapsing => {
                self.state = State::Loading;
                self.indicator.start();
            }
            State::Extending => {
                self.state = State::Normal;
                self.indicator.cancel();
            }
            _ => {}
        }
        tracing::debug!(state = ?self.state, "size morph complete");
    }

    /// Draw the widget with its top-left corner at `(left, top)`.
    pub fn draw(&self, surface: &mut dyn Surface, left: f32, top: f32) {
        let rect = RectF::new(left, top, left + self.width(), top + self.height());

        if !self.state.is_indication() {
            let multiplier = self.size_multiplier();
            let style = TextStyle {
                size: multiplier * self.text_size,
                color: self.text_color,
                alpha: (multiplier * 255.0).round() as u8,
            };
            surface.save();
            surface.draw_text(&self.text, rect.center_x(), rect.center_y(), &style);
            surface.restore();
        } else {
            let bounds = RectF::new(
                rect.left + self.padding.left,
                rect.top + self.padding.top,
                rect.right - self.padding.right,
                rect.bottom - self.padding.bottom,
            );
            let frame = IndicatorFrame {
                bounds,
                full_width: self.width(),
                state: self.state,
            };
            self.indicator.draw(&frame, surface);
        }
    }

    // Snapshot codec hooks.

    pub(crate) fn size_play_time(&self) -> Duration {
        self.morph.timeline.play_time()
    }

    pub(crate) fn indicator_play_time(&self) -> Duration {
        self.indicator.play_time()
    }

    /// Resume a size morph from a snapshot: the saved width is restored
    /// exactly; the timeline picks up from its saved offset on the next
    /// tick.
    pub(crate) fn resume_size_morph(&mut self, width: f32, state: State, play_time: Duration) {
        let end = match state {
            State::Collapsing => self.collapsed_width(),
            _ => self.expanded_width(),
        };
        self.begin_size_morph(width, end, state, play_time);
        self.current_width = width;
    }

    /// Resume the indicator from a snapshot while loading.
    pub(crate) fn resume_loading(&mut self, width: f32, play_time: Duration) {
        self.morph.timeline.cancel();
        self.state = State::Loading;
        self.current_width = width;
        self.indicator.start_at(play_time);
        self.dirty = true;
    }

    /// Jump straight to a state with no animation running.
    pub(crate) fn force_state(&mut self, state: State, width: f32) {
        self.morph.timeline.cancel();
        self.indicator.cancel();
        self.state = state;
        self.current_width = width;
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::indicator::ArcSpinner;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    /// Measurement stub: every char is 20 wide, a line is 20 tall, so
    /// "123456789" with 20 horizontal padding measures expanded=200 and
    /// collapsed=40.
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
    fn test_measurement_contract() {
        let button = test_button();
        assert_eq!(button.expanded_width(), 200.0);
        assert_eq!(button.collapsed_width(), 40.0);
        assert_eq!(button.current_width(), 200.0);
        assert_eq!(button.height(), 30.0);
    }

    #[test]
    fn test_collapse_reaches_loading() {
        let mut button = test_button();
        button.start();
        assert_eq!(button.state(), State::Collapsing);

        button.tick(ms(500));
        assert_eq!(button.state(), State::Loading);
        assert_eq!(button.current_width(), 40.0);
        // Indicator first frame is the next tick.
        button.tick(ms(1000));
        assert!((button.indicator().value() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_width_monotonically_non_increasing_while_collapsing() {
        let mut button = test_button();
        button.start();
        let mut last = button.current_width();
        for _ in 0..10 {
            button.tick(ms(50));
            let width = button.current_width();
            assert!(width <= last);
            last = width;
        }
        assert_eq!(last, 40.0);
    }

    #[test]
    fn test_start_is_idempotent_while_loading() {
        let mut button = test_button();
        button.start();
        button.tick(ms(500));
        button.tick(ms(1234));

        let play_time = button.indicator_play_time();
        button.start();
        button.start();
        assert_eq!(button.state(), State::Loading);
        assert_eq!(button.indicator_play_time(), play_time);
        assert_eq!(button.current_width(), 40.0);
    }

    #[test]
    fn test_stop_is_noop_while_normal() {
        let mut button = test_button();
        button.stop(None);
        assert_eq!(button.state(), State::Normal);
        button.stop(Some(Outcome::Success));
        assert_eq!(button.state(), State::Normal);
    }

    #[test]
    fn test_stop_extends_back_to_normal() {
        let mut button = test_button();
        button.start();
        button.tick(ms(500));
        button.stop(None);
        assert_eq!(button.state(), State::Extending);

        button.tick(ms(250));
        let midway = button.current_width();
        assert!(midway > 40.0 && midway < 200.0);

        button.tick(ms(250));
        assert_eq!(button.state(), State::Normal);
        assert_eq!(button.current_width(), 200.0);
        assert!(!button.indicator().is_running());
    }

    #[test]
    fn test_stop_midway_restarts_from_live_width() {
        let mut button = test_button();
        button.start();
        button.tick(ms(250));
        let live = button.current_width();
        assert!(live < 200.0 && live > 40.0);

        // Cancel mid-collapse: extend from the live width, no teleport.
        button.stop(None);
        assert_eq!(button.state(), State::Extending);
        assert_eq!(button.current_width(), live);

        button.tick(ms(500));
        assert_eq!(button.state(), State::Normal);
        assert_eq!(button.current_width(), 200.0);
    }

    #[test]
    fn test_outcome_plays_feedback_then_stop_extends() {
        let mut button = test_button();
        button.start();
        button.tick(ms(500));
        button.stop(Some(Outcome::Success));
        assert_eq!(button.state(), State::Succeed);
        assert_eq!(button.current_width(), 40.0);

        // Outcome outside Loading is an invalid transition: no-op.
        button.stop(Some(Outcome::Failure));
        assert_eq!(button.state(), State::Succeed);

        button.stop(None);
        assert_eq!(button.state(), State::Extending);
        button.tick(ms(500));
        assert_eq!(button.state(), State::Normal);
    }

    #[test]
    fn test_failure_outcome() {
        let mut button = test_button();
        button.start();
        button.tick(ms(500));
        button.stop(Some(Outcome::Failure));
        assert_eq!(button.state(), State::Failed);
    }

    #[test]
    fn test_size_multiplier_and_text_fade() {
        let mut button = test_button();
        assert_eq!(button.size_multiplier(), 1.0);

        button.start();
        button.tick(ms(250));
        let m = button.size_multiplier();
        assert!((m - 0.5).abs() < 1e-3);

        button.tick(ms(250));
        assert_eq!(button.size_multiplier(), 0.0);
    }

    #[test]
    fn test_ticks_report_redraws() {
        let mut button = test_button();
        // Construction-time dirty flag drains once.
        assert!(button.tick(ms(16)));
        assert!(!button.tick(ms(16)));

        button.start();
        assert!(button.tick(ms(16)));

        button.set_text_color(Color::Red);
        assert!(button.tick(ms(16)));
    }

    #[test]
    fn test_set_text_remeasures() {
        let mut button = test_button();
        button.set_text("Upload!!");
        button.set_text_size(12.0);
        button.measure(&FixedMetrics);
        assert_eq!(button.text(), "Upload!!");
        assert_eq!(button.expanded_width(), 180.0);
        assert_eq!(button.current_width(), 180.0);
    }

    #[test]
    fn test_set_indicator_resumes_while_loading() {
        let mut button = test_button();
        button.start();
        button.tick(ms(500));
        button.tick(ms(1000));

        button.set_indicator(Box::new(ArcSpinner::new(Color::Blue)));
        assert!(button.indicator().is_running());
        assert_eq!(button.indicator_play_time(), ms(1000));

        // Swapping outside Loading leaves the new indicator idle.
        button.stop(None);
        button.set_indicator(Box::new(ArcSpinner::new(Color::Red)));
        assert!(!button.indicator().is_running());
    }

    #[test]
    fn test_state_ordinal_round_trip() {
        for state in [
            State::Normal,
            State::Collapsing,
            State::Loading,
            State::Extending,
            State::Succeed,
            State::Failed,
        ] {
            assert_eq!(State::from_ordinal(state.ordinal()), Some(state));
        }
        assert_eq!(State::from_ordinal(6), None);
        assert_eq!(State::from_ordinal(-1), None);
    }
}
