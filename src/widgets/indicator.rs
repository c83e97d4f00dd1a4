//! Progress indicator abstraction and the built-in arc spinner.
//!
//! An indicator declares its animation parameters (value range, duration,
//! repeat behavior, interpolator) and a draw routine; the button drives
//! the timeline from those parameters and calls `draw` with the widget's
//! current geometry every frame. Each indicator instance owns its own
//! timeline, independent of the size morph.

use std::time::Duration;

use anyhow::Result;
use ratatui::style::Color;

use crate::anim::{Interpolator, RepeatCount, RepeatMode, Timeline};
use crate::surface::{RectF, Surface};
use crate::theme::StyleContext;
use crate::widgets::button::State;

/// Geometry and state handed to an indicator's draw call.
#[derive(Debug, Clone, Copy)]
pub struct IndicatorFrame {
    /// Padding-inset drawing bounds of the widget.
    pub bounds: RectF,
    /// Full (un-inset) widget width, used by feedback drawings.
    pub full_width: f32,
    pub state: State,
}

/// Animation state shared by every indicator implementation: the color,
/// the host-driven timeline, and the current animated value.
#[derive(Debug, Clone)]
pub struct IndicatorCore {
    color: Color,
    timeline: Timeline,
    value: f32,
}

impl IndicatorCore {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            timeline: Timeline::new(Duration::ZERO),
            value: 0.0,
        }
    }
}

/// Capability contract every indicator variant implements.
///
/// The required methods describe the variant; the provided methods are the
/// host-driving half: `start`/`start_at` configure the owned timeline from
/// the declared parameters, `tick` advances it by one frame.
pub trait ProgressIndicator {
    fn core(&self) -> &IndicatorCore;
    fn core_mut(&mut self) -> &mut IndicatorCore;

    /// Cycle start and end of the animated value.
    fn values(&self) -> (f32, f32);
    fn repeat_count(&self) -> RepeatCount;
    fn repeat_mode(&self) -> RepeatMode;
    fn duration(&self) -> Duration;
    fn interpolator(&self) -> Interpolator;

    fn draw(&self, frame: &IndicatorFrame, surface: &mut dyn Surface);

    /// One-shot feedback hooks fired by `stop(success)` / `stop(failure)`.
    fn on_success(&mut self) {}
    fn on_failure(&mut self) {}

    fn color(&self) -> Color {
        self.core().color
    }

    /// Current animated value within `values()`.
    fn value(&self) -> f32 {
        self.core().value
    }

    fn is_running(&self) -> bool {
        self.core().timeline.is_running()
    }

    /// Elapsed play time of the owned timeline.
    fn play_time(&self) -> Duration {
        self.core().timeline.play_time()
    }

    fn start(&mut self) {
        self.start_at(Duration::ZERO);
    }

    /// Start the timeline and jump to `play_time` (resume path).
    fn start_at(&mut self, play_time: Duration) {
        let timeline = Timeline::new(self.duration())
            .with_repeat(self.repeat_count(), self.repeat_mode())
            .with_interpolator(self.interpolator());
        let (from, to) = self.values();
        let core = self.core_mut();
        core.timeline = timeline;
        core.timeline.start();
        core.timeline.set_play_time(play_time);
        core.value = core.timeline.value(from, to);
    }

    fn cancel(&mut self) {
        self.core_mut().timeline.cancel();
    }

    /// Advance the owned timeline by one frame. Returns true when a redraw
    /// is needed.
    fn advance_main(&mut self, dt: Duration) -> bool {
        let (from, to) = self.values();
        let core = self.core_mut();
        if !core.timeline.is_running() {
            return false;
        }
        core.timeline.advance(dt);
        core.value = core.timeline.value(from, to);
        true
    }

    /// Per-frame hook; variants with extra timelines override this.
    fn tick(&mut self, dt: Duration) -> bool {
        self.advance_main(dt)
    }
}

const MIN_ARC_ANGLE: f32 = 30.0;
const FULL_ARC_ANGLE: f32 = 270.0;

const CYCLE_START: f32 = 0.0;
const CYCLE_END: f32 = 8.0;

const SPIN_DURATION: Duration = Duration::from_millis(8000);
const SUCCESS_DURATION: Duration = Duration::from_millis(5000);

/// The built-in indeterminate spinner: a round-capped arc that grows from
/// a 30° stub to a 300° sweep and back while rotating, four growth/shrink
/// pairs per 8-unit cycle. Success feedback fills a circle grown from the
/// center; failure is a reserved hook that draws nothing.
pub struct ArcSpinner {
    core: IndicatorCore,
    stroke_width: f32,
    success: Timeline,
    success_value: f32,
}

impl ArcSpinner {
    pub fn new(color: Color) -> Self {
        Self::with_stroke_width(color, crate::theme::DEFAULT_STROKE_WIDTH)
    }

    pub fn with_stroke_width(color: Color, stroke_width: f32) -> Self {
        Self {
            core: IndicatorCore::new(color),
            stroke_width,
            success: Timeline::new(SUCCESS_DURATION),
            success_value: 0.0,
        }
    }

    /// Themed constructor used by the registry and the default path.
    pub fn themed(ctx: &StyleContext) -> Result<Box<dyn ProgressIndicator>> {
        Ok(Box::new(Self::with_stroke_width(
            ctx.indicator_color(),
            ctx.stroke_width(),
        )))
    }

    /// Rotation, start angle, and sweep angle for an animated value `v`
    /// cycling over `[0, 8)`.
    fn arc_geometry(v: f32) -> (f32, f32, f32) {
        let iteration = (v / 2.0).floor();
        let frac = v - iteration * 2.0;
        let rotation = -90.0 * iteration + 360.0 * frac;
        let (start_angle, sweep_angle) = if frac <= 1.0 {
            (0.0, FULL_ARC_ANGLE * frac + MIN_ARC_ANGLE)
        } else {
            (
                FULL_ARC_ANGLE * (frac - 1.0),
                FULL_ARC_ANGLE * (2.0 - frac) + MIN_ARC_ANGLE,
            )
        };
        (rotation, start_angle, sweep_angle)
    }

    fn draw_spinner(&self, frame: &IndicatorFrame, surface: &mut dyn Surface) {
        let mut rect = frame.bounds;
        rect.inset(self.stroke_width, self.stroke_width);

        let (rotation, start_angle, sweep_angle) = Self::arc_geometry(self.value());

        surface.save();
        surface.rotate(rotation, rect.center_x(), rect.center_y());
        surface.stroke_arc(rect, start_angle, sweep_angle, self.stroke_width, self.color());
        surface.restore();
    }

    fn draw_success(&self, frame: &IndicatorFrame, surface: &mut dyn Surface) {
        let multiplier = self.success_value / 100.0;
        surface.fill_circle(
            frame.bounds.center_x(),
            frame.bounds.center_y(),
            frame.full_width / 2.0 * multiplier,
            self.color(),
        );
    }

    fn draw_failure(&self, _frame: &IndicatorFrame, _surface: &mut dyn Surface) {}
}

impl ProgressIndicator for ArcSpinner {
    fn core(&self) -> &IndicatorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut IndicatorCore {
        &mut self.core
    }

    fn values(&self) -> (f32, f32) {
        (CYCLE_START, CYCLE_END)
    }

    fn repeat_count(&self) -> RepeatCount {
        RepeatCount::Infinite
    }

    fn repeat_mode(&self) -> RepeatMode {
        RepeatMode::Restart
    }

    fn duration(&self) -> Duration {
        SPIN_DURATION
    }

    fn interpolator(&self) -> Interpolator {
        Interpolator::Linear
    }

    fn draw(&self, frame: &IndicatorFrame, surface: &mut dyn Surface) {
        match frame.state {
            State::Loading => self.draw_spinner(frame, surface),
            State::Succeed => self.draw_success(frame, surface),
            State::Failed => self.draw_failure(frame, surface),
            _ => {}
        }
    }

    fn on_success(&mut self) {
        self.success.start();
    }

    fn tick(&mut self, dt: Duration) -> bool {
        let mut redraw = self.advance_main(dt);
        if self.success.is_running() {
            self.success.advance(dt);
            self.success_value = self.success.value(0.0, 100.0);
            redraw = true;
        }
        redraw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_arc_geometry_cycle_start() {
        let (rotation, start, sweep) = ArcSpinner::arc_geometry(0.0);
        assert_eq!(rotation, 0.0);
        assert_eq!(start, 0.0);
        assert_eq!(sweep, 30.0);
    }

    #[test]
    fn test_arc_geometry_full_growth() {
        let (rotation, start, sweep) = ArcSpinner::arc_geometry(1.0);
        assert_eq!(rotation, 360.0);
        assert_eq!(start, 0.0);
        assert_eq!(sweep, 300.0);
    }

    #[test]
    fn test_arc_geometry_mid_shrink() {
        let (rotation, start, sweep) = ArcSpinner::arc_geometry(1.5);
        assert_eq!(rotation, 540.0);
        assert_eq!(start, 135.0);
        assert_eq!(sweep, 165.0);
    }

    #[test]
    fn test_arc_geometry_second_iteration() {
        let (rotation, start, sweep) = ArcSpinner::arc_geometry(2.0);
        assert_eq!(rotation, -90.0);
        assert_eq!(start, 0.0);
        assert_eq!(sweep, 30.0);
    }

    #[test]
    fn test_arc_geometry_last_iteration() {
        // v = 6.0: iteration 3, frac 0.
        let (rotation, start, sweep) = ArcSpinner::arc_geometry(6.0);
        assert_eq!(rotation, -270.0);
        assert_eq!(start, 0.0);
        assert_eq!(sweep, 30.0);
    }

    #[test]
    fn test_spinner_timeline_parameters() {
        let spinner = ArcSpinner::new(Color::White);
        assert_eq!(spinner.values(), (0.0, 8.0));
        assert_eq!(spinner.repeat_count(), RepeatCount::Infinite);
        assert_eq!(spinner.repeat_mode(), RepeatMode::Restart);
        assert_eq!(spinner.duration(), ms(8000));
        assert_eq!(spinner.interpolator(), Interpolator::Linear);
    }

    #[test]
    fn test_value_cycles_over_eight_units() {
        let mut spinner = ArcSpinner::new(Color::White);
        spinner.start();
        spinner.tick(ms(1000));
        assert!((spinner.value() - 1.0).abs() < 1e-4);
        spinner.tick(ms(8000));
        assert!((spinner.value() - 1.0).abs() < 1e-4);
        assert!(spinner.value() < 8.0);
    }

    #[test]
    fn test_start_at_resumes_play_time() {
        let mut spinner = ArcSpinner::new(Color::White);
        spinner.start_at(ms(4000));
        assert_eq!(spinner.play_time(), ms(4000));
        assert!((spinner.value() - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_success_feedback_grows() {
        let mut spinner = ArcSpinner::new(Color::White);
        spinner.start();
        spinner.on_success();
        spinner.tick(ms(2500));
        assert!((spinner.success_value - 50.0).abs() < 1e-3);
        spinner.tick(ms(5000));
        assert_eq!(spinner.success_value, 100.0);
    }

    #[test]
    fn test_tick_without_start_requests_nothing() {
        let mut spinner = ArcSpinner::new(Color::White);
        assert!(!spinner.tick(ms(16)));
        assert_eq!(spinner.value(), 0.0);
    }
}
