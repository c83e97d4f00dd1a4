//! Pill background decorator.
//!
//! Paints the widget's current cell footprint from the theming keys and
//! flashes the ripple color on press. Applied independently of widget
//! state: it only ever reads the footprint, never the lifecycle.

use std::time::Duration;

use ratatui::{buffer::Buffer, layout::Rect, style::Color};

use crate::anim::Timeline;
use crate::config::BackgroundConfig;
use crate::theme::parse_color;

const RIPPLE_DURATION: Duration = Duration::from_millis(250);

/// How the tint combines with the base background color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TintMode {
    /// Tint replaces the base.
    SrcIn,
    /// Tint painted over the base (same as replace for opaque cells).
    SrcOver,
    /// Channel-wise multiply with the base.
    Multiply,
}

impl TintMode {
    pub fn from_name(name: &str) -> Self {
        match name {
            "multiply" => TintMode::Multiply,
            "src_over" => TintMode::SrcOver,
            _ => TintMode::SrcIn,
        }
    }
}

/// Background/shape decorator for one widget footprint.
pub struct PillBackground {
    tint: Option<Color>,
    ripple: Option<Color>,
    tint_mode: TintMode,
    user_background: bool,
    flash: Timeline,
}

impl PillBackground {
    pub fn from_config(config: &BackgroundConfig) -> Self {
        Self {
            tint: config.tint.as_deref().and_then(parse_color),
            ripple: config.ripple_color.as_deref().and_then(parse_color),
            tint_mode: TintMode::from_name(&config.tint_mode),
            user_background: config.user_background,
            flash: Timeline::new(RIPPLE_DURATION),
        }
    }

    /// Kick off the ripple flash. Ignored when the host paints its own
    /// background.
    pub fn press(&mut self) {
        if self.user_background || self.ripple.is_none() {
            return;
        }
        self.flash.start();
    }

    /// Advance the ripple. Returns true while a redraw is needed.
    pub fn tick(&mut self, dt: Duration) -> bool {
        if !self.flash.is_running() {
            return false;
        }
        self.flash.advance(dt);
        true
    }

    fn base_color(&self) -> Option<Color> {
        let tint = self.tint?;
        Some(match self.tint_mode {
            TintMode::SrcIn | TintMode::SrcOver => tint,
            TintMode::Multiply => multiply(tint, Color::Black),
        })
    }

    fn current_color(&self) -> Option<Color> {
        let base = self.base_color();
        if !self.flash.is_running() {
            return base;
        }
        let ripple = self.ripple?;
        // Fade the ripple back into the tint over the flash.
        Some(blend(ripple, base.unwrap_or(Color::Black), self.flash.fraction()))
    }

    /// Fill the footprint cells. A user-supplied background is left alone.
    pub fn render(&self, area: Rect, buf: &mut Buffer) {
        if self.user_background {
            return;
        }
        let Some(color) = self.current_color() else {
            return;
        };
        for row in 0..area.height {
            for col in 0..area.width {
                let x = area.x + col;
                let y = area.y + row;
                if x < buf.area().width && y < buf.area().height {
                    buf[(x, y)].set_bg(color);
                }
            }
        }
    }
}

fn channels(color: Color) -> (u8, u8, u8) {
    match color {
        Color::Rgb(r, g, b) => (r, g, b),
        _ => (0, 0, 0),
    }
}

fn multiply(a: Color, b: Color) -> Color {
    let (ar, ag, ab) = channels(a);
    let (br, bg, bb) = channels(b);
    Color::Rgb(
        ((u16::from(ar) * u16::from(br)) / 255) as u8,
        ((u16::from(ag) * u16::from(bg)) / 255) as u8,
        ((u16::from(ab) * u16::from(bb)) / 255) as u8,
    )
}

fn blend(from: Color, to: Color, t: f32) -> Color {
    let (fr, fg, fb) = channels(from);
    let (tr, tg, tb) = channels(to);
    let mix = |a: u8, b: u8| (f32::from(a) + (f32::from(b) - f32::from(a)) * t).round() as u8;
    Color::Rgb(mix(fr, tr), mix(fg, tg), mix(fb, tb))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackgroundConfig;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn config(tint: Option<&str>, ripple: Option<&str>, user_background: bool) -> BackgroundConfig {
        BackgroundConfig {
            tint: tint.map(str::to_string),
            ripple_color: ripple.map(str::to_string),
            tint_mode: "src_in".to_string(),
            user_background,
        }
    }

    #[test]
    fn test_tint_fills_cells() {
        let background = PillBackground::from_config(&config(Some("#102030"), None, false));
        let area = Rect::new(1, 0, 2, 1);
        let mut buf = Buffer::empty(Rect::new(0, 0, 4, 1));
        background.render(area, &mut buf);
        assert_eq!(buf[(1, 0)].bg, Color::Rgb(0x10, 0x20, 0x30));
        assert_eq!(buf[(0, 0)].bg, Color::Reset);
    }

    #[test]
    fn test_user_background_is_untouched() {
        let mut background = PillBackground::from_config(&config(Some("#102030"), Some("#ffffff"), true));
        background.press();
        assert!(!background.tick(ms(16)));
        let mut buf = Buffer::empty(Rect::new(0, 0, 2, 1));
        background.render(Rect::new(0, 0, 2, 1), &mut buf);
        assert_eq!(buf[(0, 0)].bg, Color::Reset);
    }

    #[test]
    fn test_ripple_flash_decays_to_tint() {
        let mut background =
            PillBackground::from_config(&config(Some("#000000"), Some("#ffffff"), false));
        background.press();
        assert!(background.tick(ms(0)));

        let mut buf = Buffer::empty(Rect::new(0, 0, 1, 1));
        background.render(Rect::new(0, 0, 1, 1), &mut buf);
        assert_eq!(buf[(0, 0)].bg, Color::Rgb(255, 255, 255));

        background.tick(ms(250));
        let mut buf = Buffer::empty(Rect::new(0, 0, 1, 1));
        background.render(Rect::new(0, 0, 1, 1), &mut buf);
        assert_eq!(buf[(0, 0)].bg, Color::Rgb(0, 0, 0));
    }

    #[test]
    fn test_tint_mode_parse() {
        assert_eq!(TintMode::from_name("multiply"), TintMode::Multiply);
        assert_eq!(TintMode::from_name("src_over"), TintMode::SrcOver);
        assert_eq!(TintMode::from_name("anything"), TintMode::SrcIn);
    }
}
