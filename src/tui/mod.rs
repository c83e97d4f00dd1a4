//! TUI frontend (ratatui-based).
//!
//! Hosts the widget core: terminal lifecycle and the demo loop in `app`,
//! the braille rasterizer implementing the drawing surface in `surface`,
//! and the background/shape decorator in `background`.

pub mod app;
pub mod background;
pub mod surface;

pub use app::run;
pub use surface::BrailleSurface;
