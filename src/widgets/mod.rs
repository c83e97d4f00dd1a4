//! Rendering-agnostic widget core.
//!
//! The state machine, indicator abstraction, variant registry, and
//! snapshot codec live here and draw only through the `Surface` trait;
//! the ratatui frontend under `crate::tui` renders them.

pub mod button;
pub mod indicator;
pub mod registry;
pub mod snapshot;

pub use button::{MorphButton, Outcome, Padding, State};
pub use indicator::{ArcSpinner, IndicatorCore, IndicatorFrame, ProgressIndicator};
pub use registry::{IndicatorFactory, IndicatorRegistry};
pub use snapshot::Snapshot;
