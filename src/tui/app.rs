//! Demo host for the morphing button.
//!
//! Sets up the terminal, runs the poll/tick/render loop, and maps keys to
//! the widget's public contract: Space toggles start/stop, `s`/`f` stop
//! with an outcome, `p` suspends into a snapshot and restores a rebuilt
//! widget from it, `q` quits.

use std::io;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::Rect,
    style::{Color, Style},
    Terminal,
};

use crate::anim::{Interpolator, RepeatCount, RepeatMode};
use crate::config::Config;
use crate::surface::Surface;
use crate::theme::StyleContext;
use crate::tui::background::PillBackground;
use crate::tui::surface::BrailleSurface;
use crate::widgets::indicator::{IndicatorCore, IndicatorFrame, ProgressIndicator};
use crate::widgets::{IndicatorFactory, IndicatorRegistry, MorphButton, Outcome, State};

/// Namespace leading-dot indicator names resolve against.
const HOST_NAMESPACE: &str = "demo";

/// Bytes the demo persists ahead of the widget snapshot.
const SNAPSHOT_MAGIC: &[u8; 4] = b"mrph";

/// Demo-owned indicator variant: a dot that breathes while loading.
/// Registered under the host namespace, so the config reaches it as
/// `.PulseDot`.
struct PulseDot {
    core: IndicatorCore,
}

impl PulseDot {
    fn themed(ctx: &StyleContext) -> Result<Box<dyn ProgressIndicator>> {
        Ok(Box::new(Self {
            core: IndicatorCore::new(ctx.indicator_color()),
        }))
    }

    fn plain() -> Box<dyn ProgressIndicator> {
        Box::new(Self {
            core: IndicatorCore::new(Color::White),
        })
    }
}

impl ProgressIndicator for PulseDot {
    fn core(&self) -> &IndicatorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut IndicatorCore {
        &mut self.core
    }

    fn values(&self) -> (f32, f32) {
        (0.0, 1.0)
    }

    fn repeat_count(&self) -> RepeatCount {
        RepeatCount::Infinite
    }

    fn repeat_mode(&self) -> RepeatMode {
        RepeatMode::Reverse
    }

    fn duration(&self) -> Duration {
        Duration::from_millis(600)
    }

    fn interpolator(&self) -> Interpolator {
        Interpolator::AccelerateDecelerate
    }

    fn draw(&self, frame: &IndicatorFrame, surface: &mut dyn Surface) {
        let max_radius = frame.bounds.width().min(frame.bounds.height()) / 2.0;
        let radius = match frame.state {
            State::Loading => max_radius * (0.3 + 0.7 * self.value()),
            State::Succeed => max_radius,
            _ => return,
        };
        surface.fill_circle(
            frame.bounds.center_x(),
            frame.bounds.center_y(),
            radius,
            self.color(),
        );
    }
}

/// Registry handed to the widget: built-ins plus the demo's own variant.
fn build_registry() -> IndicatorRegistry {
    let mut registry = IndicatorRegistry::new(HOST_NAMESPACE);
    registry.register(
        &format!("{HOST_NAMESPACE}::PulseDot"),
        IndicatorFactory::themed(PulseDot::themed).with_plain(PulseDot::plain),
    );
    registry
}

/// Run the demo until the user quits.
pub fn run(config: Config) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to setup terminal")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
    terminal.hide_cursor()?;

    let result = run_loop(&mut terminal, &config);

    // Restore the terminal even when the loop errored.
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: &Config,
) -> Result<()> {
    let registry = build_registry();
    let mut button = MorphButton::from_config(&config.button, &config.theme, &registry)?;
    let mut background = PillBackground::from_config(&config.background);

    // Text metrics come from the surface; any frame's surface will do.
    let probe = BrailleSurface::new(Rect::new(0, 0, 1, 1));
    button.measure(&probe);

    let poll_timeout = Duration::from_millis(config.demo.tick_ms.max(1));
    let mut last_tick = Instant::now();
    let mut needs_draw = true;

    loop {
        while event::poll(poll_timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Char(' ') => {
                        if button.state() == State::Normal {
                            tracing::info!("demo: start loading");
                            button.start();
                            background.press();
                        } else {
                            tracing::info!("demo: stop loading");
                            button.stop(None);
                        }
                        needs_draw = true;
                    }
                    KeyCode::Char('s') => {
                        button.stop(Some(Outcome::Success));
                        needs_draw = true;
                    }
                    KeyCode::Char('f') => {
                        button.stop(Some(Outcome::Failure));
                        needs_draw = true;
                    }
                    KeyCode::Char('p') => {
                        button = suspend_resume(button, config, &registry, &probe)?;
                        needs_draw = true;
                    }
                    _ => {}
                }
            }
        }

        let now = Instant::now();
        let dt = now - last_tick;
        last_tick = now;

        if button.tick(dt) {
            needs_draw = true;
        }
        if background.tick(dt) {
            needs_draw = true;
        }

        if needs_draw {
            terminal.draw(|frame| {
                let area = frame.area();
                let buf = frame.buffer_mut();
                render(&button, &background, area, buf);
            })?;
            needs_draw = false;
        }
    }
}

/// Snapshot round trip: persist host bytes + widget snapshot, rebuild the
/// widget from config, and resume it mid-animation.
fn suspend_resume(
    button: MorphButton,
    config: &Config,
    registry: &IndicatorRegistry,
    probe: &BrailleSurface,
) -> Result<MorphButton> {
    let mut bytes = SNAPSHOT_MAGIC.to_vec();
    button.save_state(&mut bytes);
    tracing::info!(len = bytes.len(), "demo: suspended widget");

    let mut rebuilt = MorphButton::from_config(&config.button, &config.theme, registry)?;
    rebuilt.measure(probe);
    rebuilt.restore_state(&bytes[SNAPSHOT_MAGIC.len()..]);
    tracing::info!(state = ?rebuilt.state(), "demo: restored widget");
    Ok(rebuilt)
}

fn render(button: &MorphButton, background: &PillBackground, area: Rect, buf: &mut ratatui::buffer::Buffer) {
    // Cell footprint of the widget, centered on screen.
    let width_cells = ((button.width() / 2.0).ceil() as u16).max(1);
    let height_cells = ((button.height() / 4.0).ceil() as u16).max(1);
    let left = area.width.saturating_sub(width_cells) / 2;
    let top = area.height.saturating_sub(height_cells) / 2;
    let footprint = Rect::new(
        area.x + left,
        area.y + top,
        width_cells.min(area.width),
        height_cells.min(area.height),
    );

    background.render(footprint, buf);

    let mut surface = BrailleSurface::new(footprint);
    button.draw(&mut surface, 0.0, 0.0);
    surface.flush(buf);

    if area.height > 1 {
        let status = format!(
            " {:?}  |  space start/stop  s succeed  f fail  p suspend/resume  q quit",
            button.state()
        );
        buf.set_string(
            area.x,
            area.y + area.height - 1,
            status,
            Style::default().fg(Color::DarkGray),
        );
    }
}
