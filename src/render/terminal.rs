//! Terminal setup and the frame sink used while training

use std::io::{self, Stderr, stderr};
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use thiserror::Error;
use tracing::warn;

use super::renderer::{Hud, Renderer};
use crate::game::GameState;
use crate::input::{InputHandler, KeyAction};
use crate::modes::StopSignal;

/// Rendering failure
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("rendering unavailable: {0}")]
    Unavailable(#[from] io::Error),
}

/// Destination for per-tick frames
///
/// A failing sink is closed and then dropped by the caller; the simulation
/// never depends on it.
pub trait FrameSink {
    fn draw(&mut self, state: &GameState, hud: &Hud) -> Result<(), RenderError>;

    /// Release whatever the sink holds, such as the terminal
    fn close(&mut self) {}
}

/// Raw-mode alternate screen on stderr, given back on drop
pub struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stderr>>,
    restored: bool,
}

impl TerminalSession {
    pub fn enter() -> Result<Self, RenderError> {
        enable_raw_mode()?;

        match Self::setup() {
            Ok(terminal) => Ok(Self {
                terminal,
                restored: false,
            }),
            Err(err) => {
                let _ = execute!(stderr(), LeaveAlternateScreen);
                let _ = disable_raw_mode();
                Err(err.into())
            }
        }
    }

    fn setup() -> io::Result<Terminal<CrosstermBackend<Stderr>>> {
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stderr))?;
        terminal.hide_cursor()?;
        terminal.clear()?;
        Ok(terminal)
    }

    /// Draw one frame of `state`
    pub fn draw(
        &mut self,
        renderer: &Renderer,
        state: &GameState,
        hud: &Hud,
    ) -> Result<(), RenderError> {
        self.terminal
            .draw(|frame| renderer.render(frame, state, hud))?;
        Ok(())
    }

    /// Leave the alternate screen and give the terminal back
    pub fn restore(&mut self) -> Result<(), RenderError> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;

        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

/// Full-screen view used while training
///
/// Keys are polled without blocking on every frame; a quit key requests the
/// shared stop signal.
pub struct TerminalView {
    session: TerminalSession,
    renderer: Renderer,
    input: InputHandler,
    stop: StopSignal,
}

impl TerminalView {
    pub fn new(stop: StopSignal) -> Result<Self, RenderError> {
        Ok(Self {
            session: TerminalSession::enter()?,
            renderer: Renderer::new(),
            input: InputHandler::new(),
            stop,
        })
    }

    fn poll_input(&mut self) -> Result<(), RenderError> {
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press
                    && self.input.handle_key_event(key) == KeyAction::Quit
                {
                    self.stop.request();
                }
            }
        }
        Ok(())
    }

    pub fn restore(&mut self) -> Result<(), RenderError> {
        self.session.restore()
    }
}

impl FrameSink for TerminalView {
    fn draw(&mut self, state: &GameState, hud: &Hud) -> Result<(), RenderError> {
        self.poll_input()?;
        self.session.draw(&self.renderer, state, hud)
    }

    fn close(&mut self) {
        if let Err(err) = self.restore() {
            warn!(error = %err, "failed to restore terminal");
        }
    }
}
