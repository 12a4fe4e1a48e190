pub mod renderer;
pub mod terminal;

pub use renderer::{Hud, Renderer};
pub use terminal::{FrameSink, RenderError, TerminalSession, TerminalView};
