//! Key bindings shared by the training view and watch mode

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Playback speed settings for watching an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualizationSpeed {
    /// Slow: 2 Hz (500ms per step)
    Slow,
    /// Normal: 8 Hz (125ms per step)
    Normal,
    /// Fast: 20 Hz (50ms per step)
    Fast,
    /// Very Fast: 60 Hz (16ms per step)
    VeryFast,
}

impl VisualizationSpeed {
    /// Speeds in key order, `1` to `4`
    pub const ALL: [VisualizationSpeed; 4] = [Self::Slow, Self::Normal, Self::Fast, Self::VeryFast];

    /// Speed bound to a digit key
    pub fn from_digit(digit: char) -> Option<Self> {
        let index = digit.to_digit(10)?.checked_sub(1)?;
        Self::ALL.get(index as usize).copied()
    }

    /// Time between two game ticks
    pub fn tick_interval(&self) -> Duration {
        match self {
            Self::Slow => Duration::from_millis(500),
            Self::Normal => Duration::from_millis(125),
            Self::Fast => Duration::from_millis(50),
            Self::VeryFast => Duration::from_millis(16),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Slow => "Slow",
            Self::Normal => "Normal",
            Self::Fast => "Fast",
            Self::VeryFast => "Very Fast",
        }
    }
}

/// What a key press asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    TogglePause,
    Reset,
    Speed(VisualizationSpeed),
    None,
}

/// Maps crossterm key events to [`KeyAction`]s
pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle_key_event(&self, key: KeyEvent) -> KeyAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyAction::Quit;
        }

        match key.code {
            KeyCode::Esc => KeyAction::Quit,
            KeyCode::Char(c) => match c.to_ascii_lowercase() {
                'q' => KeyAction::Quit,
                ' ' | 'p' => KeyAction::TogglePause,
                'r' => KeyAction::Reset,
                digit => VisualizationSpeed::from_digit(digit)
                    .map_or(KeyAction::None, KeyAction::Speed),
            },
            _ => KeyAction::None,
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_visualization_speed() {
        assert_eq!(VisualizationSpeed::Slow.tick_interval(), Duration::from_millis(500));
        assert_eq!(VisualizationSpeed::Normal.tick_interval(), Duration::from_millis(125));
        assert_eq!(VisualizationSpeed::Fast.tick_interval(), Duration::from_millis(50));
        assert_eq!(VisualizationSpeed::VeryFast.tick_interval(), Duration::from_millis(16));
    }

    #[test]
    fn test_speed_from_digit() {
        assert_eq!(VisualizationSpeed::from_digit('2'), Some(VisualizationSpeed::Normal));
        assert_eq!(VisualizationSpeed::from_digit('0'), None);
        assert_eq!(VisualizationSpeed::from_digit('5'), None);
        assert_eq!(VisualizationSpeed::from_digit('x'), None);
    }

    #[test]
    fn test_quit_keys() {
        let handler = InputHandler::new();

        assert_eq!(handler.handle_key_event(key(KeyCode::Char('q'))), KeyAction::Quit);
        assert_eq!(handler.handle_key_event(key(KeyCode::Esc)), KeyAction::Quit);

        let q_upper = KeyEvent::new(KeyCode::Char('Q'), KeyModifiers::SHIFT);
        assert_eq!(handler.handle_key_event(q_upper), KeyAction::Quit);
    }

    #[test]
    fn test_ctrl_c() {
        let handler = InputHandler::new();

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handler.handle_key_event(ctrl_c), KeyAction::Quit);
    }

    #[test]
    fn test_pause_and_reset() {
        let handler = InputHandler::new();

        assert_eq!(handler.handle_key_event(key(KeyCode::Char(' '))), KeyAction::TogglePause);
        assert_eq!(handler.handle_key_event(key(KeyCode::Char('p'))), KeyAction::TogglePause);
        assert_eq!(handler.handle_key_event(key(KeyCode::Char('r'))), KeyAction::Reset);

        let r_upper = KeyEvent::new(KeyCode::Char('R'), KeyModifiers::SHIFT);
        assert_eq!(handler.handle_key_event(r_upper), KeyAction::Reset);
    }

    #[test]
    fn test_speed_keys() {
        let handler = InputHandler::new();

        assert_eq!(
            handler.handle_key_event(key(KeyCode::Char('1'))),
            KeyAction::Speed(VisualizationSpeed::Slow)
        );
        assert_eq!(
            handler.handle_key_event(key(KeyCode::Char('4'))),
            KeyAction::Speed(VisualizationSpeed::VeryFast)
        );
    }

    #[test]
    fn test_unknown_key() {
        let handler = InputHandler::new();
        assert_eq!(handler.handle_key_event(key(KeyCode::Char('x'))), KeyAction::None);
        assert_eq!(handler.handle_key_event(key(KeyCode::Up)), KeyAction::None);
    }
}
