use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::game::{GameState, Position};

/// Figures shown in the header above the grid
#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub title: &'static str,
    pub episode: u32,
    pub best_score: u32,
    pub mean_score: f32,
    /// Exploration threshold out of the policy range; absent when playing greedily
    pub explore_threshold: Option<u32>,
    /// Extra status text such as speed or pause state
    pub status: Option<String>,
}

impl Hud {
    pub fn new(title: &'static str) -> Self {
        Self {
            title,
            episode: 0,
            best_score: 0,
            mean_score: 0.0,
            explore_threshold: None,
            status: None,
        }
    }
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, state: &GameState, hud: &Hud) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        frame.render_widget(self.render_stats(state, hud), chunks[0]);

        let game_area = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(10),
                Constraint::Percentage(80),
                Constraint::Percentage(10),
            ])
            .split(chunks[1])[1];

        if state.is_alive {
            frame.render_widget(self.render_grid(state, hud), game_area);
        } else {
            frame.render_widget(self.render_game_over(state), game_area);
        }

        frame.render_widget(self.render_controls(hud), chunks[2]);
    }

    fn render_grid(&self, state: &GameState, hud: &Hud) -> Paragraph<'_> {
        let mut lines = Vec::new();
        let head = state.snake.head();

        for row in 0..state.rows() {
            let mut spans = Vec::new();

            for col in 0..state.columns() {
                let pos = Position::new(col * state.cell_size, row * state.cell_size);

                let cell = if pos == head {
                    Span::styled(
                        "■ ",
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    )
                } else if state.snake.contains(pos) {
                    Span::styled("□ ", Style::default().fg(Color::Green))
                } else if pos == state.food {
                    Span::styled(
                        "O ",
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::styled(". ", Style::default().fg(Color::DarkGray))
                };

                spans.push(cell);
            }

            lines.push(Line::from(spans));
        }

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(Color::White))
                    .title(format!(" {} ", hud.title)),
            )
            .alignment(Alignment::Center)
    }

    fn render_stats(&self, state: &GameState, hud: &Hud) -> Paragraph<'_> {
        let label = |text: &'static str| Span::styled(text, Style::default().fg(Color::Yellow));
        let value = |text: String| Span::styled(text, Style::default().fg(Color::White));

        let mut first = vec![
            label("Score: "),
            Span::styled(
                state.score.to_string(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            label("Best: "),
            value(hud.best_score.to_string()),
            Span::raw("    "),
            label("Mean: "),
            value(format!("{:.2}", hud.mean_score)),
        ];
        if let Some(status) = &hud.status {
            first.push(Span::raw("    "));
            first.push(Span::styled(status.clone(), Style::default().fg(Color::Magenta)));
        }

        let mut second = vec![
            label("Episode: "),
            value(hud.episode.to_string()),
            Span::raw("    "),
            label("Generation: "),
            value(state.generation.to_string()),
            Span::raw("    "),
            label("Frame: "),
            value(state.frame_iteration.to_string()),
        ];
        if let Some(threshold) = hud.explore_threshold {
            second.push(Span::raw("    "));
            second.push(label("Explore: "));
            second.push(value(threshold.to_string()));
        }

        Paragraph::new(vec![Line::from(first), Line::from(second)]).alignment(Alignment::Center)
    }

    fn render_game_over(&self, state: &GameState) -> Paragraph<'_> {
        let text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "GAME OVER",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    state.score.to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
    }

    fn render_controls(&self, hud: &Hud) -> Paragraph<'_> {
        let mut spans = Vec::new();
        if hud.explore_threshold.is_none() {
            spans.extend([
                Span::styled("Space", Style::default().fg(Color::Cyan)),
                Span::raw(" pause | "),
                Span::styled("R", Style::default().fg(Color::Cyan)),
                Span::raw(" reset | "),
                Span::styled("1-4", Style::default().fg(Color::Cyan)),
                Span::raw(" speed | "),
            ]);
        }
        spans.extend([
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" to quit"),
        ]);

        Paragraph::new(vec![Line::from(spans)]).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Direction as Heading, Snake};
    use ratatui::{Terminal, backend::TestBackend};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_render_live_state() {
        let snake = Snake::new(Position::new(50, 50), Heading::Right, 3, 25);
        let state = GameState::new(snake, Position::new(100, 100), 125, 125, 25);
        let mut hud = Hud::new("Training");
        hud.episode = 12;
        hud.best_score = 4;
        hud.explore_threshold = Some(138);

        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        terminal
            .draw(|frame| Renderer::new().render(frame, &state, &hud))
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Episode: 12"));
        assert!(text.contains("Best: 4"));
        assert!(text.contains("Explore: 138"));
        assert!(text.contains("■"));
        assert!(text.contains("O"));
    }

    #[test]
    fn test_render_game_over() {
        let snake = Snake::new(Position::new(50, 50), Heading::Right, 3, 25);
        let mut state = GameState::new(snake, Position::new(100, 100), 125, 125, 25);
        state.is_alive = false;

        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        terminal
            .draw(|frame| Renderer::new().render(frame, &state, &Hud::new("Watch")))
            .unwrap();

        assert!(buffer_text(&terminal).contains("GAME OVER"));
    }
}
