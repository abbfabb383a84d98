use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::app::DrillView;
use crate::ui::theme::Theme;

const AIM_MARKER: &str = "^";

/// Question, answer and aim lines of the drill screen.
pub struct QuestionArea<'a> {
    view: &'a DrillView,
    theme: &'a Theme,
}

impl<'a> QuestionArea<'a> {
    pub fn new(view: &'a DrillView, theme: &'a Theme) -> Self {
        Self { view, theme }
    }

    fn lines(&self) -> Vec<Line<'a>> {
        let colors = &self.theme.colors;
        let view = self.view;

        if view.nothing_to_practice {
            return vec![
                Line::from(Span::styled(
                    "Nothing to practice",
                    Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    "Select drill categories with Ctrl+O",
                    Style::default().fg(colors.text_pending()),
                )),
            ];
        }

        let (done, pending) = split_at_chars(&view.question, view.answer.chars().count());
        let question = Line::from(vec![
            Span::styled(done, Style::default().fg(colors.text_correct())),
            Span::styled(pending, Style::default().fg(colors.fg())),
        ]);

        let mut answer = vec![Span::styled(
            view.answer.as_str(),
            Style::default().fg(colors.text_correct()),
        )];
        if let Some(miss) = &view.miss {
            answer.push(Span::styled(
                miss.as_str(),
                Style::default()
                    .fg(colors.text_incorrect())
                    .bg(colors.text_incorrect_bg())
                    .add_modifier(Modifier::UNDERLINED),
            ));
        }

        let aim = Line::from(Span::styled(
            aim_line(view.aim),
            Style::default().fg(colors.aim()).add_modifier(Modifier::BOLD),
        ));

        let mut lines = vec![question, Line::from(answer), aim];
        if let Some(error) = &view.error {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                error.as_str(),
                Style::default().fg(colors.error()),
            )));
        }
        lines
    }
}

fn split_at_chars(text: &str, chars: usize) -> (&str, &str) {
    let index = text
        .char_indices()
        .nth(chars)
        .map_or(text.len(), |(index, _)| index);
    text.split_at(index)
}

fn aim_line(column: usize) -> String {
    format!("{}{AIM_MARKER}", " ".repeat(column))
}

impl Widget for QuestionArea<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let lines = self.lines();
        let top = inner.height.saturating_sub(lines.len() as u16) / 2;
        let body = Rect::new(
            inner.x,
            inner.y + top,
            inner.width,
            inner.height.saturating_sub(top),
        );

        let alignment = if self.view.nothing_to_practice {
            Alignment::Center
        } else {
            Alignment::Left
        };
        Paragraph::new(lines).alignment(alignment).render(body, buf);
    }
}
