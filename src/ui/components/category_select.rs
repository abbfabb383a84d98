use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget};

use crate::app::CategoryList;
use crate::ui::theme::Theme;

/// Checkbox list for choosing which drill categories are merged.
pub struct CategorySelect<'a> {
    list: &'a CategoryList,
    theme: &'a Theme,
}

impl<'a> CategorySelect<'a> {
    pub fn new(list: &'a CategoryList, theme: &'a Theme) -> Self {
        Self { list, theme }
    }
}

impl Widget for CategorySelect<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        Clear.render(area, buf);
        let block = Block::bordered()
            .title(" Drills ")
            .title_alignment(Alignment::Center)
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);

        // Keep the highlighted row on screen.
        let visible = layout[0].height as usize;
        let offset = (self.list.selected + 1).saturating_sub(visible);

        let lines: Vec<Line> = self
            .list
            .names
            .iter()
            .enumerate()
            .skip(offset)
            .take(visible)
            .map(|(i, name)| {
                let is_selected = i == self.list.selected;
                let indicator = if is_selected { ">" } else { " " };
                let mark = if self.list.is_checked(name) { "x" } else { " " };
                let style = Style::default()
                    .fg(if is_selected { colors.accent() } else { colors.fg() })
                    .add_modifier(if is_selected {
                        Modifier::BOLD
                    } else {
                        Modifier::empty()
                    });
                Line::from(Span::styled(format!(" {indicator} [{mark}] {name}"), style))
            })
            .collect();
        Paragraph::new(lines).render(layout[0], buf);

        let hint = Paragraph::new(Line::from(Span::styled(
            "[Space] Toggle  [Enter] Apply  [Esc] Cancel",
            Style::default().fg(colors.text_pending()),
        )))
        .alignment(Alignment::Center);
        hint.render(layout[1], buf);
    }
}
