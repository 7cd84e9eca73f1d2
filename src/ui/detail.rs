use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};

use crate::api::types::CityWeather;
use crate::ui::card::format_temp;

/// Detail view for one selected record: a single large centered card.
pub struct DetailView<'a> {
    pub city: &'a CityWeather,
}

impl<'a> DetailView<'a> {
    pub fn new(city: &'a CityWeather) -> Self {
        Self { city }
    }
}

impl Widget for DetailView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = 46u16.min(area.width.saturating_sub(2));
        let height = 9u16.min(area.height.saturating_sub(1));
        if width == 0 || height == 0 {
            return;
        }
        let x = area.x + (area.width.saturating_sub(width)) / 2;
        let y = area.y + (area.height.saturating_sub(height)) / 2;
        let panel = Rect::new(x, y, width, height);

        Clear.render(panel, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", self.city.title))
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .border_style(Style::default().fg(Color::Cyan));

        let inner = block.inner(panel);
        block.render(panel, buf);

        let mut lines = vec![
            Line::from(Span::styled(
                format_temp(self.city.temp_c),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(self.city.description.as_str()),
        ];

        if let Some(ref country) = self.city.country {
            lines.push(Line::from(Span::styled(
                country.as_str(),
                Style::default().fg(Color::DarkGray),
            )));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            self.city.icon_url.as_str(),
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(Span::styled(
            " Esc to go back ",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));

        Paragraph::new(lines).render(inner, buf);
    }
}
