use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Widget};

use crate::api::types::CityWeather;

/// Rows one card occupies in the grid, border included.
pub const CARD_HEIGHT: u16 = 5;

/// A single city card: title, temperature, condition text.
pub struct CityCard<'a> {
    pub city: &'a CityWeather,
    pub selected: bool,
}

impl<'a> CityCard<'a> {
    pub fn new(city: &'a CityWeather) -> Self {
        Self {
            city,
            selected: false,
        }
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }
}

impl Widget for CityCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let border_style = if self.selected {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", self.city.title))
            .title_style(
                Style::default()
                    .fg(if self.selected { Color::Cyan } else { Color::White })
                    .add_modifier(Modifier::BOLD),
            )
            .border_style(border_style);

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height == 0 {
            return;
        }

        let temp_line = Line::from(vec![
            Span::styled(
                format_temp(self.city.temp_c),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                self.city
                    .country
                    .as_deref()
                    .map(|c| format!("  {c}"))
                    .unwrap_or_default(),
                Style::default().fg(Color::DarkGray),
            ),
        ]);
        buf.set_line(inner.x + 1, inner.y, &temp_line, inner.width.saturating_sub(1));

        if inner.height > 1 {
            buf.set_string(
                inner.x + 1,
                inner.y + 1,
                &self.city.description,
                Style::default().fg(Color::White),
            );
        }

        if inner.height > 2 {
            buf.set_string(
                inner.x + 1,
                inner.y + 2,
                &self.city.icon_url,
                Style::default().fg(Color::DarkGray),
            );
        }
    }
}

pub fn format_temp(temp_c: f64) -> String {
    format!("{temp_c}\u{b0}C")
}

#[cfg(test)]
mod tests {
    use super::format_temp;

    #[test]
    fn formats_whole_and_fractional_readings() {
        assert_eq!(format_temp(18.0), "18°C");
        assert_eq!(format_temp(-3.5), "-3.5°C");
    }
}
