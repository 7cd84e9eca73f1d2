use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Widget};

use crate::app::App;
use crate::ui::card::{CARD_HEIGHT, CityCard};

/// Scrollable grid of city cards with selection highlight.
pub struct CardGrid<'a> {
    pub app: &'a App,
}

impl<'a> CardGrid<'a> {
    pub fn new(app: &'a App) -> Self {
        Self { app }
    }
}

impl Widget for CardGrid<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let app = self.app;
        let cities = app.visible_cities();

        let title = if app.search.is_filtering() {
            format!(" Cities matching \"{}\" ", app.search.query())
        } else {
            format!(" Cities ({}) ", cities.len())
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .border_style(Style::default().fg(Color::DarkGray));

        let inner = block.inner(area);
        block.render(area, buf);

        if cities.is_empty() {
            let msg = if app.is_loading() {
                "Loading..."
            } else if app.search.is_filtering() {
                "No matching cities"
            } else {
                "No weather data"
            };
            buf.set_string(
                inner.x + 1,
                inner.y,
                msg,
                Style::default().fg(Color::DarkGray),
            );
            return;
        }

        let per_row = app.config.cards_per_row.max(1) as usize;
        let total_rows = cities.len().div_ceil(per_row);
        let visible_rows = (inner.height / CARD_HEIGHT).max(1) as usize;
        let selected_row = app.selected_index / per_row;
        let first_row = first_visible_row(selected_row, total_rows, visible_rows);

        let card_width = inner.width / per_row as u16;
        if card_width == 0 {
            return;
        }

        for (row_offset, row) in (first_row..total_rows).enumerate() {
            let y = inner.y + (row_offset as u16) * CARD_HEIGHT;
            if y + CARD_HEIGHT > inner.y + inner.height {
                break;
            }
            for col in 0..per_row {
                let idx = row * per_row + col;
                let Some(city) = cities.get(idx) else {
                    break;
                };
                let card_area = Rect::new(
                    inner.x + (col as u16) * card_width,
                    y,
                    card_width,
                    CARD_HEIGHT,
                );
                CityCard::new(city)
                    .selected(idx == app.selected_index)
                    .render(card_area, buf);
            }
        }
    }
}

/// First row to render so that the selected row stays within the viewport.
/// Card rows are uniform height, so this is a plain sliding window.
fn first_visible_row(selected_row: usize, total_rows: usize, visible_rows: usize) -> usize {
    if total_rows <= visible_rows {
        return 0;
    }
    let max_first = total_rows - visible_rows;
    selected_row
        .saturating_sub(visible_rows.saturating_sub(1))
        .min(max_first)
}
