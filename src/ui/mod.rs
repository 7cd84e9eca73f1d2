pub mod card;
pub mod detail;
pub mod grid;
pub mod help;
pub mod input;
pub mod status_bar;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

use crate::app::{App, AppMode};

use detail::DetailView;
use grid::CardGrid;
use help::HelpView;
use input::TextInput;
use status_bar::StatusBar;

pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Layout: main content + status bar + search input while typing
    let bottom_height = if app.mode == AppMode::Search { 2 } else { 1 };

    let [main_area, bottom_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(bottom_height)]).areas(area);

    if app.mode == AppMode::Search {
        let [status_area, input_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).areas(bottom_area);
        frame.render_widget(StatusBar::new(app), status_area);
        frame.render_widget(TextInput::new("/", &app.search_input), input_area);
    } else {
        frame.render_widget(StatusBar::new(app), bottom_area);
    }

    // Either the single selected record or the (possibly filtered) grid.
    if let Some(city) = app.search.selection() {
        frame.render_widget(DetailView::new(city), main_area);
    } else {
        frame.render_widget(CardGrid::new(app), main_area);
    }

    if app.show_help {
        frame.render_widget(HelpView::new(), frame.area());
    }
}
