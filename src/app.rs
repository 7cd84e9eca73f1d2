use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::DefaultTerminal;
use tokio::task::AbortHandle;

use crate::api::WeatherApiClient;
use crate::api::types::CityWeather;
use crate::config::AppConfig;
use crate::event::{ApiResult, AppEvent, Event, EventHandler};
use crate::search::{SearchAction, SearchState, filter_cities};
use crate::ui;

// ---------------------------------------------------------------------------
// App mode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppMode {
    Normal,
    Search,
}

// ---------------------------------------------------------------------------
// Fetch failure record
// ---------------------------------------------------------------------------

/// A city whose fetch failed. Kept out of the card grid but surfaced in the
/// status bar instead of being silently dropped.
#[derive(Debug, Clone)]
pub struct FetchFailure {
    pub city: String,
    pub error: String,
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    pub running: bool,
    pub events: EventHandler,
    pub config: AppConfig,
    pub mode: AppMode,

    // Accumulated records, in arrival order (fetches race).
    pub cities: Vec<CityWeather>,
    pub failed: Vec<FetchFailure>,
    pub pending_fetches: usize,
    fetch_generation: u64,
    fetch_tasks: Vec<AbortHandle>,

    // Search/selection controller
    pub search: SearchState,
    pub search_input: String,
    search_generation: u64,
    debounce: Option<AbortHandle>,

    // UI state
    pub selected_index: usize,
    pub show_help: bool,
    pub status_message: Option<String>,

    // API client (shared with spawned fetch tasks)
    pub api_client: Option<Arc<WeatherApiClient>>,
}

impl App {
    pub fn new(config: AppConfig, api_client: Option<WeatherApiClient>) -> Self {
        let events = EventHandler::new(config.tick_rate_fps);
        Self {
            running: true,
            events,
            config,
            mode: AppMode::Normal,
            cities: Vec::new(),
            failed: Vec::new(),
            pending_fetches: 0,
            fetch_generation: 0,
            fetch_tasks: Vec::new(),
            search: SearchState::default(),
            search_input: String::new(),
            search_generation: 0,
            debounce: None,
            selected_index: 0,
            show_help: false,
            status_message: None,
            api_client: api_client.map(Arc::new),
        }
    }

    // -- Main event loop ----------------------------------------------------

    pub async fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        self.events.send(AppEvent::RefreshAll);

        while self.running {
            terminal.draw(|frame| self.draw(frame))?;
            match self.events.next().await? {
                Event::Tick => self.tick(),
                Event::Crossterm(event) => {
                    if let crossterm::event::Event::Key(key) = event
                        && key.kind == crossterm::event::KeyEventKind::Press
                    {
                        self.handle_key_event(key);
                    }
                }
                Event::App(app_event) => self.handle_app_event(app_event),
            }
        }

        self.abort_background_tasks();
        Ok(())
    }

    fn draw(&self, frame: &mut ratatui::Frame) {
        ui::draw(frame, self);
    }

    fn tick(&self) {}

    /// The list the grid renders: the filtered results while a query is in
    /// effect, the full accumulator otherwise.
    pub fn visible_cities(&self) -> &[CityWeather] {
        if self.search.is_filtering() {
            &self.search.results
        } else {
            &self.cities
        }
    }

    pub fn is_loading(&self) -> bool {
        self.pending_fetches > 0 || self.search.loading
    }

    // -- Key event routing --------------------------------------------------

    fn handle_key_event(&mut self, key: KeyEvent) {
        // Ctrl-C always quits.
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c' | 'C'))
        {
            self.events.send(AppEvent::Quit);
            return;
        }

        match self.mode {
            AppMode::Normal => self.handle_normal_key(key),
            AppMode::Search => self.handle_search_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('q' | '?')) {
                self.show_help = false;
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                if self.search.is_selected() || self.search.is_filtering() {
                    self.clear_search();
                } else {
                    self.events.send(AppEvent::Quit);
                }
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_selection(i32::from(self.config.cards_per_row));
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_selection(-i32::from(self.config.cards_per_row));
            }
            KeyCode::Char('l') | KeyCode::Right => {
                self.move_selection(1);
            }
            KeyCode::Char('h') | KeyCode::Left => {
                self.move_selection(-1);
            }
            KeyCode::Enter => {
                self.select_highlighted();
            }
            KeyCode::Char('/') => {
                if !self.search.is_selected() {
                    self.mode = AppMode::Search;
                }
            }
            KeyCode::Char('r') => {
                self.events.send(AppEvent::RefreshAll);
            }
            KeyCode::Char('?') => {
                self.show_help = true;
            }
            _ => {}
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.mode = AppMode::Normal;
                self.clear_search();
            }
            KeyCode::Enter => {
                // Keep the filter in effect and go back to grid navigation.
                self.mode = AppMode::Normal;
                self.selected_index = 0;
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.search_input.clear();
                self.schedule_search();
            }
            KeyCode::Backspace => {
                self.search_input.pop();
                self.schedule_search();
            }
            KeyCode::Char(c) => {
                self.search_input.push(c);
                self.schedule_search();
            }
            _ => {}
        }
    }

    // -- Debounced search ---------------------------------------------------

    /// At most one pending timer per input stream: a new keystroke aborts and
    /// replaces the previous one. `StartSearch` is applied immediately; the
    /// filter itself only runs once the delay elapses.
    fn schedule_search(&mut self) {
        if let Some(timer) = self.debounce.take() {
            timer.abort();
        }

        self.search_generation += 1;
        let generation = self.search_generation;
        let query = self.search_input.clone();
        self.search.apply(SearchAction::StartSearch(query.clone()));

        let sender = self.events.sender();
        let delay = Duration::from_millis(self.config.debounce_ms);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = sender.send(Event::App(AppEvent::SearchDebounced { generation, query }));
        });
        self.debounce = Some(timer.abort_handle());
    }

    fn clear_search(&mut self) {
        if let Some(timer) = self.debounce.take() {
            timer.abort();
        }
        // Invalidate any timer that already passed its sleep.
        self.search_generation += 1;
        self.search_input.clear();
        self.search.apply(SearchAction::CleanQuery);
        self.selected_index = 0;
    }

    // -- Selection ----------------------------------------------------------

    fn move_selection(&mut self, delta: i32) {
        let count = self.visible_cities().len();
        if count == 0 || self.search.is_selected() {
            return;
        }
        let current = self.selected_index as i32;
        self.selected_index = (current + delta).clamp(0, count as i32 - 1) as usize;
    }

    fn select_highlighted(&mut self) {
        if self.search.is_selected() {
            return;
        }
        if let Some(city) = self.visible_cities().get(self.selected_index).cloned() {
            self.search.apply(SearchAction::UpdateSelection(city));
        }
    }

    // -- App event handling -------------------------------------------------

    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Quit => {
                self.running = false;
            }
            AppEvent::RefreshAll => {
                self.start_refresh();
            }
            AppEvent::CityLoaded {
                generation,
                city,
                result,
            } => {
                if generation != self.fetch_generation {
                    tracing::debug!(city, "dropping fetch result from a stale refresh");
                    return;
                }
                self.pending_fetches = self.pending_fetches.saturating_sub(1);
                match result {
                    Ok(record) => {
                        tracing::info!(city, temp_c = record.temp_c, "conditions loaded");
                        // Pure append onto the latest snapshot; completions
                        // interleave arbitrarily and order is arrival order.
                        self.cities.push(record);
                    }
                    Err(e) => {
                        tracing::warn!(city, error = %e, "fetch failed");
                        self.status_message = Some(format!("{city}: {e}"));
                        self.failed.push(FetchFailure {
                            city,
                            error: e.to_string(),
                        });
                    }
                }
            }
            AppEvent::SearchDebounced { generation, query } => {
                if generation != self.search_generation {
                    // A newer keystroke superseded this timer.
                    return;
                }
                if query.is_empty() {
                    self.search.apply(SearchAction::CleanQuery);
                    return;
                }
                let results = filter_cities(&self.cities, &query);
                self.search.apply(SearchAction::FinishSearch(results));
                let count = self.visible_cities().len();
                self.selected_index = self.selected_index.min(count.saturating_sub(1));
            }
        }
    }

    // -- Fetch orchestration ------------------------------------------------

    /// Rebuild the accumulator: cancel the previous generation's in-flight
    /// fetches, clear everything, and spawn one fetch per configured city.
    fn start_refresh(&mut self) {
        self.abort_fetch_tasks();
        self.fetch_generation += 1;
        self.cities.clear();
        self.failed.clear();
        self.selected_index = 0;
        self.status_message = None;
        self.clear_search();
        self.mode = AppMode::Normal;

        let Some(ref client) = self.api_client else {
            self.status_message =
                Some("No API key configured (WEATHER_API_KEY); nothing to fetch".to_string());
            return;
        };

        self.pending_fetches = self.config.cities.len();
        for city in &self.config.cities {
            let city = city.clone();
            let client = Arc::clone(client);
            let sender = self.events.sender();
            let generation = self.fetch_generation;

            let task = tokio::spawn(async move {
                let result: ApiResult<CityWeather> = match client.current(&city).await {
                    Ok(resp) => Ok(CityWeather::from_response(city.clone(), &resp)),
                    Err(e) => Err(Arc::new(e.to_string())),
                };
                let _ = sender.send(Event::App(AppEvent::CityLoaded {
                    generation,
                    city,
                    result,
                }));
            });
            self.fetch_tasks.push(task.abort_handle());
        }
    }

    fn abort_fetch_tasks(&mut self) {
        for task in self.fetch_tasks.drain(..) {
            task.abort();
        }
        self.pending_fetches = 0;
    }

    fn abort_background_tasks(&mut self) {
        self.abort_fetch_tasks();
        if let Some(timer) = self.debounce.take() {
            timer.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchValue;

    fn test_app() -> App {
        let config = AppConfig {
            cities: vec!["Paris".into(), "London".into()],
            ..AppConfig::default()
        };
        App::new(config, None)
    }

    fn loaded(app: &App, city: &str, temp_c: f64, description: &str, icon_url: &str) -> AppEvent {
        AppEvent::CityLoaded {
            generation: app.fetch_generation,
            city: city.to_string(),
            result: Ok(CityWeather {
                title: city.to_string(),
                temp_c,
                description: description.to_string(),
                icon_url: icon_url.to_string(),
                country: None,
            }),
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn out_of_order_completions_all_accumulate() {
        let mut app = test_app();
        app.handle_app_event(AppEvent::RefreshAll);

        // London (configured second) arrives first.
        let london = loaded(&app, "London", 15.0, "Cloudy", "url2");
        let paris = loaded(&app, "Paris", 18.0, "Sunny", "url1");
        app.handle_app_event(london);
        app.handle_app_event(paris);

        let titles: Vec<_> = app.cities.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["London", "Paris"]);
    }

    #[tokio::test]
    async fn stale_fetch_generation_is_dropped() {
        let mut app = test_app();
        app.handle_app_event(AppEvent::RefreshAll);
        let stale = loaded(&app, "Paris", 18.0, "Sunny", "url1");

        // A second refresh invalidates anything spawned by the first.
        app.handle_app_event(AppEvent::RefreshAll);
        app.handle_app_event(stale);
        assert!(app.cities.is_empty());

        let fresh = loaded(&app, "Paris", 18.0, "Sunny", "url1");
        app.handle_app_event(fresh);
        assert_eq!(app.cities.len(), 1);
    }

    #[tokio::test]
    async fn failed_city_is_surfaced_not_listed() {
        let mut app = test_app();
        app.handle_app_event(AppEvent::RefreshAll);
        app.handle_app_event(AppEvent::CityLoaded {
            generation: app.fetch_generation,
            city: "Paris".into(),
            result: Err(Arc::new("API error (status 401): key invalid".into())),
        });

        assert!(app.cities.is_empty());
        assert_eq!(app.failed.len(), 1);
        assert_eq!(app.failed[0].city, "Paris");
        assert!(app.status_message.as_deref().unwrap().contains("Paris"));
    }

    #[tokio::test]
    async fn typed_query_filters_after_debounce() {
        let mut app = test_app();
        app.handle_app_event(AppEvent::RefreshAll);
        let paris = loaded(&app, "Paris", 18.0, "Sunny", "url1");
        let london = loaded(&app, "London", 15.0, "Cloudy", "url2");
        app.handle_app_event(paris);
        app.handle_app_event(london);

        app.handle_key_event(key(KeyCode::Char('/')));
        assert_eq!(app.mode, AppMode::Search);
        for c in ['l', 'o', 'n'] {
            app.handle_key_event(key(KeyCode::Char(c)));
        }
        assert!(app.search.loading);
        assert_eq!(app.search.query(), "lon");

        // Only the last keystroke's timer may apply.
        app.handle_app_event(AppEvent::SearchDebounced {
            generation: app.search_generation - 1,
            query: "lo".into(),
        });
        assert!(app.search.loading);
        assert!(app.search.results.is_empty());

        app.handle_app_event(AppEvent::SearchDebounced {
            generation: app.search_generation,
            query: "lon".into(),
        });
        assert!(!app.search.loading);
        assert_eq!(app.search.results.len(), 1);
        assert_eq!(app.search.results[0].title, "London");
        assert_eq!(app.visible_cities().len(), 1);
    }

    #[tokio::test]
    async fn empty_query_debounce_restores_baseline() {
        let mut app = test_app();
        app.handle_app_event(AppEvent::RefreshAll);
        app.handle_app_event(loaded(&app, "Paris", 18.0, "Sunny", "url1"));

        app.handle_key_event(key(KeyCode::Char('/')));
        app.handle_key_event(key(KeyCode::Char('p')));
        app.handle_key_event(key(KeyCode::Backspace));

        app.handle_app_event(AppEvent::SearchDebounced {
            generation: app.search_generation,
            query: String::new(),
        });
        assert_eq!(app.search, SearchState::default());
        // Baseline shows the full accumulator, not the empty result list.
        assert_eq!(app.visible_cities().len(), 1);
    }

    #[tokio::test]
    async fn selecting_a_card_then_clearing_restores_baseline() {
        let mut app = test_app();
        app.handle_app_event(AppEvent::RefreshAll);
        app.handle_app_event(loaded(&app, "Paris", 18.0, "Sunny", "url1"));
        app.handle_app_event(loaded(&app, "London", 15.0, "Cloudy", "url2"));

        app.handle_key_event(key(KeyCode::Enter));
        let selected = app.search.selection().expect("a record is selected");
        assert_eq!(selected.title, "Paris");
        assert_eq!(selected.temp_c, 18.0);
        assert_eq!(selected.description, "Sunny");

        app.handle_key_event(key(KeyCode::Esc));
        assert_eq!(app.search, SearchState::default());
        assert_eq!(app.visible_cities().len(), 2);
        assert!(matches!(app.search.value, SearchValue::Query(ref q) if q.is_empty()));
    }

    #[tokio::test]
    async fn refresh_rebuilds_the_accumulator() {
        let mut app = test_app();
        app.handle_app_event(AppEvent::RefreshAll);
        app.handle_app_event(loaded(&app, "Paris", 18.0, "Sunny", "url1"));
        assert_eq!(app.cities.len(), 1);

        app.handle_key_event(key(KeyCode::Char('r')));
        app.handle_app_event(AppEvent::RefreshAll);
        assert!(app.cities.is_empty());
        assert!(app.failed.is_empty());
    }

    #[tokio::test]
    async fn selection_moves_clamp_to_grid() {
        let mut app = test_app();
        app.handle_app_event(AppEvent::RefreshAll);
        app.handle_app_event(loaded(&app, "Paris", 18.0, "Sunny", "url1"));
        app.handle_app_event(loaded(&app, "London", 15.0, "Cloudy", "url2"));

        app.handle_key_event(key(KeyCode::Right));
        assert_eq!(app.selected_index, 1);
        app.handle_key_event(key(KeyCode::Right));
        assert_eq!(app.selected_index, 1);
        app.handle_key_event(key(KeyCode::Left));
        assert_eq!(app.selected_index, 0);
        // Down would jump a full row; with two cities it clamps to the last.
        app.handle_key_event(key(KeyCode::Down));
        assert_eq!(app.selected_index, 1);
    }
}
