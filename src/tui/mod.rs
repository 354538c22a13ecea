//! Ratatui-based terminal dashboard.
//!
//! Three pages over the persisted feature tables:
//! - Overview: KPIs for a year vs the prior year, plus the world weighted series
//! - Compare: latest snapshot per country, ranked by GDP per capita
//! - Forecast: one country/indicator with a selectable method and horizon
//!
//! Tables come from the `TableCache` passed in by the caller; `r` invalidates
//! and reloads them.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs},
};
use tracing::warn;

use crate::domain::{FeatureRecord, FeatureTables, ForecastMethod, Indicator, PointKind};
use crate::error::AppError;
use crate::forecast::{DEFAULT_HORIZON, ForecastError, ForecastResult};
use crate::query::{
    KpiSummary, available_countries, available_years, compare_countries, compute_kpis,
};
use crate::store::TableCache;

mod plotters_chart;

use plotters_chart::{SeriesChart, series_bounds};

const MAX_HORIZON: usize = 20;

/// Start the dashboard.
pub fn run(cache: &TableCache) -> Result<(), AppError> {
    // Fail before touching the terminal when the tables are missing.
    let mut app = App::new(cache)?;

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Restores the terminal (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Overview,
    Compare,
    Forecast,
}

impl Page {
    const ALL: [Page; 3] = [Page::Overview, Page::Compare, Page::Forecast];

    fn title(self) -> &'static str {
        match self {
            Page::Overview => "1 Overview",
            Page::Compare => "2 Compare",
            Page::Forecast => "3 Forecast",
        }
    }

    fn index(self) -> usize {
        Page::ALL.iter().position(|p| *p == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Page::ALL[(self.index() + 1) % Page::ALL.len()]
    }
}

struct App<'c> {
    cache: &'c TableCache,
    tables: Arc<FeatureTables>,
    countries: Vec<String>,
    years: Vec<i32>,
    page: Page,
    year_idx: usize,
    country_idx: usize,
    indicator: Indicator,
    method: ForecastMethod,
    horizon: usize,
    scroll: usize,
    kpis: Option<KpiSummary>,
    forecast: Option<Result<ForecastResult, ForecastError>>,
    status: String,
}

impl<'c> App<'c> {
    fn new(cache: &'c TableCache) -> Result<Self, AppError> {
        let tables = cache.get_or_load()?;
        let mut app = Self {
            cache,
            tables,
            countries: Vec::new(),
            years: Vec::new(),
            page: Page::Overview,
            year_idx: 0,
            country_idx: 0,
            indicator: Indicator::GdpPerCapita,
            method: ForecastMethod::Linear,
            horizon: DEFAULT_HORIZON,
            scroll: 0,
            kpis: None,
            forecast: None,
            status: String::new(),
        };
        app.on_tables_loaded();
        Ok(app)
    }

    /// Reset selections that depend on the table contents.
    fn on_tables_loaded(&mut self) {
        self.countries = available_countries(&self.tables.main_data);
        self.years = available_years(&self.tables.main_data);
        self.year_idx = self.years.len().saturating_sub(1);
        self.country_idx = self.country_idx.min(self.countries.len().saturating_sub(1));
        self.scroll = 0;
        self.status = format!(
            "Loaded {} rows, {} countries from {}",
            self.tables.main_data.len(),
            self.countries.len(),
            self.cache.dir().display()
        );
        self.recompute();
    }

    fn recompute(&mut self) {
        self.kpis = self.selected_year().map(|year| {
            let start = self.years.first().copied().unwrap_or(year);
            compute_kpis(
                &self.tables.main_data,
                year,
                crate::query::previous_year_for(year, start),
            )
        });
        self.forecast = self.selected_country().map(|country| {
            crate::query::forecast_for(
                &self.tables,
                country,
                self.indicator,
                self.method,
                self.horizon,
            )
        });
    }

    fn selected_year(&self) -> Option<i32> {
        self.years.get(self.year_idx).copied()
    }

    fn selected_country(&self) -> Option<&str> {
        self.countries.get(self.country_idx).map(String::as_str)
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => needs_redraw = true,
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab => self.page = self.page.next(),
            KeyCode::Char('1') => self.page = Page::Overview,
            KeyCode::Char('2') => self.page = Page::Compare,
            KeyCode::Char('3') => self.page = Page::Forecast,
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('i') => {
                self.indicator = self.indicator.next();
                self.status = format!("indicator: {}", self.indicator.label());
                self.recompute();
            }
            KeyCode::Char('m') => {
                self.method = self.method.toggle();
                self.status = format!("method: {}", self.method.display_name());
                self.recompute();
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.horizon = (self.horizon + 1).min(MAX_HORIZON);
                self.recompute();
            }
            KeyCode::Char('-') => {
                self.horizon = self.horizon.saturating_sub(1).max(1);
                self.recompute();
            }
            KeyCode::Left => self.step(-1),
            KeyCode::Right => self.step(1),
            KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Down => {
                let max = self.tables.latest_snapshot.len().saturating_sub(1);
                self.scroll = (self.scroll + 1).min(max);
            }
            _ => {}
        }
        false
    }

    /// Left/right: the KPI year on the overview, the country on the forecast page.
    fn step(&mut self, delta: isize) {
        let (idx, len) = match self.page {
            Page::Overview => (&mut self.year_idx, self.years.len()),
            Page::Forecast => (&mut self.country_idx, self.countries.len()),
            Page::Compare => return,
        };
        if len == 0 {
            return;
        }
        *idx = (*idx as isize + delta).rem_euclid(len as isize) as usize;
        self.recompute();
    }

    fn reload(&mut self) {
        self.cache.invalidate();
        match self.cache.get_or_load() {
            Ok(tables) => {
                self.tables = tables;
                self.on_tables_loaded();
            }
            Err(err) => {
                // Keep showing the previous tables.
                warn!(error = %err, "reload failed");
                self.status = format!("Reload failed: {err}");
            }
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
            .split(frame.area());

        let titles: Vec<&str> = Page::ALL.iter().map(|p| p.title()).collect();
        let tabs = Tabs::new(titles)
            .select(self.page.index())
            .block(Block::default().title("wdi dashboard").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
        frame.render_widget(tabs, chunks[0]);

        match self.page {
            Page::Overview => self.draw_overview(frame, chunks[1]),
            Page::Compare => self.draw_compare(frame, chunks[1]),
            Page::Forecast => self.draw_forecast(frame, chunks[1]),
        }
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_overview(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(6), Constraint::Min(0)])
            .split(area);

        let mut lines = Vec::new();
        if let Some(summary) = &self.kpis {
            lines.push(Line::from(Span::styled(
                format!("{} vs {}", summary.year, summary.previous_year),
                Style::default().fg(Color::Gray),
            )));
            for k in &summary.kpis {
                let delta_color = match k.delta {
                    None => Color::Gray,
                    Some(d) if d.value() < 0.0 => Color::Red,
                    Some(_) => Color::Green,
                };
                lines.push(Line::from(vec![
                    Span::raw(format!("{:<24}", k.label)),
                    Span::styled(
                        format!("{:>14}", k.formatted_value()),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!(" {:>12}", k.formatted_delta()),
                        Style::default().fg(delta_color),
                    ),
                ]));
            }
        } else {
            lines.push(Line::from("No data."));
        }
        frame.render_widget(
            Paragraph::new(Text::from(lines))
                .block(Block::default().title("KPIs").borders(Borders::ALL)),
            chunks[0],
        );

        let history: Vec<(f64, f64)> = self
            .tables
            .world_aggregates
            .iter()
            .filter_map(|w| w.value(self.indicator).map(|v| (w.year as f64, v)))
            .collect();
        self.draw_chart(
            frame,
            chunks[1],
            &format!("World {} (population weighted)", self.indicator.label()),
            &history,
            &[],
            None,
        );
    }

    fn draw_compare(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = compare_countries(&self.tables, &[]);
        let header = Row::new([
            "Country",
            "Year",
            "GDP pc",
            "Rank",
            "Life exp",
            "Population",
            "Rank",
            "Growth",
        ])
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
        let rank = |r: Option<u32>| r.map_or("-".to_string(), |r| r.to_string());
        let value = |r: &FeatureRecord, ind: Indicator| ind.format_value(r.value(ind));

        let body: Vec<Row> = rows
            .iter()
            .skip(self.scroll)
            .map(|r| {
                Row::new(vec![
                    Cell::from(r.country().to_string()),
                    Cell::from(r.year().to_string()),
                    Cell::from(value(r, Indicator::GdpPerCapita)),
                    Cell::from(rank(r.gdp_pc_rank)),
                    Cell::from(value(r, Indicator::LifeExpectancy)),
                    Cell::from(value(r, Indicator::Population)),
                    Cell::from(rank(r.population_rank)),
                    Cell::from(value(r, Indicator::IncomeGrowth)),
                ])
            })
            .collect();

        let widths = [
            Constraint::Min(20),
            Constraint::Length(6),
            Constraint::Length(12),
            Constraint::Length(5),
            Constraint::Length(10),
            Constraint::Length(11),
            Constraint::Length(5),
            Constraint::Length(8),
        ];
        let table = Table::new(body, widths).header(header).block(
            Block::default()
                .title(format!("Latest snapshot ({} countries)", rows.len()))
                .borders(Borders::ALL),
        );
        frame.render_widget(table, area);
    }

    fn draw_forecast(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0)])
            .split(area);

        let country = self.selected_country().unwrap_or("-");
        let mut lines = vec![Line::from(format!(
            "{country} | {} | {} | horizon {}y",
            self.indicator.label(),
            self.method.display_name(),
            self.horizon
        ))];

        match &self.forecast {
            Some(Ok(result)) => {
                let note = match (&result.fallback, result.forecast().last()) {
                    (Some(reason), _) => format!("Fell back to linear regression: {reason}"),
                    (None, Some(last)) => {
                        format!("{}: {}", last.year, self.indicator.format_value(Some(last.value)))
                    }
                    (None, None) => String::new(),
                };
                lines.push(Line::from(Span::styled(note, Style::default().fg(Color::Gray))));

                let history: Vec<(f64, f64)> = points_of(result, PointKind::Historical);
                let forecast: Vec<(f64, f64)> = points_of(result, PointKind::Forecast);
                frame.render_widget(
                    Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL)),
                    chunks[0],
                );
                self.draw_chart(frame, chunks[1], "Forecast", &history, &forecast, result.band);
            }
            Some(Err(err)) => {
                lines.push(Line::from(Span::styled(
                    err.to_string(),
                    Style::default().fg(Color::Yellow),
                )));
                frame.render_widget(
                    Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL)),
                    chunks[0],
                );
            }
            None => {
                lines.push(Line::from("No countries loaded."));
                frame.render_widget(
                    Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL)),
                    chunks[0],
                );
            }
        }
    }

    fn draw_chart(
        &self,
        frame: &mut ratatui::Frame<'_>,
        area: Rect,
        title: &str,
        history: &[(f64, f64)],
        forecast: &[(f64, f64)],
        band: Option<f64>,
    ) {
        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        if history.is_empty() {
            frame.render_widget(
                Paragraph::new("No values for this indicator.")
                    .style(Style::default().fg(Color::Yellow)),
                inner,
            );
            return;
        }

        let (x_bounds, y_bounds) = series_bounds(&[history, forecast], band);
        let widget = SeriesChart {
            history,
            forecast,
            band,
            x_bounds,
            y_bounds,
            y_label: self.indicator.short_label(),
            fmt_y: axis_formatter(self.indicator),
        };
        frame.render_widget(widget, inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = match self.page {
            Page::Overview => "Tab/1-3 page  ←/→ year  i indicator  r reload  q quit",
            Page::Compare => "Tab/1-3 page  ↑/↓ scroll  r reload  q quit",
            Page::Forecast => {
                "Tab/1-3 page  ←/→ country  i indicator  m method  +/- horizon  r reload  q quit"
            }
        };
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        frame.render_widget(
            Paragraph::new(line).block(Block::default().borders(Borders::ALL)),
            area,
        );
    }
}

fn points_of(result: &ForecastResult, kind: PointKind) -> Vec<(f64, f64)> {
    result
        .points
        .iter()
        .filter(|p| p.kind == kind)
        .map(|p| (p.year as f64, p.value))
        .collect()
}

fn axis_formatter(indicator: Indicator) -> fn(f64) -> String {
    match indicator {
        Indicator::GdpPerCapita => |v| format!("${}", crate::domain::abbreviate(v, 0)),
        Indicator::Population => |v| crate::domain::abbreviate(v, 1),
        Indicator::LifeExpectancy => |v| format!("{v:.0}"),
        Indicator::IncomeGrowth => |v| format!("{v:.1}%"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IndicatorRecord;
    use crate::features::engineer_features;
    use crate::io::tables::write_feature_tables;

    fn write_tables(dir: &std::path::Path, countries: &[&str]) {
        let mut records = Vec::new();
        for (i, c) in countries.iter().enumerate() {
            for year in 2010..2018 {
                records.push(
                    IndicatorRecord::new(*c, None, year)
                        .with(
                            Indicator::GdpPerCapita,
                            1000.0 * (i + 1) as f64 + (year - 2010) as f64 * 50.0,
                        )
                        .with(Indicator::Population, 1e6),
                );
            }
        }
        write_feature_tables(dir, &engineer_features(records, None, 3)).unwrap();
    }

    #[test]
    fn keys_drive_selection_and_forecast() {
        let dir = tempfile::tempdir().unwrap();
        write_tables(dir.path(), &["Aland", "Borduria"]);
        let cache = TableCache::new(dir.path());
        let mut app = App::new(&cache).unwrap();

        assert_eq!(app.selected_year(), Some(2017));
        assert_eq!(app.kpis.as_ref().map(|k| k.previous_year), Some(2016));
        assert!(matches!(app.forecast, Some(Ok(_))));

        assert!(!app.handle_key(KeyCode::Char('3')));
        app.handle_key(KeyCode::Right);
        assert_eq!(app.selected_country(), Some("Borduria"));
        app.handle_key(KeyCode::Right);
        assert_eq!(app.selected_country(), Some("Aland"));

        app.handle_key(KeyCode::Char('+'));
        let Some(Ok(result)) = &app.forecast else {
            panic!("forecast expected");
        };
        assert_eq!(result.forecast().count(), DEFAULT_HORIZON + 1);

        // Income growth is empty in these tables.
        app.handle_key(KeyCode::Char('i'));
        app.handle_key(KeyCode::Char('i'));
        app.handle_key(KeyCode::Char('i'));
        assert_eq!(app.indicator, Indicator::IncomeGrowth);
        assert!(matches!(app.forecast, Some(Err(ForecastError::InsufficientData { .. }))));

        assert!(app.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn reload_picks_up_rewritten_tables() {
        let dir = tempfile::tempdir().unwrap();
        write_tables(dir.path(), &["Aland"]);
        let cache = TableCache::new(dir.path());
        let mut app = App::new(&cache).unwrap();
        assert_eq!(app.countries.len(), 1);

        write_tables(dir.path(), &["Aland", "Borduria", "Carpania"]);
        app.handle_key(KeyCode::Char('r'));
        assert_eq!(app.countries.len(), 3);
        assert_eq!(cache.load_count(), 2);
    }

    #[test]
    fn tab_cycles_pages() {
        assert_eq!(Page::Overview.next(), Page::Compare);
        assert_eq!(Page::Forecast.next(), Page::Overview);
    }
}
