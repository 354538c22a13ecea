//! Plotters-powered time-series chart widget for Ratatui.
//!
//! Rendered into the Ratatui buffer through `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Render-only chart description; series and bounds are computed by the caller.
pub struct SeriesChart<'a> {
    /// Observed values (x = year).
    pub history: &'a [(f64, f64)],
    /// Predicted values, drawn from the last observation onward.
    pub forecast: &'a [(f64, f64)],
    /// Half-width of the band drawn around the forecast.
    pub band: Option<f64>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub y_label: &'a str,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for SeriesChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters cannot lay out a chart in a tiny area.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        let finite = [x0, x1, y0, y1].iter().all(|v| v.is_finite());
        if !finite || x1 <= x0 || y1 <= y0 {
            return;
        }

        // The forecast line starts at the last observation so the two segments join.
        let joined: Vec<(f64, f64)> = self
            .history
            .last()
            .into_iter()
            .chain(self.forecast.iter())
            .copied()
            .collect();

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc("year")
                .y_desc(self.y_label)
                .x_labels(6)
                .y_labels(5)
                .x_label_formatter(&|v| format!("{v:.0}"))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let history_color = RGBColor(0, 255, 255);
            let forecast_color = RGBColor(255, 200, 0);
            let band_color = RGBColor(120, 120, 120);

            chart.draw_series(LineSeries::new(self.history.iter().copied(), &history_color))?;
            // Pixels rather than circles: the backend scales circle radii badly.
            chart.draw_series(self.history.iter().map(|&(x, y)| Pixel::new((x, y), WHITE)))?;

            if joined.len() > 1 {
                if let Some(band) = self.band {
                    for offset in [band, -band] {
                        let edge = joined.iter().map(move |&(x, y)| (x, y + offset));
                        chart.draw_series(LineSeries::new(edge, &band_color))?;
                    }
                }
                chart.draw_series(LineSeries::new(joined.iter().copied(), &forecast_color))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// X and Y bounds covering every point (and the band), with a little vertical padding.
pub fn series_bounds(series: &[&[(f64, f64)]], band: Option<f64>) -> ([f64; 2], [f64; 2]) {
    let band = band.unwrap_or(0.0).abs();
    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in series.iter().flat_map(|s| s.iter()) {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y - band);
        y_max = y_max.max(y + band);
    }

    if !x_min.is_finite() || !x_max.is_finite() || x_max <= x_min {
        let mid = if x_min.is_finite() { x_min } else { 0.0 };
        x_min = mid - 1.0;
        x_max = mid + 1.0;
    }
    if !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
        let mid = if y_min.is_finite() { (y_min + y_max) / 2.0 } else { 0.0 };
        let half = (mid.abs() * 0.05).max(1.0);
        y_min = mid - half;
        y_max = mid + half;
    }

    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    ([x_min, x_max], [y_min - pad, y_max + pad])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_cover_band_and_both_segments() {
        let history = [(2000.0, 10.0), (2001.0, 12.0)];
        let forecast = [(2002.0, 20.0)];
        let (x, y) = series_bounds(&[&history[..], &forecast[..]], Some(1.0));
        assert_eq!(x, [2000.0, 2002.0]);
        assert!(y[0] < 9.0 && y[1] > 21.0);
    }

    #[test]
    fn flat_or_empty_series_still_has_a_range() {
        let flat = [(2000.0, 5.0), (2001.0, 5.0)];
        let (_, y) = series_bounds(&[&flat[..]], None);
        assert!(y[1] > y[0]);

        let (x, y) = series_bounds(&[], None);
        assert!(x[1] > x[0] && y[1] > y[0]);
    }
}
