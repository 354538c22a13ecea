//! ASCII plotting of a forecast for terminal output.
//!
//! Fixed-size character grid, deterministic output.
//!
//! Plot elements:
//! - observed values: `o`, joined by `-`
//! - forecast values: `*`, joined to the last observation by `.`

use crate::domain::PointKind;
use crate::forecast::ForecastResult;

/// Render the historical and forecast points of `result` into a `width` x `height` grid.
pub fn render_forecast_plot(result: &ForecastResult, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let xs: Vec<f64> = result.points.iter().map(|p| p.year as f64).collect();
    let ys: Vec<f64> = result.points.iter().map(|p| p.value).collect();
    let (x_min, x_max) = span(&xs).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = span(&ys).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    let cell = |year: i32, value: f64| {
        (
            map_x(year as f64, x_min, x_max, width),
            map_y(value, y_min, y_max, height),
        )
    };

    // Connectors first so markers overlay them.
    for pair in result.points.windows(2) {
        let (x0, y0) = cell(pair[0].year, pair[0].value);
        let (x1, y1) = cell(pair[1].year, pair[1].value);
        let ch = if pair[1].kind == PointKind::Forecast { '.' } else { '-' };
        draw_line(&mut grid, x0, y0, x1, y1, ch);
    }
    for p in &result.points {
        let (x, y) = cell(p.year, p.value);
        grid[y][x] = match p.kind {
            PointKind::Historical => 'o',
            PointKind::Forecast => '*',
        };
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {} | year=[{x_min:.0}, {x_max:.0}] | y=[{}, {}]\n",
        result.indicator.short_label(),
        result.indicator.format_value(Some(y_min)),
        result.indicator.format_value(Some(y_max)),
    ));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    out
}

fn span(values: &[f64]) -> Option<(f64, f64)> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min.is_finite() && max.is_finite() && max > min {
        Some((min, max))
    } else if min.is_finite() && max.is_finite() {
        // Flat series: widen so it sits mid-plot.
        Some((min - 1.0, max + 1.0))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let pad = ((max - min).abs() * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // Row 0 is the top of the plot.
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham). Only writes blank cells.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let (mut x, mut y) = (x0 as isize, y0 as isize);
    let (x1, y1) = (x1 as isize, y1 as isize);
    let dx = (x1 - x).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let dy = -(y1 - y).abs();
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if let Some(cell) = grid
            .get_mut(y as usize)
            .and_then(|row| row.get_mut(x as usize))
            .filter(|c| **c == ' ')
        {
            *cell = ch;
        }
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}
