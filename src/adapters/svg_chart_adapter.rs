//! SVG chart of price, both moving averages and crossover markers.

use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use chrono::Datelike;

use crate::domain::backtest::{BacktestConfig, BacktestResult};
use crate::domain::error::SmacrossError;
use crate::domain::events::TradeEvent;
use crate::domain::signal::SignalRow;
use crate::ports::report_port::ReportPort;

const WIDTH: f64 = 1200.0;
const HEIGHT: f64 = 600.0;
const PAD_LEFT: f64 = 70.0;
const PAD_RIGHT: f64 = 30.0;
const PAD_TOP: f64 = 50.0;
const PAD_BOTTOM: f64 = 50.0;
const GRID_LINES: usize = 5;
const MARKER: f64 = 7.0;

const CLOSE_COLOR: &str = "black";
const FAST_COLOR: &str = "blue";
const SLOW_COLOR: &str = "orange";
const BUY_COLOR: &str = "green";
const SELL_COLOR: &str = "red";

pub struct SvgChartAdapter {
    path: PathBuf,
}

impl SvgChartAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ReportPort for SvgChartAdapter {
    fn write(&self, result: &BacktestResult, config: &BacktestConfig) -> Result<(), SmacrossError> {
        let svg = generate_crossover_svg(result, config);
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, svg)?;
        tracing::info!("chart written to {}", self.path.display());
        Ok(())
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Maps dates and prices onto the plot area.
struct Frame {
    first_day: i64,
    span_days: f64,
    min: f64,
    max: f64,
}

impl Frame {
    fn new(rows: &[SignalRow]) -> Option<Self> {
        let first = rows.first()?;
        let last = rows.last()?;

        let values = rows
            .iter()
            .flat_map(|r| [Some(r.close), r.fast_ma, r.slow_ma])
            .flatten()
            .filter(|v| v.is_finite());
        let (mut min, mut max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        if !min.is_finite() {
            return None;
        }
        if max - min <= 0.0 {
            min -= 1.0;
            max += 1.0;
        }

        let first_day = i64::from(first.date.num_days_from_ce());
        let span_days = (i64::from(last.date.num_days_from_ce()) - first_day).max(1) as f64;
        Some(Self {
            first_day,
            span_days,
            min,
            max,
        })
    }

    fn x(&self, date: chrono::NaiveDate) -> f64 {
        let offset = (i64::from(date.num_days_from_ce()) - self.first_day) as f64;
        PAD_LEFT + offset / self.span_days * (WIDTH - PAD_LEFT - PAD_RIGHT)
    }

    fn y(&self, value: f64) -> f64 {
        let plot_height = HEIGHT - PAD_TOP - PAD_BOTTOM;
        HEIGHT - PAD_BOTTOM - (value - self.min) / (self.max - self.min) * plot_height
    }
}

/// One polyline per contiguous run of defined values.
fn polylines(
    rows: &[SignalRow],
    frame: &Frame,
    value: impl Fn(&SignalRow) -> Option<f64>,
    color: &str,
) -> String {
    let mut out = String::new();
    let mut run: Vec<String> = Vec::new();

    let flush = |run: &mut Vec<String>, out: &mut String| {
        if run.len() > 1 {
            let _ = writeln!(
                out,
                r#"<polyline fill="none" stroke="{}" stroke-width="1.5" points="{}"/>"#,
                color,
                run.join(" ")
            );
        }
        run.clear();
    };

    for row in rows {
        match value(row) {
            Some(v) if v.is_finite() => {
                run.push(format!("{:.1},{:.1}", frame.x(row.date), frame.y(v)));
            }
            _ => flush(&mut run, &mut out),
        }
    }
    flush(&mut run, &mut out);
    out
}

fn markers(events: &[TradeEvent], frame: &Frame, color: &str, pointing_up: bool) -> String {
    let mut out = String::new();
    for event in events {
        let x = frame.x(event.date);
        let y = frame.y(event.price);
        let (tip, base) = if pointing_up {
            (y - MARKER, y + MARKER)
        } else {
            (y + MARKER, y - MARKER)
        };
        let _ = writeln!(
            out,
            r#"<polygon fill="{}" points="{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}"/>"#,
            color,
            x,
            tip,
            x - MARKER,
            base,
            x + MARKER,
            base
        );
    }
    out
}

fn grid(rows: &[SignalRow], frame: &Frame) -> String {
    let mut out = String::new();
    for i in 0..=GRID_LINES {
        let value = frame.min + (frame.max - frame.min) * i as f64 / GRID_LINES as f64;
        let y = frame.y(value);
        let _ = writeln!(
            out,
            r##"<line x1="{:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="#dddddd"/>"##,
            PAD_LEFT,
            WIDTH - PAD_RIGHT,
        );
        let _ = writeln!(
            out,
            r#"<text x="{:.1}" y="{:.1}" font-size="11" text-anchor="end">{:.0}</text>"#,
            PAD_LEFT - 6.0,
            y + 4.0,
            value
        );
    }

    let mut last_year = None;
    for row in rows {
        let year = row.date.year();
        if last_year.is_some_and(|y| y != year) {
            let x = frame.x(row.date);
            let _ = writeln!(
                out,
                r##"<line x1="{x:.1}" y1="{:.1}" x2="{x:.1}" y2="{:.1}" stroke="#dddddd"/>"##,
                PAD_TOP,
                HEIGHT - PAD_BOTTOM,
            );
            let _ = writeln!(
                out,
                r#"<text x="{x:.1}" y="{:.1}" font-size="11" text-anchor="middle">{}</text>"#,
                HEIGHT - PAD_BOTTOM + 18.0,
                year
            );
        }
        last_year = Some(year);
    }
    out
}

fn legend(config: &BacktestConfig) -> String {
    let entries = [
        (format!("{} Close", config.symbol), CLOSE_COLOR),
        (format!("Fast MA ({}d)", config.fast_window), FAST_COLOR),
        (format!("Slow MA ({}d)", config.slow_window), SLOW_COLOR),
        ("Buy".to_string(), BUY_COLOR),
        ("Sell".to_string(), SELL_COLOR),
    ];

    let mut out = String::new();
    let x = PAD_LEFT + 12.0;
    for (i, (label, color)) in entries.iter().enumerate() {
        let y = PAD_TOP + 16.0 + i as f64 * 16.0;
        let _ = writeln!(
            out,
            r#"<rect x="{x:.1}" y="{:.1}" width="14" height="4" fill="{}"/>"#,
            y - 4.0,
            color
        );
        let _ = writeln!(
            out,
            r#"<text x="{:.1}" y="{y:.1}" font-size="12">{}</text>"#,
            x + 20.0,
            escape(label)
        );
    }
    out
}

pub fn generate_crossover_svg(result: &BacktestResult, config: &BacktestConfig) -> String {
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH:.0}" height="{HEIGHT:.0}" viewBox="0 0 {WIDTH:.0} {HEIGHT:.0}">"#
    );
    let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
    let _ = writeln!(
        svg,
        r#"<text x="{:.1}" y="30" font-size="18" text-anchor="middle">{} – Moving Average Strategy</text>"#,
        WIDTH / 2.0,
        escape(&config.symbol)
    );

    let rows = &result.signals;
    match Frame::new(rows) {
        Some(frame) => {
            svg.push_str(&grid(rows, &frame));
            svg.push_str(&polylines(rows, &frame, |r| Some(r.close), CLOSE_COLOR));
            svg.push_str(&polylines(rows, &frame, |r| r.fast_ma, FAST_COLOR));
            svg.push_str(&polylines(rows, &frame, |r| r.slow_ma, SLOW_COLOR));
            svg.push_str(&markers(&result.events.buys, &frame, BUY_COLOR, true));
            svg.push_str(&markers(&result.events.sells, &frame, SELL_COLOR, false));
        }
        None => {
            let _ = writeln!(
                svg,
                r#"<text x="{:.1}" y="{:.1}" font-size="14" text-anchor="middle">No price data available.</text>"#,
                WIDTH / 2.0,
                HEIGHT / 2.0
            );
        }
    }
    svg.push_str(&legend(config));
    svg.push_str("</svg>\n");
    svg
}
