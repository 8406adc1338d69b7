//! SVG scatter chart of problem size against mean runtime.
use crate::results::SizeSummary;

#[derive(Debug, Clone, PartialEq)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 420,
            title: "Clingo runtime vs. problem size".to_string(),
        }
    }
}

const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 50.0;
const MIN_SECONDS: f64 = 1e-6;

/// Renders `points` with a log-scale runtime axis; each point is labelled
/// with its size.
pub fn render_size_vs_time_svg(points: &[SizeSummary], config: &ChartConfig) -> String {
    let (w, h) = (config.width as f64, config.height as f64);
    let plot_w = (w - MARGIN_LEFT - MARGIN_RIGHT).max(1.0);
    let plot_h = (h - MARGIN_TOP - MARGIN_BOTTOM).max(1.0);

    let mut parts = vec![format!(
        "<svg xmlns='http://www.w3.org/2000/svg' width='{w}' height='{h}' font-family='sans-serif' font-size='11'>",
        w = config.width,
        h = config.height
    )];
    parts.push(format!(
        "<text x='{:.2}' y='20' text-anchor='middle' font-size='14'>{}</text>",
        w / 2.0,
        escape(&config.title)
    ));
    parts.push(format!(
        "<text x='{:.2}' y='{:.2}' text-anchor='middle'>Problem size (H × W × D)</text>",
        MARGIN_LEFT + plot_w / 2.0,
        h - 12.0
    ));
    parts.push(format!(
        "<text x='16' y='{:.2}' text-anchor='middle' transform='rotate(-90 16 {:.2})'>Mean runtime (s, log-scale)</text>",
        MARGIN_TOP + plot_h / 2.0,
        MARGIN_TOP + plot_h / 2.0
    ));
    parts.push(format!(
        "<rect x='{MARGIN_LEFT}' y='{MARGIN_TOP}' width='{plot_w:.2}' height='{plot_h:.2}' fill='none' stroke='#9ca3af' />"
    ));

    if points.is_empty() {
        parts.push("</svg>".into());
        return parts.join("");
    }

    let min_size = points.iter().map(|p| p.size).min().unwrap_or(0) as f64;
    let max_size = points.iter().map(|p| p.size).max().unwrap_or(0) as f64;
    let size_span = (max_size - min_size).max(1.0);

    let logs: Vec<f64> = points
        .iter()
        .map(|p| p.mean_seconds.max(MIN_SECONDS).log10())
        .collect();
    let low_decade = logs.iter().cloned().fold(f64::INFINITY, f64::min).floor();
    let high_decade = logs.iter().cloned().fold(f64::NEG_INFINITY, f64::max).ceil();
    let high_decade = if high_decade <= low_decade { low_decade + 1.0 } else { high_decade };
    let log_span = high_decade - low_decade;

    let x_of = |size: f64| MARGIN_LEFT + (size - min_size) / size_span * plot_w;
    let y_of = |log: f64| MARGIN_TOP + plot_h - (log - low_decade) / log_span * plot_h;

    // Dotted grid line and label at every decade.
    let mut decade = low_decade;
    while decade <= high_decade {
        let y = y_of(decade);
        parts.push(format!(
            "<line x1='{MARGIN_LEFT}' y1='{y:.2}' x2='{:.2}' y2='{y:.2}' stroke='#d1d5db' stroke-dasharray='1,3' />",
            MARGIN_LEFT + plot_w
        ));
        parts.push(format!(
            "<text x='{:.2}' y='{:.2}' text-anchor='end'>1e{}</text>",
            MARGIN_LEFT - 6.0,
            y + 4.0,
            decade as i32
        ));
        decade += 1.0;
    }

    for (point, log) in points.iter().zip(&logs) {
        let x = x_of(point.size as f64);
        let y = y_of(*log);
        parts.push(format!(
            "<circle cx='{x:.2}' cy='{y:.2}' r='3.5' fill='#3b82f6' />"
        ));
        parts.push(format!(
            "<text x='{x:.2}' y='{:.2}' text-anchor='middle'>{}</text>",
            y - 5.0,
            point.size
        ));
    }

    parts.push("</svg>".into());
    parts.join("")
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\'', "&apos;")
}
