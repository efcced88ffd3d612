//! Chart drawing for the reference SVG engine.
//!
//! Results use the `{ "labels": [...], "values": [...] }` shape. This is a
//! deliberately small renderer: enough to give an export a faithful picture
//! of simple bar, line, area and pie results.

use std::fmt::Write;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

const COLORS: [&str; 6] = [
    "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f", "#edc948",
];

/// Chart types supported by the reference engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartType {
    /// Vertical bar chart.
    Bar,
    /// Line chart.
    Line,
    /// Area chart (filled line).
    Area,
    /// Pie chart.
    Pie,
    /// Donut chart.
    Donut,
    /// Scatter plot.
    Scatter,
}

impl FromStr for ChartType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bar" => Ok(Self::Bar),
            "line" => Ok(Self::Line),
            "area" => Ok(Self::Area),
            "pie" => Ok(Self::Pie),
            "donut" => Ok(Self::Donut),
            "scatter" => Ok(Self::Scatter),
            _ => Err(format!("Unknown chart type: {s}")),
        }
    }
}

/// A computed visualization result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartResult {
    /// Chart type identifier.
    pub chart_type: String,
    /// Chart data as JSON.
    pub data: serde_json::Value,
}

impl ChartResult {
    /// Create a result.
    #[must_use]
    pub fn new(chart_type: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            chart_type: chart_type.into(),
            data,
        }
    }

    fn values(&self) -> Vec<f64> {
        self.data
            .get("values")
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().filter_map(serde_json::Value::as_f64).collect())
            .unwrap_or_default()
    }
}

/// Render a chart as a standalone SVG document.
///
/// `width`/`height` are the logical size; the document is `scale` times
/// larger in pixels.
///
/// # Errors
///
/// Returns an error if the chart type is unknown.
pub fn render_chart_svg(
    result: &ChartResult,
    width: f32,
    height: f32,
    scale: f32,
) -> Result<String, String> {
    let chart_type = ChartType::from_str(&result.chart_type)?;
    let values = result.values();

    let mut svg = String::with_capacity(2048);
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {width} {height}\">",
        width * scale,
        height * scale,
    );
    let _ = write!(
        svg,
        "<rect width=\"{width}\" height=\"{height}\" fill=\"#ffffff\"/>",
    );

    match chart_type {
        ChartType::Bar => render_bars(&mut svg, width, height, &values),
        ChartType::Line => render_line(&mut svg, width, height, &values, false),
        ChartType::Area => render_line(&mut svg, width, height, &values, true),
        ChartType::Scatter => render_points(&mut svg, width, height, &values),
        ChartType::Pie => render_pie(&mut svg, width, height, &values, 0.0),
        ChartType::Donut => render_pie(&mut svg, width, height, &values, 0.55),
    }

    svg.push_str("</svg>");
    Ok(svg)
}

struct PlotArea {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
}

fn plot_area(width: f32, height: f32) -> PlotArea {
    let padding = 20.0_f32;
    PlotArea {
        x: padding,
        y: padding,
        w: (width - padding * 2.0).max(1.0),
        h: (height - padding * 2.0).max(1.0),
    }
}

fn max_value(values: &[f64]) -> Option<f64> {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    (max > 0.0).then_some(max)
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn render_bars(svg: &mut String, width: f32, height: f32, values: &[f64]) {
    let Some(max_val) = max_value(values) else {
        return;
    };
    let area = plot_area(width, height);
    let bar_count = values.len() as f32;
    let bar_gap = 4.0_f32;
    let bar_width = ((area.w - bar_gap * (bar_count - 1.0)) / bar_count).max(1.0);

    for (idx, val) in values.iter().enumerate() {
        let bar_h = ((val.max(0.0) / max_val) as f32) * area.h;
        let bx = area.x + (idx as f32) * (bar_width + bar_gap);
        let by = area.y + area.h - bar_h;
        let color = COLORS[idx % COLORS.len()];
        let _ = write!(
            svg,
            "<rect x=\"{bx}\" y=\"{by}\" width=\"{bar_width}\" height=\"{bar_h}\" fill=\"{color}\" rx=\"2\"/>",
        );
    }
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn series_points(width: f32, height: f32, values: &[f64]) -> Vec<(f32, f32)> {
    let Some(max_val) = max_value(values) else {
        return Vec::new();
    };
    let area = plot_area(width, height);
    let step = if values.len() > 1 {
        area.w / (values.len() - 1) as f32
    } else {
        0.0
    };
    values
        .iter()
        .enumerate()
        .map(|(idx, val)| {
            let px = area.x + idx as f32 * step;
            let py = area.y + area.h - ((val.max(0.0) / max_val) as f32) * area.h;
            (px, py)
        })
        .collect()
}

fn render_line(svg: &mut String, width: f32, height: f32, values: &[f64], filled: bool) {
    let points = series_points(width, height, values);
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return;
    };
    let path: Vec<String> = points.iter().map(|(x, y)| format!("{x},{y}")).collect();
    let color = COLORS[0];

    if filled {
        let baseline = plot_area(width, height);
        let bottom = baseline.y + baseline.h;
        let _ = write!(
            svg,
            "<path d=\"M{},{bottom} L{} L{},{bottom} Z\" fill=\"{color}\" fill-opacity=\"0.6\"/>",
            first.0,
            path.join(" L"),
            last.0,
        );
    }
    let _ = write!(
        svg,
        "<polyline points=\"{}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"2\"/>",
        path.join(" "),
    );
}

fn render_points(svg: &mut String, width: f32, height: f32, values: &[f64]) {
    for (idx, (x, y)) in series_points(width, height, values).into_iter().enumerate() {
        let color = COLORS[idx % COLORS.len()];
        let _ = write!(svg, "<circle cx=\"{x}\" cy=\"{y}\" r=\"4\" fill=\"{color}\"/>");
    }
}

/// Pie slices; `hole` is the inner radius as a fraction of the outer one.
fn render_pie(svg: &mut String, width: f32, height: f32, values: &[f64], hole: f64) {
    let total: f64 = values.iter().filter(|v| **v > 0.0).sum();
    if total <= 0.0 {
        return;
    }

    let cx = f64::from(width / 2.0);
    let cy = f64::from(height / 2.0);
    let radius = f64::from((width.min(height) / 2.0) - 10.0).max(1.0);

    let mut start_angle: f64 = -std::f64::consts::FRAC_PI_2;

    for (idx, val) in values.iter().enumerate().filter(|(_, v)| **v > 0.0) {
        let sweep = (val / total) * std::f64::consts::TAU;
        let color = COLORS[idx % COLORS.len()];

        // A full-turn arc has coincident endpoints and is not drawn.
        if sweep >= std::f64::consts::TAU - 1e-9 {
            let _ = write!(
                svg,
                "<circle cx=\"{cx}\" cy=\"{cy}\" r=\"{radius}\" fill=\"{color}\"/>",
            );
            continue;
        }

        let end_angle = start_angle + sweep;

        let x1 = cx + radius * start_angle.cos();
        let y1 = cy + radius * start_angle.sin();
        let x2 = cx + radius * end_angle.cos();
        let y2 = cy + radius * end_angle.sin();
        let large_arc = i32::from(sweep > std::f64::consts::PI);

        let _ = write!(
            svg,
            "<path d=\"M{cx},{cy} L{x1},{y1} A{radius},{radius} 0 {large_arc},1 {x2},{y2} Z\" fill=\"{color}\"/>",
        );

        start_angle = end_angle;
    }

    if hole > 0.0 {
        let inner = radius * hole;
        let _ = write!(
            svg,
            "<circle cx=\"{cx}\" cy=\"{cy}\" r=\"{inner}\" fill=\"#ffffff\"/>",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(chart_type: &str) -> ChartResult {
        ChartResult::new(
            chart_type,
            serde_json::json!({
                "labels": ["Jan", "Feb", "Mar"],
                "values": [4000, 3000, 2000]
            }),
        )
    }

    #[test]
    fn test_chart_type_parsing() {
        assert_eq!("BAR".parse::<ChartType>(), Ok(ChartType::Bar));
        assert!("radar".parse::<ChartType>().is_err());
    }

    #[test]
    fn test_bar_chart() {
        let svg = render_chart_svg(&result("bar"), 400.0, 300.0, 1.0).expect("svg");
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("rx=\"2\"").count(), 3);
        assert!(svg.contains("#4e79a7"));
    }

    #[test]
    fn test_scale_applies_to_pixels_only() {
        let svg = render_chart_svg(&result("line"), 100.0, 50.0, 2.0).expect("svg");
        assert!(svg.contains("width=\"200\""));
        assert!(svg.contains("viewBox=\"0 0 100 50\""));
        assert!(svg.contains("<polyline"));
    }

    #[test]
    fn test_area_and_donut() {
        let area = render_chart_svg(&result("area"), 200.0, 100.0, 1.0).expect("area");
        assert!(area.contains("fill-opacity"));
        let donut = render_chart_svg(&result("donut"), 200.0, 200.0, 1.0).expect("donut");
        assert_eq!(donut.matches("<path").count(), 3);
        assert!(donut.contains("<circle"));
    }

    #[test]
    fn test_single_slice_pie_is_a_full_circle() {
        let single = ChartResult::new("pie", serde_json::json!({ "values": [0, 5, -1] }));
        let svg = render_chart_svg(&single, 100.0, 100.0, 1.0).expect("svg");
        assert!(!svg.contains("<path"));
        assert_eq!(svg.matches("<circle").count(), 1);
        assert!(svg.contains("r=\"40\""));

        let donut = ChartResult::new("donut", serde_json::json!({ "values": [7] }));
        let svg = render_chart_svg(&donut, 100.0, 100.0, 1.0).expect("svg");
        assert_eq!(svg.matches("<circle").count(), 2);
    }

    #[test]
    fn test_empty_values_render_background_only() {
        let empty = ChartResult::new("pie", serde_json::json!({}));
        let svg = render_chart_svg(&empty, 100.0, 100.0, 1.0).expect("svg");
        assert!(!svg.contains("<path"));
    }

    #[test]
    fn test_unknown_type() {
        assert!(render_chart_svg(&result("radar"), 100.0, 100.0, 1.0).is_err());
    }
}
