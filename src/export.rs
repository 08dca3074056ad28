//! Chart Export
//!
//! Renders a [`ChartFrame`] to a standalone SVG image, or its samples to
//! CSV. Exporting never touches poll or display state.

use std::fmt::Write as _;

use crate::chart::{ChartLayout, GRID_COLOR, LABEL_COLOR, SERIES_COLOR, WARNING_COLOR};
use crate::display::ChartFrame;
use crate::messages::{Locale, MessageId};

/// Default file name offered for a chart download
pub const EXPORT_FILE_STEM: &str = "ecg-chart";

/// Export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Svg,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Svg => "svg",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.{}", EXPORT_FILE_STEM, self.extension())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "svg" => Ok(ExportFormat::Svg),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(format!("Unsupported export format: {}", other)),
        }
    }
}

/// Render the frame as an SVG document
pub fn render_svg(
    frame: &ChartFrame,
    layout: &ChartLayout,
    threshold: f64,
    locale: Locale,
) -> String {
    let mut svg = String::new();
    let (w, h) = (layout.width, layout.height);

    // Writing into a String cannot fail
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">"#
    );
    let _ = writeln!(svg, r#"<rect width="{w}" height="{h}" fill="white"/>"#);

    // Title
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="24" text-anchor="middle" font-size="16" fill="{LABEL_COLOR}">{}</text>"#,
        w / 2.0,
        escape(MessageId::ChartTitle.text(locale)),
    );

    // Grid and y labels
    for (y, value) in layout.y_ticks(frame) {
        let _ = writeln!(
            svg,
            r#"<line x1="{}" y1="{y:.2}" x2="{}" y2="{y:.2}" stroke="{GRID_COLOR}"/>"#,
            layout.margin_left,
            w - layout.margin_right,
        );
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{:.2}" text-anchor="end" font-size="12" fill="{LABEL_COLOR}">{value:.1}</text>"#,
            layout.margin_left - 8.0,
            y + 4.0,
        );
    }

    if let Some(y) = layout.threshold_y(threshold, frame) {
        let _ = writeln!(
            svg,
            r#"<line x1="{}" y1="{y:.2}" x2="{}" y2="{y:.2}" stroke="{WARNING_COLOR}" stroke-dasharray="6 4"/>"#,
            layout.margin_left,
            w - layout.margin_right,
        );
    }

    // Series
    let points = layout
        .points(frame)
        .iter()
        .map(|(x, y)| format!("{:.2},{:.2}", x, y))
        .collect::<Vec<_>>()
        .join(" ");
    let _ = writeln!(
        svg,
        r#"<polyline points="{points}" fill="none" stroke="{SERIES_COLOR}" stroke-width="2"/>"#
    );

    // X labels
    for (x, label) in layout.x_labels(frame) {
        let _ = writeln!(
            svg,
            r#"<text x="{x:.2}" y="{:.2}" text-anchor="middle" font-size="12" fill="{LABEL_COLOR}">{label}</text>"#,
            h - layout.margin_bottom + 18.0,
        );
    }

    // Axis titles
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="{}" text-anchor="middle" font-size="12" fill="{LABEL_COLOR}">{}</text>"#,
        layout.margin_left + layout.plot_width() / 2.0,
        h - 8.0,
        escape(MessageId::TimeAxis.text(locale)),
    );
    let _ = writeln!(
        svg,
        r#"<text x="14" y="{mid}" text-anchor="middle" font-size="12" fill="{LABEL_COLOR}" transform="rotate(-90 14 {mid})">{}</text>"#,
        escape(MessageId::SignalAxis.text(locale)),
        mid = layout.margin_top + layout.plot_height() / 2.0,
    );

    svg.push_str("</svg>\n");
    svg
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Write the frame's samples as `timestamp,ecg_signal` rows
#[cfg(feature = "native")]
pub fn write_csv<W: std::io::Write>(frame: &ChartFrame, writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for sample in &frame.samples {
        wtr.serialize(sample)?;
    }
    wtr.flush()?;
    Ok(())
}
