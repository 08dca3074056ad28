//! Chart Layout
//!
//! Pixel geometry for the ECG line chart, shared by the canvas renderer in
//! the dashboard and the SVG exporter. Points are spaced evenly by index
//! (one category per sample); the y axis spans the frame's bounds.

use chrono::{DateTime, Local, Utc};

use crate::display::ChartFrame;

/// Line color for the signal series
pub const SERIES_COLOR: &str = "rgba(75, 192, 192, 1)";
/// Color for the threshold guide and warning text
pub const WARNING_COLOR: &str = "#ef4444";
pub const GRID_COLOR: &str = "#e5e7eb";
pub const LABEL_COLOR: &str = "#4b5563";

/// Number of horizontal grid divisions
pub const Y_TICKS: usize = 5;
/// Upper bound on x-axis labels
pub const MAX_X_LABELS: usize = 6;

/// Canvas size and margins
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 400.0,
            margin_left: 60.0,
            margin_right: 20.0,
            margin_top: 40.0,
            margin_bottom: 50.0,
        }
    }
}

impl ChartLayout {
    pub fn plot_width(&self) -> f64 {
        self.width - self.margin_left - self.margin_right
    }

    pub fn plot_height(&self) -> f64 {
        self.height - self.margin_top - self.margin_bottom
    }

    /// X pixel for the sample at `index` of `count`
    pub fn x_at(&self, index: usize, count: usize) -> f64 {
        if count <= 1 {
            return self.margin_left + self.plot_width() / 2.0;
        }
        self.margin_left + (index as f64 / (count - 1) as f64) * self.plot_width()
    }

    /// Y pixel for a value (canvas y grows downward)
    pub fn y_at(&self, value: f64, frame: &ChartFrame) -> f64 {
        let bounds = frame.y_bounds;
        self.margin_top + ((bounds.max - value) / bounds.span()) * self.plot_height()
    }

    /// Pixel positions of every sample, in order
    pub fn points(&self, frame: &ChartFrame) -> Vec<(f64, f64)> {
        let count = frame.len();
        frame
            .samples
            .iter()
            .enumerate()
            .map(|(i, s)| (self.x_at(i, count), self.y_at(s.ecg_signal, frame)))
            .collect()
    }

    /// Grid lines as `(y pixel, value)`, top to bottom
    pub fn y_ticks(&self, frame: &ChartFrame) -> Vec<(f64, f64)> {
        let bounds = frame.y_bounds;
        (0..=Y_TICKS)
            .map(|i| {
                let ratio = i as f64 / Y_TICKS as f64;
                let y = self.margin_top + ratio * self.plot_height();
                (y, bounds.max - ratio * bounds.span())
            })
            .collect()
    }

    /// X-axis labels as `(x pixel, label)`
    pub fn x_labels(&self, frame: &ChartFrame) -> Vec<(f64, String)> {
        let count = frame.len();
        label_indices(count)
            .into_iter()
            .map(|i| (self.x_at(i, count), time_label(&frame.samples[i].timestamp)))
            .collect()
    }

    /// Y pixel of the threshold guide, if it falls inside the plot
    pub fn threshold_y(&self, threshold: f64, frame: &ChartFrame) -> Option<f64> {
        let bounds = frame.y_bounds;
        (threshold >= bounds.min && threshold <= bounds.max).then(|| self.y_at(threshold, frame))
    }
}

/// Evenly spread sample indices to label, always including first and last
fn label_indices(count: usize) -> Vec<usize> {
    if count == 0 {
        return Vec::new();
    }
    if count <= MAX_X_LABELS {
        return (0..count).collect();
    }

    let step = (count - 1) as f64 / (MAX_X_LABELS - 1) as f64;
    (0..MAX_X_LABELS)
        .map(|i| (i as f64 * step).round() as usize)
        .collect()
}

/// Local time-of-day label for a sample
pub fn time_label(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DisplaySettings;
    use crate::model::Sample;
    use chrono::Duration;

    fn frame(values: &[f64]) -> ChartFrame {
        let start: DateTime<Utc> = "2024-01-01T00:00:00Z".parse().unwrap();
        let samples = values
            .iter()
            .enumerate()
            .map(|(i, v)| Sample::new(start + Duration::seconds(i as i64), *v))
            .collect();
        ChartFrame::from_samples(samples, &DisplaySettings::default()).unwrap()
    }

    #[test]
    fn test_points_span_plot() {
        let layout = ChartLayout::default();
        let f = frame(&[0.0, 1.0, 2.0]);
        let points = layout.points(&f);

        assert_eq!(points[0].0, layout.margin_left);
        assert_eq!(points[2].0, layout.width - layout.margin_right);
        // Bounds are [-1, 3], so 1.0 sits mid-plot
        assert_eq!(points[1].1, layout.margin_top + layout.plot_height() / 2.0);
    }

    #[test]
    fn test_single_point_is_centered() {
        let layout = ChartLayout::default();
        let points = layout.points(&frame(&[1.0]));
        assert_eq!(points[0].0, layout.margin_left + layout.plot_width() / 2.0);
    }

    #[test]
    fn test_y_ticks_cover_bounds() {
        let layout = ChartLayout::default();
        let ticks = layout.y_ticks(&frame(&[0.0, 4.0]));

        assert_eq!(ticks.len(), Y_TICKS + 1);
        assert_eq!(ticks[0].1, 5.0);
        assert_eq!(ticks[Y_TICKS].1, -1.0);
    }

    #[test]
    fn test_label_indices() {
        assert!(label_indices(0).is_empty());
        assert_eq!(label_indices(3), vec![0, 1, 2]);

        let many = label_indices(101);
        assert_eq!(many.len(), MAX_X_LABELS);
        assert_eq!(many[0], 0);
        assert_eq!(*many.last().unwrap(), 100);
    }

    #[test]
    fn test_threshold_guide_only_inside_bounds() {
        let layout = ChartLayout::default();
        assert!(layout.threshold_y(1.3, &frame(&[0.0, 1.0])).is_some());
        assert!(layout.threshold_y(1.3, &frame(&[5.0, 6.0])).is_none());
    }
}
