//! Display State
//!
//! Turns one poll tick's fetch result into what the chart view shows.
//! The view is a small state machine:
//!
//! ```text
//! Loading ──tick──> Error(..) | Empty | Displaying(frame)
//!                        ^___________________|  (every tick)
//! ```
//!
//! Nothing here touches the network or the clock, so the same derivation
//! runs in the browser dashboard and the native poller.

use serde::Serialize;

use crate::messages::MessageId;
use crate::model::Sample;

/// Signal value above which the warning banner is shown
pub const WARNING_THRESHOLD: f64 = 1.3;

/// Pass-through amplification gain
pub const DEFAULT_GAIN: f64 = 1.0;

/// Delay between poll ticks
pub const POLL_INTERVAL_MS: u64 = 5000;

/// Padding added on each side of the y axis
const AXIS_PADDING: f64 = 1.0;

/// Tunables for deriving a chart frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplaySettings {
    pub warning_threshold: f64,
    pub gain: f64,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            warning_threshold: WARNING_THRESHOLD,
            gain: DEFAULT_GAIN,
        }
    }
}

/// Y-axis range for one batch
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisBounds {
    pub min: f64,
    pub max: f64,
}

impl AxisBounds {
    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Everything needed to draw one tick's chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartFrame {
    /// Samples in ascending timestamp order
    pub samples: Vec<Sample>,
    /// True when any sample exceeds the warning threshold
    pub warning: bool,
    /// Y-axis bounds over this batch only
    pub y_bounds: AxisBounds,
}

impl ChartFrame {
    /// Build a frame from an unordered batch. Returns `None` for an empty batch.
    pub fn from_samples(samples: Vec<Sample>, settings: &DisplaySettings) -> Option<Self> {
        let mut samples = amplify(samples, settings.gain);
        sort_samples(&mut samples);

        let y_bounds = axis_bounds(&samples)?;
        let warning = exceeds_threshold(&samples, settings.warning_threshold);

        Some(Self {
            samples,
            warning,
            y_bounds,
        })
    }

    /// Number of samples. A frame is never empty.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Most recent sample in the frame
    pub fn latest(&self) -> Option<&Sample> {
        self.samples.last()
    }
}

/// What the chart view is currently showing
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DisplayState {
    /// Before the first tick has resolved
    #[default]
    Loading,
    /// Message shown in place of the chart for this tick
    Error(MessageId),
    /// Fetch succeeded with zero samples
    Empty,
    /// Chart with data
    Displaying(ChartFrame),
}

impl DisplayState {
    /// State for a view with no stored session; no fetch is issued.
    pub fn not_logged_in() -> Self {
        DisplayState::Error(MessageId::NotLoggedIn)
    }

    /// Derive the state from one tick's fetch result.
    pub fn from_fetch<E>(result: Result<Vec<Sample>, E>, settings: &DisplaySettings) -> Self {
        match result {
            Ok(samples) => match ChartFrame::from_samples(samples, settings) {
                Some(frame) => DisplayState::Displaying(frame),
                None => DisplayState::Empty,
            },
            Err(_) => DisplayState::Error(MessageId::FetchFailed),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, DisplayState::Loading)
    }

    pub fn error(&self) -> Option<MessageId> {
        match self {
            DisplayState::Error(id) => Some(*id),
            _ => None,
        }
    }

    pub fn frame(&self) -> Option<&ChartFrame> {
        match self {
            DisplayState::Displaying(frame) => Some(frame),
            _ => None,
        }
    }

    /// Whether the warning banner and emergency link should render
    pub fn warning(&self) -> bool {
        self.frame().map(|f| f.warning).unwrap_or(false)
    }

    /// Message to show instead of a chart, if any
    pub fn placeholder(&self) -> Option<MessageId> {
        match self {
            DisplayState::Loading => Some(MessageId::Loading),
            DisplayState::Error(id) => Some(*id),
            DisplayState::Empty => Some(MessageId::NoData),
            DisplayState::Displaying(_) => None,
        }
    }
}

/// Sort samples ascending by timestamp. Stable: equal timestamps keep
/// their response order.
pub fn sort_samples(samples: &mut [Sample]) {
    samples.sort_by_key(|s| s.timestamp);
}

/// True when any sample's signal is strictly above `threshold`
pub fn exceeds_threshold(samples: &[Sample], threshold: f64) -> bool {
    samples.iter().any(|s| s.ecg_signal > threshold)
}

/// `[min - 1, max + 1]` over the batch, or `None` when empty
pub fn axis_bounds(samples: &[Sample]) -> Option<AxisBounds> {
    let first = samples.first()?.ecg_signal;
    let (min, max) = samples
        .iter()
        .fold((first, first), |(lo, hi), s| (lo.min(s.ecg_signal), hi.max(s.ecg_signal)));

    Some(AxisBounds {
        min: min - AXIS_PADDING,
        max: max + AXIS_PADDING,
    })
}

/// Scale every signal by `gain`. A gain of 1.0 returns the batch untouched.
pub fn amplify(samples: Vec<Sample>, gain: f64) -> Vec<Sample> {
    if gain == DEFAULT_GAIN {
        return samples;
    }

    samples
        .into_iter()
        .map(|s| Sample {
            ecg_signal: s.ecg_signal * gain,
            ..s
        })
        .collect()
}

/// Orders poll ticks so a slow response from an older tick cannot
/// replace the result of a newer one.
#[derive(Debug, Default, Clone)]
pub struct TickSequencer {
    issued: u64,
    applied: u64,
}

impl TickSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the sequence number for a new tick
    pub fn begin(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Record a tick's completion. Returns `false` when a newer tick has
    /// already been applied and this result must be dropped.
    pub fn accept(&mut self, seq: u64) -> bool {
        if seq > self.applied {
            self.applied = seq;
            true
        } else {
            false
        }
    }

    /// Sequence number of the most recently started tick
    pub fn latest(&self) -> u64 {
        self.issued
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn sample(t: &str, v: f64) -> Sample {
        Sample::new(ts(t), v)
    }

    #[test]
    fn test_unordered_batch_is_sorted() {
        let batch = vec![
            sample("2024-01-01T00:00:02Z", 1.0),
            sample("2024-01-01T00:00:01Z", 0.5),
        ];

        let state = DisplayState::from_fetch::<()>(Ok(batch), &DisplaySettings::default());
        let frame = state.frame().expect("should be displaying");

        assert_eq!(frame.samples[0], sample("2024-01-01T00:00:01Z", 0.5));
        assert_eq!(frame.samples[1], sample("2024-01-01T00:00:02Z", 1.0));
        assert!(!frame.warning);
        assert!(!state.warning());
    }

    #[test]
    fn test_sort_is_stable_for_equal_timestamps() {
        let mut batch = vec![
            sample("2024-01-01T00:00:05Z", 0.3),
            sample("2024-01-01T00:00:01Z", 0.1),
            sample("2024-01-01T00:00:05Z", 0.2),
        ];
        sort_samples(&mut batch);

        let values: Vec<f64> = batch.iter().map(|s| s.ecg_signal).collect();
        assert_eq!(values, vec![0.1, 0.3, 0.2]);
    }

    #[test]
    fn test_empty_batch_is_empty_state() {
        let state = DisplayState::from_fetch::<()>(Ok(vec![]), &DisplaySettings::default());
        assert_eq!(state, DisplayState::Empty);
        assert_eq!(state.error(), None);
        assert_eq!(state.placeholder(), Some(MessageId::NoData));
    }

    #[test]
    fn test_fetch_error_is_error_state() {
        let state = DisplayState::from_fetch::<&str>(Err("boom"), &DisplaySettings::default());
        assert_eq!(state.error(), Some(MessageId::FetchFailed));
    }

    #[test]
    fn test_not_logged_in() {
        let state = DisplayState::not_logged_in();
        assert_eq!(state.error(), Some(MessageId::NotLoggedIn));
        assert!(!state.warning());
    }

    #[test]
    fn test_initial_state_is_loading() {
        let state = DisplayState::default();
        assert!(state.is_loading());
        assert_eq!(state.placeholder(), Some(MessageId::Loading));
    }

    #[test]
    fn test_threshold_is_strict() {
        let at = vec![sample("2024-01-01T00:00:01Z", 1.3)];
        let above = vec![sample("2024-01-01T00:00:01Z", 1.31)];

        assert!(!exceeds_threshold(&at, WARNING_THRESHOLD));
        assert!(exceeds_threshold(&above, WARNING_THRESHOLD));
    }

    #[test]
    fn test_warning_when_any_sample_exceeds() {
        let batch = vec![
            sample("2024-01-01T00:00:01Z", 0.2),
            sample("2024-01-01T00:00:02Z", 1.8),
            sample("2024-01-01T00:00:03Z", 0.4),
        ];
        let state = DisplayState::from_fetch::<()>(Ok(batch), &DisplaySettings::default());
        assert!(state.warning());
    }

    #[test]
    fn test_axis_bounds_pad_current_batch() {
        let batch = vec![
            sample("2024-01-01T00:00:01Z", -0.5),
            sample("2024-01-01T00:00:02Z", 2.0),
        ];
        let bounds = axis_bounds(&batch).unwrap();
        assert_eq!(bounds, AxisBounds { min: -1.5, max: 3.0 });
        assert_eq!(bounds.span(), 4.5);

        assert!(axis_bounds(&[]).is_none());
    }

    #[test]
    fn test_single_sample_bounds() {
        let bounds = axis_bounds(&[sample("2024-01-01T00:00:01Z", 1.0)]).unwrap();
        assert_eq!(bounds, AxisBounds { min: 0.0, max: 2.0 });
    }

    #[test]
    fn test_default_gain_is_pass_through() {
        let batch = vec![sample("2024-01-01T00:00:01Z", 0.7)];
        assert_eq!(amplify(batch.clone(), DEFAULT_GAIN), batch);
    }

    #[test]
    fn test_gain_applies_before_threshold() {
        let batch = vec![sample("2024-01-01T00:00:01Z", 0.7)];
        let settings = DisplaySettings {
            gain: 2.0,
            ..Default::default()
        };
        let frame = ChartFrame::from_samples(batch, &settings).unwrap();
        assert_eq!(frame.samples[0].ecg_signal, 1.4);
        assert!(frame.warning);
    }

    #[test]
    fn test_sequencer_drops_stale_ticks() {
        let mut seq = TickSequencer::new();
        let first = seq.begin();
        let second = seq.begin();

        assert!(seq.accept(second));
        assert!(!seq.accept(first));
        assert_eq!(seq.latest(), second);

        let third = seq.begin();
        assert!(seq.accept(third));
    }
}
