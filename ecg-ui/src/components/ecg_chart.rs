//! ECG Chart Component
//!
//! Polls the backend for the session's samples and draws them on an HTML5
//! canvas. Fetches on mount and every five seconds until unmounted.
//!
//! Every tick gets its own `AbortController`. When a tick's result is
//! applied, older ticks still in flight are aborted; a result from an older
//! tick that resolves late is dropped. Unmounting clears the timer and
//! aborts whatever is still in flight.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use gloo_timers::callback::Interval;
use leptos::*;
use wasm_bindgen::JsCast;
use web_sys::{AbortController, AbortSignal, CanvasRenderingContext2d, HtmlCanvasElement};

use ecg_monitor::chart::{ChartLayout, GRID_COLOR, LABEL_COLOR, SERIES_COLOR, WARNING_COLOR};
use ecg_monitor::display::POLL_INTERVAL_MS;
use ecg_monitor::export::EXPORT_FILE_STEM;
use ecg_monitor::{
    ApiError, ChartFrame, DisplaySettings, DisplayState, Locale, MessageId, TickSequencer,
};

use crate::api;
use crate::components::Loading;
use crate::state::SessionContext;

/// Number used for the emergency-call link
const EMERGENCY_NUMBER: &str = "112";

/// Bookkeeping for overlapping poll ticks
#[derive(Default)]
struct TickTracker {
    sequencer: TickSequencer,
    in_flight: BTreeMap<u64, AbortController>,
    stopped: bool,
}

impl TickTracker {
    /// Start a tick. Returns `None` once stopped or if no controller can be made.
    fn begin(&mut self) -> Option<(u64, AbortSignal)> {
        if self.stopped {
            return None;
        }

        let controller = AbortController::new().ok()?;
        let signal = controller.signal();
        let seq = self.sequencer.begin();
        self.in_flight.insert(seq, controller);

        Some((seq, signal))
    }

    /// Finish a tick. Returns `true` when its result should be shown.
    fn finish(&mut self, seq: u64) -> bool {
        self.in_flight.remove(&seq);

        if self.stopped || !self.sequencer.accept(seq) {
            return false;
        }

        // Everything older than the applied tick is stale
        let newer = self.in_flight.split_off(&seq);
        for (_, controller) in std::mem::replace(&mut self.in_flight, newer) {
            controller.abort();
        }
        true
    }

    /// Abort all in-flight ticks and refuse new ones
    fn stop(&mut self) {
        self.stopped = true;
        for (_, controller) in std::mem::take(&mut self.in_flight) {
            controller.abort();
        }
    }
}

/// Polling ECG chart
#[component]
pub fn EcgChart() -> impl IntoView {
    let ctx = use_context::<SessionContext>().expect("SessionContext not found");
    let state = create_rw_signal(DisplayState::Loading);
    let canvas_ref = create_node_ref::<html::Canvas>();

    let settings = DisplaySettings::default();
    let layout = ChartLayout::default();
    let tracker = Rc::new(RefCell::new(TickTracker::default()));

    let tick = {
        let tracker = Rc::clone(&tracker);
        move || {
            let Some(session) = ctx.session.get_untracked() else {
                state.set(DisplayState::not_logged_in());
                return;
            };

            let Some((seq, signal)) = tracker.borrow_mut().begin() else {
                return;
            };

            let tracker = Rc::clone(&tracker);
            spawn_local(async move {
                let result = api::fetch_ecg_data(session.user_id(), &signal).await;
                if result.as_ref().is_err_and(ApiError::is_aborted) {
                    return;
                }
                if let Err(e) = &result {
                    web_sys::console::error_1(&format!("Error fetching ECG data: {}", e).into());
                }

                if tracker.borrow_mut().finish(seq) {
                    state.set(DisplayState::from_fetch(result, &settings));
                }
            });
        }
    };

    // Fetch immediately, then on every interval
    tick();
    let interval = Interval::new(POLL_INTERVAL_MS as u32, tick);

    on_cleanup(move || {
        drop(interval);
        tracker.borrow_mut().stop();
    });

    // Redraw when data or language changes
    create_effect(move |_| {
        let locale = ctx.locale.get();
        let canvas = canvas_ref.get();

        state.with(|s| {
            if let (Some(frame), Some(canvas)) = (s.frame(), canvas) {
                draw_chart(&canvas, frame, &layout, settings.warning_threshold, locale);
            }
        });
    });

    let displaying = move || state.with(|s| s.frame().is_some());

    let export = move |_| {
        if let Some(canvas) = canvas_ref.get_untracked() {
            export_png(&canvas);
        }
    };

    view! {
        <div class="space-y-4">
            // Loading, error, or empty message in place of the chart
            {move || match state.get() {
                DisplayState::Loading => view! {
                    <Loading label=Signal::derive(move || ctx.text(MessageId::Loading)) />
                }.into_view(),
                DisplayState::Error(id) => view! {
                    <div class="text-red-500 p-4">{move || ctx.text(id)}</div>
                }.into_view(),
                DisplayState::Empty => view! {
                    <div class="p-4">{move || ctx.text(MessageId::NoData)}</div>
                }.into_view(),
                DisplayState::Displaying(_) => ().into_view(),
            }}

            <WarningBanner visible=Signal::derive(move || state.with(|s| s.warning())) />

            <div class="h-96" style:display=move || if displaying() { "block" } else { "none" }>
                <canvas
                    node_ref=canvas_ref
                    width=layout.width
                    height=layout.height
                    class="w-full h-full"
                />
            </div>

            <div class="flex justify-end" style:display=move || if displaying() { "flex" } else { "none" }>
                <button
                    on:click=export
                    class="px-4 py-2 bg-gray-200 hover:bg-gray-300 rounded-lg text-sm font-medium"
                >
                    {move || ctx.text(MessageId::ExportChart)}
                </button>
            </div>
        </div>
    }
}

/// Threshold warning with an emergency-call link
#[component]
fn WarningBanner(#[prop(into)] visible: Signal<bool>) -> impl IntoView {
    let ctx = use_context::<SessionContext>().expect("SessionContext not found");

    move || {
        visible.get().then(|| view! {
            <div class="flex items-center justify-between bg-red-100 border border-red-400 text-red-700 px-4 py-3 rounded-lg">
                <span class="font-medium">{move || ctx.text(MessageId::ThresholdWarning)}</span>
                <a
                    href=format!("tel:{}", EMERGENCY_NUMBER)
                    class="px-4 py-2 bg-red-600 hover:bg-red-700 text-white rounded-lg font-medium"
                >
                    {move || ctx.text(MessageId::EmergencyCall)}
                </a>
            </div>
        })
    }
}

/// Offer the canvas contents as a PNG download
fn export_png(canvas: &HtmlCanvasElement) {
    let url = match canvas.to_data_url_with_type("image/png") {
        Ok(url) => url,
        Err(e) => {
            web_sys::console::error_1(&format!("Chart export failed: {:?}", e).into());
            return;
        }
    };

    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let Ok(anchor) = document.create_element("a") else {
        return;
    };

    let _ = anchor.set_attribute("href", &url);
    let _ = anchor.set_attribute("download", &format!("{}.png", EXPORT_FILE_STEM));
    if let Some(anchor) = anchor.dyn_ref::<web_sys::HtmlElement>() {
        anchor.click();
    }
}

/// Draw one frame on the canvas
fn draw_chart(
    canvas: &HtmlCanvasElement,
    frame: &ChartFrame,
    layout: &ChartLayout,
    threshold: f64,
    locale: Locale,
) {
    let ctx = match canvas.get_context("2d") {
        Ok(Some(ctx)) => match ctx.dyn_into::<CanvasRenderingContext2d>() {
            Ok(ctx) => ctx,
            Err(_) => return,
        },
        _ => return,
    };

    let width = layout.width;
    let height = layout.height;

    // Opaque background so the PNG export is readable
    ctx.set_fill_style(&"#ffffff".into());
    ctx.fill_rect(0.0, 0.0, width, height);

    // Title
    ctx.set_fill_style(&LABEL_COLOR.into());
    ctx.set_font("bold 16px sans-serif");
    ctx.set_text_align("center");
    let _ = ctx.fill_text(MessageId::ChartTitle.text(locale), width / 2.0, 24.0);

    // Horizontal grid lines and y labels
    ctx.set_font("12px sans-serif");
    ctx.set_line_width(1.0);
    for (y, value) in layout.y_ticks(frame) {
        ctx.set_stroke_style(&GRID_COLOR.into());
        ctx.begin_path();
        ctx.move_to(layout.margin_left, y);
        ctx.line_to(width - layout.margin_right, y);
        ctx.stroke();

        ctx.set_text_align("right");
        let _ = ctx.fill_text(&format!("{:.1}", value), layout.margin_left - 8.0, y + 4.0);
    }

    // Threshold guide
    if let Some(y) = layout.threshold_y(threshold, frame) {
        ctx.set_stroke_style(&WARNING_COLOR.into());
        let _ = ctx.set_line_dash(&js_sys::Array::of2(&6.0.into(), &4.0.into()));
        ctx.begin_path();
        ctx.move_to(layout.margin_left, y);
        ctx.line_to(width - layout.margin_right, y);
        ctx.stroke();
        let _ = ctx.set_line_dash(&js_sys::Array::new());
    }

    // Signal series
    ctx.set_stroke_style(&SERIES_COLOR.into());
    ctx.set_line_width(2.0);
    ctx.begin_path();
    for (i, (x, y)) in layout.points(frame).into_iter().enumerate() {
        if i == 0 {
            ctx.move_to(x, y);
        } else {
            ctx.line_to(x, y);
        }
    }
    ctx.stroke();

    // X-axis labels
    ctx.set_fill_style(&LABEL_COLOR.into());
    ctx.set_text_align("center");
    for (x, label) in layout.x_labels(frame) {
        let _ = ctx.fill_text(&label, x, height - layout.margin_bottom + 18.0);
    }

    // Axis titles
    let _ = ctx.fill_text(
        MessageId::TimeAxis.text(locale),
        layout.margin_left + layout.plot_width() / 2.0,
        height - 8.0,
    );

    let mid = layout.margin_top + layout.plot_height() / 2.0;
    ctx.save();
    let _ = ctx.translate(14.0, mid);
    let _ = ctx.rotate(-std::f64::consts::FRAC_PI_2);
    let _ = ctx.fill_text(MessageId::SignalAxis.text(locale), 0.0, 0.0);
    ctx.restore();
}
