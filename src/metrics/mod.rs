//! Prometheus metrics for the booking service
//!
//! This module provides metrics tracking for:
//! - Registry: course creations, rejections, registered course count
//! - Bookings: outcomes per error kind, overbookings
//! - Service: caller timeouts, API request counts and durations
//!
//! # Usage
//!
//! Call `init_metrics()` at application startup to register all metrics.
//! Until then (or if registration fails) every recording call is a no-op.

use prometheus::{
    register_counter, register_counter_vec, register_gauge, register_histogram_vec, Counter,
    CounterVec, Encoder, Gauge, HistogramVec, TextEncoder,
};
use std::sync::OnceLock;

// ============================================================================
// Metrics Storage
// ============================================================================

/// Container for all booking metrics
struct BookingMetrics {
    courses_created: Counter,
    courses_rejected: CounterVec,
    registered_courses: Gauge,
    bookings: CounterVec,
    overbookings: Counter,
    timeouts: CounterVec,
    api_requests: CounterVec,
    api_duration: HistogramVec,
}

impl BookingMetrics {
    fn register() -> Result<Self, prometheus::Error> {
        Ok(Self {
            courses_created: register_counter!(
                "booking_courses_created_total",
                "Total number of courses admitted to the registry"
            )?,
            courses_rejected: register_counter_vec!(
                "booking_courses_rejected_total",
                "Total number of rejected course creations by reason",
                &["reason"]
            )?,
            registered_courses: register_gauge!(
                "booking_registered_courses",
                "Number of courses currently in the registry"
            )?,
            bookings: register_counter_vec!(
                "booking_bookings_total",
                "Total booking attempts by outcome",
                &["outcome"]
            )?,
            overbookings: register_counter!(
                "booking_overbookings_total",
                "Total bookings that pushed a class over its capacity"
            )?,
            timeouts: register_counter_vec!(
                "booking_request_timeouts_total",
                "Total requests whose caller deadline elapsed first",
                &["operation"]
            )?,
            api_requests: register_counter_vec!(
                "booking_api_requests_total",
                "Total API requests by endpoint and status",
                &["endpoint", "status"]
            )?,
            api_duration: register_histogram_vec!(
                "booking_api_request_duration_seconds",
                "API request duration in seconds",
                &["endpoint"],
                vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]
            )?,
        })
    }
}

/// Global storage; `None` when registration failed
static METRICS: OnceLock<Option<BookingMetrics>> = OnceLock::new();

fn metrics() -> Option<&'static BookingMetrics> {
    METRICS.get().and_then(Option::as_ref)
}

// ============================================================================
// Initialization
// ============================================================================

/// Initialize all Prometheus metrics
///
/// Safe to call more than once; only the first call registers anything.
/// If registration fails the error is returned once and recording stays a
/// no-op for the rest of the process.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    let mut failure = None;

    METRICS.get_or_init(|| match BookingMetrics::register() {
        Ok(m) => {
            tracing::info!("Prometheus metrics initialized successfully");
            Some(m)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Metrics initialization failed");
            failure = Some(e);
            None
        }
    });

    failure.map_or(Ok(()), Err)
}

/// Check if metrics have been initialized
pub fn metrics_initialized() -> bool {
    metrics().is_some()
}

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

// ============================================================================
// Recording
// ============================================================================

/// Record a course admitted to the registry
///
/// The registry is append-only, so the gauge only ever goes up.
pub fn record_course_created() {
    if let Some(m) = metrics() {
        m.courses_created.inc();
        m.registered_courses.inc();
    }
}

/// Record a rejected course creation
pub fn record_course_rejected(reason: &str) {
    if let Some(m) = metrics() {
        m.courses_rejected.with_label_values(&[reason]).inc();
    }
}

/// Record a booking attempt ("booked" or an error kind)
pub fn record_booking(outcome: &str) {
    if let Some(m) = metrics() {
        m.bookings.with_label_values(&[outcome]).inc();
    }
}

/// Record a booking beyond capacity
pub fn record_overbooking() {
    if let Some(m) = metrics() {
        m.overbookings.inc();
    }
}

/// Record a caller-side timeout
pub fn record_timeout(operation: &str) {
    if let Some(m) = metrics() {
        m.timeouts.with_label_values(&[operation]).inc();
    }
}

/// Record API request
pub fn record_api_request(endpoint: &str, status: u16) {
    if let Some(m) = metrics() {
        let status_str = status.to_string();
        m.api_requests
            .with_label_values(&[endpoint, status_str.as_str()])
            .inc();
    }
}

/// Histogram timer guard that records duration on drop
pub struct MetricsTimer {
    timer: Option<prometheus::HistogramTimer>,
}

impl Drop for MetricsTimer {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.stop_and_record();
        }
    }
}

/// Start an API request timer for `endpoint`
pub fn start_api_timer(endpoint: &str) -> MetricsTimer {
    MetricsTimer {
        timer: metrics().map(|m| m.api_duration.with_label_values(&[endpoint]).start_timer()),
    }
}

// ============================================================================
// Tests
// ============================================================================
