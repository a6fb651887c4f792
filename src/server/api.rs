//! REST API handlers for the booking server
//!
//! Course creation and booking accept their parameters either in the query
//! string (GET) or as an urlencoded body (POST).

use axum::{
    extract::{Form, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::collections::HashMap;

use crate::course::{Booking, CourseSummary};
use crate::error::{Error, ErrorCategory};
use crate::metrics;
use crate::registry::RegistryStats;
use crate::service::{CourseView, NewCourse};

use super::form::{title_case, FormError, FormValues};
use super::AppState;

// ============================================================================
// API Response Types
// ============================================================================

/// Generic API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Simple error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub courses: RegistryStats,
}

/// Course list response
#[derive(Debug, Serialize)]
pub struct CoursesResponse {
    pub view: CourseView,
    pub courses: Vec<CourseSummary>,
}

/// Rejections of a request, before or after reaching the service
#[derive(Debug)]
enum ApiError {
    Form(FormError),
    Service(Error),
}

impl From<FormError> for ApiError {
    fn from(err: FormError) -> Self {
        Self::Form(err)
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self::Service(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Form(_) => StatusCode::BAD_REQUEST,
            Self::Service(e) => match e.category() {
                ErrorCategory::Input => StatusCode::BAD_REQUEST,
                ErrorCategory::Timeout => StatusCode::REQUEST_TIMEOUT,
                ErrorCategory::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Form(e) => e.to_string(),
            Self::Service(e) => e.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(error = %message, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %message, "Request rejected");
        }

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

// ============================================================================
// API Routes
// ============================================================================

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/api/health", get(health_check))
        .route("/metrics", get(prometheus_metrics))
        // Course endpoints
        .route("/api/classes", get(create_course_query).post(create_course_form))
        .route("/api/courses", get(list_courses))
        .route("/api/courses/{id}", get(get_course))
        // Booking endpoints
        .route("/api/bookings", get(book_class_query).post(book_class_form))
        .with_state(state)
}

fn respond<T: Serialize>(
    endpoint: &str,
    status: StatusCode,
    result: Result<ApiResponse<T>, ApiError>,
) -> Response {
    let response = match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(e) => e.into_response(),
    };
    metrics::record_api_request(endpoint, response.status().as_u16());
    response
}

// ============================================================================
// Health Handlers
// ============================================================================

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        courses: state.service.stats(),
    }))
}

/// Prometheus text exposition
async fn prometheus_metrics() -> Response {
    match metrics::encode_metrics() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            let message = e.to_string();
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::new(message))).into_response()
        }
    }
}

// ============================================================================
// Course Handlers
// ============================================================================

async fn create_course_query(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    create_course(state, params.into()).await
}

async fn create_course_form(
    State(state): State<AppState>,
    Form(params): Form<HashMap<String, String>>,
) -> Response {
    create_course(state, params.into()).await
}

/// Create a course from `name`, `start`, `end`, `capacity`, and the optional
/// `historic` and `timeout` parameters
async fn create_course(state: AppState, form: FormValues) -> Response {
    let _timer = metrics::start_api_timer("/api/classes");

    let result = async {
        let request = NewCourse {
            name: title_case(&form.string("name")?),
            start: form.date("start")?,
            end: form.date("end")?,
            capacity: form.int("capacity")?,
            historic: form.flag("historic")?,
        };
        let timeout = form.timeout("timeout", state.config.max_timeout())?;

        let summary = state.service.create_course(request, timeout).await?;
        Ok::<_, ApiError>(ApiResponse::success(summary).with_message("course created"))
    }
    .await;

    respond("/api/classes", StatusCode::CREATED, result)
}

/// List courses, `view` is one of all, past, current, upcoming
async fn list_courses(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let form = FormValues::from(params);

    let result = form
        .optional::<CourseView>("view", "view")
        .map(|view| {
            let view = view.unwrap_or_default();
            ApiResponse::success(CoursesResponse {
                view,
                courses: state.service.list(view),
            })
        })
        .map_err(ApiError::from);

    respond("/api/courses", StatusCode::OK, result)
}

/// Get a single course
async fn get_course(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.service.get_course(&id) {
        Ok(summary) => (StatusCode::OK, Json(ApiResponse::success(summary))).into_response(),
        Err(e) => (StatusCode::NOT_FOUND, Json(ErrorResponse::new(e.to_string()))).into_response(),
    }
}

// ============================================================================
// Booking Handlers
// ============================================================================

async fn book_class_query(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    book_class(state, params.into()).await
}

async fn book_class_form(
    State(state): State<AppState>,
    Form(params): Form<HashMap<String, String>>,
) -> Response {
    book_class(state, params.into()).await
}

/// Book the attendee `name` into the class of course `id` on `date`
async fn book_class(state: AppState, form: FormValues) -> Response {
    let _timer = metrics::start_api_timer("/api/bookings");

    let result = async {
        let name = form.string("name")?;
        let date = form.date("date")?;
        let id = form.string("id")?;
        let timeout = form.timeout("timeout", state.config.max_timeout())?;

        let booking = state.service.book_class(&id, &name, date, timeout).await?;
        let message = booking_message(&booking);
        Ok::<_, ApiError>(ApiResponse::success(booking).with_message(message))
    }
    .await;

    respond("/api/bookings", StatusCode::OK, result)
}

/// Confirmation shown to the attendee
pub fn booking_message(booking: &Booking) -> String {
    format!(
        "Congratulations, {}! You are now registered for the {} class on {}.",
        booking.attendee,
        booking.course_name,
        booking.date.format("%A, %-d. %B %Y")
    )
}

// ============================================================================
// Tests
// ============================================================================
