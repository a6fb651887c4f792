//! Booking service: the operations offered to request handlers
//!
//! Course creation and booking run the registry work on a blocking task and
//! race it against the caller's deadline. When the deadline wins the caller
//! gets [`Error::Timeout`], but the task is left running: a registry mutation
//! that has started always completes, it just goes unseen by that caller.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::course::{days_between, Booking, Course, CourseSummary};
use crate::error::{BookingError, Error, Result};
use crate::metrics;
use crate::registry::{CourseRegistry, RegistryStats};

/// Parameters for creating a course
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCourse {
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub capacity: i64,

    /// Allow the course to lie entirely in the past
    #[serde(default)]
    pub historic: bool,
}

/// Which slice of the registry to list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseView {
    #[default]
    All,
    Past,
    Current,
    Upcoming,
}

impl std::str::FromStr for CourseView {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "past" => Ok(Self::Past),
            "current" => Ok(Self::Current),
            "upcoming" => Ok(Self::Upcoming),
            _ => Err(()),
        }
    }
}

/// Service facade over a shared [`CourseRegistry`]
#[derive(Debug, Clone)]
pub struct BookingService {
    registry: Arc<CourseRegistry>,
    default_timeout: Duration,
    max_course_days: u32,
}

impl BookingService {
    /// Create a service over `registry` with a 5 second default deadline
    /// and courses of at most 3660 days
    pub fn new(registry: Arc<CourseRegistry>) -> Self {
        Self {
            registry,
            default_timeout: Duration::from_secs(5),
            max_course_days: 3_660,
        }
    }

    /// Set the deadline used when callers do not pass one
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Set the longest course accepted by [`BookingService::create_course`]
    pub fn with_max_course_days(mut self, days: u32) -> Self {
        self.max_course_days = days;
        self
    }

    /// The underlying registry
    pub fn registry(&self) -> &Arc<CourseRegistry> {
        &self.registry
    }

    /// Validate and register a new course
    pub async fn create_course(
        &self,
        request: NewCourse,
        timeout: Option<Duration>,
    ) -> Result<CourseSummary> {
        // one class is allocated per day, bound that before allocating
        let days = days_between(request.start, request.end) + 1;
        if days > i64::from(self.max_course_days) {
            metrics::record_course_rejected("too_long");
            return Err(BookingError::invalid_input(format!(
                "invalid course parameters: course spans {days} days, at most {} allowed",
                self.max_course_days
            ))
            .into());
        }

        let registry = Arc::clone(&self.registry);

        let summary = run_with_deadline("create_course", self.deadline(timeout), move || {
            let course = Course::new(
                request.name,
                request.start,
                request.end,
                request.capacity,
                request.historic,
            )
            .map(Arc::new)
            .inspect_err(|_| metrics::record_course_rejected("invalid_input"))?;

            let summary = course.summary();
            match registry.add(course) {
                Ok(()) => {
                    metrics::record_course_created();
                    Ok(summary)
                }
                Err(e) => {
                    metrics::record_course_rejected("duplicate");
                    Err(e)
                }
            }
        })
        .await?;

        tracing::info!(
            course_id = %summary.id,
            name = %summary.name,
            start = %summary.start,
            end = %summary.end,
            capacity = summary.capacity,
            classes = summary.num_classes,
            "Course created"
        );

        Ok(summary)
    }

    /// Book `attendee` into the class of course `course_id` on `date`
    pub async fn book_class(
        &self,
        course_id: &str,
        attendee: &str,
        date: NaiveDate,
        timeout: Option<Duration>,
    ) -> Result<Booking> {
        let registry = Arc::clone(&self.registry);
        let course_id = course_id.to_string();
        let attendee = attendee.to_string();

        run_with_deadline("book_class", self.deadline(timeout), move || {
            let result = registry
                .get(&course_id)
                .and_then(|course| course.book_class(&attendee, date));

            match &result {
                Ok(_) => metrics::record_booking("booked"),
                Err(e) => metrics::record_booking(outcome_label(e)),
            }
            result
        })
        .await
    }

    /// Summary of a single course
    pub fn get_course(&self, id: &str) -> Result<CourseSummary> {
        Ok(self.registry.get(id)?.summary())
    }

    /// List one view of the registry
    pub fn list(&self, view: CourseView) -> Vec<CourseSummary> {
        let courses = match view {
            CourseView::All => self.registry.all(),
            CourseView::Past => self.registry.past(),
            CourseView::Current => self.registry.current(),
            CourseView::Upcoming => self.registry.upcoming(),
        };

        courses.iter().map(|c| c.summary()).collect()
    }

    /// All courses, sorted by start date
    pub fn list_all(&self) -> Vec<CourseSummary> {
        self.list(CourseView::All)
    }

    /// Courses starting after today
    pub fn list_upcoming(&self) -> Vec<CourseSummary> {
        self.list(CourseView::Upcoming)
    }

    /// Courses running today
    pub fn list_current(&self) -> Vec<CourseSummary> {
        self.list(CourseView::Current)
    }

    /// Courses that ended before today
    pub fn list_past(&self) -> Vec<CourseSummary> {
        self.list(CourseView::Past)
    }

    /// Course counts per view
    pub fn stats(&self) -> RegistryStats {
        self.registry.stats()
    }

    fn deadline(&self, timeout: Option<Duration>) -> Duration {
        timeout.unwrap_or(self.default_timeout)
    }
}

fn outcome_label(err: &BookingError) -> &'static str {
    match err {
        BookingError::InvalidInput(_) => "invalid_input",
        BookingError::NotFound(_) => "not_found",
        BookingError::OutOfRange { .. } => "out_of_range",
        BookingError::Expired { .. } => "expired",
        BookingError::DuplicateAttendee { .. } => "duplicate_attendee",
        BookingError::Duplicate(_) => "duplicate",
    }
}

/// Run `op` on a blocking task and wait for it at most `deadline`
///
/// The task is never aborted; on timeout it keeps running to completion.
pub(crate) async fn run_with_deadline<T, F>(
    operation: &'static str,
    deadline: Duration,
    op: F,
) -> Result<T>
where
    F: FnOnce() -> std::result::Result<T, BookingError> + Send + 'static,
    T: Send + 'static,
{
    let handle = tokio::task::spawn_blocking(op);

    match tokio::time::timeout(deadline, handle).await {
        Ok(joined) => Ok(joined??),
        Err(_) => {
            tracing::warn!(
                operation = operation,
                timeout_ms = deadline.as_millis() as u64,
                "Caller deadline elapsed, operation continues in background"
            );
            metrics::record_timeout(operation);
            Err(Error::Timeout(deadline))
        }
    }
}
