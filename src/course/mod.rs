//! Courses and their daily classes
//!
//! A [`Course`] is a named range of civil dates with one [`Class`] per day and
//! a shared, advisory attendee capacity. Everything except the attendee lists
//! is immutable once the course is constructed; the attendee lists sit behind
//! a per-course mutex and are only touched by the booking operation
//! (see [`booking`]).
//!
//! # Example
//!
//! ```
//! use booking::course::Course;
//! use chrono::NaiveDate;
//!
//! let start = NaiveDate::from_ymd_opt(2020, 12, 1).unwrap();
//! let end = NaiveDate::from_ymd_opt(2020, 12, 20).unwrap();
//!
//! let pilates = Course::new("Pilates", start, end, 10, true).unwrap();
//! assert_eq!(pilates.num_classes(), 20);
//! ```

pub mod booking;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use crate::error::BookingError;

pub use booking::Booking;

/// Current civil date in the local timezone
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Number of days from `start` to `end` (negative if `end` is earlier)
pub fn days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

// ============================================================================
// Class
// ============================================================================

/// One day of a course
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Class {
    /// Names of the attendees, in booking order
    attendees: Vec<String>,
}

impl Class {
    /// Attendees in booking order
    pub fn attendees(&self) -> &[String] {
        &self.attendees
    }

    /// Number of booked attendees
    pub fn len(&self) -> usize {
        self.attendees.len()
    }

    /// Whether nobody booked this class yet
    pub fn is_empty(&self) -> bool {
        self.attendees.is_empty()
    }

    /// Check if an attendee is booked (exact name match)
    pub fn contains(&self, attendee: &str) -> bool {
        self.attendees.iter().any(|a| a == attendee)
    }

    pub(crate) fn push(&mut self, attendee: String) {
        self.attendees.push(attendee);
    }
}

// ============================================================================
// Course
// ============================================================================

/// A named course with one class per day between `start` and `end`
#[derive(Debug)]
pub struct Course {
    id: String,
    name: String,
    start: NaiveDate,
    end: NaiveDate,
    capacity: u32,

    // len == num_classes(), fixed at construction
    classes: Mutex<Vec<Class>>,
}

impl Course {
    /// Create a course, measuring "the past" against the local date
    ///
    /// With `allow_past` set the course may lie entirely in the past
    /// (a historic course); the remaining checks still apply.
    pub fn new(
        name: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
        capacity: i64,
        allow_past: bool,
    ) -> Result<Self, BookingError> {
        Self::new_on(name, start, end, capacity, allow_past, today())
    }

    /// Create a course, measuring "the past" against `today`
    pub fn new_on(
        name: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
        capacity: i64,
        allow_past: bool,
        today: NaiveDate,
    ) -> Result<Self, BookingError> {
        if !allow_past && end < today {
            return Err(BookingError::invalid_input(
                "invalid course parameters: course is in the past",
            ));
        }

        let name = name.into();
        if name.is_empty() {
            return Err(BookingError::invalid_input("please provide a course name"));
        }

        if start > end {
            return Err(BookingError::invalid_input(format!(
                "invalid course parameters: start date ({start}) after end date ({end})"
            )));
        }

        if capacity < 1 {
            return Err(BookingError::invalid_input(format!(
                "invalid course parameters: capacity ({capacity}) must be positive"
            )));
        }
        let capacity = u32::try_from(capacity).map_err(|_| {
            BookingError::invalid_input(format!(
                "invalid course parameters: capacity ({capacity}) is too large"
            ))
        })?;

        let num_classes = days_between(start, end) as usize + 1;

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name,
            start,
            end,
            capacity,
            classes: Mutex::new(vec![Class::default(); num_classes]),
        })
    }

    /// Course identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Course name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// First day of the course
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the course
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Advisory number of attendees per class
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Number of classes, one for every day of the course
    pub fn num_classes(&self) -> usize {
        days_between(self.start, self.end) as usize + 1
    }

    /// Whether `date` lies within `[start, end]`
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Snapshot of the class held on `date`
    pub fn class_on(&self, date: NaiveDate) -> Result<Class, BookingError> {
        let idx = self.class_index(date)?;
        Ok(self.lock_classes()[idx].clone())
    }

    /// Attendees booked for the class on `date`
    pub fn attendees_on(&self, date: NaiveDate) -> Result<Vec<String>, BookingError> {
        self.class_on(date).map(|class| class.attendees)
    }

    /// Summary of the immutable course fields
    pub fn summary(&self) -> CourseSummary {
        CourseSummary::from(self)
    }

    /// Offset of the class for `date` into the class list
    fn class_index(&self, date: NaiveDate) -> Result<usize, BookingError> {
        if !self.covers(date) {
            return Err(BookingError::OutOfRange {
                date,
                start: self.start,
                end: self.end,
            });
        }

        Ok(days_between(self.start, date) as usize)
    }

    /// Lock the class list
    ///
    /// Attendee lists are only changed by a single push, so a poisoned lock
    /// still guards consistent data.
    fn lock_classes(&self) -> MutexGuard<'_, Vec<Class>> {
        self.classes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ============================================================================
// Course Summary
// ============================================================================

/// Immutable view of a course handed out to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSummary {
    pub id: String,
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub capacity: u32,
    pub num_classes: usize,
}

impl From<&Course> for CourseSummary {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id.clone(),
            name: course.name.clone(),
            start: course.start,
            end: course.end,
            capacity: course.capacity,
            num_classes: course.num_classes(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
