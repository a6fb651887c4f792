//! Booking attendees into the daily classes of a course
//!
//! Capacity is advisory: a booking beyond it succeeds and is only reported
//! (log line, metric, and [`Booking::over_capacity`]).

use chrono::NaiveDate;
use serde::Serialize;

use super::{today, Course};
use crate::error::BookingError;
use crate::metrics;

/// Receipt of a successful booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Booking {
    pub course_id: String,
    pub course_name: String,
    pub date: NaiveDate,
    pub attendee: String,

    /// Attendees of the class after this booking
    pub attendees: usize,

    /// How far the class is over capacity, if at all
    #[serde(skip_serializing_if = "Option::is_none")]
    pub over_capacity: Option<u32>,
}

impl Booking {
    /// Check if the booking pushed the class over capacity
    pub fn is_overbooked(&self) -> bool {
        self.over_capacity.is_some()
    }
}

impl Course {
    /// Register `attendee` for the class on `date`
    ///
    /// The date must lie within the course and must not be in the past.
    /// An attendee can only book a given class once.
    pub fn book_class(&self, attendee: &str, date: NaiveDate) -> Result<Booking, BookingError> {
        self.book_class_on(attendee, date, today())
    }

    /// Same as [`Course::book_class`], with `today` supplied by the caller
    pub fn book_class_on(
        &self,
        attendee: &str,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<Booking, BookingError> {
        // course-level reason first
        if today > self.end {
            return Err(BookingError::Expired {
                course_id: self.id.clone(),
                end: self.end,
            });
        }

        if date < today {
            return Err(BookingError::invalid_input("please pick a future date"));
        }

        let idx = self.class_index(date)?;

        let attendees = {
            let mut classes = self.lock_classes();
            let class = &mut classes[idx];

            // names are not unique across people, exact match is all we have
            if class.contains(attendee) {
                return Err(BookingError::DuplicateAttendee {
                    attendee: attendee.to_string(),
                    date,
                });
            }

            class.push(attendee.to_string());
            class.len()
        };

        let over_capacity = attendees
            .checked_sub(self.capacity as usize)
            .filter(|over| *over > 0)
            .map(|over| over as u32);

        if let Some(over) = over_capacity {
            tracing::warn!(
                course = %self.name,
                course_id = %self.id,
                date = %date,
                over = over,
                "Course over capacity"
            );
            metrics::record_overbooking();
        }

        tracing::debug!(
            course_id = %self.id,
            date = %date,
            attendee = %attendee,
            attendees = attendees,
            "Class booked"
        );

        Ok(Booking {
            course_id: self.id.clone(),
            course_name: self.name.clone(),
            date,
            attendee: attendee.to_string(),
            attendees,
            over_capacity,
        })
    }
}
