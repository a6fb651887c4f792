//! Date-ordered course sequences
//!
//! A sorted `Vec` with a binary-search insertion point. Inserting shifts the
//! tail, which is linear; lookups and range boundaries are logarithmic.

use chrono::NaiveDate;
use std::sync::Arc;

use crate::course::Course;

/// Which date of a course orders the sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Start,
    End,
}

impl SortKey {
    /// Date used for ordering `course`
    pub fn of(&self, course: &Course) -> NaiveDate {
        match self {
            Self::Start => course.start(),
            Self::End => course.end(),
        }
    }
}

/// Courses sorted ascending by one of their dates
///
/// Courses sharing a date keep their insertion order.
#[derive(Debug, Clone)]
pub struct SortedCourses {
    key: SortKey,
    courses: Vec<Arc<Course>>,
}

impl SortedCourses {
    /// Create an empty sequence ordered by `key`
    pub fn new(key: SortKey) -> Self {
        Self {
            key,
            courses: Vec::new(),
        }
    }

    /// Index of the first course whose date is strictly after `date`
    ///
    /// This is also where a course with that date is inserted, after all
    /// courses sharing the date.
    pub fn first_after(&self, date: NaiveDate) -> usize {
        self.courses.partition_point(|c| self.key.of(c) <= date)
    }

    /// Index of the first course whose date is on or after `date`
    pub fn first_on_or_after(&self, date: NaiveDate) -> usize {
        self.courses.partition_point(|c| self.key.of(c) < date)
    }

    /// Insert keeping the order, returns the position used
    pub fn insert(&mut self, course: Arc<Course>) -> usize {
        let idx = self.first_after(self.key.of(&course));
        self.courses.insert(idx, course);
        idx
    }

    pub fn as_slice(&self) -> &[Arc<Course>] {
        &self.courses
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Course>> {
        self.courses.iter()
    }

    /// Check the ascending order
    pub fn is_sorted(&self) -> bool {
        self.courses
            .windows(2)
            .all(|w| self.key.of(&w[0]) <= self.key.of(&w[1]))
    }
}
