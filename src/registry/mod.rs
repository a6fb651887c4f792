//! Concurrent, indexed course registry
//!
//! The registry owns every admitted course and keeps four indexes over them:
//!
//! - by identifier (point lookup)
//! - by name (duplicate detection)
//! - by start date (all / upcoming views)
//! - by end date (current / past views)
//!
//! All indexes sit behind one read-write lock. [`CourseRegistry::add`]
//! updates them inside a single write section, so readers never see a course
//! in some indexes and not others. Courses are append-only.
//!
//! # Usage
//!
//! ```
//! use booking::course::Course;
//! use booking::registry::CourseRegistry;
//! use chrono::{Days, Local};
//! use std::sync::Arc;
//!
//! let registry = CourseRegistry::new();
//! let today = Local::now().date_naive();
//!
//! let course = Arc::new(Course::new("Karate", today, today + Days::new(3), 10, false).unwrap());
//! registry.add(Arc::clone(&course)).unwrap();
//!
//! assert_eq!(registry.get(course.id()).unwrap().name(), "Karate");
//! assert_eq!(registry.current().len(), 1);
//! ```

pub mod sorted;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::course::{today, Course};
use crate::error::BookingError;

pub use sorted::{SortKey, SortedCourses};

// ============================================================================
// Indexes
// ============================================================================

/// The index structures, always updated together
#[derive(Debug)]
struct Indexes {
    by_id: HashMap<String, Arc<Course>>,
    by_name: HashMap<String, Vec<Arc<Course>>>,
    by_start: SortedCourses,
    by_end: SortedCourses,
}

impl Indexes {
    fn new() -> Self {
        Self {
            by_id: HashMap::new(),
            by_name: HashMap::new(),
            by_start: SortedCourses::new(SortKey::Start),
            by_end: SortedCourses::new(SortKey::End),
        }
    }

    /// Position in `by_end` of the first course that has not ended before `today`
    fn first_not_ended(&self, today: NaiveDate) -> usize {
        self.by_end.first_on_or_after(today)
    }
}

// ============================================================================
// Course Registry
// ============================================================================

/// Registry of all courses
#[derive(Debug)]
pub struct CourseRegistry {
    indexes: RwLock<Indexes>,
}

impl Default for CourseRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CourseRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            indexes: RwLock::new(Indexes::new()),
        }
    }

    /// Get a course by identifier
    pub fn get(&self, id: &str) -> Result<Arc<Course>, BookingError> {
        self.read()
            .by_id
            .get(id)
            .cloned()
            .ok_or_else(|| BookingError::not_found(id))
    }

    /// Add a course
    ///
    /// A course is a duplicate if its identifier is already registered, or if
    /// another course with the same name has exactly the same start and end
    /// dates. Overlapping date ranges under one name are fine.
    pub fn add(&self, course: Arc<Course>) -> Result<(), BookingError> {
        let mut indexes = self.write();

        if indexes.by_id.contains_key(course.id()) {
            return Err(BookingError::duplicate(format!(
                "a course with the ID {} has already been added",
                course.id()
            )));
        }

        let same_name = indexes.by_name.entry(course.name().to_string()).or_default();
        if same_name
            .iter()
            .any(|o| o.start() == course.start() && o.end() == course.end())
        {
            return Err(BookingError::duplicate(format!(
                "a course '{}' with the same dates has already been added",
                course.name()
            )));
        }
        same_name.push(Arc::clone(&course));

        indexes
            .by_id
            .insert(course.id().to_string(), Arc::clone(&course));
        indexes.by_start.insert(Arc::clone(&course));
        indexes.by_end.insert(Arc::clone(&course));

        tracing::debug!(
            course_id = %course.id(),
            name = %course.name(),
            start = %course.start(),
            end = %course.end(),
            total = indexes.by_id.len(),
            "Course added"
        );

        Ok(())
    }

    /// Number of registered courses
    pub fn len(&self) -> usize {
        self.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All courses with the given name, in insertion order
    pub fn by_name(&self, name: &str) -> Vec<Arc<Course>> {
        self.read().by_name.get(name).cloned().unwrap_or_default()
    }

    /// All courses, sorted by start date
    pub fn all(&self) -> Vec<Arc<Course>> {
        self.read().by_start.as_slice().to_vec()
    }

    /// Courses sorted by end date
    pub fn all_by_end(&self) -> Vec<Arc<Course>> {
        self.read().by_end.as_slice().to_vec()
    }

    /// Courses starting after today
    pub fn upcoming(&self) -> Vec<Arc<Course>> {
        self.upcoming_on(today())
    }

    /// Courses running today
    pub fn current(&self) -> Vec<Arc<Course>> {
        self.current_on(today())
    }

    /// Courses that ended before today
    pub fn past(&self) -> Vec<Arc<Course>> {
        self.past_on(today())
    }

    /// Courses whose start date is after `today`, sorted by start date
    pub fn upcoming_on(&self, today: NaiveDate) -> Vec<Arc<Course>> {
        let indexes = self.read();
        let idx = indexes.by_start.first_after(today);
        indexes.by_start.as_slice()[idx..].to_vec()
    }

    /// Courses with `start <= today <= end`, sorted by end date
    pub fn current_on(&self, today: NaiveDate) -> Vec<Arc<Course>> {
        let indexes = self.read();
        let idx = indexes.first_not_ended(today);

        // the end ordering says nothing about start dates, filter linearly;
        // past courses are already excluded so the remainder stays small
        indexes.by_end.as_slice()[idx..]
            .iter()
            .filter(|c| c.start() <= today)
            .cloned()
            .collect()
    }

    /// Courses whose end date is before `today`, sorted by end date
    pub fn past_on(&self, today: NaiveDate) -> Vec<Arc<Course>> {
        let indexes = self.read();
        let idx = indexes.first_not_ended(today);
        indexes.by_end.as_slice()[..idx].to_vec()
    }

    /// Count courses per view, from one consistent snapshot
    pub fn stats_on(&self, today: NaiveDate) -> RegistryStats {
        let indexes = self.read();
        let not_ended = indexes.first_not_ended(today);
        let upcoming = indexes.by_start.len() - indexes.by_start.first_after(today);
        let past = not_ended;

        RegistryStats {
            total: indexes.by_id.len(),
            past,
            current: indexes.by_end.len() - not_ended - upcoming,
            upcoming,
        }
    }

    /// Registry statistics relative to the local date
    pub fn stats(&self) -> RegistryStats {
        self.stats_on(today())
    }

    /// Verify that all indexes agree with each other and are sorted
    pub fn check_invariants(&self) -> bool {
        let indexes = self.read();
        let total = indexes.by_id.len();
        let named: usize = indexes.by_name.values().map(Vec::len).sum();

        total == named
            && total == indexes.by_start.len()
            && total == indexes.by_end.len()
            && indexes.by_start.is_sorted()
            && indexes.by_end.is_sorted()
            && indexes
                .by_start
                .iter()
                .chain(indexes.by_end.iter())
                .all(|c| indexes.by_id.contains_key(c.id()))
    }

    // Mutations never leave the indexes half-updated before a panic point,
    // so a poisoned lock still guards consistent data.
    fn read(&self) -> RwLockReadGuard<'_, Indexes> {
        self.indexes.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Indexes> {
        self.indexes.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Course counts per view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegistryStats {
    pub total: usize,
    pub past: usize,
    pub current: usize,
    pub upcoming: usize,
}

// ============================================================================
// Tests
// ============================================================================
