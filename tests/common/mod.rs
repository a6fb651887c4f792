//! Common test utilities

use std::sync::Arc;

use booking::course::Course;
use chrono::{Days, NaiveDate};
use rand::Rng;

/// Fixed reference date used as "today"
pub fn reference_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

/// Create a course relative to `today`, offsets in days
pub fn course_at(name: &str, today: NaiveDate, start: i64, end: i64) -> Arc<Course> {
    Arc::new(
        Course::new_on(name, shift(today, start), shift(today, end), 10, true, today).unwrap(),
    )
}

/// Random course within 30 days either side of `today`
#[allow(dead_code)]
pub fn random_course(rng: &mut impl Rng, today: NaiveDate) -> Arc<Course> {
    let start = rng.gen_range(-30..=30);
    let length = rng.gen_range(0..=10);
    let name = format!("Course {}", rng.gen_range(0..1_000_000));
    course_at(&name, today, start, start + length)
}

/// `date` moved by `days`, in either direction
pub fn shift(date: NaiveDate, days: i64) -> NaiveDate {
    if days >= 0 {
        date + Days::new(days as u64)
    } else {
        date - Days::new(days.unsigned_abs())
    }
}
