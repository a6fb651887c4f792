//! Test fixtures for integration tests
//!
//! Provides request builders and helper functions for testing

use std::sync::Arc;

use booking::config::ServerConfig;
use booking::course::today;
use booking::registry::CourseRegistry;
use booking::server::AppState;
use booking::service::{BookingService, NewCourse};
use chrono::{Days, NaiveDate};

/// Service over an empty registry
pub fn service() -> BookingService {
    BookingService::new(Arc::new(CourseRegistry::new()))
}

/// App state over an empty registry with default settings
pub fn app_state() -> AppState {
    AppState::new(ServerConfig::default())
}

/// `today` plus `days`
pub fn days_from_now(days: u64) -> NaiveDate {
    today() + Days::new(days)
}

/// `today` minus `days`
pub fn days_ago(days: u64) -> NaiveDate {
    today() - Days::new(days)
}

/// Twenty daily Pilates classes starting today
pub fn pilates() -> NewCourse {
    NewCourse {
        name: "Pilates".to_string(),
        start: today(),
        end: days_from_now(19),
        capacity: 10,
        historic: false,
    }
}

/// A course that ended last week
pub fn historic_yoga() -> NewCourse {
    NewCourse {
        name: "Yoga".to_string(),
        start: days_ago(14),
        end: days_ago(7),
        capacity: 5,
        historic: true,
    }
}
