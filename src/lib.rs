//! booking - Concurrent course registry and class booking service
//!
//! Courses run daily between a start and an end date and hold one class per
//! day. Attendees book a single class by course id and date. All courses live
//! in an in-memory registry indexed by id, by name, and by start and end date,
//! which answers past, current and upcoming views with binary searches.
//!
//! # Architecture
//!
//! - [`course`] - Course and class entities, booking a class
//! - [`registry`] - Concurrent indexed course registry
//! - [`service`] - Operations with caller deadlines
//! - [`server`] - HTTP API
//! - [`config`] - Configuration management and settings
//! - [`metrics`] - Prometheus metrics
//! - [`error`] - Error types
//!
//! # Example
//!
//! ```
//! use booking::course::Course;
//! use booking::registry::CourseRegistry;
//! use chrono::{Days, Local};
//! use std::sync::Arc;
//!
//! let today = Local::now().date_naive();
//! let registry = CourseRegistry::new();
//!
//! let course = Arc::new(Course::new("Pilates", today, today + Days::new(19), 10, false)?);
//! registry.add(Arc::clone(&course))?;
//!
//! course.book_class("Arnold", today)?;
//! assert_eq!(registry.current().len(), 1);
//! # Ok::<(), booking::error::BookingError>(())
//! ```

pub mod config;
pub mod course;
pub mod error;
pub mod metrics;
pub mod registry;
pub mod server;
pub mod service;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::course::{Booking, Class, Course, CourseSummary};
    pub use crate::error::{BookingError, Error, ErrorCategory, ErrorKind, Result};
    pub use crate::registry::{CourseRegistry, RegistryStats};
    pub use crate::service::{BookingService, CourseView, NewCourse};
}

// Direct re-exports for convenience
pub use course::{Booking, Course};
pub use registry::CourseRegistry;
pub use service::BookingService;
