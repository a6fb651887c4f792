//! Error handling for the booking crate
//!
//! Two layers of errors exist:
//!
//! - [`BookingError`] - semantic rejections raised by courses, the booking
//!   operation and the registry. Every variant is a client-input or
//!   state-conflict error; none of them is fatal to the process.
//! - [`Error`] - the crate-wide error returned by the service layer, wrapping
//!   [`BookingError`] together with timeouts and background task failures.
//!
//! # Usage
//!
//! ```rust,ignore
//! use booking::error::{Error, ErrorCategory};
//!
//! fn respond(err: Error) -> u16 {
//!     match err.category() {
//!         ErrorCategory::Timeout => 408,
//!         c if c.is_client_error() => 400,
//!         _ => 500,
//!     }
//! }
//! ```

use chrono::NaiveDate;
use std::time::Duration;
use thiserror::Error;

/// Kind of a [`BookingError`], without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    OutOfRange,
    Expired,
    DuplicateAttendee,
    Duplicate,
}

/// Errors raised by the course, booking and registry operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// Malformed or semantically invalid creation/booking parameters
    #[error("{0}")]
    InvalidInput(String),

    /// Referenced course identifier does not exist
    #[error("course with id {0} does not exist")]
    NotFound(String),

    /// Requested date lies outside the course span
    #[error("the chosen date is not within the timeframe of the course")]
    OutOfRange {
        date: NaiveDate,
        start: NaiveDate,
        end: NaiveDate,
    },

    /// The whole course already lies in the past
    #[error("the course is in the past")]
    Expired { course_id: String, end: NaiveDate },

    /// The attendee is already registered for that class
    #[error("you are already attending this class")]
    DuplicateAttendee { attendee: String, date: NaiveDate },

    /// Same identifier, or same name with the exact same date range
    #[error("{0}")]
    Duplicate(String),
}

impl BookingError {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a not found error for a course id
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }

    /// Create a duplicate course error
    pub fn duplicate(msg: impl Into<String>) -> Self {
        Self::Duplicate(msg.into())
    }

    /// Get the kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::OutOfRange { .. } => ErrorKind::OutOfRange,
            Self::Expired { .. } => ErrorKind::Expired,
            Self::DuplicateAttendee { .. } => ErrorKind::DuplicateAttendee,
            Self::Duplicate(_) => ErrorKind::Duplicate,
        }
    }
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Rejected request parameters or state conflicts
    Input,
    /// The caller's deadline elapsed before the operation reported back
    Timeout,
    /// Runtime failures
    Internal,
}

impl ErrorCategory {
    /// Whether the error is caused by the client and should be reported as such
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Input)
    }
}

/// Unified error type for the booking crate
#[derive(Error, Debug)]
pub enum Error {
    /// Domain rejections, reported verbatim to clients
    #[error(transparent)]
    Booking(#[from] BookingError),

    /// The caller stopped waiting; the operation itself may still complete
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// A background task failed to report a result
    #[error("Task error: {0}")]
    Task(String),
}

impl Error {
    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Booking(_) => ErrorCategory::Input,
            Self::Timeout(_) => ErrorCategory::Timeout,
            Self::Task(_) => ErrorCategory::Internal,
        }
    }

    /// Get the booking error kind, if this is a domain rejection
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Booking(e) => Some(e.kind()),
            _ => None,
        }
    }

    /// Check if retrying the same request can succeed
    ///
    /// Domain rejections never succeed on retry.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task(err.to_string())
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
