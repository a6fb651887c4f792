//! Integration tests module
//!
//! End-to-end tests for the booking service, including:
//! - Course creation, booking and listing through the service
//! - The same flows over the HTTP router

pub mod api_test;
pub mod fixtures;
pub mod service_test;
