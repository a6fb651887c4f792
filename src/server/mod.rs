//! HTTP server for course creation and booking
//!
//! # Endpoints
//!
//! ```text
//! GET|POST /api/classes       create a course (name, start, end, capacity, historic, timeout)
//! GET|POST /api/bookings      book a class (name, date, id, timeout)
//! GET      /api/courses       list courses (view=all|past|current|upcoming)
//! GET      /api/courses/{id}  course summary
//! GET      /api/health        health and registry counts
//! GET      /metrics           Prometheus metrics
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use booking::server::BookingServer;
//! use booking::config::Config;
//!
//! let server = BookingServer::new(Config::default())?;
//! server.start_with_shutdown(async { let _ = tokio::signal::ctrl_c().await; }).await?;
//! ```

pub mod api;
pub mod app;
pub mod form;

pub use api::{booking_message, create_router, ApiResponse, ErrorResponse};
pub use app::{AppState, BookingServer, ServerError, ServerInfo};
pub use form::{title_case, FormError, FormValues};
