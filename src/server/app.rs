//! Booking server implementation

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{Config, ServerConfig};
use crate::registry::CourseRegistry;
use crate::service::BookingService;

use super::api::create_router;

// ============================================================================
// App State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Course creation and booking
    pub service: BookingService,

    /// Server start time
    pub start_time: Instant,

    /// Configuration
    pub config: ServerConfig,
}

impl AppState {
    /// State over an empty registry
    pub fn new(config: ServerConfig) -> Self {
        Self::with_registry(config, Arc::new(CourseRegistry::new()))
    }

    /// State over an existing registry
    pub fn with_registry(config: ServerConfig, registry: Arc<CourseRegistry>) -> Self {
        let service = BookingService::new(registry)
            .with_default_timeout(config.default_timeout())
            .with_max_course_days(config.max_course_days);
        Self {
            service,
            start_time: Instant::now(),
            config,
        }
    }
}

// ============================================================================
// Booking Server
// ============================================================================

/// HTTP front end of the booking service
pub struct BookingServer {
    config: ServerConfig,
    state: AppState,
}

impl BookingServer {
    /// Create a new server
    pub fn new(config: Config) -> Result<Self, ServerError> {
        config
            .validate()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        let state = AppState::new(config.server.clone());
        Ok(Self {
            config: config.server,
            state,
        })
    }

    /// Get the application state
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let mut router = create_router(self.state.clone());

        if self.config.enable_cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        if self.config.enable_request_logging {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Serve until `shutdown_signal` resolves
    pub async fn start_with_shutdown(
        &self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let router = self.build_router();
        let addr = self.config.bind_address;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind(e.to_string()))?;

        tracing::info!(address = %addr, "Booking server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| ServerError::Serve(e.to_string()))?;

        tracing::info!(
            courses = self.state.service.registry().len(),
            "Booking server shutdown complete"
        );
        Ok(())
    }

    /// Get server info
    pub fn info(&self) -> ServerInfo {
        ServerInfo {
            bind_address: self.config.bind_address,
            default_timeout_ms: self.config.default_timeout_ms,
            max_timeout_ms: self.config.max_timeout_ms,
            max_course_days: self.config.max_course_days,
            cors_enabled: self.config.enable_cors,
            request_logging_enabled: self.config.enable_request_logging,
        }
    }
}

/// Server information
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub bind_address: SocketAddr,
    pub default_timeout_ms: u64,
    pub max_timeout_ms: u64,
    pub max_course_days: u32,
    pub cors_enabled: bool,
    pub request_logging_enabled: bool,
}

impl ServerInfo {
    /// Format as display string
    pub fn display(&self) -> String {
        format!(
            "Booking Server\n\
             {:-<40}\n\
             Bind Address: {}\n\
             Default Timeout: {}ms\n\
             Max Timeout: {}ms\n\
             Max Course Length: {} days\n\
             CORS: {}\n\
             Request Logging: {}",
            "",
            self.bind_address,
            self.default_timeout_ms,
            self.max_timeout_ms,
            self.max_course_days,
            if self.cors_enabled { "enabled" } else { "disabled" },
            if self.request_logging_enabled { "enabled" } else { "disabled" }
        )
    }
}

// ============================================================================
// Server Errors
// ============================================================================

/// Server errors
#[derive(Error, Debug, Clone)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to bind: {0}")]
    Bind(String),

    #[error("Server error: {0}")]
    Serve(String),
}
