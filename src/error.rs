//! Error types for the rating and matchmaking core
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the crate.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific rating/matchmaking scenarios
#[derive(Debug, thiserror::Error)]
pub enum LadderError {
    #[error("Invalid ticket: {reason}")]
    InvalidTicket { reason: String },

    #[error("Invalid rating input: {reason}")]
    InvalidRatingInput { reason: String },

    #[error("No ticket for player {player_id} in mode {mode}")]
    TicketNotFound { player_id: String, mode: String },

    #[error("Volatility solver failed to converge after {iterations} iterations")]
    SolverDivergence { iterations: u32 },

    #[error("Profile not found: {player_id}")]
    ProfileNotFound { player_id: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}
