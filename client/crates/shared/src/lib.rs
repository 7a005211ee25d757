//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" of client vocabulary:
//! - Error classification mapped to HTTP status codes
//! - The unified error type rendered by UI layers
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all client features.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
