//! Entity Module

pub mod profile;
pub mod session_state;
