//! Application Layer - Use Cases
//!
//! Orchestrates the domain and the storage substrates: credential store,
//! role resolution, the session coordinator and the auth gate.

pub mod auth_gate;
pub mod config;
pub mod coordinator;
pub mod credential_store;
pub mod role_resolver;
