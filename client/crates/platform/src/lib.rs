//! Platform Crate - Technical Infrastructure
//!
//! This crate provides the browser substrates the session layer sits on:
//! - Cookie string building and parsing (`document.cookie` semantics)
//! - Cookie jars (page document or in-memory)
//! - Key-value stores (`localStorage`, `sessionStorage` or in-memory)
//! - Runtime helpers (background tasks, timers)

pub mod cookie;
pub mod jar;
pub mod runtime;
pub mod storage;
