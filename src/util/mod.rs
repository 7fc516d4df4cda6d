//! Utility modules: HTTP helpers and retry.

pub mod http;
pub mod retry;
