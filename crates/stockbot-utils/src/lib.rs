//! Shared utilities for stockbot-rs
//!
//! This crate provides common functionality used across the stockbot-rs
//! workspace, currently logging setup.

pub mod logging;

pub use logging::init_tracing;
