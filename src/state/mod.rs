//! State management module
//!
//! This module handles all session state, kept free of iced and HTTP so the
//! whole search workflow is testable headless:
//! - The search session state machine (session.rs)
//! - Shared data structures for results (data.rs)
//! - The similarity-threshold filter (filter.rs)

pub mod data;
pub mod filter;
pub mod session;
