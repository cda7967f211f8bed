//! View helpers on top of the session state
//!
//! Rendering only: these functions read the filtered results and produce
//! widgets. Nothing in here mutates the session.

pub mod results;
