//! UI utilities for terminal output
//!
//! This module provides user interface components like progress spinners
//! and confirmation prompts.

mod confirm;
mod spinner;

pub use confirm::confirm_action;
pub use spinner::{abandon_spinner, create_progress_bar, create_spinner, finish_spinner};
