//! Output formatting module

mod common;
mod plan;

pub use common::escape_csv;
pub use plan::print_plan;
