//! Terminal output helpers
//!
//! Fancy output (symbols and color) on an interactive terminal, bracketed
//! plain tags when piped or in CI.

mod context;
mod output;

pub use context::UiContext;
pub use output::{
    intro, key_value, key_value_status, remark, step_ok, step_ok_detail, step_warn, step_warn_hint,
};
