//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `input` - Loading the aggregator export bundle
//! - `reports` - Report generation commands (classify, snapshot, metrics,
//!   trend, categories, statement, balance-sheet)

pub mod input;
pub mod reports;

// Re-export command functions for main.rs
pub use input::*;
pub use reports::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}...", &s[..max.saturating_sub(3)])
    }
}
