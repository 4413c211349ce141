//! Shared utilities used across SDK modules.

pub mod serde_util;
