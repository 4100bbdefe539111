//! General utilities for Mobicomp Core.
//!
//! - [`fs`]: filesystem helpers mapped onto `CoreError`.
//! - [`paths`]: XDG and application-specific directories.

pub mod fs;
pub mod paths;

pub use fs::{ensure_directory_exists, read_file_to_string};
