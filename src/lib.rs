//! Javelin is a bootstrap launcher for JVM server applications. It discovers
//! a usable Java runtime on the host, assembles a correct launch command,
//! and supervises the resulting server process across restarts, optionally
//! bridging a file-based pseudo-stdin channel into the child.

/// CLI interface.
pub mod cli;

/// Launch command assembly.
pub mod command;

/// Configuration management.
pub mod config;

/// Error handling.
pub mod error;

/// JVM runtime discovery and ranking.
pub mod locator;

/// Platform probing conventions.
pub mod platform;

/// Process supervision with restart and stdin bridging.
pub mod supervisor;

/// Shared helpers for tests.
pub mod test_utils;
