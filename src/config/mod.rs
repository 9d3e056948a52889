//! Configuration management for nscan.
//!
//! User defaults live in an XDG-compliant settings file; command-line
//! flags override them.

mod settings;

pub use settings::{AppSettings, Paths};
