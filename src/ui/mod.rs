//! Command-line front end: argument parsing and plain-text rendering of
//! catalog and playback state.

mod cli;

pub use cli::{format_clock, format_snapshot, Args, Cli};
