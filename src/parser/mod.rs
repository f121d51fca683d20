//! Show-command output parsing.
//!
//! This module turns the text devices print into domain types, so the
//! device adapters only deal with running commands.

mod show_parser;

pub use show_parser::ShowParser;
