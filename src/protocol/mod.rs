//! Line protocol handling.
//!
//! One command per line on stdin; data travels as JSON documents after the
//! command keyword. Responses are single lines on stdout.

pub mod parser;

pub use parser::{parse_command, Command, ProtocolError};
