//! Hegemon turn adjudication library.
//!
//! Exposes the board representation, option generation, resolution, game
//! configuration and protocol modules for use by integration tests and the
//! binary entry point.

pub mod board;
pub mod config;
pub mod engine;
pub mod movegen;
pub mod protocol;
pub mod resolve;
