/// Error type shared by the core crate

use thiserror::Error;

/// Errors produced by the scene core
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    #[error("keymap line {line}: {reason}")]
    KeymapSyntax { line: usize, reason: String },

    #[error("unknown key name `{0}`")]
    UnknownKey(String),

    #[error("unknown action `{0}`")]
    UnknownAction(String),

    #[error("canvas must be non-empty, got {width}x{height}")]
    EmptyCanvas { width: u32, height: u32 },

    #[error("transform stack underflow: the root matrix cannot be popped")]
    StackUnderflow,
}

pub type Result<T> = std::result::Result<T, Error>;
