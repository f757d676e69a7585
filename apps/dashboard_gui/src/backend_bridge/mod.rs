//! Backend bridge: command vocabulary and the tokio worker that executes it.

pub mod commands;
pub mod runtime;
