//! Application layer - CLI commands and wire schema

pub mod commands;
pub mod dto;

pub use commands::{Cli, CommandExecutor, Commands};
pub use dto::{QuoteRequestBody, QuoteResponseBody, RouteBody, RouteStepBody};
