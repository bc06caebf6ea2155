//! Trajectory file lexer, parsers and writer.
//!
//! Two dialects are understood: absolute per-arm frames (marked by
//! `# Canvas` / `# Arm N` headers) and rate-limited waypoints for a single
//! arm. Parsing never fails; malformed values surface as NaN samples or
//! dropped waypoints.

mod lexer;
mod parser;
mod writer;

pub use lexer::{Header, Lexer, Token, TokenKind, lex};
pub use parser::{
    Dialect, detect, detect_tokens, parse, parse_absolute, parse_tokens, parse_waypoints,
};
pub use writer::{to_absolute_text, to_waypoint_text, write_absolute, write_waypoints};

#[cfg(test)]
mod testing;
#[cfg(test)]
mod tests;
