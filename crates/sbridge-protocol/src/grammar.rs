//! Command grammar: tokenization of incoming command lines.
//!
//! A command line is a single-character command code followed by zero or more
//! space-delimited parameters. The grammar is delimiter-only: every single
//! space is a token boundary, so consecutive delimiters carry an empty
//! parameter through to the handler. It knows nothing about which codes exist
//! or how many parameters a verb expects; verb validity and arity are the
//! dispatcher's concern.

/// A tokenized command line: one-character code plus raw parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCommand {
    /// The single-character command code.
    pub code: char,
    /// The raw, undecoded parameter tokens in order.
    pub params: Vec<String>,
}

use crate::error::{ProtocolError, ProtocolResult};

impl RawCommand {
    /// Tokenize a command line.
    ///
    /// Splits on single spaces without collapsing runs, so an empty parameter
    /// between two delimiters survives as an empty token (a trailing delimiter
    /// likewise carries a final empty parameter). Fails on an empty line, on a
    /// blank code token, and on a code token longer than one character. No
    /// semantic validation happens here; numeric parameters are not yet
    /// coerced.
    pub fn parse(line: &str) -> ProtocolResult<RawCommand> {
        let line = line.trim_end_matches(['\r', '\n']);
        let mut tokens = line.split(' ');

        // split always yields at least one token; an empty first token means
        // the line was empty or began with a delimiter.
        let code_token = tokens.next().ok_or(ProtocolError::EmptyLine)?;
        if code_token.is_empty() {
            return Err(ProtocolError::EmptyLine);
        }
        let mut chars = code_token.chars();
        let code = chars.next().ok_or(ProtocolError::EmptyLine)?;
        if chars.next().is_some() {
            return Err(ProtocolError::InvalidCode(code_token.to_string()));
        }

        Ok(RawCommand {
            code,
            params: tokens.map(str::to_string).collect(),
        })
    }

    /// Render the command back into its wire form (without terminator).
    pub fn to_line(&self) -> String {
        if self.params.is_empty() {
            self.code.to_string()
        } else {
            format!("{} {}", self.code, self.params.join(" "))
        }
    }
}
