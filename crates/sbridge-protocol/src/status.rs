//! Status-code model for command responses.
//!
//! Every command produces exactly one status line of the form
//! `"<VERB> T"` (success) or `"<VERB><CLASS>: <detail>"` (failure), where
//! CLASS is a two-character tag ending in `F`. The peer decodes classes by
//! their fixed number, so the verb→class→meaning table is append-only:
//! new classes may be added but existing numbers are never reassigned.

use crate::error::{ProtocolError, ProtocolResult};

/// Detail string for the shared setup-failure status.
pub const NO_SETUP_DETAIL: &str = "No setup.";

/// Detail string for the catch-all failure status.
pub const UNKNOWN_ERROR_DETAIL: &str = "Unknown error.";

/// A failure class tag.
///
/// Class `1F` is reserved across all verbs for "required collaborator
/// reference is absent/unconfigured or wrong parameter count". Classes
/// `2F`..`7F` carry verb-specific meanings. `FF` is the catch-all and is
/// always checked last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// `1F`: missing collaborator or arity mismatch.
    Setup,
    /// `2F`: verb-specific (typically a parameter decode failure).
    Class2,
    /// `3F`: verb-specific.
    Class3,
    /// `4F`: verb-specific.
    Class4,
    /// `5F`: verb-specific.
    Class5,
    /// `6F`: verb-specific.
    Class6,
    /// `7F`: verb-specific.
    Class7,
    /// `FF`: unknown error, the mandatory catch-all.
    Unknown,
}

impl FailureClass {
    /// Get the two-character wire tag for this class.
    pub fn tag(&self) -> &'static str {
        match self {
            FailureClass::Setup => "1F",
            FailureClass::Class2 => "2F",
            FailureClass::Class3 => "3F",
            FailureClass::Class4 => "4F",
            FailureClass::Class5 => "5F",
            FailureClass::Class6 => "6F",
            FailureClass::Class7 => "7F",
            FailureClass::Unknown => "FF",
        }
    }

    /// Parse a class from its two-character wire tag.
    pub fn from_tag(tag: &str) -> Option<FailureClass> {
        match tag {
            "1F" => Some(FailureClass::Setup),
            "2F" => Some(FailureClass::Class2),
            "3F" => Some(FailureClass::Class3),
            "4F" => Some(FailureClass::Class4),
            "5F" => Some(FailureClass::Class5),
            "6F" => Some(FailureClass::Class6),
            "7F" => Some(FailureClass::Class7),
            "FF" => Some(FailureClass::Unknown),
            _ => None,
        }
    }
}

/// The outcome of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The collaborator call succeeded.
    Success,
    /// The command failed with a classified error.
    Failure {
        /// The failure class tag.
        class: FailureClass,
        /// Short human-readable detail.
        detail: String,
    },
}

/// A decoded status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    /// The verb code in its wire (uppercase) form.
    pub verb: char,
    /// The outcome.
    pub outcome: Outcome,
}

impl Status {
    /// Build a success status for a verb.
    pub fn success(verb: char) -> Status {
        Status {
            verb: verb.to_ascii_uppercase(),
            outcome: Outcome::Success,
        }
    }

    /// Build a failure status for a verb.
    pub fn failure(verb: char, class: FailureClass, detail: impl Into<String>) -> Status {
        Status {
            verb: verb.to_ascii_uppercase(),
            outcome: Outcome::Failure {
                class,
                detail: detail.into(),
            },
        }
    }

    /// Build the shared `"<VERB>1F: No setup."` status.
    pub fn no_setup(verb: char) -> Status {
        Status::failure(verb, FailureClass::Setup, NO_SETUP_DETAIL)
    }

    /// Build the catch-all `"<VERB>FF: Unknown error."` status.
    pub fn unknown_error(verb: char) -> Status {
        Status::failure(verb, FailureClass::Unknown, UNKNOWN_ERROR_DETAIL)
    }

    /// Check if this is a success status.
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success)
    }

    /// Get the failure class, if this is a failure status.
    pub fn class(&self) -> Option<FailureClass> {
        match &self.outcome {
            Outcome::Success => None,
            Outcome::Failure { class, .. } => Some(*class),
        }
    }

    /// Render the status into its wire form.
    pub fn render(&self) -> String {
        match &self.outcome {
            Outcome::Success => format!("{} T", self.verb),
            Outcome::Failure { class, detail } => {
                if detail.is_empty() {
                    format!("{}{}", self.verb, class.tag())
                } else {
                    format!("{}{}: {}", self.verb, class.tag(), detail)
                }
            }
        }
    }

    /// Parse a status line (peer side).
    pub fn parse(line: &str) -> ProtocolResult<Status> {
        let line = line.trim_end_matches(['\r', '\n']);
        let mut chars = line.chars();
        let verb = chars
            .next()
            .ok_or_else(|| ProtocolError::ParseError("empty status line".to_string()))?;

        let rest = chars.as_str();
        if rest == " T" {
            return Ok(Status::success(verb));
        }

        let (tag, detail) = match rest.split_once(": ") {
            Some((tag, detail)) => (tag, detail.to_string()),
            None => (rest, String::new()),
        };
        let class = FailureClass::from_tag(tag).ok_or_else(|| {
            ProtocolError::ParseError(format!("unrecognized class tag in {:?}", line))
        })?;

        Ok(Status::failure(verb, class, detail))
    }
}
