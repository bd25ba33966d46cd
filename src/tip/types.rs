//! Tip Submission Types

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

/// Upper bound on the optional note, in bytes. Length sanity only; the
/// content is not interpreted.
pub const MAX_NOTE_LEN: usize = 512;

/// Submission correlation id
///
/// ULID: monotonic, sortable, no coordination needed. One id per pipeline
/// invocation; retries are new submissions with new ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubmissionId(ulid::Ulid);

impl SubmissionId {
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    pub fn inner(&self) -> ulid::Ulid {
        self.0
    }
}

impl Default for SubmissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SubmissionId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(ulid::Ulid::from_string(s)?))
    }
}

/// A user's transfer request. Immutable once submission begins; a retry is
/// a new request.
#[derive(Debug, Clone)]
pub struct TipRequest {
    /// Recipient account, unparsed; the pipeline validates it
    pub recipient: String,
    /// Display-unit amount
    pub amount: Decimal,
    /// Optional free-text annotation
    pub note: Option<String>,
}

impl TipRequest {
    pub fn new(recipient: impl Into<String>, amount: Decimal) -> Self {
        Self {
            recipient: recipient.into(),
            amount,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_id_unique() {
        assert_ne!(SubmissionId::new(), SubmissionId::new());
    }

    #[test]
    fn test_submission_id_roundtrip() {
        let id = SubmissionId::new();
        let parsed: SubmissionId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_request_builder() {
        let req = TipRequest::new("ACC2", Decimal::ONE).with_note("thanks");
        assert_eq!(req.recipient, "ACC2");
        assert_eq!(req.note.as_deref(), Some("thanks"));

        let bare = TipRequest::new("ACC2", Decimal::ONE);
        assert!(bare.note.is_none());
    }
}
