//! Uniform response envelope of the catalog REST surface.
//!
//! Shared by the HTTP server (serialization) and clients (decoding) so both
//! sides agree on member names.

use crate::query::AppliedFilters;
use serde::{Deserialize, Serialize};

/// `{success, data?, error?, message?, count?, filters?}`; absent members
/// are omitted on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<AppliedFilters>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
            count: None,
            filters: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            message: None,
            count: None,
            filters: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T> Envelope<Vec<T>> {
    /// List envelope carrying the record count and the applied filter echo.
    pub fn listing(items: Vec<T>, filters: AppliedFilters) -> Self {
        let count = items.len();
        let mut envelope = Self::ok(items);
        envelope.count = Some(count);
        envelope.filters = Some(filters);
        envelope
    }
}

#[cfg(test)]
mod tests {
    use super::Envelope;

    #[test]
    fn failure_omits_absent_members() {
        let envelope: Envelope<()> = Envelope::failure("Spell not found");
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json, serde_json::json!({"success": false, "error": "Spell not found"}));
    }

    #[test]
    fn decodes_envelope_without_data() {
        let envelope: Envelope<Vec<String>> =
            serde_json::from_str(r#"{"success":false,"error":"boom"}"#).unwrap();
        assert!(envelope.data.is_none());
        assert_eq!(envelope.error.as_deref(), Some("boom"));
    }
}
