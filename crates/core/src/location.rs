use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque location key taken verbatim from the request path.
///
/// No format validation is applied; the contract decides what is a valid key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(String);

impl LocationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for LocationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for LocationId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Metadata returned by `getLocation`, in contract output order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationMetadata {
    pub name: String,
    pub description: String,
    /// Chain address as returned by the contract; checksum format is not verified.
    pub owner: String,
}

/// Outcome of a single resolution attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionResult {
    Success(LocationMetadata),
    Failure(String),
}

impl ResolutionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ResolutionResult::Success(_))
    }

    /// Build the response body for the identifier that produced this result.
    pub fn into_response(self, location_id: LocationId) -> LocationResponse {
        match self {
            ResolutionResult::Success(metadata) => LocationResponse::Found(LocationRecord {
                location_id,
                metadata,
            }),
            ResolutionResult::Failure(error) => LocationResponse::Error(ErrorBody { error }),
        }
    }
}

/// Success body: `{"location_id", "name", "description", "owner"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub location_id: LocationId,
    #[serde(flatten)]
    pub metadata: LocationMetadata,
}

/// Failure body: `{"error"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// JSON body of `GET /world/{location_id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocationResponse {
    Found(LocationRecord),
    Error(ErrorBody),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forest_grove() -> LocationMetadata {
        LocationMetadata {
            name: "Forest Grove".to_string(),
            description: "A peaceful clearing".to_string(),
            owner: "0xABC...123".to_string(),
        }
    }

    #[test]
    fn success_body_has_four_fields_in_order() {
        let body = ResolutionResult::Success(forest_grove()).into_response("42".into());
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(
            json,
            r#"{"location_id":"42","name":"Forest Grove","description":"A peaceful clearing","owner":"0xABC...123"}"#
        );
    }

    #[test]
    fn failure_body_has_only_error() {
        let body = ResolutionResult::Failure("execution reverted: unknown location".to_string())
            .into_response("doesnotexist".into());
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"error":"execution reverted: unknown location"}"#);
    }

    #[test]
    fn empty_location_id_is_kept() {
        let body = ResolutionResult::Success(forest_grove()).into_response(LocationId::new(""));
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["location_id"], "");
    }

    #[test]
    fn response_deserializes_by_shape() {
        let found: LocationResponse = serde_json::from_str(
            r#"{"location_id":"1","name":"a","description":"b","owner":"c"}"#,
        )
        .unwrap();
        assert!(matches!(found, LocationResponse::Found(_)));

        let error: LocationResponse = serde_json::from_str(r#"{"error":"boom"}"#).unwrap();
        assert_eq!(
            error,
            LocationResponse::Error(ErrorBody {
                error: "boom".to_string()
            })
        );
    }
}
