use serde::Serialize;
use serde_json::Value;

/// The uniform result of every outward-facing operation. Failures are reported in here rather
/// than returned as errors.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Envelope {
    pub status: Status,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Raw response body from the remote service when it rejected the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl Envelope {
    pub fn success(message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            status: Status::Success,
            message: message.into(),
            data,
            details: None,
        }
    }

    pub fn error(message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            status: Status::Error,
            message: message.into(),
            data: None,
            details,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test_serialize {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn success_omits_details() {
        let envelope = Envelope::success("done", Some(json!({"id": "86dw30c2d"})));

        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"status": "success", "message": "done", "data": {"id": "86dw30c2d"}})
        );
    }

    #[test]
    fn error_with_details() {
        let envelope = Envelope::error("HTTP error: 404 Not Found", Some("gone".to_string()));

        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"status": "error", "message": "HTTP error: 404 Not Found", "details": "gone"})
        );
    }
}
