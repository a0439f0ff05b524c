//! JSON request and reply shapes carried inside frames.

use serde::Serialize;
use serde_json::{Map, Value};

use localscreen_core::types::{ClassificationResult, ScanReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Classify,
    Batch,
    Scan,
}

impl Mode {
    pub fn parse(cmd: &str) -> Option<Self> {
        match cmd {
            "classify" => Some(Self::Classify),
            "batch" => Some(Self::Batch),
            "scan" => Some(Self::Scan),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Classify => "classify",
            Self::Batch => "batch",
            Self::Scan => "scan",
        }
    }
}

/// Failure codes reported as `{"ok": false, "error": <code>}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    UnknownCmd,
    InvalidJson,
    InvalidRequest,
    ClassifierError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Classify { text: String },
    Batch { texts: Vec<String> },
    Scan { text: String },
}

impl Request {
    pub fn mode(&self) -> Mode {
        match self {
            Self::Classify { .. } => Mode::Classify,
            Self::Batch { .. } => Mode::Batch,
            Self::Scan { .. } => Mode::Scan,
        }
    }

    /// Decode a raw frame payload. Invalid UTF-8 is replaced, not rejected.
    ///
    /// A missing (or `null`) `text` reads as `""` and a missing `texts` as `[]`.
    pub fn decode(payload: &[u8]) -> Result<Self, ErrorCode> {
        let raw = String::from_utf8_lossy(payload);
        let value: Value = serde_json::from_str(&raw).map_err(|_| ErrorCode::InvalidJson)?;
        let Value::Object(object) = value else { return Err(ErrorCode::InvalidJson) };
        let mode = object.get("cmd").and_then(Value::as_str).and_then(Mode::parse).ok_or(ErrorCode::UnknownCmd)?;
        Ok(match mode {
            Mode::Classify => Self::Classify { text: text_field(&object)? },
            Mode::Scan => Self::Scan { text: text_field(&object)? },
            Mode::Batch => Self::Batch { texts: texts_field(&object)? },
        })
    }
}

fn text_field(object: &Map<String, Value>) -> Result<String, ErrorCode> {
    match object.get("text") {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(ErrorCode::InvalidRequest),
    }
}

fn texts_field(object: &Map<String, Value>) -> Result<Vec<String>, ErrorCode> {
    match object.get("texts") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or(ErrorCode::InvalidRequest))
            .collect(),
        Some(_) => Err(ErrorCode::InvalidRequest),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    Single(ClassificationResult),
    Batch(Vec<ClassificationResult>),
    Scan(ScanReport),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorCode>,
}

impl Reply {
    pub fn success(mode: Mode, result: Outcome) -> Self { Self { ok: true, mode: Some(mode), result: Some(result), error: None } }

    pub fn failure(code: ErrorCode) -> Self { Self { ok: false, mode: None, result: None, error: Some(code) } }

    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> { serde_json::to_vec(self) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default() {
        assert_eq!(Request::decode(br#"{"cmd":"classify"}"#), Ok(Request::Classify { text: String::new() }));
        assert_eq!(Request::decode(br#"{"cmd":"batch"}"#), Ok(Request::Batch { texts: vec![] }));
    }

    #[test]
    fn wrong_field_types_are_invalid_requests() {
        assert_eq!(Request::decode(br#"{"cmd":"scan","text":7}"#), Err(ErrorCode::InvalidRequest));
        assert_eq!(Request::decode(br#"{"cmd":"batch","texts":["a",1]}"#), Err(ErrorCode::InvalidRequest));
        assert_eq!(Request::decode(br#"{"cmd":"batch","texts":"a"}"#), Err(ErrorCode::InvalidRequest));
    }

    #[test]
    fn cmd_must_be_a_known_string() {
        assert_eq!(Request::decode(br#"{"text":"x"}"#), Err(ErrorCode::UnknownCmd));
        assert_eq!(Request::decode(br#"{"cmd":3}"#), Err(ErrorCode::UnknownCmd));
        assert_eq!(Request::decode(br#"{"cmd":"Classify"}"#), Err(ErrorCode::UnknownCmd));
    }

    #[test]
    fn non_objects_are_invalid_json() {
        assert_eq!(Request::decode(b"[1,2]"), Err(ErrorCode::InvalidJson));
        assert_eq!(Request::decode(b"{nope"), Err(ErrorCode::InvalidJson));
        assert_eq!(Request::decode(b""), Err(ErrorCode::InvalidJson));
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let payload = b"{\"cmd\":\"scan\",\"text\":\"a\xffb\"}";
        assert_eq!(Request::decode(payload), Ok(Request::Scan { text: "a\u{FFFD}b".into() }));
    }
}
