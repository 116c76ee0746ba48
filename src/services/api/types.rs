use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Speaker label → index into the server's voice list.
pub type VoiceAssignment = BTreeMap<String, usize>;

// --- Requests ---

#[derive(Debug, Serialize)]
pub struct DialogueRequest<'a> {
    pub dialogue_text: &'a str,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct GenerateRequest {
    pub dialogue_text: String,
    pub filename: String,
    pub speaker_voices: VoiceAssignment,
}

/// A single user-selected file, sent as the multipart `file` field.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

// --- Responses ---

#[derive(Debug, Deserialize)]
pub struct SpeakersResponse {
    pub speakers: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct VoicesResponse {
    pub voices: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    pub dialogue_text: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct GenerationResult {
    pub filename: String,
    pub duration: f64,
    pub speakers: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryResponse {
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct HistoryEntry {
    pub filename: String,
    #[serde(default)]
    pub speakers: Vec<String>,
    pub timestamp: Timestamp,
    #[serde(default)]
    pub duration: Option<f64>,
}

/// History timestamps arrive either as ISO-8601 text or epoch milliseconds.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Timestamp {
    Millis(f64),
    Text(String),
}

/// Body of a non-success response. FastAPI-style servers put a string in
/// `detail`, validation failures put a structured value there instead.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        match self.detail? {
            serde_json::Value::String(s) if s.trim().is_empty() => None,
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}
