pub mod client;
pub mod types;

pub use client::{DialogueApi, HttpDialogueApi};
pub use types::{GenerateRequest, GenerationResult, HistoryEntry, Timestamp, UploadFile, VoiceAssignment};
