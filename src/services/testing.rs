use crate::core::error::ClientError;
use crate::services::api::types::Timestamp;
use crate::services::api::{DialogueApi, GenerateRequest, GenerationResult, HistoryEntry, UploadFile};
use async_trait::async_trait;
use std::sync::Mutex;

/// In-memory stand-in for the dialogue server.
pub struct MockApi {
    speakers: Option<Vec<String>>,
    voices: Option<Vec<String>>,
    upload_text: Option<String>,
    generate_error: Option<String>,
    duration: f64,
    history: Mutex<Vec<HistoryEntry>>,
    calls: Mutex<Vec<&'static str>>,
    last_generate: Mutex<Option<GenerateRequest>>,
}

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn entry(filename: &str, speakers: Vec<String>) -> HistoryEntry {
    HistoryEntry {
        filename: filename.to_string(),
        speakers,
        timestamp: Timestamp::Text("2024-05-01T12:00:00".to_string()),
        duration: None,
    }
}

impl MockApi {
    pub fn new(speakers: &[&str], voices: &[&str]) -> Self {
        Self {
            speakers: Some(owned(speakers)),
            voices: Some(owned(voices)),
            upload_text: None,
            generate_error: None,
            duration: 1.0,
            history: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            last_generate: Mutex::new(None),
        }
    }

    pub fn failing_detect(mut self) -> Self {
        self.speakers = None;
        self
    }

    pub fn failing_voices(mut self) -> Self {
        self.voices = None;
        self
    }

    pub fn failing_generate(mut self, detail: &str) -> Self {
        self.generate_error = Some(detail.to_string());
        self
    }

    pub fn with_upload_text(mut self, text: &str) -> Self {
        self.upload_text = Some(text.to_string());
        self
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_history(self, filenames: &[&str]) -> Self {
        *self.history.lock().unwrap() = filenames.iter().map(|f| entry(f, vec![])).collect();
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_generate(&self) -> Option<GenerateRequest> {
        self.last_generate.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }
}

fn rejected(status: u16, detail: Option<&str>) -> ClientError {
    ClientError::Status {
        status,
        detail: detail.map(str::to_string),
    }
}

#[async_trait]
impl DialogueApi for MockApi {
    async fn detect_speakers(&self, _dialogue_text: &str) -> Result<Vec<String>, ClientError> {
        self.record("detect-speakers");
        self.speakers.clone().ok_or_else(|| rejected(500, None))
    }

    async fn list_voices(&self) -> Result<Vec<String>, ClientError> {
        self.record("voices");
        self.voices.clone().ok_or_else(|| rejected(500, None))
    }

    async fn upload(&self, _file: UploadFile) -> Result<String, ClientError> {
        self.record("upload");
        self.upload_text
            .clone()
            .ok_or_else(|| rejected(400, Some("'utf-8' codec can't decode byte 0xff")))
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<GenerationResult, ClientError> {
        self.record("generate");
        *self.last_generate.lock().unwrap() = Some(request.clone());
        if let Some(detail) = &self.generate_error {
            return Err(rejected(500, Some(detail.as_str())));
        }
        let speakers: Vec<String> = request.speaker_voices.keys().cloned().collect();
        self.history
            .lock()
            .unwrap()
            .push(entry(&request.filename, speakers.clone()));
        Ok(GenerationResult {
            filename: request.filename.clone(),
            duration: self.duration,
            speakers,
        })
    }

    async fn history(&self) -> Result<Vec<HistoryEntry>, ClientError> {
        self.record("history");
        Ok(self.history.lock().unwrap().clone())
    }

    async fn download(&self, filename: &str) -> Result<Vec<u8>, ClientError> {
        self.record("download");
        Ok(format!("audio:{}", filename).into_bytes())
    }

    fn download_url(&self, filename: &str) -> String {
        format!("http://mock/api/download/{}", filename)
    }
}
