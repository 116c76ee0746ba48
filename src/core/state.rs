use crate::core::error::ClientError;
use crate::services::api::types::{
    GenerateRequest, GenerationResult, HistoryEntry, VoiceAssignment,
};
use crate::utils::format::generation_filename;
use log::{debug, error};
use std::collections::HashMap;

/// User-visible actions that talk to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    DetectSpeakers,
    LoadVoices,
    Upload,
    Generate,
    LoadHistory,
}

impl Action {
    pub fn progress_message(&self) -> &'static str {
        match self {
            Action::DetectSpeakers => "Detecting speakers...",
            Action::LoadVoices => "Loading voices...",
            Action::Upload => "Uploading file...",
            Action::Generate => "Generating MP3...",
            Action::LoadHistory => "Loading history...",
        }
    }

    fn failure_prefix(&self) -> &'static str {
        match self {
            Action::DetectSpeakers => "Error detecting speakers",
            Action::LoadVoices => "Error loading voices",
            Action::Upload => "Error uploading file",
            Action::Generate => "Error generating audio",
            Action::LoadHistory => "Error loading history",
        }
    }

    fn generic_failure(&self) -> &'static str {
        match self {
            Action::DetectSpeakers => "Failed to detect speakers",
            Action::LoadVoices => "Failed to load voices",
            Action::Upload => "Failed to upload file",
            Action::Generate => "Failed to generate audio",
            Action::LoadHistory => "Failed to load history",
        }
    }

    /// Banner text for a failed request.
    pub fn failure_message(&self, err: &ClientError) -> String {
        if err.is_precondition() {
            return err.to_string();
        }
        let reason = match err {
            // Only generation relays the server's explanation.
            ClientError::Status { detail: Some(detail), .. }
                if *self == Action::Generate && !detail.trim().is_empty() =>
            {
                detail.clone()
            }
            ClientError::Status { .. } => self.generic_failure().to_string(),
            other => other.to_string(),
        };
        format!("{}: {}", self.failure_prefix(), reason)
    }
}

/// Identifies one in-flight request. Only the newest ticket of an action
/// may apply its response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    action: Action,
    seq: u64,
}

/// Single-slot progress indicator and error banner.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Indicators {
    pub progress_visible: bool,
    pub progress_message: String,
    pub error: Option<String>,
}

impl Indicators {
    /// Shows the indicator; without a message the previous one stays.
    pub fn show_progress(&mut self, message: Option<&str>) {
        self.progress_visible = true;
        if let Some(message) = message.filter(|m| !m.is_empty()) {
            self.progress_message = message.to_string();
        }
    }

    pub fn hide_progress(&mut self) {
        self.progress_visible = false;
    }

    pub fn show_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn hide_error(&mut self) {
        self.error = None;
    }
}

/// Round-robin default: speaker `i` gets voice `i % voice_count`.
pub fn default_assignment(speakers: &[String], voice_count: usize) -> VoiceAssignment {
    if voice_count == 0 {
        return VoiceAssignment::new();
    }
    speakers
        .iter()
        .enumerate()
        .map(|(idx, speaker)| (speaker.clone(), idx % voice_count))
        .collect()
}

/// Everything the client remembers for the lifetime of a page or console
/// session. Flows call `begin_*` before a request and `finish_*` with its
/// outcome; neither half ever awaits.
#[derive(Debug, Default, Clone)]
pub struct SessionState {
    pub dialogue_text: String,
    pub current_filename: Option<String>,
    pub speakers: Vec<String>,
    pub voices: Vec<String>,
    pub voice_assignment: VoiceAssignment,
    pub last_result: Option<GenerationResult>,
    /// Newest first.
    pub history: Vec<HistoryEntry>,
    pub indicators: Indicators,
    pub generating: bool,
    tickets: HashMap<Action, u64>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    fn issue(&mut self, action: Action) -> Ticket {
        let seq = self.tickets.entry(action).or_insert(0);
        *seq += 1;
        Ticket { action, seq: *seq }
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.tickets.get(&ticket.action) == Some(&ticket.seq)
    }

    fn stale(&self, ticket: Ticket) -> bool {
        if self.is_current(ticket) {
            return false;
        }
        debug!("Discarding stale {:?} response", ticket.action);
        true
    }

    fn fail(&mut self, action: Action, err: &ClientError) {
        self.indicators.show_error(action.failure_message(err));
        self.indicators.hide_progress();
    }

    fn dialogue(&mut self) -> Result<String, ClientError> {
        let text = self.dialogue_text.trim();
        if text.is_empty() {
            let err = ClientError::EmptyDialogue;
            self.indicators.show_error(err.to_string());
            return Err(err);
        }
        Ok(text.to_string())
    }

    // --- Speaker detection ---

    pub fn begin_detect(&mut self) -> Result<(Ticket, String), ClientError> {
        let text = self.dialogue()?;
        self.indicators
            .show_progress(Some(Action::DetectSpeakers.progress_message()));
        Ok((self.issue(Action::DetectSpeakers), text))
    }

    /// Returns `Ok(true)` when new speakers were applied and the voice list
    /// should be fetched.
    pub fn finish_detect(
        &mut self,
        ticket: Ticket,
        outcome: Result<Vec<String>, ClientError>,
    ) -> Result<bool, ClientError> {
        if self.stale(ticket) {
            return Ok(false);
        }
        match outcome {
            Ok(speakers) => {
                self.speakers = speakers;
                self.voice_assignment.clear();
                // A voice list requested for the previous speakers must not
                // repopulate the assignment.
                self.issue(Action::LoadVoices);
                self.indicators.hide_progress();
                Ok(true)
            }
            Err(e) => {
                self.fail(Action::DetectSpeakers, &e);
                Err(e)
            }
        }
    }

    // --- Voices ---

    pub fn begin_load_voices(&mut self) -> Ticket {
        self.issue(Action::LoadVoices)
    }

    /// Best-effort: a failure is logged and leaves the assignment empty.
    pub fn finish_load_voices(&mut self, ticket: Ticket, outcome: Result<Vec<String>, ClientError>) {
        if self.stale(ticket) {
            return;
        }
        match outcome {
            Ok(voices) => {
                self.voice_assignment = default_assignment(&self.speakers, voices.len());
                self.voices = voices;
            }
            Err(e) => error!("{} ({})", Action::LoadVoices.failure_message(&e), e),
        }
    }

    pub fn select_voice(&mut self, speaker: &str, voice: usize) -> Result<(), ClientError> {
        if voice >= self.voices.len() {
            return Err(ClientError::VoiceOutOfRange {
                index: voice,
                count: self.voices.len(),
            });
        }
        if !self.speakers.iter().any(|s| s == speaker) {
            return Err(ClientError::UnknownSpeaker(speaker.to_string()));
        }
        self.voice_assignment.insert(speaker.to_string(), voice);
        Ok(())
    }

    // --- Upload ---

    pub fn begin_upload(&mut self) -> Ticket {
        self.indicators.show_progress(Some(Action::Upload.progress_message()));
        self.issue(Action::Upload)
    }

    /// Returns `Ok(true)` when the dialogue text was replaced and detection
    /// should re-run.
    pub fn finish_upload(
        &mut self,
        ticket: Ticket,
        outcome: Result<String, ClientError>,
    ) -> Result<bool, ClientError> {
        if self.stale(ticket) {
            return Ok(false);
        }
        match outcome {
            Ok(text) => {
                self.dialogue_text = text;
                Ok(true)
            }
            Err(e) => {
                self.fail(Action::Upload, &e);
                Err(e)
            }
        }
    }

    // --- Generation ---

    pub fn begin_generate(&mut self, now_millis: i64) -> Result<(Ticket, GenerateRequest), ClientError> {
        let dialogue_text = self.dialogue()?;
        if self.speakers.is_empty() {
            let err = ClientError::NoSpeakers;
            self.indicators.show_error(err.to_string());
            return Err(err);
        }
        if self.generating {
            return Err(ClientError::GenerationInFlight);
        }

        self.generating = true;
        self.indicators.show_progress(Some(Action::Generate.progress_message()));
        self.indicators.hide_error();
        self.last_result = None;

        let request = GenerateRequest {
            dialogue_text,
            filename: generation_filename(now_millis),
            speaker_voices: self.voice_assignment.clone(),
        };
        Ok((self.issue(Action::Generate), request))
    }

    /// Returns `Ok(true)` on success, after which history should be refreshed.
    pub fn finish_generate(
        &mut self,
        ticket: Ticket,
        outcome: Result<GenerationResult, ClientError>,
    ) -> Result<bool, ClientError> {
        // The trigger is re-enabled on every path.
        self.generating = false;
        if self.stale(ticket) {
            return Ok(false);
        }
        match outcome {
            Ok(result) => {
                self.current_filename = Some(result.filename.clone());
                self.last_result = Some(result);
                self.indicators.hide_progress();
                Ok(true)
            }
            Err(e) => {
                self.fail(Action::Generate, &e);
                Err(e)
            }
        }
    }

    // --- History ---

    pub fn begin_history(&mut self) -> Ticket {
        self.issue(Action::LoadHistory)
    }

    /// Best-effort; the server lists oldest first.
    pub fn finish_history(&mut self, ticket: Ticket, outcome: Result<Vec<HistoryEntry>, ClientError>) {
        if self.stale(ticket) {
            return;
        }
        match outcome {
            Ok(mut entries) => {
                entries.reverse();
                self.history = entries;
            }
            Err(e) => error!("{} ({})", Action::LoadHistory.failure_message(&e), e),
        }
    }
}
