use crate::core::error::ClientError;
use crate::core::io::Storage;
use crate::core::state::SessionState;
use crate::services::actions::{self, SessionStore};
use crate::services::api::{DialogueApi, UploadFile};
use anyhow::{anyhow, Result};
use log::info;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Native session: one API client plus the state it drives.
pub struct DialogueSession {
    api: Box<dyn DialogueApi>,
    state: Mutex<SessionState>,
}

impl DialogueSession {
    pub fn new(api: Box<dyn DialogueApi>) -> Self {
        Self {
            api,
            state: Mutex::new(SessionState::new()),
        }
    }

    pub fn read<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        self.state.read(f)
    }

    pub fn set_dialogue_text(&self, text: impl Into<String>) {
        let text = text.into();
        self.state.update(|s| s.dialogue_text = text);
    }

    pub async fn detect_speakers(&self) -> Result<(), ClientError> {
        actions::detect_speakers(self.api.as_ref(), &self.state).await
    }

    pub async fn upload(&self, file: UploadFile) -> Result<(), ClientError> {
        actions::upload(self.api.as_ref(), &self.state, file).await
    }

    pub async fn generate(&self) -> Result<(), ClientError> {
        actions::generate(self.api.as_ref(), &self.state).await
    }

    pub async fn load_voices(&self) {
        actions::load_voices(self.api.as_ref(), &self.state).await
    }

    pub async fn load_history(&self) {
        actions::load_history(self.api.as_ref(), &self.state).await
    }

    pub fn select_voice(&self, speaker: &str, voice: usize) -> Result<(), ClientError> {
        self.state.update(|s| s.select_voice(speaker, voice))
    }

    pub fn preview_url(&self) -> Option<String> {
        actions::preview_url(self.api.as_ref(), &self.state)
    }

    /// Saves the last generated file; `None` when nothing was generated yet.
    pub async fn download_current(&self, storage: &dyn Storage, folder: &str) -> Result<Option<PathBuf>> {
        let current = self.state.read(|s| s.current_filename.clone());
        match current {
            Some(filename) => Ok(Some(self.download(&filename, storage, folder).await?)),
            None => Ok(None),
        }
    }

    /// Fetches `filename` from the server and writes it under `folder`.
    pub async fn download(&self, filename: &str, storage: &dyn Storage, folder: &str) -> Result<PathBuf> {
        // Server-supplied names must not escape the download folder.
        let name = Path::new(filename)
            .file_name()
            .ok_or_else(|| anyhow!("Invalid filename: {}", filename))?;
        let target = Path::new(folder).join(name);

        let bytes = self.api.download(filename).await?;
        let path = target
            .to_str()
            .ok_or_else(|| anyhow!("Non UTF-8 path: {:?}", target))?;
        storage.write(path, &bytes).await?;

        info!("Saved {} ({} bytes)", target.display(), bytes.len());
        Ok(target)
    }
}
