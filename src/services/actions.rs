//! User actions, written once for both front ends.
//!
//! Each flow follows the same shape: a synchronous `begin_*` on the session
//! state, one awaited request, then a synchronous `finish_*` with the
//! outcome. State is never borrowed across an await.

use crate::core::error::ClientError;
use crate::core::state::SessionState;
use crate::services::api::{DialogueApi, UploadFile};
use crate::utils::format::now_millis;
use std::sync::{Mutex, PoisonError};

/// Shared, interior-mutable home of a [`SessionState`].
pub trait SessionStore {
    fn update<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R;
    fn read<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R;
}

impl SessionStore for Mutex<SessionState> {
    fn update<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let mut state = self.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    fn read<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        let state = self.lock().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }
}

/// Detects speakers in the current dialogue, then rebuilds the voice
/// assignment from a fresh voice list.
pub async fn detect_speakers<S: SessionStore>(
    api: &dyn DialogueApi,
    store: &S,
) -> Result<(), ClientError> {
    let (ticket, text) = store.update(|s| s.begin_detect())?;
    let outcome = api.detect_speakers(&text).await;
    if store.update(|s| s.finish_detect(ticket, outcome))? {
        load_voices(api, store).await;
    }
    Ok(())
}

pub async fn load_voices<S: SessionStore>(api: &dyn DialogueApi, store: &S) {
    let ticket = store.update(|s| s.begin_load_voices());
    let outcome = api.list_voices().await;
    store.update(|s| s.finish_load_voices(ticket, outcome));
}

/// Replaces the dialogue with the server-extracted text of `file` and
/// re-runs detection on it.
pub async fn upload<S: SessionStore>(
    api: &dyn DialogueApi,
    store: &S,
    file: UploadFile,
) -> Result<(), ClientError> {
    let ticket = store.update(|s| s.begin_upload());
    let outcome = api.upload(file).await;
    if !store.update(|s| s.finish_upload(ticket, outcome))? {
        return Ok(());
    }

    let detected = detect_speakers(api, store).await;
    store.update(|s| s.indicators.hide_progress());
    detected
}

pub async fn generate<S: SessionStore>(api: &dyn DialogueApi, store: &S) -> Result<(), ClientError> {
    let (ticket, request) = store.update(|s| s.begin_generate(now_millis()))?;
    let outcome = api.generate(&request).await;
    if store.update(|s| s.finish_generate(ticket, outcome))? {
        load_history(api, store).await;
    }
    Ok(())
}

pub async fn load_history<S: SessionStore>(api: &dyn DialogueApi, store: &S) {
    let ticket = store.update(|s| s.begin_history());
    let outcome = api.history().await;
    store.update(|s| s.finish_history(ticket, outcome));
}

/// Preview/download URL of the most recent result.
pub fn preview_url<S: SessionStore>(api: &dyn DialogueApi, store: &S) -> Option<String> {
    store.read(|s| s.last_result.as_ref().map(|r| api.download_url(&r.filename)))
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::services::testing::MockApi;

    fn store_with(text: &str) -> Mutex<SessionState> {
        let mut state = SessionState::new();
        state.dialogue_text = text.to_string();
        Mutex::new(state)
    }

    #[tokio::test]
    async fn test_empty_dialogue_sends_nothing() {
        let api = MockApi::new(&["ALICE"], &["v1"]);
        let store = store_with("   ");

        assert!(matches!(detect_speakers(&api, &store).await, Err(ClientError::EmptyDialogue)));
        assert!(matches!(generate(&api, &store).await, Err(ClientError::EmptyDialogue)));

        assert!(api.calls().is_empty());
        assert_eq!(
            store.read(|s| s.indicators.error.clone()).as_deref(),
            Some("Please paste a dialogue first")
        );
    }

    #[tokio::test]
    async fn test_detect_assigns_round_robin_voices() {
        let api = MockApi::new(&["ALICE", "BOB"], &["v1", "v2", "v3"]);
        let store = store_with("[ALICE] Hi\n[BOB] Hello");

        detect_speakers(&api, &store).await.unwrap();

        assert_eq!(api.calls(), vec!["detect-speakers", "voices"]);
        store.read(|s| {
            assert_eq!(s.speakers, vec!["ALICE", "BOB"]);
            assert_eq!(s.voice_assignment.get("ALICE"), Some(&0));
            assert_eq!(s.voice_assignment.get("BOB"), Some(&1));
            assert!(!s.indicators.progress_visible);
        });
    }

    #[tokio::test]
    async fn test_voice_list_failure_is_not_surfaced() {
        let api = MockApi::new(&["ALICE"], &[]).failing_voices();
        let store = store_with("[ALICE] Hi");

        detect_speakers(&api, &store).await.unwrap();

        store.read(|s| {
            assert_eq!(s.speakers, vec!["ALICE"]);
            assert!(s.voice_assignment.is_empty());
            assert_eq!(s.indicators.error, None);
        });
    }

    #[tokio::test]
    async fn test_generate_blocked_without_speakers() {
        let api = MockApi::new(&[], &["v1"]);
        let store = store_with("[ALICE] Hi");

        detect_speakers(&api, &store).await.unwrap();
        assert!(matches!(generate(&api, &store).await, Err(ClientError::NoSpeakers)));
        assert!(!api.calls().contains(&"generate"));
    }

    #[tokio::test]
    async fn test_generate_renders_result_and_refreshes_history() {
        let api = MockApi::new(&["ALICE", "BOB"], &["v1", "v2", "v3"]).with_duration(5.2);
        let store = store_with("[ALICE] Hi\n[BOB] Hello");

        detect_speakers(&api, &store).await.unwrap();
        generate(&api, &store).await.unwrap();

        let request = api.last_generate().unwrap();
        assert!(request.filename.starts_with("dialogue_"));
        assert!(request.filename.ends_with(".mp3"));
        assert_eq!(request.speaker_voices.get("ALICE"), Some(&0));
        assert_eq!(request.speaker_voices.get("BOB"), Some(&1));

        assert_eq!(api.calls().last(), Some(&"history"));
        store.read(|s| {
            let result = s.last_result.as_ref().unwrap();
            assert_eq!(crate::utils::format::format_duration(result.duration), "5.2 seconds");
            assert!(!s.generating);
            assert_eq!(s.history[0].filename, request.filename);
        });
        assert_eq!(
            preview_url(&api, &store).unwrap(),
            format!("http://mock/api/download/{}", request.filename)
        );
    }

    #[tokio::test]
    async fn test_generate_failure_skips_history() {
        let api = MockApi::new(&["ALICE"], &["v1"]).failing_generate("voice engine crashed");
        let store = store_with("[ALICE] Hi");

        detect_speakers(&api, &store).await.unwrap();
        assert!(generate(&api, &store).await.is_err());

        assert!(!api.calls().contains(&"history"));
        store.read(|s| {
            assert!(!s.generating);
            assert_eq!(s.indicators.error.as_deref(), Some("Error generating audio: voice engine crashed"));
        });
    }

    #[tokio::test]
    async fn test_upload_replaces_text_and_redetects() {
        let api = MockApi::new(&["ALICE"], &["v1"]).with_upload_text("[ALICE] From a file");
        let store = store_with("");

        let file = UploadFile {
            name: "talk.txt".to_string(),
            bytes: b"[ALICE] From a file".to_vec(),
        };
        upload(&api, &store, file).await.unwrap();

        assert_eq!(api.calls(), vec!["upload", "detect-speakers", "voices"]);
        store.read(|s| {
            assert_eq!(s.dialogue_text, "[ALICE] From a file");
            assert_eq!(s.speakers, vec!["ALICE"]);
            assert!(!s.indicators.progress_visible);
        });
    }

    #[tokio::test]
    async fn test_upload_then_failed_detection_reports_detection_error() {
        let api = MockApi::new(&[], &["v1"])
            .with_upload_text("[ALICE] From a file")
            .failing_detect();
        let store = store_with("");

        let file = UploadFile {
            name: "talk.txt".to_string(),
            bytes: b"[ALICE] From a file".to_vec(),
        };
        assert!(matches!(
            upload(&api, &store, file).await,
            Err(ClientError::Status { status: 500, .. })
        ));

        assert_eq!(api.calls(), vec!["upload", "detect-speakers"]);
        store.read(|s| {
            assert_eq!(s.dialogue_text, "[ALICE] From a file");
            assert!(s.speakers.is_empty());
            assert_eq!(
                s.indicators.error.as_deref(),
                Some("Error detecting speakers: Failed to detect speakers")
            );
            assert!(!s.indicators.progress_visible);
        });
    }

    #[tokio::test]
    async fn test_rejected_upload_keeps_text() {
        let api = MockApi::new(&["ALICE"], &["v1"]);
        let store = store_with("[ALICE] original");

        let file = UploadFile {
            name: "song.mp3".to_string(),
            bytes: vec![0xff, 0xfb, 0x90],
        };
        assert!(upload(&api, &store, file).await.is_err());

        assert_eq!(api.calls(), vec!["upload"]);
        store.read(|s| {
            assert_eq!(s.dialogue_text, "[ALICE] original");
            assert_eq!(s.indicators.error.as_deref(), Some("Error uploading file: Failed to upload file"));
        });
    }

    #[tokio::test]
    async fn test_history_load_is_newest_first() {
        let api = MockApi::new(&[], &[]).with_history(&["old.mp3", "mid.mp3", "new.mp3"]);
        let store = store_with("");

        load_history(&api, &store).await;

        let order = store.read(|s| s.history.iter().map(|h| h.filename.clone()).collect::<Vec<_>>());
        assert_eq!(order, vec!["new.mp3", "mid.mp3", "old.mp3"]);
    }
}
