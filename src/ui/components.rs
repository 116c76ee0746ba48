use super::browser;
use super::SignalStore;
use crate::services::actions::{self, SessionStore};
use crate::services::api::{DialogueApi, HttpDialogueApi};
use crate::utils::format::{
    format_duration, format_speakers, format_timestamp, speaker_labels, NO_HISTORY_PLACEHOLDER,
    NO_SPEAKERS_PLACEHOLDER,
};
use leptos::*;
use std::rc::Rc;

#[component]
pub fn ErrorBanner(store: SignalStore) -> impl IntoView {
    move || {
        store.read(|s| s.indicators.error.clone()).map(|message| {
            view! {
                <div id="error-section" class="error-section">
                    <p id="error-message">{message}</p>
                </div>
            }
        })
    }
}

#[component]
pub fn ProgressIndicator(store: SignalStore) -> impl IntoView {
    move || {
        let indicators = store.read(|s| s.indicators.clone());
        indicators.progress_visible.then(|| {
            view! {
                <div id="progress-container" class="progress-container">
                    <div class="spinner"></div>
                    <p id="progress-text">{indicators.progress_message.clone()}</p>
                </div>
            }
        })
    }
}

#[component]
pub fn DialogueInput(store: SignalStore, api: Rc<HttpDialogueApi>) -> impl IntoView {
    let file_input = create_node_ref::<html::Input>();

    let text_store = store.clone();
    let input_store = store.clone();
    let on_input = move |ev: ev::Event| input_store.edit_text(event_target_value(&ev));

    let detect_store = store.clone();
    let detect_api = api.clone();
    let on_detect = move |_: ev::MouseEvent| {
        let store = detect_store.clone();
        let api = detect_api.clone();
        spawn_local(async move {
            if let Err(e) = actions::detect_speakers(api.as_ref(), &store).await {
                log::warn!("Speaker detection failed: {}", e);
            }
        });
    };

    let open_picker = move |_: ev::MouseEvent| {
        if let Some(input) = file_input.get() {
            input.click();
        }
    };

    let on_file = move |_: ev::Event| {
        let Some(input) = file_input.get() else {
            return;
        };
        let Some(file) = input.files().and_then(|list| list.get(0)) else {
            return;
        };
        // Clearing lets the same file be picked again.
        input.set_value("");

        let store = store.clone();
        let api = api.clone();
        spawn_local(async move {
            match browser::read_file(&file).await {
                Ok(upload) => {
                    if let Err(e) = actions::upload(api.as_ref(), &store, upload).await {
                        log::warn!("Upload failed: {}", e);
                    }
                }
                Err(e) => store.update(|s| s.indicators.show_error(format!("Error uploading file: {}", e))),
            }
        });
    };

    view! {
        <section class="input-section">
            <h2>"Dialogue"</h2>
            <textarea
                id="dialogue-text"
                rows="12"
                placeholder="[ALICE] Hello!\n[BOB] Hi there."
                prop:value=move || text_store.read(|s| s.dialogue_text.clone())
                on:input=on_input
            ></textarea>
            <div class="button-row">
                <button id="detect-btn" on:click=on_detect>"Detect Speakers"</button>
                <button id="upload-btn" on:click=open_picker>"Upload File"</button>
                <input type="file" id="file-input" style="display: none" node_ref=file_input on:change=on_file/>
            </div>
        </section>
    }
}

#[component]
pub fn SpeakerList(store: SignalStore) -> impl IntoView {
    view! {
        <section class="speakers-section">
            <h2>"Speakers"</h2>
            <div id="speakers-list">
                {move || {
                    let speakers = store.read(|s| s.speakers.clone());
                    if speakers.is_empty() {
                        return view! { <p class="placeholder">{NO_SPEAKERS_PLACEHOLDER}</p> }.into_view();
                    }
                    speaker_labels(&speakers)
                        .into_iter()
                        .map(|label| {
                            view! {
                                <div class="speaker-item">
                                    <span class="speaker-name">{label}</span>
                                </div>
                            }
                        })
                        .collect_view()
                }}
            </div>
        </section>
    }
}

#[component]
pub fn VoicePickers(store: SignalStore) -> impl IntoView {
    view! {
        <section class="voices-section">
            <h2>"Voices"</h2>
            <div id="voice-assignment">
                {move || {
                    let (speakers, voices, assignment) = store.read(|s| {
                        (s.speakers.clone(), s.voices.clone(), s.voice_assignment.clone())
                    });
                    speakers
                        .into_iter()
                        .map(|speaker| {
                            let current = assignment.get(&speaker).copied();
                            let select_store = store.clone();
                            let key = speaker.clone();
                            let on_change = move |ev: ev::Event| {
                                let Ok(voice) = event_target_value(&ev).parse::<usize>() else {
                                    return;
                                };
                                if let Err(e) = select_store.update(|s| s.select_voice(&key, voice)) {
                                    log::warn!("Voice selection rejected: {}", e);
                                }
                            };
                            let options = voices
                                .iter()
                                .enumerate()
                                .map(|(idx, voice)| {
                                    view! {
                                        <option value={idx.to_string()} selected={current == Some(idx)}>
                                            {voice.clone()}
                                        </option>
                                    }
                                })
                                .collect_view();
                            view! {
                                <div class="voice-item">
                                    <label><strong>{speaker}</strong></label>
                                    <select class="voice-select" on:change=on_change>{options}</select>
                                </div>
                            }
                        })
                        .collect_view()
                }}
            </div>
        </section>
    }
}

#[component]
pub fn GeneratePanel(store: SignalStore, api: Rc<HttpDialogueApi>) -> impl IntoView {
    let disabled_store = store.clone();

    let generate_store = store.clone();
    let generate_api = api.clone();
    let on_generate = move |_: ev::MouseEvent| {
        let store = generate_store.clone();
        let api = generate_api.clone();
        spawn_local(async move {
            if let Err(e) = actions::generate(api.as_ref(), &store).await {
                log::warn!("Generation failed: {}", e);
            }
        });
    };

    view! {
        <section class="generate-section">
            <button
                id="generate-btn"
                prop:disabled=move || disabled_store.read(|s| s.generating)
                on:click=on_generate
            >
                "Generate MP3"
            </button>
            <ResultPanel store=store api=api/>
        </section>
    }
}

#[component]
fn ResultPanel(store: SignalStore, api: Rc<HttpDialogueApi>) -> impl IntoView {
    move || {
        let Some(result) = store.read(|s| s.last_result.clone()) else {
            return None;
        };
        let url = api.download_url(&result.filename);
        let download_url = url.clone();
        let filename = result.filename.clone();

        Some(view! {
            <div id="result-section" class="result-section">
                <p>"Filename: " <span id="result-filename">{result.filename.clone()}</span></p>
                <p>"Duration: " <span id="result-duration">{format_duration(result.duration)}</span></p>
                <p>"Speakers: " <span id="result-speakers">{format_speakers(&result.speakers)}</span></p>
                <audio id="preview-audio" controls=true src=url></audio>
                <button id="download-btn" on:click=move |_| browser::trigger_download(&download_url, &filename)>
                    "Download"
                </button>
            </div>
        })
    }
}

#[component]
pub fn HistoryList(store: SignalStore, api: Rc<HttpDialogueApi>) -> impl IntoView {
    view! {
        <section class="history-section">
            <h2>"Recent Files"</h2>
            <div id="history-list">
                {move || {
                    let history = store.read(|s| s.history.clone());
                    if history.is_empty() {
                        return view! { <p class="placeholder">{NO_HISTORY_PLACEHOLDER}</p> }.into_view();
                    }
                    history
                        .into_iter()
                        .map(|item| {
                            let url = api.download_url(&item.filename);
                            let filename = item.filename.clone();
                            view! {
                                <div class="history-item" on:click=move |_| browser::trigger_download(&url, &filename)>
                                    <div class="history-filename">{item.filename.clone()}</div>
                                    <div class="history-meta">
                                        <span>{format_speakers(&item.speakers)}</span>
                                        <span class="history-timestamp">{format_timestamp(&item.timestamp)}</span>
                                    </div>
                                </div>
                            }
                        })
                        .collect_view()
                }}
            </div>
        </section>
    }
}
