mod browser;
mod components;

use crate::core::config::Config;
use crate::core::state::SessionState;
use crate::services::actions::{self, SessionStore};
use crate::services::api::HttpDialogueApi;
use components::{
    DialogueInput, ErrorBanner, GeneratePanel, HistoryList, ProgressIndicator, SpeakerList,
    VoicePickers,
};
use leptos::*;
use std::cell::RefCell;
use std::rc::Rc;

/// Session state for the page. Reads subscribe the current reactive scope,
/// updates notify it.
#[derive(Clone)]
pub struct SignalStore {
    cell: Rc<RefCell<SessionState>>,
    trigger: Trigger,
}

impl SignalStore {
    pub fn new() -> Self {
        Self {
            cell: Rc::new(RefCell::new(SessionState::new())),
            trigger: create_trigger(),
        }
    }

    /// Keystrokes go straight into the state; re-rendering the editor on
    /// every key would move the caret.
    pub fn edit_text(&self, text: String) {
        self.cell.borrow_mut().dialogue_text = text;
    }
}

impl SessionStore for SignalStore {
    fn update<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let out = f(&mut self.cell.borrow_mut());
        self.trigger.notify();
        out
    }

    fn read<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        self.trigger.track();
        f(&self.cell.borrow())
    }
}

#[component]
pub fn App() -> impl IntoView {
    let config = Config::for_browser();

    view! {
        <div class="app-container">
            <h1>"Dialogue TTS"</h1>
            {match HttpDialogueApi::new(&config.api_base) {
                Ok(api) => view! { <Studio api={Rc::new(api)}/> }.into_view(),
                Err(e) => view! { <p class="error">"Invalid API address: " {e.to_string()}</p> }.into_view(),
            }}
        </div>
    }
}

#[component]
fn Studio(api: Rc<HttpDialogueApi>) -> impl IntoView {
    let store = SignalStore::new();

    // Initial history fetch
    {
        let api = api.clone();
        let store = store.clone();
        spawn_local(async move {
            actions::load_history(api.as_ref(), &store).await;
        });
    }

    view! {
        <ErrorBanner store=store.clone()/>
        <ProgressIndicator store=store.clone()/>
        <DialogueInput store=store.clone() api=api.clone()/>
        <SpeakerList store=store.clone()/>
        <VoicePickers store=store.clone()/>
        <GeneratePanel store=store.clone() api=api.clone()/>
        <HistoryList store=store api=api/>
    }
}
