use crate::core::config::Config;
use crate::core::io::Storage;
use crate::core::state::{Action, SessionState};
use crate::services::api::UploadFile;
use crate::services::session::DialogueSession;
use crate::utils::format::{
    format_duration, format_speakers, format_timestamp, speaker_labels, NO_HISTORY_PLACEHOLDER,
    NO_SPEAKERS_PLACEHOLDER,
};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use inquire::{Editor, InquireError, Select, Text};
use std::fmt;
use std::future::Future;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    EditDialogue,
    UploadFile,
    DetectSpeakers,
    AssignVoices,
    Generate,
    DownloadLast,
    History,
    Quit,
}

const MENU: [MenuItem; 8] = [
    MenuItem::EditDialogue,
    MenuItem::UploadFile,
    MenuItem::DetectSpeakers,
    MenuItem::AssignVoices,
    MenuItem::Generate,
    MenuItem::DownloadLast,
    MenuItem::History,
    MenuItem::Quit,
];

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MenuItem::EditDialogue => "Edit dialogue",
            MenuItem::UploadFile => "Upload dialogue file",
            MenuItem::DetectSpeakers => "Detect speakers",
            MenuItem::AssignVoices => "Assign voices",
            MenuItem::Generate => "Generate MP3",
            MenuItem::DownloadLast => "Download last result",
            MenuItem::History => "Recent files",
            MenuItem::Quit => "Quit",
        };
        f.write_str(label)
    }
}

/// Interactive terminal front end. Returns when the user quits.
pub async fn run_console(session: &DialogueSession, config: &Config, storage: &dyn Storage) -> Result<()> {
    spin(Action::LoadHistory, session.load_history()).await?;

    loop {
        let choice = match Select::new("What next?", MENU.to_vec()).prompt() {
            Ok(choice) => choice,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        match choice {
            MenuItem::EditDialogue => {
                let current = session.read(|s| s.dialogue_text.clone());
                let edited = Editor::new("Dialogue ([SPEAKER] line per row):")
                    .with_predefined_text(&current)
                    .prompt();
                if let Some(text) = unless_cancelled(edited)? {
                    session.set_dialogue_text(text);
                }
            }
            MenuItem::UploadFile => {
                let Some(path) = unless_cancelled(Text::new("Path to dialogue file:").prompt())? else {
                    continue;
                };
                let file = match read_upload(Path::new(path.trim())).await {
                    Ok(file) => file,
                    Err(e) => {
                        eprintln!("✗ {:#}", e);
                        continue;
                    }
                };
                let outcome = spin(Action::Upload, session.upload(file)).await?;
                report(session, outcome.is_ok());
                if outcome.is_ok() {
                    session.read(render_speakers);
                }
            }
            MenuItem::DetectSpeakers => {
                let outcome = spin(Action::DetectSpeakers, session.detect_speakers()).await?;
                report(session, outcome.is_ok());
                if outcome.is_ok() {
                    session.read(render_speakers);
                }
            }
            MenuItem::AssignVoices => assign_voices(session).await?,
            MenuItem::Generate => {
                let outcome = spin(Action::Generate, session.generate()).await?;
                report(session, outcome.is_ok());
                if outcome.is_ok() {
                    render_result(session);
                }
            }
            MenuItem::DownloadLast => {
                match session.download_current(storage, &config.output_folder).await {
                    Ok(Some(path)) => println!("Saved to {}", path.display()),
                    Ok(None) => {}
                    Err(e) => eprintln!("Download failed: {:#}", e),
                }
            }
            MenuItem::History => browse_history(session, config, storage).await?,
            MenuItem::Quit => break,
        }
    }

    Ok(())
}

/// Runs one request behind a spinner labelled with the action's progress text.
async fn spin<F: Future>(action: Action, fut: F) -> Result<F::Output> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(action.progress_message());
    pb.enable_steady_tick(Duration::from_millis(100));

    let output = fut.await;
    pb.finish_and_clear();
    Ok(output)
}

/// Esc on a prompt goes back to the menu instead of ending the session.
fn unless_cancelled<T>(answer: std::result::Result<T, InquireError>) -> Result<Option<T>> {
    match answer {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn report(session: &DialogueSession, ok: bool) {
    if ok {
        return;
    }
    if let Some(message) = session.read(|s| s.indicators.error.clone()) {
        eprintln!("✗ {}", message);
    }
}

async fn read_upload(path: &Path) -> Result<UploadFile> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "dialogue.txt".to_string());
    Ok(UploadFile { name, bytes })
}

fn render_speakers(state: &SessionState) {
    if state.speakers.is_empty() {
        println!("{}", NO_SPEAKERS_PLACEHOLDER);
        return;
    }
    println!("Speakers:");
    for label in speaker_labels(&state.speakers) {
        println!("  {}", label);
    }
    for speaker in &state.speakers {
        if let Some(voice) = state.voice_assignment.get(speaker) {
            let name = state.voices.get(*voice).map(String::as_str).unwrap_or("?");
            println!("  {} -> {}", speaker, name);
        }
    }
}

fn render_result(session: &DialogueSession) {
    let preview = session.preview_url();
    session.read(|s| {
        if let Some(result) = &s.last_result {
            println!("Filename: {}", result.filename);
            println!("Duration: {}", format_duration(result.duration));
            println!("Speakers: {}", format_speakers(&result.speakers));
        }
    });
    if let Some(url) = preview {
        println!("Preview:  {}", url);
    }
}

async fn assign_voices(session: &DialogueSession) -> Result<()> {
    if session.read(|s| s.speakers.is_empty()) {
        println!("Please detect speakers first");
        return Ok(());
    }
    if session.read(|s| s.voices.is_empty()) {
        spin(Action::LoadVoices, session.load_voices()).await?;
    }

    let (speakers, voices, assignment) =
        session.read(|s| (s.speakers.clone(), s.voices.clone(), s.voice_assignment.clone()));
    if voices.is_empty() {
        println!("No voices available from the server");
        return Ok(());
    }

    for speaker in &speakers {
        let current = assignment.get(speaker).copied().unwrap_or(0);
        let answer = Select::new(&format!("Voice for {}:", speaker), voices.clone())
            .with_starting_cursor(current)
            .raw_prompt();
        let Some(choice) = unless_cancelled(answer)? else {
            return Ok(());
        };
        if let Err(e) = session.select_voice(speaker, choice.index) {
            eprintln!("✗ {}", e);
        }
    }
    Ok(())
}

async fn browse_history(session: &DialogueSession, config: &Config, storage: &dyn Storage) -> Result<()> {
    spin(Action::LoadHistory, session.load_history()).await?;

    let entries: Vec<String> = session.read(|s| {
        s.history
            .iter()
            .map(|h| {
                format!(
                    "{}  [{}]  {}",
                    h.filename,
                    format_speakers(&h.speakers),
                    format_timestamp(&h.timestamp)
                )
            })
            .collect()
    });

    if entries.is_empty() {
        println!("{}", NO_HISTORY_PLACEHOLDER);
        return Ok(());
    }

    let Some(choice) = unless_cancelled(Select::new("Download which file?", entries).raw_prompt())? else {
        return Ok(());
    };
    let filename = session.read(|s| s.history[choice.index].filename.clone());

    match session.download(&filename, storage, &config.output_folder).await {
        Ok(path) => println!("Saved to {}", path.display()),
        Err(e) => eprintln!("Download failed: {:#}", e),
    }
    Ok(())
}
