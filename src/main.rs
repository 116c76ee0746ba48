#[cfg(not(target_arch = "wasm32"))]
use anyhow::Result;
#[cfg(not(target_arch = "wasm32"))]
use dialogue_tts_client::core::config::{Config, CONFIG_FILE};
#[cfg(not(target_arch = "wasm32"))]
use dialogue_tts_client::core::io::NativeStorage;
#[cfg(not(target_arch = "wasm32"))]
use dialogue_tts_client::services::api::HttpDialogueApi;
#[cfg(not(target_arch = "wasm32"))]
use dialogue_tts_client::services::console::run_console;
#[cfg(not(target_arch = "wasm32"))]
use dialogue_tts_client::services::session::DialogueSession;
#[cfg(not(target_arch = "wasm32"))]
use std::path::Path;

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    // 1. Config (defaults when config.yml is absent)
    let config_path = Path::new(CONFIG_FILE);
    let config = match Config::load_or_default(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading config: {:#}", e);
            eprintln!("Please fix or remove '{}'.", CONFIG_FILE);
            return Err(e);
        }
    };
    if !config_path.exists() {
        config.save(config_path)?;
        println!("Wrote default {}", CONFIG_FILE);
    }
    config.ensure_directories()?;

    // 2. API client
    let api = HttpDialogueApi::new(&config.api_base)?;
    log::info!("Using dialogue API at {}", api.base());

    // 3. Interactive session
    let session = DialogueSession::new(Box::new(api));
    let storage = NativeStorage::new();
    run_console(&session, &config, &storage).await?;

    Ok(())
}

// The browser build starts through `start()` in the library.
#[cfg(target_arch = "wasm32")]
fn main() {}
