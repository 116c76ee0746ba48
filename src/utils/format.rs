use crate::services::api::types::Timestamp;
use chrono::{DateTime, Local, NaiveDateTime, Utc};

pub const NO_SPEAKERS_PLACEHOLDER: &str =
    "No speakers detected. Check your text format: [SPEAKER_NAME] text";
pub const NO_HISTORY_PLACEHOLDER: &str = "No recent files";

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `dialogue_<epoch-millis>.mp3`
pub fn generation_filename(millis: i64) -> String {
    format!("dialogue_{}.mp3", millis)
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

pub fn format_duration(seconds: f64) -> String {
    format!("{} seconds", seconds)
}

pub fn format_speakers(speakers: &[String]) -> String {
    speakers.join(", ")
}

/// Numbered speaker list as shown in the detection panel, starting at 1.
pub fn speaker_labels(speakers: &[String]) -> Vec<String> {
    speakers
        .iter()
        .enumerate()
        .map(|(idx, speaker)| format!("{}. {}", idx + 1, speaker))
        .collect()
}

/// Local date/time for a history entry; unparseable text is shown as-is.
pub fn format_timestamp(timestamp: &Timestamp) -> String {
    match timestamp {
        Timestamp::Millis(ms) => DateTime::<Utc>::from_timestamp_millis(*ms as i64)
            .map(|dt| dt.with_timezone(&Local).format(DISPLAY_FORMAT).to_string())
            .unwrap_or_else(|| ms.to_string()),
        Timestamp::Text(text) => {
            if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
                return dt.with_timezone(&Local).format(DISPLAY_FORMAT).to_string();
            }
            // Naive ISO text (no offset) is already local time.
            match NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
                Ok(naive) => naive.format(DISPLAY_FORMAT).to_string(),
                Err(_) => text.clone(),
            }
        }
    }
}
