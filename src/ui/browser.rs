use crate::services::api::UploadFile;
use anyhow::{anyhow, Result};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{File, HtmlAnchorElement};

/// Lets the browser fetch and save `url` under `filename`.
pub fn trigger_download(url: &str, filename: &str) {
    if let Err(e) = try_trigger_download(url, filename) {
        log::error!("Download of {} failed: {}", filename, e);
    }
}

fn try_trigger_download(url: &str, filename: &str) -> Result<()> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| anyhow!("No document available"))?;
    let link: HtmlAnchorElement = document
        .create_element("a")
        .map_err(|e| anyhow!("Create element error: {:?}", e))?
        .dyn_into()
        .map_err(|_| anyhow!("Not an anchor element"))?;

    link.set_href(url);
    link.set_download(filename);
    link.click();
    Ok(())
}

pub async fn read_file(file: &File) -> Result<UploadFile> {
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| anyhow!("Failed to read {}: {:?}", file.name(), e))?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
    Ok(UploadFile {
        name: file.name(),
        bytes,
    })
}
