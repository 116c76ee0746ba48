use crate::core::error::ClientError;
use crate::services::api::types::{
    DialogueRequest, ErrorBody, GenerateRequest, GenerationResult, HistoryEntry, HistoryResponse,
    SpeakersResponse, UploadFile, UploadResponse, VoicesResponse,
};
use async_trait::async_trait;
use futures_util::StreamExt;
use log::debug;
use reqwest::{multipart, Client, Response};
use url::Url;

#[cfg(target_arch = "wasm32")]
pub trait ApiBounds {}
#[cfg(target_arch = "wasm32")]
impl<T> ApiBounds for T {}

#[cfg(not(target_arch = "wasm32"))]
pub trait ApiBounds: Send + Sync {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Send + Sync> ApiBounds for T {}

/// The remote dialogue API consumed by the client.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait DialogueApi: ApiBounds {
    async fn detect_speakers(&self, dialogue_text: &str) -> Result<Vec<String>, ClientError>;
    async fn list_voices(&self) -> Result<Vec<String>, ClientError>;
    async fn upload(&self, file: UploadFile) -> Result<String, ClientError>;
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerationResult, ClientError>;
    async fn history(&self) -> Result<Vec<HistoryEntry>, ClientError>;
    async fn download(&self, filename: &str) -> Result<Vec<u8>, ClientError>;

    /// URL serving the audio for `filename`, used for preview and download.
    fn download_url(&self, filename: &str) -> String;
}

pub struct HttpDialogueApi {
    client: Client,
    base: Url,
}

impl HttpDialogueApi {
    pub fn new(api_base: &str) -> Result<Self, ClientError> {
        // Url::join drops the last segment unless the base ends with '/'.
        let base = Url::parse(&format!("{}/", api_base.trim_end_matches('/')))?;
        Ok(Self {
            client: Client::new(),
            base,
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base.join(path)?)
    }

    fn file_url(&self, filename: &str) -> Result<Url, ClientError> {
        let mut url = self.endpoint("download/")?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .push(filename);
        Ok(url)
    }
}

/// Turns a non-success response into [`ClientError::Status`], keeping the
/// server's `detail` when the body carries one.
async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let detail = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(ErrorBody::into_message);
    debug!("API error {}: {:?}", status, detail);
    Err(ClientError::Status {
        status: status.as_u16(),
        detail,
    })
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl DialogueApi for HttpDialogueApi {
    async fn detect_speakers(&self, dialogue_text: &str) -> Result<Vec<String>, ClientError> {
        let response = self
            .client
            .post(self.endpoint("detect-speakers")?)
            .json(&DialogueRequest { dialogue_text })
            .send()
            .await?;
        let body: SpeakersResponse = check(response).await?.json().await?;
        Ok(body.speakers)
    }

    async fn list_voices(&self) -> Result<Vec<String>, ClientError> {
        let response = self.client.get(self.endpoint("voices")?).send().await?;
        let body: VoicesResponse = check(response).await?.json().await?;
        Ok(body.voices)
    }

    async fn upload(&self, file: UploadFile) -> Result<String, ClientError> {
        debug!("Uploading {} ({} bytes)", file.name, file.bytes.len());
        let part = multipart::Part::bytes(file.bytes).file_name(file.name);
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.endpoint("upload")?)
            .multipart(form)
            .send()
            .await?;
        let body: UploadResponse = check(response).await?.json().await?;
        Ok(body.dialogue_text)
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<GenerationResult, ClientError> {
        let response = self
            .client
            .post(self.endpoint("generate")?)
            .json(request)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn history(&self) -> Result<Vec<HistoryEntry>, ClientError> {
        let response = self.client.get(self.endpoint("history")?).send().await?;
        let body: HistoryResponse = check(response).await?.json().await?;
        Ok(body.history)
    }

    async fn download(&self, filename: &str) -> Result<Vec<u8>, ClientError> {
        let response = self.client.get(self.file_url(filename)?).send().await?;
        let mut stream = check(response).await?.bytes_stream();

        let mut bytes = Vec::new();
        while let Some(chunk) = stream.next().await {
            bytes.extend_from_slice(&chunk?);
        }
        debug!("Downloaded {} ({} bytes)", filename, bytes.len());
        Ok(bytes)
    }

    fn download_url(&self, filename: &str) -> String {
        match self.file_url(filename) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}download/{}", self.base, filename),
        }
    }
}
