use std::collections::BTreeMap;
use std::time::Duration;

use bytes::Bytes;
use futures_util::{stream, Stream, StreamExt};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::backend::{Backend, TransferProgress};
use crate::{
    BackendError, Credential, FailureKind, FilePayload, SummaryPayload, TransferReceipt,
};

const TRANSFER_CHUNK: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct BackendSettings {
    /// Endpoint issuing upload credentials.
    pub credential_url: Url,
    /// Base for the notify and summary endpoints.
    pub api_base: Url,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl BackendSettings {
    pub fn new(credential_url: Url, api_base: Url) -> Self {
        Self {
            credential_url,
            api_base,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
        }
    }
}

#[derive(Debug, Serialize)]
struct CredentialRequest<'a> {
    #[serde(rename = "fileName")]
    file_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct CredentialResponse {
    url: String,
    #[serde(default)]
    fields: BTreeMap<String, String>,
    #[serde(default)]
    key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NotifyResponse {
    #[serde(default, rename = "objectKey")]
    object_key: Option<String>,
    #[serde(default)]
    fields: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    summary: String,
}

/// HTTP implementation of the upload protocol.
#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    settings: BackendSettings,
    client: reqwest::Client,
}

impl ReqwestBackend {
    pub fn new(settings: BackendSettings) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| BackendError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    /// `{api_base}/{segments...}`, each segment percent-encoded.
    fn api_url(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.settings.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| {
                BackendError::new(
                    FailureKind::InvalidUrl,
                    format!("{} cannot be a base url", self.settings.api_base),
                )
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, BackendError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = ensure_success(response)?;
        response.json::<T>().await.map_err(map_reqwest_error)
    }
}

#[async_trait::async_trait]
impl Backend for ReqwestBackend {
    async fn fetch_upload_credential(&self, file_name: &str) -> Result<Credential, BackendError> {
        let response = self
            .client
            .post(self.settings.credential_url.clone())
            .json(&CredentialRequest { file_name })
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = ensure_success(response)?;
        let body: CredentialResponse = response.json().await.map_err(map_reqwest_error)?;

        Ok(Credential {
            target_url: body.url,
            form_fields: body.fields,
            object_key_hint: body.key,
        })
    }

    async fn transfer(
        &self,
        credential: &Credential,
        payload: &FilePayload,
        progress: &dyn TransferProgress,
    ) -> Result<TransferReceipt, BackendError> {
        let target = Url::parse(&credential.target_url)
            .map_err(|err| BackendError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let total = payload.bytes.len() as u64;

        let (acked_tx, mut acked_rx) = tokio::sync::mpsc::unbounded_channel();
        let body = reqwest::Body::wrap_stream(acked_chunks(payload.bytes.clone(), acked_tx));
        let part = Part::stream_with_length(body, total)
            .file_name(payload.name.clone())
            .mime_str(&payload.mime_type)
            .map_err(|err| BackendError::new(FailureKind::InvalidRequest, err.to_string()))?;

        // Credential fields must precede the file part.
        let mut form = Form::new();
        for (key, value) in &credential.form_fields {
            form = form.text(key.clone(), value.clone());
        }
        let form = form.part("file", part);

        let request = self.client.post(target).multipart(form).send();
        tokio::pin!(request);
        let response = loop {
            tokio::select! {
                Some(acked) = acked_rx.recv() => progress.acked(acked, total),
                result = &mut request => break result.map_err(map_reqwest_error)?,
            }
        };
        ensure_success(response)?;

        Ok(TransferReceipt {
            object_key: credential
                .form_fields
                .get("key")
                .cloned()
                .or_else(|| credential.object_key_hint.clone()),
        })
    }

    async fn notify(&self, file_name: &str) -> Result<String, BackendError> {
        let url = self.api_url(&["v1", "notify", file_name])?;
        let body: NotifyResponse = self.get_json(url).await?;
        body.object_key
            .or_else(|| body.fields.get("key").cloned())
            .ok_or_else(|| {
                BackendError::new(
                    FailureKind::MissingObjectKey,
                    format!("notify for {file_name} returned no object key"),
                )
            })
    }

    async fn trigger_summary(&self, object_key: &str) -> Result<SummaryPayload, BackendError> {
        let url = self.api_url(&["v2", "sum", object_key])?;
        let body: SummaryResponse = self.get_json(url).await?;
        Ok(SummaryPayload {
            summary: body.summary,
        })
    }
}

/// Splits the payload into chunks and reports the running byte count as the
/// transport pulls each one.
fn acked_chunks(
    bytes: Bytes,
    acked_tx: tokio::sync::mpsc::UnboundedSender<u64>,
) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send + 'static {
    let total = bytes.len();
    let chunks: Vec<Bytes> = (0..total)
        .step_by(TRANSFER_CHUNK)
        .map(|start| bytes.slice(start..(start + TRANSFER_CHUNK).min(total)))
        .collect();
    let mut acked = 0u64;
    stream::iter(chunks).map(move |chunk| {
        acked += chunk.len() as u64;
        let _ = acked_tx.send(acked);
        Ok(chunk)
    })
}

fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(BackendError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        ))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        return BackendError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return BackendError::new(FailureKind::InvalidResponse, err.to_string());
    }
    BackendError::new(FailureKind::Network, err.to_string())
}
