use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::app::{LampstandError, Result};

/// Tokens buffered between the HTTP reader and the consumer.
const CHANNEL_CAPACITY: usize = 64;

/// Text generation collaborator producing an incremental token stream.
///
/// The stream ends when the sender is dropped. An `Err` item ends it early.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<mpsc::Receiver<Result<String>>>;
}

/// Await the end of a token stream and join the tokens.
pub async fn collect(mut tokens: mpsc::Receiver<Result<String>>) -> Result<String> {
    let mut text = String::new();
    while let Some(token) = tokens.recv().await {
        text.push_str(&token?);
    }
    Ok(text)
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// One NDJSON line of a streamed `/api/generate` response.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GenerateChunk {
    response: String,
    done: bool,
    error: Option<String>,
}

/// Generator backed by an Ollama server.
pub struct OllamaGenerator {
    client: Client,
    endpoint: String,
    model: String,
    timeout: Duration,
}

impl OllamaGenerator {
    /// `timeout` bounds the connection and every wait for the next chunk.
    pub fn new(endpoint: &str, model: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().connect_timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            timeout,
        })
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.endpoint)
    }
}

#[async_trait]
impl Generator for OllamaGenerator {
    async fn generate(&self, prompt: &str) -> Result<mpsc::Receiver<Result<String>>> {
        let body = serde_json::to_vec(&GenerateRequest {
            model: &self.model,
            prompt,
            stream: true,
        })?;

        let url = self.generate_url();
        let response = tokio::time::timeout(
            self.timeout,
            self.client
                .post(&url)
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body)
                .send(),
        )
        .await
        .map_err(|_| LampstandError::Transport(format!("{} timed out", url)))??;

        if !response.status().is_success() {
            return Err(LampstandError::Generation(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }

        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let timeout = self.timeout;

        tokio::spawn(async move {
            if let Err(e) = forward_stream(response, &tx, timeout).await {
                let _ = tx.send(Err(e)).await;
            }
        });

        Ok(rx)
    }
}

/// Split the body into lines and forward each `response` token until `done`.
async fn forward_stream(
    mut response: reqwest::Response,
    tx: &mpsc::Sender<Result<String>>,
    timeout: Duration,
) -> Result<()> {
    let mut pending = Vec::new();

    loop {
        let chunk = tokio::time::timeout(timeout, response.chunk())
            .await
            .map_err(|_| LampstandError::Transport("generation stalled".to_string()))??;

        let Some(chunk) = chunk else {
            // Last line may lack a trailing newline
            if !pending.is_empty() {
                handle_line(&pending, tx).await?;
            }
            return Ok(());
        };

        pending.extend_from_slice(&chunk);

        while let Some(newline) = pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = pending.drain(..=newline).collect();
            if handle_line(&line, tx).await? {
                return Ok(());
            }
        }
    }
}

/// Returns true once the stream reported `done`.
async fn handle_line(line: &[u8], tx: &mpsc::Sender<Result<String>>) -> Result<bool> {
    let line = String::from_utf8_lossy(line);
    let line = line.trim();
    if line.is_empty() {
        return Ok(false);
    }

    let chunk: GenerateChunk = match serde_json::from_str(line) {
        Ok(chunk) => chunk,
        Err(e) => {
            tracing::warn!("Skipping malformed generation line: {}", e);
            return Ok(false);
        }
    };

    if let Some(error) = chunk.error {
        return Err(LampstandError::Generation(error));
    }

    if !chunk.response.is_empty() && tx.send(Ok(chunk.response)).await.is_err() {
        // Receiver dropped; nobody is listening
        return Ok(true);
    }

    Ok(chunk.done)
}
