//! Streaming relay to the hosted Gemini generative-language API.
//!
//! One `GeminiChat` holds a multi-turn session: each call sends the
//! accumulated history plus the new question and streams the reply back
//! over an mpsc channel. Transport and API failures never escape the
//! relay; the channel receives a single synthetic fragment carrying the
//! fixed error message instead.

use anyhow::{anyhow, Result};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::constants::{GEMINI_API_URL, GEMINI_ERROR_MESSAGE, GEMINI_MODEL, GOOGLE_API_KEY};

#[derive(Debug, Clone, PartialEq)]
pub enum GeminiEvent {
    /// One streamed chunk of reply text.
    Fragment { text: String },
    /// The turn is over; no further events follow.
    End,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

pub struct GeminiChat {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    history: Vec<Content>,
}

impl GeminiChat {
    /// Build a session from `GOOGLE_API_KEY` and friends. A missing key
    /// is an initialization failure, reported once by the caller.
    pub fn from_env() -> Result<Self> {
        if GOOGLE_API_KEY.is_empty() {
            return Err(anyhow!("GOOGLE_API_KEY is not set"));
        }
        Ok(Self::new(
            GEMINI_API_URL.clone(),
            GOOGLE_API_KEY.clone(),
            GEMINI_MODEL.clone(),
        ))
    }

    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
            model,
            history: Vec::new(),
        }
    }

    /// Number of (user, model) turns accumulated so far.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Relay `question` and forward reply fragments over `tx`. Always
    /// terminates the turn with [`GeminiEvent::End`]. Relay failures are
    /// absorbed: the channel gets one fragment with the fixed error text
    /// and this function still returns `Ok`.
    pub async fn send_message_stream(
        &mut self,
        question: &str,
        tx: mpsc::Sender<GeminiEvent>,
    ) -> Result<()> {
        match self.stream_turn(question, &tx).await {
            Ok(reply) => {
                // Only successful turns become part of the session history.
                self.history.push(Content {
                    role: "user".to_string(),
                    parts: vec![Part {
                        text: question.to_string(),
                    }],
                });
                self.history.push(Content {
                    role: "model".to_string(),
                    parts: vec![Part { text: reply }],
                });
            }
            Err(e) => {
                warn!("Gemini relay failed: {:?}", e);
                let _ = tx
                    .send(GeminiEvent::Fragment {
                        text: GEMINI_ERROR_MESSAGE.to_string(),
                    })
                    .await;
            }
        }
        let _ = tx.send(GeminiEvent::End).await;
        Ok(())
    }

    /// Run one streamed request, forwarding fragments as they arrive and
    /// returning the concatenated reply text.
    async fn stream_turn(&self, question: &str, tx: &mpsc::Sender<GeminiEvent>) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse&key={}",
            self.base_url, self.model, self.api_key
        );

        let mut contents = self.history.clone();
        contents.push(Content {
            role: "user".to_string(),
            parts: vec![Part {
                text: question.to_string(),
            }],
        });

        info!("Relaying chat turn to {} ({} prior turns)", self.model, self.history.len());
        let response = self
            .client
            .post(&url)
            .json(&GenerateRequest { contents })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Gemini API error {}: {}", status, body));
        }

        let mut stream = response.bytes_stream();
        let mut line_buf = String::new();
        let mut reply = String::new();

        while let Some(chunk) = stream.next().await {
            let bytes = chunk?;
            line_buf.push_str(&String::from_utf8_lossy(&bytes));

            // SSE events are newline-delimited; a chunk may end mid-line,
            // so only complete lines are consumed here.
            while let Some(pos) = line_buf.find('\n') {
                let line = line_buf[..pos].trim().to_string();
                line_buf.drain(..=pos);
                if line.is_empty() {
                    continue;
                }
                let Some(data) = line.strip_prefix("data:") else {
                    debug!("Skipping non-data SSE line: {}", line);
                    continue;
                };
                let data = data.trim();
                if data == "[DONE]" {
                    continue;
                }
                match serde_json::from_str::<StreamChunk>(data) {
                    Ok(parsed) => {
                        if let Some(text) = fragment_text(&parsed) {
                            reply.push_str(&text);
                            tx.send(GeminiEvent::Fragment { text }).await.ok();
                        }
                    }
                    Err(e) => {
                        warn!("Failed to parse stream chunk: {} - Error: {}", data, e);
                    }
                }
            }
        }

        Ok(reply)
    }
}

/// Pull the text payload out of one streamed chunk, if it carries any.
fn fragment_text(chunk: &StreamChunk) -> Option<String> {
    let content = chunk.candidates.first()?.content.as_ref()?;
    let text: String = content.parts.iter().map(|p| p.text.as_str()).collect();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
