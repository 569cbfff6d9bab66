use super::LlmBackend;
use crate::config::{LlmProvider, ModelConfig};
use crate::llm::{CompletionDelta, CompletionStream, LlmResponse};
use crate::stream::ToolCallChunk;
use async_trait::async_trait;
use futures_util::StreamExt;
use querent_core::{ConversationMessage, QuerentError, QuerentResult, Role, ToolCall};
use querent_skills::SkillDescriptor;
use std::collections::BTreeMap;
use tokio::sync::mpsc;
use tracing::debug;

/// OpenAI-compatible chat-completions backend.
///
/// Works with Zhipu, OpenAI, OpenRouter, Groq, and any other provider that
/// implements the `/chat/completions` API.
pub struct OpenAiBackend {
    config: ModelConfig,
    api_key: String,
    http: reqwest::Client,
}

impl OpenAiBackend {
    /// Backend for `config`, authenticating with `api_key`.
    pub fn new(config: ModelConfig, api_key: String) -> Self {
        Self {
            config,
            api_key,
            http: reqwest::Client::new(),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url())
    }

    fn build_body(
        &self,
        messages: &[ConversationMessage],
        tools: &[SkillDescriptor],
        stream: bool,
    ) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.config.model_id,
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
            "messages": build_messages(messages),
        });

        if !tools.is_empty() {
            body["tools"] = serde_json::Value::Array(build_tools(tools));
        }
        if stream {
            body["stream"] = serde_json::Value::Bool(true);
        }

        body
    }

    fn add_provider_headers(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json");

        // OpenRouter requires extra headers
        if matches!(self.config.provider, LlmProvider::OpenRouter) {
            request
                .header("HTTP-Referer", "https://github.com/querent/querent")
                .header("X-Title", "Querent")
        } else {
            request
        }
    }

    async fn send(&self, body: &serde_json::Value) -> QuerentResult<reqwest::Response> {
        let request = self.add_provider_headers(self.http.post(self.completions_url()));
        request
            .json(body)
            .send()
            .await
            .map_err(|e| QuerentError::Http(e.to_string()))
    }
}

/// Convert the conversation to the chat-completions message schema.
pub fn build_messages(messages: &[ConversationMessage]) -> Vec<serde_json::Value> {
    messages
        .iter()
        .map(|m| match m.role {
            Role::Assistant if !m.tool_calls.is_empty() => serde_json::json!({
                "role": "assistant",
                "content": m.content,
                "tool_calls": m.tool_calls.iter().map(|call| serde_json::json!({
                    "id": call.id,
                    "type": "function",
                    "function": {
                        "name": call.name,
                        "arguments": call.arguments.to_string(),
                    }
                })).collect::<Vec<_>>(),
            }),
            Role::Tool => serde_json::json!({
                "role": "tool",
                "content": m.content,
                "tool_call_id": m.tool_call_id.clone().unwrap_or_default(),
            }),
            role => serde_json::json!({
                "role": role.as_str(),
                "content": m.content,
            }),
        })
        .collect()
}

fn build_tools(tools: &[SkillDescriptor]) -> Vec<serde_json::Value> {
    tools
        .iter()
        .map(|t| {
            serde_json::json!({
                "type": "function",
                "function": {
                    "name": t.name,
                    "description": t.description,
                    "parameters": t.parameters_schema,
                }
            })
        })
        .collect()
}

/// Arguments arrive as a JSON-encoded string; malformed ones become `{}`.
fn parse_arguments(raw: &str) -> serde_json::Value {
    if raw.trim().is_empty() {
        return serde_json::json!({});
    }
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::json!({}))
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    async fn chat(
        &self,
        messages: &[ConversationMessage],
        tools: &[SkillDescriptor],
    ) -> QuerentResult<LlmResponse> {
        let body = self.build_body(messages, tools, false);
        let resp = self.send(&body).await?;

        let status = resp.status();
        let resp_body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| QuerentError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(QuerentError::Http(format!(
                "chat completions API error {status}: {resp_body}"
            )));
        }

        parse_openai_response(&resp_body)
    }

    async fn chat_stream(
        &self,
        messages: &[ConversationMessage],
        tools: &[SkillDescriptor],
    ) -> QuerentResult<CompletionStream> {
        let body = self.build_body(messages, tools, true);
        let resp = self.send(&body).await?;

        let status = resp.status();
        if !status.is_success() {
            let error_body = resp
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(QuerentError::Http(format!(
                "chat completions API error {status}: {error_body}"
            )));
        }

        let (tx, rx) = mpsc::channel::<CompletionDelta>(256);
        let mut byte_stream = resp.bytes_stream();

        let handle = tokio::spawn(async move {
            let mut lines = SseLineBuffer::default();
            let mut acc = SseAccumulator::default();

            while let Some(chunk_result) = byte_stream.next().await {
                let chunk =
                    chunk_result.map_err(|e| QuerentError::Http(format!("Stream read error: {e}")))?;

                for line in lines.push(&chunk) {
                    for delta in acc.feed_line(line.trim()) {
                        let _ = tx.send(delta).await;
                    }
                }
            }

            // A final line without a trailing newline.
            if let Some(line) = lines.finish() {
                for delta in acc.feed_line(line.trim()) {
                    let _ = tx.send(delta).await;
                }
            }

            Ok::<_, QuerentError>(acc.finish())
        });

        Ok((rx, handle))
    }
}

/// Splits a chunked byte stream into complete lines.
///
/// Bytes are held until a newline arrives, so a multi-byte character cut
/// across two network chunks is decoded whole.
#[derive(Debug, Default)]
pub struct SseLineBuffer {
    pending: Vec<u8>,
}

impl SseLineBuffer {
    /// Append `chunk` and return every line it completed, newline stripped.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(line_end) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=line_end).collect();
            lines.push(String::from_utf8_lossy(&line[..line_end]).into_owned());
        }
        lines
    }

    /// Whatever is left once the stream ends.
    pub fn finish(self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(&self.pending).into_owned())
        }
    }
}

/// Folds server-sent `data:` lines into deltas and the final turn.
#[derive(Debug, Default)]
pub struct SseAccumulator {
    text: String,
    /// index → (id, name, arguments)
    tool_calls: BTreeMap<u32, (String, String, String)>,
}

impl SseAccumulator {
    /// Parse one SSE line. Comments, blanks and `[DONE]` yield nothing.
    pub fn feed_line(&mut self, line: &str) -> Vec<CompletionDelta> {
        let Some(data) = line.strip_prefix("data:").map(str::trim) else {
            return Vec::new();
        };
        if data.is_empty() || data == "[DONE]" {
            return Vec::new();
        }

        let event: serde_json::Value = match serde_json::from_str(data) {
            Ok(v) => v,
            Err(e) => {
                debug!(error = %e, "Skipping unparseable stream line");
                return Vec::new();
            }
        };

        let delta = &event["choices"][0]["delta"];
        let mut out = Vec::new();

        if let Some(content) = delta["content"].as_str() {
            if !content.is_empty() {
                self.text.push_str(content);
                out.push(CompletionDelta::Text(content.to_string()));
            }
        }

        if let Some(tc_array) = delta["tool_calls"].as_array() {
            for tc in tc_array {
                let index = tc["index"].as_u64().unwrap_or(0) as u32;
                let id = tc["id"].as_str().map(str::to_string);
                let name = tc["function"]["name"].as_str().map(str::to_string);
                let arguments = tc["function"]["arguments"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string();

                let entry = self.tool_calls.entry(index).or_default();
                if let Some(id) = &id {
                    entry.0.clone_from(id);
                }
                if let Some(name) = &name {
                    entry.1.push_str(name);
                }
                entry.2.push_str(&arguments);

                out.push(CompletionDelta::ToolCall(ToolCallChunk {
                    index,
                    id,
                    name,
                    arguments,
                }));
            }
        }

        out
    }

    /// The assembled turn: plain text, or text plus tool calls in index order.
    pub fn finish(self) -> LlmResponse {
        if self.tool_calls.is_empty() {
            return LlmResponse::Done(self.text);
        }

        let tool_calls = self
            .tool_calls
            .into_values()
            .map(|(id, name, args)| ToolCall {
                id,
                name,
                arguments: parse_arguments(&args),
            })
            .collect();

        LlmResponse::ToolUse {
            content: if self.text.is_empty() {
                None
            } else {
                Some(self.text)
            },
            tool_calls,
        }
    }
}

/// Parse a non-streaming completion body.
pub fn parse_openai_response(body: &serde_json::Value) -> QuerentResult<LlmResponse> {
    let message = body["choices"]
        .get(0)
        .map(|choice| &choice["message"])
        .ok_or_else(|| QuerentError::Upstream(format!("completion has no choices: {body}")))?;
    let content = message["content"].as_str().unwrap_or_default().to_string();

    let tool_calls: Vec<ToolCall> = message["tool_calls"]
        .as_array()
        .map(|calls| {
            calls
                .iter()
                .filter_map(|tc| {
                    Some(ToolCall {
                        id: tc["id"].as_str()?.to_string(),
                        name: tc["function"]["name"].as_str()?.to_string(),
                        arguments: parse_arguments(tc["function"]["arguments"].as_str()?),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    if tool_calls.is_empty() {
        Ok(LlmResponse::Done(content))
    } else {
        Ok(LlmResponse::ToolUse {
            content: if content.is_empty() {
                None
            } else {
                Some(content)
            },
            tool_calls,
        })
    }
}
