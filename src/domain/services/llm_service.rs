// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::settings::LlmSettings;
use crate::domain::models::generation::GenerationError;
use crate::domain::services::prompt_composer::ComposedPrompt;

/// 增量文本流
pub type DeltaStream = BoxStream<'static, Result<String, GenerationError>>;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// 对话消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// 补全请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
}

impl CompletionRequest {
    /// 由组合后的提示构造请求
    ///
    /// 有用户轮次时指令作为系统消息，否则指令本身就是唯一的用户消息
    pub fn from_prompt(prompt: &ComposedPrompt) -> Self {
        let messages = match &prompt.user_text {
            Some(user) => vec![
                ChatMessage::system(prompt.instruction.clone()),
                ChatMessage::user(user.clone()),
            ],
            None => vec![ChatMessage::user(prompt.instruction.clone())],
        };
        Self { messages }
    }
}

/// 补全服务特质
///
/// 两个调用都只做一次尝试，不自动重试
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// 缓冲模式：一次请求，返回完整补全文本
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GenerationError>;

    /// 流式模式：返回按到达顺序排列的增量文本流
    async fn complete_stream(
        &self,
        request: &CompletionRequest,
    ) -> Result<DeltaStream, GenerationError>;
}

/// 补全客户端配置错误
#[derive(Error, Debug)]
pub enum CompletionConfigError {
    #[error("LLM API key not configured")]
    MissingApiKey,
    #[error("Invalid LLM API base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// OpenAI 兼容的补全服务
///
/// # 配置
///
/// 通过 `LlmSettings` 显式构造：
/// - `api_key` - Bearer 凭证，缺失时构造失败
/// - `api_base_url` - API 基础 URL
/// - `model` / `max_tokens` / `temperature` - 两种模式共用的生成参数
/// - `timeout_secs` - 单次请求的最长等待时间
pub struct OpenAiCompletionService {
    client: reqwest::Client,
    api_key: String,
    endpoint: Url,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiCompletionService {
    pub fn new(settings: &LlmSettings) -> Result<Self, CompletionConfigError> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(CompletionConfigError::MissingApiKey)?;

        let base = Url::parse(&format!("{}/", settings.api_base_url.trim_end_matches('/')))?;
        let endpoint = base.join("chat/completions")?;

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key,
            endpoint,
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
        })
    }

    fn request_body(&self, request: &CompletionRequest, stream: bool) -> Value {
        json!({
            "model": self.model,
            "messages": request.messages,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "stream": stream,
        })
    }

    async fn send(
        &self,
        request: &CompletionRequest,
        stream: bool,
    ) -> Result<reqwest::Response, GenerationError> {
        info!(
            "Completion request to {} model={} stream={}",
            self.endpoint, self.model, stream
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&self.request_body(request, stream))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Completion API returned {}: {}", status, body);
            return Err(GenerationError::upstream(
                Some(status.as_u16()),
                upstream_error_message(status.as_u16(), &body),
            ));
        }

        Ok(response)
    }
}

#[async_trait]
impl CompletionService for OpenAiCompletionService {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GenerationError> {
        let response = self.send(request, false).await?;
        let body: Value = response.json().await.map_err(transport_error)?;

        if let Some(usage) = body.get("usage") {
            let usage = TokenUsage {
                prompt_tokens: usage["prompt_tokens"].as_u64().unwrap_or(0) as u32,
                completion_tokens: usage["completion_tokens"].as_u64().unwrap_or(0) as u32,
                total_tokens: usage["total_tokens"].as_u64().unwrap_or(0) as u32,
            };
            debug!("Completion token usage: {:?}", usage);
        }

        body["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                GenerationError::upstream(None, "Completion service returned no content")
            })
    }

    async fn complete_stream(
        &self,
        request: &CompletionRequest,
    ) -> Result<DeltaStream, GenerationError> {
        let response = self.send(request, true).await?;
        Ok(sse_delta_stream(response.bytes_stream().boxed()))
    }
}

fn transport_error(err: reqwest::Error) -> GenerationError {
    if err.is_timeout() {
        GenerationError::Timeout
    } else {
        GenerationError::upstream(None, format!("Request to completion service failed: {}", err))
    }
}

/// 从非成功响应体中提取上游错误消息
///
/// 响应体是结构化的 `{"error": {"message": ...}}` 时透传其消息，否则只报告状态码
pub fn upstream_error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .map(|msg| format!("Completion API error: {}", msg))
        .unwrap_or_else(|| format!("Completion API error (status {})", status))
}

/// SSE 行的解析结果
#[derive(Debug, PartialEq, Eq)]
pub enum SseLine {
    Delta(String),
    Done,
    Error(String),
    Ignore,
}

/// 解析 OpenAI 兼容流中的一行
pub fn parse_sse_line(line: &str) -> SseLine {
    let line = line.trim();
    let Some(data) = line.strip_prefix("data:") else {
        return SseLine::Ignore;
    };
    let data = data.trim_start();
    if data == "[DONE]" {
        return SseLine::Done;
    }

    let Ok(value) = serde_json::from_str::<Value>(data) else {
        return SseLine::Ignore;
    };
    if let Some(message) = value["error"]["message"].as_str() {
        return SseLine::Error(format!("Completion API error: {}", message));
    }
    match value["choices"][0]["delta"]["content"].as_str() {
        Some(delta) if !delta.is_empty() => SseLine::Delta(delta.to_string()),
        _ => SseLine::Ignore,
    }
}

/// 按换行切分字节流，保留跨块的不完整行（包括被切断的多字节字符）
#[derive(Debug, Default)]
struct LineDecoder {
    buffer: Vec<u8>,
}

impl LineDecoder {
    fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }

    fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            None
        } else {
            let rest = std::mem::take(&mut self.buffer);
            Some(String::from_utf8_lossy(&rest).into_owned())
        }
    }
}

struct SseState {
    body: BoxStream<'static, reqwest::Result<Bytes>>,
    decoder: LineDecoder,
    pending: VecDeque<Result<String, GenerationError>>,
    finished: bool,
}

impl SseState {
    fn accept(&mut self, line: &str) {
        if self.finished {
            return;
        }
        match parse_sse_line(line) {
            SseLine::Delta(delta) => self.pending.push_back(Ok(delta)),
            SseLine::Done => self.finished = true,
            SseLine::Error(message) => {
                self.pending
                    .push_back(Err(GenerationError::upstream(None, message)));
                self.finished = true;
            }
            SseLine::Ignore => {}
        }
    }
}

/// 把 SSE 字节流转换成增量文本流
///
/// 每个增量在其所在的行到达后立即产出，不等待整个响应
pub fn sse_delta_stream(body: BoxStream<'static, reqwest::Result<Bytes>>) -> DeltaStream {
    let state = SseState {
        body,
        decoder: LineDecoder::default(),
        pending: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }
            match state.body.next().await {
                Some(Ok(bytes)) => {
                    for line in state.decoder.push(&bytes) {
                        state.accept(&line);
                    }
                }
                Some(Err(err)) => {
                    state.pending.push_back(Err(transport_error(err)));
                    state.finished = true;
                }
                None => {
                    if let Some(line) = state.decoder.finish() {
                        state.accept(&line);
                    }
                    // Body closed before the [DONE] sentinel
                    if !state.finished {
                        warn!("Completion stream closed without end marker");
                        state.pending.push_back(Err(GenerationError::upstream(
                            None,
                            "Completion stream ended unexpectedly",
                        )));
                        state.finished = true;
                    }
                }
            }
        }
    })
    .boxed()
}
