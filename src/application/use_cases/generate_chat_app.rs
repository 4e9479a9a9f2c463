// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::Arc;

use chrono::Local;
use tracing::{error, info, info_span, warn, Instrument, Span};
use uuid::Uuid;

use crate::{
    application::dto::generate_request::GenerateChatAppQuery,
    domain::{
        models::{
            chat_app::{ChatAppId, NewChatApp, Owner},
            generation::{GenerationError, GenerationMode},
        },
        repositories::{
            chat_app_repository::ChatAppRepository,
            prompt_resource_repository::PromptResourceRepository,
        },
        services::{
            completion_consumer::{CompletionConsumer, EventSink},
            llm_service::{CompletionRequest, CompletionService},
            markdown_sanitizer,
            prompt_composer::{ComposedPrompt, PromptComposer, PromptVariant},
        },
    },
    infrastructure::metrics,
};

/// 生成参数
#[derive(Debug, Default, Clone)]
pub struct GenerateParams {
    /// 已存在应用的原始标识符，尚未解析
    pub existing_id: Option<String>,
    /// 主题，已去除首尾空白
    pub theme: String,
    pub owner: Option<Owner>,
}

impl GenerateParams {
    pub fn from_query(query: GenerateChatAppQuery, owner: Option<Owner>) -> Self {
        Self {
            existing_id: query
                .cur
                .map(|cur| cur.trim().to_string())
                .filter(|cur| !cur.is_empty()),
            theme: query
                .theme
                .map(|theme| theme.trim().to_string())
                .unwrap_or_default(),
            owner,
        }
    }
}

/// 生成结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedChatApp {
    pub id: ChatAppId,
    pub content: String,
}

/// 解析应用标识符
pub fn parse_chat_app_id(raw: &str) -> Result<ChatAppId, GenerationError> {
    raw.trim()
        .parse::<ChatAppId>()
        .map_err(|_| GenerationError::InvalidInput("Invalid ID".to_string()))
}

/// 每次生成请求的追踪 span，`generation_id` 用于串联同一请求的日志
fn generation_span(mode: GenerationMode) -> Span {
    info_span!(
        "generation",
        generation_id = %Uuid::new_v4(),
        mode = mode.as_str()
    )
}

// === Section: Use Case Definition ===

/// 生成聊天应用用例
///
/// 决定“取回已有”还是“生成新的”，串联提示组合、补全消费与存储
pub struct GenerateChatAppUseCase {
    repository: Arc<dyn ChatAppRepository>,
    resources: Arc<dyn PromptResourceRepository>,
    consumer: CompletionConsumer,
}

// === Section: Implementation ===

impl GenerateChatAppUseCase {
    pub fn new(
        repository: Arc<dyn ChatAppRepository>,
        resources: Arc<dyn PromptResourceRepository>,
        completion: Arc<dyn CompletionService>,
    ) -> Self {
        Self {
            repository,
            resources,
            consumer: CompletionConsumer::new(completion),
        }
    }

    /// 缓冲模式：返回完整的内容和标识符
    pub async fn execute(&self, params: GenerateParams) -> Result<GeneratedChatApp, GenerationError> {
        let span = generation_span(GenerationMode::Buffered);
        let result = self.execute_inner(params).instrument(span).await;
        metrics::record_generation(GenerationMode::Buffered, outcome(&result));
        result
    }

    /// 流式模式：通过 `sink` 发出 `start → progress* → complete | error`
    ///
    /// 从不返回错误；流开始之后的所有失败都以终止 `error` 帧交付
    pub async fn execute_stream(&self, params: GenerateParams, mut sink: EventSink) {
        let span = generation_span(GenerationMode::Streaming);
        async move {
            if sink.start("Starting generation...").await.is_err() {
                info!("Client went away before the stream started");
                metrics::record_generation(GenerationMode::Streaming, "cancelled");
                return;
            }

            let result = self.stream_inner(params, &mut sink).await;
            metrics::record_generation(GenerationMode::Streaming, outcome(&result));

            match result {
                Ok(()) => {}
                Err(GenerationError::Cancelled) => {
                    info!("Client disconnected mid-stream; partial content discarded");
                }
                Err(err) => {
                    if sink.fail(err.public_message()).await.is_err() {
                        warn!("Could not deliver error frame: {}", err);
                    }
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn execute_inner(&self, params: GenerateParams) -> Result<GeneratedChatApp, GenerationError> {
        if let Some(raw_id) = params.existing_id.as_deref() {
            return self.fetch_existing(raw_id).await;
        }

        let prompt = self.compose(PromptVariant::Inline, &params.theme).await?;
        let content = self
            .consumer
            .consume_buffered(&CompletionRequest::from_prompt(&prompt))
            .await
            .inspect_err(log_failure)?;
        let content = non_empty(content)?;

        let id = self.persist(&content, &prompt, params.owner).await?;
        Ok(GeneratedChatApp { id, content })
    }

    async fn stream_inner(
        &self,
        params: GenerateParams,
        sink: &mut EventSink,
    ) -> Result<(), GenerationError> {
        if let Some(raw_id) = params.existing_id.as_deref() {
            let app = self.fetch_existing(raw_id).await?;
            sink.complete(app.content, app.id).await?;
            return Ok(());
        }

        let prompt = self.compose(PromptVariant::Chat, &params.theme).await?;
        let streamed = self
            .consumer
            .consume_stream(&CompletionRequest::from_prompt(&prompt), sink)
            .await
            .inspect_err(log_failure)?;
        let content = non_empty(streamed.content)?;

        if sink.is_closed() {
            return Err(GenerationError::Cancelled);
        }

        let id = self.persist(&content, &prompt, params.owner).await?;
        sink.complete(content, id).await?;
        Ok(())
    }

    async fn fetch_existing(&self, raw_id: &str) -> Result<GeneratedChatApp, GenerationError> {
        let id = parse_chat_app_id(raw_id)?;
        let app = self
            .repository
            .find_by_id(id)
            .await
            .map_err(GenerationError::from)
            .inspect_err(log_failure)?
            .ok_or_else(|| GenerationError::NotFound("Chat app not found".to_string()))?;

        info!("Serving stored chat app {}", app.id);
        Ok(GeneratedChatApp {
            id: app.id,
            content: app.content,
        })
    }

    async fn compose(
        &self,
        variant: PromptVariant,
        theme: &str,
    ) -> Result<ComposedPrompt, GenerationError> {
        PromptComposer::compose_from(self.resources.as_ref(), variant, theme)
            .await
            .inspect_err(log_failure)
    }

    async fn persist(
        &self,
        content: &str,
        prompt: &ComposedPrompt,
        owner: Option<Owner>,
    ) -> Result<ChatAppId, GenerationError> {
        let title = markdown_sanitizer::derive_title(content, Local::now());
        let app = NewChatApp::new(title, content, prompt.provenance(), owner);

        self.repository
            .save(app)
            .await
            .map_err(GenerationError::from)
            .inspect_err(log_failure)
    }
}

fn non_empty(content: String) -> Result<String, GenerationError> {
    if content.trim().is_empty() {
        Err(GenerationError::upstream(
            None,
            "Completion service returned no content",
        ))
    } else {
        Ok(content)
    }
}

fn outcome<T>(result: &Result<T, GenerationError>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(GenerationError::Cancelled) => "cancelled",
        Err(GenerationError::InvalidInput(_)) | Err(GenerationError::NotFound(_)) => "rejected",
        Err(GenerationError::Upstream { .. }) | Err(GenerationError::Timeout) => "upstream_error",
        Err(GenerationError::Internal(_)) => "internal_error",
    }
}

fn log_failure(err: &GenerationError) {
    match err {
        GenerationError::Internal(detail) => error!("Generation failed internally: {}", detail),
        GenerationError::Upstream { .. } | GenerationError::Timeout => {
            warn!("Completion service failure: {}", err)
        }
        _ => {}
    }
}
