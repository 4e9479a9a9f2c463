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

use axum::{
    extract::{Extension, Json, Path, Query},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::{stream, Stream, StreamExt};
use std::sync::Arc;
use tracing::debug;
use validator::Validate;

use crate::{
    application::{
        dto::{
            generate_request::GenerateChatAppQuery,
            generate_response::{ChatAppDetailDto, ChatAppSummaryDto, GenerateChatAppResponseDto},
        },
        use_cases::{
            browse_chat_apps::BrowseChatAppsUseCase,
            generate_chat_app::{GenerateChatAppUseCase, GenerateParams},
        },
    },
    domain::{models::generation::GenerationEvent, services::completion_consumer::EventSink},
    presentation::{errors::AppError, extractors::owner::OwnerCookie},
};

/// 生成器最多领先客户端的事件帧数
const STREAM_BUFFER: usize = 32;

/// 生成或取回聊天应用（缓冲模式）
///
/// `GET /generate-chat-app?cur=<id>&theme=<text>`，返回 `{"html": ..., "id": ...}`
pub async fn generate_chat_app(
    Extension(use_case): Extension<Arc<GenerateChatAppUseCase>>,
    OwnerCookie(owner): OwnerCookie,
    Query(query): Query<GenerateChatAppQuery>,
) -> Result<Json<GenerateChatAppResponseDto>, AppError> {
    debug!("generate_chat_app called with {:?}", query);
    let query = query.trimmed();
    query.validate()?;

    let generated = use_case
        .execute(GenerateParams::from_query(query, owner))
        .await?;

    Ok(Json(GenerateChatAppResponseDto {
        html: generated.content,
        id: generated.id,
    }))
}

/// 生成聊天应用（流式模式）
///
/// `GET /generate-chat-app/stream?cur=<id>&theme=<text>`，以 SSE 帧推送 `GenerationEvent`。
/// 参数校验失败时在流开始前返回 400；流开始后的失败以 `error` 帧交付。
pub async fn stream_chat_app(
    Extension(use_case): Extension<Arc<GenerateChatAppUseCase>>,
    OwnerCookie(owner): OwnerCookie,
    Query(query): Query<GenerateChatAppQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, AppError> {
    let query = query.trimmed();
    query.validate()?;
    let params = GenerateParams::from_query(query, owner);

    let (sink, rx) = EventSink::channel(STREAM_BUFFER);
    tokio::spawn(async move {
        use_case.execute_stream(params, sink).await;
    });

    // Dropping this stream (client gone) closes the channel and stops the generator
    let frames = stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|event| (event, rx))
    })
    .map(|event| sse_frame(&event));

    Ok(Sse::new(frames).keep_alive(KeepAlive::default()))
}

/// 把事件编码为 SSE 帧：`data: <json>`
pub fn sse_frame(event: &GenerationEvent) -> Result<Event, axum::Error> {
    Event::default().json_data(event)
}

/// 列出聊天应用
///
/// 携带所有者 cookie 时只列出该所有者的应用，否则列出全部
pub async fn list_chat_apps(
    Extension(use_case): Extension<Arc<BrowseChatAppsUseCase>>,
    OwnerCookie(owner): OwnerCookie,
) -> Result<Json<Vec<ChatAppSummaryDto>>, AppError> {
    let summaries = use_case.list(owner.as_ref()).await?;
    Ok(Json(summaries.into_iter().map(Into::into).collect()))
}

/// 获取单个聊天应用详情
pub async fn get_chat_app(
    Extension(use_case): Extension<Arc<BrowseChatAppsUseCase>>,
    Path(id): Path<String>,
) -> Result<Json<ChatAppDetailDto>, AppError> {
    let app = use_case.get(&id).await?;
    Ok(Json(app.into()))
}
