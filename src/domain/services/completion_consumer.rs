// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;

use futures::StreamExt;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

use crate::domain::models::chat_app::ChatAppId;
use crate::domain::models::generation::{GenerationError, GenerationEvent};
use crate::domain::services::llm_service::{CompletionRequest, CompletionService};
use crate::domain::services::markdown_sanitizer;

/// 流式请求所处阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamPhase {
    Idle,
    Started,
    Completed,
    Failed,
}

impl StreamPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// 事件发送错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// 接收端已经释放，调用方断开了连接
    #[error("Event receiver closed")]
    Closed,
    /// 非法的阶段转换
    #[error("Invalid stream transition from {0:?}")]
    InvalidTransition(StreamPhase),
}

impl From<SinkError> for GenerationError {
    fn from(err: SinkError) -> Self {
        match err {
            SinkError::Closed => GenerationError::Cancelled,
            SinkError::InvalidTransition(_) => GenerationError::Internal(err.to_string()),
        }
    }
}

/// 生成事件的发送端
///
/// 强制执行 `idle → started → (progress)* → {complete | error}` 状态机：
/// 终止之后拒绝任何事件，因此每个请求最多发出一个终止帧
pub struct EventSink {
    tx: mpsc::Sender<GenerationEvent>,
    phase: StreamPhase,
}

impl EventSink {
    pub fn new(tx: mpsc::Sender<GenerationEvent>) -> Self {
        Self {
            tx,
            phase: StreamPhase::Idle,
        }
    }

    /// 创建有界通道，容量决定生产者最多领先消费者多少帧
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<GenerationEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }

    pub fn phase(&self) -> StreamPhase {
        self.phase
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// 等待接收端关闭
    pub async fn closed(&self) {
        self.tx.closed().await
    }

    pub async fn start(&mut self, message: impl Into<String>) -> Result<(), SinkError> {
        self.expect(&[StreamPhase::Idle])?;
        self.emit(
            GenerationEvent::Start {
                message: message.into(),
            },
            StreamPhase::Started,
        )
        .await
    }

    pub async fn progress(&mut self, delta: String, length: usize) -> Result<(), SinkError> {
        self.expect(&[StreamPhase::Started])?;
        self.emit(GenerationEvent::Progress { delta, length }, StreamPhase::Started)
            .await
    }

    pub async fn complete(&mut self, content: String, id: ChatAppId) -> Result<(), SinkError> {
        self.expect(&[StreamPhase::Started])?;
        let length = content.chars().count();
        self.emit(
            GenerationEvent::Complete {
                content,
                length,
                id,
            },
            StreamPhase::Completed,
        )
        .await
    }

    pub async fn fail(&mut self, message: impl Into<String>) -> Result<(), SinkError> {
        self.expect(&[StreamPhase::Idle, StreamPhase::Started])?;
        self.emit(
            GenerationEvent::Error {
                message: message.into(),
            },
            StreamPhase::Failed,
        )
        .await
    }

    fn expect(&self, allowed: &[StreamPhase]) -> Result<(), SinkError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(SinkError::InvalidTransition(self.phase))
        }
    }

    async fn emit(&mut self, event: GenerationEvent, next: StreamPhase) -> Result<(), SinkError> {
        match self.tx.send(event).await {
            Ok(()) => {
                self.phase = next;
                Ok(())
            }
            Err(_) => {
                // Nobody is listening any more, so nothing else may be emitted
                self.phase = StreamPhase::Failed;
                Err(SinkError::Closed)
            }
        }
    }
}

/// 流式补全的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamedCompletion {
    /// 清理并截断后的最终内容
    pub content: String,
    /// 收到的增量数量
    pub deltas: usize,
    /// 原始累计字符数
    pub raw_length: usize,
}

/// 补全消费者
///
/// 驱动补全服务的请求，把原始输出转换成可持久化的 HTML
pub struct CompletionConsumer {
    service: Arc<dyn CompletionService>,
}

impl CompletionConsumer {
    pub fn new(service: Arc<dyn CompletionService>) -> Self {
        Self { service }
    }

    /// 缓冲模式：一次请求，返回清理后的内容
    pub async fn consume_buffered(
        &self,
        request: &CompletionRequest,
    ) -> Result<String, GenerationError> {
        let raw = self.service.complete(request).await?;
        Ok(markdown_sanitizer::sanitize(&raw))
    }

    /// 流式模式：逐个转发增量，流结束后清理并截断累计内容
    ///
    /// 每个增量在等待下一个增量之前就已转发给调用方；调用方断开时立即停止读取上游，
    /// 返回 `GenerationError::Cancelled`，累计内容随之丢弃
    pub async fn consume_stream(
        &self,
        request: &CompletionRequest,
        sink: &mut EventSink,
    ) -> Result<StreamedCompletion, GenerationError> {
        let mut deltas = self.service.complete_stream(request).await?;
        let mut accumulated = String::new();
        let mut length = 0usize;
        let mut count = 0usize;

        loop {
            let next = tokio::select! {
                _ = sink.closed() => return Err(GenerationError::Cancelled),
                next = deltas.next() => next,
            };
            let Some(delta) = next else {
                break;
            };
            let delta = delta?;

            length += delta.chars().count();
            count += 1;
            accumulated.push_str(&delta);
            sink.progress(delta, length).await?;
        }

        debug!("Stream exhausted after {} deltas, {} chars", count, length);

        Ok(StreamedCompletion {
            content: markdown_sanitizer::finalize_streamed(&accumulated),
            deltas: count,
            raw_length: length,
        })
    }
}
