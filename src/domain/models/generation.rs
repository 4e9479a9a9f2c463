// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::chat_app::ChatAppId;

/// 生成流程错误类型
///
/// 每个对外可见的失败都归入以下分类之一
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    /// 输入错误，例如标识符格式错误
    #[error("{0}")]
    InvalidInput(String),

    /// 资源未找到：应用不存在或提示资源缺失
    #[error("{0}")]
    NotFound(String),

    /// 上游补全服务返回非成功状态或传输失败
    #[error("{message}")]
    Upstream {
        /// 上游 HTTP 状态码，传输层失败时为空
        status: Option<u16>,
        message: String,
    },

    /// 上游补全服务超时
    #[error("Request to completion service timed out")]
    Timeout,

    /// 内部错误，例如存储故障；详细信息只记录在服务端日志中
    #[error("{0}")]
    Internal(String),

    /// 调用方在流式传输过程中断开连接
    #[error("Client disconnected")]
    Cancelled,
}

impl GenerationError {
    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }

    /// 对外展示的消息，内部错误不泄露细节
    pub fn public_message(&self) -> String {
        match self {
            Self::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

/// 生成模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    /// 单次请求、单次响应
    Buffered,
    /// 增量令牌流
    Streaming,
}

impl GenerationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buffered => "buffered",
            Self::Streaming => "streaming",
        }
    }
}

/// 流式生成事件帧
///
/// 每个请求的事件序列为 `start → (progress)* → {complete | error}`，
/// 且只会出现一个终止帧
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GenerationEvent {
    Start {
        message: String,
    },
    Progress {
        /// 本次到达的增量文本
        delta: String,
        /// 累计字符数
        length: usize,
    },
    Complete {
        content: String,
        length: usize,
        id: ChatAppId,
    },
    Error {
        message: String,
    },
}

impl GenerationEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::Error { .. })
    }
}
