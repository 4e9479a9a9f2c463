// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::models::chat_app::{ChatApp, ChatAppId, ChatAppSummary};

/// 生成响应数据传输对象
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GenerateChatAppResponseDto {
    /// 生成或已存储的 HTML
    pub html: String,
    /// 应用标识符
    pub id: ChatAppId,
}

/// 列表项
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ChatAppSummaryDto {
    pub id: ChatAppId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub preview: String,
}

impl From<ChatAppSummary> for ChatAppSummaryDto {
    fn from(summary: ChatAppSummary) -> Self {
        Self {
            id: summary.id,
            title: summary.title,
            created_at: summary.created_at,
            preview: summary.preview,
        }
    }
}

/// 应用详情
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ChatAppDetailDto {
    pub id: ChatAppId,
    pub title: String,
    pub html_content: String,
    pub prompt_used: String,
    pub created_at: DateTime<Utc>,
}

impl From<ChatApp> for ChatAppDetailDto {
    fn from(app: ChatApp) -> Self {
        Self {
            id: app.id,
            title: app.title,
            html_content: app.content,
            prompt_used: app.provenance,
            created_at: app.created_at,
        }
    }
}
