// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;

use tracing::error;

use crate::application::use_cases::generate_chat_app::parse_chat_app_id;
use crate::domain::models::chat_app::{ChatApp, ChatAppSummary, Owner};
use crate::domain::models::generation::GenerationError;
use crate::domain::repositories::chat_app_repository::ChatAppRepository;

/// 浏览已存储的聊天应用
pub struct BrowseChatAppsUseCase {
    repository: Arc<dyn ChatAppRepository>,
}

impl BrowseChatAppsUseCase {
    pub fn new(repository: Arc<dyn ChatAppRepository>) -> Self {
        Self { repository }
    }

    /// 有所有者时只列出其应用，否则列出全部；均按创建时间倒序
    pub async fn list(&self, owner: Option<&Owner>) -> Result<Vec<ChatAppSummary>, GenerationError> {
        let result = match owner {
            Some(owner) => self.repository.list_by_owner(owner).await,
            None => self.repository.list_all().await,
        };
        result.map_err(|e| {
            error!("Failed to list chat apps: {}", e);
            GenerationError::from(e)
        })
    }

    /// 按原始标识符获取应用
    pub async fn get(&self, raw_id: &str) -> Result<ChatApp, GenerationError> {
        let id = parse_chat_app_id(raw_id)?;
        self.repository
            .find_by_id(id)
            .await
            .map_err(|e| {
                error!("Failed to load chat app {}: {}", id, e);
                GenerationError::from(e)
            })?
            .ok_or_else(|| GenerationError::NotFound("Chat app not found".to_string()))
    }
}
