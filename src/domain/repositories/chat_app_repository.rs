// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::chat_app::{ChatApp, ChatAppId, ChatAppSummary, NewChatApp, Owner};
use crate::domain::models::generation::GenerationError;
use async_trait::async_trait;
use sea_orm::DbErr;
use thiserror::Error;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// 记录未找到
    #[error("Record not found")]
    NotFound,
}

impl From<RepositoryError> for GenerationError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => GenerationError::NotFound("Chat app not found".to_string()),
            RepositoryError::Database(e) => GenerationError::Internal(e.to_string()),
        }
    }
}

/// 聊天应用仓库特质
///
/// 内容寻址存储：以内容指纹去重，按数字标识符或所有者查询。
/// 每个操作各自获取连接，不跨调用持有事务。
#[async_trait]
pub trait ChatAppRepository: Send + Sync {
    /// 保存聊天应用并返回其标识符
    ///
    /// 内容指纹已存在时不创建新行，直接返回已有行的标识符
    async fn save(&self, app: NewChatApp) -> Result<ChatAppId, RepositoryError>;
    /// 根据ID查找聊天应用
    async fn find_by_id(&self, id: ChatAppId) -> Result<Option<ChatApp>, RepositoryError>;
    /// 列出某个所有者的应用摘要，按创建时间倒序
    async fn list_by_owner(&self, owner: &Owner) -> Result<Vec<ChatAppSummary>, RepositoryError>;
    /// 列出全部应用摘要，按创建时间倒序
    async fn list_all(&self) -> Result<Vec<ChatAppSummary>, RepositoryError>;
}
