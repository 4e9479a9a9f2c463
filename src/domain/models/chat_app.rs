// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// 摘要预览的最大字符数
pub const PREVIEW_CHARS: usize = 200;

/// 预览被截断时追加的省略标记
pub const PREVIEW_ELLIPSIS: &str = "...";

/// 聊天应用标识符，由存储在首次插入时分配
pub type ChatAppId = i32;

/// 生成的聊天应用实体
///
/// 一个完整的、自包含的 HTML 聊天应用及其元数据。
/// 实体一旦持久化就不可变：不存在更新或删除操作。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatApp {
    /// 存储分配的唯一标识符
    pub id: ChatAppId,
    /// 显示标题，永不为空
    pub title: String,
    /// 最终的 HTML 内容
    pub content: String,
    /// 生成该内容时发送给模型的完整指令文本
    pub provenance: String,
    /// 首次成功插入的时间
    pub created_at: DateTime<Utc>,
    /// 内容指纹，去重键
    pub content_digest: String,
    /// 所有者标签，缺省表示匿名/全局
    pub owner: Option<Owner>,
}

/// 待持久化的聊天应用
///
/// `content_digest` 在构造时由内容计算得出，调用方无法单独指定
#[derive(Debug, Clone)]
pub struct NewChatApp {
    pub title: String,
    pub content: String,
    pub provenance: String,
    pub owner: Option<Owner>,
    content_digest: String,
}

impl NewChatApp {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        provenance: impl Into<String>,
        owner: Option<Owner>,
    ) -> Self {
        let content = content.into();
        let content_digest = content_digest(&content);
        Self {
            title: title.into(),
            content,
            provenance: provenance.into(),
            owner,
            content_digest,
        }
    }

    pub fn content_digest(&self) -> &str {
        &self.content_digest
    }
}

/// 聊天应用摘要，用于列表展示
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatAppSummary {
    pub id: ChatAppId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    /// 内容前 200 个字符，长度达到 200 时追加省略标记
    pub preview: String,
}

impl ChatAppSummary {
    pub fn new(id: ChatAppId, title: String, created_at: DateTime<Utc>, content: &str) -> Self {
        Self {
            id,
            title,
            created_at,
            preview: preview_of(content),
        }
    }
}

/// 计算内容预览
///
/// 按字符（而非字节）截取，保证不会切断多字节字符
pub fn preview_of(content: &str) -> String {
    let mut preview: String = content.chars().take(PREVIEW_CHARS).collect();
    if preview.chars().count() >= PREVIEW_CHARS {
        preview.push_str(PREVIEW_ELLIPSIS);
    }
    preview
}

/// 计算内容指纹（SHA-256，小写十六进制）
pub fn content_digest(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// 不透明的所有者标签
///
/// 仅用于划分存储的应用，不承担任何认证职责；核心逻辑从不解析其内部结构
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Owner(String);

impl Owner {
    /// 从边界层传入的原始标签构造，空白标签视为匿名
    pub fn from_label(label: impl Into<String>) -> Option<Self> {
        let label = label.into();
        if label.trim().is_empty() {
            None
        } else {
            Some(Self(label))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Owner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// 登录表单提交的结构化身份
///
/// 只在边界层转换为不透明的 `Owner` 标签
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub first: String,
    pub last: String,
}

impl UserIdentity {
    pub fn new(first: impl Into<String>, last: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            last: last.into(),
        }
    }

    /// 生成所有者标签
    pub fn to_owner(&self) -> Option<Owner> {
        Owner::from_label(format!("{} {}", self.first.trim(), self.last.trim()))
    }
}
