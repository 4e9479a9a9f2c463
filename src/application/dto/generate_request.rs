// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// 生成请求查询参数
#[derive(Debug, Default, Clone, Deserialize, Serialize, Validate)]
pub struct GenerateChatAppQuery {
    /// 已存在应用的标识符；提供时直接返回已存储的内容
    pub cur: Option<String>,
    /// 主题/风格要求
    #[validate(length(max = 500, message = "theme must be at most 500 characters"))]
    pub theme: Option<String>,
}

impl GenerateChatAppQuery {
    /// 去除首尾空白，空白字段视为未提供；校验应作用于去除后的值
    pub fn trimmed(self) -> Self {
        let trim = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            cur: trim(self.cur),
            theme: trim(self.theme),
        }
    }
}
