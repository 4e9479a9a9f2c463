// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::generation::GenerationError;
use async_trait::async_trait;

/// 提示资源仓库特质
///
/// 提供生成新应用前必须读取的两个外部文本资源。
/// 任一资源缺失都会以 `GenerationError::NotFound` 终止当前请求。
#[async_trait]
pub trait PromptResourceRepository: Send + Sync {
    /// 读取静态提示模板
    async fn read_template(&self) -> Result<String, GenerationError>;
    /// 读取参考示例 HTML
    async fn read_reference_example(&self) -> Result<String, GenerationError>;
}
