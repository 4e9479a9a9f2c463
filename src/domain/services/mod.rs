// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// - markdown_sanitizer：纯文本清理与标题提取
/// - prompt_composer：提示组合
/// - llm_service：补全服务接口及 OpenAI 兼容实现
/// - completion_consumer：缓冲/流式补全消费与事件状态机
pub mod completion_consumer;
pub mod llm_service;
pub mod markdown_sanitizer;
pub mod prompt_composer;
