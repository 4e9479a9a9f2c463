// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 聊天应用（chat_app）：生成并持久化的 HTML 应用及其摘要、所有者标签
/// - 生成（generation）：生成流程的错误分类与流式事件帧
pub mod chat_app;
pub mod generation;
