// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工具模块
///
/// 提供通用的辅助功能，目前包括日志/遥测初始化
pub mod telemetry;
