// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 数据传输对象模块
///
/// 定义HTTP边界上的请求与响应结构
pub mod generate_request;
pub mod generate_response;
pub mod login_request;
