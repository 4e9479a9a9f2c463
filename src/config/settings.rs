// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// 应用程序配置设置
///
/// 包含服务器、数据库、LLM、提示资源和指标等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 数据库配置
    pub database: DatabaseSettings,
    /// LLM 补全服务配置
    pub llm: LlmSettings,
    /// 提示模板资源配置
    pub resources: ResourceSettings,
    /// 指标导出配置
    pub metrics: MetricsSettings,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 数据库配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
}

/// LLM 补全服务配置设置
///
/// 缓冲模式和流式模式共用同一组模型参数
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    /// API 密钥（Bearer 凭证），缺失时服务无法启动
    pub api_key: Option<String>,
    /// API 基础 URL
    pub api_base_url: String,
    /// 模型名称
    pub model: String,
    /// 最大生成令牌数
    pub max_tokens: u32,
    /// 采样温度
    pub temperature: f32,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

/// 提示资源配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceSettings {
    /// 静态提示模板文件路径
    pub template_path: String,
    /// 参考示例 HTML 文件路径
    pub example_path: String,
}

/// 指标导出配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// 是否启用 Prometheus 导出器
    pub enabled: bool,
    /// 导出器监听地址
    pub listen_addr: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 按顺序叠加：内置默认值、`config/default`、`config/{APP_ENVIRONMENT}`、
    /// 以 `CHATGEN__` 为前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let mut builder = Config::builder()
            // Start with default settings
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3545)?
            // Default DB settings
            .set_default("database.url", "sqlite://main.db?mode=rwc")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            // Default LLM settings
            .set_default("llm.api_base_url", "https://api.openai.com/v1")?
            .set_default("llm.model", "gpt-4o")?
            .set_default("llm.max_tokens", 4000)?
            .set_default("llm.temperature", 0.7)?
            .set_default("llm.timeout_secs", 120)?
            // Default prompt resources
            .set_default("resources.template_path", "static/prompt.txt")?
            .set_default("resources.example_path", "static/example.html")?
            // Default metrics settings
            .set_default("metrics.enabled", false)?
            .set_default("metrics.listen_addr", "0.0.0.0:9000")?;

        // The conventional OpenAI variable seeds the key; CHATGEN__LLM__API_KEY still wins
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            builder = builder.set_default("llm.api_key", key)?;
        }

        builder
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("CHATGEN").separator("__"))
            .build()?
            .try_deserialize()
    }
}
