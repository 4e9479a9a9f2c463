// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::error;

use crate::config::settings::ResourceSettings;
use crate::domain::models::generation::GenerationError;
use crate::domain::repositories::prompt_resource_repository::PromptResourceRepository;

/// 本地文件提示资源
///
/// 每次请求都重新读取文件，修改模板无需重启服务
pub struct LocalPromptResources {
    template_path: PathBuf,
    example_path: PathBuf,
}

impl LocalPromptResources {
    pub fn new(template_path: impl Into<PathBuf>, example_path: impl Into<PathBuf>) -> Self {
        Self {
            template_path: template_path.into(),
            example_path: example_path.into(),
        }
    }

    pub fn from_settings(settings: &ResourceSettings) -> Self {
        Self::new(&settings.template_path, &settings.example_path)
    }

    async fn read(path: &Path, label: &str) -> Result<String, GenerationError> {
        match fs::read_to_string(path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                error!("{} missing at {}", label, path.display());
                Err(GenerationError::NotFound(format!("{} not found", label)))
            }
            Err(e) => {
                error!("Failed to read {} at {}: {}", label, path.display(), e);
                Err(GenerationError::Internal(format!(
                    "Error reading {}: {}",
                    label.to_lowercase(),
                    e
                )))
            }
        }
    }
}

#[async_trait]
impl PromptResourceRepository for LocalPromptResources {
    async fn read_template(&self) -> Result<String, GenerationError> {
        Self::read(&self.template_path, "Prompt file").await
    }

    async fn read_reference_example(&self) -> Result<String, GenerationError> {
        Self::read(&self.example_path, "Example HTML file").await
    }
}
