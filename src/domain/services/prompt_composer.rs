// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::repositories::prompt_resource_repository::PromptResourceRepository;
use crate::domain::models::generation::GenerationError;

/// 提示组合方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptVariant {
    /// 单次调用：参考示例以 markdown 代码块内联在一条用户消息中，主题作为附加要求
    Inline,
    /// 对话补全：模板和示例组成系统指令，主题作为用户轮次
    Chat,
}

/// 组合后的提示
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    /// 指令文本（Inline 时作为唯一的用户消息，Chat 时作为系统消息）
    pub instruction: String,
    /// 用户轮次文本，仅 Chat 变体存在
    pub user_text: Option<String>,
}

impl ComposedPrompt {
    /// 作为出处记录的完整文本：指令，若有用户轮次则以空行分隔附在其后
    pub fn provenance(&self) -> String {
        match &self.user_text {
            Some(user) => format!("{}\n\n{}", self.instruction, user),
            None => self.instruction.clone(),
        }
    }
}

/// 提示组合器
///
/// 把静态模板、参考示例和调用方主题拼成发送给补全服务的指令
pub struct PromptComposer;

impl PromptComposer {
    /// 组合提示
    ///
    /// # 参数
    ///
    /// * `variant` - 组合方式
    /// * `template` - 静态提示模板
    /// * `reference_example` - 参考示例 HTML
    /// * `theme` - 调用方主题，已去除首尾空白；空字符串表示未指定
    pub fn compose(
        variant: PromptVariant,
        template: &str,
        reference_example: &str,
        theme: &str,
    ) -> ComposedPrompt {
        match variant {
            PromptVariant::Inline => {
                let mut instruction = format!(
                    "{template}\n\n\
                     Here's an example of a well-structured chat application for reference:\n\n\
                     ```html\n{reference_example}\n```\n\n\
                     Use this example as inspiration for structure, styling, and functionality, \
                     but create a unique variation with different visual design, colors, layout, \
                     or features. Make sure your generated HTML is complete and self-contained."
                );
                if !theme.is_empty() {
                    instruction.push_str(&format!(
                        "\n\nAdditional theme/style requirement from the user: {theme}"
                    ));
                }
                ComposedPrompt {
                    instruction,
                    user_text: None,
                }
            }
            PromptVariant::Chat => {
                let instruction = format!(
                    "{template}\n\n\
                     Below is a working reference implementation. Use these technical patterns \
                     (API calls, streaming, message handling), but design your own visuals:\n\n\
                     {reference_example}\n\n\
                     Respond with the complete HTML document only."
                );
                let user_text = if theme.is_empty() {
                    "Create a unique chat application with an original visual design.".to_string()
                } else {
                    format!("Create a chat application with this theme: {theme}")
                };
                ComposedPrompt {
                    instruction,
                    user_text: Some(user_text),
                }
            }
        }
    }

    /// 从资源仓库读取模板和示例后组合提示
    ///
    /// 资源内容会去除首尾空白；任一资源缺失时返回错误而不是空字符串
    pub async fn compose_from(
        resources: &dyn PromptResourceRepository,
        variant: PromptVariant,
        theme: &str,
    ) -> Result<ComposedPrompt, GenerationError> {
        let template = resources.read_template().await?;
        let example = resources.read_reference_example().await?;
        Ok(Self::compose(variant, template.trim(), example.trim(), theme))
    }
}
