// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置设置测试模块
///
/// 确保默认配置能被加载，且默认资源路径指向随仓库发布的文件

#[cfg(test)]
mod tests {
    use chatgen::config::settings::Settings;
    use chatgen::domain::repositories::prompt_resource_repository::PromptResourceRepository;
    use chatgen::infrastructure::resources::LocalPromptResources;

    #[test]
    fn test_config_loading_from_default_toml() {
        let settings = Settings::new().expect("default configuration should load");

        assert_eq!(settings.server.port, 3545);
        assert!(!settings.database.url.is_empty());
        assert!(settings.llm.max_tokens > 0);
        assert!(settings.llm.timeout_secs > 0);
        assert!((0.0..=2.0).contains(&settings.llm.temperature));
        assert_eq!(settings.resources.template_path, "static/prompt.txt");
        assert_eq!(settings.resources.example_path, "static/example.html");
    }

    #[tokio::test]
    async fn test_default_prompt_resources_are_shipped() {
        let settings = Settings::new().unwrap();
        let resources = LocalPromptResources::from_settings(&settings.resources);

        let template = resources.read_template().await.unwrap();
        let example = resources.read_reference_example().await.unwrap();

        assert!(!template.trim().is_empty());
        assert!(example.contains("<title>"));
        assert!(example.trim_end().ends_with("</html>"));
    }
}
