// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

use crate::config::settings::MetricsSettings;
use crate::domain::models::generation::GenerationMode;

/// 初始化 Prometheus 指标导出器
///
/// 未启用时什么都不做；计数器调用在没有安装记录器时是空操作
pub fn init_metrics(settings: &MetricsSettings) {
    if !settings.enabled {
        return;
    }

    let addr: SocketAddr = match settings.listen_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            warn!("Invalid metrics address {}: {}", settings.listen_addr, e);
            return;
        }
    };

    // Ignore error if address is already in use (for development/testing)
    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!(
            "Failed to install Prometheus recorder: {}. This might happen if the port is already in use.",
            e
        );
        return;
    }

    describe_counter!(
        "chatgen_generations_total",
        "Generation requests by mode and outcome"
    );
    describe_counter!(
        "chatgen_artifacts_deduplicated_total",
        "Saves that resolved to an already stored chat app"
    );

    info!("Metrics exporter listening on {}", addr);
}

/// 记录一次生成请求的结果
pub fn record_generation(mode: GenerationMode, outcome: &'static str) {
    counter!(
        "chatgen_generations_total",
        "mode" => mode.as_str(),
        "outcome" => outcome
    )
    .increment(1);
}

/// 记录一次被去重的保存
pub fn record_deduplicated() {
    counter!("chatgen_artifacts_deduplicated_total").increment(1);
}
