use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, HeaderValue};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::api::models::{
    BalanceSnapshot, CycleLogEntry, HealthReport, Position, StatusSnapshot, TradeRecord,
};
use crate::error::{DashboardError, DashboardResult};

pub const KILL_SECRET_HEADER: &str = "X-Kill-Secret";

/// 交易机器人后端接口
///
/// 同步器和控制面板只依赖该接口，测试时可替换为内存实现。
#[async_trait]
pub trait DashboardApi: Send + Sync {
    async fn status(&self) -> DashboardResult<StatusSnapshot>;

    async fn trades(&self) -> DashboardResult<Vec<TradeRecord>>;

    async fn balance(&self) -> DashboardResult<Vec<BalanceSnapshot>>;

    async fn cycles(&self) -> DashboardResult<Vec<CycleLogEntry>>;

    async fn positions(&self) -> DashboardResult<Vec<Position>>;

    async fn health(&self) -> DashboardResult<HealthReport>;

    /// 手动触发一次决策周期，返回服务端的纯文本确认
    async fn trigger(&self) -> DashboardResult<String>;

    /// 紧急停机；密钥错误时服务端返回非 2xx
    async fn kill(&self, secret: &str) -> DashboardResult<String>;
}

/// 基于 reqwest 的 HTTP 客户端
///
/// 每次调用都是一次新请求：不缓存、不重试，重试策略由调用方决定。
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        ApiClient { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 发送请求并返回响应体文本；非 2xx 转为 Request 错误
    async fn send_request(
        &self,
        method: Method,
        path: &str,
        secret: Option<&str>,
    ) -> DashboardResult<String> {
        let mut request_builder = self
            .client
            .request(method.clone(), self.url(path))
            .header(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        if let Some(secret) = secret {
            request_builder = request_builder.header(KILL_SECRET_HEADER, secret);
        }

        let response = request_builder
            .send()
            .await
            .map_err(|e| DashboardError::Network(e.to_string()))?;

        let status_code = response.status();
        let response_body = response
            .text()
            .await
            .map_err(|e| DashboardError::Network(e.to_string()))?;
        debug!(
            "{} {} -> {} ({} bytes)",
            method,
            path,
            status_code.as_u16(),
            response_body.len()
        );

        if !status_code.is_success() {
            warn!("{} {} 请求失败: {}", method, path, status_code);
            return Err(DashboardError::Request {
                endpoint: path.to_string(),
                status: status_code.as_u16(),
            });
        }
        Ok(response_body)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> DashboardResult<T> {
        let body = self.send_request(Method::GET, path, None).await?;
        serde_json::from_str(&body)
            .map_err(|e| DashboardError::Decode(format!("{}: {}", path, e)))
    }
}

#[async_trait]
impl DashboardApi for ApiClient {
    async fn status(&self) -> DashboardResult<StatusSnapshot> {
        self.get_json("/status").await
    }

    async fn trades(&self) -> DashboardResult<Vec<TradeRecord>> {
        self.get_json("/trades").await
    }

    async fn balance(&self) -> DashboardResult<Vec<BalanceSnapshot>> {
        self.get_json("/balance").await
    }

    async fn cycles(&self) -> DashboardResult<Vec<CycleLogEntry>> {
        self.get_json("/cycles").await
    }

    async fn positions(&self) -> DashboardResult<Vec<Position>> {
        self.get_json("/positions").await
    }

    async fn health(&self) -> DashboardResult<HealthReport> {
        self.get_json("/health").await
    }

    async fn trigger(&self) -> DashboardResult<String> {
        self.send_request(Method::POST, "/trigger", None).await
    }

    async fn kill(&self, secret: &str) -> DashboardResult<String> {
        self.send_request(Method::POST, "/kill", Some(secret)).await
    }
}
