use thiserror::Error;

/// 看板客户端错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DashboardError {
    /// HTTP 非 2xx 响应
    #[error("API error: {status} ({endpoint})")]
    Request { endpoint: String, status: u16 },

    /// 传输层/连接失败
    #[error("Network error: {0}")]
    Network(String),

    /// 推送消息不是合法 JSON（只记录日志，不向上抛）
    #[error("Parse error: {0}")]
    Parse(String),

    /// HTTP 响应体无法反序列化为目标结构
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type DashboardResult<T> = Result<T, DashboardError>;

impl DashboardError {
    /// HTTP 状态码（仅 Request 错误有）
    pub fn status(&self) -> Option<u16> {
        match self {
            DashboardError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for DashboardError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        DashboardError::Network(err.to_string())
    }
}
