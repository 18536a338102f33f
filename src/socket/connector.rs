use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::debug;

use crate::error::DashboardResult;

/// 一条已建立的推送连接
#[async_trait]
pub trait PushStream: Send {
    /// 读取下一条文本帧；None 表示连接已关闭
    async fn next_frame(&mut self) -> Option<DashboardResult<String>>;

    /// 关闭连接（尽力而为）
    async fn close(&mut self);
}

/// 推送连接的建立方式，生产环境为 WebSocket
#[async_trait]
pub trait PushConnector: Send + Sync + 'static {
    async fn open(&self, url: &str) -> DashboardResult<Box<dyn PushStream>>;
}

/// tokio-tungstenite 实现
#[derive(Debug, Clone, Default)]
pub struct WsConnector;

#[async_trait]
impl PushConnector for WsConnector {
    async fn open(&self, url: &str) -> DashboardResult<Box<dyn PushStream>> {
        let (ws_stream, response) = connect_async(url).await?;
        debug!("websocket handshake ok: {} -> {}", url, response.status());
        Ok(Box::new(WsStream { inner: ws_stream }))
    }
}

struct WsStream {
    inner: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl PushStream for WsStream {
    async fn next_frame(&mut self) -> Option<DashboardResult<String>> {
        loop {
            match self.inner.next().await {
                Some(Ok(Message::Text(text))) => return Some(Ok(text)),
                Some(Ok(Message::Binary(bytes))) => {
                    return Some(Ok(String::from_utf8_lossy(&bytes).into_owned()))
                }
                // ping/pong 由 tungstenite 自动处理
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                Some(Ok(Message::Frame(_))) => continue,
                Some(Ok(Message::Close(frame))) => {
                    debug!("websocket close frame: {:?}", frame);
                    return None;
                }
                Some(Err(e)) => return Some(Err(e.into())),
                None => return None,
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.inner.close(None).await {
            debug!("websocket close: {}", e);
        }
    }
}
