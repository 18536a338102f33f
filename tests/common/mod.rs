#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::time::{sleep, Instant};

pub mod ws;

/// 轮询直到条件成立或超时
pub async fn eventually(mut check: impl FnMut() -> bool, within: Duration) -> bool {
    let deadline = Instant::now() + within;
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        sleep(Duration::from_millis(20)).await;
    }
    check()
}

/// 捕获到的请求
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(|s| s.as_str())
    }
}

#[derive(Debug, Clone)]
struct CannedResponse {
    status: u16,
    content_type: &'static str,
    body: String,
}

/// 本地回环上的最小 HTTP 桩服务，每个连接只处理一个请求
pub struct HttpStub {
    pub addr: SocketAddr,
    routes: Arc<Mutex<HashMap<(String, String), CannedResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl HttpStub {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let routes: Arc<Mutex<HashMap<(String, String), CannedResponse>>> = Arc::default();
        let requests: Arc<Mutex<Vec<RecordedRequest>>> = Arc::default();

        let task_routes = routes.clone();
        let task_requests = requests.clone();
        tokio::spawn(async move {
            loop {
                let (mut socket, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => return,
                };
                let routes = task_routes.clone();
                let requests = task_requests.clone();
                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => buf.extend_from_slice(&chunk[..n]),
                        }
                    }
                    let head = String::from_utf8_lossy(&buf).to_string();
                    let mut lines = head.split("\r\n");
                    let request_line = lines.next().unwrap_or_default();
                    let mut parts = request_line.split_whitespace();
                    let method = parts.next().unwrap_or_default().to_string();
                    let path = parts.next().unwrap_or_default().to_string();
                    let headers = lines
                        .take_while(|l| !l.is_empty())
                        .filter_map(|l| l.split_once(':'))
                        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
                        .collect();
                    requests.lock().unwrap().push(RecordedRequest {
                        method: method.clone(),
                        path: path.clone(),
                        headers,
                    });

                    let response = routes
                        .lock()
                        .unwrap()
                        .get(&(method, path))
                        .cloned()
                        .unwrap_or(CannedResponse {
                            status: 404,
                            content_type: "text/plain",
                            body: "not found".to_string(),
                        });
                    let raw = format!(
                        "HTTP/1.1 {} X\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        response.status,
                        response.content_type,
                        response.body.len(),
                        response.body
                    );
                    let _ = socket.write_all(raw.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        Self {
            addr,
            routes,
            requests,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn json(&self, method: &str, path: &str, status: u16, body: &str) {
        self.route(method, path, status, "application/json", body);
    }

    pub fn text(&self, method: &str, path: &str, status: u16, body: &str) {
        self.route(method, path, status, "text/plain", body);
    }

    fn route(&self, method: &str, path: &str, status: u16, content_type: &'static str, body: &str) {
        self.routes.lock().unwrap().insert(
            (method.to_string(), path.to_string()),
            CannedResponse {
                status,
                content_type,
                body: body.to_string(),
            },
        );
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    /// 装载一套完整的读接口数据
    pub fn serve_all_reads(&self) {
        self.json("GET", "/status", 200, STATUS_JSON);
        self.json("GET", "/trades", 200, TRADES_JSON);
        self.json("GET", "/balance", 200, BALANCE_JSON);
        self.json("GET", "/cycles", 200, CYCLES_JSON);
        self.json("GET", "/positions", 200, POSITIONS_JSON);
    }
}

pub const STATUS_JSON: &str = r#"{
    "is_alive": true,
    "balance_usdc": 51.2345,
    "total_pnl": 1.2345,
    "open_positions": 1,
    "total_trades": 6,
    "total_cycles": 48,
    "win_rate": 66.6667,
    "uptime_hours": 24.0,
    "last_cycle_at": "2024-05-01T12:00:00Z"
}"#;

pub const TRADES_JSON: &str = r#"[
    {"id": "b2", "position_id": "p1", "symbol": "ETHUSDC", "side": "SELL", "quantity": 0.004,
     "price": 3050.25, "usdc_amount": 12.201, "commission": 0.0122, "executed_at": "2024-05-01T11:30:00Z"},
    {"id": "b1", "position_id": null, "symbol": "ETHUSDC", "side": "BUY", "quantity": 0.004,
     "price": 3000.0, "usdc_amount": 12.0, "commission": null, "executed_at": "2024-05-01T10:00:00Z"}
]"#;

/// 倒序：120（最新） 150 100（最早）
pub const BALANCE_JSON: &str = r#"[
    {"id": 3, "balance_usdc": 120.0, "open_positions": 0, "total_pnl": 20.0, "recorded_at": "2024-05-01T12:00:00Z"},
    {"id": 2, "balance_usdc": 150.0, "open_positions": 1, "total_pnl": 50.0, "recorded_at": "2024-05-01T11:30:00Z"},
    {"id": 1, "balance_usdc": 100.0, "open_positions": 0, "total_pnl": 0.0, "recorded_at": "2024-05-01T11:00:00Z"}
]"#;

pub const CYCLES_JSON: &str = r#"[
    {"id": "c48", "cycle_number": 48, "balance_usdc": 51.23, "action": "HOLD", "symbol": null,
     "confidence": 55, "reasoning": "Fear index elevated, waiting", "fear_greed": 22,
     "execution_ms": 912, "result": null, "error": null, "created_at": "2024-05-01T12:00:00Z"}
]"#;

pub const POSITIONS_JSON: &str = r#"[
    {"id": "p2", "symbol": "SOLUSDC", "side": "BUY", "quantity": 0.1, "entry_price": 140.0,
     "current_price": 147.0, "stop_loss": 133.0, "take_profit": null, "status": "OPEN",
     "pnl": 0.7, "opened_at": "2024-05-01T09:00:00Z"}
]"#;
