use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::protocol::Message;

enum ServerCmd {
    Text(String),
    Close,
}

/// 回环 WebSocket 服务，测试方可以向所有在线连接推送或关闭连接
pub struct WsServer {
    addr: SocketAddr,
    accepted: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
    peers: Arc<Mutex<Vec<mpsc::UnboundedSender<ServerCmd>>>>,
}

impl WsServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accepted = Arc::new(AtomicUsize::new(0));
        let closed = Arc::new(AtomicUsize::new(0));
        let peers: Arc<Mutex<Vec<mpsc::UnboundedSender<ServerCmd>>>> = Arc::default();

        let (task_accepted, task_closed, task_peers) = (accepted.clone(), closed.clone(), peers.clone());
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let mut ws = match accept_async(stream).await {
                    Ok(ws) => ws,
                    Err(_) => continue,
                };
                let (tx, mut rx) = mpsc::unbounded_channel();
                task_peers.lock().unwrap().push(tx);
                task_accepted.fetch_add(1, Ordering::SeqCst);
                let closed = task_closed.clone();
                tokio::spawn(async move {
                    loop {
                        tokio::select! {
                            cmd = rx.recv() => match cmd {
                                Some(ServerCmd::Text(text)) => {
                                    if ws.send(Message::Text(text)).await.is_err() {
                                        break;
                                    }
                                }
                                Some(ServerCmd::Close) | None => {
                                    let _ = ws.close(None).await;
                                    break;
                                }
                            },
                            incoming = ws.next() => match incoming {
                                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                                Some(Ok(_)) => {}
                            },
                        }
                    }
                    closed.fetch_add(1, Ordering::SeqCst);
                });
            }
        });

        Self {
            addr,
            accepted,
            closed,
            peers,
        }
    }

    pub fn url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    pub fn broadcast(&self, text: &str) {
        for peer in self.peers.lock().unwrap().iter() {
            let _ = peer.send(ServerCmd::Text(text.to_string()));
        }
    }

    pub fn close_all(&self) {
        for peer in self.peers.lock().unwrap().drain(..) {
            let _ = peer.send(ServerCmd::Close);
        }
    }

    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}
