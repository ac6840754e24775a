#![cfg(test)]
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use selfcheck_common::config::ScanConfig;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

pub const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Serves `reply` to every connection after reading the request.
pub async fn http_stub(reply: &'static [u8]) -> u16 {
    let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 512];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(reply).await;
            });
        }
    });
    port
}

/// A port nothing listens on.
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
    listener.local_addr().unwrap().port()
}

pub fn scan_config(per_probe_ms: u64, concurrency: usize, deadline_ms: u64) -> ScanConfig {
    ScanConfig::new(
        Duration::from_millis(per_probe_ms),
        concurrency,
        Duration::from_millis(deadline_ms),
    )
    .unwrap()
}

/// Accepts connections and never answers.
pub async fn silent_stub() -> u16 {
    let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    port
}
