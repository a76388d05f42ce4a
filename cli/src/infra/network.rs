//! Network infrastructure — implements `NetworkProbe` using `spawn_blocking`.

use std::time::Duration;

use anyhow::Result;

use crate::application::ports::NetworkProbe;

/// Production implementation that performs real TCP connects.
#[derive(Debug, Clone, Copy)]
pub struct TokioNetworkProbe {
    connect_timeout: Duration,
}

impl TokioNetworkProbe {
    #[must_use]
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl NetworkProbe for TokioNetworkProbe {
    async fn check_tcp_connectivity(&self, host: &str, port: u16) -> Result<bool> {
        let addr = format!("{host}:{port}");
        let timeout = self.connect_timeout;
        let result = tokio::task::spawn_blocking(move || {
            use std::net::ToSocketAddrs;
            let addrs: Vec<std::net::SocketAddr> = addr
                .to_socket_addrs()
                .map_err(|e| anyhow::anyhow!("invalid address {addr}: {e}"))?
                .collect();
            Ok::<bool, anyhow::Error>(addrs.iter().any(|a| {
                std::net::TcpStream::connect_timeout(a, timeout)
                    .and_then(|s| s.shutdown(std::net::Shutdown::Both))
                    .is_ok()
            }))
        })
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking panicked: {e}"))??;
        Ok(result)
    }
}
