//! NetworkSink - TCP stream or UDP datagram output

use async_trait::async_trait;
use contracts::{ByteSink, ContractError};
use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpStream, UdpSocket};
use tokio::sync::Mutex;
use tracing::{debug, error, instrument, warn};

/// Transport protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkProtocol {
    /// TCP (reliable stream, full writes)
    #[default]
    Tcp,
    /// UDP (one datagram per write)
    Udp,
}

/// Configuration for NetworkSink
#[derive(Debug, Clone)]
pub struct NetworkSinkConfig {
    /// Target address
    pub addr: SocketAddr,
    /// Transport protocol
    pub protocol: NetworkProtocol,
    /// Max datagram size (UDP typically 65507 for IPv4)
    pub max_packet_size: usize,
}

impl NetworkSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let addr_str = params
            .get("addr")
            .ok_or_else(|| "missing 'addr' parameter".to_string())?;

        let addr: SocketAddr = addr_str
            .parse()
            .map_err(|e| format!("invalid address '{}': {}", addr_str, e))?;

        let protocol = match params.get("protocol").map(String::as_str) {
            Some("udp") => NetworkProtocol::Udp,
            Some("tcp") | None => NetworkProtocol::Tcp,
            Some(other) => return Err(format!("unknown protocol '{}'", other)),
        };

        let max_packet_size = params
            .get("max_packet_size")
            .and_then(|s| s.parse().ok())
            .unwrap_or(65000);

        Ok(Self {
            addr,
            protocol,
            max_packet_size,
        })
    }
}

enum Transport {
    Tcp(Mutex<TcpStream>),
    Udp(UdpSocket),
}

/// Sink that sends writes over the network
///
/// Over UDP a write larger than `max_packet_size` is sent truncated and
/// reported as such, which the fan-out writer treats as a short write.
pub struct NetworkSink {
    name: String,
    config: NetworkSinkConfig,
    transport: Transport,
}

impl NetworkSink {
    /// Connect a new NetworkSink
    #[instrument(name = "network_sink_connect", skip(name, config), fields(target = %config.addr))]
    pub async fn connect(
        name: impl Into<String>,
        config: NetworkSinkConfig,
    ) -> std::io::Result<Self> {
        let name = name.into();

        let transport = match config.protocol {
            NetworkProtocol::Tcp => {
                let stream = TcpStream::connect(config.addr).await?;
                stream.set_nodelay(true)?;
                Transport::Tcp(Mutex::new(stream))
            }
            NetworkProtocol::Udp => {
                // Bind to any available port of the matching family
                let local = if config.addr.is_ipv4() {
                    "0.0.0.0:0"
                } else {
                    "[::]:0"
                };
                let socket = UdpSocket::bind(local).await?;
                socket.connect(config.addr).await?;
                Transport::Udp(socket)
            }
        };

        debug!(
            sink = %name,
            target = %config.addr,
            protocol = ?config.protocol,
            "NetworkSink connected"
        );

        Ok(Self {
            name,
            config,
            transport,
        })
    }

    /// Create from params (for factory)
    #[instrument(name = "network_sink_from_params", skip(name, params))]
    pub async fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let config = NetworkSinkConfig::from_params(params)
            .map_err(|e| ContractError::config_validation(format!("sinks[{}].params", name), e))?;

        Self::connect(name.clone(), config)
            .await
            .map_err(|e| ContractError::sink_connection(name, e.to_string()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn protocol(&self) -> NetworkProtocol {
        self.config.protocol
    }

    async fn transmit(&self, buf: &[u8]) -> std::io::Result<usize> {
        match &self.transport {
            Transport::Tcp(stream) => {
                let mut stream = stream.lock().await;
                stream.write_all(buf).await?;
                Ok(buf.len())
            }
            Transport::Udp(socket) => {
                let len = buf.len().min(self.config.max_packet_size);
                if len < buf.len() {
                    warn!(
                        sink = %self.name,
                        size = buf.len(),
                        max = self.config.max_packet_size,
                        "Datagram too large, truncating"
                    );
                }
                socket.send(&buf[..len]).await
            }
        }
    }
}

#[async_trait]
impl ByteSink for NetworkSink {
    #[instrument(
        name = "network_sink_write",
        skip(self, buf),
        fields(sink = %self.name, bytes = buf.len())
    )]
    async fn write(&self, buf: &[u8]) -> Result<usize, ContractError> {
        let sent = self.transmit(buf).await.map_err(|e| {
            error!(sink = %self.name, error = %e, "Send failed");
            ContractError::sink_write(&self.name, e.to_string())
        })?;
        debug!(sink = %self.name, bytes = sent, "Sent");
        Ok(sent)
    }
}
