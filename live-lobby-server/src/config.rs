use std::net::SocketAddr;

/// Reference server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on; port 0 picks an ephemeral port
    pub bind: SocketAddr,

    /// Per-lobby broadcast buffer; slow subscribers past this get a fresh snapshot
    pub topic_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            topic_capacity: 64,
        }
    }
}

impl ServerConfig {
    pub fn new(bind: SocketAddr) -> Self {
        Self {
            bind,
            ..Default::default()
        }
    }

    /// Loopback with an OS-assigned port (tests)
    pub fn ephemeral() -> Self {
        Self::new(SocketAddr::from(([127, 0, 0, 1], 0)))
    }

    pub fn with_topic_capacity(mut self, capacity: usize) -> Self {
        self.topic_capacity = capacity.max(1);
        self
    }
}
