//! Record of a controller found on the network.

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

/// A controller that answered a discovery broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiscoveredDevice {
    pub(crate) addr: SocketAddr,
    pub(crate) id: String,
    pub(crate) model: String,
}

impl DiscoveredDevice {
    pub(crate) fn new(addr: SocketAddr, id: impl Into<String>, model: impl Into<String>) -> Self {
        DiscoveredDevice {
            addr,
            id: id.into(),
            model: model.into(),
        }
    }

    /// Command address of the device (reported IP, default control port).
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Identifier the device reported, usually its MAC address.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}
