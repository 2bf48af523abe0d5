//! Configuration for the control point
//!
//! Defaults match what a zone player on the local network expects: probes go
//! to both the SSDP multicast group and the limited broadcast address, and
//! sockets bind on every interface with an ephemeral port.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use sonos_discovery::{BROADCAST_ADDR, MULTICAST_ADDR, ZONE_PLAYER_SEARCH_TARGET};

use crate::error::{ControlPointError, Result};

/// Configuration for a [`ControlPoint`](crate::ControlPoint)
#[derive(Debug, Clone)]
pub struct ControlPointConfig {
    /// Local address of the discovery socket
    /// Default: 0.0.0.0:0
    pub discovery_bind_addr: SocketAddr,

    /// Where each search probe is sent
    /// Default: 239.255.255.250:1900 and 255.255.255.255:1900
    pub search_targets: Vec<SocketAddr>,

    /// ST header of the probe
    /// Default: urn:schemas-upnp-org:device:ZonePlayer:1
    pub search_target: String,

    /// MX header of the probe, in seconds
    /// Default: 1
    pub mx: u32,

    /// Local address of the event server
    /// Default: 0.0.0.0:0
    pub event_server_addr: SocketAddr,

    /// Lease requested on SUBSCRIBE and renewal
    /// Default: 300 seconds
    pub subscription_timeout: Duration,

    /// Timeout of every HTTP request made to a zone player
    /// Default: 10 seconds
    pub http_timeout: Duration,
}

impl Default for ControlPointConfig {
    fn default() -> Self {
        let any = SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0));
        Self {
            discovery_bind_addr: any,
            search_targets: vec![MULTICAST_ADDR.into(), BROADCAST_ADDR.into()],
            search_target: ZONE_PLAYER_SEARCH_TARGET.to_string(),
            mx: 1,
            event_server_addr: any,
            subscription_timeout: Duration::from_secs(300),
            http_timeout: soap_client::DEFAULT_TIMEOUT,
        }
    }
}

impl ControlPointConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything bound on 127.0.0.1 and no search targets; add one with
    /// [`ControlPointConfig::with_search_targets`].
    pub fn loopback() -> Self {
        let loopback = SocketAddr::from((Ipv4Addr::LOCALHOST, 0));
        Self {
            discovery_bind_addr: loopback,
            search_targets: Vec::new(),
            event_server_addr: loopback,
            ..Default::default()
        }
    }

    /// Reject values no zone player would accept.
    pub fn validate(&self) -> Result<()> {
        if self.search_target.trim().is_empty() {
            return Err(ControlPointError::Configuration(
                "search target must not be empty".to_string(),
            ));
        }

        if self.mx == 0 {
            return Err(ControlPointError::Configuration(
                "MX must be at least 1 second".to_string(),
            ));
        }

        if self.subscription_timeout.as_secs() == 0 {
            return Err(ControlPointError::Configuration(
                "subscription timeout must be at least 1 second".to_string(),
            ));
        }

        if self.subscription_timeout.as_secs() > u64::from(u32::MAX) {
            return Err(ControlPointError::Configuration(
                "subscription timeout is too large".to_string(),
            ));
        }

        Ok(())
    }

    pub(crate) fn subscription_timeout_secs(&self) -> u32 {
        u32::try_from(self.subscription_timeout.as_secs()).unwrap_or(u32::MAX)
    }

    pub fn with_search_targets(mut self, targets: Vec<SocketAddr>) -> Self {
        self.search_targets = targets;
        self
    }

    pub fn with_subscription_timeout(mut self, timeout: Duration) -> Self {
        self.subscription_timeout = timeout;
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn with_event_server_addr(mut self, addr: SocketAddr) -> Self {
        self.event_server_addr = addr;
        self
    }
}
