//! Event subscription leases and the callback URL zone players post to.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use callback_server::SERIAL_QUERY_PARAM;
use sonos_api::Service;
use tokio::net::TcpStream;
use tokio::time::Instant;
use url::Url;

use crate::error::{ControlPointError, Result};

/// An active GENA subscription.
///
/// The lease is not renewed automatically; call
/// [`ControlPoint::renew_lease`](crate::ControlPoint::renew_lease) before
/// [`Subscription::remaining`] reaches zero or the zone player drops it
/// silently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    sid: String,
    service: Service,
    serial_number: String,
    timeout: Duration,
    expires_at: Instant,
}

impl Subscription {
    pub fn new(
        sid: impl Into<String>,
        service: Service,
        serial_number: impl Into<String>,
        timeout_seconds: u32,
    ) -> Self {
        let timeout = Duration::from_secs(u64::from(timeout_seconds));
        Self {
            sid: sid.into(),
            service,
            serial_number: serial_number.into(),
            timeout,
            expires_at: Instant::now() + timeout,
        }
    }

    /// Subscription ID exactly as the zone player sent it
    pub fn sid(&self) -> &str {
        &self.sid
    }

    pub fn service(&self) -> Service {
        self.service
    }

    pub fn serial_number(&self) -> &str {
        &self.serial_number
    }

    /// Lease granted by the zone player
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    /// Time left on the lease, zero once expired.
    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    /// Restart the lease after a successful renewal.
    pub(crate) fn renewed(&mut self, timeout_seconds: u32) {
        self.timeout = Duration::from_secs(u64::from(timeout_seconds));
        self.expires_at = Instant::now() + self.timeout;
    }
}

/// Local address the OS routes traffic to `event_url`'s host from.
///
/// A TCP connection is opened and dropped without sending anything.
pub(crate) async fn local_addr_towards(event_url: &Url) -> Result<IpAddr> {
    let host = event_url
        .host_str()
        .ok_or_else(|| ControlPointError::Configuration(format!("no host in {}", event_url)))?;
    let port = event_url.port_or_known_default().unwrap_or(80);

    let stream = TcpStream::connect((host.trim_start_matches('[').trim_end_matches(']'), port)).await?;
    let local = stream.local_addr()?;
    drop(stream);
    Ok(local.ip())
}

/// `http://<local_ip>:<port><event path>?sn=<serial>`
pub fn callback_url(local_ip: IpAddr, port: u16, service: Service, serial_number: &str) -> Result<Url> {
    let mut url = Url::parse(&format!(
        "http://{}{}",
        SocketAddr::new(local_ip, port),
        service.info().event_path
    ))
    .map_err(|e| ControlPointError::Configuration(e.to_string()))?;

    url.query_pairs_mut()
        .append_pair(SERIAL_QUERY_PARAM, serial_number);
    Ok(url)
}
