//! SSDP (Simple Service Discovery Protocol) probe and response handling
//!
//! Zone players answer an `M-SEARCH` with a unicast HTTP-style response whose
//! `LOCATION` header points at their device description.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use tokio::net::UdpSocket;

use crate::error::Result;

/// SSDP multicast group
pub const MULTICAST_ADDR: SocketAddrV4 = SocketAddrV4::new(Ipv4Addr::new(239, 255, 255, 250), 1900);

/// IPv4 limited broadcast, for networks that drop multicast
pub const BROADCAST_ADDR: SocketAddrV4 = SocketAddrV4::new(Ipv4Addr::BROADCAST, 1900);

/// Search target answered by Sonos zone players
pub const ZONE_PLAYER_SEARCH_TARGET: &str = "urn:schemas-upnp-org:device:ZonePlayer:1";

const MAX_DATAGRAM: usize = 2048;

/// SSDP response containing device information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsdpResponse {
    pub location: String,
    pub search_target: Option<String>,
    pub usn: Option<String>,
    pub server: Option<String>,
}

/// Render an `M-SEARCH` request.
pub fn build_probe(search_target: &str, mx: u32) -> String {
    format!(
        "M-SEARCH * HTTP/1.1\r\n\
         HOST: 239.255.255.250:1900\r\n\
         MAN: \"ssdp:discover\"\r\n\
         MX: {}\r\n\
         ST: {}\r\n\
         \r\n",
        mx, search_target
    )
}

/// Parse an SSDP response from HTTP text.
///
/// The first line must be an HTTP status line and a `LOCATION` header must be
/// present. Header names are case-insensitive.
pub fn parse_ssdp_response(response: &str) -> Option<SsdpResponse> {
    let mut lines = response.lines();
    if !lines.next()?.trim_start().starts_with("HTTP/") {
        return None;
    }

    let mut location = None;
    let mut search_target = None;
    let mut usn = None;
    let mut server = None;

    for line in lines {
        let line = line.trim();

        if let Some(value) = extract_header_value(line, "LOCATION:") {
            location = Some(value);
        } else if let Some(value) = extract_header_value(line, "ST:") {
            search_target = Some(value);
        } else if let Some(value) = extract_header_value(line, "USN:") {
            usn = Some(value);
        } else if let Some(value) = extract_header_value(line, "SERVER:") {
            server = Some(value);
        }
    }

    Some(SsdpResponse {
        location: location.filter(|l| !l.is_empty())?,
        search_target,
        usn,
        server,
    })
}

/// Extract header value from a line like "HEADER: value"
fn extract_header_value(line: &str, header: &str) -> Option<String> {
    if line.len() > header.len()
        && line.is_char_boundary(header.len())
        && line[..header.len()].eq_ignore_ascii_case(header)
    {
        Some(line[header.len()..].trim().to_string())
    } else {
        None
    }
}

/// UDP socket used to send probes and collect the unicast answers.
#[derive(Debug)]
pub struct SsdpSocket {
    socket: UdpSocket,
}

impl SsdpSocket {
    /// Bind with broadcast enabled.
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        socket.set_broadcast(true)?;
        tracing::debug!(local = ?socket.local_addr().ok(), "SSDP socket bound");
        Ok(Self { socket })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Send one probe datagram to every target; the first failure aborts.
    pub async fn send_probe(
        &self,
        targets: &[SocketAddr],
        search_target: &str,
        mx: u32,
    ) -> Result<()> {
        let probe = build_probe(search_target, mx);
        for target in targets {
            self.socket.send_to(probe.as_bytes(), *target).await?;
            tracing::debug!(%target, search_target, "sent M-SEARCH");
        }
        Ok(())
    }

    /// Receive one datagram. Invalid UTF-8 is replaced rather than rejected;
    /// [`parse_ssdp_response`] decides whether the text is usable.
    pub async fn recv(&self) -> Result<(String, SocketAddr)> {
        let mut buffer = [0u8; MAX_DATAGRAM];
        let (size, from) = self.socket.recv_from(&mut buffer).await?;
        Ok((String::from_utf8_lossy(&buffer[..size]).into_owned(), from))
    }
}
