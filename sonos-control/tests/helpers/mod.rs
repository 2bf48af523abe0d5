//! Test helpers: a fake zone player served by mockito and a fake SSDP
//! responder on loopback

#![allow(dead_code)]

use std::net::SocketAddr;

use mockito::{Mock, ServerGuard};
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

pub const DESCRIPTION_PATH: &str = "/xml/device_description.xml";

/// A zone player whose description and topology are served by mockito.
pub struct FakeZonePlayer {
    pub server: ServerGuard,
    pub serial: String,
    pub room: String,
    pub description: Mock,
    pub topology: Mock,
}

impl FakeZonePlayer {
    /// Start a fake player. Its UDN is `uuid:<serial>`; the topology it
    /// reports has one group led by `coordinator`.
    pub async fn start(serial: &str, room: &str, coordinator: &str) -> Self {
        let mut server = mockito::Server::new_async().await;

        let description = server
            .mock("GET", DESCRIPTION_PATH)
            .with_status(200)
            .with_header("content-type", "text/xml")
            .with_body(description_xml(serial, room))
            .create_async()
            .await;

        let topology = server
            .mock("POST", "/ZoneGroupTopology/Control")
            .with_status(200)
            .with_body(topology_response(coordinator, serial))
            .create_async()
            .await;

        Self {
            server,
            serial: serial.to_string(),
            room: room.to_string(),
            description,
            topology,
        }
    }

    pub fn location(&self) -> String {
        format!("{}{}", self.server.url(), DESCRIPTION_PATH)
    }

    /// SSDP answer pointing at this player
    pub fn ssdp_response(&self) -> String {
        ssdp_response(&self.location(), &self.serial)
    }
}

pub fn description_xml(serial: &str, room: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<root xmlns="urn:schemas-upnp-org:device-1-0">
  <specVersion><major>1</major><minor>0</minor></specVersion>
  <device>
    <deviceType>urn:schemas-upnp-org:device:ZonePlayer:1</deviceType>
    <friendlyName>127.0.0.1 - Sonos One - {serial}</friendlyName>
    <manufacturer>Sonos, Inc.</manufacturer>
    <modelName>Sonos One</modelName>
    <hardwareVersion>1.8.3.7-2.0</hardwareVersion>
    <serialNum>{serial}</serialNum>
    <UDN>uuid:{serial}</UDN>
    <roomName>{room}</roomName>
  </device>
</root>"#
    )
}

pub fn topology_response(coordinator: &str, member: &str) -> String {
    format!(
        r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/"><s:Body><u:GetZoneGroupStateResponse xmlns:u="urn:schemas-upnp-org:service:ZoneGroupTopology:1"><ZoneGroupState>&lt;ZoneGroupState&gt;&lt;ZoneGroups&gt;&lt;ZoneGroup Coordinator=&quot;{coordinator}&quot; ID=&quot;{coordinator}:7&quot;&gt;&lt;ZoneGroupMember UUID=&quot;{coordinator}&quot; Location=&quot;http://127.0.0.1:1400/xml/device_description.xml&quot; ZoneName=&quot;Room&quot;/&gt;&lt;ZoneGroupMember UUID=&quot;{member}&quot; Location=&quot;http://127.0.0.1:1400/xml/device_description.xml&quot; ZoneName=&quot;Room&quot;/&gt;&lt;/ZoneGroup&gt;&lt;/ZoneGroups&gt;&lt;VanishedDevices/&gt;&lt;/ZoneGroupState&gt;</ZoneGroupState></u:GetZoneGroupStateResponse></s:Body></s:Envelope>"#
    )
}

pub fn ssdp_response(location: &str, serial: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\n\
         CACHE-CONTROL: max-age = 1800\r\n\
         EXT:\r\n\
         LOCATION: {}\r\n\
         SERVER: Linux UPnP/1.0 Sonos/70.3-88200 (ZPS9)\r\n\
         ST: urn:schemas-upnp-org:device:ZonePlayer:1\r\n\
         USN: uuid:{}::urn:schemas-upnp-org:device:ZonePlayer:1\r\n\r\n",
        location, serial
    )
}

/// Answer the first probe received with every datagram in `answers`, in
/// order. Returns the address to send probes to.
pub async fn spawn_responder(answers: Vec<String>) -> (SocketAddr, JoinHandle<String>) {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let mut buffer = [0u8; 2048];
        let (len, from) = socket.recv_from(&mut buffer).await.unwrap();
        for answer in answers {
            socket.send_to(answer.as_bytes(), from).await.unwrap();
        }
        String::from_utf8_lossy(&buffer[..len]).into_owned()
    });

    (addr, handle)
}
