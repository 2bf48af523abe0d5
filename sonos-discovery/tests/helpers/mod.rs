//! Test helpers: inline zone player fixtures

/// A fake zone player: its description XML and the SSDP answer pointing at it
#[derive(Debug, Clone)]
pub struct DeviceFixture {
    pub serial: String,
    pub udn: String,
    pub room: String,
}

impl DeviceFixture {
    pub fn new(serial: &str, rincon: &str, room: &str) -> Self {
        Self {
            serial: serial.to_string(),
            udn: format!("uuid:{}", rincon),
            room: room.to_string(),
        }
    }

    pub fn description_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<root xmlns="urn:schemas-upnp-org:device-1-0">
  <device>
    <deviceType>urn:schemas-upnp-org:device:ZonePlayer:1</deviceType>
    <friendlyName>{room}</friendlyName>
    <manufacturer>Sonos, Inc.</manufacturer>
    <modelName>Sonos Five</modelName>
    <hardwareVersion>1.22.1.9-2.0</hardwareVersion>
    <serialNum>{serial}</serialNum>
    <UDN>{udn}</UDN>
    <roomName>{room}</roomName>
  </device>
</root>"#,
            room = self.room,
            serial = self.serial,
            udn = self.udn
        )
    }

    /// SSDP response the way a zone player phrases it
    pub fn ssdp_response(&self, location: &str) -> String {
        format!(
            "HTTP/1.1 200 OK\r\n\
             CACHE-CONTROL: max-age = 1800\r\n\
             EXT:\r\n\
             LOCATION: {}\r\n\
             SERVER: Linux UPnP/1.0 Sonos/70.3-88200 (ZPS9)\r\n\
             ST: urn:schemas-upnp-org:device:ZonePlayer:1\r\n\
             USN: {}::urn:schemas-upnp-org:device:ZonePlayer:1\r\n\
             X-RINCON-BOOTSEQ: 123\r\n\
             X-RINCON-HOUSEHOLD: Sonos_test\r\n\r\n",
            location, self.udn
        )
    }
}
