use std::fmt;

use sonos_parser::ParseResult;

use crate::events::{self, ServiceEvent};

/// The UPnP services exposed by a Sonos zone player
///
/// Each variant maps to a fixed control path, event path and service URN; see
/// [`Service::info`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// Alarms and the device clock
    AlarmClock,

    /// AVTransport service - Controls playback (play, pause, stop, seek, etc.)
    AVTransport,

    ConnectionManager,

    /// Music library browsing
    ContentDirectory,

    /// Zone name, LEDs, household identity
    DeviceProperties,

    /// GroupManagement service - Manages speaker group membership operations
    GroupManagement,

    /// GroupRenderingControl service - Controls group-wide audio settings
    GroupRenderingControl,

    MusicServices,

    QPlay,

    /// The playback queue
    Queue,

    /// RenderingControl service - Controls audio rendering (volume, mute, etc.)
    RenderingControl,

    SystemProperties,

    VirtualLineIn,

    /// ZoneGroupTopology service - Manages speaker grouping and topology
    ZoneGroupTopology,
}

/// Contains the endpoint and service URI information for a UPnP service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceInfo {
    /// Absolute SOAP control path, relative to the device base URL
    pub control_path: &'static str,

    /// Absolute GENA event path, relative to the device base URL
    pub event_path: &'static str,

    /// The UPnP service URI used in SOAP requests
    pub service_uri: &'static str,
}

impl Service {
    /// Every service kind, in a stable order
    pub const ALL: [Service; 14] = [
        Service::AlarmClock,
        Service::AVTransport,
        Service::ConnectionManager,
        Service::ContentDirectory,
        Service::DeviceProperties,
        Service::GroupManagement,
        Service::GroupRenderingControl,
        Service::MusicServices,
        Service::QPlay,
        Service::Queue,
        Service::RenderingControl,
        Service::SystemProperties,
        Service::VirtualLineIn,
        Service::ZoneGroupTopology,
    ];

    /// Get the name of this service as a string
    pub fn name(&self) -> &'static str {
        match self {
            Service::AlarmClock => "AlarmClock",
            Service::AVTransport => "AVTransport",
            Service::ConnectionManager => "ConnectionManager",
            Service::ContentDirectory => "ContentDirectory",
            Service::DeviceProperties => "DeviceProperties",
            Service::GroupManagement => "GroupManagement",
            Service::GroupRenderingControl => "GroupRenderingControl",
            Service::MusicServices => "MusicServices",
            Service::QPlay => "QPlay",
            Service::Queue => "Queue",
            Service::RenderingControl => "RenderingControl",
            Service::SystemProperties => "SystemProperties",
            Service::VirtualLineIn => "VirtualLineIn",
            Service::ZoneGroupTopology => "ZoneGroupTopology",
        }
    }

    /// Get the control path, event path and URN for this service
    pub fn info(&self) -> ServiceInfo {
        match self {
            Service::AlarmClock => ServiceInfo {
                control_path: "/AlarmClock/Control",
                event_path: "/AlarmClock/Event",
                service_uri: "urn:schemas-upnp-org:service:AlarmClock:1",
            },
            Service::AVTransport => ServiceInfo {
                control_path: "/MediaRenderer/AVTransport/Control",
                event_path: "/MediaRenderer/AVTransport/Event",
                service_uri: "urn:schemas-upnp-org:service:AVTransport:1",
            },
            Service::ConnectionManager => ServiceInfo {
                control_path: "/MediaServer/ConnectionManager/Control",
                event_path: "/MediaServer/ConnectionManager/Event",
                service_uri: "urn:schemas-upnp-org:service:ConnectionManager:1",
            },
            Service::ContentDirectory => ServiceInfo {
                control_path: "/MediaServer/ContentDirectory/Control",
                event_path: "/MediaServer/ContentDirectory/Event",
                service_uri: "urn:schemas-upnp-org:service:ContentDirectory:1",
            },
            Service::DeviceProperties => ServiceInfo {
                control_path: "/DeviceProperties/Control",
                event_path: "/DeviceProperties/Event",
                service_uri: "urn:schemas-upnp-org:service:DeviceProperties:1",
            },
            Service::GroupManagement => ServiceInfo {
                control_path: "/GroupManagement/Control",
                event_path: "/GroupManagement/Event",
                service_uri: "urn:schemas-upnp-org:service:GroupManagement:1",
            },
            Service::GroupRenderingControl => ServiceInfo {
                control_path: "/MediaRenderer/GroupRenderingControl/Control",
                event_path: "/MediaRenderer/GroupRenderingControl/Event",
                service_uri: "urn:schemas-upnp-org:service:GroupRenderingControl:1",
            },
            Service::MusicServices => ServiceInfo {
                control_path: "/MusicServices/Control",
                event_path: "/MusicServices/Event",
                service_uri: "urn:schemas-upnp-org:service:MusicServices:1",
            },
            Service::QPlay => ServiceInfo {
                control_path: "/QPlay/Control",
                event_path: "/QPlay/Event",
                service_uri: "urn:schemas-tencent-com:service:QPlay:1",
            },
            Service::Queue => ServiceInfo {
                control_path: "/MediaRenderer/Queue/Control",
                event_path: "/MediaRenderer/Queue/Event",
                service_uri: "urn:schemas-sonos-com:service:Queue:1",
            },
            Service::RenderingControl => ServiceInfo {
                control_path: "/MediaRenderer/RenderingControl/Control",
                event_path: "/MediaRenderer/RenderingControl/Event",
                service_uri: "urn:schemas-upnp-org:service:RenderingControl:1",
            },
            Service::SystemProperties => ServiceInfo {
                control_path: "/SystemProperties/Control",
                event_path: "/SystemProperties/Event",
                service_uri: "urn:schemas-upnp-org:service:SystemProperties:1",
            },
            Service::VirtualLineIn => ServiceInfo {
                control_path: "/MediaRenderer/VirtualLineIn/Control",
                event_path: "/MediaRenderer/VirtualLineIn/Event",
                service_uri: "urn:schemas-upnp-org:service:VirtualLineIn:1",
            },
            Service::ZoneGroupTopology => ServiceInfo {
                control_path: "/ZoneGroupTopology/Control",
                event_path: "/ZoneGroupTopology/Event",
                service_uri: "urn:schemas-upnp-org:service:ZoneGroupTopology:1",
            },
        }
    }

    /// Decode a NOTIFY body sent for this service into typed events,
    /// in document order.
    pub fn parse_event(&self, xml: &str) -> ParseResult<Vec<ServiceEvent>> {
        events::parse_event(*self, xml)
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
