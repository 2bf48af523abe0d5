//! Typed service events
//!
//! A NOTIFY body is a GENA property set. Each state variable in it becomes one
//! [`ServiceEvent`]; variables with a structured payload (`LastChange`,
//! `ZoneGroupState`) are decoded further for the services that carry them.

use std::fmt;

use sonos_parser::{
    AVTransportLastChange, ParseResult, Property, PropertySet, RenderingControlLastChange,
    ZoneGroupState,
};

use crate::service::Service;

/// A state variable reported verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyChange {
    pub name: String,
    pub value: String,
}

impl From<Property> for PropertyChange {
    fn from(property: Property) -> Self {
        Self {
            name: property.name,
            value: property.value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AVTransportEvent {
    LastChange(AVTransportLastChange),
    Property(PropertyChange),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderingControlEvent {
    LastChange(RenderingControlLastChange),
    Property(PropertyChange),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneGroupTopologyEvent {
    ZoneGroupState(ZoneGroupState),
    Property(PropertyChange),
}

/// One decoded state change, tagged by the service that reported it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceEvent {
    AlarmClock(PropertyChange),
    AVTransport(AVTransportEvent),
    ConnectionManager(PropertyChange),
    ContentDirectory(PropertyChange),
    DeviceProperties(PropertyChange),
    GroupManagement(PropertyChange),
    GroupRenderingControl(PropertyChange),
    MusicServices(PropertyChange),
    QPlay(PropertyChange),
    Queue(PropertyChange),
    RenderingControl(RenderingControlEvent),
    SystemProperties(PropertyChange),
    VirtualLineIn(PropertyChange),
    ZoneGroupTopology(ZoneGroupTopologyEvent),
}

impl ServiceEvent {
    pub fn service(&self) -> Service {
        match self {
            ServiceEvent::AlarmClock(_) => Service::AlarmClock,
            ServiceEvent::AVTransport(_) => Service::AVTransport,
            ServiceEvent::ConnectionManager(_) => Service::ConnectionManager,
            ServiceEvent::ContentDirectory(_) => Service::ContentDirectory,
            ServiceEvent::DeviceProperties(_) => Service::DeviceProperties,
            ServiceEvent::GroupManagement(_) => Service::GroupManagement,
            ServiceEvent::GroupRenderingControl(_) => Service::GroupRenderingControl,
            ServiceEvent::MusicServices(_) => Service::MusicServices,
            ServiceEvent::QPlay(_) => Service::QPlay,
            ServiceEvent::Queue(_) => Service::Queue,
            ServiceEvent::RenderingControl(_) => Service::RenderingControl,
            ServiceEvent::SystemProperties(_) => Service::SystemProperties,
            ServiceEvent::VirtualLineIn(_) => Service::VirtualLineIn,
            ServiceEvent::ZoneGroupTopology(_) => Service::ZoneGroupTopology,
        }
    }
}

pub(crate) fn parse_event(service: Service, xml: &str) -> ParseResult<Vec<ServiceEvent>> {
    PropertySet::from_xml(xml)?
        .into_iter()
        .map(|property| decode_property(service, property))
        .collect()
}

fn decode_property(service: Service, property: Property) -> ParseResult<ServiceEvent> {
    let event = match service {
        Service::AVTransport if property.name == "LastChange" => ServiceEvent::AVTransport(
            AVTransportEvent::LastChange(AVTransportLastChange::from_xml(&property.value)?),
        ),
        Service::AVTransport => {
            ServiceEvent::AVTransport(AVTransportEvent::Property(property.into()))
        }
        Service::RenderingControl if property.name == "LastChange" => {
            ServiceEvent::RenderingControl(RenderingControlEvent::LastChange(
                RenderingControlLastChange::from_xml(&property.value)?,
            ))
        }
        Service::RenderingControl => {
            ServiceEvent::RenderingControl(RenderingControlEvent::Property(property.into()))
        }
        Service::ZoneGroupTopology if property.name == "ZoneGroupState" => {
            ServiceEvent::ZoneGroupTopology(ZoneGroupTopologyEvent::ZoneGroupState(
                ZoneGroupState::from_xml(&property.value)?,
            ))
        }
        Service::ZoneGroupTopology => {
            ServiceEvent::ZoneGroupTopology(ZoneGroupTopologyEvent::Property(property.into()))
        }
        Service::AlarmClock => ServiceEvent::AlarmClock(property.into()),
        Service::ConnectionManager => ServiceEvent::ConnectionManager(property.into()),
        Service::ContentDirectory => ServiceEvent::ContentDirectory(property.into()),
        Service::DeviceProperties => ServiceEvent::DeviceProperties(property.into()),
        Service::GroupManagement => ServiceEvent::GroupManagement(property.into()),
        Service::GroupRenderingControl => ServiceEvent::GroupRenderingControl(property.into()),
        Service::MusicServices => ServiceEvent::MusicServices(property.into()),
        Service::QPlay => ServiceEvent::QPlay(property.into()),
        Service::Queue => ServiceEvent::Queue(property.into()),
        Service::SystemProperties => ServiceEvent::SystemProperties(property.into()),
        Service::VirtualLineIn => ServiceEvent::VirtualLineIn(property.into()),
    };
    Ok(event)
}

impl fmt::Display for PropertyChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

impl fmt::Display for ServiceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ", self.service())?;
        match self {
            ServiceEvent::AVTransport(AVTransportEvent::LastChange(change)) => {
                write!(f, "LastChange\n{}", change)
            }
            ServiceEvent::RenderingControl(RenderingControlEvent::LastChange(change)) => {
                let volume = change
                    .volume("Master")
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "-".to_string());
                let muted = change
                    .is_muted("Master")
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "-".to_string());
                write!(f, "LastChange volume={} muted={}", volume, muted)
            }
            ServiceEvent::ZoneGroupTopology(ZoneGroupTopologyEvent::ZoneGroupState(state)) => {
                write!(
                    f,
                    "ZoneGroupState groups={} members={}",
                    state.zone_groups.len(),
                    state.member_count()
                )
            }
            ServiceEvent::AVTransport(AVTransportEvent::Property(p))
            | ServiceEvent::RenderingControl(RenderingControlEvent::Property(p))
            | ServiceEvent::ZoneGroupTopology(ZoneGroupTopologyEvent::Property(p))
            | ServiceEvent::AlarmClock(p)
            | ServiceEvent::ConnectionManager(p)
            | ServiceEvent::ContentDirectory(p)
            | ServiceEvent::DeviceProperties(p)
            | ServiceEvent::GroupManagement(p)
            | ServiceEvent::GroupRenderingControl(p)
            | ServiceEvent::MusicServices(p)
            | ServiceEvent::QPlay(p)
            | ServiceEvent::Queue(p)
            | ServiceEvent::SystemProperties(p)
            | ServiceEvent::VirtualLineIn(p) => write!(f, "{}", p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const AVT_BODY: &str = r#"<e:propertyset xmlns:e="urn:schemas-upnp-org:event-1-0"><e:property><LastChange>&lt;Event xmlns=&quot;urn:schemas-upnp-org:metadata-1-0/AVT/&quot;&gt;&lt;InstanceID val=&quot;0&quot;&gt;&lt;TransportState val=&quot;PLAYING&quot;/&gt;&lt;/InstanceID&gt;&lt;/Event&gt;</LastChange></e:property></e:propertyset>"#;

    #[test]
    fn test_av_transport_last_change() {
        let events = Service::AVTransport.parse_event(AVT_BODY).unwrap();
        assert_eq!(events.len(), 1);
        match &events[0] {
            ServiceEvent::AVTransport(AVTransportEvent::LastChange(change)) => {
                assert_eq!(change.transport_state.as_deref(), Some("PLAYING"));
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(events[0].to_string().contains("TransportState: PLAYING"));
    }

    #[test]
    fn test_rendering_control_last_change() {
        let body = r#"<e:propertyset xmlns:e="urn:schemas-upnp-org:event-1-0"><e:property><LastChange>&lt;Event&gt;&lt;InstanceID val=&quot;0&quot;&gt;&lt;Volume channel=&quot;Master&quot; val=&quot;31&quot;/&gt;&lt;/InstanceID&gt;&lt;/Event&gt;</LastChange></e:property></e:propertyset>"#;
        let events = Service::RenderingControl.parse_event(body).unwrap();
        assert_eq!(
            events[0].to_string(),
            "[RenderingControl] LastChange volume=31 muted=-"
        );
    }

    #[test]
    fn test_generic_services_yield_property_changes_in_order() {
        let body = r#"<e:propertyset xmlns:e="urn:schemas-upnp-org:event-1-0"><e:property><ZoneName>Kitchen</ZoneName></e:property><e:property><Icon>x-rincon-roomicon:kitchen</Icon></e:property></e:propertyset>"#;
        let events = Service::DeviceProperties.parse_event(body).unwrap();
        assert_eq!(
            events,
            vec![
                ServiceEvent::DeviceProperties(PropertyChange {
                    name: "ZoneName".to_string(),
                    value: "Kitchen".to_string(),
                }),
                ServiceEvent::DeviceProperties(PropertyChange {
                    name: "Icon".to_string(),
                    value: "x-rincon-roomicon:kitchen".to_string(),
                }),
            ]
        );
    }

    #[test]
    fn test_non_structured_variable_on_structured_service() {
        let body = r#"<e:propertyset xmlns:e="urn:schemas-upnp-org:event-1-0"><e:property><ThirdPartyMediaServersX>abc</ThirdPartyMediaServersX></e:property></e:propertyset>"#;
        let events = Service::ZoneGroupTopology.parse_event(body).unwrap();
        assert!(matches!(
            &events[0],
            ServiceEvent::ZoneGroupTopology(ZoneGroupTopologyEvent::Property(p)) if p.value == "abc"
        ));
    }

    #[test]
    fn test_every_service_tags_its_events() {
        let body = r#"<e:propertyset xmlns:e="urn:schemas-upnp-org:event-1-0"><e:property><Foo>1</Foo></e:property></e:propertyset>"#;
        for service in Service::ALL {
            let events = service.parse_event(body).unwrap();
            assert_eq!(events.len(), 1);
            assert_eq!(events[0].service(), service);
        }
    }

    #[test]
    fn test_malformed_bodies_are_errors() {
        assert!(Service::AVTransport.parse_event("<e:propertyset><e:property>").is_err());
        let bad_last_change = r#"<e:propertyset xmlns:e="urn:schemas-upnp-org:event-1-0"><e:property><LastChange>&lt;Event&gt;</LastChange></e:property></e:propertyset>"#;
        assert!(Service::AVTransport.parse_event(bad_last_change).is_err());
    }

    proptest! {
        #[test]
        fn parse_event_never_panics(body in ".{0,300}") {
            let _ = Service::Queue.parse_event(&body);
        }
    }
}
