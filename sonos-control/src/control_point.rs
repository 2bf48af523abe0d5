//! The control point: owns the discovery socket, the event server and the
//! zone player registry.

use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use callback_server::CallbackServer;
use soap_client::SoapClient;
use sonos_api::{event_url, Service, SonosClient};
use sonos_discovery::SsdpSocket;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use url::Url;

use crate::config::ControlPointConfig;
use crate::discovery::Discovery;
use crate::error::{ControlPointError, Result};
use crate::events::RegistryRouter;
use crate::registry::Registry;
use crate::subscription::{callback_url, local_addr_towards, Subscription};
use crate::zone_player::{EventSink, ZonePlayer};

/// Entry point for finding zone players and receiving their events.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use sonos_api::Service;
/// use sonos_control::{ControlPoint, ControlPointConfig};
/// use tokio::sync::mpsc;
/// use tokio::time::Instant;
///
/// # async fn example() -> sonos_control::Result<()> {
/// let (events_tx, mut events) = mpsc::unbounded_channel();
/// let control_point = ControlPoint::new(ControlPointConfig::default(), events_tx).await?;
///
/// let deadline = Instant::now() + Duration::from_secs(2);
/// let kitchen = control_point.find_room(deadline, "Kitchen").await?;
///
/// let deadline = Instant::now() + Duration::from_secs(5);
/// let subscription = control_point
///     .subscribe(deadline, &kitchen, Service::AVTransport)
///     .await?;
/// println!("subscribed with {}", subscription.sid());
///
/// while let Some(event) = events.recv().await {
///     println!("{}", event);
/// }
/// # Ok(())
/// # }
/// ```
pub struct ControlPoint {
    config: ControlPointConfig,
    registry: Arc<Registry>,
    client: SonosClient,
    sink: EventSink,
    discovery: Arc<Discovery>,
    server: Mutex<Option<CallbackServer>>,
    event_addr: SocketAddr,
    shutdown_tx: watch::Sender<bool>,
}

impl ControlPoint {
    /// Bind the discovery socket and start the event server.
    ///
    /// Zone players built by this control point send their events to
    /// `event_sink`.
    pub async fn new(config: ControlPointConfig, event_sink: EventSink) -> Result<Self> {
        config.validate()?;

        let client = SonosClient::with_soap_client(SoapClient::with_timeout(config.http_timeout));
        let registry = Arc::new(Registry::new());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let socket = SsdpSocket::bind(config.discovery_bind_addr).await?;
        let router = Arc::new(RegistryRouter::new(Arc::clone(&registry)));
        let server = CallbackServer::bind(config.event_server_addr, router).await?;
        let event_addr = server.local_addr();

        let discovery = Arc::new(Discovery::new(
            socket,
            config.search_targets.clone(),
            config.search_target.clone(),
            config.mx,
            Arc::clone(&registry),
            client.clone(),
            event_sink.clone(),
            shutdown_rx,
        )?);

        tracing::info!(
            discovery = %discovery.local_addr(),
            events = %event_addr,
            "control point started"
        );

        Ok(Self {
            config,
            registry,
            client,
            sink: event_sink,
            discovery,
            server: Mutex::new(Some(server)),
            event_addr,
            shutdown_tx,
        })
    }

    pub fn config(&self) -> &ControlPointConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Address the event server is bound to
    pub fn event_addr(&self) -> SocketAddr {
        self.event_addr
    }

    /// Address the discovery socket is, or was until shutdown, bound to
    pub fn discovery_addr(&self) -> SocketAddr {
        self.discovery.local_addr()
    }

    /// Probe for zone players and register the coordinators that answer
    /// before `deadline`.
    ///
    /// Returns once the probe is sent; a send failure is the only error.
    /// `on_found` runs once per newly registered coordinator, never after
    /// the deadline. Await the returned handle to wait for the search to
    /// end.
    pub async fn search<F>(&self, deadline: Instant, on_found: F) -> Result<JoinHandle<()>>
    where
        F: Fn(Arc<ZonePlayer>) + Send + Sync + 'static,
    {
        self.discovery.search(deadline, Arc::new(on_found)).await
    }

    /// Register a zone player found some other way than [`ControlPoint::search`].
    ///
    /// # Errors
    ///
    /// - `NotCoordinator` if the player does not lead a zone group right now
    /// - `AlreadyRegistered` if its serial number is taken; the existing entry
    ///   is kept
    pub async fn register(&self, player: ZonePlayer) -> Result<Arc<ZonePlayer>> {
        let serial_number = player.serial_number().to_string();
        if !player.is_coordinator().await {
            return Err(ControlPointError::NotCoordinator(serial_number));
        }

        let player = Arc::new(player);
        if self.registry.insert_if_absent(Arc::clone(&player)) {
            Ok(player)
        } else {
            Err(ControlPointError::AlreadyRegistered(serial_number))
        }
    }

    pub fn lookup(&self, serial_number: &str) -> Result<Arc<ZonePlayer>> {
        self.registry
            .get(serial_number)
            .ok_or_else(|| ControlPointError::NotFound(serial_number.to_string()))
    }

    /// A coordinator whose room is `room_name`: a registered one if there is
    /// one, otherwise the first such coordinator a new search finds.
    pub async fn find_room(&self, deadline: Instant, room_name: &str) -> Result<Arc<ZonePlayer>> {
        if let Some(player) = self.registry.find_by_room(room_name) {
            return Ok(player);
        }

        let (found_tx, mut found_rx) = mpsc::unbounded_channel();
        let wanted = room_name.to_string();
        let search = self
            .search(deadline, move |player| {
                if player.room_name() == wanted {
                    let _ = found_tx.send(player);
                }
            })
            .await?;

        let found = tokio::time::timeout_at(deadline, found_rx.recv()).await;
        search.abort();

        match found {
            Ok(Some(player)) => Ok(player),
            // Another search may have registered the room in the meantime
            _ => self
                .registry
                .find_by_room(room_name)
                .ok_or_else(|| ControlPointError::Timeout(room_name.to_string())),
        }
    }

    /// Build a zone player from its description URL, sending events to this
    /// control point's sink. The player is not registered.
    pub async fn zone_player_from_location(&self, location: &Url) -> Result<ZonePlayer> {
        ZonePlayer::from_location(location, self.client.clone(), self.sink.clone()).await
    }

    /// Build the zone player at `ip`; see [`ControlPoint::zone_player_from_location`].
    pub async fn zone_player_from_endpoint(&self, ip: IpAddr) -> Result<ZonePlayer> {
        ZonePlayer::from_endpoint(ip, self.client.clone(), self.sink.clone()).await
    }

    /// Ask `player` to send `service` events to the event server.
    ///
    /// Events only reach the sink once the player is registered.
    pub async fn subscribe(
        &self,
        deadline: Instant,
        player: &ZonePlayer,
        service: Service,
    ) -> Result<Subscription> {
        with_deadline(deadline, async {
            let event_url = event_url(player.base_url(), service)?;
            let local_ip = local_addr_towards(&event_url).await?;
            let callback = callback_url(
                local_ip,
                self.event_addr.port(),
                service,
                player.serial_number(),
            )?;

            let response = player
                .client()
                .subscribe(
                    player.base_url(),
                    service,
                    callback.as_str(),
                    self.config.subscription_timeout_secs(),
                )
                .await?;

            tracing::debug!(
                serial_number = player.serial_number(),
                %service,
                sid = %response.sid,
                "subscribed"
            );
            Ok(Subscription::new(
                response.sid,
                service,
                player.serial_number(),
                response.timeout_seconds,
            ))
        })
        .await
    }

    /// Renew subscription `sid` for another lease.
    pub async fn renew(
        &self,
        deadline: Instant,
        player: &ZonePlayer,
        service: Service,
        sid: &str,
    ) -> Result<()> {
        self.renew_granted(deadline, player, service, sid)
            .await
            .map(|_| ())
    }

    /// Renew `subscription` and restart its lease with what the player
    /// granted.
    pub async fn renew_lease(
        &self,
        deadline: Instant,
        player: &ZonePlayer,
        subscription: &mut Subscription,
    ) -> Result<()> {
        let granted = self
            .renew_granted(deadline, player, subscription.service(), subscription.sid())
            .await?;
        subscription.renewed(granted);
        Ok(())
    }

    pub async fn unsubscribe(
        &self,
        deadline: Instant,
        player: &ZonePlayer,
        service: Service,
        sid: &str,
    ) -> Result<()> {
        with_deadline(deadline, async {
            player
                .client()
                .unsubscribe(player.base_url(), service, sid)
                .await?;
            tracing::debug!(serial_number = player.serial_number(), %service, sid, "unsubscribed");
            Ok(())
        })
        .await
    }

    /// Stop every running search, then close the discovery socket and the
    /// event server. Further searches fail with `Closed`.
    pub async fn shutdown(&self) -> Result<()> {
        self.shutdown_tx.send_replace(true);
        self.discovery.close().await;

        if let Some(server) = self.server.lock().await.take() {
            server.shutdown().await?;
        }

        tracing::info!("control point stopped");
        Ok(())
    }

    async fn renew_granted(
        &self,
        deadline: Instant,
        player: &ZonePlayer,
        service: Service,
        sid: &str,
    ) -> Result<u32> {
        with_deadline(deadline, async {
            let granted = player
                .client()
                .renew(
                    player.base_url(),
                    service,
                    sid,
                    self.config.subscription_timeout_secs(),
                )
                .await?;
            tracing::debug!(serial_number = player.serial_number(), %service, sid, granted, "renewed");
            Ok(granted)
        })
        .await
    }
}

async fn with_deadline<T>(deadline: Instant, operation: impl Future<Output = Result<T>>) -> Result<T> {
    if Instant::now() >= deadline {
        return Err(ControlPointError::DeadlineExceeded);
    }
    tokio::time::timeout_at(deadline, operation)
        .await
        .map_err(|_| ControlPointError::DeadlineExceeded)?
}
