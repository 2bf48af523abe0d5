//! Search for group coordinators on the local network.
//!
//! A search sends one probe, then reads answers on the shared discovery
//! socket until its deadline. Each new location is resolved on its own task:
//! fetch the description, ask for the topology, and hand coordinators to the
//! registry. Failures on one answer never stop the search.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use sonos_api::SonosClient;
use sonos_discovery::{parse_ssdp_response, DiscoveryError, SsdpSocket};
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::Instant;
use url::Url;

use crate::error::{ControlPointError, Result};
use crate::registry::Registry;
use crate::zone_player::{EventSink, ZonePlayer};

/// Called once for every coordinator a search registers.
pub(crate) type FoundCallback = Arc<dyn Fn(Arc<ZonePlayer>) + Send + Sync>;

/// Where a search reads answers from.
#[async_trait]
pub(crate) trait DatagramSource: Send + Sync + 'static {
    async fn recv(&self) -> sonos_discovery::Result<(String, SocketAddr)>;
}

#[async_trait]
impl DatagramSource for SsdpSocket {
    async fn recv(&self) -> sonos_discovery::Result<(String, SocketAddr)> {
        SsdpSocket::recv(self).await
    }
}

/// The open socket plus a token every running search holds; once all tokens
/// are dropped the socket has no users left.
struct Active {
    socket: Arc<SsdpSocket>,
    running: mpsc::Sender<()>,
}

pub(crate) struct Discovery {
    active: Mutex<Option<Active>>,
    stopped: tokio::sync::Mutex<mpsc::Receiver<()>>,
    local_addr: SocketAddr,
    targets: Vec<SocketAddr>,
    search_target: String,
    mx: u32,
    registry: Arc<Registry>,
    client: SonosClient,
    sink: EventSink,
    shutdown: watch::Receiver<bool>,
}

impl Discovery {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        socket: SsdpSocket,
        targets: Vec<SocketAddr>,
        search_target: String,
        mx: u32,
        registry: Arc<Registry>,
        client: SonosClient,
        sink: EventSink,
        shutdown: watch::Receiver<bool>,
    ) -> Result<Self> {
        let local_addr = socket.local_addr()?;
        let (running, stopped) = mpsc::channel(1);
        Ok(Self {
            active: Mutex::new(Some(Active {
                socket: Arc::new(socket),
                running,
            })),
            stopped: tokio::sync::Mutex::new(stopped),
            local_addr,
            targets,
            search_target,
            mx,
            registry,
            client,
            sink,
            shutdown,
        })
    }

    /// Address the socket was bound to, still known after [`Discovery::close`].
    pub(crate) fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Send the probe and start reading answers until `deadline`.
    ///
    /// A failure to send is returned here. The returned handle completes when
    /// the search stops; searches running at the same time share the socket,
    /// so each answer is seen by one of them.
    pub(crate) async fn search(
        self: &Arc<Self>,
        deadline: Instant,
        on_found: FoundCallback,
    ) -> Result<JoinHandle<()>> {
        let (socket, running) = match self.active.lock().as_ref() {
            Some(active) if !*self.shutdown.borrow() => {
                (Arc::clone(&active.socket), active.running.clone())
            }
            _ => return Err(ControlPointError::Closed),
        };

        socket
            .send_probe(&self.targets, &self.search_target, self.mx)
            .await?;

        let discovery = Arc::clone(self);
        Ok(tokio::spawn(async move {
            let _running = running;
            discovery.receive_until(socket, deadline, on_found).await;
        }))
    }

    /// Release the socket once every running search has stopped.
    ///
    /// Searches stop on the shutdown signal, so send that first.
    pub(crate) async fn close(&self) {
        let active = self.active.lock().take();
        let Some(active) = active else {
            return;
        };
        drop(active);

        // Every sender is gone once the last search returns
        let _ = self.stopped.lock().await.recv().await;
        tracing::debug!(local = %self.local_addr, "discovery socket closed");
    }

    async fn receive_until<S: DatagramSource>(
        self: Arc<Self>,
        source: Arc<S>,
        deadline: Instant,
        on_found: FoundCallback,
    ) {
        let mut shutdown = self.shutdown.clone();
        let mut resolving = JoinSet::new();
        let mut seen = HashSet::new();
        let expiry = tokio::time::sleep_until(deadline);
        tokio::pin!(expiry);

        loop {
            tokio::select! {
                _ = &mut expiry => break,
                _ = shutdown.changed() => break,
                Some(_) = resolving.join_next(), if !resolving.is_empty() => {}
                received = source.recv() => {
                    let (text, from) = match received {
                        Ok(received) => received,
                        Err(e) if socket_gone(&e) => {
                            tracing::warn!("discovery socket unusable: {}", e);
                            break;
                        }
                        Err(e) => {
                            tracing::warn!("discovery read failed: {}", e);
                            continue;
                        }
                    };

                    let Some(response) = parse_ssdp_response(&text) else {
                        tracing::debug!(%from, "ignoring datagram that is not an SSDP response");
                        continue;
                    };
                    if !seen.insert(response.location.clone()) {
                        continue;
                    }

                    tracing::debug!(%from, location = %response.location, "SSDP response");
                    let discovery = Arc::clone(&self);
                    let on_found = Arc::clone(&on_found);
                    resolving.spawn(async move {
                        discovery.resolve(&response.location, deadline, on_found).await;
                    });
                }
            }
        }

        // No callbacks after this point
        resolving.shutdown().await;
        tracing::debug!(locations = seen.len(), "search finished");
    }

    async fn resolve(&self, location: &str, deadline: Instant, on_found: FoundCallback) {
        let location = match Url::parse(location) {
            Ok(location) => location,
            Err(e) => {
                tracing::debug!(location, "invalid location: {}", e);
                return;
            }
        };

        let player =
            match ZonePlayer::from_location(&location, self.client.clone(), self.sink.clone()).await {
                Ok(player) => player,
                Err(e) => {
                    tracing::warn!(%location, "failed to resolve zone player: {}", e);
                    return;
                }
            };

        if self.registry.contains(player.serial_number()) {
            return;
        }
        if !player.is_coordinator().await {
            tracing::debug!(serial_number = player.serial_number(), "not a group coordinator");
            return;
        }

        if Instant::now() >= deadline || *self.shutdown.borrow() {
            return;
        }
        let player = Arc::new(player);
        if !self.registry.insert_if_absent(Arc::clone(&player)) {
            return;
        }

        tracing::info!(
            serial_number = player.serial_number(),
            room = player.room_name(),
            "found zone player"
        );
        on_found(player);
    }
}

/// Errors after which the socket will never deliver another datagram.
fn socket_gone(error: &DiscoveryError) -> bool {
    matches!(
        error,
        DiscoveryError::Io(e) if matches!(e.kind(), ErrorKind::NotConnected | ErrorKind::BrokenPipe)
    )
}
