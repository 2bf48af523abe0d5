//! HTTP server for receiving UPnP event notifications.

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use futures::{pin_mut, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use warp::http::{Method, StatusCode};
use warp::path::FullPath;
use warp::Filter;

use crate::router::{EventRouter, NotificationPayload};

/// Query parameter naming the zone player a notification belongs to.
pub const SERIAL_QUERY_PARAM: &str = "sn";

#[derive(Debug, thiserror::Error)]
pub enum CallbackError {
    #[error("failed to bind event server on {addr}: {message}")]
    Bind { addr: SocketAddr, message: String },

    #[error("event server task failed: {0}")]
    Task(String),
}

/// HTTP server that accepts event notifications and hands them to an
/// [`EventRouter`].
///
/// Every request is answered with an empty body:
/// - 404 when the `sn` query parameter is missing or the router does not
///   know the serial number
/// - 500 when the body cannot be read
/// - 200 once the notification has been dispatched
///
/// Any HTTP method is accepted.
pub struct CallbackServer {
    local_addr: SocketAddr,
    shutdown_tx: Option<mpsc::Sender<()>>,
    server_handle: Option<JoinHandle<()>>,
}

impl CallbackServer {
    /// Bind and start serving. Port 0 picks an ephemeral port; see
    /// [`CallbackServer::port`] for the one that was chosen.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use std::sync::Arc;
    /// # use tokio::sync::mpsc;
    /// # use callback_server::{CallbackServer, ChannelRouter};
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let (tx, _rx) = mpsc::unbounded_channel();
    /// let router = Arc::new(ChannelRouter::new(tx));
    /// let server = CallbackServer::bind("0.0.0.0:0".parse()?, router).await?;
    /// println!("listening on port {}", server.port());
    /// server.shutdown().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn bind<R: EventRouter>(
        addr: SocketAddr,
        router: Arc<R>,
    ) -> Result<Self, CallbackError> {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let routes = notify_route(router);
        let (local_addr, server) = warp::serve(routes)
            .try_bind_with_graceful_shutdown(addr, async move {
                shutdown_rx.recv().await;
            })
            .map_err(|e| CallbackError::Bind {
                addr,
                message: e.to_string(),
            })?;

        let server_handle = tokio::spawn(server);
        tracing::info!(%local_addr, "event server listening");

        Ok(Self {
            local_addr,
            shutdown_tx: Some(shutdown_tx),
            server_handle: Some(server_handle),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }

    /// Stop accepting requests and wait for in-flight ones to finish.
    pub async fn shutdown(mut self) -> Result<(), CallbackError> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(()).await;
        }

        if let Some(handle) = self.server_handle.take() {
            handle
                .await
                .map_err(|e| CallbackError::Task(e.to_string()))?;
        }

        tracing::info!(local_addr = %self.local_addr, "event server stopped");
        Ok(())
    }
}

impl Drop for CallbackServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.try_send(());
        }
    }
}

fn notify_route<R: EventRouter>(
    router: Arc<R>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = std::convert::Infallible> + Clone {
    let raw_query = warp::query::raw()
        .or(warp::any().map(String::new))
        .unify();

    warp::method()
        .and(warp::path::full())
        .and(raw_query)
        .and(warp::body::stream())
        .and_then(move |method: Method, path: FullPath, query: String, body| {
            let router = router.clone();
            async move {
                let status = handle_notification(
                    router.as_ref(),
                    &method,
                    path.as_str(),
                    &query,
                    body,
                )
                .await;
                Ok::<_, warp::Rejection>(warp::reply::with_status(warp::reply(), status))
            }
        })
        .recover(handle_rejection)
}

async fn handle_rejection(
    err: warp::Rejection,
) -> Result<impl warp::Reply, std::convert::Infallible> {
    tracing::debug!(?err, "rejected event request");
    Ok(warp::reply::with_status(warp::reply(), StatusCode::NOT_FOUND))
}

/// Serial number carried in a raw query string, if any.
pub fn serial_from_query(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == SERIAL_QUERY_PARAM)
        .map(|(_, value)| value.into_owned())
}

/// Route one request. The serial is resolved before any of the body is read.
pub(crate) async fn handle_notification<R, S, B, E>(
    router: &R,
    method: &Method,
    path: &str,
    query: &str,
    body: S,
) -> StatusCode
where
    R: EventRouter,
    S: Stream<Item = Result<B, E>>,
    B: Buf,
    E: std::fmt::Display,
{
    let Some(serial_number) = serial_from_query(query) else {
        tracing::debug!(%method, path, "event request without serial number");
        return StatusCode::NOT_FOUND;
    };

    let Some(target) = router.resolve(&serial_number).await else {
        tracing::debug!(%method, path, serial_number, "event for unknown zone player");
        return StatusCode::NOT_FOUND;
    };

    let body = match read_body(body).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(path, serial_number, "failed to read event body: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
    };

    tracing::trace!(%method, path, serial_number, bytes = body.len(), "event received");
    router
        .dispatch(
            target,
            NotificationPayload {
                serial_number,
                path: path.to_string(),
                body,
            },
        )
        .await;

    StatusCode::OK
}

async fn read_body<S, B, E>(stream: S) -> Result<Bytes, E>
where
    S: Stream<Item = Result<B, E>>,
    B: Buf,
{
    pin_mut!(stream);
    let mut body = BytesMut::new();
    while let Some(chunk) = stream.next().await {
        body.put(chunk?);
    }
    Ok(body.freeze())
}
