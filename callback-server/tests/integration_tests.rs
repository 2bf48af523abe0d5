//! Integration tests for the callback server.
//!
//! These tests start a real HTTP server on loopback and send actual HTTP
//! requests to it.

use std::sync::Arc;
use std::time::Duration;

use callback_server::{CallbackServer, ChannelRouter, NotificationPayload};
use tokio::sync::mpsc;
use tokio::time::timeout;

const SERIAL: &str = "RINCON_000E58A0123401400";

const EVENT_XML: &str = r#"<?xml version="1.0"?>
<e:propertyset xmlns:e="urn:schemas-upnp-org:event-1-0">
    <e:property>
        <LastChange>&lt;Event xmlns=&quot;urn:schemas-upnp-org:metadata-1-0/AVT/&quot;&gt;&lt;InstanceID val=&quot;0&quot;&gt;&lt;TransportState val=&quot;PLAYING&quot;/&gt;&lt;/InstanceID&gt;&lt;/Event&gt;</LastChange>
    </e:property>
</e:propertyset>"#;

async fn start_server() -> (
    CallbackServer,
    ChannelRouter,
    mpsc::UnboundedReceiver<NotificationPayload>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let router = ChannelRouter::new(tx);
    router.register(SERIAL).await;

    let server = CallbackServer::bind("127.0.0.1:0".parse().unwrap(), Arc::new(router.clone()))
        .await
        .expect("Failed to bind callback server");

    (server, router, rx)
}

fn notify(client: &reqwest::Client, url: &str) -> reqwest::RequestBuilder {
    client
        .request(reqwest::Method::from_bytes(b"NOTIFY").unwrap(), url)
        .header("NT", "upnp:event")
        .header("NTS", "upnp:propchange")
        .header("SID", "uuid:RINCON_000E58A0123401400_sub0000000001")
        .header("SEQ", "0")
        .header("Content-Type", "text/xml; charset=\"utf-8\"")
}

#[tokio::test]
async fn test_notification_is_routed_end_to_end() {
    let (server, _router, mut rx) = start_server().await;
    assert_ne!(server.port(), 0);

    let client = reqwest::Client::new();
    let url = format!(
        "http://{}/MediaRenderer/AVTransport/Event?sn={}",
        server.local_addr(),
        SERIAL
    );

    let response = notify(&client, &url)
        .body(EVENT_XML)
        .send()
        .await
        .expect("Failed to send notification");

    assert_eq!(response.status(), 200);
    assert!(response.bytes().await.unwrap().is_empty());

    let payload = timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("Timeout waiting for notification")
        .expect("Channel closed");

    assert_eq!(payload.serial_number, SERIAL);
    assert_eq!(payload.path, "/MediaRenderer/AVTransport/Event");
    assert_eq!(payload.body_text(), EVENT_XML);

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_missing_serial_returns_not_found() {
    let (server, _router, mut rx) = start_server().await;
    let client = reqwest::Client::new();

    let url = format!("http://{}/MediaRenderer/AVTransport/Event", server.local_addr());
    let response = notify(&client, &url).body(EVENT_XML).send().await.unwrap();

    assert_eq!(response.status(), 404);
    assert!(response.bytes().await.unwrap().is_empty());
    assert!(rx.try_recv().is_err());

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_unknown_serial_returns_not_found() {
    let (server, router, mut rx) = start_server().await;
    let client = reqwest::Client::new();

    let url = format!(
        "http://{}/MediaRenderer/AVTransport/Event?sn=RINCON_FFFFFFFFFFFF01400",
        server.local_addr()
    );
    let response = notify(&client, &url).body(EVENT_XML).send().await.unwrap();
    assert_eq!(response.status(), 404);

    router.unregister(SERIAL).await;
    let url = format!(
        "http://{}/MediaRenderer/AVTransport/Event?sn={}",
        server.local_addr(),
        SERIAL
    );
    let response = notify(&client, &url).body(EVENT_XML).send().await.unwrap();
    assert_eq!(response.status(), 404);

    assert!(rx.try_recv().is_err());
    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_any_method_is_accepted() {
    let (server, _router, mut rx) = start_server().await;
    let client = reqwest::Client::new();
    let url = format!("http://{}/anything?sn={}", server.local_addr(), SERIAL);

    for method in [reqwest::Method::GET, reqwest::Method::POST, reqwest::Method::PUT] {
        let response = client.request(method, &url).send().await.unwrap();
        assert_eq!(response.status(), 200);
    }

    for _ in 0..3 {
        let payload = timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(payload.path, "/anything");
        assert!(payload.body.is_empty());
    }

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_concurrent_notifications() {
    let (server, _router, mut rx) = start_server().await;
    let client = reqwest::Client::new();
    let url = format!(
        "http://{}/MediaRenderer/RenderingControl/Event?sn={}",
        server.local_addr(),
        SERIAL
    );

    let requests: Vec<_> = (0..20)
        .map(|i| {
            let request = notify(&client, &url).header("SEQ", i.to_string()).body(EVENT_XML);
            tokio::spawn(async move { request.send().await.map(|r| r.status()) })
        })
        .collect();

    for request in requests {
        assert_eq!(request.await.unwrap().unwrap(), 200);
    }

    let mut received = 0;
    while let Ok(Some(_)) = timeout(Duration::from_millis(200), rx.recv()).await {
        received += 1;
    }
    assert_eq!(received, 20);

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_shutdown_stops_accepting() {
    let (server, _router, _rx) = start_server().await;
    let addr = server.local_addr();

    server.shutdown().await.unwrap();

    let client = reqwest::Client::new();
    let result = client
        .get(format!("http://{}/x?sn={}", addr, SERIAL))
        .timeout(Duration::from_secs(1))
        .send()
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_bind_conflict_is_an_error() {
    let (server, _router, _rx) = start_server().await;
    let (tx, _rx2) = mpsc::unbounded_channel();

    let result = CallbackServer::bind(server.local_addr(), Arc::new(ChannelRouter::new(tx))).await;
    assert!(result.is_err());

    server.shutdown().await.unwrap();
}
