//! GENA request shape tests against a mock device

use std::time::Duration;

use mockito::{Matcher, Server};
use soap_client::{SoapClient, SoapError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;

const EVENT_PATH: &str = "/MediaRenderer/AVTransport/Event";

fn event_url(server: &Server) -> Url {
    Url::parse(&server.url()).unwrap().join(EVENT_PATH).unwrap()
}

#[tokio::test]
async fn subscribe_sends_callback_and_never_sid() {
    let mut server = Server::new_async().await;
    let callback = "http://192.168.1.50:40000/MediaRenderer/AVTransport/Event?sn=RINCON_1";

    let mock = server
        .mock("SUBSCRIBE", EVENT_PATH)
        .match_header("callback", format!("<{}>", callback).as_str())
        .match_header("nt", "upnp:event")
        .match_header("timeout", "Second-300")
        .match_header("host", Matcher::Any)
        .match_header("sid", Matcher::Missing)
        .with_status(200)
        .with_header("SID", "uuid:RINCON_1_sub0000000001")
        .with_header("TIMEOUT", "Second-300")
        .create_async()
        .await;

    let client = SoapClient::new();
    let response = client
        .subscribe(&event_url(&server), callback, 300)
        .await
        .expect("subscribe should succeed");

    assert_eq!(response.sid, "uuid:RINCON_1_sub0000000001");
    assert_eq!(response.timeout_seconds, 300);
    mock.assert_async().await;
}

#[tokio::test]
async fn subscribe_reports_body_on_rejection() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("SUBSCRIBE", EVENT_PATH)
        .with_status(412)
        .with_body("Precondition Failed")
        .create_async()
        .await;

    let client = SoapClient::new();
    let err = client
        .subscribe(&event_url(&server), "http://127.0.0.1:1/cb", 300)
        .await
        .unwrap_err();

    match err {
        SoapError::Http { status, body } => {
            assert_eq!(status, 412);
            assert_eq!(body, "Precondition Failed");
        }
        other => panic!("expected SoapError::Http, got {:?}", other),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn subscribe_without_sid_is_a_parse_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("SUBSCRIBE", EVENT_PATH)
        .with_status(200)
        .create_async()
        .await;

    let client = SoapClient::new();
    let err = client
        .subscribe(&event_url(&server), "http://127.0.0.1:1/cb", 300)
        .await
        .unwrap_err();

    assert!(matches!(err, SoapError::Parse(_)));
}

#[tokio::test]
async fn renew_sends_sid_without_callback_or_nt() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("SUBSCRIBE", EVENT_PATH)
        .match_header("sid", "uuid:RINCON_1_sub0000000001")
        .match_header("timeout", "Second-300")
        .match_header("callback", Matcher::Missing)
        .match_header("nt", Matcher::Missing)
        .with_status(200)
        .with_header("TIMEOUT", "Second-240")
        .create_async()
        .await;

    let client = SoapClient::new();
    let granted = client
        .renew_subscription(&event_url(&server), "uuid:RINCON_1_sub0000000001", 300)
        .await
        .expect("renew should succeed");

    assert_eq!(granted, 240);
    mock.assert_async().await;
}

#[tokio::test]
async fn unsubscribe_sends_sid_without_timeout() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("UNSUBSCRIBE", EVENT_PATH)
        .match_header("sid", "uuid:RINCON_1_sub0000000001")
        .match_header("host", Matcher::Any)
        .match_header("timeout", Matcher::Missing)
        .match_header("callback", Matcher::Missing)
        .match_header("nt", Matcher::Missing)
        .with_status(200)
        .create_async()
        .await;

    let client = SoapClient::new();
    client
        .unsubscribe(&event_url(&server), "uuid:RINCON_1_sub0000000001")
        .await
        .expect("unsubscribe should succeed");

    mock.assert_async().await;
}

#[tokio::test]
async fn unsubscribe_failure_carries_body_text() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("UNSUBSCRIBE", EVENT_PATH)
        .with_status(500)
        .with_body("no such subscription")
        .create_async()
        .await;

    let client = SoapClient::new();
    let err = client
        .unsubscribe(&event_url(&server), "uuid:gone")
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "HTTP 500: no such subscription");
}

#[tokio::test]
async fn call_posts_envelope_and_returns_action_response() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/ZoneGroupTopology/Control")
        .match_header(
            "soapaction",
            "\"urn:schemas-upnp-org:service:ZoneGroupTopology:1#GetZoneGroupState\"",
        )
        .match_body(Matcher::Regex("<u:GetZoneGroupState ".to_string()))
        .with_status(200)
        .with_body(
            r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body><u:GetZoneGroupStateResponse xmlns:u="urn:schemas-upnp-org:service:ZoneGroupTopology:1"><ZoneGroupState>&lt;ZoneGroups/&gt;</ZoneGroupState></u:GetZoneGroupStateResponse></s:Body></s:Envelope>"#,
        )
        .create_async()
        .await;

    let client = SoapClient::new();
    let base = Url::parse(&server.url()).unwrap();
    let element = client
        .call(
            &base,
            "/ZoneGroupTopology/Control",
            "urn:schemas-upnp-org:service:ZoneGroupTopology:1",
            "GetZoneGroupState",
            "",
        )
        .await
        .expect("call should succeed");

    assert_eq!(element.name, "GetZoneGroupStateResponse");
    mock.assert_async().await;
}

#[tokio::test]
async fn call_maps_fault_on_500() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/MediaRenderer/AVTransport/Control")
        .with_status(500)
        .with_body(
            r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body><s:Fault><faultcode>s:Client</faultcode><faultstring>UPnPError</faultstring><detail><UPnPError xmlns="urn:schemas-upnp-org:control-1-0"><errorCode>701</errorCode></UPnPError></detail></s:Fault></s:Body></s:Envelope>"#,
        )
        .create_async()
        .await;

    let client = SoapClient::new();
    let base = Url::parse(&server.url()).unwrap();
    let err = client
        .call(
            &base,
            "/MediaRenderer/AVTransport/Control",
            "urn:schemas-upnp-org:service:AVTransport:1",
            "Play",
            "<InstanceID>0</InstanceID><Speed>1</Speed>",
        )
        .await
        .unwrap_err();

    assert!(matches!(err, SoapError::Fault(701)));
}

/// Serves one connection: reads the request, then writes `reply` and hangs
/// up after `hold`.
async fn raw_device(reply: &'static str, hold: Duration) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 4096];
        let _ = stream.read(&mut request).await;
        let _ = stream.write_all(reply.as_bytes()).await;
        let _ = stream.flush().await;
        tokio::time::sleep(hold).await;
    });
    Url::parse(&format!("http://{}", addr)).unwrap().join(EVENT_PATH).unwrap()
}

#[tokio::test]
async fn rejection_with_truncated_body_is_a_network_error() {
    let url = raw_device(
        "HTTP/1.1 412 Precondition Failed\r\nContent-Length: 100\r\n\r\nPrecon",
        Duration::ZERO,
    )
    .await;

    let err = SoapClient::new()
        .unsubscribe(&url, "uuid:RINCON_1_sub0000000001")
        .await
        .unwrap_err();

    assert!(matches!(err, SoapError::Network(_)), "got {:?}", err);
}

#[tokio::test]
async fn configured_timeout_bounds_requests() {
    let url = raw_device("", Duration::from_secs(30)).await;
    let client = SoapClient::with_timeout(Duration::from_millis(200));

    let err = tokio::time::timeout(
        Duration::from_secs(5),
        client.renew_subscription(&url, "uuid:RINCON_1_sub0000000001", 300),
    )
    .await
    .expect("request outlived the configured timeout")
    .unwrap_err();

    assert!(matches!(err, SoapError::Network(_)));
}
