#![allow(clippy::unwrap_used)]
// End-to-end tests: live probe against wiremock, resolved through the pipeline.

use std::time::Duration;

use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use linkwatch_core::{
    DeviceConfig, FetchErrorKind, LiveProbe, NoResources, ProbeResult, ProbeSource,
    StatusResolver,
};

const INFO_PAGE: &str = "<html><head>\n<script type=\"text/javascript\">\n\
setWirelessTable('00:26:18:85:25:87','','eth1','0:28:11','39M','78M','ok','-57','-79','22','453');\n\
</script>\n</head></html>\n";

const EMPTY_TABLE_PAGE: &str = "<html>\n<script>\nsetWirelessTable();\n</script>\n</html>\n";

// ── Helpers ─────────────────────────────────────────────────────────

fn config_for(url: &str) -> DeviceConfig {
    let mut config = DeviceConfig::new(Url::parse(url).unwrap()).unwrap();
    config.timeout = Duration::from_millis(500);
    config.accept_invalid_certs = false;
    config
}

async fn serve(template: ResponseTemplate) -> (MockServer, DeviceConfig) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Info.live.htm"))
        .respond_with(template)
        .mount(&server)
        .await;
    let config = config_for(&format!("{}/Info.live.htm", server.uri()));
    (server, config)
}

fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}/Info.live.htm")
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_associated_device_resolves_to_band() {
    let (_server, config) = serve(ResponseTemplate::new(200).set_body_string(INFO_PAGE)).await;
    let probe = LiveProbe::new(&config).unwrap();
    let resolver = StatusResolver::new(config, &NoResources).unwrap();

    let state = resolver.tick(&probe).await.unwrap();
    assert_eq!(state.band, "high");
    assert_eq!(state.level, Some(45));
    assert_eq!(state.tooltip, "SNR: 22 / Q: 45%");

    let json = serde_json::to_value(&state).unwrap();
    assert_eq!(json["band"], "high");
    assert_eq!(json["level"], 45);
}

#[tokio::test]
async fn test_page_without_match_resolves_to_nocon() {
    let (_server, config) =
        serve(ResponseTemplate::new(200).set_body_string(EMPTY_TABLE_PAGE)).await;
    let probe = LiveProbe::new(&config).unwrap();
    assert_eq!(probe.probe().await, ProbeResult::NoMatch);

    let resolver = StatusResolver::new(config, &NoResources).unwrap();
    let state = resolver.tick(&probe).await.unwrap();
    assert_eq!(state.band, "nocon");
    assert_eq!(state.tooltip, "ERR: no wifi connection");
}

#[tokio::test]
async fn test_http_error_resolves_to_error_band() {
    let (_server, config) = serve(ResponseTemplate::new(503)).await;
    let probe = LiveProbe::new(&config).unwrap();

    match probe.probe().await {
        ProbeResult::FetchError(err) => {
            assert_eq!(err.kind, FetchErrorKind::Protocol);
            assert_eq!(err.errno, Some(503));
        }
        other => panic!("expected fetch error, got {other:?}"),
    }

    let resolver = StatusResolver::new(config, &NoResources).unwrap();
    let state = resolver.tick(&probe).await.unwrap();
    assert_eq!(state.band, "error");
    assert_eq!(state.tooltip, "ERR: http Service Unavailable");
}

#[tokio::test]
async fn test_connection_refused_resolves_to_error_band() {
    let mut config = config_for(&closed_port_url());
    config.messages.url_error = "url {strerror}".parse().unwrap();
    let probe = LiveProbe::new(&config).unwrap();

    let err = match probe.probe().await {
        ProbeResult::FetchError(err) => err,
        other => panic!("expected fetch error, got {other:?}"),
    };
    assert_eq!(err.kind, FetchErrorKind::Connection);

    let resolver = StatusResolver::new(config, &NoResources).unwrap();
    let state = resolver.resolve(ProbeResult::FetchError(err.clone())).unwrap();
    assert_eq!(state.band, "error");
    assert_eq!(state.tooltip, format!("ERR: url {}", err.strerror));
}

#[tokio::test]
async fn test_slow_device_resolves_to_timeout() {
    let (_server, config) = serve(
        ResponseTemplate::new(200)
            .set_body_string(INFO_PAGE)
            .set_delay(Duration::from_secs(3)),
    )
    .await;
    let probe = LiveProbe::new(&config).unwrap();

    let started = std::time::Instant::now();
    match probe.probe().await {
        ProbeResult::FetchError(err) => assert_eq!(err.kind, FetchErrorKind::Timeout),
        other => panic!("expected timeout, got {other:?}"),
    }
    assert!(started.elapsed() < Duration::from_secs(2));
}
