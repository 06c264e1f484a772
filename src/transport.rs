//! Fetches the paired device's values from the companion HTTP endpoint.

use crate::gauges::{ErrorKind, MetricKind, Percent, RemoteTransport, Resolution, Ticket};
use crate::Error;

use std::time::Duration;

use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tokio::sync::mpsc::UnboundedSender;

pub const APP_NAME: &str = "Dual Gauge";

pub struct HttpTransport {
    client: reqwest::Client,
    url: Url,
    results: UnboundedSender<Resolution>,
}

impl HttpTransport {
    pub fn new(
        url: Url,
        timeout: Duration,
        results: UnboundedSender<Resolution>,
    ) -> Result<Self, Error> {
        Self::with_builder(reqwest::Client::builder(), url, timeout, results)
    }

    fn with_builder(
        builder: reqwest::ClientBuilder,
        url: Url,
        timeout: Duration,
        results: UnboundedSender<Resolution>,
    ) -> Result<Self, Error> {
        let client = builder
            .user_agent(format!("{}/{}", APP_NAME, env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            url,
            results,
        })
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HttpTransport({})", self.url)
    }
}

impl RemoteTransport for HttpTransport {
    fn request(&mut self, kind: MetricKind, ticket: Ticket) {
        let client = self.client.clone();
        let url = self.url.clone();
        let results = self.results.clone();

        tokio::spawn(async move {
            let outcome = fetch(&client, url, kind).await;
            // the receiver is gone once the dashboard shut down
            if results.send(Resolution { ticket, outcome }).is_err() {
                log::debug!("Nobody is waiting for {:?} anymore", ticket);
            }
        });
    }
}

#[derive(Deserialize)]
struct Payload {
    battery_percent: i64,
}

async fn fetch(client: &reqwest::Client, url: Url, kind: MetricKind) -> Result<Percent, ErrorKind> {
    let response = client
        .get(url)
        .query(&[("metric", kind.name())])
        .send()
        .await
        .map_err(|e| classify_error(&e))?;
    classify_status(response.status())?;

    let body = response.text().await.map_err(|e| classify_error(&e))?;
    parse_body(&body)
}

fn classify_error(e: &reqwest::Error) -> ErrorKind {
    log::debug!("Remote request failed: {}", e);
    if e.is_timeout() {
        ErrorKind::Timeout
    } else if e.is_connect() {
        ErrorKind::PeerUnavailable
    } else if e.is_decode() || e.is_body() {
        ErrorKind::Protocol
    } else {
        ErrorKind::Transport
    }
}

fn classify_status(status: StatusCode) -> Result<(), ErrorKind> {
    match status {
        s if s.is_success() => Ok(()),
        StatusCode::NOT_FOUND | StatusCode::SERVICE_UNAVAILABLE => Err(ErrorKind::PeerUnavailable),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => Err(ErrorKind::Timeout),
        _ => Err(ErrorKind::Protocol),
    }
}

/// Accepts either a bare number or `{"battery_percent": <number>}`.
fn parse_body(body: &str) -> Result<Percent, ErrorKind> {
    let body = body.trim();
    let value = match body.parse::<i64>() {
        Ok(v) => v,
        Err(_) => {
            serde_json::from_str::<Payload>(body)
                .map_err(|_| ErrorKind::Protocol)?
                .battery_percent
        }
    };
    Percent::try_from(value).map_err(|_| ErrorKind::Protocol)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::gauges::{FetchPolicy, GaugeState, Reading, RemoteMetricSource};

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;

    #[test]
    fn test_parse_bare_number() {
        assert_eq!(parse_body("54\n"), Ok(Percent::new(54).unwrap()));
    }

    #[test]
    fn test_parse_json() {
        assert_eq!(
            parse_body(r#"{"battery_percent": 7, "charging": false}"#),
            Ok(Percent::new(7).unwrap())
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_body("full"), Err(ErrorKind::Protocol));
        assert_eq!(parse_body(""), Err(ErrorKind::Protocol));
        assert_eq!(parse_body("101"), Err(ErrorKind::Protocol));
        assert_eq!(parse_body(r#"{"battery_percent": -1}"#), Err(ErrorKind::Protocol));
    }

    #[test]
    fn test_classify_status() {
        assert_eq!(classify_status(StatusCode::OK), Ok(()));
        assert_eq!(
            classify_status(StatusCode::SERVICE_UNAVAILABLE),
            Err(ErrorKind::PeerUnavailable)
        );
        assert_eq!(
            classify_status(StatusCode::NOT_FOUND),
            Err(ErrorKind::PeerUnavailable)
        );
        assert_eq!(
            classify_status(StatusCode::GATEWAY_TIMEOUT),
            Err(ErrorKind::Timeout)
        );
        assert_eq!(
            classify_status(StatusCode::INTERNAL_SERVER_ERROR),
            Err(ErrorKind::Protocol)
        );
    }

    /// Serves a single canned HTTP response and returns the request line.
    async fn serve_once(listener: TcpListener, response: &'static str) -> String {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.unwrap();
        String::from_utf8_lossy(&request)
            .lines()
            .next()
            .unwrap_or_default()
            .to_string()
    }

    fn transport_with_timeout(
        addr: std::net::SocketAddr,
        timeout: Duration,
    ) -> (HttpTransport, mpsc::UnboundedReceiver<Resolution>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let url = Url::parse(&format!("http://{}/gauge", addr)).unwrap();
        (
            HttpTransport::with_builder(reqwest::Client::builder().no_proxy(), url, timeout, tx)
                .unwrap(),
            rx,
        )
    }

    fn transport(addr: std::net::SocketAddr) -> (HttpTransport, mpsc::UnboundedReceiver<Resolution>) {
        transport_with_timeout(addr, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_request_resolves_with_value() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let (transport, mut rx) = transport(listener.local_addr().unwrap());
        let server = tokio::spawn(serve_once(
            listener,
            "HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\n54",
        ));

        let mut remote = RemoteMetricSource::new(Box::new(transport), FetchPolicy::Supersede);
        let mut state = GaugeState::new();
        let ticket = remote.request();

        let resolution = rx.recv().await.unwrap();
        assert_eq!(resolution.ticket, ticket);
        assert!(remote.resolve(resolution, &mut state));
        assert_eq!(state.remote(), Reading::Known(Percent::new(54).unwrap()));
        assert_eq!(
            server.await.unwrap(),
            "GET /gauge?metric=battery_percent HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn test_refused_connection_is_peer_unavailable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let (transport, mut rx) = transport(addr);
        let mut remote = RemoteMetricSource::new(Box::new(transport), FetchPolicy::Supersede);
        remote.request();

        let resolution = rx.recv().await.unwrap();
        assert_eq!(resolution.outcome, Err(ErrorKind::PeerUnavailable));
    }

    #[tokio::test]
    async fn test_silent_peer_times_out() {
        // bound but never accepted, so the request is sent and never answered
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let (transport, mut rx) =
            transport_with_timeout(listener.local_addr().unwrap(), Duration::from_millis(200));
        let mut remote = RemoteMetricSource::new(Box::new(transport), FetchPolicy::Supersede);
        let mut state = GaugeState::new();
        remote.request();

        let resolution = rx.recv().await.unwrap();
        assert_eq!(resolution.outcome, Err(ErrorKind::Timeout));
        assert!(remote.resolve(resolution, &mut state));
        assert_eq!(remote.last_error(), Some(ErrorKind::Timeout));
        drop(listener);
    }
}
