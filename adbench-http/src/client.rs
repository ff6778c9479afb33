use bytes::Bytes;
use http_body_util::{BodyExt as _, Empty};
use hyper::Request;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use std::time::Duration;

use super::{Error, HttpResponse, Result, Target};

#[derive(Debug, Clone, Copy)]
pub struct ClientOptions {
    /// TCP connect timeout. The OS default can be tens of seconds.
    pub connect_timeout: Option<Duration>,
    /// Upper bound for a whole exchange: connect, response head and body drain.
    pub request_timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Some(Duration::from_secs(3)),
            request_timeout: Duration::from_secs(30),
            pool_max_idle_per_host: usize::MAX,
            pool_idle_timeout: Duration::from_secs(90),
        }
    }
}

/// Pooled HTTP/1.1 client shared by every worker of a run.
///
/// Redirects are never followed, so a `302` is observed as-is.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client<HttpsConnector<HttpConnector>, Empty<Bytes>>,
    request_timeout: Duration,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new(ClientOptions::default())
    }
}

impl HttpClient {
    #[must_use]
    pub fn new(opts: ClientOptions) -> Self {
        let mut http_connector = HttpConnector::new();
        http_connector.enforce_http(false);
        http_connector.set_connect_timeout(opts.connect_timeout);
        http_connector.set_nodelay(true);

        let https_connector = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .wrap_connector(http_connector);

        let inner = Client::builder(TokioExecutor::new())
            .pool_max_idle_per_host(opts.pool_max_idle_per_host)
            .pool_idle_timeout(opts.pool_idle_timeout)
            .build(https_connector);

        Self {
            inner,
            request_timeout: opts.request_timeout,
        }
    }

    /// Issues one `GET` and drains the response body so the connection goes back to the pool.
    pub async fn get(&self, target: &Target) -> Result<HttpResponse> {
        let req: Request<Empty<Bytes>> = Request::builder()
            .method(http::Method::GET)
            .uri(target.uri().clone())
            .body(Empty::new())?;

        let exchange = async {
            let res = self.inner.request(req).await?;
            let (parts, body) = res.into_parts();
            let body = body.collect().await?.to_bytes();
            Ok::<_, Error>(HttpResponse {
                status: parts.status.as_u16(),
                body_len: body.len() as u64,
            })
        };

        match tokio::time::timeout(self.request_timeout, exchange).await {
            Ok(res) => res,
            Err(_) => Err(Error::Timeout(self.request_timeout)),
        }
    }
}
