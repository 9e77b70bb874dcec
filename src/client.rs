use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use url::Url;

use crate::query::Query;
use crate::record::{CreateRecordOptions, ListRecordsOptions, Record};
use crate::transport::{DEFAULT_TIMEOUT, ReqwestTransport, Request, Response, Transport};
use crate::utils::{deserialize_null_default, truncate_for_log, validate_zone_name};
use crate::zone::{ListZonesOptions, Meta, Zone, ZoneId, Zones};
use crate::{ApiError, ClientBuilderError, ClientError, Context, Payload};

/// Default API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://dns.hetzner.com/api/v1/";

const AUTH_HEADER: &str = "auth-api-token";
const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Top-level domain the API expects when creating a zone.
const ZONE_TLD: &str = "dev";

/// How often a waiting call checks its context.
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Operations of the Hetzner DNS API.
///
/// Implemented by [Client]. Code that only needs these operations can take
/// `&impl Dns` and be tested against a double.
pub trait Dns {
    fn create_zone(&self, ctx: &Context, name: &str, ttl: u64) -> Result<Zone, ClientError>;

    fn get_zone(&self, ctx: &Context, id: &ZoneId) -> Result<Zone, ClientError>;

    fn get_zones(
        &self,
        ctx: &Context,
        opts: &ListZonesOptions,
    ) -> Result<(Zones, Meta), ClientError>;

    fn get_records(
        &self,
        ctx: &Context,
        opts: &ListRecordsOptions,
    ) -> Result<Vec<Record>, ClientError>;

    fn create_record(
        &self,
        ctx: &Context,
        opts: &CreateRecordOptions,
    ) -> Result<Record, ClientError>;
}

/// Builder for a [Client] that handles default values.
pub struct ClientBuilder {
    endpoint: Option<Url>,
    token: Option<String>,
    timeout: Option<Duration>,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    fn new() -> Self {
        Self {
            endpoint: None,
            token: None,
            timeout: None,
            transport: None,
        }
    }

    /// Sets the API endpoint to the one given.
    ///
    /// The endpoint should have a trailing slash, as per [Url]'s semantics.
    pub fn endpoint(mut self, endpoint: &Url) -> Self {
        self.endpoint = Some(endpoint.clone());
        self
    }

    /// In the case that `endpoint` is the Some variant, sets the API endpoint to it.
    ///
    /// The endpoint should have a trailing slash, as per [Url]'s semantics.
    pub fn endpoint_if_some(mut self, endpoint: Option<&Url>) -> Self {
        if let Some(endpoint) = endpoint {
            self.endpoint = Some(endpoint.clone());
        }
        self
    }

    /// Sets the API token to the one given.
    pub fn token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    /// Sets the timeout of the default transport.
    ///
    /// Ignored when a transport is given with [ClientBuilder::transport].
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the transport requests are sent through.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Builds a [Client] from the builder.
    ///
    /// In the case that no API endpoint is set, the default endpoint of
    /// `https://dns.hetzner.com/api/v1/` is used. Without a transport, a
    /// reqwest based one with a timeout of 5 seconds is used.
    ///
    /// # Errors
    /// - `MissingField` if no token was added to the builder.
    /// - `InvalidToken` if the token can't be sent in a header.
    /// - `InvalidEndpoint` if the endpoint can't have path segments, like `mailto:` URLs.
    /// - `UrlParse` if the default API endpoint fails to parse. This shouldn't happen.
    /// - `Reqwest` if the default transport can't be initialised.
    pub fn build(self) -> Result<Client, ClientBuilderError> {
        let endpoint: Url = match self.endpoint {
            Some(endpoint) => endpoint,
            None => DEFAULT_ENDPOINT.parse()?,
        };
        if endpoint.cannot_be_a_base() {
            return Err(ClientBuilderError::InvalidEndpoint(endpoint));
        }
        let token = self
            .token
            .ok_or_else(|| ClientBuilderError::MissingField("token".to_string()))?;
        let mut token =
            HeaderValue::from_str(&token).map_err(|_| ClientBuilderError::InvalidToken)?;
        token.set_sensitive(true);
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(
                self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            )?),
        };

        Ok(Client {
            endpoint,
            token,
            transport,
        })
    }
}

/// API client.
///
/// Cloning is cheap and clones share the transport.
#[derive(Clone)]
pub struct Client {
    endpoint: Url,
    token: HeaderValue,
    transport: Arc<dyn Transport>,
}

impl Client {
    /// Creates a new Client using the default endpoint and transport.
    pub fn new(token: &str) -> Result<Self, ClientBuilderError> {
        Self::builder().token(token).build()
    }

    /// Creates a new Client sending its requests through `transport`.
    pub fn with_transport(
        token: &str,
        transport: impl Transport + 'static,
    ) -> Result<Self, ClientBuilderError> {
        Self::builder().token(token).transport(transport).build()
    }

    /// Returns a builder for a Client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// The base URL requests are sent to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Creates a [Url] from the endpoint and the path sections.
    ///
    /// Each section becomes exactly one percent-encoded path segment, so `/`,
    /// `?` and `#` inside a section can't leave the endpoint's path.
    fn build_url(&self, path: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::UrlParse(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(path);
        Ok(url)
    }

    /// The headers every request carries.
    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(AUTH_HEADER), self.token.clone());
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        headers
    }

    /// Sends a request and decodes the response if it has the `expected` status.
    fn send_request<T: for<'de> Deserialize<'de>>(
        &self,
        ctx: &Context,
        method: Method,
        url: Url,
        body: Option<JsonValue>,
        expected: StatusCode,
    ) -> Result<T, ClientError> {
        let timeout = ctx.remaining()?;
        let request = Request {
            method: method.clone(),
            url: url.clone(),
            headers: self.headers(),
            body,
            timeout,
        };

        log::debug!("{method} {url}");
        let resp = self.dispatch(ctx, request).inspect_err(|e| {
            if matches!(e, ClientError::Cancelled | ClientError::DeadlineExceeded) {
                log::debug!("{method} {url}: {e}");
            }
        })?;
        log::debug!("{method} {url}: {}", resp.status);

        if resp.status != expected {
            let err = ApiError::from_response(&url, resp);
            if err.is_fatal() {
                log::error!("{method} {url}: {err}");
            } else {
                log::warn!("{method} {url}: {err}");
            }
            return Err(err.into());
        }

        log::debug!("response body: {}", truncate_for_log(&resp.body));
        serde_json::from_str(&resp.body).map_err(|e| {
            log::error!("{method} {url}: unable to decode response: {e}");
            ClientError::from(ApiError::Decode(e))
        })
    }

    /// Executes the request on a worker thread, returning early if `ctx` is
    /// cancelled or runs out of time while waiting.
    ///
    /// A cancelled request keeps running until the transport gives up on it;
    /// its outcome is discarded.
    fn dispatch(&self, ctx: &Context, request: Request) -> Result<Response, ClientError> {
        let transport = Arc::clone(&self.transport);
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("hetzner-dns-request".to_string())
            .spawn(move || {
                // Nobody is listening anymore if the call was cancelled.
                let _ = tx.send(transport.execute(request));
            })
            .map_err(ClientError::Spawn)?;

        loop {
            match rx.recv_timeout(CANCEL_POLL_INTERVAL) {
                Ok(result) => return Ok(result?),
                Err(RecvTimeoutError::Timeout) => {
                    ctx.remaining()?;
                }
                Err(RecvTimeoutError::Disconnected) => return Err(ClientError::TransportAborted),
            }
        }
    }

    /// Creates a zone with the given name and default TTL in seconds.
    ///
    /// # Errors
    ///
    /// Will return a `Domain` error without sending anything in the case of
    /// `name` not being a domain name with a registrable root.
    pub fn create_zone(&self, ctx: &Context, name: &str, ttl: u64) -> Result<Zone, ClientError> {
        validate_zone_name(name)?;
        let url = self.build_url(&["zones"])?;

        let payload = Payload::new()
            .add("name", name)
            .add("ttl", ttl)
            .add("tld", ZONE_TLD);

        #[derive(Deserialize)]
        struct Response {
            zone: Zone,
        }

        Ok(self
            .send_request::<Response>(
                ctx,
                Method::POST,
                url,
                Some(payload.into()),
                StatusCode::CREATED,
            )?
            .zone)
    }

    /// Retrieves the zone with the given ID.
    ///
    /// # Errors
    ///
    /// Will return `EmptyZoneId` without sending anything in the case of `id`
    /// being empty, as that would list zones instead. Will return
    /// `InvalidZoneId` for `.` and `..`, which aren't usable as path segments.
    pub fn get_zone(&self, ctx: &Context, id: &ZoneId) -> Result<Zone, ClientError> {
        if id.is_empty() {
            return Err(ClientError::EmptyZoneId);
        }
        if matches!(id.as_str(), "." | "..") {
            return Err(ClientError::InvalidZoneId(id.to_string()));
        }
        let url = self.build_url(&["zones", id.as_str()])?;

        #[derive(Deserialize)]
        struct Response {
            zone: Zone,
        }

        Ok(self
            .send_request::<Response>(ctx, Method::GET, url, None, StatusCode::OK)?
            .zone)
    }

    /// Lists the zones matching the given filters, with pagination metadata.
    pub fn get_zones(
        &self,
        ctx: &Context,
        opts: &ListZonesOptions,
    ) -> Result<(Zones, Meta), ClientError> {
        let url = self.url_with_query("zones", &opts.query())?;

        #[derive(Deserialize)]
        struct Response {
            #[serde(default, deserialize_with = "deserialize_null_default")]
            meta: Meta,
            #[serde(deserialize_with = "deserialize_null_default")]
            zones: Vec<Zone>,
        }

        let resp = self.send_request::<Response>(ctx, Method::GET, url, None, StatusCode::OK)?;
        Ok((Zones { zones: resp.zones }, resp.meta))
    }

    /// Lists the records matching the given filters.
    pub fn get_records(
        &self,
        ctx: &Context,
        opts: &ListRecordsOptions,
    ) -> Result<Vec<Record>, ClientError> {
        let url = self.url_with_query("records", &opts.query())?;

        #[derive(Deserialize)]
        struct Response {
            #[serde(deserialize_with = "deserialize_null_default")]
            records: Vec<Record>,
        }

        Ok(self
            .send_request::<Response>(ctx, Method::GET, url, None, StatusCode::OK)?
            .records)
    }

    /// Creates a record. The API answers 200 rather than 201 here.
    pub fn create_record(
        &self,
        ctx: &Context,
        opts: &CreateRecordOptions,
    ) -> Result<Record, ClientError> {
        let url = self.build_url(&["records"])?;

        #[derive(Deserialize)]
        struct Response {
            record: Record,
        }

        Ok(self
            .send_request::<Response>(
                ctx,
                Method::POST,
                url,
                Some(opts.payload().into()),
                StatusCode::OK,
            )?
            .record)
    }

    fn url_with_query(&self, resource: &str, query: &Query) -> Result<Url, ClientError> {
        let mut url = self.build_url(&[resource])?;
        query.apply(&mut url);
        Ok(url)
    }
}

impl Dns for Client {
    fn create_zone(&self, ctx: &Context, name: &str, ttl: u64) -> Result<Zone, ClientError> {
        Client::create_zone(self, ctx, name, ttl)
    }

    fn get_zone(&self, ctx: &Context, id: &ZoneId) -> Result<Zone, ClientError> {
        Client::get_zone(self, ctx, id)
    }

    fn get_zones(
        &self,
        ctx: &Context,
        opts: &ListZonesOptions,
    ) -> Result<(Zones, Meta), ClientError> {
        Client::get_zones(self, ctx, opts)
    }

    fn get_records(
        &self,
        ctx: &Context,
        opts: &ListRecordsOptions,
    ) -> Result<Vec<Record>, ClientError> {
        Client::get_records(self, ctx, opts)
    }

    fn create_record(
        &self,
        ctx: &Context,
        opts: &CreateRecordOptions,
    ) -> Result<Record, ClientError> {
        Client::create_record(self, ctx, opts)
    }
}
