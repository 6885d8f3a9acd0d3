// Omada controller HTTP client
//
// Wraps `reqwest::Client` with controller-id/site scoped URL construction,
// token attachment, and envelope unwrapping. Endpoint groups (session,
// devices, ports) are inherent methods in separate files so this module
// stays focused on transport mechanics.

use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;
use tracing::{debug, trace};
use url::Url;

use crate::auth::{Credentials, Session};
use crate::error::Error;
use crate::models::OmadaResponse;
use crate::transport::TransportConfig;

/// Header carrying the session token on every authenticated request.
pub(crate) const TOKEN_HEADER: &str = "Csrf-Token";

/// Which site the client is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteSelector {
    /// Site id as used in API paths.
    Id(String),
    /// Human-readable site name, resolved to an id through the current user's privileges.
    Name(String),
}

/// Everything needed to build an [`OmadaClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Controller root, e.g. `https://omada.local:8043`.
    pub url: Url,
    pub credentials: Credentials,
    pub site: SiteSelector,
    /// `omadacId`; discovered through `/api/info` when `None`.
    pub controller_id: Option<String>,
    /// Maximum number of switch port fetches in flight. `1` is strictly sequential.
    pub port_concurrency: usize,
    pub transport: TransportConfig,
}

impl ClientConfig {
    pub fn new(url: Url, credentials: Credentials, site: SiteSelector) -> Self {
        Self {
            url,
            credentials,
            site,
            controller_id: None,
            port_concurrency: 1,
            transport: TransportConfig::default(),
        }
    }
}

/// Session-aware client for one site of an Omada controller.
///
/// Owns its [`Session`]: the first call that needs authentication logs in,
/// later calls reuse the token until the controller rejects it.
pub struct OmadaClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
    site: SiteSelector,
    controller_id: OnceCell<String>,
    site_id: OnceCell<String>,
    session: Session,
    port_concurrency: usize,
}

impl OmadaClient {
    /// Create a client, building the HTTP transport from `config.transport`.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let http = config.transport.build_client()?;
        Ok(Self::with_client(http, config))
    }

    /// Create a client around a pre-built `reqwest::Client`.
    ///
    /// The client should carry a cookie store; the controller pairs the
    /// token with a session cookie.
    pub fn with_client(http: reqwest::Client, config: ClientConfig) -> Self {
        let site_id = match &config.site {
            SiteSelector::Id(id) => OnceCell::new_with(Some(id.clone())),
            SiteSelector::Name(_) => OnceCell::new(),
        };
        Self {
            http,
            base_url: config.url,
            credentials: config.credentials,
            site: config.site,
            controller_id: OnceCell::new_with(config.controller_id),
            site_id,
            session: Session::new(),
            port_concurrency: config.port_concurrency.max(1),
        }
    }

    /// The controller base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn site(&self) -> &SiteSelector {
        &self.site
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn port_concurrency(&self) -> usize {
        self.port_concurrency
    }

    pub(crate) fn controller_id_cell(&self) -> &OnceCell<String> {
        &self.controller_id
    }

    pub(crate) fn site_id_cell(&self) -> &OnceCell<String> {
        &self.site_id
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a controller-root URL: `{base}/{path}`.
    pub(crate) fn root_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    /// Build a controller-scoped URL: `{base}/{omadacId}/api/v2/{path}`.
    pub(crate) async fn api_url(&self, path: &str) -> Result<Url, Error> {
        let cid = self.controller_id().await?;
        self.root_url(&format!("{cid}/api/v2/{path}"))
    }

    /// Build a site-scoped URL: `{base}/{omadacId}/api/v2/sites/{siteId}/{segments..}`.
    ///
    /// The site id and every segment are percent-encoded as single path
    /// segments. Resolving a site name requires an authenticated session.
    pub(crate) async fn site_url(&self, segments: &[&str]) -> Result<Url, Error> {
        let site_id = self.site_id().await?;
        let mut target = self.api_url("sites").await?;
        target
            .path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .push(site_id)
            .extend(segments);
        Ok(target)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Attach the session token, if any.
    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.session.token() {
            Some(token) => builder.header(TOKEN_HEADER, token.expose_secret()),
            None => builder,
        }
    }

    /// Send a GET request and unwrap the envelope.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self
            .authorize(self.http.get(url))
            .send()
            .await
            .map_err(Error::Transport)?;

        self.parse_envelope(resp).await
    }

    /// Send a POST request with JSON body and unwrap the envelope.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        debug!("POST {}", url);

        let resp = self
            .authorize(self.http.post(url).json(body))
            .send()
            .await
            .map_err(Error::Transport)?;

        self.parse_envelope(resp).await
    }

    /// Parse the `{ errorCode, msg, result }` envelope, returning `result`.
    ///
    /// A 401 drops the session before surfacing [`Error::SessionExpired`];
    /// nothing is retried here.
    async fn parse_envelope<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            self.session.invalidate();
            return Err(Error::SessionExpired);
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                message: preview(&body).to_owned(),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        trace!(body = %body, "response body");

        let envelope: OmadaResponse<T> =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: format!("{e} (body preview: {:?})", preview(&body)),
                body: body.clone(),
            })?;

        if envelope.error_code != 0 {
            return Err(Error::Api {
                code: envelope.error_code,
                message: envelope
                    .msg
                    .unwrap_or_else(|| format!("errorCode={}", envelope.error_code)),
            });
        }

        envelope.result.ok_or_else(|| Error::Deserialization {
            message: "envelope has no result".into(),
            body,
        })
    }
}

/// First 200 bytes of a body, cut on a char boundary.
fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn client(base: &str, site: SiteSelector) -> OmadaClient {
        let config = ClientConfig {
            controller_id: Some("cid42".into()),
            ..ClientConfig::new(
                Url::parse(base).unwrap(),
                Credentials::new("admin", "secret"),
                site,
            )
        };
        OmadaClient::with_client(reqwest::Client::new(), config)
    }

    #[tokio::test]
    async fn site_url_uses_controller_and_site_ids() {
        let client = client("https://omada.local:8043/", SiteSelector::Id("site7".into()));
        let url = client.site_url(&["devices"]).await.unwrap();
        assert_eq!(
            url.as_str(),
            "https://omada.local:8043/cid42/api/v2/sites/site7/devices"
        );
    }

    #[tokio::test]
    async fn site_url_escapes_each_segment() {
        let client = client("https://omada.local:8043", SiteSelector::Id("site7".into()));
        let url = client
            .site_url(&["switches", "AA/BB?x#y", "ports"])
            .await
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://omada.local:8043/cid42/api/v2/sites/site7/switches/AA%2FBB%3Fx%23y/ports"
        );
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[tokio::test]
    async fn api_url_without_trailing_slash() {
        let client = client("https://omada.local:8043", SiteSelector::Id("s".into()));
        let url = client.api_url("loginStatus").await.unwrap();
        assert_eq!(url.as_str(), "https://omada.local:8043/cid42/api/v2/loginStatus");
    }

    #[test]
    fn zero_concurrency_is_clamped() {
        let config = ClientConfig {
            port_concurrency: 0,
            ..ClientConfig::new(
                Url::parse("https://omada.local").unwrap(),
                Credentials::new("admin", "secret"),
                SiteSelector::Id("s".into()),
            )
        };
        let client = OmadaClient::with_client(reqwest::Client::new(), config);
        assert_eq!(client.port_concurrency(), 1);
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let body = "é".repeat(150);
        let cut = preview(&body);
        assert!(cut.len() <= 200);
        assert!(body.starts_with(cut));
    }
}
