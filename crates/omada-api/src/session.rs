// Session handling
//
// Controller-id discovery, token login/logout, and the lazy session guard
// that every data call runs first. The login response carries the token;
// the session cookie lands in the client's cookie jar.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::{debug, error, info};

use crate::client::{OmadaClient, SiteSelector};
use crate::error::Error;
use crate::models::{ControllerInfo, CurrentUser, LoginResult, LoginStatus};

impl OmadaClient {
    /// The controller id (`omadacId`) used as the first path segment.
    ///
    /// Taken from the config when set, otherwise fetched once from
    /// `GET /api/info` and cached.
    pub async fn controller_id(&self) -> Result<&str, Error> {
        let cid = self
            .controller_id_cell()
            .get_or_try_init(|| async {
                let url = self.root_url("api/info")?;
                debug!("discovering controller id");
                let info: ControllerInfo = self.get(url).await.map_err(|e| {
                    Error::ControllerDiscovery {
                        message: e.to_string(),
                    }
                })?;
                if info.omadac_id.is_empty() {
                    return Err(Error::ControllerDiscovery {
                        message: "controller returned an empty omadacId".into(),
                    });
                }
                debug!(
                    omadac_id = %info.omadac_id,
                    version = info.controller_ver.as_deref().unwrap_or("-"),
                    "controller discovered"
                );
                Ok(info.omadac_id)
            })
            .await?;
        Ok(cid.as_str())
    }

    /// The site id used in site-scoped paths.
    ///
    /// A configured site name is looked up in the current user's
    /// privileges (`GET /{cid}/api/v2/users/current`) and cached.
    pub async fn site_id(&self) -> Result<&str, Error> {
        let id = self
            .site_id_cell()
            .get_or_try_init(|| async {
                let name = match self.site() {
                    SiteSelector::Id(id) => return Ok(id.clone()),
                    SiteSelector::Name(name) => name.clone(),
                };
                let url = self.api_url("users/current").await?;
                debug!(site = %name, "resolving site id");
                let user: CurrentUser = self.get(url).await?;
                user.privilege
                    .sites
                    .into_iter()
                    .find(|s| s.name == name)
                    .map(|s| s.key)
                    .ok_or(Error::SiteNotFound { site: name })
            })
            .await?;
        Ok(id.as_str())
    }

    /// Ask the controller whether the current token is still valid.
    ///
    /// Without a token this answers `false` without a network call. A
    /// controller-side `false` drops the stored token.
    pub async fn is_logged_in(&self) -> Result<bool, Error> {
        if !self.session().is_authenticated() {
            return Ok(false);
        }

        let url = self.api_url("loginStatus").await?;
        let status: LoginStatus = match self.get(url).await {
            Ok(status) => status,
            Err(Error::SessionExpired) => return Ok(false),
            Err(e) => return Err(e),
        };

        if !status.login {
            self.session().invalidate();
        }
        Ok(status.login)
    }

    /// Log in with the configured credentials and return the issued token.
    ///
    /// Does not touch the session; see [`refresh`](Self::refresh).
    pub async fn login(&self) -> Result<SecretString, Error> {
        let url = self.api_url("login").await?;
        debug!("logging in at {}", url);

        let body = json!({
            "username": self.credentials().username,
            "password": self.credentials().password.expose_secret(),
        });

        let result: LoginResult = self.post(url, &body).await.map_err(|e| match e {
            Error::Api { code, message } => Error::Authentication {
                message: format!("login rejected ({code}): {message}"),
            },
            Error::Http { status, message } => Error::Authentication {
                message: format!("login failed (HTTP {status}): {message}"),
            },
            Error::SessionExpired => Error::Authentication {
                message: "login rejected (HTTP 401)".into(),
            },
            other => other,
        })?;

        debug!(role = ?result.role_type, "login successful");
        Ok(SecretString::from(result.token))
    }

    /// Force a fresh login and store the new token.
    ///
    /// The previous token is dropped first, so a failed refresh leaves the
    /// session unauthenticated. An empty token is an error.
    pub async fn refresh(&self) -> Result<(), Error> {
        self.session().invalidate();
        let token = self.login().await?;
        self.session().authenticate(token)
    }

    /// Make sure a session is active, logging in on demand.
    pub async fn ensure_session(&self) -> Result<(), Error> {
        if self.is_logged_in().await? {
            return Ok(());
        }

        info!(
            username = %self.credentials().username,
            "not logged in, logging in"
        );
        self.refresh().await.inspect_err(|e| {
            error!(error = %e, "failed to login");
        })
    }

    /// End the current session.
    ///
    /// The local token is dropped even if the controller call fails.
    pub async fn logout(&self) -> Result<(), Error> {
        if !self.session().is_authenticated() {
            return Ok(());
        }

        let url = self
            .api_url("logout")
            .await
            .inspect_err(|_| self.session().invalidate())?;
        debug!("logging out at {}", url);
        let result: Result<serde_json::Value, Error> = self.post(url, &json!({})).await;
        self.session().invalidate();

        match result {
            Ok(_) | Err(Error::Deserialization { .. }) => {
                debug!("logout complete");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
