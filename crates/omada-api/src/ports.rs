// Switch port endpoint
//
// `GET /{cid}/api/v2/sites/{siteId}/switches/{mac}/ports`

use std::future::Future;

use tracing::debug;

use crate::client::OmadaClient;
use crate::error::Error;
use crate::models::Port;

/// Source of per-switch port detail used to enrich the device inventory.
///
/// Implementations must be idempotent: the same MAC yields an equivalent
/// port set, modulo live counters.
pub trait PortFetcher {
    fn fetch_ports(&self, mac: &str) -> impl Future<Output = Result<Vec<Port>, Error>> + Send;
}

impl OmadaClient {
    /// List the ports of one switch, logging in first if needed.
    pub async fn get_ports(&self, mac: &str) -> Result<Vec<Port>, Error> {
        self.ensure_session().await?;
        self.switch_ports(mac).await
    }

    /// Port call without the session guard; callers already hold a session.
    async fn switch_ports(&self, mac: &str) -> Result<Vec<Port>, Error> {
        let url = self.site_url(&["switches", mac, "ports"]).await?;
        debug!(mac, "listing switch ports");
        self.get(url).await
    }
}

impl PortFetcher for OmadaClient {
    async fn fetch_ports(&self, mac: &str) -> Result<Vec<Port>, Error> {
        self.switch_ports(mac).await
    }
}
