// Omada API response types
//
// Every endpoint wraps its payload in `{ "errorCode": 0, "msg": "...",
// "result": ... }`. Scalar fields tolerate both absence and `null`
// because firmware versions disagree about which fields they send.

use serde::{Deserialize, Deserializer, Serialize};

// ── Response Envelope ────────────────────────────────────────────────

/// Standard Omada response envelope.
///
/// ```json
/// { "errorCode": 0, "msg": "Success.", "result": { ... } }
/// ```
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OmadaResponse<T> {
    #[serde(default)]
    pub error_code: i64,
    #[serde(default)]
    pub msg: Option<String>,
    pub result: Option<T>,
}

/// Deserialize `null` as the type's default.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ── Controller / session ─────────────────────────────────────────────

/// Result of `GET /api/info` (unauthenticated).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerInfo {
    pub omadac_id: String,
    #[serde(default)]
    pub controller_ver: Option<String>,
    #[serde(default)]
    pub api_ver: Option<String>,
}

/// Result of `POST /{cid}/api/v2/login`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResult {
    #[serde(default, deserialize_with = "nullable")]
    pub token: String,
    #[serde(default)]
    pub role_type: Option<i64>,
}

/// Result of `GET /{cid}/api/v2/loginStatus`.
#[derive(Debug, Deserialize)]
pub struct LoginStatus {
    #[serde(default)]
    pub login: bool,
}

/// Result of `GET /{cid}/api/v2/users/current`.
#[derive(Debug, Deserialize)]
pub struct CurrentUser {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub privilege: Privilege,
}

#[derive(Debug, Default, Deserialize)]
pub struct Privilege {
    #[serde(default)]
    pub sites: Vec<SiteRef>,
}

/// Site name and id (`key`) as listed in the user's privileges.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteRef {
    pub name: String,
    pub key: String,
}

// ── Device ───────────────────────────────────────────────────────────

/// Managed device from `sites/{siteId}/devices`.
///
/// `ports` never arrives populated from the device list; it is filled in
/// afterwards for switches only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    pub device_type: String,
    #[serde(default, deserialize_with = "nullable")]
    pub mac: String,
    #[serde(default, deserialize_with = "nullable")]
    pub model: String,
    #[serde(default, deserialize_with = "nullable")]
    pub version: String,
    #[serde(default, deserialize_with = "nullable")]
    pub ip: String,
    #[serde(default, deserialize_with = "nullable")]
    pub cpu_util: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub mem_util: f64,
    #[serde(rename = "uptimeLong", default, deserialize_with = "nullable")]
    pub uptime: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub need_upgrade: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub tx_rate: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub rx_rate: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub poe_remain: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub ports: Vec<Port>,
    #[serde(default, deserialize_with = "nullable")]
    pub download: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub upload: i64,
}

impl Device {
    /// Type discriminator for switches. Matched exactly.
    pub const SWITCH_TYPE: &'static str = "switch";

    pub fn is_switch(&self) -> bool {
        self.device_type == Self::SWITCH_TYPE
    }
}

// ── Port ─────────────────────────────────────────────────────────────

/// Physical switch port from `switches/{mac}/ports`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Port {
    #[serde(default, deserialize_with = "nullable")]
    pub port: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default)]
    pub switch_id: Option<String>,
    #[serde(default)]
    pub switch_mac: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub port_status: PortStatus,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Live status nested inside [`Port`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortStatus {
    /// 0 = down, 1 = up
    #[serde(default, deserialize_with = "nullable")]
    pub link_status: i64,
    /// Controller speed code (e.g. 3 = 1 Gbps)
    #[serde(default, deserialize_with = "nullable")]
    pub link_speed: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub poe_power: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub poe: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub rx: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub tx: i64,
}

impl PortStatus {
    pub fn is_up(&self) -> bool {
        self.link_status == 1
    }
}
