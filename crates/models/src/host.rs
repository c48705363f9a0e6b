use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::net::Ipv4Addr;

/// Identity of the host that submitted a scan. Reports are aggregated per
/// host, so this is also the aggregation key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostMetadata {
    /// Older scanners only ever sent the address.
    #[serde(default)]
    pub hostname: String,
    #[serde(rename = "ipv4", alias = "ip_address")]
    pub ipv4: Ipv4Addr,
}
impl HostMetadata {
    pub fn new(hostname: impl Into<String>, ipv4: Ipv4Addr) -> Self {
        Self { hostname: hostname.into(), ipv4 }
    }

    /// Stable key used to namespace everything stored for this host:
    /// `<hostname>-<ipv4>`, or just the address when no hostname was sent.
    pub fn key(&self) -> String {
        match self.hostname.trim() {
            "" => self.ipv4.to_string(),
            hostname => format!("{hostname}-{}", self.ipv4),
        }
    }
}
impl Display for HostMetadata {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.key())
    }
}
