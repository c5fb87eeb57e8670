//! Monitor endpoints
//!
//! Monitor endpoints are passed as `name=ip:port` entries separated by
//! commas, e.g. `rook-ceph-mon0=10.0.0.1:6790,rook-ceph-mon1=10.0.0.2:6790`.

use crate::domain::ports::{MonEndpointParser, MonInfo};
use crate::error::Result;
use tracing::warn;

/// Default [`MonEndpointParser`]
#[derive(Debug, Clone, Copy, Default)]
pub struct MonEndpoints;

impl MonEndpointParser for MonEndpoints {
    fn parse_mon_endpoints(&self, input: &str) -> Result<Vec<MonInfo>> {
        Ok(parse_mon_endpoints(input))
    }
}

/// Parse monitors in the order given. Malformed entries are skipped.
pub fn parse_mon_endpoints(input: &str) -> Vec<MonInfo> {
    let mut mons = Vec::new();

    for raw in input.split(',').map(str::trim).filter(|raw| !raw.is_empty()) {
        let parts: Vec<&str> = raw.split('=').map(str::trim).collect();
        if parts.len() != 2 || parts.iter().any(|p| p.is_empty()) {
            warn!("ignoring invalid monitor {}", raw);
            continue;
        }
        mons.push(MonInfo::new(parts[0], parts[1]));
    }

    mons
}

/// Inverse of [`parse_mon_endpoints`]
pub fn format_mon_endpoints(mons: &[MonInfo]) -> String {
    mons.iter()
        .map(|m| format!("{}={}", m.name, m.endpoint))
        .collect::<Vec<_>>()
        .join(",")
}
