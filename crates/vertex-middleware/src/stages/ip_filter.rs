//! Allow and deny lists of IP ranges.

use crate::middleware::{Middleware, Next};
use ipnetwork::IpNetwork;
use std::net::IpAddr;
use tracing::{error, info};
use vertex_core::{ApiError, BoxFuture, HandlerResult, RequestContext, ResponseWriter};

/// RFC 1918 private ranges plus loopback.
const PRIVATE_RANGES: [&str; 4] = ["10.0.0.0/8", "172.16.0.0/12", "192.168.0.0/16", "127.0.0.0/8"];

/// Allows or denies requests by remote IP.
///
/// Denied ranges are checked first. A request must then fall in one of the
/// allowed ranges.
///
/// ```
/// use vertex_middleware::stages::IpRangeFilter;
///
/// let filter = IpRangeFilter::new(["203.0.113.7"])
///     .allow_private()
///     .deny(["10.66.0.0/16"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct IpRangeFilter {
    allowed: Vec<IpNetwork>,
    denied: Vec<IpNetwork>,
}

fn parse_ranges<I, S>(cidrs: I) -> impl Iterator<Item = IpNetwork>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    cidrs.into_iter().filter_map(|cidr| {
        let cidr = cidr.as_ref().trim();
        let parsed = match cidr.parse::<IpAddr>() {
            Ok(ip) => Ok(IpNetwork::from(ip)),
            Err(_) => cidr.parse::<IpNetwork>(),
        };
        match parsed {
            Ok(net) => Some(net),
            Err(e) => {
                error!(cidr = %cidr, error = %e, "error parsing CIDR");
                None
            }
        }
    })
}

impl IpRangeFilter {
    /// Creates a filter allowing the given ranges. Plain addresses are
    /// single-address ranges.
    #[must_use]
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::default().allow(allowed)
    }

    /// Allows all private ranges and loopback.
    #[must_use]
    pub fn allow_private(self) -> Self {
        self.allow(PRIVATE_RANGES)
    }

    /// Adds allowed ranges. Invalid ranges are logged and skipped.
    #[must_use]
    pub fn allow<I, S>(mut self, cidrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for net in parse_ranges(cidrs) {
            info!(range = %net, "allowing traffic");
            self.allowed.push(net);
        }
        self
    }

    /// Replaces the denied ranges. Invalid ranges are logged and skipped.
    #[must_use]
    pub fn deny<I, S>(mut self, cidrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.denied = parse_ranges(cidrs).collect();
        self
    }

    fn check(&self, ip: Option<IpAddr>) -> Result<(), ApiError> {
        let shown = ip.map_or_else(|| "unknown".to_string(), |ip| ip.to_string());
        let Some(ip) = ip else {
            return Err(ApiError::unauthorized(format!("IP Address {shown} not allowed")));
        };

        if self.denied.iter().any(|net| net.contains(ip)) {
            return Err(ApiError::unauthorized(format!("IP Address {shown} blocked")));
        }
        if self.allowed.iter().any(|net| net.contains(ip)) {
            tracing::debug!(ip = %ip, "IP address allowed");
            return Ok(());
        }
        Err(ApiError::unauthorized(format!("IP Address {shown} not allowed")))
    }
}

impl Middleware for IpRangeFilter {
    fn name(&self) -> &'static str {
        "ip_range_filter"
    }

    fn handle<'a>(
        &'a self,
        w: &'a mut ResponseWriter,
        req: &'a mut RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, HandlerResult> {
        if let Err(e) = self.check(req.remote_ip()) {
            return Box::pin(async move { Err(e) });
        }
        next.run(w, req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> Option<IpAddr> {
        Some(s.parse().unwrap())
    }

    #[test]
    fn test_allow_list() {
        let filter = IpRangeFilter::new(["192.0.2.0/24", "203.0.113.7"]);
        assert!(filter.check(ip("192.0.2.55")).is_ok());
        assert!(filter.check(ip("203.0.113.7")).is_ok());
        assert_eq!(
            filter.check(ip("203.0.113.8")).unwrap_err().to_string(),
            "IP Address 203.0.113.8 not allowed"
        );
    }

    #[test]
    fn test_private_ranges() {
        let filter = IpRangeFilter::default().allow_private();
        for addr in ["10.1.2.3", "172.20.0.1", "192.168.1.1", "127.0.0.1"] {
            assert!(filter.check(ip(addr)).is_ok(), "{addr}");
        }
        assert!(filter.check(ip("8.8.8.8")).is_err());
    }

    #[test]
    fn test_deny_wins() {
        let filter = IpRangeFilter::default().allow_private().deny(["10.66.0.0/16"]);
        assert_eq!(
            filter.check(ip("10.66.1.1")).unwrap_err().to_string(),
            "IP Address 10.66.1.1 blocked"
        );
        assert!(filter.check(ip("10.67.1.1")).is_ok());
    }

    #[test]
    fn test_ipv6_and_invalid_ranges() {
        let filter = IpRangeFilter::new(["::1", "not-a-cidr", "2001:db8::/32"]);
        assert!(filter.check(ip("::1")).is_ok());
        assert!(filter.check(ip("2001:db8::5")).is_ok());
        assert!(filter.check(ip("2001:db9::5")).is_err());
    }

    #[test]
    fn test_unknown_ip_rejected() {
        let filter = IpRangeFilter::default().allow_private();
        assert!(filter.check(None).is_err());
    }
}
