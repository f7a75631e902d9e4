use anyhow::{Context, Result};
use hickory_resolver::TokioResolver;
use std::net::IpAddr;
use std::time::Duration;
use tracing::debug;

/// Name-resolution connectivity check.
///
/// Resolvability of the target host is the sole up/down signal: a DNS outage
/// is indistinguishable from a host outage here, which is an accepted
/// limitation of the design. No retries inside a single check; the next
/// scheduled tick is the retry.
pub struct Prober {
    resolver: TokioResolver,
    timeout: Duration,
}

impl Prober {
    pub fn new(timeout: Duration) -> Result<Self> {
        let resolver = TokioResolver::builder_tokio()
            .context("Failed to read system resolver configuration")?
            .build();
        Ok(Self { resolver, timeout })
    }

    /// True iff `host` currently resolves to at least one address. Every
    /// failure mode (NXDOMAIN, timeout, transport error) collapses to false.
    pub async fn check(&self, host: &str) -> bool {
        // An IP literal needs no lookup.
        if host.parse::<IpAddr>().is_ok() {
            return true;
        }
        match tokio::time::timeout(self.timeout, self.resolver.lookup_ip(host)).await {
            Ok(Ok(lookup)) => lookup.iter().next().is_some(),
            Ok(Err(e)) => {
                debug!("Resolution of {} failed: {}", host, e);
                false
            }
            Err(_) => {
                debug!("Resolution of {} timed out after {:?}", host, self.timeout);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ip_literals_short_circuit() {
        let prober = Prober::new(Duration::from_millis(1)).expect("prober");
        // Succeeds without any resolver traffic, so the 1ms budget is moot.
        assert!(prober.check("127.0.0.1").await);
        assert!(prober.check("::1").await);
    }
}
