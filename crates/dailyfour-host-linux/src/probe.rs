//! Wireless network name probes
//!
//! - `nmcli` (NetworkManager), the primary source
//! - `iwgetid` (wireless-tools), used when `nmcli` fails or reports nothing

use async_trait::async_trait;
use dailyfour_host_api::NetworkProbe;
use std::time::Duration;
use tracing::{debug, warn};

use crate::run_with_timeout;

const NMCLI_TIMEOUT: Duration = Duration::from_secs(5);
const IWGETID_TIMEOUT: Duration = Duration::from_secs(10);

/// Reads the active wireless network from NetworkManager
#[derive(Debug, Clone)]
pub struct NmcliProbe {
    timeout: Duration,
}

impl Default for NmcliProbe {
    fn default() -> Self {
        Self {
            timeout: NMCLI_TIMEOUT,
        }
    }
}

#[async_trait]
impl NetworkProbe for NmcliProbe {
    fn name(&self) -> &'static str {
        "nmcli"
    }

    async fn probe(&self) -> Option<String> {
        match run_with_timeout("nmcli", &["-t", "-f", "active,ssid", "dev", "wifi"], self.timeout).await {
            Ok(output) => parse_nmcli_active(&String::from_utf8_lossy(&output.stdout)),
            Err(e) => {
                debug!(error = %e, "nmcli probe failed");
                None
            }
        }
    }
}

/// Reads the associated network from the wireless driver
#[derive(Debug, Clone)]
pub struct IwgetidProbe {
    timeout: Duration,
}

impl Default for IwgetidProbe {
    fn default() -> Self {
        Self {
            timeout: IWGETID_TIMEOUT,
        }
    }
}

#[async_trait]
impl NetworkProbe for IwgetidProbe {
    fn name(&self) -> &'static str {
        "iwgetid"
    }

    async fn probe(&self) -> Option<String> {
        match run_with_timeout("iwgetid", &["-r"], self.timeout).await {
            Ok(output) => non_empty(String::from_utf8_lossy(&output.stdout).trim()),
            Err(e) => {
                debug!(error = %e, "iwgetid probe failed");
                None
            }
        }
    }
}

/// Tries `primary`, then `secondary` when the first reports nothing
pub struct FallbackProbe {
    primary: Box<dyn NetworkProbe>,
    secondary: Box<dyn NetworkProbe>,
}

impl FallbackProbe {
    pub fn new(primary: Box<dyn NetworkProbe>, secondary: Box<dyn NetworkProbe>) -> Self {
        Self { primary, secondary }
    }

    /// `nmcli` with `iwgetid` as backup
    pub fn system() -> Self {
        Self::new(
            Box::new(NmcliProbe::default()),
            Box::new(IwgetidProbe::default()),
        )
    }
}

#[async_trait]
impl NetworkProbe for FallbackProbe {
    fn name(&self) -> &'static str {
        "fallback"
    }

    async fn probe(&self) -> Option<String> {
        if let Some(network) = self.primary.probe().await {
            return Some(network);
        }

        let network = self.secondary.probe().await;
        if network.is_some() {
            warn!(
                primary = self.primary.name(),
                secondary = self.secondary.name(),
                "Primary network probe found nothing, using fallback result"
            );
        }
        network
    }
}

/// The network name on the `yes:` line of `nmcli -t -f active,ssid` output
pub fn parse_nmcli_active(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .find_map(|line| line.strip_prefix("yes:"))
        .and_then(|escaped| non_empty(unescape_nmcli(escaped).trim()))
}

/// Undo nmcli terse-mode escaping of `:` and `\`
fn unescape_nmcli(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut chars = field.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
                continue;
            }
        }
        out.push(c);
    }
    out
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dailyfour_host_api::MockProbe;

    #[test]
    fn nmcli_active_line() {
        let out = "no:Neighbours\nyes:Office\nno:Cafe\n";
        assert_eq!(parse_nmcli_active(out).as_deref(), Some("Office"));
    }

    #[test]
    fn nmcli_escaped_colons() {
        let out = "yes:Floor\\:3 \\\\ East\n";
        assert_eq!(parse_nmcli_active(out).as_deref(), Some("Floor:3 \\ East"));
    }

    #[test]
    fn nmcli_nothing_active() {
        assert_eq!(parse_nmcli_active("no:Office\nno:Cafe\n"), None);
        assert_eq!(parse_nmcli_active(""), None);
        assert_eq!(parse_nmcli_active("yes:\n"), None);
    }

    #[tokio::test]
    async fn fallback_prefers_primary() {
        let primary = MockProbe::new(Some("Office"));
        let secondary = MockProbe::new(Some("Other"));
        let probe = FallbackProbe::new(Box::new(primary.clone()), Box::new(secondary.clone()));

        assert_eq!(probe.probe().await.as_deref(), Some("Office"));
        assert_eq!(secondary.calls(), 0);
    }

    #[tokio::test]
    async fn fallback_used_when_primary_empty() {
        let primary = MockProbe::new(None);
        let secondary = MockProbe::new(Some("Office"));
        let probe = FallbackProbe::new(Box::new(primary.clone()), Box::new(secondary));

        assert_eq!(probe.probe().await.as_deref(), Some("Office"));
        assert_eq!(primary.calls(), 1);
    }

    #[tokio::test]
    async fn both_empty_is_none() {
        let probe = FallbackProbe::new(Box::new(MockProbe::new(None)), Box::new(MockProbe::new(None)));
        assert_eq!(probe.probe().await, None);
    }
}
