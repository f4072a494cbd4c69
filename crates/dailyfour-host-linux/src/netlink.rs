//! Network interface change detection via netlink
//!
//! Listens on a route netlink socket for link, address and route changes and
//! wakes the network poller so a new association is seen before the next
//! poll interval.

use netlink_packet_core::{NetlinkMessage, NetlinkPayload};
use netlink_packet_route::RouteNetlinkMessage;
use netlink_sys::{protocols::NETLINK_ROUTE, Socket, SocketAddr};
use std::os::fd::AsRawFd;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::unix::AsyncFd;
use tokio::sync::{watch, Notify};
use tracing::{debug, error, info, warn};

const RTMGRP_LINK: u32 = 0x1;
const RTMGRP_IPV4_IFADDR: u32 = 0x10;
const RTMGRP_IPV4_ROUTE: u32 = 0x40;
const RTMGRP_IPV6_IFADDR: u32 = 0x100;
const RTMGRP_IPV6_ROUTE: u32 = 0x400;

const ROUTE_GROUPS: u32 =
    RTMGRP_LINK | RTMGRP_IPV4_IFADDR | RTMGRP_IPV4_ROUTE | RTMGRP_IPV6_IFADDR | RTMGRP_IPV6_ROUTE;

/// Wait after a change before waking the poller, so the interface has
/// settled and the probe sees the new network
const SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Wakes a poller whenever the kernel reports a network change
pub struct LinkWatcher {
    wake: Arc<Notify>,
    settle_delay: Duration,
}

impl LinkWatcher {
    pub fn new(wake: Arc<Notify>) -> Self {
        Self {
            wake,
            settle_delay: SETTLE_DELAY,
        }
    }

    /// Run until shutdown. Netlink being unavailable is not an error for the
    /// caller: the poller keeps working on its interval.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        if let Err(e) = self.watch(&mut shutdown).await {
            warn!(error = %e, "Netlink watcher failed, network changes will be seen on the poll interval");
        }
    }

    async fn watch(
        &self,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut socket = Socket::new(NETLINK_ROUTE)?;
        socket.bind(&SocketAddr::new(0, ROUTE_GROUPS))?;
        socket.set_non_blocking(true)?;
        let async_fd = AsyncFd::new(socket.as_raw_fd())?;

        info!("Netlink watcher started");

        let mut buf = vec![0u8; 8192];
        loop {
            tokio::select! {
                result = async_fd.readable() => {
                    let mut guard = match result {
                        Ok(guard) => guard,
                        Err(e) => {
                            error!(error = %e, "Async fd error");
                            return Err(e.into());
                        }
                    };

                    match socket.recv(&mut &mut buf[..], 0) {
                        Ok(len) if len > 0 && is_network_change(&buf[..len]) => {
                            guard.clear_ready();
                            debug!("Network interface change detected");
                            tokio::time::sleep(self.settle_delay).await;
                            self.wake.notify_one();
                        }
                        Ok(_) => guard.clear_ready(),
                        Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => guard.clear_ready(),
                        Err(e) => {
                            error!(error = %e, "Netlink recv error");
                            guard.clear_ready();
                        }
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        debug!("Netlink watcher shutting down");
                        return Ok(());
                    }
                }
            }
        }
    }
}

/// Whether a netlink buffer carries a link, address or route change
pub fn is_network_change(buf: &[u8]) -> bool {
    let mut offset = 0;

    while offset < buf.len() {
        let Ok(msg) = NetlinkMessage::<RouteNetlinkMessage>::deserialize(&buf[offset..]) else {
            break;
        };

        if let NetlinkPayload::InnerMessage(route_msg) = &msg.payload
            && matches!(
                route_msg,
                RouteNetlinkMessage::NewLink(_)
                    | RouteNetlinkMessage::DelLink(_)
                    | RouteNetlinkMessage::NewAddress(_)
                    | RouteNetlinkMessage::DelAddress(_)
                    | RouteNetlinkMessage::NewRoute(_)
                    | RouteNetlinkMessage::DelRoute(_)
            )
        {
            return true;
        }

        let len = msg.header.length as usize;
        if len == 0 {
            break;
        }
        offset += len;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use netlink_packet_core::NetlinkHeader;
    use netlink_packet_route::link::LinkMessage;
    use netlink_packet_route::route::RouteMessage;

    fn encode(inner: RouteNetlinkMessage) -> Vec<u8> {
        let mut msg = NetlinkMessage::new(NetlinkHeader::default(), NetlinkPayload::from(inner));
        msg.finalize();
        let mut buf = vec![0u8; msg.buffer_len()];
        msg.serialize(&mut buf[..]);
        buf
    }

    #[test]
    fn link_change_detected() {
        let buf = encode(RouteNetlinkMessage::NewLink(LinkMessage::default()));
        assert!(is_network_change(&buf));
    }

    #[test]
    fn query_is_not_a_change() {
        let buf = encode(RouteNetlinkMessage::GetLink(LinkMessage::default()));
        assert!(!is_network_change(&buf));
    }

    #[test]
    fn garbage_is_ignored() {
        assert!(!is_network_change(&[]));
        assert!(!is_network_change(&[0xde, 0xad, 0xbe, 0xef]));
    }

    #[test]
    fn route_change_detected_and_subscribed() {
        let buf = encode(RouteNetlinkMessage::DelRoute(RouteMessage::default()));
        assert!(is_network_change(&buf));
        assert_eq!(ROUTE_GROUPS & RTMGRP_IPV4_ROUTE, RTMGRP_IPV4_ROUTE);
        assert_eq!(ROUTE_GROUPS & RTMGRP_IPV6_ROUTE, RTMGRP_IPV6_ROUTE);
    }
}
