//! Device discovery via UDP broadcast.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use log::{debug, warn};

use crate::codec::{DISCOVERY_REQUEST, decode_discovery_reply};
use crate::config::DiscoveryConfig;
use crate::device::DiscoveredDevice;
use crate::errors::Error;
use crate::runtime::{self, AsyncUdpSocket, Instant, UdpSocket};

type Result<T> = std::result::Result<T, Error>;

/// Pause after a failed receive before trying again.
const RECV_RETRY_DELAY: Duration = Duration::from_millis(20);

/// Discover controllers by broadcasting a request to `broadcast_addr` and
/// collecting replies for `discovery_timeout`.
///
/// # Examples
///
/// ```ignore
/// use std::time::Duration;
/// use magic_home_rs::discover_devices;
///
/// let devices = discover_devices("255.255.255.255:48899".parse()?, Duration::from_secs(1)).await?;
/// println!("Found {} devices", devices.len());
/// for device in devices {
///     println!("  {} - {} ({})", device.addr(), device.id(), device.model());
/// }
/// ```
pub async fn discover_devices(
    broadcast_addr: SocketAddr,
    discovery_timeout: Duration,
) -> Result<Vec<DiscoveredDevice>> {
    discover(
        &DiscoveryConfig::default()
            .with_broadcast_addr(broadcast_addr)
            .with_timeout(discovery_timeout),
    )
    .await
}

/// Discover controllers on the local network using UDP broadcast.
///
/// Sends one request and collects replies until `config.timeout` elapses.
/// Records are returned in arrival order; a device that answers twice shows
/// up twice. Replies that fail to decode are logged and skipped. Finding
/// nothing is not an error.
///
/// The socket lives only for the duration of this call.
pub async fn discover(config: &DiscoveryConfig) -> Result<Vec<DiscoveredDevice>> {
    let bind_addr = match config.broadcast_addr {
        SocketAddr::V4(_) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
        SocketAddr::V6(_) => SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0)),
    };
    let socket = UdpSocket::bind(bind_addr)
        .await
        .map_err(|e| Error::broadcast("bind", e))?;

    if config.broadcast_addr.is_ipv4() {
        socket
            .set_broadcast(true)
            .map_err(|e| Error::broadcast("set_broadcast", e))?;
    }

    socket
        .send_to(DISCOVERY_REQUEST, config.broadcast_addr)
        .await
        .map_err(|e| Error::broadcast("send_to", e))?;
    debug!("Sent discovery request to {}", config.broadcast_addr);

    let start = Instant::now();
    let mut discovered = Vec::new();
    // The receive loop never finishes on its own; the deadline always wins
    // and drops it, leaving whatever it has appended.
    let _ = runtime::timeout(config.timeout, collect_replies(&socket, &mut discovered)).await;

    debug!(
        "Discovery finished after {:?} with {} replies",
        start.elapsed(),
        discovered.len()
    );
    Ok(discovered)
}

async fn collect_replies<S: AsyncUdpSocket>(
    socket: &S,
    discovered: &mut Vec<DiscoveredDevice>,
) {
    let mut buffer = [0u8; 1024];
    loop {
        match socket.recv_from(&mut buffer).await {
            Ok((size, from)) => match decode_discovery_reply(&buffer[..size]) {
                Ok(device) => {
                    debug!("Discovered {} ({}) from {}", device.id, device.model, from);
                    discovered.push(device);
                }
                Err(e) => warn!("Dropping discovery reply from {}: {}", from, e),
            },
            Err(e) => {
                // Some errors repeat on every call. Pause so the deadline
                // timer gets to run.
                debug!("Discovery receive error: {:?}", e);
                runtime::sleep(RECV_RETRY_DELAY).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::time::Duration;

    use tokio::net::UdpSocket as TestSocket;

    /// Stands in for a network segment: takes the request, then has each reply
    /// sent from its own socket, concurrently.
    async fn spawn_segment(replies: Vec<Vec<u8>>) -> SocketAddr {
        let segment = TestSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = segment.local_addr().unwrap();
        tokio::spawn(async move {
            let mut buf = [0u8; 64];
            let (size, requester) = segment.recv_from(&mut buf).await.unwrap();
            assert_eq!(&buf[..size], DISCOVERY_REQUEST);
            for reply in replies {
                tokio::spawn(async move {
                    let responder = TestSocket::bind("127.0.0.1:0").await.unwrap();
                    responder.send_to(&reply, requester).await.unwrap();
                });
            }
        });
        addr
    }

    fn reply(n: usize) -> Vec<u8> {
        format!("10.0.0.{},ACCF2300{:04},AK001-ZJ200", n, n).into_bytes()
    }

    fn ids(devices: &[DiscoveredDevice]) -> HashSet<String> {
        devices.iter().map(|d| d.id().to_string()).collect()
    }

    #[tokio::test]
    async fn test_discover_collects_all_responders() {
        let addr = spawn_segment((1..=8).map(reply).collect()).await;

        let devices = discover_devices(addr, Duration::from_millis(500))
            .await
            .unwrap();

        assert_eq!(devices.len(), 8);
        let expected: HashSet<String> = (1..=8).map(|n| format!("ACCF2300{:04}", n)).collect();
        assert_eq!(ids(&devices), expected);
    }

    #[tokio::test]
    async fn test_discover_skips_malformed_replies() {
        let mut replies: Vec<Vec<u8>> = (1..=4).map(reply).collect();
        replies.push(b"+ok".to_vec());
        replies.push(b"garbage,with-too,many,fields".to_vec());
        replies.push(vec![0xff, 0x00, 0x13]);
        replies.insert(1, b"not-an-ip,ID,MODEL".to_vec());
        let addr = spawn_segment(replies).await;

        let devices = discover_devices(addr, Duration::from_millis(500))
            .await
            .unwrap();

        assert_eq!(devices.len(), 4);
        let expected: HashSet<String> = (1..=4).map(|n| format!("ACCF2300{:04}", n)).collect();
        assert_eq!(ids(&devices), expected);
    }

    #[tokio::test]
    async fn test_discover_keeps_duplicate_replies() {
        let addr = spawn_segment(vec![reply(7), reply(7)]).await;

        let devices = discover_devices(addr, Duration::from_millis(300))
            .await
            .unwrap();

        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0], devices[1]);
    }

    #[tokio::test]
    async fn test_discover_with_no_responders() {
        // Nobody answers on this port once the placeholder socket is gone.
        let placeholder = TestSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = placeholder.local_addr().unwrap();
        drop(placeholder);

        let window = Duration::from_millis(200);
        let start = std::time::Instant::now();
        let devices = discover_devices(addr, window).await.unwrap();
        let elapsed = start.elapsed();

        assert!(devices.is_empty());
        assert!(elapsed >= window, "returned early after {:?}", elapsed);
        assert!(
            elapsed < window + Duration::from_millis(300),
            "returned late after {:?}",
            elapsed
        );
    }

    #[tokio::test]
    async fn test_discover_reports_unsendable_request() {
        // Port 0 is not a valid destination.
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let err = discover_devices(addr, Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BroadcastUnavailable { .. }));
    }

    /// Socket whose every receive fails immediately.
    struct FailingSocket;

    impl AsyncUdpSocket for FailingSocket {
        async fn bind(_addr: SocketAddr) -> std::io::Result<Self> {
            Ok(FailingSocket)
        }

        async fn send_to(&self, buf: &[u8], _addr: SocketAddr) -> std::io::Result<usize> {
            Ok(buf.len())
        }

        async fn recv_from(&self, _buf: &mut [u8]) -> std::io::Result<(usize, SocketAddr)> {
            Err(std::io::ErrorKind::ConnectionRefused.into())
        }

        fn set_broadcast(&self, _broadcast: bool) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_receive_errors_do_not_starve_deadline() {
        let socket = FailingSocket;
        let mut discovered = Vec::new();
        let window = Duration::from_millis(100);

        let start = std::time::Instant::now();
        let outcome = tokio::time::timeout(
            Duration::from_secs(2),
            runtime::timeout(window, collect_replies(&socket, &mut discovered)),
        )
        .await
        .expect("collection ignored its deadline");

        assert!(outcome.is_err());
        assert!(discovered.is_empty());
        assert!(
            start.elapsed() < window + Duration::from_millis(300),
            "returned late after {:?}",
            start.elapsed()
        );
    }
}
