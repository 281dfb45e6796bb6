//! Point-to-point session with a single controller.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex as SyncMutex, PoisonError};

use futures::channel::oneshot;
use futures::future::{self, Either, FutureExt, Shared};
use log::debug;
use strum_macros::Display;

use crate::codec::{self, STATE_REPLY_LEN};
use crate::config::SessionConfig;
use crate::device::DiscoveredDevice;
use crate::errors::Error;
use crate::runtime::{self, AsyncTcpStream, Mutex, TcpStream};
use crate::snapshot::DeviceSnapshot;
use crate::types::{Color, PowerState};

type Result<T> = std::result::Result<T, Error>;

/// Lifecycle of a [`Session`]. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
pub enum SessionState {
    Unopened = 0,
    Open = 1,
    Closed = 2,
}

impl SessionState {
    fn from_raw(value: u8) -> Self {
        match value {
            0 => SessionState::Unopened,
            1 => SessionState::Open,
            _ => SessionState::Closed,
        }
    }
}

/// A TCP conversation with one Magic Home controller.
///
/// Color and power commands are written without waiting for an
/// acknowledgement; the controller does not send one. Only
/// [`query_state`](Session::query_state) reads a reply.
///
/// Calls are serialized on the connection, so a `Session` can be shared
/// (e.g. behind an `Arc`) without replies getting paired with the wrong
/// request. [`close`](Session::close) does not wait for an in-flight call: it
/// interrupts it.
///
/// # Example
///
/// ```ignore
/// use magic_home_rs::{Color, PowerState, Session, SessionConfig};
///
/// let session = Session::connect("192.168.1.42:5577".parse()?, SessionConfig::default()).await?;
/// session.set_power(PowerState::On).await?;
/// session.set_color(&Color::rgbw(255, 0, 128, 0)).await?;
/// let snapshot = session.query_state().await?;
/// session.close().await?;
/// ```
pub struct Session {
    addr: SocketAddr,
    config: SessionConfig,
    state: AtomicU8,
    stream: Mutex<Option<TcpStream>>,
    close_tx: SyncMutex<Option<oneshot::Sender<()>>>,
    closed: Shared<oneshot::Receiver<()>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("addr", &self.addr)
            .field("config", &self.config)
            .field("state", &self.state())
            .finish()
    }
}

impl Session {
    /// Create an unopened session for the controller at `addr`.
    pub fn new(addr: SocketAddr, config: SessionConfig) -> Self {
        let (close_tx, close_rx) = oneshot::channel();
        Session {
            addr,
            config,
            state: AtomicU8::new(SessionState::Unopened as u8),
            stream: Mutex::new(None),
            close_tx: SyncMutex::new(Some(close_tx)),
            closed: close_rx.shared(),
        }
    }

    /// Create a session and open it.
    pub async fn connect(addr: SocketAddr, config: SessionConfig) -> Result<Self> {
        let session = Session::new(addr, config);
        session.open().await?;
        Ok(session)
    }

    /// Create an unopened session for a device found by discovery.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let devices = discover(&DiscoveryConfig::default()).await?;
    /// for device in &devices {
    ///     let session = Session::for_device(device, SessionConfig::default());
    ///     session.open().await?;
    /// }
    /// ```
    pub fn for_device(device: &DiscoveredDevice, config: SessionConfig) -> Self {
        Session::new(device.addr(), config)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        SessionState::from_raw(self.state.load(Ordering::Acquire))
    }

    /// Connect to the controller within the configured connect timeout.
    ///
    /// On failure the session stays unopened and `open` may be retried.
    pub async fn open(&self) -> Result<()> {
        let mut stream = self.stream.lock().await;
        self.expect_state(SessionState::Unopened, "open")?;

        let connected = runtime::timeout(self.config.connect_timeout, TcpStream::connect(self.addr))
            .await
            .map_err(std::io::Error::from)
            .and_then(|result| result)
            .map_err(|e| Error::unreachable(self.addr, e))?;

        *stream = Some(connected);
        self.state.store(SessionState::Open as u8, Ordering::Release);
        debug!("Opened session to {}", self.addr);
        Ok(())
    }

    /// Set the stored color. Visible immediately if the controller is on.
    pub async fn set_color(&self, color: &Color) -> Result<()> {
        self.command("set color on", &codec::encode_set_color(color)).await
    }

    pub async fn set_power(&self, power: PowerState) -> Result<()> {
        self.command("set power on", &codec::encode_set_power(power)).await
    }

    /// Ask the controller for its power state and color.
    ///
    /// If this fails with [`Error::Timeout`] or [`Error::MalformedFrame`] a
    /// late or partial reply may still be in flight; close and reopen the
    /// session before querying again.
    pub async fn query_state(&self) -> Result<DeviceSnapshot> {
        const OPERATION: &str = "query";
        self.expect_state(SessionState::Open, OPERATION)?;

        let mut guard = self.stream.lock().await;
        let stream = guard
            .as_mut()
            .ok_or_else(|| Error::invalid_state(OPERATION, self.state()))?;

        self.write_frame(OPERATION, stream, &codec::encode_query_state())
            .await?;

        let mut reply = [0u8; STATE_REPLY_LEN];
        let deadline = self.config.read_timeout;
        match self
            .interruptible(runtime::timeout(deadline, stream.read_exact(&mut reply)))
            .await
        {
            None => return Err(Error::invalid_state(OPERATION, SessionState::Closed)),
            Some(Err(_)) => return Err(Error::Timeout(deadline)),
            Some(Ok(Err(e))) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Err(Error::malformed("connection closed before a full reply"));
            }
            Some(Ok(Err(e))) => return Err(Error::ReadFailed(e)),
            Some(Ok(Ok(()))) => {}
        }

        debug!("Received {:02x?} from {}", reply, self.addr);
        codec::decode_reply(&reply)
    }

    /// Release the connection.
    ///
    /// Any call still waiting on the connection returns
    /// [`Error::InvalidState`]. Closing a session that is not open is an
    /// error too.
    pub async fn close(&self) -> Result<()> {
        if let Err(actual) = self.state.compare_exchange(
            SessionState::Open as u8,
            SessionState::Closed as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            return Err(Error::invalid_state("close", SessionState::from_raw(actual)));
        }

        let close_tx = self
            .close_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(close_tx) = close_tx {
            let _ = close_tx.send(());
        }

        let stream = self.stream.lock().await.take();
        if let Some(mut stream) = stream
            && let Err(e) = stream.shutdown().await
        {
            debug!("Shutdown of session to {} failed: {:?}", self.addr, e);
        }

        debug!("Closed session to {}", self.addr);
        Ok(())
    }

    fn expect_state(&self, expected: SessionState, operation: &'static str) -> Result<()> {
        let state = self.state();
        if state == expected {
            Ok(())
        } else {
            Err(Error::invalid_state(operation, state))
        }
    }

    async fn command(&self, operation: &'static str, frame: &[u8]) -> Result<()> {
        self.expect_state(SessionState::Open, operation)?;

        let mut guard = self.stream.lock().await;
        let stream = guard
            .as_mut()
            .ok_or_else(|| Error::invalid_state(operation, self.state()))?;

        self.write_frame(operation, stream, frame).await
    }

    async fn write_frame(
        &self,
        operation: &'static str,
        stream: &mut TcpStream,
        frame: &[u8],
    ) -> Result<()> {
        match self
            .interruptible(runtime::timeout(
                self.config.read_timeout,
                stream.write_all(frame),
            ))
            .await
        {
            None => Err(Error::invalid_state(operation, SessionState::Closed)),
            Some(Err(timed_out)) => Err(Error::WriteFailed(timed_out.into())),
            Some(Ok(Err(e))) => Err(Error::WriteFailed(e)),
            Some(Ok(Ok(()))) => {
                debug!("Sent {:02x?} to {}", frame, self.addr);
                Ok(())
            }
        }
    }

    /// Run `fut` until it completes or the session is closed, whichever is first.
    async fn interruptible<F: Future>(&self, fut: F) -> Option<F::Output> {
        let closed = self.closed.clone();
        futures::pin_mut!(closed);
        futures::pin_mut!(fut);
        match future::select(closed, fut).await {
            Either::Left(_) => None,
            Either::Right((output, _)) => Some(output),
        }
    }
}
