//! Serial/USB transport implementation.
//!
//! This module carries frames over a serial port. Outgoing payloads are
//! framed with [`encode_frame`]; incoming bytes are fed to a [`Framer`]
//! and every valid frame is forwarded on an `mpsc` channel.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, PoisonError};
use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_serial::{SerialPortBuilderExt, SerialStream};

use crate::error::{Error, Result};
use crate::protocol::{ByteOrder, CHECKSUM_SIZE, Framer, Handlers, encode_frame};
use crate::transport::Transport;

/// Default baud rate.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Default connection delay.
pub const DEFAULT_CONNECTION_DELAY: Duration = Duration::from_millis(300);

/// Default receive buffer capacity (payload plus checksum).
pub const DEFAULT_RX_CAPACITY: usize = 1024;

/// Size of each read from the port.
const READ_CHUNK_SIZE: usize = 1024;

/// Configuration for serial transport.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Serial port path (e.g., "/dev/ttyUSB0" or "COM3").
    pub port: String,
    /// Baud rate.
    pub baud_rate: u32,
    /// Byte order of the length and checksum fields.
    pub byte_order: ByteOrder,
    /// Receive buffer capacity in bytes, including the 4 checksum bytes.
    pub rx_capacity: usize,
    /// Delay after opening the port before it is used.
    pub connection_delay: Duration,
}

impl SerialConfig {
    /// Creates a new serial configuration with default settings.
    #[must_use]
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            byte_order: ByteOrder::default(),
            rx_capacity: DEFAULT_RX_CAPACITY,
            connection_delay: DEFAULT_CONNECTION_DELAY,
        }
    }

    /// Sets the baud rate.
    #[must_use]
    pub const fn baud_rate(mut self, rate: u32) -> Self {
        self.baud_rate = rate;
        self
    }

    /// Sets the field byte order.
    #[must_use]
    pub const fn byte_order(mut self, order: ByteOrder) -> Self {
        self.byte_order = order;
        self
    }

    /// Sets the receive buffer capacity.
    #[must_use]
    pub const fn rx_capacity(mut self, capacity: usize) -> Self {
        self.rx_capacity = capacity;
        self
    }

    /// Sets the connection delay.
    #[must_use]
    pub const fn connection_delay(mut self, delay: Duration) -> Self {
        self.connection_delay = delay;
        self
    }

    /// Largest payload the receive side accepts.
    #[must_use]
    pub const fn max_payload(&self) -> usize {
        self.rx_capacity.saturating_sub(CHECKSUM_SIZE)
    }
}

/// Serial transport for framed communication.
///
/// Uses split read/write halves to allow concurrent reading and writing.
pub struct SerialTransport {
    config: SerialConfig,
    writer: Option<Arc<Mutex<WriteHalf<SerialStream>>>>,
    reader: Option<ReadHalf<SerialStream>>,
}

impl SerialTransport {
    /// Creates a new serial transport with the given configuration.
    #[must_use]
    pub const fn new(config: SerialConfig) -> Self {
        Self {
            config,
            writer: None,
            reader: None,
        }
    }

    /// Creates a new serial transport for the given port with default settings.
    #[must_use]
    pub fn with_port(port: impl Into<String>) -> Self {
        Self::new(SerialConfig::new(port))
    }

    /// Returns the transport configuration.
    #[must_use]
    pub const fn config(&self) -> &SerialConfig {
        &self.config
    }

    /// Takes the reader half for use in a background task.
    ///
    /// This can only be called once after connecting.
    pub fn take_reader(&mut self) -> Option<ReadHalf<SerialStream>> {
        self.reader.take()
    }

    /// Spawns the read loop, forwarding decoded payloads to `frame_tx`.
    ///
    /// Returns `None` if not connected or the reader was already taken.
    pub fn spawn_reader(&mut self, frame_tx: mpsc::Sender<Bytes>) -> Option<JoinHandle<Result<()>>> {
        let reader = self.take_reader()?;
        let order = self.config.byte_order;
        let capacity = self.config.rx_capacity;
        Some(tokio::spawn(run_read_loop_with_reader(
            reader, order, capacity, frame_tx,
        )))
    }
}

/// Runs the read loop with a given reader, processing incoming data.
///
/// Bytes are parsed with a [`Framer`] of `rx_capacity` bytes. Each valid
/// payload is sent on `frame_tx`; malformed frames are dropped. This should
/// be spawned as a separate task.
///
/// # Errors
///
/// Returns an error if reading fails or the stream reaches end of file.
/// Returns `Ok` once the frame receiver is dropped.
pub async fn run_read_loop_with_reader<R>(
    mut reader: R,
    order: ByteOrder,
    rx_capacity: usize,
    frame_tx: mpsc::Sender<Bytes>,
) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    let decoded = std::sync::Mutex::new(Vec::new());
    let mut on_packet = |payload: &[u8]| {
        decoded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Bytes::copy_from_slice(payload));
    };
    let mut rx = vec![0u8; rx_capacity];
    let mut framer = Framer::new(&mut rx, order, Handlers::new().on_packet(&mut on_packet));
    let mut buf = [0u8; READ_CHUNK_SIZE];

    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => {
                tracing::debug!("serial port closed");
                return Err(Error::Io(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    "serial port closed",
                )));
            }
            Ok(n) => n,
            Err(e) => {
                tracing::error!("serial read error: {}", e);
                return Err(Error::Io(e));
            }
        };

        if tracing::enabled!(tracing::Level::TRACE) {
            tracing::trace!("received {} bytes: {}", n, hex::encode(&buf[..n]));
        }
        framer.parse(&buf[..n]);

        let frames = std::mem::take(&mut *decoded.lock().unwrap_or_else(PoisonError::into_inner));
        for frame in frames {
            tracing::trace!("decoded frame: {} bytes", frame.len());
            if frame_tx.send(frame).await.is_err() {
                tracing::debug!(stats = ?framer.stats(), "frame receiver dropped");
                return Ok(());
            }
        }
    }
}

/// Frames `payload` and writes it to `writer`, flushing afterwards.
pub async fn send_frame<W>(writer: &mut W, order: ByteOrder, payload: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let frame = encode_frame(order, payload)?;
    if tracing::enabled!(tracing::Level::TRACE) {
        tracing::trace!("sending frame: {} bytes: {}", frame.len(), hex::encode(&frame));
    }

    writer.write_all(&frame).await.map_err(Error::Io)?;
    writer.flush().await.map_err(Error::Io)?;
    Ok(())
}

impl Transport for SerialTransport {
    fn connect(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            if self.writer.is_some() {
                return Ok(());
            }

            tracing::info!("connecting to serial port: {}", self.config.port);

            let stream = tokio_serial::new(&self.config.port, self.config.baud_rate)
                .open_native_async()
                .map_err(Error::Serial)?;

            // Wait for device to be ready
            tokio::time::sleep(self.config.connection_delay).await;

            // Split the stream into read and write halves
            let (reader, writer) = tokio::io::split(stream);
            self.reader = Some(reader);
            self.writer = Some(Arc::new(Mutex::new(writer)));

            tracing::info!("connected to serial port");
            Ok(())
        })
    }

    fn disconnect(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            if self.writer.is_some() || self.reader.is_some() {
                tracing::info!("disconnecting from serial port");
                self.writer = None;
                self.reader = None;
            }
            Ok(())
        })
    }

    fn send(&mut self, data: Bytes) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let writer = self.writer.clone();
        let order = self.config.byte_order;
        Box::pin(async move {
            let writer = writer.ok_or(Error::NotConnected)?;
            let mut writer = writer.lock().await;
            send_frame(&mut *writer, order, &data).await
        })
    }

    fn is_connected(&self) -> bool {
        self.writer.is_some()
    }
}

/// Lists available serial ports.
///
/// # Errors
///
/// Returns an error if the port list cannot be retrieved.
pub fn list_ports() -> Result<Vec<String>> {
    let ports = tokio_serial::available_ports().map_err(Error::Serial)?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}
