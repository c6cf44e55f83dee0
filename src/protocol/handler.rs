//! Collaborator callbacks for a [`Framer`](super::Framer).
//!
//! Each callback is optional. Parsing without a packet handler silently
//! discards decoded frames; sink encoding reports
//! [`EncodeError::CallbackMissing`](crate::EncodeError::CallbackMissing)
//! when it needs a callback that is not set.
//!
//! Callbacks borrow their closures, so any state they touch (the "user
//! context") is simply captured by the closure. Closures must be `Send` so
//! a framer can be held across `.await` in a spawned task.

use std::fmt;

/// Decoded packet handler.
pub type PacketFn<'a> = &'a mut (dyn FnMut(&[u8]) + Send);
/// Output byte sink.
pub type ByteFn<'a> = &'a mut (dyn FnMut(u8) + Send);
/// Flush signal.
pub type FlushFn<'a> = &'a mut (dyn FnMut() + Send);

/// The set of callbacks a framer invokes.
///
/// # Example
///
/// ```
/// use simplehdlc::Handlers;
///
/// let mut received = Vec::new();
/// let mut on_packet = |payload: &[u8]| received.push(payload.to_vec());
/// let handlers = Handlers::new().on_packet(&mut on_packet);
/// assert!(handlers.has_packet());
/// ```
#[derive(Default)]
pub struct Handlers<'a> {
    packet: Option<PacketFn<'a>>,
    byte: Option<ByteFn<'a>>,
    flush: Option<FlushFn<'a>>,
}

impl<'a> Handlers<'a> {
    /// Creates an empty handler set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the packet-received handler.
    #[must_use]
    pub fn on_packet(mut self, f: PacketFn<'a>) -> Self {
        self.packet = Some(f);
        self
    }

    /// Sets the output byte sink.
    #[must_use]
    pub fn on_byte(mut self, f: ByteFn<'a>) -> Self {
        self.byte = Some(f);
        self
    }

    /// Sets the flush handler.
    #[must_use]
    pub fn on_flush(mut self, f: FlushFn<'a>) -> Self {
        self.flush = Some(f);
        self
    }

    /// Returns true if a packet handler is set.
    #[must_use]
    pub const fn has_packet(&self) -> bool {
        self.packet.is_some()
    }

    /// Returns true if a byte sink is set.
    #[must_use]
    pub const fn has_byte(&self) -> bool {
        self.byte.is_some()
    }

    /// Returns true if a flush handler is set.
    #[must_use]
    pub const fn has_flush(&self) -> bool {
        self.flush.is_some()
    }

    pub(crate) fn packet(&mut self, payload: &[u8]) {
        if let Some(f) = self.packet.as_mut() {
            f(payload);
        }
    }

    pub(crate) fn byte_sink(&mut self) -> Option<&mut (dyn FnMut(u8) + Send + 'a)> {
        self.byte.as_deref_mut()
    }

    pub(crate) fn flush(&mut self) {
        if let Some(f) = self.flush.as_mut() {
            f();
        }
    }
}

impl fmt::Debug for Handlers<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handlers")
            .field("packet", &self.has_packet())
            .field("byte", &self.has_byte())
            .field("flush", &self.has_flush())
            .finish()
    }
}
