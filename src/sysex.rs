//! Fixed-capacity storage for system exclusive messages.

use crate::{
    prelude::*,
    primitive::{SYSEX_END, SYSEX_START},
};

/// A stack buffer holding one system exclusive message, including its `F0` and `F7` markers.
///
/// Each parser owns exactly one of these, and overwrites it with every new system exclusive
/// message.
/// The buffer never grows past `N` bytes: bytes that do not fit are dropped and remembered as a
/// truncation, and the closing `F7` is only stored if there is room left for it.
///
/// The buffer is usually created implicitly by the parser constructors, but can be created
/// separately to pick a capacity other than [`SYSEX_BUFFER_SIZE`](constant.SYSEX_BUFFER_SIZE.html):
///
/// ```rust
/// use midirx::{SysExBuffer, UsbMidiParser};
///
/// let parser = UsbMidiParser::with_buffer(SysExBuffer::<32>::new());
/// assert_eq!(parser.sysex_capacity(), 32);
/// ```
#[derive(Clone)]
pub struct SysExBuffer<const N: usize> {
    buf: [u8; N],
    len: usize,
    cable: u4,
    truncated: bool,
}
impl<const N: usize> SysExBuffer<N> {
    pub const MAX_CAP: usize = N;

    /// An empty buffer.
    #[inline]
    pub const fn new() -> SysExBuffer<N> {
        SysExBuffer {
            buf: [0; N],
            len: 0,
            cable: u4::new(0),
            truncated: false,
        }
    }

    /// Discard the current contents and open a new message on the given cable with its leading
    /// `F0`.
    #[inline]
    pub(crate) fn start(&mut self, cable: u4) {
        self.reset(cable);
        self.push(SYSEX_START);
    }

    /// Discard the current contents and open an empty message on the given cable.
    #[inline]
    pub(crate) fn reset(&mut self, cable: u4) {
        self.clear();
        self.cable = cable;
    }

    /// Store a byte if there is room for it, otherwise drop it and mark the message as truncated.
    ///
    /// Returns whether the byte was stored.
    #[inline]
    pub(crate) fn push(&mut self, byte: u8) -> bool {
        match self.buf.get_mut(self.len) {
            Some(slot) => {
                *slot = byte;
                self.len += 1;
                true
            }
            None => {
                if !self.truncated {
                    debug!("sysex buffer full, dropping data past {=usize} bytes", N);
                }
                self.truncated = true;
                false
            }
        }
    }

    /// Store as many bytes as fit.
    #[inline]
    pub(crate) fn extend(&mut self, data: &[u8]) {
        for &byte in data {
            self.push(byte);
        }
    }

    /// Append the closing `F7`, if it fits.
    #[inline]
    pub(crate) fn finish(&mut self) {
        if !self.push(SYSEX_END) {
            trace!("no room for the sysex end marker");
        }
    }

    #[inline]
    pub(crate) fn clear(&mut self) {
        self.len = 0;
        self.truncated = false;
    }

    /// The stored bytes.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// The amount of stored bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The total amount of bytes this buffer can hold.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// The cable of the message being held.
    #[inline]
    pub fn cable(&self) -> u4 {
        self.cable
    }

    /// Whether any byte of the current message was dropped.
    #[inline]
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// A read-only view of the current message.
    #[inline]
    pub fn message(&self) -> SysExMessage<'_> {
        SysExMessage::new(self.as_slice(), self.cable, self.truncated)
    }
}
impl<const N: usize> Default for SysExBuffer<N> {
    #[inline]
    fn default() -> SysExBuffer<N> {
        SysExBuffer::new()
    }
}
impl<const N: usize> core::hash::Hash for SysExBuffer<N> {
    #[inline]
    fn hash<H: core::hash::Hasher>(&self, h: &mut H) {
        h.write(self.as_slice());
        h.write(&[0xFF]);
    }
}
impl<const N: usize> fmt::Debug for SysExBuffer<N> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "SysExBuffer[")?;
        for databyte in self.as_slice() {
            write!(f, "{:02x}", databyte)?;
        }
        write!(f, "]")?;
        Ok(())
    }
}
