use core::fmt;

/// Represents an error raised by one of the fallible helpers of this crate.
///
/// The per-byte and per-packet `parse` methods never produce errors, they recover silently from
/// bad input instead.
/// Errors only come from the surfaces that take whole slices or raw integers: building a
/// [`ChannelMessage`](struct.ChannelMessage.html) by hand, splitting USB-MIDI packets, and the
/// `feed` helper of [`UsbMidiParser`](struct.UsbMidiParser.html).
///
/// This type is a thin pointer to a static `ErrorKind`, so it is as cheap to move around as a
/// reference and needs no allocation.
///
/// If the `std` feature is enabled, this type implements `std::error::Error`.
/// Otherwise, only `Display` and `Debug` are implemented.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Error {
    inner: &'static ErrorKind,
}
impl Error {
    /// Create a new error with the given `ErrorKind`.
    #[inline]
    pub const fn new(kind: &'static ErrorKind) -> Error {
        Error { inner: kind }
    }

    /// More information about the error itself.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        *self.inner
    }
}
impl From<&'static ErrorKind> for Error {
    #[inline]
    fn from(inner: &'static ErrorKind) -> Error {
        Error { inner }
    }
}
impl fmt::Display for Error {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self.inner, f)
    }
}
impl fmt::Debug for Error {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}
#[cfg(feature = "std")]
impl std::error::Error for Error {}
#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        defmt::Format::format(self.inner, f)
    }
}

/// The type of error that occurred.
///
/// Errors are broadly categorized into 2 classes, and specific error info is provided as a
/// non-normative string literal.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// The input cannot be interpreted at all, for example a USB-MIDI packet that is not 4 bytes
    /// long or a channel message with an out-of-range status byte.
    Invalid(&'static str),

    /// The input could be skipped over, but it does not follow the MIDI or USB-MIDI specs.
    ///
    /// This kind of error is not emitted by default, only if the `strict` crate feature is
    /// enabled.
    Malformed(&'static str),
}
impl ErrorKind {
    /// Get the informative message on what exact part of the input was not respected.
    #[inline]
    pub fn message(&self) -> &'static str {
        match *self {
            ErrorKind::Invalid(msg) => msg,
            ErrorKind::Malformed(msg) => msg,
        }
    }
}
impl fmt::Display for ErrorKind {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorKind::Invalid(msg) => write!(f, "invalid midi: {}", msg),
            ErrorKind::Malformed(msg) => write!(f, "malformed midi: {}", msg),
        }
    }
}

macro_rules! err_invalid {
    ($msg:expr) => {{
        const ERR_KIND: &'static ErrorKind = &ErrorKind::Invalid($msg);
        ERR_KIND
    }};
}
#[allow(unused_macros)]
macro_rules! err_malformed {
    ($msg:expr) => {{
        const ERR_KIND: &'static ErrorKind = &ErrorKind::Malformed($msg);
        ERR_KIND
    }};
}

/// The result type used by the fallible helpers of this crate.
pub type Result<T> = StdResult<T, Error>;
pub(crate) use core::result::Result as StdResult;
