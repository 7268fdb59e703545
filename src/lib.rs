//! # Overview
//!
//! `midirx` turns raw MIDI input into complete MIDI messages, without allocating and without
//! blocking, so that it can run right next to the interrupt handler of a microcontroller.
//!
//! Two transports are supported:
//!
//! - Serial MIDI (DIN, TRS or a plain UART), where bytes arrive one at a time with running status
//!     and real-time bytes mixed in between. Use [`SerialMidiParser`](struct.SerialMidiParser.html).
//! - USB-MIDI, where messages arrive as 4-byte event packets tagged with a cable number.
//!     Use [`UsbMidiParser`](struct.UsbMidiParser.html).
//!
//! Both parsers are fed one unit of input at a time and answer with a
//! [`ParserEvent`](enum.ParserEvent.html) saying which kind of message (if any) was completed:
//!
//! ```rust
//! use midirx::{MidiParser, ParserEvent, SerialMidiParser};
//!
//! let mut parser = SerialMidiParser::new();
//! for &byte in &[0x90, 0x3C, 0x7F] {
//!     if let ParserEvent::ChannelMessage = parser.parse(byte) {
//!         let msg = parser.channel_message();
//!         println!("note on, key {}", msg.data1);
//!     }
//! }
//! ```
//!
//! The payload accessors read from storage owned by the parser, which is reused by the next call
//! to `parse`.
//! System exclusive messages in particular are handed out as a borrowed view into the parser's
//! buffer.
//!
//! If closures are more convenient, `feed` runs the parser over a whole slice:
//!
//! ```rust
//! use midirx::{LiveEvent, UsbMidiParser};
//!
//! let mut parser = UsbMidiParser::new();
//! let packets = [0x04, 0xF0, 0x7E, 0x7F, 0x07, 0x06, 0x01, 0xF7];
//! parser.feed(&packets, |ev| {
//!     if let LiveEvent::SysEx(sysex) = ev {
//!         assert_eq!(sysex.data(), &[0xF0, 0x7E, 0x7F, 0x06, 0x01, 0xF7]);
//!     }
//! }).unwrap();
//! ```
//!
//! # Malformed input
//!
//! Parsing never fails.
//! Stray bytes are dropped, system exclusive messages that do not fit in the buffer are truncated,
//! and a system exclusive message interrupted by a status byte is closed early.
//! Whatever garbage comes first, well-formed input that follows is always parsed correctly.
//!
//! # About features
//!
//! - The `std` feature (enabled by default)
//!
//!   Implements `std::error::Error` for [`Error`](struct.Error.html).
//!   Disabling it with `default-features = false` makes the crate `no_std`.
//!
//! - The `alloc` feature
//!
//!   Adds helpers that copy system exclusive data into a `Vec`.
//!
//! - The `strict` feature
//!
//!   Makes the `feed` helpers of the USB parser reject packets with reserved code index numbers,
//!   instead of skipping them.
//!
//! - The `defmt` feature
//!
//!   Implements `defmt::Format` on all public types and logs recovery from malformed input
//!   through `defmt`.
//!
//! # Buffer size
//!
//! Each parser owns one system exclusive buffer of [`SYSEX_BUFFER_SIZE`](constant.SYSEX_BUFFER_SIZE.html)
//! bytes.
//! A different capacity can be chosen through the const parameter of the parser type:
//!
//! ```rust
//! use midirx::{SerialMidiParser, SysExBuffer};
//!
//! let parser = SerialMidiParser::with_buffer(SysExBuffer::<512>::new());
//! assert_eq!(parser.sysex_capacity(), 512);
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

macro_rules! bail {
    ($err:expr) => {{
        return Err($err.into());
    }};
}
macro_rules! ensure {
    ($cond:expr, $err:expr) => {{
        if !$cond {
            bail!($err)
        }
    }};
}

/// Log through `defmt` if the feature is enabled, otherwise evaluate nothing.
macro_rules! log_at {
    ($level:ident, $fmt:literal $(, $arg:expr)* $(,)?) => {{
        #[cfg(feature = "defmt")]
        defmt::$level!($fmt $(, $arg)*);
        #[cfg(not(feature = "defmt"))]
        {
            $( let _ = &$arg; )*
        }
    }};
}
macro_rules! trace {
    ($($tt:tt)*) => { log_at!(trace, $($tt)*) };
}
macro_rules! debug {
    ($($tt:tt)*) => { log_at!(debug, $($tt)*) };
}

/// All of the errors this crate produces.
#[macro_use]
mod error;

mod prelude {
    pub(crate) use crate::{
        error::{ErrorKind, Result, StdResult},
        event::{
            ChannelMessage, ChannelMessageType, LiveEvent, MidiParser, ParserEvent,
            RealTimeMessage, SysExMessage, SystemRealtime,
        },
        primitive::{u4, u7},
        sysex::SysExBuffer,
    };
    pub(crate) use core::{convert::TryFrom, fmt};
}

mod event;
mod primitive;
mod serial;
mod sysex;
mod usb;

pub use crate::{
    error::{Error, ErrorKind, Result},
    event::{
        ChannelMessage, ChannelMessageType, LiveEvent, MidiParser, ParserEvent, RealTimeMessage,
        SysExMessage, SystemRealtime,
    },
    serial::SerialMidiParser,
    sysex::SysExBuffer,
    usb::{CodeIndexNumber, UsbMidiPacket, UsbMidiParser},
};

/// Capacity in bytes of the system exclusive buffer owned by each parser, unless another size is
/// picked through the parser's const parameter.
///
/// The count includes the leading `F0` and the closing `F7`.
pub const SYSEX_BUFFER_SIZE: usize = 128;

/// Exotically-sized integers used by the MIDI standard.
pub mod num {
    pub use crate::primitive::{u4, u7};
}
