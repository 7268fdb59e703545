//! Parsing of raw, undelimited serial MIDI byte streams, as read from a DIN or TRS port through a
//! UART.
//!
//! Handles all of the quirks specific to MIDI streams: running status, system real-time messages
//! embedded in the middle of another message, and system exclusive messages that are restarted,
//! interrupted or never terminated.

use crate::{
    prelude::*,
    primitive::{is_channel_status, SYSEX_END, SYSEX_START},
    SYSEX_BUFFER_SIZE,
};

/// Where the parser stands in the byte stream.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum State {
    /// No status byte in effect, data bytes are dropped.
    Idle,
    /// A channel status is in effect (the running status), waiting for data bytes.
    Channel {
        header: u8,
        /// The first data byte, if already received for a two-data-byte message.
        data1: Option<u7>,
    },
    /// In between an `F0` and its closing `F7`.
    SysEx,
}

/// A streaming serial MIDI parser, taking raw bytes one at a time, presumably straight from a
/// UART.
///
/// Every byte yields a [`ParserEvent`](enum.ParserEvent.html) telling whether a message was
/// completed, whose payload can then be read through the [`MidiParser`](trait.MidiParser.html)
/// accessors.
///
/// ```rust
/// use midirx::{MidiParser, ParserEvent, SerialMidiParser};
///
/// let mut parser = SerialMidiParser::new();
/// assert_eq!(parser.parse(0x82), ParserEvent::NoMessage);
/// assert_eq!(parser.parse(0xF8), ParserEvent::RealTimeMessage);
/// assert_eq!(parser.parse(0x20), ParserEvent::NoMessage);
/// assert_eq!(parser.parse(0x7F), ParserEvent::ChannelMessage);
///
/// let msg = parser.channel_message();
/// assert_eq!(msg.header, 0x82);
/// assert_eq!((msg.data1.as_int(), msg.data2.as_int()), (0x20, 0x7F));
/// ```
///
/// Serial MIDI has no notion of cables, so all messages report cable 0.
#[derive(Clone, Debug)]
pub struct SerialMidiParser<const N: usize = SYSEX_BUFFER_SIZE> {
    state: State,
    channel: ChannelMessage,
    realtime: RealTimeMessage,
    sysex: SysExBuffer<N>,
}
impl SerialMidiParser {
    /// Create a fresh parser with the default buffer size.
    #[inline]
    pub fn new() -> SerialMidiParser {
        SerialMidiParser::default()
    }
}
impl<const N: usize> SerialMidiParser<N> {
    /// Create a fresh parser that collects system exclusive messages in the given buffer.
    #[inline]
    pub fn with_buffer(mut sysex: SysExBuffer<N>) -> SerialMidiParser<N> {
        sysex.clear();
        SerialMidiParser {
            state: State::Idle,
            channel: ChannelMessage::default(),
            realtime: RealTimeMessage::default(),
            sysex,
        }
    }

    /// The capacity of the system exclusive buffer, in bytes.
    #[inline]
    pub const fn sysex_capacity(&self) -> usize {
        N
    }

    /// Feed one byte to the parser.
    pub fn parse(&mut self, byte: u8) -> ParserEvent {
        match byte {
            0x00..=0x7F => self.parse_data(byte),
            0xF8..=0xFF => {
                // System Realtime
                // These single-byte events can appear in between the status and data bytes of
                // other messages, so they must not alter any other decoder state.
                if let Some(message_type) = SystemRealtime::from_status(byte) {
                    self.realtime = RealTimeMessage::new(message_type, u4::new(0));
                }
                ParserEvent::RealTimeMessage
            }
            SYSEX_START => {
                if self.state == State::SysEx {
                    debug!("sysex restarted, dropping {=usize} bytes", self.sysex.len());
                }
                self.sysex.start(u4::new(0));
                self.state = State::SysEx;
                ParserEvent::NoMessage
            }
            SYSEX_END => {
                if self.state == State::SysEx {
                    self.state = State::Idle;
                    self.finish_sysex()
                } else {
                    trace!("ignoring sysex end marker outside of sysex");
                    ParserEvent::NoMessage
                }
            }
            _ => self.parse_status(byte),
        }
    }

    /// Channel or System Common status byte.
    fn parse_status(&mut self, status: u8) -> ParserEvent {
        // Any status byte other than real-time ends an unterminated system exclusive message
        let event = if self.state == State::SysEx {
            debug!("sysex interrupted by status {=u8:#x}", status);
            self.finish_sysex()
        } else {
            ParserEvent::NoMessage
        };
        self.state = if is_channel_status(status) {
            State::Channel {
                header: status,
                data1: None,
            }
        } else {
            // System Common messages cancel running status, and are not reported
            State::Idle
        };
        event
    }

    fn parse_data(&mut self, byte: u8) -> ParserEvent {
        let data = u7::new(byte);
        match &mut self.state {
            State::Idle => ParserEvent::NoMessage,
            State::SysEx => {
                self.sysex.push(byte);
                ParserEvent::NoMessage
            }
            State::Channel { header, data1 } => {
                let header = *header;
                let two_bytes = ChannelMessageType::from_status(header)
                    .map(|ty| ty.data_len() == 2)
                    .unwrap_or(false);
                let (data1, data2) = match (two_bytes, data1.take()) {
                    (false, _) => (data, u7::new(0)),
                    (true, Some(first)) => (first, data),
                    (true, None) => {
                        *data1 = Some(data);
                        return ParserEvent::NoMessage;
                    }
                };
                // The header stays in place as running status
                self.channel = ChannelMessage {
                    header,
                    data1,
                    data2,
                    cable: u4::new(0),
                };
                ParserEvent::ChannelMessage
            }
        }
    }

    fn finish_sysex(&mut self) -> ParserEvent {
        self.sysex.finish();
        ParserEvent::SysExMessage
    }

    /// Feeds a slice of bytes to the parser, calling the `handle_ev` closure whenever a complete
    /// message is read.
    ///
    /// Calling `feed` with many small slices is equivalent to calling `feed` with one large
    /// concatenation of them all.
    pub fn feed(&mut self, bytes: &[u8], mut handle_ev: impl FnMut(LiveEvent)) {
        for &byte in bytes {
            let event = self.parse(byte);
            if let Some(ev) = self.event(event) {
                handle_ev(ev);
            }
        }
    }
}
impl<const N: usize> Default for SerialMidiParser<N> {
    #[inline]
    fn default() -> SerialMidiParser<N> {
        SerialMidiParser::with_buffer(SysExBuffer::new())
    }
}
impl<const N: usize> MidiParser for SerialMidiParser<N> {
    type Input = u8;

    #[inline]
    fn parse(&mut self, byte: u8) -> ParserEvent {
        SerialMidiParser::<N>::parse(self, byte)
    }

    #[inline]
    fn channel_message(&self) -> ChannelMessage {
        self.channel
    }

    #[inline]
    fn realtime_message(&self) -> RealTimeMessage {
        self.realtime
    }

    #[inline]
    fn sysex_message(&self) -> SysExMessage<'_> {
        self.sysex.message()
    }
}
