//! The messages produced by the parsers, and the interface shared by both of them.

use crate::{prelude::*, primitive::is_channel_status};

/// What a single parse step produced.
///
/// Each variant names the parser accessor that currently holds a valid payload:
/// [`channel_message`](trait.MidiParser.html#tymethod.channel_message),
/// [`sysex_message`](trait.MidiParser.html#tymethod.sysex_message) or
/// [`realtime_message`](trait.MidiParser.html#tymethod.realtime_message).
/// The payload is only valid until the next parse step.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParserEvent {
    /// No message was completed by this input.
    NoMessage,
    /// A channel voice message was completed.
    ChannelMessage,
    /// A system exclusive message was completed, or closed early.
    SysExMessage,
    /// A system real-time message was received.
    RealTimeMessage,
}
impl Default for ParserEvent {
    #[inline]
    fn default() -> ParserEvent {
        ParserEvent::NoMessage
    }
}

/// The kind of a channel voice message, taken from the top nibble of its status byte.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelMessageType {
    NoteOff,
    NoteOn,
    /// Polyphonic key pressure.
    KeyPressure,
    ControlChange,
    ProgramChange,
    ChannelPressure,
    PitchBend,
}
impl ChannelMessageType {
    /// Classify a status byte, returning `None` if it is not a channel status byte.
    #[inline]
    pub fn from_status(status: u8) -> Option<ChannelMessageType> {
        use ChannelMessageType::*;
        Some(match status >> 4 {
            0x8 => NoteOff,
            0x9 => NoteOn,
            0xA => KeyPressure,
            0xB => ControlChange,
            0xC => ProgramChange,
            0xD => ChannelPressure,
            0xE => PitchBend,
            _ => return None,
        })
    }

    /// The top nibble of the status byte for this kind of message.
    #[inline]
    pub fn status_nibble(self) -> u8 {
        use ChannelMessageType::*;
        match self {
            NoteOff => 0x8,
            NoteOn => 0x9,
            KeyPressure => 0xA,
            ControlChange => 0xB,
            ProgramChange => 0xC,
            ChannelPressure => 0xD,
            PitchBend => 0xE,
        }
    }

    /// How many data bytes follow the status byte, either 1 or 2.
    #[inline]
    pub fn data_len(self) -> usize {
        match self {
            ChannelMessageType::ProgramChange | ChannelMessageType::ChannelPressure => 1,
            _ => 2,
        }
    }
}

/// A channel voice message, such as a note or a controller change.
///
/// The raw status byte is kept as-is in `header`, which always lies in `0x80..=0xEF`.
/// For message types that carry a single data byte (Program Change and Channel Pressure) `data2`
/// carries no information and is always zero when produced by a parser.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelMessage {
    /// The status byte: message type in the top nibble, channel in the bottom nibble.
    pub header: u8,
    pub data1: u7,
    pub data2: u7,
    /// The USB-MIDI virtual cable the message arrived on. Always 0 for serial MIDI.
    pub cable: u4,
}
impl Default for ChannelMessage {
    /// A Note Off for key 0 on channel 0.
    #[inline]
    fn default() -> ChannelMessage {
        ChannelMessage {
            header: 0x80,
            data1: u7::new(0),
            data2: u7::new(0),
            cable: u4::new(0),
        }
    }
}
impl ChannelMessage {
    /// Build a channel message from raw bytes, checking that `header` is a channel status byte
    /// and that both data bytes have their top bit clear.
    pub fn new(header: u8, data1: u8, data2: u8, cable: u4) -> Result<ChannelMessage> {
        ensure!(
            is_channel_status(header),
            err_invalid!("channel message header is not a channel status byte")
        );
        Ok(ChannelMessage {
            header,
            data1: u7::check_int(data1)?,
            data2: u7::check_int(data2)?,
            cable,
        })
    }

    /// The kind of message, from the top nibble of `header`.
    #[inline]
    pub fn message_type(&self) -> ChannelMessageType {
        match ChannelMessageType::from_status(self.header) {
            Some(ty) => ty,
            // `header` is a channel status whenever built by this crate, fall back on the most
            // common layout otherwise
            None => ChannelMessageType::NoteOff,
        }
    }

    /// The MIDI channel, from the bottom nibble of `header`.
    #[inline]
    pub fn channel(&self) -> u4 {
        u4::new(self.header)
    }

    /// How many of the data bytes are meaningful, either 1 or 2.
    #[inline]
    pub fn data_len(&self) -> usize {
        self.message_type().data_len()
    }
}

/// Messages that only occur in live MIDI connections, and can occur at ANY time, even in between
/// the bytes of other messages.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SystemRealtime {
    /// If sent, they should be sent 24 times per quarter note.
    TimingClock = 0xF8,
    UndefinedRealtime1 = 0xF9,
    Start = 0xFA,
    Continue = 0xFB,
    Stop = 0xFC,
    UndefinedRealtime2 = 0xFD,
    /// Once one of these messages is transmitted, a message should arrive every 300ms or else the
    /// connection is considered broken.
    ActiveSensing = 0xFE,
    SystemReset = 0xFF,
}
impl SystemRealtime {
    /// Classify a status byte, returning `None` if it is not in `0xF8..=0xFF`.
    pub fn from_status(status: u8) -> Option<SystemRealtime> {
        use SystemRealtime::*;
        Some(match status {
            0xF8 => TimingClock,
            0xF9 => UndefinedRealtime1,
            0xFA => Start,
            0xFB => Continue,
            0xFC => Stop,
            0xFD => UndefinedRealtime2,
            0xFE => ActiveSensing,
            0xFF => SystemReset,
            _ => return None,
        })
    }

    /// The single status byte that encodes this message.
    #[inline]
    pub fn status(self) -> u8 {
        self as u8
    }
}

/// A system real-time message, along with the cable it arrived on.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RealTimeMessage {
    pub message_type: SystemRealtime,
    /// The USB-MIDI virtual cable the message arrived on. Always 0 for serial MIDI.
    pub cable: u4,
}
impl RealTimeMessage {
    #[inline]
    pub fn new(message_type: SystemRealtime, cable: u4) -> RealTimeMessage {
        RealTimeMessage {
            message_type,
            cable,
        }
    }
}
impl Default for RealTimeMessage {
    #[inline]
    fn default() -> RealTimeMessage {
        RealTimeMessage::new(SystemRealtime::TimingClock, u4::new(0))
    }
}

/// A read-only view into the system exclusive buffer of a parser.
///
/// `data` starts with `F0` and, unless the message was cut short by a full buffer, ends with `F7`.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SysExMessage<'a> {
    data: &'a [u8],
    cable: u4,
    truncated: bool,
}
impl<'a> SysExMessage<'a> {
    #[inline]
    pub(crate) fn new(data: &'a [u8], cable: u4, truncated: bool) -> SysExMessage<'a> {
        SysExMessage {
            data,
            cable,
            truncated,
        }
    }

    /// The raw message bytes, including the leading `F0` and the closing `F7` (if it fit).
    #[inline]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// The amount of bytes stored, which never exceeds the buffer capacity.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The USB-MIDI virtual cable the message arrived on. Always 0 for serial MIDI.
    #[inline]
    pub fn cable(&self) -> u4 {
        self.cable
    }

    /// Whether bytes had to be dropped because the buffer was full.
    #[inline]
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Copy the message bytes into an owned vector, so that they outlive the next parse step.
    #[cfg(feature = "alloc")]
    #[inline]
    pub fn to_vec(&self) -> alloc::vec::Vec<u8> {
        self.data.to_vec()
    }
}

/// A complete message along with its payload.
///
/// This is what [`MidiParser::event`](trait.MidiParser.html#method.event) and the `feed` helpers
/// hand out.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LiveEvent<'a> {
    Channel(ChannelMessage),
    SysEx(SysExMessage<'a>),
    Realtime(RealTimeMessage),
}

/// The output side shared by [`SerialMidiParser`](struct.SerialMidiParser.html) and
/// [`UsbMidiParser`](struct.UsbMidiParser.html), so that message handling code can be written once
/// for both transports.
pub trait MidiParser {
    /// One unit of input: a byte for serial MIDI, a packet for USB-MIDI.
    type Input;

    /// Advance the state machine by one unit of input.
    fn parse(&mut self, input: Self::Input) -> ParserEvent;

    /// The last completed channel message.
    fn channel_message(&self) -> ChannelMessage;

    /// The last received real-time message.
    fn realtime_message(&self) -> RealTimeMessage;

    /// The current contents of the system exclusive buffer.
    fn sysex_message(&self) -> SysExMessage<'_>;

    /// Fetch the payload that goes with the event returned by the last call to `parse`.
    fn event(&self, event: ParserEvent) -> Option<LiveEvent<'_>> {
        match event {
            ParserEvent::NoMessage => None,
            ParserEvent::ChannelMessage => Some(LiveEvent::Channel(self.channel_message())),
            ParserEvent::SysExMessage => Some(LiveEvent::SysEx(self.sysex_message())),
            ParserEvent::RealTimeMessage => Some(LiveEvent::Realtime(self.realtime_message())),
        }
    }
}
