//! Parsing of USB-MIDI 1.0 event packets, as read from the bulk OUT endpoint of a USB-MIDI
//! streaming interface.
//!
//! Each packet is 4 bytes long:
//!
//! ```text
//! +----------------+-------------------+--------+--------+--------+
//! | cable (4 bits) | code index (4 b.) | MIDI_0 | MIDI_1 | MIDI_2 |
//! +----------------+-------------------+--------+--------+--------+
//! ```
//!
//! The code index number tells how many of the 3 MIDI bytes are meaningful and how they relate to
//! the packets around them.
//! Channel and real-time messages always fit in a single packet, so there is no running status.
//! System exclusive messages are spread over several packets and have to be reassembled.

use crate::{
    prelude::*,
    primitive::{SYSEX_END, SYSEX_START},
    SYSEX_BUFFER_SIZE,
};

/// The low nibble of the first byte of a USB-MIDI event packet, classifying its payload.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodeIndexNumber {
    /// `0x0`, reserved for future extensions.
    Reserved0,
    /// `0x1`, reserved for future cable events.
    Reserved1,
    /// `0x2`, a two-byte system common message.
    SystemCommon2,
    /// `0x3`, a three-byte system common message.
    SystemCommon3,
    /// `0x4`, three bytes of a system exclusive message that is not over yet.
    SysExStartOrContinue,
    /// `0x5`, a system exclusive message ends with the first byte, or a single-byte system
    /// common message.
    SysExEnd1,
    /// `0x6`, a system exclusive message ends with the second byte.
    SysExEnd2,
    /// `0x7`, a system exclusive message ends with the third byte.
    SysExEnd3,
    NoteOff,
    NoteOn,
    KeyPressure,
    ControlChange,
    ProgramChange,
    ChannelPressure,
    PitchBend,
    /// `0xF`, a single byte.
    SingleByte,
}
impl CodeIndexNumber {
    /// Decode the bottom 4 bits of `raw`.
    pub fn from_nibble(raw: u8) -> CodeIndexNumber {
        use CodeIndexNumber::*;
        match raw & 0xF {
            0x0 => Reserved0,
            0x1 => Reserved1,
            0x2 => SystemCommon2,
            0x3 => SystemCommon3,
            0x4 => SysExStartOrContinue,
            0x5 => SysExEnd1,
            0x6 => SysExEnd2,
            0x7 => SysExEnd3,
            0x8 => NoteOff,
            0x9 => NoteOn,
            0xA => KeyPressure,
            0xB => ControlChange,
            0xC => ProgramChange,
            0xD => ChannelPressure,
            0xE => PitchBend,
            _ => SingleByte,
        }
    }

    /// The numeric value of the code index number.
    pub fn as_nibble(self) -> u8 {
        use CodeIndexNumber::*;
        match self {
            Reserved0 => 0x0,
            Reserved1 => 0x1,
            SystemCommon2 => 0x2,
            SystemCommon3 => 0x3,
            SysExStartOrContinue => 0x4,
            SysExEnd1 => 0x5,
            SysExEnd2 => 0x6,
            SysExEnd3 => 0x7,
            NoteOff => 0x8,
            NoteOn => 0x9,
            KeyPressure => 0xA,
            ControlChange => 0xB,
            ProgramChange => 0xC,
            ChannelPressure => 0xD,
            PitchBend => 0xE,
            SingleByte => 0xF,
        }
    }

    /// How many of the 3 MIDI bytes in the packet are meaningful, or `None` for reserved codes.
    pub fn payload_len(self) -> Option<usize> {
        use CodeIndexNumber::*;
        Some(match self {
            Reserved0 | Reserved1 => return None,
            SysExEnd1 | SingleByte => 1,
            SystemCommon2 | SysExEnd2 | ProgramChange | ChannelPressure => 2,
            _ => 3,
        })
    }
}

/// A single 4-byte USB-MIDI event packet.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UsbMidiPacket(pub [u8; 4]);
impl UsbMidiPacket {
    /// The virtual cable the packet is addressed to, from the top nibble of the header.
    #[inline]
    pub fn cable(&self) -> u4 {
        u4::new(self.0[0] >> 4)
    }

    /// The code index number, from the bottom nibble of the header.
    #[inline]
    pub fn cin(&self) -> CodeIndexNumber {
        CodeIndexNumber::from_nibble(self.0[0])
    }

    /// The 3 MIDI bytes, some of which may be padding depending on the code index number.
    #[inline]
    pub fn payload(&self) -> [u8; 3] {
        [self.0[1], self.0[2], self.0[3]]
    }
}
impl From<[u8; 4]> for UsbMidiPacket {
    #[inline]
    fn from(raw: [u8; 4]) -> UsbMidiPacket {
        UsbMidiPacket(raw)
    }
}
impl<'a> TryFrom<&'a [u8]> for UsbMidiPacket {
    type Error = crate::Error;

    /// Fails unless the slice is exactly 4 bytes long.
    #[inline]
    fn try_from(raw: &'a [u8]) -> Result<UsbMidiPacket> {
        match raw {
            &[a, b, c, d] => Ok(UsbMidiPacket([a, b, c, d])),
            _ => Err(err_invalid!("usb-midi event packets must be 4 bytes long").into()),
        }
    }
}

/// A USB-MIDI event packet parser.
///
/// Packets are fed one at a time through [`parse`](#method.parse), which returns a
/// [`ParserEvent`](enum.ParserEvent.html) telling whether a message was completed.
/// The payload can then be read through the [`MidiParser`](trait.MidiParser.html) accessors, and
/// carries the cable number of the packet that completed it.
///
/// ```rust
/// use midirx::{MidiParser, ParserEvent, UsbMidiParser};
///
/// let mut parser = UsbMidiParser::new();
/// assert_eq!(parser.parse([0x59, 0x93, 0x2A, 0x7E]), ParserEvent::ChannelMessage);
///
/// let msg = parser.channel_message();
/// assert_eq!(msg.header, 0x93);
/// assert_eq!((msg.data1.as_int(), msg.data2.as_int()), (0x2A, 0x7E));
/// assert_eq!(msg.cable.as_int(), 5);
/// ```
///
/// Only one system exclusive message is collected at a time.
/// While one is in progress, continuation packets addressed to other cables are dropped.
#[derive(Clone, Debug)]
pub struct UsbMidiParser<const N: usize = SYSEX_BUFFER_SIZE> {
    /// The cable of the system exclusive message in progress, if any.
    sysex_cable: Option<u4>,
    channel: ChannelMessage,
    realtime: RealTimeMessage,
    sysex: SysExBuffer<N>,
}
impl UsbMidiParser {
    /// Create a fresh parser with the default buffer size.
    #[inline]
    pub fn new() -> UsbMidiParser {
        UsbMidiParser::default()
    }
}
impl<const N: usize> UsbMidiParser<N> {
    /// Create a fresh parser that collects system exclusive messages in the given buffer.
    #[inline]
    pub fn with_buffer(mut sysex: SysExBuffer<N>) -> UsbMidiParser<N> {
        sysex.clear();
        UsbMidiParser {
            sysex_cable: None,
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

    /// Feed one event packet to the parser.
    pub fn parse(&mut self, packet: impl Into<UsbMidiPacket>) -> ParserEvent {
        let packet = packet.into();
        let cable = packet.cable();
        let [b0, b1, b2] = packet.payload();
        use CodeIndexNumber::*;
        let cin = packet.cin();
        match cin {
            NoteOff | NoteOn | KeyPressure | ControlChange | ProgramChange | ChannelPressure
            | PitchBend => self.parse_channel(cin, cable, [b0, b1, b2]),
            SingleByte => match SystemRealtime::from_status(b0) {
                Some(message_type) => {
                    self.realtime = RealTimeMessage::new(message_type, cable);
                    ParserEvent::RealTimeMessage
                }
                None => ParserEvent::NoMessage,
            },
            SysExStartOrContinue => {
                if self.sysex_data(cable, b0) {
                    self.sysex.extend(&[b0, b1, b2]);
                }
                ParserEvent::NoMessage
            }
            SysExEnd1 => {
                if b0 != SYSEX_END {
                    // Single-byte System Common, not reported
                    return ParserEvent::NoMessage;
                }
                self.end_sysex(cable, &[b0])
            }
            SysExEnd2 | SysExEnd3 => {
                let payload = [b0, b1, b2];
                let data = &payload[..cin.payload_len().unwrap_or(3)];
                if data.last() != Some(&SYSEX_END) {
                    trace!("ignoring sysex end packet without an end marker");
                    return ParserEvent::NoMessage;
                }
                self.end_sysex(cable, data)
            }
            SystemCommon2 | SystemCommon3 => ParserEvent::NoMessage,
            Reserved0 | Reserved1 => {
                trace!("ignoring packet with reserved code index {=u8}", packet.0[0] & 0xF);
                ParserEvent::NoMessage
            }
        }
    }

    fn parse_channel(
        &mut self,
        cin: CodeIndexNumber,
        cable: u4,
        [status, data1, data2]: [u8; 3],
    ) -> ParserEvent {
        let ty = match ChannelMessageType::from_status(status) {
            Some(ty) if ty.status_nibble() == cin.as_nibble() => ty,
            _ => {
                trace!(
                    "channel packet status {=u8:#x} does not match code index {=u8}",
                    status,
                    cin.as_nibble()
                );
                return ParserEvent::NoMessage;
            }
        };
        let data2 = if ty.data_len() == 2 { data2 } else { 0 };
        match ChannelMessage::new(status, data1, data2, cable) {
            Ok(msg) => {
                self.channel = msg;
                ParserEvent::ChannelMessage
            }
            Err(_err) => {
                trace!("channel packet with out-of-range data bytes");
                ParserEvent::NoMessage
            }
        }
    }

    /// Decide whether a system exclusive packet starting with `first` should be stored, opening
    /// a new message if it starts with `F0`.
    fn sysex_data(&mut self, cable: u4, first: u8) -> bool {
        if first == SYSEX_START {
            if self.sysex_cable.is_some() {
                debug!("sysex restarted, dropping {=usize} bytes", self.sysex.len());
            }
            // The F0 is stored along with the rest of the packet by the caller
            self.sysex.reset(cable);
            self.sysex_cable = Some(cable);
            return true;
        }
        match self.sysex_cable {
            Some(current) if current == cable => true,
            Some(_) => {
                trace!("dropping sysex packet from cable {=u8}", cable.as_int());
                false
            }
            None => {
                trace!("dropping sysex packet without a sysex start");
                false
            }
        }
    }

    fn end_sysex(&mut self, cable: u4, data: &[u8]) -> ParserEvent {
        if !self.sysex_data(cable, data[0]) {
            return ParserEvent::NoMessage;
        }
        self.sysex.extend(data);
        self.sysex_cable = None;
        ParserEvent::SysExMessage
    }

    /// Feeds a slice of raw packet bytes to the parser, calling the `handle_ev` closure whenever a
    /// complete message is read.
    ///
    /// The slice is split into 4-byte packets.
    /// If its length is not a multiple of 4, all complete packets are still parsed, and then an
    /// `ErrorKind::Invalid` error is returned for the trailing bytes.
    ///
    /// If the `strict` feature is enabled, a packet with a reserved code index number stops
    /// parsing with an `ErrorKind::Malformed` error.
    pub fn feed(&mut self, bytes: &[u8], mut handle_ev: impl FnMut(LiveEvent)) -> Result<()> {
        let mut packets = bytes.chunks_exact(4);
        for raw in &mut packets {
            let packet = UsbMidiPacket::try_from(raw)?;
            if cfg!(feature = "strict") {
                ensure!(
                    packet.cin().payload_len().is_some(),
                    err_malformed!("reserved code index number")
                );
            }
            let event = self.parse(packet);
            if let Some(ev) = self.event(event) {
                handle_ev(ev);
            }
        }
        ensure!(
            packets.remainder().is_empty(),
            err_invalid!("usb-midi event packets must be 4 bytes long")
        );
        Ok(())
    }
}
impl<const N: usize> Default for UsbMidiParser<N> {
    #[inline]
    fn default() -> UsbMidiParser<N> {
        UsbMidiParser::with_buffer(SysExBuffer::new())
    }
}
impl<const N: usize> MidiParser for UsbMidiParser<N> {
    type Input = [u8; 4];

    #[inline]
    fn parse(&mut self, packet: [u8; 4]) -> ParserEvent {
        UsbMidiParser::<N>::parse(self, packet)
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
