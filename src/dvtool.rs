//! DVTool stream files.
//!
//! The DVTool format is the de-facto container for recorded D-STAR
//! transmissions: a `"DVTOOL"` magic, a little-endian packet count, then
//! length-prefixed DSVT packets — one 56-byte header packet carrying the
//! radio header, followed by 27-byte voice frame packets each holding 9
//! voice-codec bytes and 3 slow-data bytes.

use std::io::{Read, Write};
use std::path::Path;

use crate::deinterleave::FRAME_BYTES;
use crate::error::DvError;

const FILE_MAGIC: &[u8; 6] = b"DVTOOL";
const DSVT_MAGIC: &[u8; 4] = b"DSVT";

/// Serialized size of a DV header packet.
pub const HEADER_PACKET_LEN: usize = 56;

/// Serialized size of a DV frame packet.
pub const FRAME_PACKET_LEN: usize = 27;

/// Bytes of slow data carried alongside each voice frame.
pub const SLOW_DATA_BYTES: usize = 3;

/// Vocoder selection advertised in the radio header's third flag byte.
///
/// Flag 3 is zero for plain AMBE streams. An extension uses bit 0 to switch
/// to Codec 2, bit 1 to select the 2400 bit/s mode and bit 2 to enable FEC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceCodec {
    Ambe,
    Codec2 { mode_2400: bool, fec: bool },
}

/// The 41-byte D-STAR radio header payload (39 header bytes plus a 2-byte
/// CRC slot).
///
/// The CRC is carried through verbatim rather than verified: reflectors are
/// known to rewrite header callsigns without recomputing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadioHeader {
    pub flag_1: u8,
    pub flag_2: u8,
    pub flag_3: u8,
    pub repeater_1_callsign: [u8; 8],
    pub repeater_2_callsign: [u8; 8],
    pub ur_callsign: [u8; 8],
    pub my_callsign: [u8; 8],
    pub my_suffix: [u8; 4],
    pub crc: [u8; 2],
}

impl RadioHeader {
    const LEN: usize = 41;

    /// Which vocoder the stream was encoded with.
    pub fn voice_codec(&self) -> VoiceCodec {
        if self.flag_3 & 0x01 == 0 {
            VoiceCodec::Ambe
        } else {
            VoiceCodec::Codec2 {
                mode_2400: self.flag_3 & 0x02 != 0,
                fec: self.flag_3 & 0x04 != 0,
            }
        }
    }

    /// The originating callsign with padding trimmed.
    pub fn my_callsign_str(&self) -> &str {
        std::str::from_utf8(&self.my_callsign)
            .unwrap_or("")
            .trim_end()
    }

    /// The destination callsign with padding trimmed.
    pub fn ur_callsign_str(&self) -> &str {
        std::str::from_utf8(&self.ur_callsign)
            .unwrap_or("")
            .trim_end()
    }

    fn from_bytes(data: &[u8]) -> Result<Self, DvError> {
        if data.len() != Self::LEN {
            return Err(DvError::MalformedStream(format!(
                "radio header must be {} bytes, got {}",
                Self::LEN,
                data.len()
            )));
        }

        let field = |range: std::ops::Range<usize>| -> [u8; 8] {
            data[range].try_into().unwrap()
        };

        Ok(Self {
            flag_1: data[0],
            flag_2: data[1],
            flag_3: data[2],
            repeater_1_callsign: field(3..11),
            repeater_2_callsign: field(11..19),
            ur_callsign: field(19..27),
            my_callsign: field(27..35),
            my_suffix: data[35..39].try_into().unwrap(),
            crc: data[39..41].try_into().unwrap(),
        })
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&[self.flag_1, self.flag_2, self.flag_3]);
        out.extend_from_slice(&self.repeater_1_callsign);
        out.extend_from_slice(&self.repeater_2_callsign);
        out.extend_from_slice(&self.ur_callsign);
        out.extend_from_slice(&self.my_callsign);
        out.extend_from_slice(&self.my_suffix);
        out.extend_from_slice(&self.crc);
    }
}

/// The DSVT packet opening a stream: band routing bytes, the stream id and
/// the radio header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderPacket {
    pub band: [u8; 3],
    pub stream_id: u16,
    pub header: RadioHeader,
}

impl HeaderPacket {
    fn from_bytes(data: &[u8]) -> Result<Self, DvError> {
        check_dsvt(data, HEADER_PACKET_LEN, 0x10)?;
        Ok(Self {
            band: [data[9], data[10], data[11]],
            stream_id: u16::from_le_bytes([data[12], data[13]]),
            header: RadioHeader::from_bytes(&data[15..])?,
        })
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_PACKET_LEN);
        out.extend_from_slice(DSVT_MAGIC);
        out.extend_from_slice(&[0x10, 0x00, 0x00, 0x00, 0x20]);
        out.extend_from_slice(&self.band);
        out.extend_from_slice(&self.stream_id.to_le_bytes());
        out.push(0x80);
        self.header.write_to(&mut out);
        out
    }
}

/// One DSVT voice frame packet: 9 interleaved voice-codec bytes plus 3
/// bytes of slow data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramePacket {
    pub band: [u8; 3],
    pub stream_id: u16,
    pub packet_id: u8,
    pub voice: [u8; FRAME_BYTES],
    pub slow_data: [u8; SLOW_DATA_BYTES],
}

impl FramePacket {
    /// Bit 6 of the packet id marks the final frame of a transmission.
    pub fn is_last(&self) -> bool {
        self.packet_id & 0x40 != 0
    }

    fn from_bytes(data: &[u8]) -> Result<Self, DvError> {
        check_dsvt(data, FRAME_PACKET_LEN, 0x20)?;
        Ok(Self {
            band: [data[9], data[10], data[11]],
            stream_id: u16::from_le_bytes([data[12], data[13]]),
            packet_id: data[14],
            voice: data[15..24].try_into().unwrap(),
            slow_data: data[24..27].try_into().unwrap(),
        })
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(FRAME_PACKET_LEN);
        out.extend_from_slice(DSVT_MAGIC);
        out.extend_from_slice(&[0x20, 0x00, 0x00, 0x00, 0x20]);
        out.extend_from_slice(&self.band);
        out.extend_from_slice(&self.stream_id.to_le_bytes());
        out.push(self.packet_id);
        out.extend_from_slice(&self.voice);
        out.extend_from_slice(&self.slow_data);
        out
    }
}

fn read_record<R: Read>(reader: &mut R) -> Result<Vec<u8>, DvError> {
    let mut len_buf = [0u8; 2];
    reader.read_exact(&mut len_buf)?;
    let len = u16::from_le_bytes(len_buf) as usize;

    let mut packet = vec![0u8; len];
    reader.read_exact(&mut packet)?;
    Ok(packet)
}

fn check_dsvt(data: &[u8], expected_len: usize, type_byte: u8) -> Result<(), DvError> {
    if data.len() != expected_len {
        return Err(DvError::MalformedStream(format!(
            "DSVT packet must be {expected_len} bytes, got {}",
            data.len()
        )));
    }
    if &data[..4] != DSVT_MAGIC {
        return Err(DvError::MalformedStream(
            "DSVT packet has bad magic".to_string(),
        ));
    }
    if data[4] != type_byte || data[8] != 0x20 {
        return Err(DvError::MalformedStream(format!(
            "unexpected DSVT type bytes {:#04x}/{:#04x}",
            data[4], data[8]
        )));
    }
    Ok(())
}

/// One recorded transmission: a header packet and its voice frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DvStream {
    pub header: HeaderPacket,
    pub frames: Vec<FramePacket>,
}

impl DvStream {
    /// Read a stream from DVTool-format bytes.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self, DvError> {
        let mut magic = [0u8; 6];
        reader.read_exact(&mut magic)?;
        if &magic != FILE_MAGIC {
            return Err(DvError::BadMagic);
        }

        let mut count_buf = [0u8; 4];
        reader.read_exact(&mut count_buf)?;
        let count = u32::from_le_bytes(count_buf) as usize;
        if count == 0 {
            return Err(DvError::MalformedStream(
                "stream contains no packets".to_string(),
            ));
        }

        let packet = read_record(reader)?;
        if packet.len() != HEADER_PACKET_LEN {
            return Err(DvError::MalformedStream(format!(
                "first packet must be a {HEADER_PACKET_LEN}-byte header, got {} bytes",
                packet.len()
            )));
        }
        let header = HeaderPacket::from_bytes(&packet)?;

        let mut frames = Vec::with_capacity(count - 1);
        for i in 1..count {
            let packet = read_record(reader)?;
            if packet.len() != FRAME_PACKET_LEN {
                return Err(DvError::MalformedStream(format!(
                    "frame packet {i} must be {FRAME_PACKET_LEN} bytes, got {} bytes",
                    packet.len()
                )));
            }
            frames.push(FramePacket::from_bytes(&packet)?);
        }

        log::info!("read a stream of {count} packets");
        Ok(Self { header, frames })
    }

    /// Read a stream from a DVTool file on disk.
    pub fn read_file(path: &Path) -> Result<Self, DvError> {
        let mut file = std::fs::File::open(path)?;
        Self::read(&mut file)
    }

    /// Write the stream in DVTool format.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<(), DvError> {
        let count = 1 + self.frames.len() as u32;
        writer.write_all(FILE_MAGIC)?;
        writer.write_all(&count.to_le_bytes())?;

        let header_bytes = self.header.to_bytes();
        writer.write_all(&(header_bytes.len() as u16).to_le_bytes())?;
        writer.write_all(&header_bytes)?;

        for frame in &self.frames {
            let frame_bytes = frame.to_bytes();
            writer.write_all(&(frame_bytes.len() as u16).to_le_bytes())?;
            writer.write_all(&frame_bytes)?;
        }

        log::info!("wrote a stream of {count} packets");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn callsign(s: &str) -> [u8; 8] {
        let mut out = [b' '; 8];
        out[..s.len()].copy_from_slice(s.as_bytes());
        out
    }

    fn sample_stream() -> DvStream {
        let header = HeaderPacket {
            band: [0x00, 0x01, 0x02],
            stream_id: 0x1234,
            header: RadioHeader {
                flag_1: 0x00,
                flag_2: 0x00,
                flag_3: 0x00,
                repeater_1_callsign: callsign("XRF000 A"),
                repeater_2_callsign: callsign("XRF000 G"),
                ur_callsign: callsign("CQCQCQ"),
                my_callsign: callsign("SV9OAN"),
                my_suffix: *b"RPTR",
                crc: [0xDE, 0xAD],
            },
        };

        let frames = (0u8..3)
            .map(|i| FramePacket {
                band: [0x00, 0x01, 0x02],
                stream_id: 0x1234,
                packet_id: if i == 2 { i | 0x40 } else { i },
                voice: [i; FRAME_BYTES],
                slow_data: [0x55, 0x2D, 0x16],
            })
            .collect();

        DvStream { header, frames }
    }

    #[test]
    fn round_trips_through_dvtool_bytes() {
        let stream = sample_stream();
        let mut buf = Vec::new();
        stream.write(&mut buf).unwrap();

        let parsed = DvStream::read(&mut buf.as_slice()).unwrap();
        assert_eq!(parsed, stream);
    }

    #[test]
    fn parses_header_fields() {
        let stream = sample_stream();
        let mut buf = Vec::new();
        stream.write(&mut buf).unwrap();

        let parsed = DvStream::read(&mut buf.as_slice()).unwrap();
        assert_eq!(parsed.header.stream_id, 0x1234);
        assert_eq!(parsed.header.header.my_callsign_str(), "SV9OAN");
        assert_eq!(parsed.header.header.ur_callsign_str(), "CQCQCQ");
        assert_eq!(parsed.header.header.voice_codec(), VoiceCodec::Ambe);
    }

    #[test]
    fn detects_codec2_flag_variants() {
        let mut stream = sample_stream();
        stream.header.header.flag_3 = 0x01;
        assert_eq!(
            stream.header.header.voice_codec(),
            VoiceCodec::Codec2 { mode_2400: false, fec: false }
        );
        stream.header.header.flag_3 = 0x07;
        assert_eq!(
            stream.header.header.voice_codec(),
            VoiceCodec::Codec2 { mode_2400: true, fec: true }
        );
    }

    #[test]
    fn marks_last_frame() {
        let stream = sample_stream();
        assert!(!stream.frames[0].is_last());
        assert!(stream.frames[2].is_last());
    }

    #[test]
    fn rejects_bad_file_magic() {
        let mut buf = Vec::new();
        sample_stream().write(&mut buf).unwrap();
        buf[0] = b'X';
        assert!(matches!(
            DvStream::read(&mut buf.as_slice()),
            Err(DvError::BadMagic)
        ));
    }

    #[test]
    fn rejects_wrong_header_packet_size() {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"DVTOOL");
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.extend_from_slice(&27u16.to_le_bytes());
        buf.extend_from_slice(&[0u8; 27]);
        assert!(matches!(
            DvStream::read(&mut buf.as_slice()),
            Err(DvError::MalformedStream(_))
        ));
    }

    #[test]
    fn rejects_truncated_stream() {
        let mut buf = Vec::new();
        sample_stream().write(&mut buf).unwrap();
        buf.truncate(buf.len() - 5);
        assert!(matches!(
            DvStream::read(&mut buf.as_slice()),
            Err(DvError::Io(_))
        ));
    }
}
