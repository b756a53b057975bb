//! Frame encoding and decoding for the host link.
//!
//! Frame format:
//! - START (1 byte): 0x7E synchronization byte
//! - LENGTH (1 byte): payload length (0-60)
//! - CODE (1 byte): function code
//! - PAYLOAD (0-60 bytes): code-specific data
//! - CRC (1 byte): CRC-8 (poly 0x07) over LENGTH, CODE and PAYLOAD

use heapless::Vec;

/// Frame synchronization byte
pub const FRAME_START: u8 = 0x7E;

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_SIZE: usize = 60;

/// Maximum complete frame size (START + LENGTH + CODE + MAX_PAYLOAD + CRC)
pub const MAX_FRAME_SIZE: usize = 3 + MAX_PAYLOAD_SIZE + 1;

const CRC8_POLY: u8 = 0x07;

/// Errors that can occur during frame parsing or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds maximum allowed size
    PayloadTooLarge,
    /// CRC mismatch
    InvalidCrc,
    /// Length byte out of range
    InvalidLength,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// Fold one byte into a running CRC-8
fn crc8_update(mut crc: u8, byte: u8) -> u8 {
    crc ^= byte;
    for _ in 0..8 {
        crc = if crc & 0x80 != 0 {
            (crc << 1) ^ CRC8_POLY
        } else {
            crc << 1
        };
    }
    crc
}

/// CRC-8 over a byte slice, starting from zero
pub fn crc8(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |crc, &b| crc8_update(crc, b))
}

/// A host link frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Function code byte
    pub code: u8,
    /// Payload data
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Frame {
    /// Create a frame with the given code and payload
    pub fn new(code: u8, payload: &[u8]) -> Result<Self, FrameError> {
        let payload = Vec::from_slice(payload).map_err(|_| FrameError::PayloadTooLarge)?;
        Ok(Self { code, payload })
    }

    /// Create a frame with no payload
    pub fn empty(code: u8) -> Self {
        Self {
            code,
            payload: Vec::new(),
        }
    }

    fn crc(&self) -> u8 {
        let crc = crc8_update(0, self.payload.len() as u8);
        let crc = crc8_update(crc, self.code);
        self.payload.iter().fold(crc, |crc, &b| crc8_update(crc, b))
    }

    /// Encode this frame into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let len = self.payload.len();
        let frame_len = 4 + len;
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        buffer[0] = FRAME_START;
        buffer[1] = len as u8;
        buffer[2] = self.code;
        buffer[3..3 + len].copy_from_slice(&self.payload);
        buffer[3 + len] = self.crc();

        Ok(frame_len)
    }

    /// Encode this frame into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = self.encode(&mut buffer)?;
        Vec::from_slice(&buffer[..len]).map_err(|_| FrameError::BufferTooSmall)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Start,
    Length,
    Code,
    Payload,
    Crc,
}

/// Byte-at-a-time frame decoder
///
/// Bytes outside a frame are skipped until the next START byte, so the
/// decoder resynchronises after line noise or a dropped byte.
#[derive(Debug, Clone)]
pub struct FrameParser {
    expect: Expect,
    length: u8,
    code: u8,
    payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    /// Create a new frame parser
    pub fn new() -> Self {
        Self {
            expect: Expect::Start,
            length: 0,
            code: 0,
            payload: Vec::new(),
        }
    }

    /// Drop any partial frame
    pub fn reset(&mut self) {
        self.expect = Expect::Start;
        self.length = 0;
        self.code = 0;
        self.payload.clear();
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(frame))` when a complete valid frame is parsed,
    /// `Ok(None)` when more bytes are needed, or `Err` on a corrupt frame.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Frame>, FrameError> {
        match self.expect {
            Expect::Start => {
                if byte == FRAME_START {
                    self.expect = Expect::Length;
                }
                Ok(None)
            }
            Expect::Length => {
                if byte as usize > MAX_PAYLOAD_SIZE {
                    self.reset();
                    return Err(FrameError::InvalidLength);
                }
                self.length = byte;
                self.expect = Expect::Code;
                Ok(None)
            }
            Expect::Code => {
                self.code = byte;
                self.payload.clear();
                self.expect = if self.length == 0 {
                    Expect::Crc
                } else {
                    Expect::Payload
                };
                Ok(None)
            }
            Expect::Payload => {
                // Cannot overflow: length was bounded by MAX_PAYLOAD_SIZE
                let _ = self.payload.push(byte);
                if self.payload.len() == self.length as usize {
                    self.expect = Expect::Crc;
                }
                Ok(None)
            }
            Expect::Crc => {
                let frame = Frame {
                    code: self.code,
                    payload: core::mem::take(&mut self.payload),
                };
                let valid = frame.crc() == byte;
                self.reset();

                if valid {
                    Ok(Some(frame))
                } else {
                    Err(FrameError::InvalidCrc)
                }
            }
        }
    }
}
