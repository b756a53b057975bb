//! Host messages
//!
//! - Host → Controller: [`Request`], decoded from a frame
//! - Controller → Host: [`Response`], encoded into a frame
//!
//! Multi-byte fields are little-endian.

use heapless::Vec;

use crate::codes::{is_user_code, FunctionCode};
use crate::frame::{Frame, FrameError, MAX_PAYLOAD_SIZE};

/// Encoded size of a [`CommandPayload`]
pub const COMMAND_PAYLOAD_SIZE: usize = 14;

/// Errors decoding a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageError {
    /// Payload shorter than the function code requires
    Truncated,
    /// Code is reserved or not accepted from the host
    UnknownCode(u8),
}

/// Why a request failed, as reported to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ErrorReason {
    /// Queue or vector is full
    CapacityExceeded = 1,
    /// Queue or item index out of range
    InvalidIndex = 2,
    /// Interrupt vector has no queued commands
    EmptyTrigger = 3,
    /// Interrupt vector is already running or suspended
    VectorActive = 4,
    /// Request payload could not be decoded
    Malformed = 5,
    /// Function not supported by this controller
    Unsupported = 6,
    /// Command code is reserved for the empty command
    ReservedCode = 7,
}

/// A scheduled command as carried on the wire
///
/// Layout: `code: i8 | target: i8 | data0: u32 | data1: u32 | duration_us: u32`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandPayload {
    pub code: i8,
    pub target: i8,
    pub data0: u32,
    pub data1: u32,
    pub duration_us: u32,
}

impl CommandPayload {
    /// Decode from the start of `bytes`
    pub fn decode(bytes: &[u8]) -> Result<Self, MessageError> {
        if bytes.len() < COMMAND_PAYLOAD_SIZE {
            return Err(MessageError::Truncated);
        }
        Ok(Self {
            code: bytes[0] as i8,
            target: bytes[1] as i8,
            data0: read_u32(&bytes[2..6]),
            data1: read_u32(&bytes[6..10]),
            duration_us: read_u32(&bytes[10..14]),
        })
    }

    /// Encode into a fixed-size array
    pub fn encode(&self) -> [u8; COMMAND_PAYLOAD_SIZE] {
        let mut out = [0u8; COMMAND_PAYLOAD_SIZE];
        out[0] = self.code as u8;
        out[1] = self.target as u8;
        out[2..6].copy_from_slice(&self.data0.to_le_bytes());
        out[6..10].copy_from_slice(&self.data1.to_le_bytes());
        out[10..14].copy_from_slice(&self.duration_us.to_le_bytes());
        out
    }
}

fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn first_byte(payload: &[u8]) -> Result<u8, MessageError> {
    payload.first().copied().ok_or(MessageError::Truncated)
}

/// Requests from the host
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Request {
    /// Append a command to queue `queue` (0 = main program)
    Enqueue { queue: u8, command: CommandPayload },
    /// Read the command at `index` in `queue`
    ReadFromQueue { queue: u8, index: u8 },
    /// Free slots in `queue`
    QueueAvailable { queue: u8 },
    /// Capacity of `queue`
    QueueCapacity { queue: u8 },
    /// Commands currently held in `queue`
    QueueCount { queue: u8 },
    /// Start or resume the protocol
    Start,
    /// Pause the protocol
    Stop,
    /// Discard all queued state
    Reset,
    /// Preempt the protocol with interrupt vector `vector`
    TriggerInterrupt { vector: u8 },
    /// Read the process status
    Status,
    /// Any other code, passed through for device or application handling
    Other {
        code: u8,
        payload: Vec<u8, MAX_PAYLOAD_SIZE>,
    },
}

impl Request {
    /// Parse a request from a frame
    pub fn from_frame(frame: &Frame) -> Result<Self, MessageError> {
        let payload = frame.payload.as_slice();

        let Some(code) = FunctionCode::from_byte(frame.code) else {
            if is_user_code(frame.code) {
                return Ok(Request::Other {
                    code: frame.code,
                    payload: frame.payload.clone(),
                });
            }
            return Err(MessageError::UnknownCode(frame.code));
        };

        let request = match code {
            FunctionCode::Enqueue => Request::Enqueue {
                queue: first_byte(payload)?,
                command: CommandPayload::decode(&payload[1..])?,
            },
            FunctionCode::ReadFromQueue => {
                if payload.len() < 2 {
                    return Err(MessageError::Truncated);
                }
                Request::ReadFromQueue {
                    queue: payload[0],
                    index: payload[1],
                }
            }
            FunctionCode::QueueAvailable => Request::QueueAvailable {
                queue: first_byte(payload)?,
            },
            FunctionCode::QueueCapacity => Request::QueueCapacity {
                queue: first_byte(payload)?,
            },
            FunctionCode::ReadQueueCount => Request::QueueCount {
                queue: first_byte(payload)?,
            },
            FunctionCode::StartProtocol => Request::Start,
            FunctionCode::StopProtocol => Request::Stop,
            FunctionCode::ResetProtocol => Request::Reset,
            FunctionCode::TriggerInterrupt => Request::TriggerInterrupt {
                vector: first_byte(payload)?,
            },
            FunctionCode::ReadStatus => Request::Status,
            // Replies are never accepted from the host
            FunctionCode::Acknowledge | FunctionCode::Error => {
                return Err(MessageError::UnknownCode(frame.code))
            }
            _ => Request::Other {
                code: frame.code,
                payload: frame.payload.clone(),
            },
        };
        Ok(request)
    }

    /// Function code byte of this request
    pub fn code(&self) -> u8 {
        match self {
            Request::Enqueue { .. } => FunctionCode::Enqueue.to_byte(),
            Request::ReadFromQueue { .. } => FunctionCode::ReadFromQueue.to_byte(),
            Request::QueueAvailable { .. } => FunctionCode::QueueAvailable.to_byte(),
            Request::QueueCapacity { .. } => FunctionCode::QueueCapacity.to_byte(),
            Request::QueueCount { .. } => FunctionCode::ReadQueueCount.to_byte(),
            Request::Start => FunctionCode::StartProtocol.to_byte(),
            Request::Stop => FunctionCode::StopProtocol.to_byte(),
            Request::Reset => FunctionCode::ResetProtocol.to_byte(),
            Request::TriggerInterrupt { .. } => FunctionCode::TriggerInterrupt.to_byte(),
            Request::Status => FunctionCode::ReadStatus.to_byte(),
            Request::Other { code, .. } => *code,
        }
    }

    /// Encode this request into a frame (for host tooling or simulation)
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        let code = self.code();
        match self {
            Request::Enqueue { queue, command } => {
                let mut payload = Vec::<u8, MAX_PAYLOAD_SIZE>::new();
                payload.push(*queue).map_err(|_| FrameError::PayloadTooLarge)?;
                payload
                    .extend_from_slice(&command.encode())
                    .map_err(|_| FrameError::PayloadTooLarge)?;
                Frame::new(code, &payload)
            }
            Request::ReadFromQueue { queue, index } => Frame::new(code, &[*queue, *index]),
            Request::QueueAvailable { queue }
            | Request::QueueCapacity { queue }
            | Request::QueueCount { queue } => Frame::new(code, &[*queue]),
            Request::TriggerInterrupt { vector } => Frame::new(code, &[*vector]),
            Request::Start | Request::Stop | Request::Reset | Request::Status => {
                Ok(Frame::empty(code))
            }
            Request::Other { payload, .. } => Frame::new(code, payload),
        }
    }
}

/// Snapshot of the process for status replies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusReport {
    pub running: bool,
    /// Active stream (0 = main program)
    pub vector: u8,
    /// Code of the current command (-1 = none)
    pub code: i8,
    pub remaining_us: u32,
}

/// Replies to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Response {
    /// Request with function code `code` was executed
    Ack { code: u8 },
    /// Request with function code `code` failed
    Error { code: u8, reason: ErrorReason },
    /// A queued command
    Command {
        queue: u8,
        index: u8,
        command: CommandPayload,
    },
    /// A queue count reply (available, capacity or held)
    Count { code: u8, queue: u8, value: u16 },
    /// Process status
    Status(StatusReport),
    /// Request is not handled by the process engine
    Unhandled { code: u8 },
}

impl Response {
    /// Reply to a frame that failed length or CRC checks
    ///
    /// The code byte of such a frame cannot be trusted, so the reply names
    /// the `Error` code itself.
    pub fn corrupt_frame() -> Self {
        Response::Error {
            code: FunctionCode::Error.to_byte(),
            reason: ErrorReason::Malformed,
        }
    }

    /// Encode this response into a frame
    ///
    /// `Unhandled` is reported to the host as an `Unsupported` error.
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        match self {
            Response::Ack { code } => Frame::new(FunctionCode::Acknowledge.to_byte(), &[*code]),
            Response::Error { code, reason } => {
                Frame::new(FunctionCode::Error.to_byte(), &[*code, *reason as u8])
            }
            Response::Unhandled { code } => Frame::new(
                FunctionCode::Error.to_byte(),
                &[*code, ErrorReason::Unsupported as u8],
            ),
            Response::Command {
                queue,
                index,
                command,
            } => {
                let mut payload = [0u8; 2 + COMMAND_PAYLOAD_SIZE];
                payload[0] = *queue;
                payload[1] = *index;
                payload[2..].copy_from_slice(&command.encode());
                Frame::new(FunctionCode::ReadFromQueue.to_byte(), &payload)
            }
            Response::Count { code, queue, value } => {
                let [lo, hi] = value.to_le_bytes();
                Frame::new(*code, &[*queue, lo, hi])
            }
            Response::Status(status) => {
                let mut payload = [0u8; 7];
                payload[0] = status.running as u8;
                payload[1] = status.vector;
                payload[2] = status.code as u8;
                payload[3..7].copy_from_slice(&status.remaining_us.to_le_bytes());
                Frame::new(FunctionCode::ReadStatus.to_byte(), &payload)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heat_command() -> CommandPayload {
        CommandPayload {
            code: 0x0C,
            target: 2,
            data0: 180,
            data1: 0,
            duration_us: 10_000_000,
        }
    }

    #[test]
    fn test_command_payload_layout() {
        let bytes = heat_command().encode();
        assert_eq!(bytes[0], 0x0C);
        assert_eq!(bytes[1], 2);
        assert_eq!(&bytes[2..6], &180u32.to_le_bytes());
        assert_eq!(&bytes[10..14], &10_000_000u32.to_le_bytes());
        assert_eq!(CommandPayload::decode(&bytes), Ok(heat_command()));
    }

    #[test]
    fn test_negative_fields_survive() {
        let cmd = CommandPayload {
            code: -1,
            target: -1,
            data0: 0,
            data1: 0,
            duration_us: 0,
        };
        assert_eq!(CommandPayload::decode(&cmd.encode()), Ok(cmd));
    }

    #[test]
    fn test_parse_enqueue() {
        let request = Request::Enqueue {
            queue: 1,
            command: heat_command(),
        };
        let frame = request.to_frame().unwrap();
        assert_eq!(frame.code, 0x1C);
        assert_eq!(frame.payload.len(), 1 + COMMAND_PAYLOAD_SIZE);
        assert_eq!(Request::from_frame(&frame), Ok(request));
    }

    #[test]
    fn test_truncated_enqueue() {
        let frame = Frame::new(0x1C, &[0, 1, 2]).unwrap();
        assert_eq!(Request::from_frame(&frame), Err(MessageError::Truncated));

        let frame = Frame::empty(0x1C);
        assert_eq!(Request::from_frame(&frame), Err(MessageError::Truncated));
    }

    #[test]
    fn test_parse_control_requests() {
        assert_eq!(Request::from_frame(&Frame::empty(0x21)), Ok(Request::Start));
        assert_eq!(Request::from_frame(&Frame::empty(0x22)), Ok(Request::Stop));
        assert_eq!(Request::from_frame(&Frame::empty(0x23)), Ok(Request::Reset));
        assert_eq!(Request::from_frame(&Frame::empty(0x06)), Ok(Request::Status));

        let frame = Frame::new(0x24, &[2]).unwrap();
        assert_eq!(
            Request::from_frame(&frame),
            Ok(Request::TriggerInterrupt { vector: 2 })
        );
    }

    #[test]
    fn test_parse_read_from_queue() {
        let frame = Frame::new(0x1D, &[0, 4]).unwrap();
        assert_eq!(
            Request::from_frame(&frame),
            Ok(Request::ReadFromQueue { queue: 0, index: 4 })
        );

        let frame = Frame::new(0x1D, &[0]).unwrap();
        assert_eq!(Request::from_frame(&frame), Err(MessageError::Truncated));
    }

    #[test]
    fn test_device_and_user_codes_pass_through() {
        let frame = Frame::new(0x09, &[3, 1]).unwrap();
        match Request::from_frame(&frame).unwrap() {
            Request::Other { code, payload } => {
                assert_eq!(code, 0x09);
                assert_eq!(payload.as_slice(), &[3, 1]);
            }
            other => panic!("unexpected request {:?}", other),
        }

        let frame = Frame::empty(0x40);
        assert!(matches!(
            Request::from_frame(&frame),
            Ok(Request::Other { code: 0x40, .. })
        ));
    }

    #[test]
    fn test_reserved_and_reply_codes_rejected() {
        assert_eq!(
            Request::from_frame(&Frame::empty(0x12)),
            Err(MessageError::UnknownCode(0x12))
        );
        assert_eq!(
            Request::from_frame(&Frame::empty(0x07)),
            Err(MessageError::UnknownCode(0x07))
        );
    }

    #[test]
    fn test_error_response_frame() {
        let frame = Response::Error {
            code: 0x1C,
            reason: ErrorReason::CapacityExceeded,
        }
        .to_frame()
        .unwrap();
        assert_eq!(frame.code, 0x08);
        assert_eq!(frame.payload.as_slice(), &[0x1C, 1]);

        let frame = Response::Unhandled { code: 0x2B }.to_frame().unwrap();
        assert_eq!(frame.payload.as_slice(), &[0x2B, ErrorReason::Unsupported as u8]);
    }

    #[test]
    fn test_corrupt_frame_reply() {
        let frame = Response::corrupt_frame().to_frame().unwrap();
        assert_eq!(frame.code, FunctionCode::Error.to_byte());
        assert_eq!(
            frame.payload.as_slice(),
            &[FunctionCode::Error.to_byte(), ErrorReason::Malformed as u8]
        );
    }

    #[test]
    fn test_count_response_frame() {
        let frame = Response::Count {
            code: 0x1F,
            queue: 0,
            value: 300,
        }
        .to_frame()
        .unwrap();
        assert_eq!(frame.code, 0x1F);
        assert_eq!(frame.payload.as_slice(), &[0, 0x2C, 0x01]);
    }

    #[test]
    fn test_status_response_frame() {
        let frame = Response::Status(StatusReport {
            running: true,
            vector: 1,
            code: 0x0C,
            remaining_us: 700,
        })
        .to_frame()
        .unwrap();
        assert_eq!(frame.code, 0x06);
        assert_eq!(frame.payload[0], 1);
        assert_eq!(frame.payload[1], 1);
        assert_eq!(frame.payload[2], 0x0C);
        assert_eq!(&frame.payload[3..7], &700u32.to_le_bytes());
    }
}
