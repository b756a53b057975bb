//! Host request handling
//!
//! Applies a decoded [`Request`] to a [`ProcessManager`] and builds the
//! reply. Requests the process engine does not own (device functions,
//! application codes) come back as [`Response::Unhandled`] so the caller
//! can route them elsewhere.

use labseq_protocol::{ErrorReason, Request, Response, StatusReport};

use crate::command::CommandData;
use crate::process::{ProcessError, ProcessListener, ProcessManager};
use crate::traits::Clock;

/// Execute `request` against `pm`
pub fn handle_request<C, H, const B: usize, const V: usize, const L: usize>(
    pm: &mut ProcessManager<C, H, B, V, L>,
    request: &Request,
) -> Response
where
    C: Clock,
    H: ProcessListener,
{
    let code = request.code();
    let result = match request {
        Request::Enqueue { queue, command } => pm
            .queue_command(*queue, CommandData::from(*command))
            .map(|()| Response::Ack { code }),
        Request::ReadFromQueue { queue, index } => {
            pm.peek(*queue, usize::from(*index))
                .map(|command| Response::Command {
                    queue: *queue,
                    index: *index,
                    command: command.into(),
                })
        }
        Request::QueueAvailable { queue } => pm.available(*queue).map(|n| count(code, *queue, n)),
        Request::QueueCapacity { queue } => pm.capacity(*queue).map(|n| count(code, *queue, n)),
        Request::QueueCount { queue } => pm.queued(*queue).map(|n| count(code, *queue, n)),
        Request::Start => {
            pm.set_running(true);
            Ok(Response::Ack { code })
        }
        Request::Stop => {
            pm.set_running(false);
            Ok(Response::Ack { code })
        }
        Request::Reset => {
            pm.reset();
            Ok(Response::Ack { code })
        }
        Request::TriggerInterrupt { vector } => pm
            .trigger_interrupt(*vector)
            .map(|()| Response::Ack { code }),
        Request::Status => Ok(Response::Status(status(pm))),
        Request::Other { .. } => Ok(Response::Unhandled { code }),
    };

    result.unwrap_or_else(|e: ProcessError| Response::Error {
        code,
        reason: ErrorReason::from(e),
    })
}

/// Snapshot of the process for a status reply
pub fn status<C, H, const B: usize, const V: usize, const L: usize>(
    pm: &ProcessManager<C, H, B, V, L>,
) -> StatusReport
where
    C: Clock,
    H: ProcessListener,
{
    StatusReport {
        running: pm.is_running(),
        vector: pm.current_vector(),
        code: pm.current_command().code,
        remaining_us: pm.remaining_time_us(),
    }
}

fn count(code: u8, queue: u8, n: usize) -> Response {
    Response::Count {
        code,
        queue,
        value: u16::try_from(n).unwrap_or(u16::MAX),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labseq_protocol::{CommandPayload, FunctionCode};

    use crate::traits::ManualClock;

    type Manager<'a> = ProcessManager<&'a ManualClock, (), 8, 2, 4>;

    fn payload(code: i8, duration_us: u32) -> CommandPayload {
        CommandData::new(code, 1)
            .with_data(10, 20)
            .with_duration_us(duration_us)
            .into()
    }

    #[test]
    fn test_enqueue_and_read_back() {
        let clock = ManualClock::new(0);
        let mut pm: Manager = ProcessManager::new(&clock, ());

        let reply = handle_request(
            &mut pm,
            &Request::Enqueue {
                queue: 0,
                command: payload(3, 100),
            },
        );
        assert_eq!(
            reply,
            Response::Ack {
                code: FunctionCode::Enqueue.to_byte()
            }
        );

        let reply = handle_request(&mut pm, &Request::ReadFromQueue { queue: 0, index: 0 });
        assert_eq!(
            reply,
            Response::Command {
                queue: 0,
                index: 0,
                command: payload(3, 100)
            }
        );
    }

    #[test]
    fn test_failures_carry_reason() {
        let clock = ManualClock::new(0);
        let mut pm: Manager = ProcessManager::new(&clock, ());

        let reply = handle_request(
            &mut pm,
            &Request::Enqueue {
                queue: 9,
                command: payload(1, 0),
            },
        );
        assert_eq!(
            reply,
            Response::Error {
                code: FunctionCode::Enqueue.to_byte(),
                reason: ErrorReason::InvalidIndex
            }
        );

        let reply = handle_request(
            &mut pm,
            &Request::Enqueue {
                queue: 0,
                command: CommandData::EMPTY.with_duration_us(100).into(),
            },
        );
        assert_eq!(
            reply,
            Response::Error {
                code: FunctionCode::Enqueue.to_byte(),
                reason: ErrorReason::ReservedCode
            }
        );
        assert_eq!(pm.queued(0), Ok(0));

        let reply = handle_request(&mut pm, &Request::TriggerInterrupt { vector: 1 });
        assert_eq!(
            reply,
            Response::Error {
                code: FunctionCode::TriggerInterrupt.to_byte(),
                reason: ErrorReason::EmptyTrigger
            }
        );
    }

    #[test]
    fn test_queue_counts() {
        let clock = ManualClock::new(0);
        let mut pm: Manager = ProcessManager::new(&clock, ());
        pm.queue_command(1, CommandData::new(1, 0)).unwrap();

        let code = FunctionCode::QueueAvailable.to_byte();
        assert_eq!(
            handle_request(&mut pm, &Request::QueueAvailable { queue: 1 }),
            Response::Count {
                code,
                queue: 1,
                value: 3
            }
        );

        let code = FunctionCode::QueueCapacity.to_byte();
        assert_eq!(
            handle_request(&mut pm, &Request::QueueCapacity { queue: 0 }),
            Response::Count {
                code,
                queue: 0,
                value: 8
            }
        );

        let code = FunctionCode::ReadQueueCount.to_byte();
        assert_eq!(
            handle_request(&mut pm, &Request::QueueCount { queue: 1 }),
            Response::Count {
                code,
                queue: 1,
                value: 1
            }
        );
    }

    #[test]
    fn test_start_status_stop() {
        let clock = ManualClock::new(0);
        let mut pm: Manager = ProcessManager::new(&clock, ());
        pm.queue_command(0, payload(5, 1000).into()).unwrap();

        handle_request(&mut pm, &Request::Start);
        pm.update();
        clock.set(250);

        assert_eq!(
            handle_request(&mut pm, &Request::Status),
            Response::Status(StatusReport {
                running: true,
                vector: 0,
                code: 5,
                remaining_us: 750
            })
        );

        handle_request(&mut pm, &Request::Stop);
        assert!(!pm.is_running());

        handle_request(&mut pm, &Request::Reset);
        assert_eq!(pm.queued(0), Ok(0));
        assert_eq!(pm.current_command(), CommandData::EMPTY);
    }

    #[test]
    fn test_user_codes_unhandled() {
        let clock = ManualClock::new(0);
        let mut pm: Manager = ProcessManager::new(&clock, ());

        let request = Request::Other {
            code: 0x30,
            payload: heapless::Vec::new(),
        };
        assert_eq!(
            handle_request(&mut pm, &request),
            Response::Unhandled { code: 0x30 }
        );
    }
}
