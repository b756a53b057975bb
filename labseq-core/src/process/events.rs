//! Process notifications
//!
//! The manager performs no I/O itself. Whoever drives the hardware
//! registers a single [`ProcessListener`] and turns started commands into
//! device actions. Calls are synchronous and happen inside
//! `update`/`trigger_interrupt`, on the caller's thread.

use crate::command::CommandData;

/// Notification emitted by the process manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProcessEvent {
    /// `command` became current on stream `vector` (0 = main program)
    ///
    /// Also emitted when an interrupted command resumes.
    CommandStarted { command: CommandData, vector: u8 },
    /// The command owned by stream `vector` stopped being current
    CommandEnded { vector: u8 },
    /// The main program ran out of commands and the process stopped
    ProcessEnded,
}

/// Receiver of process notifications
///
/// All methods default to doing nothing.
pub trait ProcessListener {
    fn on_command_started(&mut self, command: &CommandData, vector: u8) {
        let _ = (command, vector);
    }

    fn on_command_ended(&mut self, vector: u8) {
        let _ = vector;
    }

    fn on_process_ended(&mut self) {}
}

/// No listener
impl ProcessListener for () {}

/// Listener that turns every notification into a [`ProcessEvent`]
///
/// Useful for pushing events into a channel drained by another task.
pub struct EventForwarder<F: FnMut(ProcessEvent)>(pub F);

impl<F: FnMut(ProcessEvent)> ProcessListener for EventForwarder<F> {
    fn on_command_started(&mut self, command: &CommandData, vector: u8) {
        (self.0)(ProcessEvent::CommandStarted {
            command: *command,
            vector,
        })
    }

    fn on_command_ended(&mut self, vector: u8) {
        (self.0)(ProcessEvent::CommandEnded { vector })
    }

    fn on_process_ended(&mut self) {
        (self.0)(ProcessEvent::ProcessEnded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        started: u8,
        ended: u8,
        finished: u8,
    }

    impl ProcessListener for Counter {
        fn on_command_started(&mut self, _command: &CommandData, _vector: u8) {
            self.started += 1;
        }

        fn on_command_ended(&mut self, _vector: u8) {
            self.ended += 1;
        }

        fn on_process_ended(&mut self) {
            self.finished += 1;
        }
    }

    #[test]
    fn test_overridden_methods_are_called() {
        let mut counter = Counter::default();
        counter.on_command_started(&CommandData::new(1, 0), 0);
        counter.on_command_ended(0);
        counter.on_process_ended();

        assert_eq!(counter.started, 1);
        assert_eq!(counter.ended, 1);
        assert_eq!(counter.finished, 1);
    }

    #[test]
    fn test_forwarder_builds_events() {
        let mut seen: heapless::Vec<ProcessEvent, 4> = heapless::Vec::new();
        {
            let mut forwarder = EventForwarder(|e| {
                let _ = seen.push(e);
            });
            forwarder.on_command_started(&CommandData::new(3, 1), 2);
            forwarder.on_process_ended();
        }

        assert_eq!(seen.len(), 2);
        assert_eq!(
            seen[0],
            ProcessEvent::CommandStarted {
                command: CommandData::new(3, 1),
                vector: 2
            }
        );
        assert_eq!(seen[1], ProcessEvent::ProcessEnded);
    }

    #[test]
    fn test_unit_listener_ignores_everything() {
        ProcessListener::on_command_started(&mut (), &CommandData::new(2, 0), 1);
        ProcessListener::on_command_ended(&mut (), 1);
        ProcessListener::on_process_ended(&mut ());
    }
}
