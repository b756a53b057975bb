//! Time-driven command sequencer
//!
//! The manager owns one main program (a FIFO of commands) and
//! `VECTOR_COUNT` interrupt vectors. Exactly one command is current at any
//! instant; it stays current until its duration has elapsed, then the next
//! command from the owning stream replaces it.
//!
//! Nothing blocks. The caller drives the manager by calling
//! [`ProcessManager::update`] from its control loop, and all timing is a
//! comparison against the injected [`Clock`].
//!
//! Triggering a vector suspends whatever is current (main program or an
//! outer interrupt) together with the time it has already run. When the
//! vector is exhausted the suspended command resumes with its remaining
//! time, in the stream that owned it.

use heapless::Vec;

use super::error::ProcessError;
use super::events::ProcessListener;
use crate::buffer::{ProcessVector, RingBuffer};
use crate::command::CommandData;
use crate::config::ProgramConfig;
use crate::traits::Clock;

/// Queue index of the main program
pub const MAIN_QUEUE: u8 = 0;

/// Observable execution state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProcessState {
    Stopped,
    RunningMain,
    /// Interrupt vector `v` (1-based) owns the current command
    RunningInterrupt(u8),
}

impl ProcessState {
    pub fn is_running(&self) -> bool {
        !matches!(self, ProcessState::Stopped)
    }
}

/// A command set aside by an interrupt
#[derive(Debug, Clone, Copy)]
struct Suspended {
    command: CommandData,
    elapsed_us: u32,
    vector: u8,
}

/// Main program plus interrupt vectors, advanced against a clock
///
/// - `BUFFER_LEN`: main program capacity, must be a power of two
/// - `VECTOR_COUNT`: number of interrupt vectors, addressed as queues `1..=VECTOR_COUNT`
/// - `VECTOR_LEN`: commands per interrupt vector
pub struct ProcessManager<
    C,
    H,
    const BUFFER_LEN: usize,
    const VECTOR_COUNT: usize,
    const VECTOR_LEN: usize,
> {
    clock: C,
    listener: H,
    buffer: RingBuffer<CommandData, BUFFER_LEN>,
    vectors: [ProcessVector<VECTOR_LEN>; VECTOR_COUNT],
    /// Interrupted contexts, innermost last
    suspended: Vec<Suspended, VECTOR_COUNT>,
    current: CommandData,
    last: CommandData,
    running: bool,
    vector: u8,
    last_vector: u8,
    pause_time: u32,
    last_command_start_time: u32,
}

impl<C, H, const BUFFER_LEN: usize, const VECTOR_COUNT: usize, const VECTOR_LEN: usize>
    ProcessManager<C, H, BUFFER_LEN, VECTOR_COUNT, VECTOR_LEN>
where
    C: Clock,
    H: ProcessListener,
{
    const VECTOR_COUNT_FITS_U8: () = assert!(
        VECTOR_COUNT < u8::MAX as usize,
        "vector indices are carried as u8"
    );

    /// Create a stopped manager with empty queues
    pub fn new(clock: C, listener: H) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::VECTOR_COUNT_FITS_U8;

        Self {
            clock,
            listener,
            buffer: RingBuffer::new(),
            vectors: core::array::from_fn(|_| ProcessVector::new()),
            suspended: Vec::new(),
            current: CommandData::EMPTY,
            last: CommandData::EMPTY,
            running: false,
            vector: 0,
            last_vector: 0,
            pause_time: 0,
            last_command_start_time: 0,
        }
    }

    /// Advance if the current command is due
    ///
    /// Call this every control loop tick. At most one transition happens
    /// per call, so a zero-duration command is replaced on the next call.
    pub fn update(&mut self) {
        if !self.running {
            return;
        }

        if self.current_command_elapsed_us() < self.current.duration_us {
            return;
        }

        if self.vector > 0 {
            self.run_interrupt();
        } else {
            self.advance_main();
        }
    }

    /// Append a command to queue `queue` (0 = main program)
    ///
    /// Never blocks. Nothing is modified on failure. The empty command's
    /// code is reserved and refused.
    pub fn queue_command(&mut self, queue: u8, command: CommandData) -> Result<(), ProcessError> {
        if command.is_empty() {
            return Err(ProcessError::ReservedCode);
        }
        let result = match queue {
            MAIN_QUEUE => self.buffer.put(command),
            _ => self.vector_mut(queue)?.put(command),
        };
        result.map_err(|_| ProcessError::CapacityExceeded)
    }

    /// Preempt the current command with interrupt vector `vector`
    ///
    /// The current command and the time it has already run are saved and
    /// resume once the vector is exhausted. Fails without any change when
    /// `vector` is out of range, has nothing queued, or is already active
    /// or suspended.
    pub fn trigger_interrupt(&mut self, vector: u8) -> Result<(), ProcessError> {
        let slot = self.vector_slot(vector)?;

        if self.vector == vector || self.suspended.iter().any(|s| s.vector == vector) {
            return Err(ProcessError::VectorActive);
        }
        if self.vectors[slot].is_exhausted() {
            return Err(ProcessError::EmptyTrigger);
        }

        let now = self.effective_now();
        self.suspended
            .push(Suspended {
                command: self.current,
                elapsed_us: now.wrapping_sub(self.last_command_start_time),
                vector: self.vector,
            })
            .map_err(|_| ProcessError::VectorActive)?;

        let Some(first) = self.vectors[slot].next() else {
            // Checked above
            self.suspended.pop();
            return Err(ProcessError::EmptyTrigger);
        };

        self.last = self.current;
        self.current = first;
        self.last_command_start_time = now;
        self.last_vector = self.vector;
        self.vector = vector;

        self.listener.on_command_started(&self.current, vector);
        Ok(())
    }

    /// Start, resume or pause the process
    ///
    /// Pausing freezes the elapsed time of the current command; resuming
    /// shifts its start forward by the length of the pause. Setting the
    /// state it is already in does nothing.
    pub fn set_running(&mut self, running: bool) {
        if running == self.running {
            return;
        }

        let now = self.clock.now_us();
        if running {
            let paused_for = now.wrapping_sub(self.pause_time);
            self.last_command_start_time = self.last_command_start_time.wrapping_add(paused_for);
        } else {
            self.pause_time = now;
        }
        self.running = running;
    }

    /// Drop every queued command and return to the initial stopped state
    pub fn reset(&mut self) {
        self.buffer.reset(true);
        for v in self.vectors.iter_mut() {
            v.reset();
        }
        self.suspended.clear();
        self.current = CommandData::EMPTY;
        self.last = CommandData::EMPTY;
        self.running = false;
        self.vector = 0;
        self.last_vector = 0;
        self.pause_time = 0;
        self.last_command_start_time = 0;
    }

    /// Enqueue a whole program
    ///
    /// Every command and the room in every target queue are checked first;
    /// on error nothing has been queued.
    pub fn load_program(&mut self, program: &ProgramConfig) -> Result<(), ProcessError> {
        let all_commands = program
            .main
            .iter()
            .chain(program.vectors.iter().flat_map(|v| v.commands.iter()));
        for cmd in all_commands {
            if cmd.is_empty() {
                return Err(ProcessError::ReservedCode);
            }
        }

        if program.main.len() > self.buffer.available() {
            return Err(ProcessError::CapacityExceeded);
        }

        let mut needed = [0usize; VECTOR_COUNT];
        for v in program.vectors.iter() {
            let slot = self.vector_slot(v.vector)?;
            needed[slot] += v.commands.len();
        }
        for (slot, n) in needed.iter().enumerate() {
            if *n > self.vectors[slot].available() {
                return Err(ProcessError::CapacityExceeded);
            }
        }

        for cmd in program.main.iter() {
            self.queue_command(MAIN_QUEUE, *cmd)?;
        }
        for v in program.vectors.iter() {
            for cmd in v.commands.iter() {
                self.queue_command(v.vector, *cmd)?;
            }
        }
        Ok(())
    }

    /// Read a queued command without consuming it
    ///
    /// For the main program index 0 is the next command to run. For a
    /// vector the index is absolute, so already-played steps stay visible.
    pub fn peek(&self, queue: u8, index: usize) -> Result<CommandData, ProcessError> {
        let cmd = match queue {
            MAIN_QUEUE => self.buffer.get(index),
            _ => self.vector_ref(queue)?.get(index),
        };
        cmd.ok_or(ProcessError::InvalidIndex)
    }

    /// Free slots in queue `queue`
    pub fn available(&self, queue: u8) -> Result<usize, ProcessError> {
        match queue {
            MAIN_QUEUE => Ok(self.buffer.available()),
            _ => Ok(self.vector_ref(queue)?.available()),
        }
    }

    /// Total slots in queue `queue`
    pub fn capacity(&self, queue: u8) -> Result<usize, ProcessError> {
        match queue {
            MAIN_QUEUE => Ok(self.buffer.capacity()),
            _ => Ok(self.vector_ref(queue)?.capacity()),
        }
    }

    /// Commands held in queue `queue`
    pub fn queued(&self, queue: u8) -> Result<usize, ProcessError> {
        match queue {
            MAIN_QUEUE => Ok(self.buffer.count()),
            _ => Ok(self.vector_ref(queue)?.count()),
        }
    }

    pub fn current_command(&self) -> CommandData {
        self.current
    }

    pub fn previous_command(&self) -> CommandData {
        self.last
    }

    /// Stream owning the current command (0 = main program)
    pub fn current_vector(&self) -> u8 {
        self.vector
    }

    /// Stream that was active before the current one
    pub fn last_vector(&self) -> u8 {
        self.last_vector
    }

    /// Command that resumes when the active interrupt finishes
    pub fn waiting_command(&self) -> Option<CommandData> {
        self.suspended.last().map(|s| s.command)
    }

    /// Number of suspended contexts
    pub fn interrupt_depth(&self) -> usize {
        self.suspended.len()
    }

    /// Time until the current command is due, zero once overdue
    pub fn remaining_time_us(&self) -> u32 {
        self.current
            .duration_us
            .saturating_sub(self.current_command_elapsed_us())
    }

    /// Running time of the current command, excluding pauses
    pub fn current_command_elapsed_us(&self) -> u32 {
        self.effective_now()
            .wrapping_sub(self.last_command_start_time)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn state(&self) -> ProcessState {
        match (self.running, self.vector) {
            (false, _) => ProcessState::Stopped,
            (true, 0) => ProcessState::RunningMain,
            (true, v) => ProcessState::RunningInterrupt(v),
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn listener(&self) -> &H {
        &self.listener
    }

    fn advance_main(&mut self) {
        match self.buffer.take_back() {
            Some(next) => self.begin(next),
            None => self.end_process(),
        }
    }

    fn run_interrupt(&mut self) {
        let slot = usize::from(self.vector - 1);
        match self.vectors[slot].next() {
            Some(next) => self.begin(next),
            None => self.finish_interrupt(),
        }
    }

    /// Replace the current command within the active stream
    fn begin(&mut self, next: CommandData) {
        let ended = self.current;
        self.last = ended;
        self.current = next;
        self.last_command_start_time = self.clock.now_us();

        if !ended.is_empty() {
            self.listener.on_command_ended(self.vector);
        }
        self.listener.on_command_started(&self.current, self.vector);
    }

    fn finish_interrupt(&mut self) {
        let finished = self.vector;
        self.vectors[usize::from(finished - 1)].reset();

        let resumed = self.suspended.pop().unwrap_or(Suspended {
            command: CommandData::EMPTY,
            elapsed_us: 0,
            vector: 0,
        });

        let now = self.clock.now_us();
        self.last = self.current;
        self.current = resumed.command;
        self.last_command_start_time = now.wrapping_sub(resumed.elapsed_us);
        self.vector = resumed.vector;
        self.last_vector = finished;

        self.listener.on_command_ended(finished);
        if !self.current.is_empty() {
            self.listener.on_command_started(&self.current, self.vector);
        }
    }

    fn end_process(&mut self) {
        let ended = self.current;
        self.last = ended;
        self.current = CommandData::EMPTY;
        self.running = false;
        self.pause_time = self.clock.now_us();
        self.last_command_start_time = self.pause_time;

        if !ended.is_empty() {
            self.listener.on_command_ended(self.vector);
        }
        self.listener.on_process_ended();
    }

    /// Clock reading frozen at the pause instant while stopped
    fn effective_now(&self) -> u32 {
        if self.running {
            self.clock.now_us()
        } else {
            self.pause_time
        }
    }

    /// Map a 1-based vector queue index to an array slot
    fn vector_slot(&self, queue: u8) -> Result<usize, ProcessError> {
        let q = usize::from(queue);
        if (1..=VECTOR_COUNT).contains(&q) {
            Ok(q - 1)
        } else {
            Err(ProcessError::InvalidIndex)
        }
    }

    fn vector_ref(&self, queue: u8) -> Result<&ProcessVector<VECTOR_LEN>, ProcessError> {
        let slot = self.vector_slot(queue)?;
        Ok(&self.vectors[slot])
    }

    fn vector_mut(&mut self, queue: u8) -> Result<&mut ProcessVector<VECTOR_LEN>, ProcessError> {
        let slot = self.vector_slot(queue)?;
        Ok(&mut self.vectors[slot])
    }
}
