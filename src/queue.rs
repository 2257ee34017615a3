//! Command queue between control surfaces and the control loop
//!
//! Transport handlers (button ISR glue, HTTP and WebSocket callbacks) post
//! [`ControlCommand`]s from wherever they run and the control loop drains
//! them in order. The queue lives in a `critical-section` mutex so it can sit
//! in a `static` shared with interrupts.
//!
//! Back-to-back schedule replacements collapse into the latest one: only the
//! last of them would survive execution anyway, and each one costs a flash
//! write of the whole schedule.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Deque;

use crate::command::ControlCommand;

/// Returned when the queue is full, carrying the rejected command back
#[derive(Debug, Clone, PartialEq)]
pub struct QueueFull(pub ControlCommand);

/// Bounded FIFO of pending control commands
pub struct CommandQueue<const SIZE: usize> {
    pending: Mutex<RefCell<Deque<ControlCommand, SIZE>>>,
}

impl<const SIZE: usize> CommandQueue<SIZE> {
    pub const fn new() -> Self {
        Self {
            pending: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Handle for control surfaces. Any number may exist.
    pub const fn sender(&self) -> CommandSender<'_, SIZE> {
        CommandSender { queue: self }
    }

    /// Handle for the control loop
    pub const fn receiver(&self) -> CommandReceiver<'_, SIZE> {
        CommandReceiver { queue: self }
    }

    /// Queue `command` behind every pending one
    ///
    /// A schedule replacement posted right after another one takes its place
    /// instead of occupying a second slot.
    pub fn post(&self, command: ControlCommand) -> Result<(), QueueFull> {
        critical_section::with(|cs| {
            let mut pending = self.pending.borrow(cs).borrow_mut();
            if matches!(command, ControlCommand::SetSchedule(_)) {
                if let Some(last) = pending.back_mut() {
                    if matches!(last, ControlCommand::SetSchedule(_)) {
                        *last = command;
                        return Ok(());
                    }
                }
            }
            pending.push_back(command).map_err(QueueFull)
        })
    }

    /// Take the oldest pending command
    pub fn take(&self) -> Option<ControlCommand> {
        critical_section::with(|cs| self.pending.borrow(cs).borrow_mut().pop_front())
    }

    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.pending.borrow(cs).borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<const SIZE: usize> Default for CommandQueue<SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer side of a [`CommandQueue`]
#[derive(Clone, Copy)]
pub struct CommandSender<'a, const SIZE: usize> {
    queue: &'a CommandQueue<SIZE>,
}

impl<const SIZE: usize> CommandSender<'_, SIZE> {
    pub fn post(&self, command: ControlCommand) -> Result<(), QueueFull> {
        self.queue.post(command)
    }
}

/// Consumer side of a [`CommandQueue`], owned by the control loop
pub struct CommandReceiver<'a, const SIZE: usize> {
    queue: &'a CommandQueue<SIZE>,
}

impl<const SIZE: usize> CommandReceiver<'_, SIZE> {
    pub fn take(&self) -> Option<ControlCommand> {
        self.queue.take()
    }

    /// Iterate until the queue is empty, including commands posted meanwhile
    pub fn drain(&self) -> impl Iterator<Item = ControlCommand> + '_ {
        core::iter::from_fn(move || self.queue.take())
    }
}
