//! Cooperative deadline scheduler.
//!
//! Tasks run to completion; the scheduler keeps a small array sorted by
//! deadline and always runs the head. Deadlines advance by whole periods
//! from the original base, so a task that runs long does not drift its
//! schedule. All time math is wrapping; the microsecond timestamp rolls
//! over about every 71 minutes.

use crate::config::MAX_TASKS;
use crate::context::Context;
use crate::{pr_debug, pr_err, pr_info};

/// Spin slice while waiting for the head task to come due.
const SPIN_SLICE_US: u32 = 10;

/// Returned by a task to retire itself. The text ends up in the
/// retirement log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskError(pub &'static str);

impl core::fmt::Display for TaskError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.0)
    }
}

/// Work driven by the scheduler.
pub trait Task {
    fn run(&mut self, cx: &mut Context<'_>) -> Result<(), TaskError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedError {
    /// No slot left for another registration.
    TooManyTasks,
    /// Every task has retired; nothing left to run.
    Exhausted,
}

impl core::fmt::Display for SchedError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SchedError::TooManyTasks => f.write_str("too many tasks"),
            SchedError::Exhausted => f.write_str("no more tasks to run"),
        }
    }
}

struct Slot<'a> {
    name: &'static str,
    period: u32,
    base: u32,
    task: &'a mut dyn Task,
}

impl Slot<'_> {
    fn deadline(&self) -> u32 {
        self.base.wrapping_add(self.period)
    }
}

/// `a` comes strictly before `b` on the wrapping timeline.
fn deadline_before(a: u32, b: u32) -> bool {
    (a.wrapping_sub(b) as i32) < 0
}

pub struct Scheduler<'a> {
    slots: [Option<Slot<'a>>; MAX_TASKS],
    len: usize,
}

impl<'a> Scheduler<'a> {
    pub const fn new() -> Self {
        Self {
            slots: [const { None }; MAX_TASKS],
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Register `task` to run every `period` ticks.
    ///
    /// The first run is due immediately: the base is backdated by one
    /// period. A new task goes to the front of the queue, ahead of
    /// anything already due.
    pub fn register(
        &mut self,
        cx: &mut Context<'_>,
        name: &'static str,
        period: u32,
        task: &'a mut dyn Task,
    ) -> Result<(), SchedError> {
        if self.len == MAX_TASKS {
            return Err(SchedError::TooManyTasks);
        }
        pr_debug!(cx, "Adding task {}", name);
        let base = cx.clock.now_us().wrapping_sub(period);
        let mut i = self.len;
        while i > 0 {
            self.slots[i] = self.slots[i - 1].take();
            i -= 1;
        }
        self.slots[0] = Some(Slot { name, period, base, task });
        self.len += 1;
        Ok(())
    }

    fn pop_head(&mut self) -> Option<Slot<'a>> {
        let head = self.slots[0].take()?;
        let mut i = 1;
        while i < self.len {
            self.slots[i - 1] = self.slots[i].take();
            i += 1;
        }
        self.len -= 1;
        Some(head)
    }

    /// Put a slot back, keeping the array sorted by deadline. An equal
    /// deadline queues behind the sitting entry, so tasks sharing a
    /// deadline run round-robin.
    fn reinsert(&mut self, slot: Slot<'a>) {
        let deadline = slot.deadline();
        let mut at = self.len;
        for i in 0..self.len {
            if let Some(other) = &self.slots[i] {
                if deadline_before(deadline, other.deadline()) {
                    at = i;
                    break;
                }
            }
        }
        let mut i = self.len;
        while i > at {
            self.slots[i] = self.slots[i - 1].take();
            i -= 1;
        }
        self.slots[at] = Some(slot);
        self.len += 1;
    }

    /// Run tasks forever. Returns only when the queue runs dry, which is
    /// fatal for the firmware.
    pub fn run(&mut self, cx: &mut Context<'_>) -> SchedError {
        loop {
            let Some(mut slot) = self.pop_head() else {
                pr_err!(cx, "PANIC: No more tasks to run");
                return SchedError::Exhausted;
            };
            pr_debug!(cx, "Waiting for {} to run task {}", slot.deadline(), slot.name);
            while cx.clock.now_us().wrapping_sub(slot.base) < slot.period {
                cx.clock.delay_us(SPIN_SLICE_US);
            }
            pr_debug!(cx, "Running task {}", slot.name);
            match slot.task.run(cx) {
                Ok(()) => {
                    slot.base = slot.base.wrapping_add(slot.period);
                    self.reinsert(slot);
                }
                Err(e) => {
                    pr_info!(cx, "Task {} stopped with error {}", slot.name, e);
                }
            }
        }
    }
}

impl Default for Scheduler<'_> {
    fn default() -> Self {
        Self::new()
    }
}
