//! In-memory bus and delay doubles shared by the unit tests.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use fpga_miner_core::regs::STATUS;

use crate::controller::Delay;
use crate::transport::RegisterBus;

/// One observable action on the bus or the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Write { offset: u32, value: u32 },
    Read { offset: u32, value: u32 },
    Delay(Duration),
}

impl Event {
    pub fn write(offset: u32, value: u32) -> Self {
        Event::Write { offset, value }
    }

    pub fn read(offset: u32, value: u32) -> Self {
        Event::Read { offset, value }
    }
}

/// Ordered record of events, shared between a bus and a delay.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Rc<RefCell<Vec<Event>>>);

impl EventLog {
    pub fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    /// All writes as `(offset, value)`, in order.
    pub fn writes(&self) -> Vec<(u32, u32)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Write { offset, value } => Some((offset, value)),
                _ => None,
            })
            .collect()
    }

    /// Number of reads of `offset`.
    pub fn reads_of(&self, offset: u32) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Read { offset: o, .. } if *o == offset))
            .count()
    }

    /// Number of writes of `value` to `offset`.
    pub fn count_writes(&self, offset: u32, value: u32) -> usize {
        self.writes()
            .iter()
            .filter(|w| **w == (offset, value))
            .count()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

/// Register file with a scripted status register.
///
/// Each read of `STATUS` consumes the next scripted value; once the script
/// runs out the register reads 0. Other registers read back whatever was
/// last written or `set`.
#[derive(Debug, Default)]
pub struct ScriptedBus {
    log: EventLog,
    values: HashMap<u32, u32>,
    status_script: VecDeque<u32>,
}

impl ScriptedBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log(log: EventLog) -> Self {
        ScriptedBus {
            log,
            ..Self::default()
        }
    }

    pub fn log(&self) -> EventLog {
        self.log.clone()
    }

    pub fn set(&mut self, offset: u32, value: u32) {
        self.values.insert(offset, value);
    }

    /// Queue `count` reads of `STATUS` returning `raw`.
    pub fn script_status(&mut self, raw: u32, count: usize) {
        self.status_script.extend(std::iter::repeat(raw).take(count));
    }
}

impl RegisterBus for ScriptedBus {
    fn read32(&mut self, offset: u32) -> u32 {
        let value = if offset == STATUS {
            self.status_script.pop_front().unwrap_or(0)
        } else {
            self.values.get(&offset).copied().unwrap_or(0)
        };
        self.log.push(Event::Read { offset, value });
        value
    }

    fn write32(&mut self, offset: u32, value: u32) {
        self.values.insert(offset, value);
        self.log.push(Event::Write { offset, value });
    }
}

/// Delay that records instead of sleeping.
#[derive(Debug, Default)]
pub struct RecordingDelay {
    log: EventLog,
}

impl RecordingDelay {
    pub fn new(log: EventLog) -> Self {
        RecordingDelay { log }
    }
}

impl Delay for RecordingDelay {
    fn delay(&mut self, duration: Duration) {
        self.log.push(Event::Delay(duration));
    }
}
