use embedded_hal::delay::DelayNs;
use heapless::{Deque, LinearMap, Vec};

use crate::bus::{Bus, MAX_REG_BYTES};
use crate::clock::{Clock, Instant};
use crate::diagnostic::{Diagnostic, Observer};

type Bytes = Vec<u8, MAX_REG_BYTES>;

/// In-memory stand-in for a device on the bus.
///
/// Register reads are answered from responses keyed by `(address, length)`. Register writes are
/// logged and, unless the register is stuck, stored so a read of the same length returns them.
pub struct FakeBus {
    regs: LinearMap<(u8, usize), Bytes, 32>,
    stuck: Vec<u8, 8>,
    fail_write: Option<u8>,
    fail_command: bool,
    writes: Vec<(u8, Bytes), 64>,
    commands: Vec<Bytes, 16>,
    reads: Deque<Bytes, 8>,
}

impl FakeBus {
    pub const ADDRESS: u8 = 0x76;

    pub fn new() -> Self {
        FakeBus {
            regs: LinearMap::new(),
            stuck: Vec::new(),
            fail_write: None,
            fail_command: false,
            writes: Vec::new(),
            commands: Vec::new(),
            reads: Deque::new(),
        }
    }

    pub fn with_register(&mut self, reg: u8, data: &[u8]) {
        self.regs
            .insert((reg, data.len()), Bytes::from_slice(data).unwrap())
            .unwrap();
    }

    /// The register answers `data` no matter what is written to it.
    pub fn with_stuck_register(&mut self, reg: u8, data: &[u8]) {
        self.with_register(reg, data);
        self.stuck.push(reg).unwrap();
    }

    /// Queues the answer to the next plain (unaddressed) read.
    pub fn with_read(&mut self, data: &[u8]) {
        self.reads.push_back(Bytes::from_slice(data).unwrap()).unwrap();
    }

    pub fn fail_next_write_to(&mut self, reg: u8) {
        self.fail_write = Some(reg);
    }

    pub fn fail_next_command(&mut self) {
        self.fail_command = true;
    }

    pub fn last_write_to(&self, reg: u8) -> Option<&[u8]> {
        self.writes
            .iter()
            .rev()
            .find(|(r, _)| *r == reg)
            .map(|(_, data)| data.as_slice())
    }

    /// Register addresses in the order they were written.
    pub fn written_registers(&self) -> impl Iterator<Item = u8> + '_ {
        self.writes.iter().map(|(reg, _)| *reg)
    }

    pub fn commands(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.commands.iter().map(|c| c.as_slice())
    }
}

impl Bus for FakeBus {
    type Error = ();

    fn address(&self) -> u8 {
        Self::ADDRESS
    }

    fn write_register(&mut self, reg: u8, data: &[u8]) -> Result<(), Self::Error> {
        if self.fail_write == Some(reg) {
            self.fail_write = None;
            return Err(());
        }

        let bytes = Bytes::from_slice(data).unwrap();
        self.writes.push((reg, bytes.clone())).unwrap();
        if !self.stuck.contains(&reg) {
            self.regs.insert((reg, data.len()), bytes).unwrap();
        }

        Ok(())
    }

    fn read_register(&mut self, reg: u8, data: &mut [u8]) -> Result<(), Self::Error> {
        match self.regs.get(&(reg, data.len())) {
            Some(value) => {
                data.copy_from_slice(value);
                Ok(())
            }
            None => panic!("No mocked value for register 0x{:x} and length {}", reg, data.len()),
        }
    }

    fn write_command(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        if self.fail_command {
            self.fail_command = false;
            return Err(());
        }

        self.commands.push(Bytes::from_slice(bytes).unwrap()).unwrap();
        Ok(())
    }

    fn read_bytes(&mut self, data: &mut [u8]) -> Result<(), Self::Error> {
        match self.reads.pop_front() {
            Some(value) => {
                data.copy_from_slice(&value);
                Ok(())
            }
            None => panic!("No mocked value for a plain read of length {}", data.len()),
        }
    }
}

/// Records the total requested delay instead of waiting.
pub struct FakeDelay {
    elapsed_ns: u64,
}

impl FakeDelay {
    pub fn new() -> Self {
        FakeDelay { elapsed_ns: 0 }
    }

    pub fn elapsed_ns(&self) -> u64 {
        self.elapsed_ns
    }
}

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += ns as u64;
    }
}

pub struct FakeClock {
    now: Instant,
}

impl FakeClock {
    pub fn at_secs(secs: u64) -> Self {
        FakeClock { now: Instant::from_ticks(secs * 1_000_000) }
    }

    pub fn advance_secs(&mut self, secs: u64) {
        self.now = Instant::from_ticks(self.now.ticks() + secs * 1_000_000);
    }
}

impl Clock for FakeClock {
    fn now(&mut self) -> Instant {
        self.now
    }
}

pub struct RecordingObserver {
    events: Vec<Diagnostic, 16>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        RecordingObserver { events: Vec::new() }
    }

    pub fn events(&self) -> &[Diagnostic] {
        &self.events
    }
}

impl Observer for RecordingObserver {
    fn notify(&mut self, diagnostic: Diagnostic) {
        self.events.push(diagnostic).unwrap();
    }
}
