//! Shared fake hardware for the integration tests.
//!
//! `Fixture` owns one fake per board trait and hands out a [`Context`]
//! borrowing all four. The fakes share their interesting state through
//! `Rc<RefCell<..>>` handles, so a test can clone the handles it needs
//! before calling [`Fixture::context`] and keep scripting and inspecting
//! while the context is alive.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};
use rust_farm_bcu::hal::{Board, Clock, ConsolePort, I2cBus};
use rust_farm_bcu::Context;

/// Serial number every fake board reports.
pub const SERIAL_NUMBER: u32 = 0x1234_5678;

/// Microsecond clock the firmware winds forward through `delay_us`.
pub struct FakeClock {
    now: Rc<RefCell<u32>>,
}

impl Clock for FakeClock {
    fn now_us(&self) -> u32 {
        *self.now.borrow()
    }

    fn delay_us(&mut self, us: u32) {
        let mut now = self.now.borrow_mut();
        *now = now.wrapping_add(us);
    }
}

/// Test-side view of the fake clock.
#[derive(Clone)]
pub struct TimeHandle(Rc<RefCell<u32>>);

impl TimeHandle {
    pub fn now(&self) -> u32 {
        *self.0.borrow()
    }

    pub fn set(&self, t: u32) {
        *self.0.borrow_mut() = t;
    }
}

/// Console port with scripted input and captured output.
pub struct FakePort {
    rx: Rc<RefCell<VecDeque<u8>>>,
    tx: Rc<RefCell<Vec<u8>>>,
}

impl ConsolePort for FakePort {
    fn poll_byte(&mut self) -> Option<u8> {
        self.rx.borrow_mut().pop_front()
    }

    fn put_byte(&mut self, byte: u8) {
        self.tx.borrow_mut().push(byte);
    }
}

/// Feeds bytes into the fake console port.
#[derive(Clone)]
pub struct InputHandle(Rc<RefCell<VecDeque<u8>>>);

impl InputHandle {
    pub fn push_str(&self, s: &str) {
        self.push_bytes(s.as_bytes());
    }

    pub fn push_bytes(&self, bytes: &[u8]) {
        self.0.borrow_mut().extend(bytes.iter().copied());
    }

    pub fn pending(&self) -> usize {
        self.0.borrow().len()
    }
}

/// Everything the firmware wrote to the console.
#[derive(Clone)]
pub struct Output(Rc<RefCell<Vec<u8>>>);

impl Output {
    pub fn bytes(&self) -> Vec<u8> {
        self.0.borrow().clone()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }

    pub fn contains(&self, s: &str) -> bool {
        self.text().contains(s)
    }

    pub fn count(&self, s: &str) -> usize {
        self.text().matches(s).count()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

/// One output mutation as seen by the board fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardOp {
    Heartbeat(bool),
    Power(usize, bool),
    /// Raw pin level; key channels are active low.
    Key(usize, bool),
    Gpio(usize, bool),
    Rgb(usize, u32),
    Uart(usize, Vec<u8>),
}

pub struct FakeBoard {
    ops: Rc<RefCell<Vec<BoardOp>>>,
}

impl Board for FakeBoard {
    fn set_heartbeat_led(&mut self, on: bool) {
        self.ops.borrow_mut().push(BoardOp::Heartbeat(on));
    }

    fn set_power(&mut self, ch: usize, on: bool) {
        self.ops.borrow_mut().push(BoardOp::Power(ch, on));
    }

    fn set_key(&mut self, ch: usize, level: bool) {
        self.ops.borrow_mut().push(BoardOp::Key(ch, level));
    }

    fn set_gpio(&mut self, ch: usize, on: bool) {
        self.ops.borrow_mut().push(BoardOp::Gpio(ch, on));
    }

    fn set_rgb(&mut self, ch: usize, rgb: u32) {
        self.ops.borrow_mut().push(BoardOp::Rgb(ch, rgb));
    }

    fn write_aux_uart(&mut self, ch: usize, bytes: &[u8]) {
        self.ops.borrow_mut().push(BoardOp::Uart(ch, bytes.to_vec()));
    }

    fn serial_number(&self) -> u32 {
        SERIAL_NUMBER
    }
}

/// Recorded board operations, oldest first.
#[derive(Clone)]
pub struct OpsHandle(Rc<RefCell<Vec<BoardOp>>>);

impl OpsHandle {
    pub fn all(&self) -> Vec<BoardOp> {
        self.0.borrow().clone()
    }

    /// Drain the log, returning what was recorded since the last take.
    pub fn take(&self) -> Vec<BoardOp> {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

type RegMap = HashMap<(u8, u8), Vec<u8>>;

/// Register-style I2C bus fake.
///
/// A write of `[reg, data...]` stores the data bytes under `(addr, reg)`;
/// a write-read of `[reg]` returns them, zero-filled past the stored
/// length. Addresses not marked present NACK, which is how a real bus
/// reports an absent device.
pub struct FakeI2c {
    present: Rc<RefCell<HashSet<u8>>>,
    regs: Rc<RefCell<RegMap>>,
    writes: Rc<RefCell<Vec<(u8, Vec<u8>)>>>,
    fail: Rc<RefCell<Option<ErrorKind>>>,
}

impl FakeI2c {
    fn check(&self, addr: u8) -> Result<(), ErrorKind> {
        if let Some(kind) = *self.fail.borrow() {
            return Err(kind);
        }
        if !self.present.borrow().contains(&addr) {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        Ok(())
    }
}

impl I2cBus for FakeI2c {
    fn write(&mut self, addr: u8, bytes: &[u8]) -> Result<(), ErrorKind> {
        self.check(addr)?;
        self.writes.borrow_mut().push((addr, bytes.to_vec()));
        if bytes.len() > 1 {
            self.regs
                .borrow_mut()
                .insert((addr, bytes[0]), bytes[1..].to_vec());
        }
        Ok(())
    }

    fn read(&mut self, addr: u8, buf: &mut [u8]) -> Result<(), ErrorKind> {
        self.check(addr)?;
        buf.fill(0);
        Ok(())
    }

    fn write_read(&mut self, addr: u8, bytes: &[u8], buf: &mut [u8]) -> Result<(), ErrorKind> {
        self.check(addr)?;
        buf.fill(0);
        if let Some(data) = self.regs.borrow().get(&(addr, bytes[0])) {
            let n = data.len().min(buf.len());
            buf[..n].copy_from_slice(&data[..n]);
        }
        Ok(())
    }
}

/// Scripts devices and registers on the fake bus.
#[derive(Clone)]
pub struct BusHandle {
    present: Rc<RefCell<HashSet<u8>>>,
    regs: Rc<RefCell<RegMap>>,
    writes: Rc<RefCell<Vec<(u8, Vec<u8>)>>>,
    fail: Rc<RefCell<Option<ErrorKind>>>,
}

impl BusHandle {
    pub fn add_device(&self, addr: u8) {
        self.present.borrow_mut().insert(addr);
    }

    /// Script a 16-bit big-endian register value.
    pub fn set_reg16(&self, addr: u8, reg: u8, val: u16) {
        self.regs
            .borrow_mut()
            .insert((addr, reg), val.to_be_bytes().to_vec());
    }

    pub fn reg16(&self, addr: u8, reg: u8) -> Option<u16> {
        self.regs.borrow().get(&(addr, reg)).map(|data| {
            let mut buf = [0u8; 2];
            let n = data.len().min(2);
            buf[..n].copy_from_slice(&data[..n]);
            u16::from_be_bytes(buf)
        })
    }

    /// Every raw write issued by the firmware, oldest first.
    pub fn writes(&self) -> Vec<(u8, Vec<u8>)> {
        self.writes.borrow().clone()
    }

    pub fn clear_writes(&self) {
        self.writes.borrow_mut().clear();
    }

    /// Make every transfer fail with `kind`; `None` restores service.
    pub fn fail_with(&self, kind: Option<ErrorKind>) {
        *self.fail.borrow_mut() = kind;
    }
}

/// One set of fake hardware, ready to back a [`Context`].
pub struct Fixture {
    clock: FakeClock,
    port: FakePort,
    board: FakeBoard,
    i2c: FakeI2c,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            clock: FakeClock {
                now: Rc::new(RefCell::new(0)),
            },
            port: FakePort {
                rx: Rc::new(RefCell::new(VecDeque::new())),
                tx: Rc::new(RefCell::new(Vec::new())),
            },
            board: FakeBoard {
                ops: Rc::new(RefCell::new(Vec::new())),
            },
            i2c: FakeI2c {
                present: Rc::new(RefCell::new(HashSet::new())),
                regs: Rc::new(RefCell::new(HashMap::new())),
                writes: Rc::new(RefCell::new(Vec::new())),
                fail: Rc::new(RefCell::new(None)),
            },
        }
    }

    pub fn time(&self) -> TimeHandle {
        TimeHandle(Rc::clone(&self.clock.now))
    }

    pub fn input(&self) -> InputHandle {
        InputHandle(Rc::clone(&self.port.rx))
    }

    pub fn output(&self) -> Output {
        Output(Rc::clone(&self.port.tx))
    }

    pub fn ops(&self) -> OpsHandle {
        OpsHandle(Rc::clone(&self.board.ops))
    }

    pub fn bus(&self) -> BusHandle {
        BusHandle {
            present: Rc::clone(&self.i2c.present),
            regs: Rc::clone(&self.i2c.regs),
            writes: Rc::clone(&self.i2c.writes),
            fail: Rc::clone(&self.i2c.fail),
        }
    }

    /// Borrow the whole fixture as a firmware context. Clone any handles
    /// first; the fixture is locked while the context lives.
    pub fn context(&mut self) -> Context<'_> {
        Context::new(
            &mut self.clock,
            &mut self.port,
            &mut self.board,
            &mut self.i2c,
        )
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Script an INA219 at `addr` with power-on defaults and one plausible
/// sample in its data registers.
pub fn script_ina219(bus: &BusHandle, addr: u8) {
    bus.add_device(addr);
    // 32V range, /8 gain, 12-bit ADCs, continuous shunt and bus.
    bus.set_reg16(addr, 0x00, 0x399f);
    // Bus voltage 5000 mV with the conversion-ready flag up.
    bus.set_reg16(addr, 0x02, (1250 << 3) | 0x02);
    // Shunt 1500 uV, power 500 mW, current 100 mA.
    bus.set_reg16(addr, 0x01, 150);
    bus.set_reg16(addr, 0x03, 250);
    bus.set_reg16(addr, 0x04, 1000);
}
