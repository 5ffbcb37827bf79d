use async_trait::async_trait;
use regwrite::{
    AccessMode, DependencyModel, DeviceChannel, Encoding, FieldModel, StateSink, WritableField,
    WriteError, WriteResult,
};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Mutex, Once,
    },
};
use tracing::Level;

/// In-memory register device with scripted failure modes.
#[derive(Default)]
pub struct MockDevice {
    registers: Mutex<HashMap<u16, u16>>,
    reads: Mutex<Vec<(u16, u16)>>,
    writes: Mutex<Vec<(u16, Vec<u16>)>>,
    pub fail_reads: AtomicBool,
    pub short_reads: AtomicBool,
    pub fail_writes: AtomicBool,
    pub zero_ack: AtomicBool,
    pub write_delay_ms: AtomicU64,
}

impl MockDevice {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_registers(seed: &[(u16, u16)]) -> Arc<Self> {
        let device = Self::default();
        device
            .registers
            .lock()
            .unwrap()
            .extend(seed.iter().copied());
        Arc::new(device)
    }

    pub fn read_log(&self) -> Vec<(u16, u16)> {
        self.reads.lock().unwrap().clone()
    }

    pub fn write_log(&self) -> Vec<(u16, Vec<u16>)> {
        self.writes.lock().unwrap().clone()
    }

    pub fn register(&self, address: u16) -> Option<u16> {
        self.registers.lock().unwrap().get(&address).copied()
    }
}

#[async_trait]
impl DeviceChannel for MockDevice {
    async fn read_registers(&self, address: u16, count: u16) -> WriteResult<Vec<u16>> {
        self.reads.lock().unwrap().push((address, count));
        if self.fail_reads.load(Ordering::Acquire) {
            return Err(WriteError::DeviceRead("mock read failure".to_string()));
        }
        let registers = self.registers.lock().unwrap();
        let mut out: Vec<u16> = (0..count)
            .map(|i| registers.get(&(address + i)).copied().unwrap_or(0))
            .collect();
        if self.short_reads.load(Ordering::Acquire) {
            out.pop();
        }
        Ok(out)
    }

    async fn write_registers(&self, address: u16, words: &[u16]) -> WriteResult<u16> {
        let delay = self.write_delay_ms.load(Ordering::Acquire);
        if delay > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
        }
        self.writes.lock().unwrap().push((address, words.to_vec()));
        if self.fail_writes.load(Ordering::Acquire) {
            return Err(WriteError::DeviceWrite("mock write failure".to_string()));
        }
        if self.zero_ack.load(Ordering::Acquire) {
            return Ok(0);
        }
        let mut registers = self.registers.lock().unwrap();
        for (i, w) in words.iter().enumerate() {
            registers.insert(address + i as u16, *w);
        }
        Ok(words.len() as u16)
    }
}

/// State sink that records every applied update for assertions.
#[derive(Default)]
pub struct RecordingSink {
    applied: Mutex<Vec<(String, Vec<u16>)>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn states(&self) -> Vec<(String, Vec<u16>)> {
        self.applied.lock().unwrap().clone()
    }
}

impl StateSink for RecordingSink {
    fn apply(&self, display: &str, raw: &[u16]) {
        self.applied
            .lock()
            .unwrap()
            .push((display.to_string(), raw.to_vec()));
    }
}

static INIT_TRACING: Once = Once::new();

pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_target(false)
            .without_time()
            .try_init();
    });
}

/// Build a validated field from its parts.
pub fn build_field(
    registers: Vec<u16>,
    encoding: Encoding,
    dependencies: Option<DependencyModel>,
) -> WritableField {
    WritableField::from_model(FieldModel {
        key: "test_field".to_string(),
        name: "Test Field".to_string(),
        access_mode: AccessMode::ReadWrite,
        registers,
        encoding,
        dependencies,
    })
    .expect("field model should validate")
}
