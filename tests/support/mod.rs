//! Shared test doubles

#![allow(dead_code)]

use std::string::String;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::vec::Vec;

use obegraensad_core::{
    CoreConfig, Duration, Effect, FrameBuffer, Instant, MemoryStore, PixelSurface, PluginManager,
    StatusFlag, SystemStatus, TaskYield,
};
use serde_json::Value;

/// Ordered record of effect callbacks, shared between effects
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }

    pub fn position(&self, entry: &str) -> Option<usize> {
        self.entries().iter().position(|e| e == entry)
    }
}

/// Effect that records every callback into a [`CallLog`]
pub struct RecordingEffect {
    name: String,
    log: CallLog,
    status: Option<&'static StatusFlag>,
}

impl RecordingEffect {
    pub fn boxed(name: &str, log: &CallLog) -> Box<dyn Effect> {
        Box::new(Self {
            name: name.to_string(),
            log: log.clone(),
            status: None,
        })
    }

    /// Also records the status flag seen during setup and teardown
    pub fn watching_status(name: &str, log: &CallLog, status: &'static StatusFlag) -> Box<dyn Effect> {
        Box::new(Self {
            name: name.to_string(),
            log: log.clone(),
            status: Some(status),
        })
    }

    fn record(&self, what: &str) {
        self.log.push(format!("{}:{}", what, self.name));
        if let Some(status) = self.status {
            self.log
                .push(format!("{}-status:{}", what, status.load().as_str()));
        }
    }
}

impl Effect for RecordingEffect {
    fn name(&self) -> &str {
        &self.name
    }

    fn setup(&mut self, _surface: &mut dyn PixelSurface) {
        self.record("setup");
    }

    fn run(&mut self, _now: Instant, surface: &mut dyn PixelSurface) {
        self.log.push(format!("run:{}", self.name));
        surface.set_pixel(0, 0, true, 1);
    }

    fn teardown(&mut self) {
        self.record("teardown");
    }

    fn handle_event(&mut self, event: &Value) {
        self.log.push(format!("event:{}:{}", self.name, event));
    }
}

/// Yield hook counting its calls
#[derive(Clone, Default)]
pub struct CountingYield {
    calls: Arc<AtomicUsize>,
    micros: Arc<AtomicUsize>,
}

impl CountingYield {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn total_micros(&self) -> usize {
        self.micros.load(Ordering::SeqCst)
    }
}

impl TaskYield for CountingYield {
    fn yield_for(&mut self, slice: Duration) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.micros
            .fetch_add(slice.as_micros() as usize, Ordering::SeqCst);
    }
}

pub type TestManager<'a> = PluginManager<'a, MemoryStore, FrameBuffer, CountingYield>;

pub fn ms(value: u64) -> Instant {
    Instant::from_millis(value)
}

/// A manager with one recording effect per name, in order
pub fn manager_with<'a>(
    status: &'a StatusFlag,
    store: MemoryStore,
    names: &[&str],
    log: &CallLog,
) -> (TestManager<'a>, CountingYield) {
    let pacer = CountingYield::default();
    let mut manager = PluginManager::new(
        status,
        store,
        FrameBuffer::new(),
        pacer.clone(),
        CoreConfig::default(),
    );
    for name in names {
        manager.register(RecordingEffect::boxed(name, log));
    }
    (manager, pacer)
}

pub fn assert_idle(status: &StatusFlag) {
    assert_eq!(status.load(), SystemStatus::None);
}
