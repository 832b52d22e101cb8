#![allow(dead_code)] // not every test binary uses every helper

use klogger::{Destination, Logger, Payload};
use std::error::Error;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// In-memory output stream shared between a logger and the test body.
#[derive(Clone, Default)]
pub struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    pub fn new() -> Self {
        SharedBuf::default()
    }

    pub fn writer(&self) -> Box<dyn Write + Send> {
        Box::new(self.clone())
    }

    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Destination that records every call it receives.
#[derive(Default)]
pub struct RecordingDestination {
    calls: Mutex<Vec<(Payload, Vec<String>)>>,
}

impl RecordingDestination {
    pub fn new() -> Arc<Self> {
        Arc::new(RecordingDestination::default())
    }

    pub fn calls(&self) -> Vec<(Payload, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Destination for RecordingDestination {
    fn call(
        &self,
        _logger: &Logger,
        payload: Payload,
        group_ids: &[String],
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.calls.lock().unwrap().push((payload, group_ids.to_vec()));
        Ok(())
    }
}

/// Destination that fails on every call.
pub struct FailingDestination;

impl Destination for FailingDestination {
    fn call(
        &self,
        _logger: &Logger,
        _payload: Payload,
        _group_ids: &[String],
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        Err("destination exploded".into())
    }
}

/// Parse one JSON log line back into an ordered payload map.
pub fn parse_line(line: &str) -> Payload {
    serde_json::from_str(line.trim_end()).unwrap()
}

pub fn keys(payload: &Payload) -> Vec<String> {
    payload.keys().cloned().collect()
}

pub fn is_group_id(s: &str) -> bool {
    s.len() == 8 && s.bytes().all(|b| b.is_ascii_hexdigit())
}
