//! Event and environment collaborator interfaces

use std::collections::HashMap;

use crate::detector::source::SourceIdentity;
use super::config::DetectorConfig;
use super::payload::RawPayload;

/// One event: typed payloads addressed by (source, key)
pub trait Event {
    fn get(&self, source: &SourceIdentity, key: &str) -> Option<&RawPayload>;
}

/// Run-level environment of the data stream
pub trait Environment {
    fn run(&self) -> i32;
    fn calib_dir(&self) -> &str;
    fn instrument(&self) -> &str;
    fn config(&self, source: &SourceIdentity) -> Option<&DetectorConfig>;
}

/// Everything an extraction strategy may consult for one query
#[derive(Clone, Copy)]
pub struct PayloadLookup<'a> {
    pub evt: &'a dyn Event,
    pub env: &'a dyn Environment,
    pub key: &'a str,
}

impl<'a> PayloadLookup<'a> {
    pub fn new(evt: &'a dyn Event, env: &'a dyn Environment, key: &'a str) -> Self {
        PayloadLookup { evt, env, key }
    }

    pub fn payload(&self, source: &SourceIdentity) -> Option<&'a RawPayload> {
        self.evt.get(source, self.key)
    }

    pub fn config(&self, source: &SourceIdentity) -> Option<&'a DetectorConfig> {
        self.env.config(source)
    }
}

/// In-memory event
#[derive(Debug, Default, Clone)]
pub struct MemoryEvent {
    payloads: HashMap<(String, String), RawPayload>,
}

impl MemoryEvent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a payload under the empty key
    pub fn insert(&mut self, source: &SourceIdentity, payload: RawPayload) {
        self.insert_with_key(source, "", payload);
    }

    pub fn insert_with_key(&mut self, source: &SourceIdentity, key: &str, payload: RawPayload) {
        self.payloads.insert((source.as_str().to_string(), key.to_string()), payload);
    }

    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }
}

impl Event for MemoryEvent {
    fn get(&self, source: &SourceIdentity, key: &str) -> Option<&RawPayload> {
        self.payloads.get(&(source.as_str().to_string(), key.to_string()))
    }
}

/// In-memory environment
#[derive(Debug, Clone)]
pub struct MemoryEnv {
    run: i32,
    calib_dir: String,
    instrument: String,
    configs: HashMap<String, DetectorConfig>,
}

impl MemoryEnv {
    pub fn new(run: i32, calib_dir: &str, instrument: &str) -> Self {
        MemoryEnv {
            run,
            calib_dir: calib_dir.to_string(),
            instrument: instrument.to_string(),
            configs: HashMap::new(),
        }
    }

    pub fn set_run(&mut self, run: i32) {
        self.run = run;
    }

    pub fn set_calib_dir(&mut self, calib_dir: &str) {
        self.calib_dir = calib_dir.to_string();
    }

    pub fn insert_config(&mut self, source: &SourceIdentity, config: DetectorConfig) {
        self.configs.insert(source.as_str().to_string(), config);
    }
}

impl Environment for MemoryEnv {
    fn run(&self) -> i32 {
        self.run
    }

    fn calib_dir(&self) -> &str {
        &self.calib_dir
    }

    fn instrument(&self) -> &str {
        &self.instrument
    }

    fn config(&self, source: &SourceIdentity) -> Option<&DetectorConfig> {
        self.configs.get(source.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::NdArray;
    use crate::event::payload::EpixElement;

    #[test]
    fn lookup_uses_canonical_source_and_key() {
        let src = SourceIdentity::new("DetInfo(XcsEndstation.0:Epix100a.1)");
        let mut evt = MemoryEvent::new();
        let payload = RawPayload::Epix(EpixElement {
            frame_number: 1,
            acq_count: 0,
            data: NdArray::filled([2, 2], 5u16),
        });
        evt.insert_with_key(&src, "calib", payload);

        let env = MemoryEnv::new(12, "/tmp/calib", "XCS");
        let plain = SourceIdentity::new("XcsEndstation.0:Epix100a.1");

        assert!(PayloadLookup::new(&evt, &env, "calib").payload(&plain).is_some());
        assert!(PayloadLookup::new(&evt, &env, "").payload(&plain).is_none());
    }
}
