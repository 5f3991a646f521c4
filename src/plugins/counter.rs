//! Dispatch-counting sink
//!
//! Counts raw and decoded dispatches and logs the totals when the pipeline
//! tears down.

use crate::envelope::Envelope;
use crate::error::Result;
use crate::plugin::{PluginConfig, Sink};
use tracing::{debug, info};

#[derive(Default)]
pub struct Counter {
    raw: u64,
    decoded: u64,
}

impl Counter {
    pub fn boxed(_config: PluginConfig) -> Result<Box<dyn Sink>> {
        Ok(Box::new(Self::default()))
    }

    pub fn raw_count(&self) -> u64 {
        self.raw
    }

    pub fn decoded_count(&self) -> u64 {
        self.decoded
    }
}

impl Sink for Counter {
    fn handle_raw(&mut self, _envelope: &Envelope) -> Result<()> {
        self.raw += 1;
        debug!("Raw dispatches: {}", self.raw);
        Ok(())
    }

    fn handle_decoded(&mut self, _envelope: &Envelope) -> Result<()> {
        self.decoded += 1;
        debug!("Decoded dispatches: {}", self.decoded);
        Ok(())
    }
}

impl Drop for Counter {
    fn drop(&mut self) {
        info!("Counter totals: {} raw, {} decoded", self.raw, self.decoded);
    }
}
