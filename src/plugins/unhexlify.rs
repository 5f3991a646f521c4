//! Hex-decoding transform
//!
//! With `errors=halt` (the default) a malformed hex payload is fatal; with
//! `errors=ignore` it is logged and the envelope is dropped.

use crate::envelope::Envelope;
use crate::error::{Error, Result};
use crate::plugin::{Decoded, PluginConfig, Transform};
use tracing::{debug, warn};

pub struct Unhexlify {
    ignore_errors: bool,
}

impl Unhexlify {
    pub fn boxed(config: PluginConfig) -> Result<Box<dyn Transform>> {
        Ok(Box::new(Self {
            ignore_errors: config.get_or("errors", "halt") == "ignore",
        }))
    }
}

impl Transform for Unhexlify {
    fn decode(&mut self, envelope: Envelope) -> Result<Decoded> {
        debug!("Starting decode");
        let input = envelope.bytes();
        match hex::decode(input.as_ref()) {
            Ok(bytes) => Ok(Decoded::Continue(Envelope::Bytes(bytes))),
            Err(e) if self.ignore_errors => {
                warn!("Ignoring malformed hex payload: {}", e);
                Ok(Decoded::Drop)
            }
            Err(e) => Err(Error::Plugin(format!("invalid hex payload: {}", e))),
        }
    }
}
