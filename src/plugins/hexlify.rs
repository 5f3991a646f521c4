//! Hex-encoding transform

use crate::envelope::Envelope;
use crate::error::Result;
use crate::plugin::{Decoded, PluginConfig, Transform};

pub struct Hexlify;

impl Hexlify {
    pub fn boxed(_config: PluginConfig) -> Result<Box<dyn Transform>> {
        Ok(Box::new(Self))
    }
}

impl Transform for Hexlify {
    fn decode(&mut self, envelope: Envelope) -> Result<Decoded> {
        Ok(Decoded::Continue(Envelope::Text(hex::encode(envelope.bytes()))))
    }
}
