//! Identity transform
//!
//! Passes the envelope through unchanged and sets a current-timestamp
//! response, exercising the response path for sources that accept one.

use crate::envelope::Envelope;
use crate::error::Result;
use crate::plugin::{Decoded, PluginConfig, Transform};
use chrono::Local;

#[derive(Default)]
pub struct Noop {
    response: Option<Envelope>,
}

impl Noop {
    pub fn boxed(_config: PluginConfig) -> Result<Box<dyn Transform>> {
        Ok(Box::new(Self::default()))
    }
}

impl Transform for Noop {
    fn decode(&mut self, envelope: Envelope) -> Result<Decoded> {
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        self.response = Some(Envelope::Text(stamp));
        Ok(Decoded::Continue(envelope))
    }

    fn take_response(&mut self) -> Option<Envelope> {
        self.response.take()
    }
}
