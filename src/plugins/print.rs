//! Stdout sink
//!
//! Raw printing is gated by `print_raw` (default on), optionally hex-encoded
//! via `hexlify_raw`. Decoded records are pretty-printed; everything else
//! prints its display form.

use crate::envelope::Envelope;
use crate::error::{Error, Result};
use crate::plugin::{PluginConfig, Sink};
use tracing::debug;

pub struct Print {
    print_raw: bool,
    hexlify_raw: bool,
}

impl Print {
    pub fn boxed(config: PluginConfig) -> Result<Box<dyn Sink>> {
        Ok(Box::new(Self {
            print_raw: config.get_flag("print_raw", true),
            hexlify_raw: config.get_flag("hexlify_raw", false),
        }))
    }
}

impl Sink for Print {
    fn handle_raw(&mut self, envelope: &Envelope) -> Result<()> {
        if !self.print_raw {
            return Ok(());
        }
        debug!("Handling raw data");
        if self.hexlify_raw {
            println!("{}", hex::encode(envelope.bytes()));
        } else {
            println!("{}", envelope);
        }
        Ok(())
    }

    fn handle_decoded(&mut self, envelope: &Envelope) -> Result<()> {
        match envelope {
            Envelope::Record(value) => {
                let pretty = serde_json::to_string_pretty(value)
                    .map_err(|e| Error::Plugin(format!("could not render record: {}", e)))?;
                println!("{}", pretty);
            }
            other => println!("{}", other),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flags_default_to_printing_raw_unhexed() {
        // Only exercising the dispatch path; output goes to stdout.
        let mut print = Print::boxed(PluginConfig::default()).unwrap();
        assert!(print.handle_raw(&Envelope::Text("x".into())).is_ok());
        assert!(print.handle_decoded(&Envelope::Record(json!({"a": 1}))).is_ok());
    }

    #[test]
    fn print_raw_can_be_disabled() {
        let config = PluginConfig::from_pairs(&[("print_raw", "no")]);
        let mut print = Print::boxed(config).unwrap();
        assert!(print.handle_raw(&Envelope::Bytes(vec![0xff])).is_ok());
    }
}
