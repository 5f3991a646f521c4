//! ASCII-uppercasing transform
//!
//! Uppercases text and byte envelopes; structured records pass through
//! unchanged.

use crate::envelope::Envelope;
use crate::error::Result;
use crate::plugin::{Decoded, PluginConfig, Transform};

pub struct Uppercase;

impl Uppercase {
    pub fn boxed(_config: PluginConfig) -> Result<Box<dyn Transform>> {
        Ok(Box::new(Self))
    }
}

impl Transform for Uppercase {
    fn decode(&mut self, envelope: Envelope) -> Result<Decoded> {
        let out = match envelope {
            Envelope::Text(t) => Envelope::Text(t.to_ascii_uppercase()),
            Envelope::Bytes(mut b) => {
                b.make_ascii_uppercase();
                Envelope::Bytes(b)
            }
            record @ Envelope::Record(_) => record,
        };
        Ok(Decoded::Continue(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn uppercases_text_and_bytes() {
        let mut uppercase = Uppercase;
        assert_eq!(
            uppercase.decode(Envelope::Text("hello".into())).unwrap(),
            Decoded::Continue(Envelope::Text("HELLO".into()))
        );
        assert_eq!(
            uppercase.decode(Envelope::Bytes(b"ab1".to_vec())).unwrap(),
            Decoded::Continue(Envelope::Bytes(b"AB1".to_vec()))
        );
    }

    #[test]
    fn records_pass_through() {
        let mut uppercase = Uppercase;
        let record = Envelope::Record(json!({"k": "v"}));
        assert_eq!(
            uppercase.decode(record.clone()).unwrap(),
            Decoded::Continue(record)
        );
    }
}
