//! Plugin contract - the capability surface every plugin satisfies
//!
//! Three roles make up a pipeline: a [`Source`] produces envelopes and owns
//! the run loop, an ordered chain of [`Transform`]s decodes them, and a set
//! of [`Sink`]s consumes them. All callbacks execute synchronously on the
//! thread driving `Source::run`; plugin instances are never shared and are
//! not required to tolerate concurrent reentry.

use crate::envelope::Envelope;
use crate::error::Result;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Outcome of one transform step.
///
/// Modeled as an explicit sum rather than error signaling: `Drop` ends the
/// chain for the current envelope without being an error. Fatal and
/// recoverable failures travel through the `Result` wrapping this type.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// Continue the chain with this (possibly replaced) envelope.
    Continue(Envelope),
    /// Stop processing this envelope; the pipeline moves on to the next one.
    Drop,
}

/// Receiver for envelopes pushed out of a source's run loop.
pub trait EnvelopeHandler {
    /// Deliver one envelope to the pipeline. An error returned here is
    /// fatal and must stop the source's loop.
    fn on_envelope(&mut self, envelope: Envelope) -> Result<()>;
}

/// Handle through which a responsive source accepts decoder responses
/// while its run loop is executing.
pub type Responder = Box<dyn FnMut(&Envelope) -> Result<()>>;

/// Plugin role that produces envelopes and drives the run loop.
pub trait Source {
    /// Block and push envelopes into `handler` until the underlying input
    /// is exhausted or a fatal error propagates back.
    fn run(&mut self, handler: &mut dyn EnvelopeHandler) -> Result<()>;

    /// Sources that can route a transform response back to their origin
    /// return a handle here. Checked once at assembly time; fire-and-forget
    /// sources keep the default.
    fn responder(&self) -> Option<Responder> {
        None
    }
}

impl std::fmt::Debug for dyn Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn Source")
    }
}

/// Plugin role that decodes envelopes, one at a time.
pub trait Transform {
    /// Decode one envelope.
    ///
    /// `Err(Error::Recoverable(_))` abandons the rest of the chain for this
    /// envelope only; any other error tears the pipeline down.
    fn decode(&mut self, envelope: Envelope) -> Result<Decoded>;

    /// Take the response produced by the most recent `decode`, if any.
    /// The orchestrator forwards it to the source at most once per step.
    fn take_response(&mut self) -> Option<Envelope> {
        None
    }
}

impl std::fmt::Debug for dyn Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn Transform")
    }
}

/// Plugin role that consumes envelopes with no return value.
pub trait Sink {
    /// Receive every envelope as emitted by the source, before any
    /// decoding. Default is to ignore raw data.
    fn handle_raw(&mut self, _envelope: &Envelope) -> Result<()> {
        Ok(())
    }

    /// Receive the output of each successful, non-empty transform stage.
    fn handle_decoded(&mut self, envelope: &Envelope) -> Result<()>;
}

/// Flat string-keyed configuration view handed to a plugin constructor.
///
/// Holds the plugin's config section merged with the orchestrator-injected
/// keys; plugin-declared defaults are supplied at the call sites via
/// [`PluginConfig::get_or`], so store values always win.
#[derive(Debug, Clone, Default)]
pub struct PluginConfig {
    values: BTreeMap<String, String>,
}

impl PluginConfig {
    pub fn new(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }

    /// Build a config from literal pairs; test and doc convenience.
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            values: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Configured value for `key`, or the plugin's default.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Boolean flags are spelled `yes`/`true` in config files.
    pub fn get_flag(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some(v) => matches!(v, "yes" | "true"),
            None => default,
        }
    }

    /// Parse a configured value, falling back to `default` when absent.
    /// A present but unparseable value is a configuration error.
    pub fn get_parse<T: FromStr>(&self, key: &str, default: T) -> Result<T> {
        match self.get(key) {
            Some(v) => v.parse().map_err(|_| {
                crate::error::Error::Config(format!("invalid value for {}: {}", key, v))
            }),
            None => Ok(default),
        }
    }
}
