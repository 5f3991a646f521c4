//! Pipeline orchestrator
//!
//! Owns one source, an ordered transform chain, and a set of sinks, and
//! drives the push-style data flow between them. Per envelope the flow is
//! strictly sequential:
//!
//! 1. Fan the envelope, unmodified, to every sink's `handle_raw`. This
//!    happens unconditionally; raw observability does not depend on decode
//!    success.
//! 2. Walk the transform chain in order. Each successful, non-empty stage
//!    result fans out to every sink's `handle_decoded` before becoming the
//!    next stage's input, so every intermediate stage dispatches, not only
//!    the final one. A `Drop` or empty result ends the chain for this
//!    envelope. A recoverable decode error is logged and skips the rest of
//!    the chain for this envelope only; any other error is fatal.
//! 3. A response set by a transform is forwarded to the source right after
//!    that stage, and silently ignored when the source has no responder.
//!
//! There is no scheduling, backpressure, or internal concurrency: a slow
//! sink blocks the source's production loop.

use crate::config::ConfigStore;
use crate::error::Result;
use crate::plugin::{Decoded, EnvelopeHandler, PluginConfig, Responder, Sink, Source, Transform};
use crate::registry::Registry;
use crate::Envelope;
use tracing::{debug, error, warn};

/// An assembled pipeline, exclusive owner of its plugin instances.
///
/// Plugin trait objects are not `Debug`, so only the shape is reported.
pub struct Pipeline {
    source: Option<Box<dyn Source>>,
    responder: Option<Responder>,
    transforms: Vec<Box<dyn Transform>>,
    sinks: Vec<Box<dyn Sink>>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("source", &self.source.is_some())
            .field("responder", &self.responder.is_some())
            .field("transforms", &self.transforms.len())
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl Pipeline {
    /// Wire a pipeline from already-constructed plugins.
    ///
    /// The source's optional response capability is probed here, once, so
    /// the data path never has to ask again.
    pub fn new(
        source: Box<dyn Source>,
        transforms: Vec<Box<dyn Transform>>,
        sinks: Vec<Box<dyn Sink>>,
    ) -> Self {
        let responder = source.responder();
        Self {
            source: Some(source),
            responder,
            transforms,
            sinks,
        }
    }

    /// Assemble a pipeline from configuration.
    ///
    /// Reads `plugins.input` (single name), `plugins.decode` (comma list,
    /// empty means identity pass-through) and `plugins.output` (comma
    /// list). Each plugin's config section receives the effective process
    /// log level under `loglevel`, overwriting any user-set value, before
    /// the section is handed to the plugin constructor.
    pub fn from_config(
        store: &mut ConfigStore,
        registry: &Registry,
        loglevel: &str,
    ) -> Result<Self> {
        let input_name = store.get("plugins", "input")?.trim().to_string();
        debug!("Configured input plugin: {}", input_name);
        let source = registry.resolve_source(&input_name, plugin_config(store, &input_name, loglevel))?;

        let mut transforms = Vec::new();
        for name in split_list(store.get("plugins", "decode")?) {
            debug!("Configured decode plugin: {}", name);
            let config = plugin_config(store, &name, loglevel);
            transforms.push(registry.resolve_transform(&name, config)?);
        }

        let mut sinks = Vec::new();
        for name in split_list(store.get("plugins", "output")?) {
            debug!("Configured output plugin: {}", name);
            let config = plugin_config(store, &name, loglevel);
            sinks.push(registry.resolve_sink(&name, config)?);
        }
        if sinks.is_empty() {
            warn!("No output plugins configured");
        }

        Ok(Self::new(source, transforms, sinks))
    }

    /// Delegate control to the source's run loop.
    ///
    /// Blocks until the source has no more data or a fatal error
    /// propagates. The orchestrator is purely reactive; every callback runs
    /// on the calling thread before the source may produce the next item.
    pub fn run(&mut self) -> Result<()> {
        let mut source = match self.source.take() {
            Some(source) => source,
            None => {
                return Err(crate::error::Error::Plugin(
                    "pipeline source already consumed".into(),
                ))
            }
        };
        let mut dispatch = Dispatch {
            transforms: &mut self.transforms,
            sinks: &mut self.sinks,
            responder: &mut self.responder,
        };
        let result = source.run(&mut dispatch);
        self.source = Some(source);
        result
    }
}

/// The per-envelope data path, handed to the source as its callback.
struct Dispatch<'a> {
    transforms: &'a mut Vec<Box<dyn Transform>>,
    sinks: &'a mut Vec<Box<dyn Sink>>,
    responder: &'a mut Option<Responder>,
}

fn fan_out_decoded(sinks: &mut [Box<dyn Sink>], envelope: &Envelope) -> Result<()> {
    for sink in sinks.iter_mut() {
        sink.handle_decoded(envelope)?;
    }
    Ok(())
}

impl EnvelopeHandler for Dispatch<'_> {
    fn on_envelope(&mut self, envelope: Envelope) -> Result<()> {
        // Raw fan-out first, regardless of what decoding does later.
        for sink in self.sinks.iter_mut() {
            sink.handle_raw(&envelope)?;
        }

        let mut current = envelope;
        for transform in self.transforms.iter_mut() {
            let step = match transform.decode(current) {
                Ok(step) => step,
                Err(e) if e.is_recoverable() => {
                    error!("{}", e);
                    return Ok(());
                }
                Err(e) => {
                    error!("{}", e);
                    return Err(e);
                }
            };

            if let Some(response) = transform.take_response() {
                match self.responder.as_mut() {
                    Some(respond) => respond(&response)?,
                    // Source does not accept responses; not an error.
                    None => debug!("Dropping response, source has no responder"),
                }
            }

            match step {
                Decoded::Continue(next) if !next.is_empty() => {
                    fan_out_decoded(self.sinks, &next)?;
                    current = next;
                }
                // Dropped, or replaced with an empty value: chain ends here.
                _ => return Ok(()),
            }
        }
        Ok(())
    }
}

/// Section snapshot for a plugin, with the effective log level injected
/// after user config so plugins can size their own verbosity.
fn plugin_config(store: &mut ConfigStore, name: &str, loglevel: &str) -> PluginConfig {
    store.ensure_section(name);
    store.set(name, "loglevel", loglevel);
    PluginConfig::new(store.section(name))
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_list_trims_and_drops_empties() {
        assert_eq!(split_list("noop, uppercase"), vec!["noop", "uppercase"]);
        assert_eq!(split_list(""), Vec::<String>::new());
        assert_eq!(split_list("a,,b,"), vec!["a", "b"]);
    }

    #[test]
    fn loglevel_injection_overwrites_user_value() {
        let mut store = ConfigStore::load(None);
        store.set("fileread", "loglevel", "trace");
        let config = plugin_config(&mut store, "fileread", "info");
        assert_eq!(config.get("loglevel"), Some("info"));
        assert_eq!(store.get("fileread", "loglevel").unwrap(), "info");
    }

    #[test]
    fn source_is_restored_between_runs() {
        struct Once;
        impl Source for Once {
            fn run(&mut self, _handler: &mut dyn EnvelopeHandler) -> Result<()> {
                Ok(())
            }
        }
        let mut pipeline = Pipeline::new(Box::new(Once), Vec::new(), Vec::new());
        assert!(pipeline.run().is_ok());
        // The source is restored after a run, so a second run also works.
        assert!(pipeline.run().is_ok());
    }
}
