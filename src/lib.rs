//! flowpipe - plugin-based data pipeline processor
//!
//! Resolves named plugin implementations from configuration, wires them into
//! a fixed three-stage topology (one source, an ordered chain of transforms,
//! a fan-out set of sinks), and drives a push-style data flow between them
//! with two-tier failure handling: recoverable decode errors skip a single
//! envelope, everything else tears the pipeline down.

pub mod config;
pub mod envelope;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod plugin;
pub mod plugins;
pub mod registry;

pub use config::ConfigStore;
pub use envelope::Envelope;
pub use error::{Error, Result};
pub use pipeline::Pipeline;
pub use plugin::{Decoded, EnvelopeHandler, PluginConfig, Responder, Sink, Source, Transform};
pub use registry::{PluginName, Registry};
