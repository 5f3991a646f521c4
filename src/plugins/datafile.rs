//! File-writing sink
//!
//! Appends hex-encoded raw envelopes and pretty-printed decoded payloads to
//! timestamp-named files under the configured directories. Files open at
//! construction time; failure there is fatal, a pipeline without its capture
//! files should not start.

use crate::envelope::Envelope;
use crate::error::{Error, Result};
use crate::plugin::{PluginConfig, Sink};
use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct Datafile {
    raw_file: File,
    decoded_file: File,
}

impl Datafile {
    pub fn boxed(config: PluginConfig) -> Result<Box<dyn Sink>> {
        let raw_path = timestamped_path(
            config.get_or("raw_data_dir", "/var/lib/flowpipe/raw"),
            config.get_or("raw_data_strftime", "%Y%m%d%H%M%S.raw"),
        );
        let decoded_path = timestamped_path(
            config.get_or("decoded_data_dir", "/var/lib/flowpipe/decoded"),
            config.get_or("decoded_data_strftime", "%Y%m%d%H%M%S.data"),
        );
        info!(
            "Writing raw data to {}, decoded data to {}",
            raw_path.display(),
            decoded_path.display()
        );
        Ok(Box::new(Self {
            raw_file: open_append(&raw_path)
                .map_err(|e| Error::Plugin(format!("cannot open raw data file: {}", e)))?,
            decoded_file: open_append(&decoded_path)
                .map_err(|e| Error::Plugin(format!("cannot open decoded data file: {}", e)))?,
        }))
    }
}

fn timestamped_path(dir: &str, pattern: &str) -> PathBuf {
    Path::new(dir).join(Local::now().format(pattern).to_string())
}

fn open_append(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

impl Sink for Datafile {
    fn handle_raw(&mut self, envelope: &Envelope) -> Result<()> {
        debug!("Handling raw data");
        writeln!(self.raw_file, "{}", hex::encode(envelope.bytes()))?;
        self.raw_file.flush()?;
        Ok(())
    }

    fn handle_decoded(&mut self, envelope: &Envelope) -> Result<()> {
        debug!("Handling decoded data");
        match envelope {
            Envelope::Record(value) => {
                let pretty = serde_json::to_string_pretty(value)
                    .map_err(|e| Error::Plugin(format!("could not render record: {}", e)))?;
                writeln!(self.decoded_file, "{}", pretty)?;
            }
            other => writeln!(self.decoded_file, "{}", other)?,
        }
        self.decoded_file.flush()?;
        Ok(())
    }
}
