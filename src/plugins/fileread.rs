//! File-reading source
//!
//! Emits the configured file line by line. Blank lines are skipped. With
//! `unhexlify=yes` each line is hex-decoded into a byte envelope; with
//! `follow=yes` the source keeps tailing the file after the initial pass,
//! polling every `follow_delay` seconds.

use crate::envelope::Envelope;
use crate::error::{Error, Result};
use crate::plugin::{EnvelopeHandler, PluginConfig, Source};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::time::Duration;
use tracing::{error, info};

pub struct Fileread {
    filename: Option<String>,
    unhexlify: bool,
    follow: bool,
    follow_delay: Duration,
}

impl Fileread {
    pub fn boxed(config: PluginConfig) -> Result<Box<dyn Source>> {
        Ok(Box::new(Self {
            filename: config.get("filename").map(String::from),
            unhexlify: config.get_flag("unhexlify", false),
            follow: config.get_flag("follow", false),
            follow_delay: Duration::from_secs(config.get_parse("follow_delay", 2)?),
        }))
    }

    fn emit_line(&self, line: &str, handler: &mut dyn EnvelopeHandler) -> Result<()> {
        let line = line.trim_end();
        if line.is_empty() {
            return Ok(());
        }
        let envelope = if self.unhexlify {
            let bytes = hex::decode(line)
                .map_err(|e| Error::Plugin(format!("invalid hex line in input file: {}", e)))?;
            Envelope::Bytes(bytes)
        } else {
            Envelope::Text(line.to_string())
        };
        handler.on_envelope(envelope)
    }
}

impl Source for Fileread {
    fn run(&mut self, handler: &mut dyn EnvelopeHandler) -> Result<()> {
        let Some(filename) = self.filename.clone() else {
            error!("No input file specified");
            return Ok(());
        };
        info!("Reading input file: {}", filename);
        let file = match File::open(&filename) {
            Ok(file) => file,
            Err(e) => {
                // Matches the established behavior: a missing input file is
                // reported but does not fail the process.
                error!("File not found: {}: {}", filename, e);
                return Ok(());
            }
        };

        let mut reader = BufReader::new(file);
        let mut line = String::new();
        loop {
            line.clear();
            let n = reader.read_line(&mut line)?;
            if n == 0 {
                if !self.follow {
                    break;
                }
                std::thread::sleep(self.follow_delay);
                continue;
            }
            self.emit_line(&line, handler)?;
        }
        Ok(())
    }
}
