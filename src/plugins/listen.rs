//! TCP listener source
//!
//! Blocking socket server taking one connection at a time; each read of up
//! to 1024 bytes becomes a byte envelope. Supports the responder capability:
//! decoder responses are written back to the connected client followed by
//! CRLF. Runs forever; the pipeline ends only on a fatal error.

use crate::envelope::Envelope;
use crate::error::{Error, Result};
use crate::plugin::{EnvelopeHandler, PluginConfig, Responder, Source};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

pub struct Listen {
    host: String,
    port: u16,
    // Socket of the currently connected client, shared with the responder.
    client: Arc<Mutex<Option<TcpStream>>>,
}

impl Listen {
    pub fn boxed(config: PluginConfig) -> Result<Box<dyn Source>> {
        Ok(Box::new(Self {
            host: config.get_or("host", "0.0.0.0").to_string(),
            port: config.get_parse("port", 22222)?,
            client: Arc::new(Mutex::new(None)),
        }))
    }

    fn set_client(&self, stream: Option<TcpStream>) -> Result<()> {
        let mut guard = self
            .client
            .lock()
            .map_err(|_| Error::Plugin("client socket lock poisoned".into()))?;
        *guard = stream;
        Ok(())
    }
}

impl Source for Listen {
    fn run(&mut self, handler: &mut dyn EnvelopeHandler) -> Result<()> {
        let listener = TcpListener::bind((self.host.as_str(), self.port))
            .map_err(|e| Error::Plugin(format!("could not bind {}:{}: {}", self.host, self.port, e)))?;
        info!("Listening on {}:{}", self.host, self.port);

        loop {
            let (mut stream, peer) = listener.accept()?;
            info!("Accepted connection from {}", peer);
            self.set_client(Some(stream.try_clone()?))?;

            let mut buf = [0u8; 1024];
            loop {
                let n = stream.read(&mut buf)?;
                if n == 0 {
                    break;
                }
                handler.on_envelope(Envelope::Bytes(buf[..n].to_vec()))?;
            }
            debug!("Connection from {} closed", peer);
            self.set_client(None)?;
        }
    }

    fn responder(&self) -> Option<Responder> {
        let client = Arc::clone(&self.client);
        Some(Box::new(move |response: &Envelope| {
            let mut guard = client
                .lock()
                .map_err(|_| Error::Plugin("client socket lock poisoned".into()))?;
            match guard.as_mut() {
                Some(stream) => {
                    debug!("Sending response: {}", response);
                    stream.write_all(&response.bytes())?;
                    stream.write_all(b"\r\n")?;
                    Ok(())
                }
                None => {
                    warn!("No client connected, dropping response");
                    Ok(())
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn responder_without_client_drops_response() {
        let source = Listen::boxed(PluginConfig::default()).unwrap();
        let mut respond = source.responder().expect("listen supports responses");
        assert!(respond(&Envelope::Text("ack".into())).is_ok());
    }

    #[test]
    fn bad_port_is_a_config_error() {
        let config = PluginConfig::from_pairs(&[("port", "notaport")]);
        assert!(Listen::boxed(config).is_err());
    }
}
