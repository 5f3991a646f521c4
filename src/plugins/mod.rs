//! Built-in plugins
//!
//! All built-ins register in the root namespace; a config file addresses
//! them by their bare names (`fileread`, `noop`, `print`, ...).

pub mod counter;
pub mod datafile;
pub mod fileread;
pub mod hexlify;
pub mod listen;
pub mod noop;
pub mod print;
pub mod unhexlify;
pub mod uppercase;

use crate::registry::Registry;

/// Register every built-in plugin under its configured name.
pub fn register_builtins(registry: &mut Registry) {
    registry.register_source("fileread", fileread::Fileread::boxed);
    registry.register_source("listen", listen::Listen::boxed);

    registry.register_transform("noop", noop::Noop::boxed);
    registry.register_transform("hexlify", hexlify::Hexlify::boxed);
    registry.register_transform("unhexlify", unhexlify::Unhexlify::boxed);
    registry.register_transform("uppercase", uppercase::Uppercase::boxed);

    registry.register_sink("print", print::Print::boxed);
    registry.register_sink("counter", counter::Counter::boxed);
    registry.register_sink("datafile", datafile::Datafile::boxed);
}
