//! Wiring for the `worksphere` command-line portal: configuration,
//! logging, the shared session and the service clients built from them.

pub mod context;
pub mod logging;
pub mod output;

pub use context::Portal;
pub use output::TerminalNotifier;

#[cfg(test)]
mod tests;
