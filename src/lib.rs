//! PV energy → EV driving range and everyday "fun fact" equivalents.

/// Paginated dashboard card over published sensor states.
pub mod card;
pub mod config;
/// Demo PV source used when no real host is attached.
pub mod devices;
pub mod engine;
pub mod error;
/// Host-side entity store, subscriptions and state lookup.
pub mod host;
pub mod io;
pub mod logging;
pub mod replay;
pub mod sensor;
pub mod source;
#[cfg(feature = "tui")]
pub mod tui;
