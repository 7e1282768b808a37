//! Relay gateway for the banknote ledger.
//!
//! Turns bill attributes into a content hash and registers it against the
//! issued-serial registry, idempotently: a serial that is already issued, or
//! that loses a concurrent registration race, is reported back as
//! `already: true` instead of failing.

pub mod config;
pub mod error;
pub mod gateway;
pub mod handler;
pub mod router;
pub mod server;

pub use config::GatewayConfig;
pub use error::{GatewayError, GatewayResult};
pub use gateway::{LedgerGateway, Registration};
pub use router::{build_router, AppState};
pub use server::GatewayServer;
