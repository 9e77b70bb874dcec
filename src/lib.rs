//! # Simple and type-safe client for the Hetzner DNS API.
//!
//! Implements a blocking client for creating, listing and fetching zones and
//! records of the [Hetzner DNS API]. Every call is exactly one request; nothing
//! is cached or retried.
//!
//! ## Examples
//!
//! ```no_run
//! use hetzner_dns::{Client, Context};
//! use hetzner_dns::record::ListRecordsOptions;
//!
//! let client = Client::new("<TOKEN>").unwrap();
//! let ctx = Context::background();
//!
//! let zone = client.create_zone(&ctx, "example.com", 86400).unwrap();
//! let records = client
//!     .get_records(
//!         &ctx,
//!         &ListRecordsOptions {
//!             zone_id: zone.id.clone(),
//!             ..Default::default()
//!         },
//!     )
//!     .unwrap();
//! ```
//!
//! ## Errors
//!
//! Every failure is returned as a [ClientError]. A `406 Not Acceptable`
//! answer means this crate built a malformed request; it is returned like any
//! other error, but [ClientError::is_fatal] reports it so the application
//! can decide to abort.
//!
//! [Hetzner DNS API]: https://dns.hetzner.com/api-docs

mod client;
mod context;
mod errors;
mod payload;
mod query;
pub mod record;
pub mod transport;
mod utils;
pub mod zone;

pub use client::*;
pub use context::*;
pub use errors::*;
pub(crate) use payload::*;
