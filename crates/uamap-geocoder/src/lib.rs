pub mod client;
pub mod error;
pub mod pacer;
pub mod resolver;
pub mod types;

pub use client::NominatimClient;
pub use error::GeocodeError;
pub use pacer::{FixedIntervalPacer, NoopPacer, Pacer};
pub use resolver::{build_query, Resolution, Resolver};
