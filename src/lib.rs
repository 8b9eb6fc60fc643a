//! Ingestion core for the scheduling-availability dashboard.
//!
//! Pipeline: [`fetch`] pulls header+row data from a Google Sheet (structured
//! API first, public CSV export as fallback), [`parse`] handles the delimited
//! fallback wire format, [`normalize`] maps inconsistent column names onto
//! typed records and classifies them, and [`compare`] / [`benchmark`] derive
//! alerts and peer standings from the normalized sets.
//!
//! Everything past the fetcher is a pure function over in-memory values; the
//! core keeps no cross-call state and leaves persistence, retries and
//! scheduling to the caller.

pub mod benchmark;
pub mod classify;
pub mod compare;
pub mod fetch;
pub mod normalize;
pub mod parse;
pub mod record;
