//! Output parsers: free-form tool text in, canonical metrics out.
//!
//! Parsers never consult exit codes and never fail; a pattern that is absent
//! resolves to a neutral default (zero, None, empty list).

pub mod docker;
pub mod terraform;
pub mod test_report;
