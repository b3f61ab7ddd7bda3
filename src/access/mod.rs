//! The tiered access-control mechanism: level hierarchy, share-link secrets,
//! effective-access resolution, and field filtering.

pub mod filter;
pub mod level;
pub mod resolver;
pub mod secret;
pub mod tokens;
