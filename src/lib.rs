//! Class-admission policy for object-graph serializers.
//!
//! Decides, for every concrete type a binary serialization engine is about to
//! encode or decode, whether the type is trusted to cross the serialization
//! boundary. A blacklist has absolute precedence; after it, a type is
//! admitted by a force-allow entry, an inherited serialization marker, or the
//! session's whitelist, in that order.
//!
//! See `DESIGN.md` for the architecture and decision log.

#![forbid(unsafe_code)]

pub mod catalog;
pub mod config;
pub mod engine;
pub mod logging;
pub mod policy;
pub mod types;
