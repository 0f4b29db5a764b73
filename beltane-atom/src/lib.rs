//! # beltane-atom
//!
//! The structured half of the Beltane event bus: a compact, host-endian,
//! length-prefixed value format ("atoms") plus an append-only builder for
//! constructing atom trees in caller-owned memory.
//!
//! Atoms compose into tuples and keyed objects; types are process-local
//! integer ids (URIDs) obtained from the host's URI map. Reading is
//! zero-copy and panic-free; writing goes through [`AtomForge`], which never
//! allocates and never rewinds, so it is safe to run inside a realtime audio
//! callback against a plain buffer or a realtime-safe sink.

mod atom;
mod forge;
mod sink;
pub mod urid;

pub use atom::{pad_size, AtomRef, ObjectRef, PropIter, TupleIter, HEADER_SIZE};
pub use forge::{AtomForge, AtomFrame, ForgeError, MAX_DEPTH};
pub use sink::{Output, SinkRef, SinkWrite};
pub use urid::{AtomUrids, MemoryMap, Urid, UridMap, UridUnmap};
