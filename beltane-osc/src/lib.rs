//! # beltane-osc
//!
//! Realtime-safe codec between OSC 1.0 wire packets and the Beltane atom
//! representation, for use at the I/O boundary of an audio plugin event bus.
//!
//! The wire side is byte-exact OSC: big-endian fields, NUL-terminated
//! strings, everything padded to four bytes, bundles nesting freely. The
//! structured side is an atom tree: a message is an object carrying its path
//! and an arguments tuple, a bundle an object carrying its timetag and an
//! items tuple.
//!
//! Reading is zero-copy ([`PacketRef`]); writing is append-only through the
//! wire [`Mold`] or the structured [`OscForge`], both of which keep nested
//! container sizes consistent through a frame stack and never allocate. The
//! two codec directions, [`deserialize_packet`] and [`serialize_packet`],
//! are built from those pieces and run to completion or fail with an
//! [`OscError`], leaving any partial output for the caller to discard.
//!
//! URIs are resolved to process-local ids once, at registry construction
//! ([`OscUrids::map`]); the hot path never touches the host mapper except to
//! resolve symbol arguments.

mod arg;
mod deserialize;
mod error;
mod forge;
mod mold;
mod read;
mod serialize;
mod urids;

pub use arg::{Arg, ArgTag, Timestamp};
pub use deserialize::{
    deserialize_bundle, deserialize_message, deserialize_packet, deserialize_packet_ref,
};
pub use error::OscError;
pub use forge::{OscForge, OscFrame};
pub use mold::{Mold, MoldFrame};
pub use read::{
    format_is_valid, path_is_valid, ArgIter, BundleRef, ItemIter, MessageRef, PacketRef,
    BUNDLE_HEADER, MAX_NESTING,
};
pub use serialize::{serialize_bundle, serialize_message, serialize_packet, serialize_packet_to};
pub use urids::{uris, OscUrids};
