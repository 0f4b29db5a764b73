//! URI ↔ URID mapping.
//!
//! Atoms carry their type as a process-local integer id (a URID) obtained by
//! mapping a URI through the host. The map is consulted once, at
//! initialisation time; after that every type check is an integer compare.

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::RwLock;

/// A URI mapped to a process-local integer id. Zero is never a valid URID;
/// atom type fields use the raw `u32` form, where 0 marks the untyped atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Urid(NonZeroU32);

impl Urid {
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl std::fmt::Display for Urid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Host capability: map a URI to a URID.
///
/// Implementations must not block if the caller is on a realtime thread; the
/// codec only calls this during initialisation and for symbol arguments.
pub trait UridMap {
    fn map(&self, uri: &str) -> Option<Urid>;
}

/// Host capability: resolve a URID back to its URI.
pub trait UridUnmap {
    fn unmap(&self, urid: Urid) -> Option<&str>;
}

/// In-memory interning map for hosts and tests.
///
/// URIs live for the lifetime of the process (they are leaked on first
/// intern), so `unmap` hands out `&str` without allocating. Interning itself
/// takes a write lock and allocates; do it off the audio thread.
#[derive(Default)]
pub struct MemoryMap {
    inner: RwLock<MemoryMapInner>,
}

#[derive(Default)]
struct MemoryMapInner {
    by_uri: HashMap<&'static str, Urid>,
    by_id: Vec<&'static str>,
}

impl MemoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of interned URIs.
    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.by_id.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl UridMap for MemoryMap {
    fn map(&self, uri: &str) -> Option<Urid> {
        if uri.is_empty() {
            return None;
        }
        if let Some(&id) = self.inner.read().ok()?.by_uri.get(uri) {
            return Some(id);
        }
        let mut inner = self.inner.write().ok()?;
        // Racing mappers may have interned it between the locks.
        if let Some(&id) = inner.by_uri.get(uri) {
            return Some(id);
        }
        let interned: &'static str = Box::leak(uri.to_owned().into_boxed_str());
        inner.by_id.push(interned);
        let id = Urid::new(inner.by_id.len() as u32)?;
        inner.by_uri.insert(interned, id);
        log::trace!(target: "atom::urid", "interned <{uri}> as {id}");
        Some(id)
    }
}

impl UridUnmap for MemoryMap {
    fn unmap(&self, urid: Urid) -> Option<&str> {
        let inner = self.inner.read().ok()?;
        inner.by_id.get(urid.get() as usize - 1).copied()
    }
}

/// URIs of the primitive atom types.
pub mod uris {
    pub const ATOM_URI: &str = "http://lv2plug.in/ns/ext/atom";
    pub const ATOM_PREFIX: &str = "http://lv2plug.in/ns/ext/atom#";

    pub const INT: &str = "http://lv2plug.in/ns/ext/atom#Int";
    pub const LONG: &str = "http://lv2plug.in/ns/ext/atom#Long";
    pub const FLOAT: &str = "http://lv2plug.in/ns/ext/atom#Float";
    pub const DOUBLE: &str = "http://lv2plug.in/ns/ext/atom#Double";
    pub const BOOL: &str = "http://lv2plug.in/ns/ext/atom#Bool";
    pub const URID: &str = "http://lv2plug.in/ns/ext/atom#URID";
    pub const STRING: &str = "http://lv2plug.in/ns/ext/atom#String";
    pub const CHUNK: &str = "http://lv2plug.in/ns/ext/atom#Chunk";
    pub const IMPULSE: &str = "http://lv2plug.in/ns/ext/atom#Impulse";
    pub const TUPLE: &str = "http://lv2plug.in/ns/ext/atom#Tuple";
    pub const OBJECT: &str = "http://lv2plug.in/ns/ext/atom#Object";
}

/// Cached URIDs of the primitive atom types, mapped once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtomUrids {
    pub int: Urid,
    pub long: Urid,
    pub float: Urid,
    pub double: Urid,
    pub bool_: Urid,
    pub urid: Urid,
    pub string: Urid,
    pub chunk: Urid,
    pub impulse: Urid,
    pub tuple: Urid,
    pub object: Urid,
}

impl AtomUrids {
    /// Map the primitive type vocabulary. `None` if the host refuses a URI.
    pub fn map(map: &dyn UridMap) -> Option<Self> {
        Some(Self {
            int: map.map(uris::INT)?,
            long: map.map(uris::LONG)?,
            float: map.map(uris::FLOAT)?,
            double: map.map(uris::DOUBLE)?,
            bool_: map.map(uris::BOOL)?,
            urid: map.map(uris::URID)?,
            string: map.map(uris::STRING)?,
            chunk: map.map(uris::CHUNK)?,
            impulse: map.map(uris::IMPULSE)?,
            tuple: map.map(uris::TUPLE)?,
            object: map.map(uris::OBJECT)?,
        })
    }
}
