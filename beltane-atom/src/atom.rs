//! The atom byte format and zero-copy readers.
//!
//! An atom is an 8-byte host-endian header `{ size: u32, type: u32 }`
//! followed by `size` body bytes, zero-padded to the next multiple of four.
//! `type` is a URID, or 0 for the untyped nil atom. Containers nest by
//! concatenation: a tuple body is a run of padded atoms, an object body is
//! `{ id: u32, otype: u32 }` followed by `{ key: u32 }` + padded value atom
//! properties.
//!
//! Readers borrow straight out of the caller's buffer and never panic on
//! malformed input; a bad header or truncated body reads as `None` or ends
//! the iteration.

use crate::urid::{AtomUrids, Urid};

/// Size of the atom header in bytes.
pub const HEADER_SIZE: usize = 8;

/// Round `size` up to the next multiple of four.
pub const fn pad_size(size: usize) -> usize {
    (size + 3) & !3
}

fn u32_ne(bytes: &[u8]) -> Option<u32> {
    Some(u32::from_ne_bytes(bytes.get(..4)?.try_into().ok()?))
}

/// A borrowed view of one atom: its type URID (raw, 0 = untyped) and body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtomRef<'a> {
    ty: u32,
    body: &'a [u8],
}

impl<'a> AtomRef<'a> {
    /// Read the atom at the start of `buf`. Returns the atom and the buffer
    /// remainder past the padded body, or `None` if the header or body does
    /// not fit.
    pub fn read(buf: &'a [u8]) -> Option<(AtomRef<'a>, &'a [u8])> {
        if buf.len() < HEADER_SIZE {
            return None;
        }
        let size = u32_ne(buf)? as usize;
        let ty = u32_ne(&buf[4..])?;
        let body_end = HEADER_SIZE.checked_add(size)?;
        if buf.len() < body_end {
            return None;
        }
        let atom = AtomRef {
            ty,
            body: &buf[HEADER_SIZE..body_end],
        };
        let next = pad_size(body_end).min(buf.len());
        Some((atom, &buf[next..]))
    }

    pub fn ty(&self) -> u32 {
        self.ty
    }

    pub fn size(&self) -> u32 {
        self.body.len() as u32
    }

    pub fn body(&self) -> &'a [u8] {
        self.body
    }

    /// The untyped zero-sized atom.
    pub fn is_nil(&self) -> bool {
        self.ty == 0 && self.body.is_empty()
    }

    pub fn as_i32(&self) -> Option<i32> {
        Some(i32::from_ne_bytes(self.body.get(..4)?.try_into().ok()?))
    }

    pub fn as_i64(&self) -> Option<i64> {
        Some(i64::from_ne_bytes(self.body.get(..8)?.try_into().ok()?))
    }

    pub fn as_f32(&self) -> Option<f32> {
        Some(f32::from_ne_bytes(self.body.get(..4)?.try_into().ok()?))
    }

    pub fn as_f64(&self) -> Option<f64> {
        Some(f64::from_ne_bytes(self.body.get(..8)?.try_into().ok()?))
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_i32().map(|v| v != 0)
    }

    pub fn as_urid(&self) -> Option<Urid> {
        Urid::new(u32_ne(self.body)?)
    }

    /// String body without its NUL terminator.
    pub fn as_str(&self) -> Option<&'a str> {
        let bytes = self.body.strip_suffix(&[0])?;
        std::str::from_utf8(bytes).ok()
    }

    /// Iterate the body as a tuple, checking the type first.
    pub fn tuple(&self, urids: &AtomUrids) -> Option<TupleIter<'a>> {
        if self.ty != urids.tuple.get() {
            return None;
        }
        Some(TupleIter { rest: self.body })
    }

    /// View the body as an object, checking the type first.
    pub fn object(&self, urids: &AtomUrids) -> Option<ObjectRef<'a>> {
        if self.ty != urids.object.get() {
            return None;
        }
        let id = u32_ne(self.body)?;
        let otype = u32_ne(self.body.get(4..)?)?;
        Some(ObjectRef {
            id,
            otype,
            props: &self.body[8..],
        })
    }
}

/// Iterator over the atoms of a tuple body. Ends early on malformed input.
#[derive(Debug, Clone)]
pub struct TupleIter<'a> {
    rest: &'a [u8],
}

impl<'a> Iterator for TupleIter<'a> {
    type Item = AtomRef<'a>;

    fn next(&mut self) -> Option<AtomRef<'a>> {
        if self.rest.is_empty() {
            return None;
        }
        let (atom, rest) = AtomRef::read(self.rest)?;
        self.rest = rest;
        Some(atom)
    }
}

/// A borrowed view of an object body: subject id, object type, properties.
#[derive(Debug, Clone, Copy)]
pub struct ObjectRef<'a> {
    id: u32,
    otype: u32,
    props: &'a [u8],
}

impl<'a> ObjectRef<'a> {
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn otype(&self) -> u32 {
        self.otype
    }

    /// Iterate `(key, value)` properties in write order.
    pub fn props(&self) -> PropIter<'a> {
        PropIter { rest: self.props }
    }

    /// First property value stored under `key`.
    pub fn get(&self, key: Urid) -> Option<AtomRef<'a>> {
        self.props()
            .find(|(k, _)| *k == key.get())
            .map(|(_, value)| value)
    }
}

/// Iterator over object properties. Ends early on malformed input.
#[derive(Debug, Clone)]
pub struct PropIter<'a> {
    rest: &'a [u8],
}

impl<'a> Iterator for PropIter<'a> {
    type Item = (u32, AtomRef<'a>);

    fn next(&mut self) -> Option<(u32, AtomRef<'a>)> {
        if self.rest.is_empty() {
            return None;
        }
        let key = u32_ne(self.rest)?;
        let (value, rest) = AtomRef::read(self.rest.get(4..)?)?;
        self.rest = rest;
        Some((key, value))
    }
}
