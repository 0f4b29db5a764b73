//! Append-only OSC wire writer.
//!
//! The mold is the wire-side twin of the atom forge: it appends big-endian
//! OSC bytes to a buffer or streaming sink and keeps every open bundle
//! item's size field consistent through a frame stack. Opening an item
//! writes a zero size word and pushes a frame; every subsequent write grows
//! all open size words in place, so closing an item is just a pop.
//!
//! A write past capacity latches the region full (see
//! [`beltane_atom::Output`]); the caller unwinds its frames and discards the
//! packet.

use beltane_atom::{pad_size, Output, SinkRef, SinkWrite, Urid, UridUnmap};

use crate::arg::Timestamp;
use crate::error::OscError;
use crate::read::{format_is_valid, path_is_valid, BUNDLE_HEADER, MAX_NESTING};

/// Token for an open bundle item. Move-only; give it back to
/// [`Mold::bundle_item_end`] in strict LIFO order.
#[derive(Debug)]
pub struct MoldFrame {
    at: SinkRef,
    depth: usize,
}

impl MoldFrame {
    /// Reference to the item's size word.
    pub fn position(&self) -> SinkRef {
        self.at
    }
}

/// Wire writer over a caller-owned output region.
pub struct Mold<'a> {
    out: Output<'a>,
    stack: [SinkRef; MAX_NESTING],
    depth: usize,
    unmap: &'a dyn UridUnmap,
}

impl<'a> Mold<'a> {
    pub fn buffer(buf: &'a mut [u8], unmap: &'a dyn UridUnmap) -> Self {
        Self::new(Output::buffer(buf), unmap)
    }

    pub fn stream(sink: &'a mut dyn SinkWrite, unmap: &'a dyn UridUnmap) -> Self {
        Self::new(Output::stream(sink), unmap)
    }

    fn new(out: Output<'a>, unmap: &'a dyn UridUnmap) -> Self {
        Self {
            out,
            stack: [0; MAX_NESTING],
            depth: 0,
            unmap,
        }
    }

    /// Total bytes written so far.
    pub fn written(&self) -> usize {
        self.out.written()
    }

    /// Number of currently open bundle items.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Append raw bytes, growing every open item's big-endian size word.
    pub(crate) fn raw(&mut self, data: &[u8]) -> Result<SinkRef, OscError> {
        let reference = self.out.raw(data).ok_or(OscError::Overflow)?;
        let grow = data.len() as u32;
        if grow > 0 {
            for i in 0..self.depth {
                if let Some(cell) = self.out.deref(self.stack[i]) {
                    let size = u32::from_be_bytes(*cell).wrapping_add(grow);
                    *cell = size.to_be_bytes();
                }
            }
        }
        Ok(reference)
    }

    /// Zero-pad to the next multiple of four after `written` bytes.
    pub(crate) fn pad(&mut self, written: usize) -> Result<(), OscError> {
        let pad = pad_size(written) - written;
        if pad > 0 {
            self.raw(&[0u8; 4][..pad])?;
        }
        Ok(())
    }

    fn write_cstr(&mut self, bytes: &[u8]) -> Result<SinkRef, OscError> {
        let reference = self.raw(bytes)?;
        self.raw(&[0])?;
        self.pad(bytes.len() + 1)?;
        Ok(reference)
    }

    /// Write a validated OSC path string.
    pub fn path(&mut self, path: &str) -> Result<SinkRef, OscError> {
        if !path_is_valid(path) {
            return Err(OscError::BadPath);
        }
        self.write_cstr(path.as_bytes())
    }

    /// Write a validated format string (leading `,` included).
    pub fn format(&mut self, format: &str) -> Result<SinkRef, OscError> {
        if !format_is_valid(format, true) {
            return Err(OscError::BadFormat);
        }
        self.write_cstr(format.as_bytes())
    }

    pub fn int(&mut self, value: i32) -> Result<SinkRef, OscError> {
        self.raw(&value.to_be_bytes())
    }

    pub fn float(&mut self, value: f32) -> Result<SinkRef, OscError> {
        self.raw(&value.to_be_bytes())
    }

    pub fn long(&mut self, value: i64) -> Result<SinkRef, OscError> {
        self.raw(&value.to_be_bytes())
    }

    pub fn double(&mut self, value: f64) -> Result<SinkRef, OscError> {
        self.raw(&value.to_be_bytes())
    }

    pub fn timestamp(&mut self, timestamp: Timestamp) -> Result<SinkRef, OscError> {
        self.raw(&timestamp.to_bits().to_be_bytes())
    }

    /// Write a string argument. Interior NULs cannot be carried by the wire
    /// form and are rejected.
    pub fn string(&mut self, value: &str) -> Result<SinkRef, OscError> {
        if value.bytes().any(|b| b == 0) {
            return Err(OscError::BadString);
        }
        self.write_cstr(value.as_bytes())
    }

    /// Write a symbol argument: the URID is resolved back to its URI through
    /// the host and emitted as an OSC string.
    pub fn symbol(&mut self, urid: Urid) -> Result<SinkRef, OscError> {
        let unmap = self.unmap;
        let uri = unmap.unmap(urid).ok_or(OscError::UnknownUri)?;
        if uri.bytes().any(|b| b == 0) {
            return Err(OscError::BadString);
        }
        self.write_cstr(uri.as_bytes())
    }

    /// Write a blob argument: big-endian length prefix, bytes, padding.
    pub fn blob(&mut self, bytes: &[u8]) -> Result<SinkRef, OscError> {
        let len = i32::try_from(bytes.len()).map_err(|_| OscError::BadItemSize)?;
        let reference = self.raw(&len.to_be_bytes())?;
        self.raw(bytes)?;
        self.pad(bytes.len())?;
        Ok(reference)
    }

    /// Write a MIDI argument: a zero port byte, then up to three data bytes
    /// zero-filled to the fixed four-byte slot.
    pub fn midi(&mut self, payload: &[u8]) -> Result<SinkRef, OscError> {
        if payload.len() > 3 {
            return Err(OscError::Unrepresentable);
        }
        let mut slot = [0u8; 4];
        slot[1..1 + payload.len()].copy_from_slice(payload);
        self.raw(&slot)
    }

    /// Write the bundle header literal and timetag.
    pub fn bundle_head(&mut self, timestamp: Timestamp) -> Result<SinkRef, OscError> {
        let reference = self.raw(BUNDLE_HEADER)?;
        self.timestamp(timestamp)?;
        Ok(reference)
    }

    /// Open a bundle item: write a zero size word and keep a frame on it.
    /// The size accumulates as the item's packet is written.
    pub fn bundle_item_begin(&mut self) -> Result<MoldFrame, OscError> {
        if self.depth == MAX_NESTING {
            return Err(OscError::TooDeep);
        }
        let at = self.raw(&0_u32.to_be_bytes())?;
        self.stack[self.depth] = at;
        self.depth += 1;
        Ok(MoldFrame {
            at,
            depth: self.depth,
        })
    }

    /// Close a bundle item. Panics if `frame` is not the innermost open one.
    pub fn bundle_item_end(&mut self, frame: MoldFrame) {
        assert!(
            self.depth == frame.depth && self.stack[self.depth - 1] == frame.at,
            "bundle item frames must be popped in LIFO order"
        );
        self.depth -= 1;
    }
}
