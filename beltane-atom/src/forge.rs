//! Append-only builder for atom trees.
//!
//! The forge writes atoms into an [`Output`] piece by piece; nothing is ever
//! rewound or copied. Opening a container hands back a stack frame that must
//! be popped, in strict LIFO order, when the container is finished. While a
//! frame is open, every write grows the recorded size of all open containers
//! through the output's deref hook, so headers are always consistent with the
//! bytes behind them.
//!
//! The frame stack is a fixed array inside the forge; there is no allocation
//! on any path. Nesting deeper than [`MAX_DEPTH`] fails with
//! [`ForgeError::TooDeep`].

use thiserror::Error;

use crate::atom::{pad_size, HEADER_SIZE};
use crate::sink::{Output, SinkRef, SinkWrite};
use crate::urid::{AtomUrids, Urid};

/// Maximum number of simultaneously open containers.
///
/// An OSC bundle level costs two frames (object + items tuple), so this
/// admits bundle trees well past the wire grammar's own nesting bound.
pub const MAX_DEPTH: usize = 64;

/// Failures while forging. Once `Overflow` is returned the output region is
/// latched full and every further write fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ForgeError {
    #[error("output region full")]
    Overflow,
    #[error("container nesting deeper than {MAX_DEPTH}")]
    TooDeep,
}

/// Token for an open container. Move-only: it must be given back to
/// [`AtomForge::pop`] exactly once, and pops must mirror pushes.
#[derive(Debug)]
pub struct AtomFrame {
    at: SinkRef,
    depth: usize,
}

impl AtomFrame {
    /// Reference to the first byte of the container's header.
    pub fn position(&self) -> SinkRef {
        self.at
    }
}

/// Forge for building atoms into a caller-owned output region.
pub struct AtomForge<'a> {
    out: Output<'a>,
    stack: [SinkRef; MAX_DEPTH],
    depth: usize,
    urids: AtomUrids,
}

impl<'a> AtomForge<'a> {
    pub fn buffer(buf: &'a mut [u8], urids: AtomUrids) -> Self {
        Self::new(Output::buffer(buf), urids)
    }

    pub fn stream(sink: &'a mut dyn SinkWrite, urids: AtomUrids) -> Self {
        Self::new(Output::stream(sink), urids)
    }

    fn new(out: Output<'a>, urids: AtomUrids) -> Self {
        Self {
            out,
            stack: [0; MAX_DEPTH],
            depth: 0,
            urids,
        }
    }

    pub fn urids(&self) -> &AtomUrids {
        &self.urids
    }

    /// Total bytes written so far.
    pub fn written(&self) -> usize {
        self.out.written()
    }

    /// Number of currently open containers.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Append raw bytes, growing the recorded size of every open container.
    pub fn raw(&mut self, data: &[u8]) -> Result<SinkRef, ForgeError> {
        let reference = self.out.raw(data).ok_or(ForgeError::Overflow)?;
        let grow = data.len() as u32;
        if grow > 0 {
            for i in 0..self.depth {
                if let Some(cell) = self.out.deref(self.stack[i]) {
                    let size = u32::from_ne_bytes(*cell).wrapping_add(grow);
                    *cell = size.to_ne_bytes();
                }
            }
        }
        Ok(reference)
    }

    /// Zero-pad to the next multiple of four after `written` body bytes.
    pub fn pad(&mut self, written: usize) -> Result<(), ForgeError> {
        let pad = pad_size(written) - written;
        if pad > 0 {
            self.raw(&[0u8; 4][..pad])?;
        }
        Ok(())
    }

    /// Append raw bytes and pad to a multiple of four.
    pub fn write(&mut self, data: &[u8]) -> Result<SinkRef, ForgeError> {
        let reference = self.raw(data)?;
        self.pad(data.len())?;
        Ok(reference)
    }

    fn header(&mut self, size: u32, ty: u32) -> Result<SinkRef, ForgeError> {
        let mut header = [0u8; HEADER_SIZE];
        header[..4].copy_from_slice(&size.to_ne_bytes());
        header[4..].copy_from_slice(&ty.to_ne_bytes());
        self.raw(&header)
    }

    /// Write a complete atom: header, body, padding.
    pub fn atom(&mut self, ty: u32, body: &[u8]) -> Result<SinkRef, ForgeError> {
        let reference = self.header(body.len() as u32, ty)?;
        self.raw(body)?;
        self.pad(body.len())?;
        Ok(reference)
    }

    pub fn int(&mut self, value: i32) -> Result<SinkRef, ForgeError> {
        self.atom(self.urids.int.get(), &value.to_ne_bytes())
    }

    pub fn long(&mut self, value: i64) -> Result<SinkRef, ForgeError> {
        self.atom(self.urids.long.get(), &value.to_ne_bytes())
    }

    pub fn float(&mut self, value: f32) -> Result<SinkRef, ForgeError> {
        self.atom(self.urids.float.get(), &value.to_ne_bytes())
    }

    pub fn double(&mut self, value: f64) -> Result<SinkRef, ForgeError> {
        self.atom(self.urids.double.get(), &value.to_ne_bytes())
    }

    pub fn bool_(&mut self, value: bool) -> Result<SinkRef, ForgeError> {
        self.atom(self.urids.bool_.get(), &(value as i32).to_ne_bytes())
    }

    pub fn urid(&mut self, value: Urid) -> Result<SinkRef, ForgeError> {
        self.atom(self.urids.urid.get(), &value.get().to_ne_bytes())
    }

    /// Write a string atom; the stored body carries a NUL terminator.
    pub fn string(&mut self, value: &str) -> Result<SinkRef, ForgeError> {
        let len = value.len() + 1;
        let reference = self.header(len as u32, self.urids.string.get())?;
        self.raw(value.as_bytes())?;
        self.raw(&[0])?;
        self.pad(len)?;
        Ok(reference)
    }

    /// Write an opaque chunk atom under the default chunk type.
    pub fn chunk(&mut self, body: &[u8]) -> Result<SinkRef, ForgeError> {
        self.atom(self.urids.chunk.get(), body)
    }

    pub fn impulse(&mut self) -> Result<SinkRef, ForgeError> {
        self.atom(self.urids.impulse.get(), &[])
    }

    /// The untyped zero-sized atom.
    pub fn nil(&mut self) -> Result<SinkRef, ForgeError> {
        self.atom(0, &[])
    }

    /// Write a property key inside an open object. The value is whatever
    /// atom is written next.
    pub fn property_key(&mut self, key: Urid) -> Result<SinkRef, ForgeError> {
        self.raw(&key.get().to_ne_bytes())
    }

    /// Open a tuple container.
    pub fn tuple(&mut self) -> Result<AtomFrame, ForgeError> {
        let at = self.header(0, self.urids.tuple.get())?;
        self.push(at)
    }

    /// Open an object container of type `otype` with subject `id` (0 for
    /// none).
    pub fn object(&mut self, id: u32, otype: Urid) -> Result<AtomFrame, ForgeError> {
        let at = self.header(0, self.urids.object.get())?;
        let frame = self.push(at)?;
        let mut body = [0u8; 8];
        body[..4].copy_from_slice(&id.to_ne_bytes());
        body[4..].copy_from_slice(&otype.get().to_ne_bytes());
        match self.raw(&body) {
            Ok(_) => Ok(frame),
            Err(e) => {
                self.pop(frame);
                Err(e)
            }
        }
    }

    fn push(&mut self, at: SinkRef) -> Result<AtomFrame, ForgeError> {
        if self.depth == MAX_DEPTH {
            return Err(ForgeError::TooDeep);
        }
        self.stack[self.depth] = at;
        self.depth += 1;
        Ok(AtomFrame {
            at,
            depth: self.depth,
        })
    }

    /// Close a container. Panics if `frame` is not the innermost open one.
    pub fn pop(&mut self, frame: AtomFrame) {
        assert!(
            self.depth == frame.depth && self.stack[self.depth - 1] == frame.at,
            "atom frames must be popped in LIFO order"
        );
        self.depth -= 1;
    }
}
