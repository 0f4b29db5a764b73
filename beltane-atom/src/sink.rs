//! Append-only output regions.
//!
//! Builders write through an [`Output`], which is either a caller-owned
//! buffer or a streaming sink (a ring buffer, a port buffer, anything that
//! can hand back a reference to a write). Buffer mode is dispatched inline;
//! only sink mode goes through the trait object.
//!
//! Every write returns an opaque [`SinkRef`] locating its first byte. In
//! buffer mode the reference is the absolute byte offset. Container builders
//! keep references to size fields and patch them through [`Output::deref`]
//! as later writes land.
//!
//! The first write past capacity latches the region full; every write after
//! that fails until the region is discarded.

/// Opaque reference to a completed write. Buffer mode uses the absolute byte
/// offset; sink mode passes through whatever the sink returned.
pub type SinkRef = u64;

/// A streaming write target supplied by the caller.
///
/// `write` appends bytes and returns a reference to the first one, or `None`
/// when out of space. `deref` must resolve any reference previously returned
/// by `write` to the four bytes at that position, so container size fields
/// can be patched in place. Both must be realtime safe for the codec's
/// guarantee to hold.
pub trait SinkWrite {
    fn write(&mut self, data: &[u8]) -> Option<SinkRef>;
    fn deref(&mut self, reference: SinkRef) -> &mut [u8; 4];
}

enum Target<'a> {
    Buffer { buf: &'a mut [u8], offset: usize },
    Stream(&'a mut dyn SinkWrite),
}

/// An append-only write cursor over a buffer or a streaming sink.
pub struct Output<'a> {
    target: Target<'a>,
    written: usize,
    full: bool,
}

impl<'a> Output<'a> {
    pub fn buffer(buf: &'a mut [u8]) -> Self {
        Self {
            target: Target::Buffer { buf, offset: 0 },
            written: 0,
            full: false,
        }
    }

    pub fn stream(sink: &'a mut dyn SinkWrite) -> Self {
        Self {
            target: Target::Stream(sink),
            written: 0,
            full: false,
        }
    }

    /// Total bytes accepted so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Whether a write has failed; once full, the region stays full.
    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Append `data`, returning a reference to its first byte, or `None`
    /// when capacity is exhausted.
    pub fn raw(&mut self, data: &[u8]) -> Option<SinkRef> {
        if self.full {
            return None;
        }
        let reference = match &mut self.target {
            Target::Buffer { buf, offset } => {
                let end = offset.checked_add(data.len())?;
                if end > buf.len() {
                    self.full = true;
                    log::warn!(target: "atom::sink", "output region exhausted at {} bytes", offset);
                    return None;
                }
                buf[*offset..end].copy_from_slice(data);
                let reference = *offset as SinkRef;
                *offset = end;
                reference
            }
            Target::Stream(sink) => match sink.write(data) {
                Some(reference) => reference,
                None => {
                    self.full = true;
                    log::warn!(target: "atom::sink", "sink refused write of {} bytes", data.len());
                    return None;
                }
            },
        };
        self.written += data.len();
        Some(reference)
    }

    /// Resolve a reference to the four bytes at its position.
    pub fn deref(&mut self, reference: SinkRef) -> Option<&mut [u8; 4]> {
        match &mut self.target {
            Target::Buffer { buf, .. } => {
                let at = reference as usize;
                let slice = buf.get_mut(at..at.checked_add(4)?)?;
                slice.try_into().ok()
            }
            Target::Stream(sink) => Some(sink.deref(reference)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_refs_are_offsets() {
        let mut buf = [0u8; 8];
        let mut out = Output::buffer(&mut buf);
        assert_eq!(out.raw(&[1, 2]), Some(0));
        assert_eq!(out.raw(&[3]), Some(2));
        assert_eq!(out.written(), 3);
        assert_eq!(buf[..3], [1, 2, 3]);
    }

    #[test]
    fn overflow_latches() {
        let mut buf = [0u8; 4];
        let mut out = Output::buffer(&mut buf);
        assert!(out.raw(&[0; 3]).is_some());
        assert!(out.raw(&[0; 2]).is_none());
        assert!(out.is_full());
        // One byte would still fit, but the region is latched full.
        assert!(out.raw(&[0]).is_none());
    }

    #[test]
    fn deref_patches_in_place() {
        let mut buf = [0u8; 8];
        let mut out = Output::buffer(&mut buf);
        let r = out.raw(&[0; 4]).unwrap();
        *out.deref(r).unwrap() = [1, 2, 3, 4];
        assert_eq!(buf[..4], [1, 2, 3, 4]);
    }
}
