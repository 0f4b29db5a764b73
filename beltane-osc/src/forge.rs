//! Builder for OSC packets in the structured representation.
//!
//! [`OscForge`] layers the OSC object shapes over the atom forge: a bundle
//! is an object `{ bundleTimestamp: Timestamp, bundleItems: Tuple }`, a
//! message an object `{ messagePath: String, messageArguments: Tuple }`.
//! Opening either hands back a two-frame token covering the object and its
//! inner tuple; both close together in [`OscForge::pop`].
//!
//! Paths are validated before anything is written, so a rejected open leaves
//! the output untouched. All other failures latch the region full and the
//! caller discards the packet.

use beltane_atom::{AtomForge, AtomFrame, SinkRef, Urid, UridMap};

use crate::arg::{Arg, Timestamp};
use crate::error::OscError;
use crate::read::path_is_valid;
use crate::urids::OscUrids;

/// Token for an open bundle or message: the outer object frame and the
/// items/arguments tuple frame.
#[derive(Debug)]
pub struct OscFrame {
    object: AtomFrame,
    tuple: AtomFrame,
}

impl OscFrame {
    /// Reference to the first byte of the packet object.
    pub fn position(&self) -> SinkRef {
        self.object.position()
    }
}

/// Forge for building OSC packet objects into an atom output region.
pub struct OscForge<'a> {
    atom: AtomForge<'a>,
    urids: OscUrids,
    map: &'a dyn UridMap,
}

impl<'a> OscForge<'a> {
    /// Wrap an atom forge. The mapper resolves symbol argument URIs; it must
    /// be the same map the registry was built from.
    pub fn new(atom: AtomForge<'a>, urids: OscUrids, map: &'a dyn UridMap) -> Self {
        Self { atom, urids, map }
    }

    pub fn urids(&self) -> &OscUrids {
        &self.urids
    }

    /// Total bytes written so far.
    pub fn written(&self) -> usize {
        self.atom.written()
    }

    /// Number of currently open atom containers.
    pub fn depth(&self) -> usize {
        self.atom.depth()
    }

    /// Open a bundle object with its timestamp and items tuple.
    pub fn open_bundle(&mut self, id: u32, timestamp: Timestamp) -> Result<OscFrame, OscError> {
        let object = self.atom.object(id, self.urids.bundle)?;
        match self.bundle_body(timestamp) {
            Ok(tuple) => Ok(OscFrame { object, tuple }),
            Err(e) => {
                self.atom.pop(object);
                Err(e)
            }
        }
    }

    fn bundle_body(&mut self, timestamp: Timestamp) -> Result<AtomFrame, OscError> {
        self.atom.property_key(self.urids.bundle_timestamp)?;
        self.atom
            .atom(self.urids.timestamp.get(), &timestamp.to_atom_body())?;
        self.atom.property_key(self.urids.bundle_items)?;
        Ok(self.atom.tuple()?)
    }

    /// Validate `path` and open a message object with its path string and
    /// arguments tuple. An invalid path writes nothing.
    pub fn open_message(&mut self, id: u32, path: &str) -> Result<OscFrame, OscError> {
        if !path_is_valid(path) {
            return Err(OscError::BadPath);
        }
        let object = self.atom.object(id, self.urids.message)?;
        match self.message_body(path) {
            Ok(tuple) => Ok(OscFrame { object, tuple }),
            Err(e) => {
                self.atom.pop(object);
                Err(e)
            }
        }
    }

    fn message_body(&mut self, path: &str) -> Result<AtomFrame, OscError> {
        self.atom.property_key(self.urids.message_path)?;
        self.atom.string(path)?;
        self.atom.property_key(self.urids.message_arguments)?;
        Ok(self.atom.tuple()?)
    }

    /// Close the arguments/items tuple, then the packet object.
    pub fn pop(&mut self, frame: OscFrame) {
        self.atom.pop(frame.tuple);
        self.atom.pop(frame.object);
    }

    pub fn int(&mut self, value: i32) -> Result<SinkRef, OscError> {
        Ok(self.atom.int(value)?)
    }

    pub fn float(&mut self, value: f32) -> Result<SinkRef, OscError> {
        Ok(self.atom.float(value)?)
    }

    pub fn long(&mut self, value: i64) -> Result<SinkRef, OscError> {
        Ok(self.atom.long(value)?)
    }

    pub fn double(&mut self, value: f64) -> Result<SinkRef, OscError> {
        Ok(self.atom.double(value)?)
    }

    /// Write a string argument. Interior NULs cannot survive the wire form
    /// and are rejected.
    pub fn string(&mut self, value: &str) -> Result<SinkRef, OscError> {
        if value.bytes().any(|b| b == 0) {
            return Err(OscError::BadString);
        }
        Ok(self.atom.string(value)?)
    }

    /// Write a symbol argument: the URI is mapped through the host and
    /// stored as a URID atom.
    pub fn symbol(&mut self, uri: &str) -> Result<SinkRef, OscError> {
        let urid = self.map.map(uri).ok_or(OscError::UnknownUri)?;
        self.symbol_urid(urid)
    }

    /// Write a symbol argument from an already-mapped URID.
    pub fn symbol_urid(&mut self, urid: Urid) -> Result<SinkRef, OscError> {
        Ok(self.atom.urid(urid)?)
    }

    /// Write a blob argument as an opaque chunk atom.
    pub fn blob(&mut self, bytes: &[u8]) -> Result<SinkRef, OscError> {
        Ok(self.atom.chunk(bytes)?)
    }

    /// Write a MIDI argument: up to three data bytes, typed as a MIDI event.
    pub fn midi(&mut self, payload: &[u8]) -> Result<SinkRef, OscError> {
        if payload.len() > 3 {
            return Err(OscError::Unrepresentable);
        }
        Ok(self.atom.atom(self.urids.midi_event.get(), payload)?)
    }

    pub fn timestamp(&mut self, timestamp: Timestamp) -> Result<SinkRef, OscError> {
        Ok(self
            .atom
            .atom(self.urids.timestamp.get(), &timestamp.to_atom_body())?)
    }

    pub fn bool_(&mut self, value: bool) -> Result<SinkRef, OscError> {
        Ok(self.atom.bool_(value)?)
    }

    pub fn nil(&mut self) -> Result<SinkRef, OscError> {
        Ok(self.atom.nil()?)
    }

    pub fn impulse(&mut self) -> Result<SinkRef, OscError> {
        Ok(self.atom.impulse()?)
    }

    /// Write one argument value.
    pub fn arg(&mut self, arg: &Arg<'_>) -> Result<SinkRef, OscError> {
        match *arg {
            Arg::Int(v) => self.int(v),
            Arg::Float(v) => self.float(v),
            Arg::Str(s) => self.string(s),
            Arg::Blob(b) => self.blob(b),
            Arg::Long(v) => self.long(v),
            Arg::Double(v) => self.double(v),
            Arg::Timestamp(ts) => self.timestamp(ts),
            Arg::True => self.bool_(true),
            Arg::False => self.bool_(false),
            Arg::Nil => self.nil(),
            Arg::Impulse => self.impulse(),
            Arg::Symbol(uri) => self.symbol(uri),
            Arg::Midi(m) => self.midi(&m),
        }
    }

    /// Write a complete message: open, one write per argument, close.
    pub fn message(&mut self, id: u32, path: &str, args: &[Arg<'_>]) -> Result<SinkRef, OscError> {
        let frame = self.open_message(id, path)?;
        let head = frame.position();
        let mut result = Ok(());
        for arg in args {
            if let Err(e) = self.arg(arg) {
                result = Err(e);
                break;
            }
        }
        self.pop(frame);
        result.map(|()| head)
    }
}
