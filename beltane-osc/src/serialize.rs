//! Structured → wire direction.
//!
//! Walks a packet object and drives the [`Mold`] to emit the equivalent
//! wire bytes. A bundle item's size word is written as zero up front and
//! maintained by the mold's frame stack while the item's packet is
//! serialized, so the same code path works against a contiguous buffer or a
//! streaming sink.

use beltane_atom::{AtomRef, ObjectRef, SinkRef, UridUnmap};

use crate::arg::{ArgTag, Timestamp};
use crate::error::OscError;
use crate::mold::Mold;
use crate::urids::OscUrids;

/// Serialize a packet object: a bundle or a message, dispatched on the
/// object type. Returns a reference to the first byte written.
pub fn serialize_packet(
    mold: &mut Mold<'_>,
    urids: &OscUrids,
    atom: AtomRef<'_>,
) -> Result<SinkRef, OscError> {
    let object = atom.object(&urids.atom).ok_or(OscError::Unrepresentable)?;
    serialize_object(mold, urids, &object)
}

/// Serialize an object that must be a bundle.
pub fn serialize_bundle(
    mold: &mut Mold<'_>,
    urids: &OscUrids,
    atom: AtomRef<'_>,
) -> Result<SinkRef, OscError> {
    let object = atom.object(&urids.atom).ok_or(OscError::Unrepresentable)?;
    if !urids.is_bundle_type(object.otype()) {
        return Err(OscError::Unrepresentable);
    }
    serialize_object(mold, urids, &object)
}

/// Serialize an object that must be a message.
pub fn serialize_message(
    mold: &mut Mold<'_>,
    urids: &OscUrids,
    atom: AtomRef<'_>,
) -> Result<SinkRef, OscError> {
    let object = atom.object(&urids.atom).ok_or(OscError::Unrepresentable)?;
    if !urids.is_message_type(object.otype()) {
        return Err(OscError::Unrepresentable);
    }
    serialize_object(mold, urids, &object)
}

/// Serialize a packet object into `buf` with `unmap` resolving symbols,
/// returning the number of bytes produced.
pub fn serialize_packet_to(
    buf: &mut [u8],
    urids: &OscUrids,
    unmap: &dyn UridUnmap,
    atom: AtomRef<'_>,
) -> Result<usize, OscError> {
    let mut mold = Mold::buffer(buf, unmap);
    serialize_packet(&mut mold, urids, atom)?;
    Ok(mold.written())
}

fn serialize_object(
    mold: &mut Mold<'_>,
    urids: &OscUrids,
    object: &ObjectRef<'_>,
) -> Result<SinkRef, OscError> {
    if urids.is_bundle_type(object.otype()) {
        serialize_bundle_object(mold, urids, object)
    } else if urids.is_message_type(object.otype()) {
        serialize_message_object(mold, urids, object)
    } else {
        Err(OscError::Unrepresentable)
    }
}

fn serialize_bundle_object(
    mold: &mut Mold<'_>,
    urids: &OscUrids,
    object: &ObjectRef<'_>,
) -> Result<SinkRef, OscError> {
    let (timestamp, items) = urids.bundle_unpack(object).ok_or(OscError::Unrepresentable)?;
    let head = mold.bundle_head(timestamp)?;
    for item in items {
        let item_object = item.object(&urids.atom).ok_or(OscError::Unrepresentable)?;
        let frame = mold.bundle_item_begin()?;
        let result = serialize_object(mold, urids, &item_object);
        mold.bundle_item_end(frame);
        result?;
    }
    Ok(head)
}

fn serialize_message_object(
    mold: &mut Mold<'_>,
    urids: &OscUrids,
    object: &ObjectRef<'_>,
) -> Result<SinkRef, OscError> {
    let (path, args) = urids.message_unpack(object).ok_or(OscError::Unrepresentable)?;
    let head = mold.path(path)?;

    // Format string first: ',' + one tag per argument + NUL, padded.
    let mut count = 0usize;
    mold.raw(b",")?;
    for arg in args.clone() {
        let tag = atom_tag(urids, &arg)?;
        mold.raw(&[tag.byte()])?;
        count += 1;
    }
    mold.raw(&[0])?;
    mold.pad(count + 2)?;

    for arg in args {
        serialize_argument(mold, urids, &arg)?;
    }
    Ok(head)
}

/// Translate an argument atom's type to its OSC tag.
fn atom_tag(urids: &OscUrids, atom: &AtomRef<'_>) -> Result<ArgTag, OscError> {
    let ty = atom.ty();
    let atoms = &urids.atom;
    if ty == atoms.int.get() {
        Ok(ArgTag::Int)
    } else if ty == atoms.float.get() {
        Ok(ArgTag::Float)
    } else if ty == atoms.string.get() {
        Ok(ArgTag::Str)
    } else if ty == atoms.chunk.get() {
        Ok(ArgTag::Blob)
    } else if ty == atoms.long.get() {
        Ok(ArgTag::Long)
    } else if ty == atoms.double.get() {
        Ok(ArgTag::Double)
    } else if ty == atoms.bool_.get() {
        match atom.as_bool() {
            Some(true) => Ok(ArgTag::True),
            Some(false) => Ok(ArgTag::False),
            None => Err(OscError::Unrepresentable),
        }
    } else if ty == atoms.impulse.get() {
        Ok(ArgTag::Impulse)
    } else if ty == atoms.urid.get() {
        Ok(ArgTag::Symbol)
    } else if ty == urids.timestamp.get() {
        Ok(ArgTag::Timestamp)
    } else if ty == urids.midi_event.get() {
        Ok(ArgTag::Midi)
    } else if atom.is_nil() {
        Ok(ArgTag::Nil)
    } else {
        Err(OscError::Unrepresentable)
    }
}

fn serialize_argument(
    mold: &mut Mold<'_>,
    urids: &OscUrids,
    atom: &AtomRef<'_>,
) -> Result<(), OscError> {
    match atom_tag(urids, atom)? {
        ArgTag::Int => mold.int(atom.as_i32().ok_or(OscError::Unrepresentable)?)?,
        ArgTag::Float => mold.float(atom.as_f32().ok_or(OscError::Unrepresentable)?)?,
        ArgTag::Str => mold.string(atom.as_str().ok_or(OscError::BadString)?)?,
        ArgTag::Blob => mold.blob(atom.body())?,
        ArgTag::Long => mold.long(atom.as_i64().ok_or(OscError::Unrepresentable)?)?,
        ArgTag::Double => mold.double(atom.as_f64().ok_or(OscError::Unrepresentable)?)?,
        ArgTag::Timestamp => {
            let timestamp =
                Timestamp::from_atom_body(atom.body()).ok_or(OscError::Unrepresentable)?;
            mold.timestamp(timestamp)?
        }
        ArgTag::Symbol => mold.symbol(atom.as_urid().ok_or(OscError::Unrepresentable)?)?,
        ArgTag::Midi => mold.midi(atom.body())?,
        ArgTag::True | ArgTag::False | ArgTag::Nil | ArgTag::Impulse => return Ok(()),
    };
    Ok(())
}
