//! Cached URID vocabulary and structured-packet helpers.

use beltane_atom::{AtomUrids, ObjectRef, TupleIter, Urid, UridMap};

use crate::arg::Timestamp;
use crate::error::OscError;

/// URIs of the OSC vocabulary and the MIDI event type.
pub mod uris {
    pub const OSC_URI: &str = "http://lv2plug.in/ns/ext/osc";
    pub const OSC_PREFIX: &str = "http://lv2plug.in/ns/ext/osc#";

    pub const EVENT: &str = "http://lv2plug.in/ns/ext/osc#Event";
    pub const PACKET: &str = "http://lv2plug.in/ns/ext/osc#Packet";
    pub const BUNDLE: &str = "http://lv2plug.in/ns/ext/osc#Bundle";
    pub const MESSAGE: &str = "http://lv2plug.in/ns/ext/osc#Message";
    pub const TIMESTAMP: &str = "http://lv2plug.in/ns/ext/osc#Timestamp";
    pub const BUNDLE_TIMESTAMP: &str = "http://lv2plug.in/ns/ext/osc#bundleTimestamp";
    pub const BUNDLE_ITEMS: &str = "http://lv2plug.in/ns/ext/osc#bundleItems";
    pub const MESSAGE_PATH: &str = "http://lv2plug.in/ns/ext/osc#messagePath";
    pub const MESSAGE_ARGUMENTS: &str = "http://lv2plug.in/ns/ext/osc#messageArguments";

    pub const MIDI_EVENT: &str = "http://lv2plug.in/ns/ext/midi#MidiEvent";
}

/// The full URID vocabulary the codec needs, mapped once at construction.
/// The mapper is never consulted again from the registry; instances are
/// read-only afterwards and may be shared.
#[derive(Debug, Clone, Copy)]
pub struct OscUrids {
    pub event: Urid,
    pub packet: Urid,
    pub bundle: Urid,
    pub message: Urid,
    pub timestamp: Urid,
    pub bundle_timestamp: Urid,
    pub bundle_items: Urid,
    pub message_path: Urid,
    pub message_arguments: Urid,
    pub midi_event: Urid,
    pub atom: AtomUrids,
}

impl OscUrids {
    /// Map the vocabulary through the host.
    pub fn map(map: &dyn UridMap) -> Result<Self, OscError> {
        let lookup = |uri| map.map(uri).ok_or(OscError::UnknownUri);
        let urids = Self {
            event: lookup(uris::EVENT)?,
            packet: lookup(uris::PACKET)?,
            bundle: lookup(uris::BUNDLE)?,
            message: lookup(uris::MESSAGE)?,
            timestamp: lookup(uris::TIMESTAMP)?,
            bundle_timestamp: lookup(uris::BUNDLE_TIMESTAMP)?,
            bundle_items: lookup(uris::BUNDLE_ITEMS)?,
            message_path: lookup(uris::MESSAGE_PATH)?,
            message_arguments: lookup(uris::MESSAGE_ARGUMENTS)?,
            midi_event: lookup(uris::MIDI_EVENT)?,
            atom: AtomUrids::map(map).ok_or(OscError::UnknownUri)?,
        };
        log::debug!(target: "osc::urids", "cached OSC vocabulary");
        Ok(urids)
    }

    pub fn is_packet_type(&self, ty: u32) -> bool {
        ty == self.packet.get()
    }

    pub fn is_bundle_type(&self, ty: u32) -> bool {
        ty == self.bundle.get()
    }

    pub fn is_message_type(&self, ty: u32) -> bool {
        ty == self.message.get()
    }

    pub fn is_osc_type(&self, ty: u32) -> bool {
        self.is_packet_type(ty) || self.is_bundle_type(ty) || self.is_message_type(ty)
    }

    /// Pull the timestamp and items tuple out of a bundle object, checking
    /// field types along the way.
    pub fn bundle_unpack<'a>(
        &self,
        object: &ObjectRef<'a>,
    ) -> Option<(Timestamp, TupleIter<'a>)> {
        if !self.is_bundle_type(object.otype()) {
            return None;
        }
        let timestamp = object.get(self.bundle_timestamp)?;
        if timestamp.ty() != self.timestamp.get() {
            return None;
        }
        let timestamp = Timestamp::from_atom_body(timestamp.body())?;
        let items = object.get(self.bundle_items)?.tuple(&self.atom)?;
        Some((timestamp, items))
    }

    /// Pull the path and arguments tuple out of a message object, checking
    /// field types along the way.
    pub fn message_unpack<'a>(&self, object: &ObjectRef<'a>) -> Option<(&'a str, TupleIter<'a>)> {
        if !self.is_message_type(object.otype()) {
            return None;
        }
        let path = object.get(self.message_path)?;
        if path.ty() != self.atom.string.get() {
            return None;
        }
        let path = path.as_str()?;
        let args = object.get(self.message_arguments)?.tuple(&self.atom)?;
        Some((path, args))
    }
}
