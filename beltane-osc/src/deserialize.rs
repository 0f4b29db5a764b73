//! Wire → structured direction.
//!
//! Parses a wire packet region and drives the [`OscForge`] to materialize
//! the equivalent atom tree. The whole packet lands or the call fails; on
//! failure the caller discards the output region, and builder frames are
//! unwound on every path.

use beltane_atom::SinkRef;

use crate::error::OscError;
use crate::forge::OscForge;
use crate::read::{BundleRef, MessageRef, PacketRef};

/// Deserialize a packet region: a bundle if it opens with the bundle
/// header literal, a message otherwise. Returns a reference to the first
/// byte of the packet object.
pub fn deserialize_packet(
    forge: &mut OscForge<'_>,
    id: u32,
    wire: &[u8],
) -> Result<SinkRef, OscError> {
    let packet = PacketRef::parse(wire)?;
    deserialize_packet_ref(forge, id, &packet)
}

/// Deserialize a region that must be a bundle.
pub fn deserialize_bundle(
    forge: &mut OscForge<'_>,
    id: u32,
    wire: &[u8],
) -> Result<SinkRef, OscError> {
    let bundle = BundleRef::parse(wire)?;
    deserialize_bundle_ref(forge, id, &bundle)
}

/// Deserialize a region that must be a message.
pub fn deserialize_message(
    forge: &mut OscForge<'_>,
    id: u32,
    wire: &[u8],
) -> Result<SinkRef, OscError> {
    let message = MessageRef::parse(wire)?;
    deserialize_message_ref(forge, id, &message)
}

/// Deserialize an already-parsed packet.
pub fn deserialize_packet_ref(
    forge: &mut OscForge<'_>,
    id: u32,
    packet: &PacketRef<'_>,
) -> Result<SinkRef, OscError> {
    match packet {
        PacketRef::Bundle(bundle) => deserialize_bundle_ref(forge, id, bundle),
        PacketRef::Message(message) => deserialize_message_ref(forge, id, message),
    }
}

fn deserialize_bundle_ref(
    forge: &mut OscForge<'_>,
    id: u32,
    bundle: &BundleRef<'_>,
) -> Result<SinkRef, OscError> {
    let frame = forge.open_bundle(id, bundle.timestamp())?;
    let head = frame.position();
    let mut result = Ok(head);
    for item in bundle.items() {
        if let Err(e) = item.and_then(|packet| deserialize_packet_ref(forge, id, &packet)) {
            result = Err(e);
            break;
        }
    }
    forge.pop(frame);
    result
}

fn deserialize_message_ref(
    forge: &mut OscForge<'_>,
    id: u32,
    message: &MessageRef<'_>,
) -> Result<SinkRef, OscError> {
    let frame = forge.open_message(id, message.path())?;
    let head = frame.position();
    let mut result = Ok(head);
    for arg in message.args() {
        if let Err(e) = arg.and_then(|arg| forge.arg(&arg)) {
            result = Err(e);
            break;
        }
    }
    forge.pop(frame);
    result
}
