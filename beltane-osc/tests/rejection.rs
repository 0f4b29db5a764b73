//! Rejection and capacity-pressure coverage: bad input must fail whole, and
//! a caller that checks the return value never surfaces partial output.

mod common;

use common::{fixture, wire_bundle, wire_message};

use beltane_atom::{AtomForge, AtomRef, MemoryMap};
use beltane_osc::{
    deserialize_bundle, deserialize_message, deserialize_packet, serialize_packet_to, OscError,
    OscForge, OscUrids,
};

fn forge_buffer<'a>(
    buf: &'a mut [u8],
    urids: OscUrids,
    map: &'a MemoryMap,
) -> OscForge<'a> {
    OscForge::new(AtomForge::buffer(buf, urids.atom), urids, map)
}

#[test]
fn test_space_in_path_writes_nothing() {
    let fx = fixture();
    let wire = wire_message(b"/foo bar", b",", &[]);
    let mut buf = [0u8; 512];
    let mut forge = forge_buffer(&mut buf, fx.urids, &fx.map);
    assert_eq!(
        deserialize_packet(&mut forge, 0, &wire),
        Err(OscError::BadPath)
    );
    assert_eq!(forge.written(), 0);
    assert_eq!(forge.depth(), 0);
}

#[test]
fn test_unknown_tag_writes_nothing() {
    let fx = fixture();
    let wire = wire_message(b"/foo", b",q", &[0, 0, 0, 0]);
    let mut buf = [0u8; 512];
    let mut forge = forge_buffer(&mut buf, fx.urids, &fx.map);
    assert_eq!(
        deserialize_packet(&mut forge, 0, &wire),
        Err(OscError::BadFormat)
    );
    assert_eq!(forge.written(), 0);
}

#[test]
fn test_negative_item_size_fails() {
    let fx = fixture();
    let mut wire = wire_bundle(1, &[]);
    wire.extend_from_slice(&(-4_i32).to_be_bytes());
    let mut buf = [0u8; 512];
    let mut forge = forge_buffer(&mut buf, fx.urids, &fx.map);
    assert_eq!(
        deserialize_packet(&mut forge, 0, &wire),
        Err(OscError::BadItemSize)
    );
    assert_eq!(forge.depth(), 0);
}

#[test]
fn test_unaligned_item_size_fails() {
    let fx = fixture();
    let mut wire = wire_bundle(1, &[]);
    wire.extend_from_slice(&7_i32.to_be_bytes());
    wire.extend_from_slice(&[0; 8]);
    let mut buf = [0u8; 512];
    let mut forge = forge_buffer(&mut buf, fx.urids, &fx.map);
    assert_eq!(
        deserialize_packet(&mut forge, 0, &wire),
        Err(OscError::BadItemSize)
    );
}

#[test]
fn test_truncated_bundle_fails() {
    let fx = fixture();
    let message = wire_message(b"/a", b",i", &7_i32.to_be_bytes());
    let wire = wire_bundle(1, &[&message]);
    let mut buf = [0u8; 512];
    let mut forge = forge_buffer(&mut buf, fx.urids, &fx.map);
    assert_eq!(
        deserialize_packet(&mut forge, 0, &wire[..wire.len() - 4]),
        Err(OscError::Truncated)
    );
    assert_eq!(forge.depth(), 0);
}

#[test]
fn test_direct_bundle_decode_requires_the_header() {
    let fx = fixture();
    let wire = wire_message(b"/foo", b",", &[]);
    let mut buf = [0u8; 512];
    let mut forge = forge_buffer(&mut buf, fx.urids, &fx.map);
    assert_eq!(
        deserialize_bundle(&mut forge, 0, &wire),
        Err(OscError::BadHeader)
    );
}

#[test]
fn test_direct_message_decode_rejects_bundles() {
    let fx = fixture();
    let wire = wire_bundle(1, &[]);
    let mut buf = [0u8; 512];
    let mut forge = forge_buffer(&mut buf, fx.urids, &fx.map);
    // A bundle region starts with '#', which no path may.
    assert_eq!(
        deserialize_message(&mut forge, 0, &wire),
        Err(OscError::BadPath)
    );
}

#[test]
fn test_failing_item_rolls_up_through_the_recursion() {
    let fx = fixture();
    let good = wire_message(b"/ok", b",", &[]);
    let bad = wire_message(b"/no pe", b",", &[]);
    let inner = wire_bundle(1, &[&good, &bad]);
    let wire = wire_bundle(1, &[&inner]);
    let mut buf = [0u8; 1024];
    let mut forge = forge_buffer(&mut buf, fx.urids, &fx.map);
    assert_eq!(
        deserialize_packet(&mut forge, 0, &wire),
        Err(OscError::BadPath)
    );
    assert_eq!(forge.depth(), 0);
}

/// An 11-byte output region cannot hold the 12-byte `/foo` message; the
/// caller sees the error and discards the partial write.
#[test]
fn test_capacity_pressure_returns_error_not_partial_output() {
    let fx = fixture();
    let wire = wire_message(b"/foo", b",", &[]);
    let atoms = fx.deserialize(&wire).unwrap();
    let (atom, _) = AtomRef::read(&atoms).unwrap();

    let mut out = [0u8; 11];
    let result = serialize_packet_to(&mut out, &fx.urids, &fx.map, atom);
    assert_eq!(result, Err(OscError::Overflow));
}

#[test]
fn test_forge_capacity_pressure_is_sticky() {
    let fx = fixture();
    let wire = wire_message(b"/some/longer/path", b",i", &1_i32.to_be_bytes());
    let mut buf = [0u8; 32];
    let mut forge = forge_buffer(&mut buf, fx.urids, &fx.map);
    assert_eq!(
        deserialize_packet(&mut forge, 0, &wire),
        Err(OscError::Overflow)
    );
    // The region stays full for the next packet too.
    assert_eq!(forge.message(0, "/x", &[]), Err(OscError::Overflow));
}

#[test]
fn test_serialize_rejects_non_packet_objects() {
    let fx = fixture();
    // A lone int atom is not a packet object.
    let mut buf = [0u8; 64];
    let mut atoms = AtomForge::buffer(&mut buf, fx.urids.atom);
    atoms.int(5).unwrap();
    let written = atoms.written();
    let (atom, _) = AtomRef::read(&buf[..written]).unwrap();

    let mut out = [0u8; 64];
    assert_eq!(
        serialize_packet_to(&mut out, &fx.urids, &fx.map, atom),
        Err(OscError::Unrepresentable)
    );
}

#[test]
fn test_serialize_rejects_foreign_argument_atoms() {
    let fx = fixture();
    let mut buf = [0u8; 256];
    let mut forge = forge_buffer(&mut buf, fx.urids, &fx.map);
    let frame = forge.open_message(0, "/odd").unwrap();
    // Hand-write an argument of a type the wire cannot carry.
    forge.timestamp(beltane_osc::Timestamp::new(1, 2)).unwrap();
    forge.pop(frame);
    let written = forge.written();

    // Sanity: a timestamp argument is representable...
    let (atom, _) = AtomRef::read(&buf[..written]).unwrap();
    let mut out = [0u8; 256];
    assert!(serialize_packet_to(&mut out, &fx.urids, &fx.map, atom).is_ok());

    // ...but an object argument is not.
    let mut buf2 = [0u8; 256];
    let mut forge2 = forge_buffer(&mut buf2, fx.urids, &fx.map);
    let frame = forge2.open_message(0, "/odd").unwrap();
    let inner = forge2.open_message(0, "/inner").unwrap();
    forge2.pop(inner);
    forge2.pop(frame);
    let written2 = forge2.written();
    let (atom2, _) = AtomRef::read(&buf2[..written2]).unwrap();
    let mut out2 = [0u8; 256];
    assert_eq!(
        serialize_packet_to(&mut out2, &fx.urids, &fx.map, atom2),
        Err(OscError::Unrepresentable)
    );
}

#[test]
fn test_deep_nesting_is_rejected() {
    let fx = fixture();
    let mut wire = wire_message(b"/deep", b",", &[]);
    for _ in 0..40 {
        wire = wire_bundle(1, &[&wire]);
    }
    let mut buf = vec![0u8; 1 << 16];
    let mut forge = OscForge::new(
        AtomForge::buffer(&mut buf, fx.urids.atom),
        fx.urids,
        &fx.map,
    );
    assert_eq!(
        deserialize_packet(&mut forge, 0, &wire),
        Err(OscError::TooDeep)
    );
    assert_eq!(forge.depth(), 0);
}

#[test]
fn test_blob_with_interior_truncation_fails() {
    let fx = fixture();
    let mut body = Vec::new();
    body.extend_from_slice(&64_i32.to_be_bytes()); // promises 64 bytes
    body.extend_from_slice(&[0; 8]);
    let wire = wire_message(b"/b", b",b", &body);
    let mut buf = [0u8; 512];
    let mut forge = forge_buffer(&mut buf, fx.urids, &fx.map);
    assert_eq!(
        deserialize_packet(&mut forge, 0, &wire),
        Err(OscError::Truncated)
    );
}
