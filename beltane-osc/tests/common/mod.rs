//! Shared fixtures for the codec integration tests.
#![allow(dead_code)]

use beltane_atom::{pad_size, AtomForge, AtomRef, MemoryMap};
use beltane_osc::{deserialize_packet, serialize_packet_to, OscError, OscForge, OscUrids};

pub struct Fixture {
    pub map: MemoryMap,
    pub urids: OscUrids,
}

pub fn fixture() -> Fixture {
    let map = MemoryMap::new();
    let urids = OscUrids::map(&map).expect("vocabulary maps");
    Fixture { map, urids }
}

impl Fixture {
    /// Deserialize a wire packet and return the atom bytes it produced.
    pub fn deserialize(&self, wire: &[u8]) -> Result<Vec<u8>, OscError> {
        let mut buf = vec![0u8; 1 << 16];
        let mut forge = OscForge::new(
            AtomForge::buffer(&mut buf, self.urids.atom),
            self.urids,
            &self.map,
        );
        deserialize_packet(&mut forge, 0, wire)?;
        let written = forge.written();
        buf.truncate(written);
        Ok(buf)
    }

    /// Serialize a packet object (given as atom bytes) back to the wire.
    pub fn serialize(&self, atoms: &[u8]) -> Result<Vec<u8>, OscError> {
        let (atom, _) = AtomRef::read(atoms).expect("well-formed atom bytes");
        let mut out = vec![0u8; 1 << 16];
        let n = serialize_packet_to(&mut out, &self.urids, &self.map, atom)?;
        out.truncate(n);
        Ok(out)
    }
}

/// Assemble a wire message: padded path, padded format, argument bodies.
pub fn wire_message(path: &[u8], format: &[u8], body: &[u8]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(path);
    buf.push(0);
    buf.resize(pad_size(buf.len()), 0);
    buf.extend_from_slice(format);
    buf.push(0);
    buf.resize(pad_size(buf.len()), 0);
    buf.extend_from_slice(body);
    buf
}

/// Assemble a wire bundle from its timetag bits and item regions.
pub fn wire_bundle(timestamp: u64, items: &[&[u8]]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"#bundle\0");
    buf.extend_from_slice(&timestamp.to_be_bytes());
    for item in items {
        buf.extend_from_slice(&(item.len() as i32).to_be_bytes());
        buf.extend_from_slice(item);
    }
    buf
}
