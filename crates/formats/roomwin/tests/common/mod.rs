//! In-memory fixture builders shared by the integration tests.
//!
//! Files are assembled through the same writer APIs the crate exposes, so a
//! fixture is both a test input and a regression check on the write path.

use roomwin::chunks::gen8::Gen8;
use roomwin::chunks::room::{Layer, LayerPayload, RoomChunk, RoomId};
use roomwin::chunks::{bgnd, code, gen8, objt, room, seqn, sprt};
use roomwin::form::{ChunkMagic, FormWriter};
use roomwin::lists::write_pointer_list;
use roomwin::strings::{StringPool, StringRef};
use roomwin::version::VersionContext;

pub const STRG_MAGIC: ChunkMagic = ChunkMagic(*b"STRG");

/// Entry counts for the name-only resource pools.
#[derive(Default, Clone, Copy)]
pub struct PoolSpec {
    pub sprites: usize,
    pub tilesets: usize,
    pub objects: usize,
    pub code: usize,
    /// Sequence pool size; the chunk is present only when `Some`.
    pub sequences: Option<usize>,
}

/// Assemble a complete file: GEN8, STRG, pools, optional SEQN, then ROOM.
///
/// `build_rooms` receives the string refs for the interned pool, in
/// interning order. `ctx` governs the room chunk's serialized schema; pass
/// the exact context the file should be read under.
pub fn build_file(
    gen8: &Gen8,
    strings: &StringPool,
    pools: PoolSpec,
    ctx: &VersionContext,
    build_rooms: impl FnOnce(&[StringRef]) -> RoomChunk,
) -> Vec<u8> {
    let mut fw = FormWriter::new();

    fw.chunk(gen8::MAGIC, |w| {
        gen8.write(w);
        Ok(())
    })
    .unwrap();

    let strg_abs = fw.next_data_offset();
    let (strg_data, refs) = strings.layout(strg_abs);
    fw.raw_chunk(STRG_MAGIC, &strg_data);

    let name_of = |i: usize| refs.get(i % refs.len().max(1)).copied().unwrap_or(StringRef::NONE);
    for (magic, count) in [
        (sprt::MAGIC, pools.sprites),
        (bgnd::MAGIC, pools.tilesets),
        (objt::MAGIC, pools.objects),
        (code::MAGIC, pools.code),
    ] {
        fw.chunk(magic, |w| {
            let names: Vec<StringRef> = (0..count).map(&name_of).collect();
            write_pointer_list(w, &names, |w, r| {
                r.write(w);
                Ok(())
            })
        })
        .unwrap();
    }

    if let Some(count) = pools.sequences {
        fw.chunk(seqn::MAGIC, |w| {
            w.write_u32(1); // sequence chunk format version
            let names: Vec<StringRef> = (0..count).map(&name_of).collect();
            write_pointer_list(w, &names, |w, r| {
                r.write(w);
                Ok(())
            })
        })
        .unwrap();
    }

    let rooms = build_rooms(&refs);
    fw.chunk(room::MAGIC, |w| rooms.write(w, ctx)).unwrap();

    fw.finish()
}

/// A layer with neutral base fields.
pub fn layer(name: StringRef, id: u32, depth: i32, payload: LayerPayload) -> Layer {
    Layer {
        owner: RoomId(0),
        name,
        id,
        depth,
        x_offset: 0.0,
        y_offset: 0.0,
        h_speed: 0.0,
        v_speed: 0.0,
        visible: true,
        effect: None,
        payload,
    }
}
