use crate::cursor::Cursor;
use crate::error::Result;
use crate::form::{ChunkEntry, ChunkMagic};
use crate::lists::read_pointer_list;
use crate::pools::{NamedEntry, ResourcePool};
use crate::strings::StringRef;

pub const MAGIC: ChunkMagic = ChunkMagic(*b"SEQN");

/// Sequence pool (name-only). The chunk's presence gates the room-level
/// sequence list.
///
/// Unlike the other pool chunks, the content starts with a u32 format
/// version before the standard pointer list.
#[derive(Debug)]
pub struct Seqn {
    pub format_version: u32,
    pub sequences: ResourcePool<NamedEntry>,
}

impl Seqn {
    pub fn parse(data: &[u8], chunk: &ChunkEntry) -> Result<Self> {
        let mut c = Cursor::new(data);
        c.seek(chunk.data_offset());
        let format_version = c.read_u32()?;
        let mut sequences = ResourcePool::new();
        for entry in read_pointer_list(&mut c, "sequence pool", |c| {
            Ok(NamedEntry {
                name: StringRef::read(c)?,
            })
        })? {
            sequences.push(entry);
        }
        Ok(Self {
            format_version,
            sequences,
        })
    }
}
