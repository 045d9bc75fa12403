use crate::error::Result;
use crate::form::{ChunkEntry, ChunkMagic};
use crate::pools::{parse_name_pool, NamedEntry, ResourcePool};

pub const MAGIC: ChunkMagic = ChunkMagic(*b"CODE");

/// Code-entry pool (name-only). Creation-code and pre-create references in
/// rooms are IDs into this pool; the bytecode itself is outside the room
/// codec's scope.
#[derive(Debug)]
pub struct Code {
    pub entries: ResourcePool<NamedEntry>,
}

impl Code {
    pub fn parse(data: &[u8], chunk: &ChunkEntry) -> Result<Self> {
        Ok(Self {
            entries: parse_name_pool(data, chunk)?,
        })
    }
}
