use crate::error::Result;
use crate::form::{ChunkEntry, ChunkMagic};
use crate::pools::{parse_name_pool, NamedEntry, ResourcePool};

pub const MAGIC: ChunkMagic = ChunkMagic(*b"OBJT");

/// Object-definition pool (name-only). Room instances and view follow
/// targets reference entries by ID.
#[derive(Debug)]
pub struct Objt {
    pub objects: ResourcePool<NamedEntry>,
}

impl Objt {
    pub fn parse(data: &[u8], chunk: &ChunkEntry) -> Result<Self> {
        Ok(Self {
            objects: parse_name_pool(data, chunk)?,
        })
    }
}
