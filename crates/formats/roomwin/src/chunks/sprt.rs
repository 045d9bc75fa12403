use crate::error::Result;
use crate::form::{ChunkEntry, ChunkMagic};
use crate::pools::{parse_name_pool, NamedEntry, ResourcePool};

pub const MAGIC: ChunkMagic = ChunkMagic(*b"SPRT");

/// Sprite pool (name-only). Modern tiles and sprite-asset instances resolve
/// their definition IDs against this pool.
#[derive(Debug)]
pub struct Sprt {
    pub sprites: ResourcePool<NamedEntry>,
}

impl Sprt {
    pub fn parse(data: &[u8], chunk: &ChunkEntry) -> Result<Self> {
        Ok(Self {
            sprites: parse_name_pool(data, chunk)?,
        })
    }
}
