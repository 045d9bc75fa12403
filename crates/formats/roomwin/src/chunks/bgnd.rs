use crate::error::Result;
use crate::form::{ChunkEntry, ChunkMagic};
use crate::pools::{parse_name_pool, NamedEntry, ResourcePool};

pub const MAGIC: ChunkMagic = ChunkMagic(*b"BGND");

/// Background/tileset pool. Parsed name-only: room backgrounds and tile
/// layers reference entries by ID, which is all the room codec needs.
#[derive(Debug)]
pub struct Bgnd {
    pub tilesets: ResourcePool<NamedEntry>,
}

impl Bgnd {
    pub fn parse(data: &[u8], chunk: &ChunkEntry) -> Result<Self> {
        Ok(Self {
            tilesets: parse_name_pool(data, chunk)?,
        })
    }
}
