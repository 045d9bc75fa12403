//! High-level lazy wrapper over one data file.

use std::cell::OnceCell;

use crate::chunks::gen8::Gen8;
use crate::chunks::room::{RoomChunk, MAGIC as ROOM_MAGIC};
use crate::chunks::seqn::Seqn;
use crate::chunks::{bgnd, code, objt, seqn, sprt};
use crate::error::{Error, Result};
use crate::form::{locate_embedded_form, ChunkEntry, ChunkIndex, ChunkMagic, FormWriter};
use crate::pools::{NamedEntry, ResourcePool};
use crate::resolve::{resolve_rooms, PoolSizes, ResolutionReport};
use crate::strings::{StringRef, StringTable};
use crate::version::VersionContext;

const GEN8_MAGIC: ChunkMagic = crate::chunks::gen8::MAGIC;
const STRG_MAGIC: ChunkMagic = ChunkMagic(*b"STRG");

/// A loaded data file.
///
/// The chunk index is parsed eagerly; typed chunks parse on first access and
/// cache the result. All state is scoped to this value, so independent files
/// may be loaded concurrently on separate threads, but one `GameFile` is
/// single-threaded: the pools are write-once during parsing and read-many
/// afterwards.
pub struct GameFile {
    data: Vec<u8>,
    index: ChunkIndex,
    gen8: OnceCell<Gen8>,
    strings: OnceCell<StringTable>,
    sprites: OnceCell<ResourcePool<NamedEntry>>,
    tilesets: OnceCell<ResourcePool<NamedEntry>>,
    objects: OnceCell<ResourcePool<NamedEntry>>,
    code: OnceCell<ResourcePool<NamedEntry>>,
    sequences: OnceCell<Option<Seqn>>,
    rooms: OnceCell<(RoomChunk, VersionContext, ResolutionReport)>,
}

impl GameFile {
    /// Parse a data file (or a PE executable with an embedded data file)
    /// from raw bytes.
    ///
    /// A buffer starting with the PE magic `MZ` is scanned for a validated
    /// embedded envelope and trimmed to start there. Only the envelope and
    /// chunk index are parsed here; chunk contents parse lazily.
    pub fn parse(mut data: Vec<u8>) -> Result<Self> {
        if data.starts_with(b"MZ") {
            if let Some(offset) = locate_embedded_form(&data) {
                log::debug!("embedded envelope found at {offset:#x}; stripping PE prefix");
                data.drain(..offset);
            }
        }
        let index = ChunkIndex::parse(&data)?;
        Ok(Self {
            data,
            index,
            gen8: OnceCell::new(),
            strings: OnceCell::new(),
            sprites: OnceCell::new(),
            tilesets: OnceCell::new(),
            objects: OnceCell::new(),
            code: OnceCell::new(),
            sequences: OnceCell::new(),
            rooms: OnceCell::new(),
        })
    }

    /// Raw file data (PE prefix already stripped).
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Chunk index.
    pub fn index(&self) -> &ChunkIndex {
        &self.index
    }

    pub fn has_chunk(&self, magic: ChunkMagic) -> bool {
        self.index.find(magic).is_some()
    }

    /// Game metadata.
    pub fn gen8(&self) -> Result<&Gen8> {
        if let Some(g) = self.gen8.get() {
            return Ok(g);
        }
        let chunk_data = self.index.chunk_data(&self.data, GEN8_MAGIC)?;
        let g = Gen8::parse(chunk_data)?;
        Ok(self.gen8.get_or_init(|| g))
    }

    /// The version context a room parse starts from: metadata version plus
    /// the sequence-chunk presence gate.
    pub fn version_context(&self) -> Result<VersionContext> {
        let g = self.gen8()?;
        Ok(
            VersionContext::new(g.version, g.bytecode_version)
                .with_seqn(self.has_chunk(seqn::MAGIC)),
        )
    }

    /// String pool.
    pub fn strings(&self) -> Result<&StringTable> {
        if let Some(t) = self.strings.get() {
            return Ok(t);
        }
        let entry = self
            .index
            .find(STRG_MAGIC)
            .ok_or(Error::ChunkNotFound { magic: STRG_MAGIC })?;
        let t = StringTable::parse(self.index.entry_data(&self.data, entry), entry.data_offset())?;
        Ok(self.strings.get_or_init(|| t))
    }

    /// Resolve a string reference against the raw file data.
    pub fn resolve_string(&self, r: StringRef) -> Result<String> {
        r.resolve(&self.data)
    }

    /// Sprite pool. Empty when the file has no sprite chunk.
    pub fn sprites(&self) -> Result<&ResourcePool<NamedEntry>> {
        self.name_pool(&self.sprites, sprt::MAGIC)
    }

    /// Background/tileset pool. Empty when absent.
    pub fn tilesets(&self) -> Result<&ResourcePool<NamedEntry>> {
        self.name_pool(&self.tilesets, bgnd::MAGIC)
    }

    /// Object-definition pool. Empty when absent.
    pub fn objects(&self) -> Result<&ResourcePool<NamedEntry>> {
        self.name_pool(&self.objects, objt::MAGIC)
    }

    /// Code-entry pool. Empty when absent.
    pub fn code(&self) -> Result<&ResourcePool<NamedEntry>> {
        self.name_pool(&self.code, code::MAGIC)
    }

    fn name_pool<'a>(
        &'a self,
        cell: &'a OnceCell<ResourcePool<NamedEntry>>,
        magic: ChunkMagic,
    ) -> Result<&'a ResourcePool<NamedEntry>> {
        if let Some(p) = cell.get() {
            return Ok(p);
        }
        let pool = match self.index.find(magic) {
            Some(entry) => crate::pools::parse_name_pool(&self.data, entry)?,
            None => ResourcePool::new(),
        };
        Ok(cell.get_or_init(|| pool))
    }

    /// Sequence pool, or `None` when the file carries no sequence chunk.
    pub fn sequences(&self) -> Result<Option<&Seqn>> {
        if let Some(s) = self.sequences.get() {
            return Ok(s.as_ref());
        }
        let parsed = match self.index.find(seqn::MAGIC) {
            Some(entry) => Some(Seqn::parse(&self.data, entry)?),
            None => None,
        };
        Ok(self.sequences.get_or_init(|| parsed).as_ref())
    }

    /// Parse the room chunk with a fresh context and run the resolution
    /// pass. Returns an owned graph suitable for mutation and write-back,
    /// plus the context as upgraded by version inference.
    pub fn parse_rooms(&self) -> Result<(RoomChunk, VersionContext, ResolutionReport)> {
        let entry = self.room_entry()?;
        let mut ctx = self.version_context()?;
        let mut chunk = RoomChunk::parse(&self.data, entry, &mut ctx)?;

        let pools = PoolSizes {
            sprites: self.sprites()?.len(),
            tilesets: self.tilesets()?.len(),
            objects: self.objects()?.len(),
            code: self.code()?.len(),
            sequences: self.sequences()?.map_or(0, |s| s.sequences.len()),
        };
        let report = resolve_rooms(&mut chunk.rooms, &pools);
        Ok((chunk, ctx, report))
    }

    /// Cached rooms accessor: parses and resolves on first use.
    pub fn rooms(&self) -> Result<&RoomChunk> {
        Ok(&self.rooms_inner()?.0)
    }

    /// The version context after room parsing, inference upgrades included.
    pub fn room_version_context(&self) -> Result<&VersionContext> {
        Ok(&self.rooms_inner()?.1)
    }

    /// Resolution report for the cached room parse.
    pub fn resolution_report(&self) -> Result<ResolutionReport> {
        Ok(self.rooms_inner()?.2)
    }

    fn rooms_inner(&self) -> Result<&(RoomChunk, VersionContext, ResolutionReport)> {
        if let Some(r) = self.rooms.get() {
            return Ok(r);
        }
        let parsed = self.parse_rooms()?;
        Ok(self.rooms.get_or_init(|| parsed))
    }

    /// Count the addressable room objects without materializing the graph.
    /// Cheap upper bound for progress reporting before a full parse.
    pub fn count_room_objects(&self) -> Result<u64> {
        let entry = self.room_entry()?;
        let mut ctx = self.version_context()?;
        crate::chunks::room::counting::count_objects(&self.data, entry, &mut ctx)
    }

    fn room_entry(&self) -> Result<&ChunkEntry> {
        self.index
            .find(ROOM_MAGIC)
            .ok_or(Error::ChunkNotFound { magic: ROOM_MAGIC })
    }

    /// Rebuild the file with `rooms` serialized in place of the original
    /// room chunk; every other chunk is copied verbatim.
    ///
    /// With an unmodified graph and the context returned by
    /// [`parse_rooms`](GameFile::parse_rooms), the output is byte-identical
    /// to the input.
    pub fn write(&self, rooms: &RoomChunk, ctx: &VersionContext) -> Result<Vec<u8>> {
        let mut fw = FormWriter::new();
        for entry in self.index.chunks() {
            if entry.magic == ROOM_MAGIC {
                fw.chunk(entry.magic, |w| rooms.write(w, ctx))?;
            } else {
                fw.raw_chunk(entry.magic, self.index.entry_data(&self.data, entry));
            }
        }
        Ok(fw.finish())
    }
}

impl std::fmt::Debug for GameFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameFile")
            .field("size", &self.data.len())
            .field("chunks", &self.index.len())
            .finish()
    }
}
