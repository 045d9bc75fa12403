//! Resource pools and the weak references that point into them.
//!
//! Every cross-resource reference in the format is a raw numeric ID written
//! where the referencing entity is serialized. IDs index an append-only pool
//! owned elsewhere (the sprite chunk, the object chunk, ...). References own
//! nothing: they are stored unresolved during the read phase and bound to
//! pool entries by the resolution pass once every pool is populated.

use std::marker::PhantomData;

use crate::cursor::{Cursor, Writer};
use crate::error::Result;
use crate::form::ChunkEntry;
use crate::lists::read_pointer_list;
use crate::strings::StringRef;

/// Marker for the pool a reference resolves against.
pub trait PoolKind {
    /// Pool name, for diagnostics.
    const NAME: &'static str;
}

pub enum SpriteKind {}
pub enum TilesetKind {}
pub enum ObjectKind {}
pub enum CodeKind {}
pub enum SequenceKind {}

impl PoolKind for SpriteKind {
    const NAME: &'static str = "sprite";
}
impl PoolKind for TilesetKind {
    const NAME: &'static str = "tileset";
}
impl PoolKind for ObjectKind {
    const NAME: &'static str = "object";
}
impl PoolKind for CodeKind {
    const NAME: &'static str = "code";
}
impl PoolKind for SequenceKind {
    const NAME: &'static str = "sequence";
}

/// Weak reference to a pool entry, serialized as the entry's ID.
///
/// `-1` is the "none" sentinel. The resolved index is populated only by the
/// resolution pass; an out-of-range ID simply stays unresolved and never
/// aborts a load.
pub struct ResourceRef<K: PoolKind> {
    id: i32,
    resolved: Option<u32>,
    _kind: PhantomData<K>,
}

pub type SpriteRef = ResourceRef<SpriteKind>;
pub type TilesetRef = ResourceRef<TilesetKind>;
pub type ObjectRef = ResourceRef<ObjectKind>;
pub type CodeRef = ResourceRef<CodeKind>;
pub type SequenceRef = ResourceRef<SequenceKind>;

impl<K: PoolKind> ResourceRef<K> {
    pub const NONE_ID: i32 = -1;

    pub fn none() -> Self {
        Self::from_id(Self::NONE_ID)
    }

    pub fn from_id(id: i32) -> Self {
        Self {
            id,
            resolved: None,
            _kind: PhantomData,
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn is_none(&self) -> bool {
        self.id == Self::NONE_ID
    }

    /// Pool index bound by the resolution pass, if any.
    pub fn resolved(&self) -> Option<u32> {
        self.resolved
    }

    /// Bind against a pool of `pool_len` entries. Returns whether the
    /// reference now resolves. The none sentinel counts as resolved.
    pub fn bind(&mut self, pool_len: usize) -> bool {
        if self.is_none() {
            return true;
        }
        if self.id >= 0 && (self.id as usize) < pool_len {
            self.resolved = Some(self.id as u32);
            true
        } else {
            false
        }
    }

    pub fn read(c: &mut Cursor) -> Result<Self> {
        Ok(Self::from_id(c.read_i32()?))
    }

    pub fn write(&self, w: &mut Writer) {
        w.write_i32(self.id);
    }
}

// Manual impls: PhantomData<K> must not force bounds on K.
impl<K: PoolKind> Clone for ResourceRef<K> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            resolved: self.resolved,
            _kind: PhantomData,
        }
    }
}

impl<K: PoolKind> Copy for ResourceRef<K> {}

impl<K: PoolKind> PartialEq for ResourceRef<K> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<K: PoolKind> Eq for ResourceRef<K> {}

impl<K: PoolKind> std::fmt::Debug for ResourceRef<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_none() {
            write!(f, "{}:none", K::NAME)
        } else {
            write!(f, "{}:{}", K::NAME, self.id)?;
            if self.resolved.is_none() {
                write!(f, "?")?;
            }
            Ok(())
        }
    }
}

/// A named pool entry. The resource chunks the room codec needs are parsed
/// name-only; sibling codecs own the full per-resource field sets.
#[derive(Debug, Clone)]
pub struct NamedEntry {
    pub name: StringRef,
}

/// Append-only table of pool entries, addressed by ID (= position).
#[derive(Debug, Default)]
pub struct ResourcePool<T> {
    entries: Vec<T>,
}

impl<T> ResourcePool<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: T) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: i32) -> Option<&T> {
        usize::try_from(id).ok().and_then(|i| self.entries.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }
}

/// Parse a name-only pool chunk: a pointer list of entries whose first field
/// is the name reference.
pub fn parse_name_pool(data: &[u8], chunk: &ChunkEntry) -> Result<ResourcePool<NamedEntry>> {
    let mut c = Cursor::new(data);
    c.seek(chunk.data_offset());
    let entries = read_pointer_list(&mut c, "resource pool", |c| {
        Ok(NamedEntry {
            name: StringRef::read(c)?,
        })
    })?;
    Ok(ResourcePool { entries })
}
