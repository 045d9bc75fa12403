//! Room resources: the full object graph and its codec.
//!
//! The read path ([`read`]), write path ([`write`]) and counting pass
//! ([`counting`]) walk the same version-gated schema. Version-dependent
//! strides and pointer-slot counts live here as shared helpers so that a
//! schema change cannot update one path without the others; the read path
//! additionally asserts its consumption against the shared strides in debug
//! builds.

pub mod counting;
pub mod read;
pub mod write;

use crate::form::ChunkMagic;
use crate::pools::{CodeRef, ObjectRef, SpriteRef, TilesetRef};
use crate::strings::StringRef;
use crate::tilegrid::TileGrid;
use crate::version::VersionContext;

pub const MAGIC: ChunkMagic = ChunkMagic(*b"ROOM");

/// Index of a room within its chunk. Layers carry one as a non-owning
/// back-reference to the room that owns them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomId(pub usize);

/// Room flag bits.
///
/// The low bits are behavior toggles; the high bits mark the engine
/// generation, which selects between the legacy tile path and the modern
/// layer path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomFlags(pub u32);

impl RoomFlags {
    pub const ENABLE_VIEWS: u32 = 0x1;
    pub const SHOW_COLOR: u32 = 0x2;
    pub const CLEAR_DISPLAY_BUFFER: u32 = 0x4;
    /// Modern engine generation: the room serializes layers, not tiles.
    pub const ENGINE_V2: u32 = 0x20000;
    /// Generation 2.3 refinement marker.
    pub const ENGINE_V2_3: u32 = 0x10000;

    pub fn contains(self, bits: u32) -> bool {
        self.0 & bits == bits
    }

    /// Whether this room uses the modern (layer) path.
    pub fn modern_engine(self) -> bool {
        self.contains(Self::ENGINE_V2)
    }
}

/// One room entry.
///
/// The room exclusively owns its child collections; dropping it tears the
/// whole subtree down. Exactly one of `legacy_tiles` / `layers` is populated,
/// selected by the engine-generation flag.
#[derive(Debug)]
pub struct Room {
    pub name: StringRef,
    pub caption: StringRef,
    pub width: u32,
    pub height: u32,
    pub speed: u32,
    pub persistent: bool,
    /// In-memory color always carries an opaque alpha; the stored form has
    /// alpha zero (OR 0xFF000000 on read, XOR on write).
    pub background_color: u32,
    pub draw_background_color: bool,
    pub creation_code: CodeRef,
    pub flags: RoomFlags,
    pub world: bool,
    pub top: i32,
    pub left: i32,
    pub right: i32,
    pub bottom: i32,
    pub gravity_x: f32,
    pub gravity_y: f32,
    pub meters_per_pixel: f32,
    pub backgrounds: Vec<RoomBackground>,
    pub views: Vec<View>,
    pub instances: Vec<GameObject>,
    /// Legacy path only. Empty on modern rooms.
    pub legacy_tiles: Vec<LegacyTile>,
    /// Non-LTS 2024.13+.
    pub instance_creation_order: Option<Vec<u32>>,
    /// Modern path only.
    pub layers: Option<Vec<Layer>>,
    /// Present when the file carries a sequence chunk.
    pub sequence_ids: Option<Vec<u32>>,
}

impl Room {
    /// An empty room with the given flags; populated by the reader or by
    /// editor mutation.
    pub fn empty(name: StringRef, flags: RoomFlags) -> Self {
        Self {
            name,
            caption: StringRef::NONE,
            width: 0,
            height: 0,
            speed: 30,
            persistent: false,
            background_color: 0xFF00_0000,
            draw_background_color: false,
            creation_code: CodeRef::none(),
            flags,
            world: false,
            top: 0,
            left: 0,
            right: 0,
            bottom: 0,
            gravity_x: 0.0,
            gravity_y: 10.0,
            meters_per_pixel: 0.1,
            backgrounds: Vec::new(),
            views: Vec::new(),
            instances: Vec::new(),
            legacy_tiles: Vec::new(),
            instance_creation_order: None,
            layers: if flags.modern_engine() {
                Some(Vec::new())
            } else {
                None
            },
            sequence_ids: None,
        }
    }

    /// Set the background color, returning whether the effective draw color
    /// changed (callers recompute their color layer on `true`).
    pub fn set_background_color(&mut self, color: u32) -> bool {
        let color = color | 0xFF00_0000;
        let changed = self.background_color != color;
        self.background_color = color;
        changed && self.draw_background_color
    }

    /// Number of addressable objects in this room's subtree, the room itself
    /// included. Matches what the counting pass counts for one room.
    pub fn addressable_objects(&self) -> u64 {
        let mut n = 1 + self.backgrounds.len() as u64
            + self.views.len() as u64
            + self.instances.len() as u64
            + self.legacy_tiles.len() as u64;
        if let Some(layers) = &self.layers {
            n += layers.len() as u64;
            for layer in layers {
                if let LayerPayload::Assets(assets) = &layer.payload {
                    n += assets.legacy_tiles.len() as u64 + assets.sprites.len() as u64;
                    n += assets.sequences.as_ref().map_or(0, |v| v.len() as u64);
                    n += assets.nine_slices.as_ref().map_or(0, |v| v.len() as u64);
                    n += assets
                        .particle_systems
                        .as_ref()
                        .map_or(0, |v| v.len() as u64);
                    n += assets.text_items.as_ref().map_or(0, |v| v.len() as u64);
                }
            }
        }
        n
    }
}

/// Legacy-path room background slot.
#[derive(Debug, Clone)]
pub struct RoomBackground {
    pub enabled: bool,
    pub foreground: bool,
    pub definition: TilesetRef,
    pub x: i32,
    pub y: i32,
    pub tile_x: bool,
    pub tile_y: bool,
    pub speed_x: i32,
    pub speed_y: i32,
    pub stretch: bool,
}

/// A view/port pair.
#[derive(Debug, Clone)]
pub struct View {
    pub enabled: bool,
    pub view_x: i32,
    pub view_y: i32,
    pub view_width: i32,
    pub view_height: i32,
    pub port_x: i32,
    pub port_y: i32,
    pub port_width: i32,
    pub port_height: i32,
    pub border_x: u32,
    pub border_y: u32,
    pub speed_x: i32,
    pub speed_y: i32,
    pub follow_object: ObjectRef,
}

/// An object instance placed in a room.
#[derive(Debug, Clone)]
pub struct GameObject {
    pub x: i32,
    pub y: i32,
    pub object: ObjectRef,
    /// Instance ID, unique per file.
    pub instance_id: u32,
    pub creation_code: CodeRef,
    pub scale_x: f32,
    pub scale_y: f32,
    /// 2.2.2.302+.
    pub image_speed: Option<f32>,
    /// 2.2.2.302+.
    pub image_index: Option<i32>,
    pub color: u32,
    pub rotation: f32,
    /// Bytecode 16+.
    pub pre_create_code: Option<CodeRef>,
    /// True only on placeholders synthesized by the resolution pass for
    /// instance IDs with no matching object. Never serialized.
    pub nonexistent: bool,
}

impl GameObject {
    /// Placeholder for a dangling instance ID. Keeps the ID so write-back
    /// stays faithful.
    pub fn nonexistent(instance_id: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            object: ObjectRef::none(),
            instance_id,
            creation_code: CodeRef::none(),
            scale_x: 1.0,
            scale_y: 1.0,
            image_speed: None,
            image_index: None,
            color: 0xFFFF_FFFF,
            rotation: 0.0,
            pre_create_code: None,
            nonexistent: true,
        }
    }
}

/// What a legacy tile's definition ID resolves against. The two modes are
/// mutually exclusive by construction: modern-generation rooms cut tiles
/// from sprites, legacy-generation rooms from backgrounds/tilesets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileDefinition {
    Sprite(SpriteRef),
    Tileset(TilesetRef),
}

impl TileDefinition {
    pub fn id(&self) -> i32 {
        match self {
            Self::Sprite(r) => r.id(),
            Self::Tileset(r) => r.id(),
        }
    }

    pub fn mode_name(&self) -> &'static str {
        match self {
            Self::Sprite(_) => "sprite",
            Self::Tileset(_) => "tileset",
        }
    }
}

/// A single placed tile (legacy path, or inside an assets layer).
#[derive(Debug, Clone)]
pub struct LegacyTile {
    pub x: i32,
    pub y: i32,
    pub definition: TileDefinition,
    pub source_x: u32,
    pub source_y: u32,
    pub width: u32,
    pub height: u32,
    pub depth: i32,
    pub instance_id: u32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub color: u32,
}

/// Layer type tag as serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Path = 0,
    Background = 1,
    Instances = 2,
    Assets = 3,
    Tiles = 4,
    Effect = 6,
    /// 2024.13+.
    Path2 = 7,
}

impl LayerKind {
    pub fn from_u32(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Path),
            1 => Some(Self::Background),
            2 => Some(Self::Instances),
            3 => Some(Self::Assets),
            4 => Some(Self::Tiles),
            6 => Some(Self::Effect),
            7 => Some(Self::Path2),
            _ => None,
        }
    }
}

/// One layer of a modern-path room.
#[derive(Debug)]
pub struct Layer {
    /// Non-owning back-reference to the owning room.
    pub owner: RoomId,
    pub name: StringRef,
    pub id: u32,
    pub depth: i32,
    pub x_offset: f32,
    pub y_offset: f32,
    pub h_speed: f32,
    pub v_speed: f32,
    pub visible: bool,
    /// 2022.1+: effect state lives in the layer base record.
    pub effect: Option<LayerEffect>,
    pub payload: LayerPayload,
}

/// Effect fields carried by every layer from 2022.1 on.
#[derive(Debug, Clone, Default)]
pub struct LayerEffect {
    pub enabled: bool,
    pub effect_type: StringRef,
    pub properties: Vec<EffectProperty>,
}

#[derive(Debug, Clone)]
pub struct EffectProperty {
    pub kind: i32,
    pub name: StringRef,
    pub value: StringRef,
}

/// Layer payload, keyed by [`LayerKind`]. Path layers carry no payload.
#[derive(Debug)]
pub enum LayerPayload {
    Path,
    Path2,
    Background(BackgroundPayload),
    Instances(InstancesData),
    Assets(AssetsPayload),
    Tiles(TilesPayload),
    Effect(EffectPayload),
}

impl LayerPayload {
    pub fn kind(&self) -> LayerKind {
        match self {
            Self::Path => LayerKind::Path,
            Self::Path2 => LayerKind::Path2,
            Self::Background(_) => LayerKind::Background,
            Self::Instances(_) => LayerKind::Instances,
            Self::Assets(_) => LayerKind::Assets,
            Self::Tiles(_) => LayerKind::Tiles,
            Self::Effect(_) => LayerKind::Effect,
        }
    }
}

/// Background-layer payload.
#[derive(Debug, Clone)]
pub struct BackgroundPayload {
    pub visible: bool,
    pub foreground: bool,
    pub sprite: SpriteRef,
    pub tiled_horizontally: bool,
    pub tiled_vertically: bool,
    pub stretch: bool,
    pub color: u32,
    pub first_frame: f32,
    pub animation_speed: f32,
    pub animation_speed_type: u32,
}

impl BackgroundPayload {
    /// Set stretching, returning whether the derived scale needs
    /// recomputation.
    pub fn set_stretch(&mut self, stretch: bool) -> bool {
        let changed = self.stretch != stretch;
        self.stretch = stretch;
        changed
    }
}

/// Instances-layer payload: raw IDs as stored, plus the binding produced by
/// the resolution pass.
#[derive(Debug, Default)]
pub struct InstancesData {
    /// Instance IDs exactly as read; the write path emits these.
    pub instance_ids: Vec<u32>,
    /// One entry per ID after resolution: either an index into the owning
    /// room's `instances`, or a synthesized nonexistent placeholder.
    pub resolved: Vec<ResolvedInstance>,
}

#[derive(Debug)]
pub enum ResolvedInstance {
    Placed(usize),
    Placeholder(GameObject),
}

/// Tiles-layer payload. `tiles_x`/`tiles_y` are the serialized dimensions;
/// the writer refuses a grid whose cell count disagrees with them.
#[derive(Debug)]
pub struct TilesPayload {
    pub tileset: TilesetRef,
    pub tiles_x: u32,
    pub tiles_y: u32,
    pub grid: TileGrid,
}

/// Assets-layer payload. The optional lists are version-gated; `None` means
/// "not present in this file's schema", an empty vec means "present, empty".
#[derive(Debug, Default)]
pub struct AssetsPayload {
    pub legacy_tiles: Vec<LegacyTile>,
    pub sprites: Vec<SpriteInstance>,
    /// 2.3+.
    pub sequences: Option<Vec<SequenceInstance>>,
    /// Only below 2.3.2.
    pub nine_slices: Option<Vec<SpriteInstance>>,
    /// 2023.2+.
    pub particle_systems: Option<Vec<ParticleSystemInstance>>,
    /// Non-LTS 2024.6+.
    pub text_items: Option<Vec<TextItem>>,
}

#[derive(Debug, Clone)]
pub struct SpriteInstance {
    pub name: StringRef,
    pub sprite: SpriteRef,
    pub x: i32,
    pub y: i32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub color: u32,
    pub animation_speed: f32,
    pub animation_speed_type: u32,
    pub frame_index: f32,
    pub rotation: f32,
}

#[derive(Debug, Clone)]
pub struct SequenceInstance {
    pub name: StringRef,
    pub sequence: crate::pools::SequenceRef,
    pub x: i32,
    pub y: i32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub color: u32,
    pub animation_speed: f32,
    pub animation_speed_type: u32,
    pub frame_index: f32,
    pub rotation: f32,
}

#[derive(Debug, Clone)]
pub struct ParticleSystemInstance {
    pub name: StringRef,
    /// Particle-system asset ID. The particle chunk is outside this codec;
    /// the ID is preserved raw.
    pub particle_system: i32,
    pub x: i32,
    pub y: i32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub color: u32,
    pub rotation: f32,
}

#[derive(Debug, Clone)]
pub struct TextItem {
    pub x: i32,
    pub y: i32,
    /// Font asset ID, preserved raw.
    pub font: i32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub rotation: f32,
    pub color: u32,
    pub origin_x: f32,
    pub origin_y: f32,
    pub text: StringRef,
    pub line_spacing: f32,
    pub frame_width: f32,
    pub frame_height: f32,
    pub wrap: bool,
}

/// Effect-layer payload. From 2022.1 the body serializes to nothing (the
/// fields migrated into the layer base record) and the payload mirrors the
/// base-record effect state instead.
#[derive(Debug, Clone, Default)]
pub struct EffectPayload {
    pub effect_type: StringRef,
    pub properties: Vec<EffectProperty>,
}

/// Parsed room chunk.
#[derive(Debug)]
pub struct RoomChunk {
    pub rooms: Vec<Room>,
}

impl RoomChunk {
    /// Total addressable objects in the chunk, as the counting pass defines
    /// them.
    pub fn addressable_objects(&self) -> u64 {
        self.rooms.iter().map(Room::addressable_objects).sum()
    }
}

// ── Shared schema-shape helpers ──────────────────────────────────────────────
// Consumed by the read path, the write path and the counting pass. Strides
// are in bytes.

pub(crate) const ROOM_BACKGROUND_STRIDE: usize = 40;
pub(crate) const VIEW_STRIDE: usize = 56;
pub(crate) const LEGACY_TILE_STRIDE: usize = 48;
pub(crate) const LAYER_BASE_STRIDE: usize = 36;
pub(crate) const SPRITE_INSTANCE_STRIDE: usize = 44;
pub(crate) const SEQUENCE_INSTANCE_STRIDE: usize = 44;
pub(crate) const PARTICLE_INSTANCE_STRIDE: usize = 32;
pub(crate) const TEXT_ITEM_STRIDE: usize = 56;
pub(crate) const EFFECT_PROPERTY_STRIDE: usize = 12;

/// Serialized size of one room instance under the given version gates.
pub(crate) fn gameobject_stride(ctx: &VersionContext) -> usize {
    let mut words = 7; // x, y, object, instance_id, creation_code, scales
    if ctx.is_at_least(2, 2, 2, 302) {
        words += 2; // image_speed, image_index
    }
    words += 2; // color, rotation
    if ctx.bytecode().has_pre_create_code() {
        words += 1;
    }
    words * 4
}

/// Number of sub-list pointer slots in an assets payload under the given
/// version gates, in serialization order.
pub(crate) fn assets_ptr_slots(ctx: &VersionContext) -> usize {
    let mut slots = 2; // legacy tiles, sprites
    if ctx.is_at_least(2, 3, 0, 0) {
        slots += 1; // sequences
    }
    if !ctx.is_at_least(2, 3, 2, 0) {
        slots += 1; // nine slices
    }
    if ctx.is_at_least(2023, 2, 0, 0) {
        slots += 1; // particle systems
    }
    if ctx.is_non_lts_at_least(2024, 6) {
        slots += 1; // text items
    }
    slots
}

/// Whether the effect-layer payload has a serialized body. From 2022.1 the
/// fields live in the layer base record and the body is skipped entirely.
pub(crate) fn effect_payload_has_body(ctx: &VersionContext) -> bool {
    !ctx.is_at_least(2022, 1, 0, 0)
}
