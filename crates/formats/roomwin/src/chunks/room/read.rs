//! Room read path.
//!
//! One cursor walks the whole file; pointer targets are followed with
//! [`Cursor::jump`]/[`Cursor::ret`] so sub-lists can live anywhere in the
//! buffer. Every version gate consults the [`VersionContext`] threaded down
//! from the caller, and the assets-layer probe may upgrade it mid-parse.

use super::*;
use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::form::ChunkEntry;
use crate::lists::{read_pointer_list, read_simple_list, read_u32_list};
use crate::pools::{CodeRef, ObjectRef, SequenceRef, SpriteRef, TilesetRef};
use crate::strings::StringRef;
use crate::tilegrid::{decode_raw, decode_rle};
use crate::version::{GmVersion, VersionContext};

impl RoomChunk {
    /// Parse the room chunk.
    ///
    /// `data` is the entire file (pointers are absolute); `chunk` locates the
    /// room chunk within it. `ctx` may be upgraded by version inference and
    /// afterwards reflects the version every gate was evaluated under.
    pub fn parse(data: &[u8], chunk: &ChunkEntry, ctx: &mut VersionContext) -> Result<Self> {
        let mut c = Cursor::new(data);
        c.seek(chunk.data_offset());

        let mut next = 0usize;
        let rooms = read_pointer_list(&mut c, "room", |c| {
            let room = read_room(c, ctx, RoomId(next))?;
            next += 1;
            Ok(room)
        })?;
        log::debug!("parsed {} room(s)", rooms.len());
        Ok(Self { rooms })
    }
}

/// Read a pointer slot that must not be null: the target is a list header,
/// which exists (with count 0) even when the list is empty.
fn read_ptr_slot(c: &mut Cursor, context: &'static str) -> Result<usize> {
    let offset = c.position();
    let v = c.read_u32()?;
    if v == 0 {
        return Err(Error::NullPointer { offset, context });
    }
    Ok(v as usize)
}

fn read_room(c: &mut Cursor, ctx: &mut VersionContext, id: RoomId) -> Result<Room> {
    let room_offset = c.position();

    let name = StringRef::read(c)?;
    let caption = StringRef::read(c)?;
    let width = c.read_u32()?;
    let height = c.read_u32()?;
    let speed = c.read_u32()?;
    let persistent = c.read_bool32()?;
    // Stored with alpha zero; force opaque in memory.
    let background_color = c.read_u32()? | 0xFF00_0000;
    let draw_background_color = c.read_bool32()?;
    let creation_code = CodeRef::read(c)?;
    let flags = RoomFlags(c.read_u32()?);

    let backgrounds_ptr = read_ptr_slot(c, "room backgrounds")?;
    let views_ptr = read_ptr_slot(c, "room views")?;
    let instances_ptr = read_ptr_slot(c, "room instances")?;
    let tiles_ptr = read_ptr_slot(c, "room tiles")?;
    let creation_order_ptr = if ctx.is_non_lts_at_least(2024, 13) {
        Some(read_ptr_slot(c, "instance creation order")?)
    } else {
        None
    };

    let world = c.read_bool32()?;
    let top = c.read_i32()?;
    let left = c.read_i32()?;
    let right = c.read_i32()?;
    let bottom = c.read_i32()?;
    let gravity_x = c.read_f32()?;
    let gravity_y = c.read_f32()?;
    let meters_per_pixel = c.read_f32()?;

    let modern = flags.modern_engine();
    let (layers_ptr, sequences_ptr) = if modern {
        let lp = read_ptr_slot(c, "room layers")?;
        let sp = if ctx.has_seqn() {
            Some(read_ptr_slot(c, "room sequences")?)
        } else {
            None
        };
        (Some(lp), sp)
    } else {
        (None, None)
    };

    c.jump(backgrounds_ptr);
    let backgrounds = read_pointer_list(c, "room background", read_room_background)?;
    c.ret();

    c.jump(views_ptr);
    let views = read_pointer_list(c, "view", read_view)?;
    c.ret();

    c.jump(instances_ptr);
    let instances = read_pointer_list(c, "instance", |c| read_game_object(c, ctx))?;
    c.ret();

    c.jump(tiles_ptr);
    let legacy_tiles = read_pointer_list(c, "tile", |c| read_legacy_tile(c, modern))?;
    c.ret();

    let instance_creation_order = match creation_order_ptr {
        Some(ptr) => {
            c.jump(ptr);
            let ids = read_u32_list(c)?;
            c.ret();
            Some(ids)
        }
        None => None,
    };

    let layers = match layers_ptr {
        Some(ptr) => {
            c.jump(ptr);
            let layers = read_pointer_list(c, "layer", |c| read_layer(c, ctx, id))?;
            c.ret();
            Some(layers)
        }
        None => None,
    };

    let sequence_ids = match sequences_ptr {
        Some(ptr) => {
            c.jump(ptr);
            let ids = read_u32_list(c)?;
            c.ret();
            Some(ids)
        }
        None => None,
    };

    if !legacy_tiles.is_empty() && layers.as_ref().is_some_and(|l| !l.is_empty()) {
        log::warn!(
            "room at {room_offset:#x} populates both the tile and layer paths"
        );
    }

    Ok(Room {
        name,
        caption,
        width,
        height,
        speed,
        persistent,
        background_color,
        draw_background_color,
        creation_code,
        flags,
        world,
        top,
        left,
        right,
        bottom,
        gravity_x,
        gravity_y,
        meters_per_pixel,
        backgrounds,
        views,
        instances,
        legacy_tiles,
        instance_creation_order,
        layers,
        sequence_ids,
    })
}

fn read_room_background(c: &mut Cursor) -> Result<RoomBackground> {
    let start = c.position();
    let bg = RoomBackground {
        enabled: c.read_bool32()?,
        foreground: c.read_bool32()?,
        definition: TilesetRef::read(c)?,
        x: c.read_i32()?,
        y: c.read_i32()?,
        tile_x: c.read_bool32()?,
        tile_y: c.read_bool32()?,
        speed_x: c.read_i32()?,
        speed_y: c.read_i32()?,
        stretch: c.read_bool32()?,
    };
    debug_assert_eq!(c.position() - start, ROOM_BACKGROUND_STRIDE);
    Ok(bg)
}

fn read_view(c: &mut Cursor) -> Result<View> {
    let start = c.position();
    let view = View {
        enabled: c.read_bool32()?,
        view_x: c.read_i32()?,
        view_y: c.read_i32()?,
        view_width: c.read_i32()?,
        view_height: c.read_i32()?,
        port_x: c.read_i32()?,
        port_y: c.read_i32()?,
        port_width: c.read_i32()?,
        port_height: c.read_i32()?,
        border_x: c.read_u32()?,
        border_y: c.read_u32()?,
        speed_x: c.read_i32()?,
        speed_y: c.read_i32()?,
        follow_object: ObjectRef::read(c)?,
    };
    debug_assert_eq!(c.position() - start, VIEW_STRIDE);
    Ok(view)
}

fn read_game_object(c: &mut Cursor, ctx: &VersionContext) -> Result<GameObject> {
    let start = c.position();
    let x = c.read_i32()?;
    let y = c.read_i32()?;
    let object = ObjectRef::read(c)?;
    let instance_id = c.read_u32()?;
    let creation_code = CodeRef::read(c)?;
    let scale_x = c.read_f32()?;
    let scale_y = c.read_f32()?;
    let (image_speed, image_index) = if ctx.is_at_least(2, 2, 2, 302) {
        (Some(c.read_f32()?), Some(c.read_i32()?))
    } else {
        (None, None)
    };
    let color = c.read_u32()?;
    let rotation = c.read_f32()?;
    let pre_create_code = if ctx.bytecode().has_pre_create_code() {
        Some(CodeRef::read(c)?)
    } else {
        None
    };
    debug_assert_eq!(c.position() - start, gameobject_stride(ctx));

    Ok(GameObject {
        x,
        y,
        object,
        instance_id,
        creation_code,
        scale_x,
        scale_y,
        image_speed,
        image_index,
        color,
        rotation,
        pre_create_code,
        nonexistent: false,
    })
}

/// Read one placed tile. `sprite_mode` reflects the room's engine
/// generation: modern rooms cut tiles from sprites, legacy rooms from
/// tilesets.
fn read_legacy_tile(c: &mut Cursor, sprite_mode: bool) -> Result<LegacyTile> {
    let start = c.position();
    let x = c.read_i32()?;
    let y = c.read_i32()?;
    let definition = if sprite_mode {
        TileDefinition::Sprite(SpriteRef::read(c)?)
    } else {
        TileDefinition::Tileset(TilesetRef::read(c)?)
    };
    let tile = LegacyTile {
        x,
        y,
        definition,
        source_x: c.read_u32()?,
        source_y: c.read_u32()?,
        width: c.read_u32()?,
        height: c.read_u32()?,
        depth: c.read_i32()?,
        instance_id: c.read_u32()?,
        scale_x: c.read_f32()?,
        scale_y: c.read_f32()?,
        color: c.read_u32()?,
    };
    debug_assert_eq!(c.position() - start, LEGACY_TILE_STRIDE);
    Ok(tile)
}

/// Decide whether the 2022.1 effect fields are present between the layer
/// base record and the payload, upgrading `ctx` when they are detected.
///
/// Below 2022.1 the decision is made by probing the next word, but only for
/// assets payloads: their first word is a sub-list pointer, which always
/// targets past the cursor. A smaller value cannot be a pointer: it is the
/// effect-enabled flag that 2022.1 inserted before the payload, proving the
/// file is newer than its metadata claims. The upgrade sticks for the rest
/// of the load. The cursor is left where it was.
pub(crate) fn effect_fields_present(
    c: &mut Cursor,
    ctx: &mut VersionContext,
    kind: LayerKind,
) -> Result<bool> {
    if ctx.is_at_least(2022, 1, 0, 0) {
        return Ok(true);
    }
    if kind != LayerKind::Assets {
        return Ok(false);
    }
    let probe_at = c.position();
    let word = c.read_u32()? as usize;
    c.seek(probe_at);
    if word < probe_at {
        log::debug!(
            "effect fields present before assets payload at {probe_at:#x}; \
             inferring version 2022.1"
        );
        ctx.upgrade_to(GmVersion::new(2022, 1, 0, 0));
        Ok(true)
    } else {
        Ok(false)
    }
}

fn read_layer(c: &mut Cursor, ctx: &mut VersionContext, owner: RoomId) -> Result<Layer> {
    let start = c.position();
    let name = StringRef::read(c)?;
    let id = c.read_u32()?;
    let kind_offset = c.position();
    let raw_kind = c.read_u32()?;
    let kind = LayerKind::from_u32(raw_kind).ok_or(Error::UnknownLayerKind {
        offset: kind_offset,
        raw: raw_kind,
    })?;
    let depth = c.read_i32()?;
    let x_offset = c.read_f32()?;
    let y_offset = c.read_f32()?;
    let h_speed = c.read_f32()?;
    let v_speed = c.read_f32()?;
    let visible = c.read_bool32()?;
    debug_assert_eq!(c.position() - start, LAYER_BASE_STRIDE);

    let effect = if effect_fields_present(c, ctx, kind)? {
        Some(read_layer_effect(c)?)
    } else {
        None
    };

    let payload = match kind {
        LayerKind::Path => LayerPayload::Path,
        LayerKind::Path2 => LayerPayload::Path2,
        LayerKind::Background => LayerPayload::Background(read_background_payload(c)?),
        LayerKind::Instances => LayerPayload::Instances(InstancesData {
            instance_ids: read_u32_list(c)?,
            resolved: Vec::new(),
        }),
        LayerKind::Assets => LayerPayload::Assets(read_assets_payload(c, ctx)?),
        LayerKind::Tiles => LayerPayload::Tiles(read_tiles_payload(c, ctx)?),
        LayerKind::Effect => {
            if effect_payload_has_body(ctx) {
                LayerPayload::Effect(EffectPayload {
                    effect_type: StringRef::read(c)?,
                    properties: read_simple_list(c, read_effect_property)?,
                })
            } else {
                // Body absent from 2022.1 on; mirror the base-record state.
                let e = effect.clone().unwrap_or_default();
                LayerPayload::Effect(EffectPayload {
                    effect_type: e.effect_type,
                    properties: e.properties,
                })
            }
        }
    };

    Ok(Layer {
        owner,
        name,
        id,
        depth,
        x_offset,
        y_offset,
        h_speed,
        v_speed,
        visible,
        effect,
        payload,
    })
}

fn read_layer_effect(c: &mut Cursor) -> Result<LayerEffect> {
    Ok(LayerEffect {
        enabled: c.read_bool32()?,
        effect_type: StringRef::read(c)?,
        properties: read_simple_list(c, read_effect_property)?,
    })
}

fn read_effect_property(c: &mut Cursor) -> Result<EffectProperty> {
    let start = c.position();
    let p = EffectProperty {
        kind: c.read_i32()?,
        name: StringRef::read(c)?,
        value: StringRef::read(c)?,
    };
    debug_assert_eq!(c.position() - start, EFFECT_PROPERTY_STRIDE);
    Ok(p)
}

fn read_background_payload(c: &mut Cursor) -> Result<BackgroundPayload> {
    Ok(BackgroundPayload {
        visible: c.read_bool32()?,
        foreground: c.read_bool32()?,
        sprite: SpriteRef::read(c)?,
        tiled_horizontally: c.read_bool32()?,
        tiled_vertically: c.read_bool32()?,
        stretch: c.read_bool32()?,
        color: c.read_u32()?,
        first_frame: c.read_f32()?,
        animation_speed: c.read_f32()?,
        animation_speed_type: c.read_u32()?,
    })
}

fn read_assets_payload(c: &mut Cursor, ctx: &VersionContext) -> Result<AssetsPayload> {
    let tiles_ptr = read_ptr_slot(c, "assets tiles")?;
    let sprites_ptr = read_ptr_slot(c, "assets sprites")?;
    let sequences_ptr = if ctx.is_at_least(2, 3, 0, 0) {
        Some(read_ptr_slot(c, "assets sequences")?)
    } else {
        None
    };
    let nine_slices_ptr = if !ctx.is_at_least(2, 3, 2, 0) {
        Some(read_ptr_slot(c, "assets nine-slices")?)
    } else {
        None
    };
    let particles_ptr = if ctx.is_at_least(2023, 2, 0, 0) {
        Some(read_ptr_slot(c, "assets particle systems")?)
    } else {
        None
    };
    let text_ptr = if ctx.is_non_lts_at_least(2024, 6) {
        Some(read_ptr_slot(c, "assets text items")?)
    } else {
        None
    };

    c.jump(tiles_ptr);
    // Assets layers only exist on the modern path, so tiles are sprite-mode.
    let legacy_tiles = read_pointer_list(c, "assets tile", |c| read_legacy_tile(c, true))?;
    c.ret();

    c.jump(sprites_ptr);
    let sprites = read_pointer_list(c, "sprite instance", read_sprite_instance)?;
    c.ret();

    let sequences = match sequences_ptr {
        Some(ptr) => {
            c.jump(ptr);
            let v = read_pointer_list(c, "sequence instance", read_sequence_instance)?;
            c.ret();
            Some(v)
        }
        None => None,
    };

    let nine_slices = match nine_slices_ptr {
        Some(ptr) => {
            c.jump(ptr);
            let v = read_pointer_list(c, "nine-slice", read_sprite_instance)?;
            c.ret();
            Some(v)
        }
        None => None,
    };

    let particle_systems = match particles_ptr {
        Some(ptr) => {
            c.jump(ptr);
            let v = read_pointer_list(c, "particle system", read_particle_instance)?;
            c.ret();
            Some(v)
        }
        None => None,
    };

    let text_items = match text_ptr {
        Some(ptr) => {
            c.jump(ptr);
            let v = read_pointer_list(c, "text item", read_text_item)?;
            c.ret();
            Some(v)
        }
        None => None,
    };

    Ok(AssetsPayload {
        legacy_tiles,
        sprites,
        sequences,
        nine_slices,
        particle_systems,
        text_items,
    })
}

fn read_sprite_instance(c: &mut Cursor) -> Result<SpriteInstance> {
    let start = c.position();
    let s = SpriteInstance {
        name: StringRef::read(c)?,
        sprite: SpriteRef::read(c)?,
        x: c.read_i32()?,
        y: c.read_i32()?,
        scale_x: c.read_f32()?,
        scale_y: c.read_f32()?,
        color: c.read_u32()?,
        animation_speed: c.read_f32()?,
        animation_speed_type: c.read_u32()?,
        frame_index: c.read_f32()?,
        rotation: c.read_f32()?,
    };
    debug_assert_eq!(c.position() - start, SPRITE_INSTANCE_STRIDE);
    Ok(s)
}

fn read_sequence_instance(c: &mut Cursor) -> Result<SequenceInstance> {
    let start = c.position();
    let s = SequenceInstance {
        name: StringRef::read(c)?,
        sequence: SequenceRef::read(c)?,
        x: c.read_i32()?,
        y: c.read_i32()?,
        scale_x: c.read_f32()?,
        scale_y: c.read_f32()?,
        color: c.read_u32()?,
        animation_speed: c.read_f32()?,
        animation_speed_type: c.read_u32()?,
        frame_index: c.read_f32()?,
        rotation: c.read_f32()?,
    };
    debug_assert_eq!(c.position() - start, SEQUENCE_INSTANCE_STRIDE);
    Ok(s)
}

fn read_particle_instance(c: &mut Cursor) -> Result<ParticleSystemInstance> {
    let start = c.position();
    let p = ParticleSystemInstance {
        name: StringRef::read(c)?,
        particle_system: c.read_i32()?,
        x: c.read_i32()?,
        y: c.read_i32()?,
        scale_x: c.read_f32()?,
        scale_y: c.read_f32()?,
        color: c.read_u32()?,
        rotation: c.read_f32()?,
    };
    debug_assert_eq!(c.position() - start, PARTICLE_INSTANCE_STRIDE);
    Ok(p)
}

fn read_text_item(c: &mut Cursor) -> Result<TextItem> {
    let start = c.position();
    let t = TextItem {
        x: c.read_i32()?,
        y: c.read_i32()?,
        font: c.read_i32()?,
        scale_x: c.read_f32()?,
        scale_y: c.read_f32()?,
        rotation: c.read_f32()?,
        color: c.read_u32()?,
        origin_x: c.read_f32()?,
        origin_y: c.read_f32()?,
        text: StringRef::read(c)?,
        line_spacing: c.read_f32()?,
        frame_width: c.read_f32()?,
        frame_height: c.read_f32()?,
        wrap: c.read_bool32()?,
    };
    debug_assert_eq!(c.position() - start, TEXT_ITEM_STRIDE);
    Ok(t)
}

fn read_tiles_payload(c: &mut Cursor, ctx: &VersionContext) -> Result<TilesPayload> {
    let tileset = TilesetRef::read(c)?;
    let tiles_x = c.read_u32()?;
    let tiles_y = c.read_u32()?;
    let grid = if ctx.is_non_lts_at_least(2024, 2) {
        decode_rle(c, tiles_x, tiles_y, ctx.is_non_lts_at_least(2024, 4))?
    } else {
        decode_raw(c, tiles_x, tiles_y)?
    };
    Ok(TilesPayload {
        tileset,
        tiles_x,
        tiles_y,
        grid,
    })
}
