//! Shadow counting pass.
//!
//! Walks the identical version-gated control flow as the read path, with
//! the same pointer jumps, gates and inference probe, but only advances the
//! cursor and tallies addressable objects (elements of pointer lists, rooms
//! included) without materializing any of them. Scalar payloads are skipped
//! by the shared strides from the parent module; any schema change lands in
//! those helpers and reaches both passes at once.

use super::read::effect_fields_present;
use super::*;
use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::form::ChunkEntry;
use crate::lists::walk_pointer_list;
use crate::tilegrid::skip_rle;
use crate::version::VersionContext;

/// Count the addressable objects the full reader would materialize for this
/// chunk, without building them.
///
/// `ctx` must start from the same state the full parse would start from; it
/// is upgraded by version inference exactly as the full parse upgrades it.
pub fn count_objects(data: &[u8], chunk: &ChunkEntry, ctx: &mut VersionContext) -> Result<u64> {
    let mut c = Cursor::new(data);
    c.seek(chunk.data_offset());

    let mut nested = 0u64;
    let rooms = walk_pointer_list(&mut c, "room", |c| {
        nested += count_room(c, ctx)?;
        Ok(())
    })?;
    Ok(rooms + nested)
}

fn read_ptr_slot(c: &mut Cursor, context: &'static str) -> Result<usize> {
    let offset = c.position();
    let v = c.read_u32()?;
    if v == 0 {
        return Err(Error::NullPointer { offset, context });
    }
    Ok(v as usize)
}

fn count_room(c: &mut Cursor, ctx: &mut VersionContext) -> Result<u64> {
    // name .. creation_code: nine scalar words before the flags.
    c.skip(36)?;
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

    // world, bounds, gravity, meters per pixel.
    c.skip(32)?;

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

    let mut count = 0u64;

    c.jump(backgrounds_ptr);
    count += walk_pointer_list(c, "room background", |c| c.skip(ROOM_BACKGROUND_STRIDE))?;
    c.ret();

    c.jump(views_ptr);
    count += walk_pointer_list(c, "view", |c| c.skip(VIEW_STRIDE))?;
    c.ret();

    c.jump(instances_ptr);
    count += walk_pointer_list(c, "instance", |c| c.skip(gameobject_stride(ctx)))?;
    c.ret();

    c.jump(tiles_ptr);
    count += walk_pointer_list(c, "tile", |c| c.skip(LEGACY_TILE_STRIDE))?;
    c.ret();

    if let Some(ptr) = creation_order_ptr {
        c.jump(ptr);
        skip_u32_list(c)?;
        c.ret();
    }

    if let Some(ptr) = layers_ptr {
        c.jump(ptr);
        let mut nested = 0u64;
        let layers = walk_pointer_list(c, "layer", |c| {
            nested += count_layer(c, ctx)?;
            Ok(())
        })?;
        count += layers + nested;
        c.ret();
    }

    if let Some(ptr) = sequences_ptr {
        c.jump(ptr);
        skip_u32_list(c)?;
        c.ret();
    }

    Ok(count)
}

fn count_layer(c: &mut Cursor, ctx: &mut VersionContext) -> Result<u64> {
    c.skip(8)?; // name, id
    let kind_offset = c.position();
    let raw_kind = c.read_u32()?;
    let kind = LayerKind::from_u32(raw_kind).ok_or(Error::UnknownLayerKind {
        offset: kind_offset,
        raw: raw_kind,
    })?;
    // depth, offsets, speeds, visible.
    c.skip(LAYER_BASE_STRIDE - 12)?;

    if effect_fields_present(c, ctx, kind)? {
        c.skip(8)?; // enabled, effect type
        let n = c.read_u32()? as usize;
        c.skip(n * EFFECT_PROPERTY_STRIDE)?;
    }

    match kind {
        LayerKind::Path | LayerKind::Path2 => Ok(0),
        LayerKind::Background => {
            c.skip(40)?;
            Ok(0)
        }
        LayerKind::Instances => {
            skip_u32_list(c)?;
            Ok(0)
        }
        LayerKind::Assets => count_assets(c, ctx),
        LayerKind::Tiles => {
            c.skip(4)?; // tileset
            let tiles_x = c.read_u32()?;
            let tiles_y = c.read_u32()?;
            if ctx.is_non_lts_at_least(2024, 2) {
                skip_rle(c, tiles_x, tiles_y, ctx.is_non_lts_at_least(2024, 4))?;
            } else {
                c.skip(tiles_x as usize * tiles_y as usize * 4)?;
            }
            Ok(0)
        }
        LayerKind::Effect => {
            if effect_payload_has_body(ctx) {
                c.skip(4)?; // effect type
                let n = c.read_u32()? as usize;
                c.skip(n * EFFECT_PROPERTY_STRIDE)?;
            }
            Ok(0)
        }
    }
}

fn count_assets(c: &mut Cursor, ctx: &VersionContext) -> Result<u64> {
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

    let mut count = 0u64;

    c.jump(tiles_ptr);
    count += walk_pointer_list(c, "assets tile", |c| c.skip(LEGACY_TILE_STRIDE))?;
    c.ret();

    c.jump(sprites_ptr);
    count += walk_pointer_list(c, "sprite instance", |c| c.skip(SPRITE_INSTANCE_STRIDE))?;
    c.ret();

    if let Some(ptr) = sequences_ptr {
        c.jump(ptr);
        count += walk_pointer_list(c, "sequence instance", |c| {
            c.skip(SEQUENCE_INSTANCE_STRIDE)
        })?;
        c.ret();
    }

    if let Some(ptr) = nine_slices_ptr {
        c.jump(ptr);
        count += walk_pointer_list(c, "nine-slice", |c| c.skip(SPRITE_INSTANCE_STRIDE))?;
        c.ret();
    }

    if let Some(ptr) = particles_ptr {
        c.jump(ptr);
        count += walk_pointer_list(c, "particle system", |c| c.skip(PARTICLE_INSTANCE_STRIDE))?;
        c.ret();
    }

    if let Some(ptr) = text_ptr {
        c.jump(ptr);
        count += walk_pointer_list(c, "text item", |c| c.skip(TEXT_ITEM_STRIDE))?;
        c.ret();
    }

    Ok(count)
}

fn skip_u32_list(c: &mut Cursor) -> Result<()> {
    let n = c.read_u32()? as usize;
    c.skip(n * 4)
}
