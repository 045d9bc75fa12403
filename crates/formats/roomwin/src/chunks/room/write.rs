//! Room write path.
//!
//! Field order is identical to the read path. Sub-list pointer slots are
//! reserved up front and backpatched as each body is emitted; bodies follow
//! in the same order as their slots. The writer never infers versions;
//! callers pass the context the file was (or will be) read under, upgrades
//! included.

use super::*;
use crate::cursor::Writer;
use crate::error::{Error, Result};
use crate::lists::{write_pointer_list, write_simple_list, write_u32_list};
use crate::tilegrid::{encode_raw, encode_rle};
use crate::version::VersionContext;

impl RoomChunk {
    /// Serialize the chunk content.
    ///
    /// `w` must be positioned at an absolute file offset (see
    /// [`crate::form::FormWriter`]); backpatched pointers are absolute.
    pub fn write(&self, w: &mut Writer, ctx: &VersionContext) -> Result<()> {
        write_pointer_list(w, &self.rooms, |w, room| write_room(w, room, ctx))
    }
}

fn write_room(w: &mut Writer, room: &Room, ctx: &VersionContext) -> Result<()> {
    let modern = room.flags.modern_engine();
    // Exactly one of the two paths may be populated.
    if modern && !room.legacy_tiles.is_empty() {
        return Err(Error::ConflictingRoomPaths);
    }
    if !modern && room.layers.as_ref().is_some_and(|l| !l.is_empty()) {
        return Err(Error::ConflictingRoomPaths);
    }

    room.name.write(w);
    room.caption.write(w);
    w.write_u32(room.width);
    w.write_u32(room.height);
    w.write_u32(room.speed);
    w.write_bool32(room.persistent);
    // In-memory color is opaque; the stored form has alpha zero.
    w.write_u32(room.background_color ^ 0xFF00_0000);
    w.write_bool32(room.draw_background_color);
    room.creation_code.write(w);
    w.write_u32(room.flags.0);

    let backgrounds_slot = w.reserve_u32();
    let views_slot = w.reserve_u32();
    let instances_slot = w.reserve_u32();
    let tiles_slot = w.reserve_u32();
    let creation_order_slot = if ctx.is_non_lts_at_least(2024, 13) {
        Some(w.reserve_u32())
    } else {
        None
    };

    w.write_bool32(room.world);
    w.write_i32(room.top);
    w.write_i32(room.left);
    w.write_i32(room.right);
    w.write_i32(room.bottom);
    w.write_f32(room.gravity_x);
    w.write_f32(room.gravity_y);
    w.write_f32(room.meters_per_pixel);

    let (layers_slot, sequences_slot) = if modern {
        let l = w.reserve_u32();
        let s = if ctx.has_seqn() {
            Some(w.reserve_u32())
        } else {
            None
        };
        (Some(l), s)
    } else {
        (None, None)
    };

    w.patch_u32(backgrounds_slot, w.position() as u32);
    write_pointer_list(w, &room.backgrounds, |w, bg| {
        write_room_background(w, bg);
        Ok(())
    })?;

    w.patch_u32(views_slot, w.position() as u32);
    write_pointer_list(w, &room.views, |w, view| {
        write_view(w, view);
        Ok(())
    })?;

    w.patch_u32(instances_slot, w.position() as u32);
    write_pointer_list(w, &room.instances, |w, obj| {
        write_game_object(w, obj, ctx);
        Ok(())
    })?;

    w.patch_u32(tiles_slot, w.position() as u32);
    write_pointer_list(w, &room.legacy_tiles, |w, tile| {
        write_legacy_tile(w, tile, modern)
    })?;

    if let Some(slot) = creation_order_slot {
        w.patch_u32(slot, w.position() as u32);
        write_u32_list(w, room.instance_creation_order.as_deref().unwrap_or(&[]));
    }

    if let Some(slot) = layers_slot {
        w.patch_u32(slot, w.position() as u32);
        let layers = room.layers.as_deref().unwrap_or(&[]);
        write_pointer_list(w, layers, |w, layer| write_layer(w, layer, ctx))?;
    }

    if let Some(slot) = sequences_slot {
        w.patch_u32(slot, w.position() as u32);
        write_u32_list(w, room.sequence_ids.as_deref().unwrap_or(&[]));
    }

    Ok(())
}

fn write_room_background(w: &mut Writer, bg: &RoomBackground) {
    w.write_bool32(bg.enabled);
    w.write_bool32(bg.foreground);
    bg.definition.write(w);
    w.write_i32(bg.x);
    w.write_i32(bg.y);
    w.write_bool32(bg.tile_x);
    w.write_bool32(bg.tile_y);
    w.write_i32(bg.speed_x);
    w.write_i32(bg.speed_y);
    w.write_bool32(bg.stretch);
}

fn write_view(w: &mut Writer, view: &View) {
    w.write_bool32(view.enabled);
    w.write_i32(view.view_x);
    w.write_i32(view.view_y);
    w.write_i32(view.view_width);
    w.write_i32(view.view_height);
    w.write_i32(view.port_x);
    w.write_i32(view.port_y);
    w.write_i32(view.port_width);
    w.write_i32(view.port_height);
    w.write_u32(view.border_x);
    w.write_u32(view.border_y);
    w.write_i32(view.speed_x);
    w.write_i32(view.speed_y);
    view.follow_object.write(w);
}

fn write_game_object(w: &mut Writer, obj: &GameObject, ctx: &VersionContext) {
    w.write_i32(obj.x);
    w.write_i32(obj.y);
    obj.object.write(w);
    w.write_u32(obj.instance_id);
    obj.creation_code.write(w);
    w.write_f32(obj.scale_x);
    w.write_f32(obj.scale_y);
    if ctx.is_at_least(2, 2, 2, 302) {
        w.write_f32(obj.image_speed.unwrap_or(1.0));
        w.write_i32(obj.image_index.unwrap_or(0));
    }
    w.write_u32(obj.color);
    w.write_f32(obj.rotation);
    if ctx.bytecode().has_pre_create_code() {
        obj.pre_create_code
            .unwrap_or_else(crate::pools::CodeRef::none)
            .write(w);
    }
}

/// Write one placed tile, rejecting a definition mode that contradicts the
/// engine generation.
fn write_legacy_tile(w: &mut Writer, tile: &LegacyTile, sprite_mode: bool) -> Result<()> {
    let matches_mode = matches!(
        (&tile.definition, sprite_mode),
        (TileDefinition::Sprite(_), true) | (TileDefinition::Tileset(_), false)
    );
    if !matches_mode {
        return Err(Error::TileModeMismatch {
            x: tile.x,
            y: tile.y,
            mode: tile.definition.mode_name(),
            expected: if sprite_mode { "sprite" } else { "tileset" },
        });
    }

    w.write_i32(tile.x);
    w.write_i32(tile.y);
    w.write_i32(tile.definition.id());
    w.write_u32(tile.source_x);
    w.write_u32(tile.source_y);
    w.write_u32(tile.width);
    w.write_u32(tile.height);
    w.write_i32(tile.depth);
    w.write_u32(tile.instance_id);
    w.write_f32(tile.scale_x);
    w.write_f32(tile.scale_y);
    w.write_u32(tile.color);
    Ok(())
}

fn write_layer(w: &mut Writer, layer: &Layer, ctx: &VersionContext) -> Result<()> {
    layer.name.write(w);
    w.write_u32(layer.id);
    w.write_u32(layer.payload.kind() as u32);
    w.write_i32(layer.depth);
    w.write_f32(layer.x_offset);
    w.write_f32(layer.y_offset);
    w.write_f32(layer.h_speed);
    w.write_f32(layer.v_speed);
    w.write_bool32(layer.visible);

    if ctx.is_at_least(2022, 1, 0, 0) {
        let effect = layer.effect.clone().unwrap_or_default();
        w.write_bool32(effect.enabled);
        effect.effect_type.write(w);
        write_simple_list(w, &effect.properties, |w, p| {
            write_effect_property(w, p);
            Ok(())
        })?;
    }

    match &layer.payload {
        LayerPayload::Path | LayerPayload::Path2 => {}
        LayerPayload::Background(bg) => write_background_payload(w, bg),
        LayerPayload::Instances(data) => write_u32_list(w, &data.instance_ids),
        LayerPayload::Assets(assets) => write_assets_payload(w, assets, ctx)?,
        LayerPayload::Tiles(tiles) => write_tiles_payload(w, tiles, ctx)?,
        LayerPayload::Effect(effect) => {
            // From 2022.1 the body is skipped entirely; the state already
            // went out with the base record above.
            if effect_payload_has_body(ctx) {
                effect.effect_type.write(w);
                write_simple_list(w, &effect.properties, |w, p| {
                    write_effect_property(w, p);
                    Ok(())
                })?;
            }
        }
    }
    Ok(())
}

fn write_effect_property(w: &mut Writer, p: &EffectProperty) {
    w.write_i32(p.kind);
    p.name.write(w);
    p.value.write(w);
}

fn write_background_payload(w: &mut Writer, bg: &BackgroundPayload) {
    w.write_bool32(bg.visible);
    w.write_bool32(bg.foreground);
    bg.sprite.write(w);
    w.write_bool32(bg.tiled_horizontally);
    w.write_bool32(bg.tiled_vertically);
    w.write_bool32(bg.stretch);
    w.write_u32(bg.color);
    w.write_f32(bg.first_frame);
    w.write_f32(bg.animation_speed);
    w.write_u32(bg.animation_speed_type);
}

fn write_assets_payload(w: &mut Writer, assets: &AssetsPayload, ctx: &VersionContext) -> Result<()> {
    let tiles_slot = w.reserve_u32();
    let sprites_slot = w.reserve_u32();
    let sequences_slot = if ctx.is_at_least(2, 3, 0, 0) {
        Some(w.reserve_u32())
    } else {
        None
    };
    let nine_slices_slot = if !ctx.is_at_least(2, 3, 2, 0) {
        Some(w.reserve_u32())
    } else {
        None
    };
    let particles_slot = if ctx.is_at_least(2023, 2, 0, 0) {
        Some(w.reserve_u32())
    } else {
        None
    };
    let text_slot = if ctx.is_non_lts_at_least(2024, 6) {
        Some(w.reserve_u32())
    } else {
        None
    };

    w.patch_u32(tiles_slot, w.position() as u32);
    write_pointer_list(w, &assets.legacy_tiles, |w, tile| {
        // Assets layers exist only on the modern path: sprite mode.
        write_legacy_tile(w, tile, true)
    })?;

    w.patch_u32(sprites_slot, w.position() as u32);
    write_pointer_list(w, &assets.sprites, |w, s| {
        write_sprite_instance(w, s);
        Ok(())
    })?;

    if let Some(slot) = sequences_slot {
        w.patch_u32(slot, w.position() as u32);
        write_pointer_list(w, assets.sequences.as_deref().unwrap_or(&[]), |w, s| {
            write_sequence_instance(w, s);
            Ok(())
        })?;
    }

    if let Some(slot) = nine_slices_slot {
        w.patch_u32(slot, w.position() as u32);
        write_pointer_list(w, assets.nine_slices.as_deref().unwrap_or(&[]), |w, s| {
            write_sprite_instance(w, s);
            Ok(())
        })?;
    }

    if let Some(slot) = particles_slot {
        w.patch_u32(slot, w.position() as u32);
        write_pointer_list(
            w,
            assets.particle_systems.as_deref().unwrap_or(&[]),
            |w, p| {
                write_particle_instance(w, p);
                Ok(())
            },
        )?;
    }

    if let Some(slot) = text_slot {
        w.patch_u32(slot, w.position() as u32);
        write_pointer_list(w, assets.text_items.as_deref().unwrap_or(&[]), |w, t| {
            write_text_item(w, t);
            Ok(())
        })?;
    }

    Ok(())
}

fn write_sprite_instance(w: &mut Writer, s: &SpriteInstance) {
    s.name.write(w);
    s.sprite.write(w);
    w.write_i32(s.x);
    w.write_i32(s.y);
    w.write_f32(s.scale_x);
    w.write_f32(s.scale_y);
    w.write_u32(s.color);
    w.write_f32(s.animation_speed);
    w.write_u32(s.animation_speed_type);
    w.write_f32(s.frame_index);
    w.write_f32(s.rotation);
}

fn write_sequence_instance(w: &mut Writer, s: &SequenceInstance) {
    s.name.write(w);
    s.sequence.write(w);
    w.write_i32(s.x);
    w.write_i32(s.y);
    w.write_f32(s.scale_x);
    w.write_f32(s.scale_y);
    w.write_u32(s.color);
    w.write_f32(s.animation_speed);
    w.write_u32(s.animation_speed_type);
    w.write_f32(s.frame_index);
    w.write_f32(s.rotation);
}

fn write_particle_instance(w: &mut Writer, p: &ParticleSystemInstance) {
    p.name.write(w);
    w.write_i32(p.particle_system);
    w.write_i32(p.x);
    w.write_i32(p.y);
    w.write_f32(p.scale_x);
    w.write_f32(p.scale_y);
    w.write_u32(p.color);
    w.write_f32(p.rotation);
}

fn write_text_item(w: &mut Writer, t: &TextItem) {
    w.write_i32(t.x);
    w.write_i32(t.y);
    w.write_i32(t.font);
    w.write_f32(t.scale_x);
    w.write_f32(t.scale_y);
    w.write_f32(t.rotation);
    w.write_u32(t.color);
    w.write_f32(t.origin_x);
    w.write_f32(t.origin_y);
    t.text.write(w);
    w.write_f32(t.line_spacing);
    w.write_f32(t.frame_width);
    w.write_f32(t.frame_height);
    w.write_bool32(t.wrap);
}

fn write_tiles_payload(w: &mut Writer, tiles: &TilesPayload, ctx: &VersionContext) -> Result<()> {
    let declared = tiles.tiles_x as usize * tiles.tiles_y as usize;
    if tiles.grid.cells().len() != declared
        || tiles.grid.tiles_x() != tiles.tiles_x
        || tiles.grid.tiles_y() != tiles.tiles_y
    {
        return Err(Error::GridDimensionMismatch {
            tiles_x: tiles.tiles_x,
            tiles_y: tiles.tiles_y,
            actual: tiles.grid.cells().len(),
        });
    }

    tiles.tileset.write(w);
    w.write_u32(tiles.tiles_x);
    w.write_u32(tiles.tiles_y);
    if ctx.is_non_lts_at_least(2024, 2) {
        encode_rle(w, &tiles.grid, ctx.is_non_lts_at_least(2024, 4));
    } else {
        encode_raw(w, &tiles.grid);
    }
    Ok(())
}
