mod common;

use common::{build_file, layer, PoolSpec};
use roomwin::chunks::gen8::Gen8;
use roomwin::chunks::room::{
    AssetsPayload, BackgroundPayload, EffectPayload, EffectProperty, GameObject, InstancesData,
    LayerEffect, LayerPayload, LegacyTile, ParticleSystemInstance, ResolvedInstance, Room,
    RoomBackground, RoomChunk, RoomFlags, SequenceInstance, SpriteInstance, TextItem,
    TileDefinition, TilesPayload, View,
};
use roomwin::cursor::Writer;
use roomwin::pools::{CodeRef, ObjectRef, SequenceRef, SpriteRef, TilesetRef};
use roomwin::strings::{StringPool, StringRef};
use roomwin::tilegrid::TileGrid;
use roomwin::version::{BytecodeVersion, GmVersion, VersionContext};
use roomwin::{Error, GameFile};

fn game_object(x: i32, instance_id: u32, modern: bool) -> GameObject {
    GameObject {
        x,
        y: 64,
        object: ObjectRef::from_id(0),
        instance_id,
        creation_code: CodeRef::none(),
        scale_x: 1.0,
        scale_y: 1.0,
        image_speed: modern.then_some(1.0),
        image_index: modern.then_some(0),
        color: 0xFFFF_FFFF,
        rotation: 0.0,
        pre_create_code: modern.then(CodeRef::none),
        nonexistent: false,
    }
}

fn sprite_instance(name: StringRef) -> SpriteInstance {
    SpriteInstance {
        name,
        sprite: SpriteRef::from_id(0),
        x: 5,
        y: 6,
        scale_x: 1.0,
        scale_y: 1.0,
        color: 0xFFFF_FFFF,
        animation_speed: 1.0,
        animation_speed_type: 0,
        frame_index: 0.0,
        rotation: 0.0,
    }
}

fn assets_tile() -> LegacyTile {
    LegacyTile {
        x: 0,
        y: 0,
        definition: TileDefinition::Sprite(SpriteRef::from_id(0)),
        source_x: 0,
        source_y: 0,
        width: 16,
        height: 16,
        depth: 0,
        instance_id: 10_000_100,
        scale_x: 1.0,
        scale_y: 1.0,
        color: 0xFFFF_FFFF,
    }
}

// ── Legacy path ──────────────────────────────────────────────────────────────

fn legacy_file() -> Vec<u8> {
    let version = GmVersion::new(1, 4, 9999, 0);
    let ctx = VersionContext::new(version, BytecodeVersion::V15);
    let gen8 = Gen8::synthetic(version, BytecodeVersion::V15);

    let mut strings = StringPool::new();
    let name = strings.intern("rm_cellar");
    let caption = strings.intern("The Cellar");

    build_file(
        &gen8,
        &strings,
        PoolSpec {
            sprites: 1,
            tilesets: 2,
            objects: 2,
            code: 1,
            sequences: None,
        },
        &ctx,
        |refs| {
            let mut rm = Room::empty(
                refs[name],
                RoomFlags(RoomFlags::ENABLE_VIEWS | RoomFlags::SHOW_COLOR),
            );
            rm.caption = refs[caption];
            rm.width = 640;
            rm.height = 480;
            rm.background_color = 0xFF20_3040;
            rm.draw_background_color = true;
            rm.creation_code = CodeRef::from_id(0);
            rm.backgrounds.push(RoomBackground {
                enabled: true,
                foreground: false,
                definition: TilesetRef::from_id(1),
                x: 0,
                y: 0,
                tile_x: true,
                tile_y: true,
                speed_x: 0,
                speed_y: 0,
                stretch: false,
            });
            rm.views.push(View {
                enabled: true,
                view_x: 0,
                view_y: 0,
                view_width: 320,
                view_height: 240,
                port_x: 0,
                port_y: 0,
                port_width: 640,
                port_height: 480,
                border_x: 32,
                border_y: 32,
                speed_x: -1,
                speed_y: -1,
                follow_object: ObjectRef::from_id(1),
            });
            rm.instances.push(game_object(32, 100_001, false));
            rm.instances.push(game_object(96, 100_002, false));
            rm.legacy_tiles.push(LegacyTile {
                x: 48,
                y: 48,
                definition: TileDefinition::Tileset(TilesetRef::from_id(0)),
                source_x: 16,
                source_y: 0,
                width: 16,
                height: 16,
                depth: 1_000_000,
                instance_id: 10_000_001,
                scale_x: 1.0,
                scale_y: 1.0,
                color: 0xFFFF_FFFF,
            });
            RoomChunk { rooms: vec![rm] }
        },
    )
}

#[test]
fn legacy_room_reads_back() {
    let bytes = legacy_file();
    let gf = GameFile::parse(bytes).unwrap();
    let rooms = gf.rooms().unwrap();
    assert_eq!(rooms.rooms.len(), 1);

    let rm = &rooms.rooms[0];
    assert_eq!(gf.resolve_string(rm.name).unwrap(), "rm_cellar");
    assert_eq!(gf.resolve_string(rm.caption).unwrap(), "The Cellar");
    assert_eq!((rm.width, rm.height), (640, 480));
    assert!(!rm.persistent);
    assert!(rm.flags.contains(RoomFlags::ENABLE_VIEWS));
    assert!(!rm.flags.modern_engine());
    assert!(rm.layers.is_none());
    assert_eq!(rm.instances.len(), 2);
    assert_eq!(rm.views[0].follow_object.id(), 1);
    assert!(matches!(
        rm.legacy_tiles[0].definition,
        TileDefinition::Tileset(_)
    ));

    // Legacy references resolved against the pools.
    let report = gf.resolution_report().unwrap();
    assert_eq!(report.unresolved, 0);
    assert_eq!(report.placeholders, 0);
    assert_eq!(rm.legacy_tiles[0].definition, TileDefinition::Tileset(TilesetRef::from_id(0)));
}

#[test]
fn legacy_round_trip_is_byte_identical() {
    let bytes = legacy_file();
    let gf = GameFile::parse(bytes.clone()).unwrap();
    let (rooms, ctx, _) = gf.parse_rooms().unwrap();
    let rewritten = gf.write(&rooms, &ctx).unwrap();
    assert_eq!(rewritten, bytes);
}

// ── Modern path ──────────────────────────────────────────────────────────────

fn modern_23_file() -> Vec<u8> {
    let version = GmVersion::new(2, 3, 0, 0);
    let ctx = VersionContext::new(version, BytecodeVersion::V17).with_seqn(true);
    let gen8 = Gen8::synthetic(version, BytecodeVersion::V17);

    let mut strings = StringPool::new();
    let name = strings.intern("rm_overworld");
    let lyr_bg = strings.intern("lyr_backdrop");
    let lyr_inst = strings.intern("lyr_actors");
    let lyr_tiles = strings.intern("lyr_ground");
    let lyr_assets = strings.intern("lyr_props");
    let lyr_fx = strings.intern("lyr_weather");
    let fx_kind = strings.intern("_filter_rain");
    let fx_prop = strings.intern("intensity");
    let fx_val = strings.intern("0.4");
    let prop_name = strings.intern("spr_lantern");

    build_file(
        &gen8,
        &strings,
        PoolSpec {
            sprites: 2,
            tilesets: 1,
            objects: 1,
            code: 0,
            sequences: Some(2),
        },
        &ctx,
        |refs| {
            let mut rm = Room::empty(
                refs[name],
                RoomFlags(
                    RoomFlags::ENGINE_V2 | RoomFlags::ENGINE_V2_3 | RoomFlags::CLEAR_DISPLAY_BUFFER,
                ),
            );
            rm.width = 1366;
            rm.height = 768;
            rm.instances.push(game_object(10, 100_050, true));
            rm.sequence_ids = Some(vec![0, 1]);

            let grid = TileGrid::from_cells(4, 2, vec![1, 1, 1, 1, 2, 2, 3, 4]).unwrap();
            rm.layers = Some(vec![
                layer(
                    refs[lyr_bg],
                    1,
                    200,
                    LayerPayload::Background(BackgroundPayload {
                        visible: true,
                        foreground: false,
                        sprite: SpriteRef::from_id(1),
                        tiled_horizontally: true,
                        tiled_vertically: false,
                        stretch: false,
                        color: 0xFFFF_FFFF,
                        first_frame: 0.0,
                        animation_speed: 1.0,
                        animation_speed_type: 0,
                    }),
                ),
                layer(
                    refs[lyr_inst],
                    2,
                    100,
                    LayerPayload::Instances(InstancesData {
                        // 424_242 exists nowhere: the resolution pass must
                        // synthesize a placeholder for it.
                        instance_ids: vec![100_050, 424_242],
                        resolved: Vec::new(),
                    }),
                ),
                layer(
                    refs[lyr_tiles],
                    3,
                    300,
                    LayerPayload::Tiles(TilesPayload {
                        tileset: TilesetRef::from_id(0),
                        tiles_x: 4,
                        tiles_y: 2,
                        grid,
                    }),
                ),
                layer(
                    refs[lyr_assets],
                    4,
                    50,
                    LayerPayload::Assets(AssetsPayload {
                        legacy_tiles: vec![assets_tile()],
                        sprites: vec![sprite_instance(refs[prop_name])],
                        sequences: Some(vec![SequenceInstance {
                            name: refs[prop_name],
                            sequence: SequenceRef::from_id(1),
                            x: 7,
                            y: 8,
                            scale_x: 1.0,
                            scale_y: 1.0,
                            color: 0xFFFF_FFFF,
                            animation_speed: 1.0,
                            animation_speed_type: 0,
                            frame_index: 0.0,
                            rotation: 0.0,
                        }]),
                        nine_slices: Some(vec![sprite_instance(refs[prop_name])]),
                        particle_systems: None,
                        text_items: None,
                    }),
                ),
                layer(
                    refs[lyr_fx],
                    5,
                    -100,
                    LayerPayload::Effect(EffectPayload {
                        effect_type: refs[fx_kind],
                        properties: vec![EffectProperty {
                            kind: 0,
                            name: refs[fx_prop],
                            value: refs[fx_val],
                        }],
                    }),
                ),
            ]);
            RoomChunk { rooms: vec![rm] }
        },
    )
}

#[test]
fn modern_room_reads_back() {
    let gf = GameFile::parse(modern_23_file()).unwrap();
    let rooms = gf.rooms().unwrap();
    let rm = &rooms.rooms[0];

    assert!(rm.flags.modern_engine());
    assert!(rm.legacy_tiles.is_empty());
    assert_eq!(rm.sequence_ids.as_deref(), Some(&[0u32, 1][..]));

    let layers = rm.layers.as_ref().unwrap();
    assert_eq!(layers.len(), 5);
    // Pre-2022.1 file: no effect fields in the base record.
    assert!(layers.iter().all(|l| l.effect.is_none()));

    let LayerPayload::Tiles(tiles) = &layers[2].payload else {
        panic!("expected tiles payload");
    };
    assert_eq!((tiles.tiles_x, tiles.tiles_y), (4, 2));
    assert_eq!(tiles.grid.get(3, 1), Some(4));

    let LayerPayload::Assets(assets) = &layers[3].payload else {
        panic!("expected assets payload");
    };
    assert!(matches!(
        assets.legacy_tiles[0].definition,
        TileDefinition::Sprite(_)
    ));
    assert!(assets.sequences.is_some());
    assert!(assets.nine_slices.is_some()); // pre-2.3.2 schema
    assert!(assets.particle_systems.is_none());
    assert!(assets.text_items.is_none());

    let LayerPayload::Effect(fx) = &layers[4].payload else {
        panic!("expected effect payload");
    };
    assert_eq!(gf.resolve_string(fx.effect_type).unwrap(), "_filter_rain");
    assert_eq!(fx.properties.len(), 1);
}

#[test]
fn modern_round_trip_is_byte_identical() {
    let bytes = modern_23_file();
    let gf = GameFile::parse(bytes.clone()).unwrap();
    let (rooms, ctx, _) = gf.parse_rooms().unwrap();
    let rewritten = gf.write(&rooms, &ctx).unwrap();
    assert_eq!(rewritten, bytes);
}

#[test]
fn dangling_instance_id_yields_one_placeholder() {
    let gf = GameFile::parse(modern_23_file()).unwrap();
    let rooms = gf.rooms().unwrap();
    let report = gf.resolution_report().unwrap();
    assert_eq!(report.placeholders, 1);

    let layers = rooms.rooms[0].layers.as_ref().unwrap();
    let LayerPayload::Instances(data) = &layers[1].payload else {
        panic!("expected instances payload");
    };
    assert!(matches!(data.resolved[0], ResolvedInstance::Placed(0)));
    let ResolvedInstance::Placeholder(ph) = &data.resolved[1] else {
        panic!("expected placeholder");
    };
    assert!(ph.nonexistent);
    assert_eq!(ph.instance_id, 424_242);
}

// ── Version inference ────────────────────────────────────────────────────────

/// A file whose metadata claims 2.3 but whose layers carry the 2022.1
/// effect fields. The assets layer comes first so the probe fires before
/// any other layer is parsed.
fn inference_file() -> Vec<u8> {
    let claimed = GmVersion::new(2, 3, 0, 0);
    let actual = GmVersion::new(2022, 1, 0, 0);
    let write_ctx = VersionContext::new(actual, BytecodeVersion::V17);
    let gen8 = Gen8::synthetic(claimed, BytecodeVersion::V17);

    let mut strings = StringPool::new();
    let name = strings.intern("rm_misversioned");
    let lyr_assets = strings.intern("lyr_props");
    let lyr_bg = strings.intern("lyr_backdrop");
    let fx = strings.intern("_filter_bloom");

    build_file(
        &gen8,
        &strings,
        PoolSpec {
            sprites: 1,
            tilesets: 0,
            objects: 0,
            code: 0,
            sequences: None,
        },
        &write_ctx,
        |refs| {
            let mut rm = Room::empty(
                refs[name],
                RoomFlags(RoomFlags::ENGINE_V2 | RoomFlags::ENGINE_V2_3),
            );
            let mut assets = layer(
                refs[lyr_assets],
                1,
                0,
                LayerPayload::Assets(AssetsPayload {
                    legacy_tiles: Vec::new(),
                    sprites: vec![sprite_instance(refs[lyr_assets])],
                    sequences: Some(Vec::new()),
                    nine_slices: None,      // absent at 2022.1
                    particle_systems: None, // 2023.2+
                    text_items: None,       // 2024.6+
                }),
            );
            assets.effect = Some(LayerEffect::default());

            let mut bg = layer(
                refs[lyr_bg],
                2,
                100,
                LayerPayload::Background(BackgroundPayload {
                    visible: true,
                    foreground: false,
                    sprite: SpriteRef::from_id(0),
                    tiled_horizontally: false,
                    tiled_vertically: false,
                    stretch: true,
                    color: 0xFFFF_FFFF,
                    first_frame: 0.0,
                    animation_speed: 1.0,
                    animation_speed_type: 0,
                }),
            );
            // Sibling field gated on the same threshold: readable only after
            // the probe upgrades the context.
            bg.effect = Some(LayerEffect {
                enabled: true,
                effect_type: refs[fx],
                properties: Vec::new(),
            });

            rm.layers = Some(vec![assets, bg]);
            RoomChunk { rooms: vec![rm] }
        },
    )
}

#[test]
fn assets_probe_upgrades_version_context() {
    let gf = GameFile::parse(inference_file()).unwrap();

    // The starting context reflects only the (understated) metadata.
    assert!(!gf.version_context().unwrap().is_at_least(2022, 1, 0, 0));

    let rooms = gf.rooms().unwrap();
    let upgraded = gf.room_version_context().unwrap();
    assert!(upgraded.is_at_least(2022, 1, 0, 0));

    let layers = rooms.rooms[0].layers.as_ref().unwrap();
    assert!(layers[0].effect.is_some());
    // The upgrade outlives the probing object: the sibling layer's gated
    // fields were read too.
    let bg_effect = layers[1].effect.as_ref().unwrap();
    assert!(bg_effect.enabled);
    assert_eq!(
        gf.resolve_string(bg_effect.effect_type).unwrap(),
        "_filter_bloom"
    );
}

#[test]
fn inference_round_trip_is_byte_identical() {
    let bytes = inference_file();
    let gf = GameFile::parse(bytes.clone()).unwrap();
    let (rooms, ctx, _) = gf.parse_rooms().unwrap();
    // Writing under the upgraded context reproduces the original stream.
    let rewritten = gf.write(&rooms, &ctx).unwrap();
    assert_eq!(rewritten, bytes);
}

// ── 2024.x schema ────────────────────────────────────────────────────────────

fn v2024_13_file() -> Vec<u8> {
    let version = GmVersion::new(2024, 13, 0, 0);
    let ctx = VersionContext::new(version, BytecodeVersion::V17).with_seqn(true);
    let gen8 = Gen8::synthetic(version, BytecodeVersion::V17);

    let mut strings = StringPool::new();
    let name = strings.intern("rm_latest");
    let lyr_tiles = strings.intern("lyr_ground");
    let lyr_assets = strings.intern("lyr_props");
    let lyr_path = strings.intern("lyr_route");
    let lyr_fx = strings.intern("lyr_weather");
    let label = strings.intern("txt_sign");

    build_file(
        &gen8,
        &strings,
        PoolSpec {
            sprites: 1,
            tilesets: 1,
            objects: 1,
            code: 0,
            sequences: Some(1),
        },
        &ctx,
        |refs| {
            let mut rm = Room::empty(
                refs[name],
                RoomFlags(RoomFlags::ENGINE_V2 | RoomFlags::ENGINE_V2_3),
            );
            rm.instances.push(game_object(1, 100_900, true));
            rm.instances.push(game_object(2, 100_901, true));
            rm.instance_creation_order = Some(vec![100_901, 100_900]);
            rm.sequence_ids = Some(vec![0]);

            // Last two cells differ: compressed stream ends with the buggy
            // trailer, then pads to a 4-byte boundary.
            let grid = TileGrid::from_cells(3, 3, vec![7, 7, 7, 7, 7, 7, 7, 8, 9]).unwrap();
            rm.layers = Some(vec![
                layer(
                    refs[lyr_tiles],
                    1,
                    0,
                    LayerPayload::Tiles(TilesPayload {
                        tileset: TilesetRef::from_id(0),
                        tiles_x: 3,
                        tiles_y: 3,
                        grid,
                    }),
                ),
                layer(
                    refs[lyr_assets],
                    2,
                    10,
                    LayerPayload::Assets(AssetsPayload {
                        legacy_tiles: Vec::new(),
                        sprites: Vec::new(),
                        sequences: Some(Vec::new()),
                        nine_slices: None,
                        particle_systems: Some(vec![ParticleSystemInstance {
                            name: refs[lyr_assets],
                            particle_system: 3,
                            x: 0,
                            y: 0,
                            scale_x: 1.0,
                            scale_y: 1.0,
                            color: 0xFFFF_FFFF,
                            rotation: 0.0,
                        }]),
                        text_items: Some(vec![TextItem {
                            x: 100,
                            y: 60,
                            font: 2,
                            scale_x: 1.0,
                            scale_y: 1.0,
                            rotation: 0.0,
                            color: 0xFF00_FF00,
                            origin_x: 0.5,
                            origin_y: 0.5,
                            text: refs[label],
                            line_spacing: 1.2,
                            frame_width: 200.0,
                            frame_height: 40.0,
                            wrap: true,
                        }]),
                    }),
                ),
                layer(refs[lyr_path], 3, 20, LayerPayload::Path2),
                {
                    let mut fx = layer(
                        refs[lyr_fx],
                        4,
                        30,
                        LayerPayload::Effect(EffectPayload::default()),
                    );
                    fx.effect = Some(LayerEffect::default());
                    fx
                },
            ]);
            RoomChunk { rooms: vec![rm] }
        },
    )
}

#[test]
fn v2024_13_reads_back() {
    let gf = GameFile::parse(v2024_13_file()).unwrap();
    let rooms = gf.rooms().unwrap();
    let rm = &rooms.rooms[0];

    assert_eq!(
        rm.instance_creation_order.as_deref(),
        Some(&[100_901u32, 100_900][..])
    );

    let layers = rm.layers.as_ref().unwrap();
    // 2024.x: every layer carries its effect fields.
    assert!(layers.iter().all(|l| l.effect.is_some()));

    let LayerPayload::Tiles(tiles) = &layers[0].payload else {
        panic!("expected tiles payload");
    };
    assert_eq!(tiles.grid.cells(), &[7, 7, 7, 7, 7, 7, 7, 8, 9]);

    let LayerPayload::Assets(assets) = &layers[1].payload else {
        panic!("expected assets payload");
    };
    assert!(assets.nine_slices.is_none());
    assert_eq!(assets.particle_systems.as_ref().unwrap()[0].particle_system, 3);
    let text = &assets.text_items.as_ref().unwrap()[0];
    assert_eq!(gf.resolve_string(text.text).unwrap(), "txt_sign");
    assert!(text.wrap);

    assert!(matches!(layers[2].payload, LayerPayload::Path2));
    // Effect payload body is skipped from 2022.1 on.
    assert!(matches!(layers[3].payload, LayerPayload::Effect(_)));
}

#[test]
fn v2024_13_round_trip_is_byte_identical() {
    let bytes = v2024_13_file();
    let gf = GameFile::parse(bytes.clone()).unwrap();
    let (rooms, ctx, _) = gf.parse_rooms().unwrap();
    let rewritten = gf.write(&rooms, &ctx).unwrap();
    assert_eq!(rewritten, bytes);
}

// ── Counting pass ────────────────────────────────────────────────────────────

#[test]
fn counting_pass_matches_materialized_objects() {
    for bytes in [
        legacy_file(),
        modern_23_file(),
        inference_file(),
        v2024_13_file(),
    ] {
        let gf = GameFile::parse(bytes).unwrap();
        let counted = gf.count_room_objects().unwrap();
        let materialized = gf.rooms().unwrap().addressable_objects();
        assert_eq!(counted, materialized);
    }
}

// ── Invariants ───────────────────────────────────────────────────────────────

#[test]
fn background_color_alpha_is_forced_on_read() {
    let version = GmVersion::new(1, 4, 9999, 0);
    let ctx = VersionContext::new(version, BytecodeVersion::V15);
    let gen8 = Gen8::synthetic(version, BytecodeVersion::V15);
    let mut strings = StringPool::new();
    let name = strings.intern("rm_tint");

    let bytes = build_file(&gen8, &strings, PoolSpec::default(), &ctx, |refs| {
        let mut rm = Room::empty(refs[name], RoomFlags(RoomFlags::SHOW_COLOR));
        rm.background_color = 0x0011_2233; // alpha-less, as an editor might set it
        RoomChunk { rooms: vec![rm] }
    });

    let gf = GameFile::parse(bytes).unwrap();
    let rooms = gf.rooms().unwrap();
    assert_eq!(rooms.rooms[0].background_color, 0xFF11_2233);
}

#[test]
fn writer_rejects_grid_dimension_mismatch() {
    let version = GmVersion::new(2, 3, 0, 0);
    let ctx = VersionContext::new(version, BytecodeVersion::V17);
    let mut rm = Room::empty(StringRef::NONE, RoomFlags(RoomFlags::ENGINE_V2));
    rm.layers = Some(vec![layer(
        StringRef::NONE,
        1,
        0,
        LayerPayload::Tiles(TilesPayload {
            tileset: TilesetRef::from_id(0),
            tiles_x: 3,
            tiles_y: 3,
            grid: TileGrid::new(2, 2),
        }),
    )]);
    let chunk = RoomChunk { rooms: vec![rm] };

    let err = chunk.write(&mut Writer::new(), &ctx).unwrap_err();
    assert!(matches!(
        err,
        Error::GridDimensionMismatch {
            tiles_x: 3,
            tiles_y: 3,
            actual: 4
        }
    ));
}

#[test]
fn writer_rejects_tile_mode_against_generation() {
    let version = GmVersion::new(1, 4, 9999, 0);
    let ctx = VersionContext::new(version, BytecodeVersion::V15);
    // Legacy-generation room with a sprite-mode tile.
    let mut rm = Room::empty(StringRef::NONE, RoomFlags(0));
    let mut tile = assets_tile();
    tile.definition = TileDefinition::Sprite(SpriteRef::from_id(0));
    rm.legacy_tiles.push(tile);
    let chunk = RoomChunk { rooms: vec![rm] };

    let err = chunk.write(&mut Writer::new(), &ctx).unwrap_err();
    assert!(matches!(
        err,
        Error::TileModeMismatch {
            mode: "sprite",
            expected: "tileset",
            ..
        }
    ));
}

#[test]
fn writer_rejects_room_with_both_paths_populated() {
    let version = GmVersion::new(2, 3, 0, 0);
    let ctx = VersionContext::new(version, BytecodeVersion::V17);
    let mut rm = Room::empty(StringRef::NONE, RoomFlags(RoomFlags::ENGINE_V2));
    let mut tile = assets_tile();
    tile.definition = TileDefinition::Tileset(TilesetRef::from_id(0));
    rm.legacy_tiles.push(tile);
    let chunk = RoomChunk { rooms: vec![rm] };

    let err = chunk.write(&mut Writer::new(), &ctx).unwrap_err();
    assert!(matches!(err, Error::ConflictingRoomPaths));
}

#[test]
fn pe_wrapped_file_is_unwrapped() {
    let inner = legacy_file();
    let mut exe = b"MZ\x90\x00".to_vec();
    exe.extend_from_slice(&[0u8; 60]);
    exe.extend_from_slice(&inner);

    let gf = GameFile::parse(exe).unwrap();
    assert_eq!(gf.data(), inner.as_slice());
    assert_eq!(gf.rooms().unwrap().rooms.len(), 1);
}
