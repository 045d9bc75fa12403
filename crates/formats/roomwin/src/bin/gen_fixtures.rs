//! Fixture generator for roomwin tests.
//!
//! Writes small synthetic data files into `tests/fixtures/`. The integration
//! tests build their corpora in memory; these on-disk files exist for
//! cross-tool validation (hex inspection, external parsers) and as committed
//! regression inputs.
//!
//! # Usage
//!
//! ```sh
//! cargo run -p roomwin --bin gen_fixtures
//! ```

use roomwin::chunks::gen8::Gen8;
use roomwin::chunks::room::{
    BackgroundPayload, GameObject, InstancesData, Layer, LayerPayload, LegacyTile, Room,
    RoomBackground, RoomChunk, RoomFlags, RoomId, TileDefinition, TilesPayload, View,
};
use roomwin::chunks::{bgnd, gen8, objt, room, sprt};
use roomwin::form::{ChunkMagic, FormWriter};
use roomwin::pools::{CodeRef, ObjectRef, SpriteRef, TilesetRef};
use roomwin::strings::{StringPool, StringRef};
use roomwin::tilegrid::TileGrid;
use roomwin::version::{BytecodeVersion, GmVersion, VersionContext};

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

const STRG_MAGIC: ChunkMagic = ChunkMagic(*b"STRG");

fn main() -> std::io::Result<()> {
    std::fs::create_dir_all(FIXTURES_DIR)?;

    write("legacy_v1_4.win", build_legacy_v1_4())?;
    write("modern_2_3.win", build_modern_2_3())?;
    write("rle_2024_4.win", build_rle_2024_4())?;

    Ok(())
}

fn write(name: &str, data: Vec<u8>) -> std::io::Result<()> {
    let path = format!("{FIXTURES_DIR}/{name}");
    std::fs::write(&path, &data)?;
    println!("wrote {name} ({} bytes)", data.len());
    Ok(())
}

/// Assemble a file: GEN8, STRG, name pools, then the room chunk.
///
/// `build_rooms` receives the refs produced by laying the string pool out at
/// its final absolute position.
fn assemble(
    gen8: &Gen8,
    strings: &StringPool,
    sprite_names: usize,
    tileset_names: usize,
    object_names: usize,
    ctx: &VersionContext,
    build_rooms: impl FnOnce(&[StringRef]) -> RoomChunk,
) -> Vec<u8> {
    let mut fw = FormWriter::new();

    fw.chunk(gen8::MAGIC, |w| {
        gen8.write(w);
        Ok(())
    })
    .expect("gen8 write");

    let strg_abs = fw.next_data_offset();
    let (strg_data, refs) = strings.layout(strg_abs);
    fw.raw_chunk(STRG_MAGIC, &strg_data);

    // Name pools: every entry reuses the first interned string; room refs
    // only care about entry count.
    for (magic, count) in [
        (sprt::MAGIC, sprite_names),
        (bgnd::MAGIC, tileset_names),
        (objt::MAGIC, object_names),
    ] {
        fw.chunk(magic, |w| {
            let names = vec![refs[0]; count];
            roomwin::lists::write_pointer_list(w, &names, |w, r| {
                r.write(w);
                Ok(())
            })
        })
        .expect("pool write");
    }

    let rooms = build_rooms(&refs);
    fw.chunk(room::MAGIC, |w| rooms.write(w, ctx))
        .expect("room write");

    fw.finish()
}

/// Legacy-generation file: one 1.4-era room with a background, a view, two
/// instances and a tileset-mode tile.
fn build_legacy_v1_4() -> Vec<u8> {
    let version = GmVersion::new(1, 4, 9999, 0);
    let ctx = VersionContext::new(version, BytecodeVersion::V15);
    let gen8 = Gen8::synthetic(version, BytecodeVersion::V15);

    let mut strings = StringPool::new();
    let name = strings.intern("rm_cellar");
    let caption = strings.intern("The Cellar");

    assemble(&gen8, &strings, 1, 1, 2, &ctx, |refs| {
        let mut rm = Room::empty(
            refs[name],
            RoomFlags(RoomFlags::ENABLE_VIEWS | RoomFlags::SHOW_COLOR),
        );
        rm.caption = refs[caption];
        rm.width = 640;
        rm.height = 480;
        rm.background_color = 0xFF20_3040;
        rm.draw_background_color = true;
        rm.creation_code = CodeRef::none();
        rm.backgrounds.push(RoomBackground {
            enabled: true,
            foreground: false,
            definition: TilesetRef::from_id(0),
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
        for (i, x) in [64, 128].into_iter().enumerate() {
            rm.instances.push(GameObject {
                x,
                y: 96,
                object: ObjectRef::from_id(i as i32),
                instance_id: 100_000 + i as u32,
                creation_code: CodeRef::none(),
                scale_x: 1.0,
                scale_y: 1.0,
                image_speed: None,
                image_index: None,
                color: 0xFFFF_FFFF,
                rotation: 0.0,
                pre_create_code: None,
                nonexistent: false,
            });
        }
        rm.legacy_tiles.push(LegacyTile {
            x: 32,
            y: 32,
            definition: TileDefinition::Tileset(TilesetRef::from_id(0)),
            source_x: 0,
            source_y: 0,
            width: 16,
            height: 16,
            depth: 100,
            instance_id: 10_000_001,
            scale_x: 1.0,
            scale_y: 1.0,
            color: 0xFFFF_FFFF,
        });
        RoomChunk { rooms: vec![rm] }
    })
}

/// Modern-generation file: a 2.3 room with background, instances and raw
/// tile-grid layers.
fn build_modern_2_3() -> Vec<u8> {
    let version = GmVersion::new(2, 3, 0, 0);
    let ctx = VersionContext::new(version, BytecodeVersion::V17);
    let gen8 = Gen8::synthetic(version, BytecodeVersion::V17);

    let mut strings = StringPool::new();
    let name = strings.intern("rm_overworld");
    let lyr_bg = strings.intern("lyr_backdrop");
    let lyr_inst = strings.intern("lyr_actors");
    let lyr_tiles = strings.intern("lyr_ground");

    assemble(&gen8, &strings, 2, 1, 1, &ctx, |refs| {
        let mut rm = Room::empty(
            refs[name],
            RoomFlags(RoomFlags::ENGINE_V2 | RoomFlags::ENGINE_V2_3 | RoomFlags::CLEAR_DISPLAY_BUFFER),
        );
        rm.width = 1366;
        rm.height = 768;
        rm.instances.push(GameObject {
            x: 10,
            y: 20,
            object: ObjectRef::from_id(0),
            instance_id: 100_050,
            creation_code: CodeRef::none(),
            scale_x: 1.0,
            scale_y: 1.0,
            image_speed: Some(1.0),
            image_index: Some(0),
            color: 0xFFFF_FFFF,
            rotation: 0.0,
            pre_create_code: Some(CodeRef::none()),
            nonexistent: false,
        });

        let grid = TileGrid::from_cells(4, 2, vec![1, 1, 1, 1, 2, 2, 3, 4]).unwrap();
        let layers = vec![
            Layer {
                owner: RoomId(0),
                name: refs[lyr_bg],
                id: 1,
                depth: 200,
                x_offset: 0.0,
                y_offset: 0.0,
                h_speed: 0.0,
                v_speed: 0.0,
                visible: true,
                effect: None,
                payload: LayerPayload::Background(BackgroundPayload {
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
            },
            Layer {
                owner: RoomId(0),
                name: refs[lyr_inst],
                id: 2,
                depth: 100,
                x_offset: 0.0,
                y_offset: 0.0,
                h_speed: 0.0,
                v_speed: 0.0,
                visible: true,
                effect: None,
                payload: LayerPayload::Instances(InstancesData {
                    instance_ids: vec![100_050],
                    resolved: Vec::new(),
                }),
            },
            Layer {
                owner: RoomId(0),
                name: refs[lyr_tiles],
                id: 3,
                depth: 300,
                x_offset: 0.0,
                y_offset: 0.0,
                h_speed: 0.0,
                v_speed: 0.0,
                visible: true,
                effect: None,
                payload: LayerPayload::Tiles(TilesPayload {
                    tileset: TilesetRef::from_id(0),
                    tiles_x: 4,
                    tiles_y: 2,
                    grid,
                }),
            },
        ];
        rm.layers = Some(layers);
        RoomChunk { rooms: vec![rm] }
    })
}

/// 2024.4 file: compressed tile grid with the buggy trailer and 4-byte
/// stream padding.
fn build_rle_2024_4() -> Vec<u8> {
    let version = GmVersion::new(2024, 4, 0, 0);
    let ctx = VersionContext::new(version, BytecodeVersion::V17);
    let gen8 = Gen8::synthetic(version, BytecodeVersion::V17);

    let mut strings = StringPool::new();
    let name = strings.intern("rm_compressed");
    let lyr = strings.intern("lyr_ground");

    assemble(&gen8, &strings, 1, 1, 1, &ctx, |refs| {
        let mut rm = Room::empty(
            refs[name],
            RoomFlags(RoomFlags::ENGINE_V2 | RoomFlags::ENGINE_V2_3),
        );
        rm.width = 512;
        rm.height = 512;
        // Last two cells differ: the stream must end with the sentinel
        // trailer before its padding.
        let grid = TileGrid::from_cells(3, 3, vec![7, 7, 7, 7, 7, 7, 7, 8, 9]).unwrap();
        rm.layers = Some(vec![Layer {
            owner: RoomId(0),
            name: refs[lyr],
            id: 1,
            depth: 0,
            x_offset: 0.0,
            y_offset: 0.0,
            h_speed: 0.0,
            v_speed: 0.0,
            visible: true,
            effect: Some(Default::default()),
            payload: LayerPayload::Tiles(TilesPayload {
                tileset: TilesetRef::from_id(0),
                tiles_x: 3,
                tiles_y: 3,
                grid,
            }),
        }]);
        RoomChunk { rooms: vec![rm] }
    })
}
