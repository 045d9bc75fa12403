use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use roomwin::chunks::room::LayerPayload;
use roomwin::GameFile;

#[derive(Parser)]
#[command(name = "roomdump", about = "Inspect room resources in a GameMaker data.win file")]
struct Cli {
    /// Path to a data.win file (or a game executable with an embedded one).
    file: PathBuf,

    /// Dump only the room at this index.
    #[arg(long)]
    room: Option<usize>,

    /// Print the chunk index instead of rooms.
    #[arg(long)]
    chunks: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let data = std::fs::read(&cli.file)
        .with_context(|| format!("reading {}", cli.file.display()))?;
    let gf = GameFile::parse(data).context("parsing container envelope")?;

    if cli.chunks {
        for entry in gf.index().chunks() {
            println!("{}  offset {:#10x}  {} bytes", entry.magic, entry.offset, entry.len);
        }
        return Ok(());
    }

    let gen8 = gf.gen8().context("parsing metadata chunk")?;
    println!(
        "{} - version {}, bytecode {}",
        gf.resolve_string(gen8.name).unwrap_or_else(|_| "<unnamed>".into()),
        gen8.version,
        gen8.bytecode_version,
    );

    let expected = gf.count_room_objects().context("counting room objects")?;
    log::debug!("counting pass expects {expected} objects");

    let rooms = gf.rooms().context("parsing room chunk")?;
    let report = gf.resolution_report()?;
    println!(
        "{} room(s), {} object(s); {} unresolved ref(s), {} placeholder(s)",
        rooms.rooms.len(),
        rooms.addressable_objects(),
        report.unresolved,
        report.placeholders,
    );

    for (i, room) in rooms.rooms.iter().enumerate() {
        if cli.room.is_some_and(|want| want != i) {
            continue;
        }
        let name = gf
            .resolve_string(room.name)
            .unwrap_or_else(|_| format!("<room {i}>"));
        println!(
            "\n[{i}] {name}  {}x{}  speed {}  flags {:#x}",
            room.width, room.height, room.speed, room.flags.0
        );
        println!(
            "    {} background(s), {} view(s), {} instance(s), {} tile(s)",
            room.backgrounds.len(),
            room.views.len(),
            room.instances.len(),
            room.legacy_tiles.len(),
        );
        if let Some(layers) = &room.layers {
            for layer in layers {
                let lname = gf
                    .resolve_string(layer.name)
                    .unwrap_or_else(|_| "<unnamed>".into());
                let detail = match &layer.payload {
                    LayerPayload::Instances(d) => format!("{} instance(s)", d.instance_ids.len()),
                    LayerPayload::Tiles(t) => format!("{}x{} tiles", t.tiles_x, t.tiles_y),
                    LayerPayload::Assets(a) => format!(
                        "{} tile(s), {} sprite(s)",
                        a.legacy_tiles.len(),
                        a.sprites.len()
                    ),
                    LayerPayload::Background(_) => "background".into(),
                    LayerPayload::Effect(_) => "effect".into(),
                    LayerPayload::Path | LayerPayload::Path2 => "path".into(),
                };
                println!(
                    "    layer {:>3} depth {:>6} {:?}: {}",
                    layer.id,
                    layer.depth,
                    layer.payload.kind(),
                    detail
                );
            }
        }
    }

    Ok(())
}
