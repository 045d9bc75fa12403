use crate::form::ChunkMagic;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid container magic: expected {expected}, found {found}")]
    InvalidMagic {
        expected: ChunkMagic,
        found: ChunkMagic,
    },

    #[error("unexpected end of data at offset {offset:#x} (need {need} bytes, have {have})")]
    UnexpectedEof {
        offset: usize,
        need: usize,
        have: usize,
    },

    #[error("invalid chunk magic at offset {offset:#x}: {magic}")]
    InvalidChunkMagic { offset: usize, magic: ChunkMagic },

    #[error("chunk {magic} not found")]
    ChunkNotFound { magic: ChunkMagic },

    #[error("string at offset {offset:#x} is not valid UTF-8: {source}")]
    InvalidString {
        offset: usize,
        source: std::string::FromUtf8Error,
    },

    #[error("invalid string offset {offset:#x}: outside the string pool")]
    InvalidStringOffset { offset: usize },

    #[error("null pointer in {context} list at offset {offset:#x} with non-zero count")]
    NullPointer { offset: usize, context: &'static str },

    #[error("unknown layer kind {raw} at offset {offset:#x}")]
    UnknownLayerKind { offset: usize, raw: u32 },

    #[error(
        "tile stream trailer mismatch at offset {offset:#x}: \
         opcode {opcode:#04x}, value {value:#010x}"
    )]
    TileTrailer { offset: usize, opcode: u8, value: u32 },

    #[error("tile run at offset {offset:#x} overruns the {tiles_x}x{tiles_y} grid")]
    TileOverrun {
        offset: usize,
        tiles_x: u32,
        tiles_y: u32,
    },

    #[error(
        "tile grid holds {actual} cells but the layer declares \
         {tiles_x}x{tiles_y}"
    )]
    GridDimensionMismatch {
        tiles_x: u32,
        tiles_y: u32,
        actual: usize,
    },

    #[error(
        "tile at ({x}, {y}) carries a {mode} reference but the room's engine \
         generation expects {expected} references"
    )]
    TileModeMismatch {
        x: i32,
        y: i32,
        mode: &'static str,
        expected: &'static str,
    },

    #[error("room populates both the legacy tile path and the layer path")]
    ConflictingRoomPaths,

    #[error("{context}: {message}")]
    Parse {
        context: &'static str,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
