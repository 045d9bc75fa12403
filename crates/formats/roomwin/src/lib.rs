//! Reader/writer for room resources in GameMaker's compiled data.win format.
//!
//! Three-layer architecture:
//! - **Layer 1** ([`form`]): raw chunk I/O — container envelope, chunk index,
//!   chunk assembly
//! - **Layer 2** ([`chunks`], [`tilegrid`]): typed codecs for individual
//!   chunk formats, the room object graph chief among them
//! - **Layer 3** ([`gamefile`]): high-level lazy wrapper with cached
//!   accessors and the post-load resolution pass

pub mod chunks;
pub mod cursor;
pub mod error;
pub mod form;
pub mod gamefile;
pub mod lists;
pub mod pools;
pub mod resolve;
pub mod strings;
pub mod tilegrid;
pub mod version;

pub use chunks::room::counting::count_objects;
pub use chunks::room::{Room, RoomChunk};
pub use error::{Error, Result};
pub use form::ChunkIndex;
pub use gamefile::GameFile;
pub use version::{BytecodeVersion, GmVersion, VersionContext};
