use crate::cursor::{Cursor, Writer};
use crate::error::Result;
use crate::form::ChunkMagic;
use crate::strings::StringRef;
use crate::version::{BytecodeVersion, GmVersion};

pub const MAGIC: ChunkMagic = ChunkMagic(*b"GEN8");

/// Game metadata chunk. Always the first chunk in the file; everything else
/// consults it for the bytecode and product versions.
#[derive(Debug)]
pub struct Gen8 {
    pub is_debug_disabled: bool,
    pub bytecode_version: BytecodeVersion,
    pub filename: StringRef,
    pub config: StringRef,
    pub last_object_id: u32,
    pub last_tile_id: u32,
    pub game_id: u32,
    pub guid: [u8; 16],
    pub name: StringRef,
    /// Product version. Post-2022 runtimes store year.month numbering here.
    pub version: GmVersion,
    pub default_window_width: u32,
    pub default_window_height: u32,
    pub info: u32,
    pub license_crc32: u32,
    pub license_md5: [u8; 16],
    pub timestamp: u64,
    pub display_name: StringRef,
    pub active_targets: u64,
    pub function_classifications: u64,
    pub steam_app_id: i32,
    pub debugger_port: u32,
    /// Room IDs in play order.
    pub room_order: Vec<u32>,
}

impl Gen8 {
    /// Parse the metadata chunk from its raw content.
    pub fn parse(chunk_data: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(chunk_data);

        let is_debug_disabled = c.read_u8()? != 0;
        let bytecode_version = BytecodeVersion(c.read_u8()?);
        c.skip(2)?; // padding

        let filename = StringRef::read(&mut c)?;
        let config = StringRef::read(&mut c)?;
        let last_object_id = c.read_u32()?;
        let last_tile_id = c.read_u32()?;
        let game_id = c.read_u32()?;
        let mut guid = [0u8; 16];
        guid.copy_from_slice(c.read_bytes(16)?);
        let name = StringRef::read(&mut c)?;
        let version = GmVersion::new(
            c.read_u32()?,
            c.read_u32()?,
            c.read_u32()?,
            c.read_u32()?,
        );
        let default_window_width = c.read_u32()?;
        let default_window_height = c.read_u32()?;
        let info = c.read_u32()?;
        let license_crc32 = c.read_u32()?;
        let mut license_md5 = [0u8; 16];
        license_md5.copy_from_slice(c.read_bytes(16)?);
        let timestamp = c.read_u64()?;
        let display_name = StringRef::read(&mut c)?;
        let active_targets = c.read_u64()?;
        let function_classifications = c.read_u64()?;
        let steam_app_id = c.read_i32()?;
        let debugger_port = c.read_u32()?;

        let room_count = c.read_u32()? as usize;
        let mut room_order = Vec::with_capacity(room_count);
        for _ in 0..room_count {
            room_order.push(c.read_u32()?);
        }

        Ok(Self {
            is_debug_disabled,
            bytecode_version,
            filename,
            config,
            last_object_id,
            last_tile_id,
            game_id,
            guid,
            name,
            version,
            default_window_width,
            default_window_height,
            info,
            license_crc32,
            license_md5,
            timestamp,
            display_name,
            active_targets,
            function_classifications,
            steam_app_id,
            debugger_port,
            room_order,
        })
    }

    /// Serialize in the exact field order of [`parse`](Gen8::parse).
    pub fn write(&self, w: &mut Writer) {
        w.write_u8(self.is_debug_disabled as u8);
        w.write_u8(self.bytecode_version.0);
        w.write_u16(0); // padding

        self.filename.write(w);
        self.config.write(w);
        w.write_u32(self.last_object_id);
        w.write_u32(self.last_tile_id);
        w.write_u32(self.game_id);
        w.write_bytes(&self.guid);
        self.name.write(w);
        w.write_u32(self.version.major);
        w.write_u32(self.version.minor);
        w.write_u32(self.version.release);
        w.write_u32(self.version.build);
        w.write_u32(self.default_window_width);
        w.write_u32(self.default_window_height);
        w.write_u32(self.info);
        w.write_u32(self.license_crc32);
        w.write_bytes(&self.license_md5);
        w.write_u64(self.timestamp);
        self.display_name.write(w);
        w.write_u64(self.active_targets);
        w.write_u64(self.function_classifications);
        w.write_i32(self.steam_app_id);
        w.write_u32(self.debugger_port);

        w.write_u32(self.room_order.len() as u32);
        for &id in &self.room_order {
            w.write_u32(id);
        }
    }

    /// Minimal metadata for a synthetic file.
    pub fn synthetic(version: GmVersion, bytecode_version: BytecodeVersion) -> Self {
        Self {
            is_debug_disabled: true,
            bytecode_version,
            filename: StringRef::NONE,
            config: StringRef::NONE,
            last_object_id: 0,
            last_tile_id: 0,
            game_id: 1,
            guid: [0; 16],
            name: StringRef::NONE,
            version,
            default_window_width: 1024,
            default_window_height: 768,
            info: 0,
            license_crc32: 0,
            license_md5: [0; 16],
            timestamp: 0,
            display_name: StringRef::NONE,
            active_targets: 0,
            function_classifications: 0,
            steam_app_id: 0,
            debugger_port: 0,
            room_order: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let mut g = Gen8::synthetic(GmVersion::new(2, 3, 0, 0), BytecodeVersion::V17);
        g.game_id = 77;
        g.room_order = vec![2, 0, 1];
        g.name = StringRef(0x1234);

        let mut w = Writer::new();
        g.write(&mut w);
        let bytes = w.into_bytes();

        let parsed = Gen8::parse(&bytes).unwrap();
        assert_eq!(parsed.game_id, 77);
        assert_eq!(parsed.version, GmVersion::new(2, 3, 0, 0));
        assert_eq!(parsed.bytecode_version, BytecodeVersion::V17);
        assert_eq!(parsed.room_order, vec![2, 0, 1]);
        assert_eq!(parsed.name, StringRef(0x1234));

        let mut w2 = Writer::new();
        parsed.write(&mut w2);
        assert_eq!(w2.into_bytes(), bytes);
    }
}
