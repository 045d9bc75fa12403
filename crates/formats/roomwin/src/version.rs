use std::fmt;

/// Product version as recorded in the metadata chunk: major.minor.release.build.
///
/// Post-2022 runtimes use year.month numbering (2022.3, 2023.8, 2024.13, ...)
/// in the major/minor fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GmVersion {
    pub major: u32,
    pub minor: u32,
    pub release: u32,
    pub build: u32,
}

impl GmVersion {
    pub const fn new(major: u32, minor: u32, release: u32, build: u32) -> Self {
        Self {
            major,
            minor,
            release,
            build,
        }
    }
}

impl fmt::Display for GmVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.release, self.build
        )
    }
}

/// Bytecode format version from the metadata chunk.
///
/// Known versions:
/// - 14: GameMaker: Studio 1.x (old instruction format)
/// - 15: GameMaker: Studio 1.4.x
/// - 16: GameMaker: Studio 1.4.9999+ (adds pre-create events)
/// - 17: GameMaker Studio 2.x
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BytecodeVersion(pub u8);

impl BytecodeVersion {
    pub const V14: Self = Self(14);
    pub const V15: Self = Self(15);
    pub const V16: Self = Self(16);
    pub const V17: Self = Self(17);

    /// Whether room instances carry a pre-create code reference (BC >= 16).
    pub fn has_pre_create_code(self) -> bool {
        self.0 >= 16
    }
}

impl fmt::Display for BytecodeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-load version state consulted before every conditionally-present field.
///
/// One context exists per load or save; it is threaded as an explicit argument
/// through every codec call, never stored globally. The read path may raise
/// the detected version mid-parse via [`upgrade_to`](VersionContext::upgrade_to)
/// when a later-version quirk is observed; the upgrade then governs every
/// subsequent version check for the remainder of that load.
#[derive(Debug, Clone)]
pub struct VersionContext {
    version: GmVersion,
    bytecode: BytecodeVersion,
    /// Whether this file comes from the 2022 LTS branch. Only 2022 ever had
    /// an LTS branch; the metadata chunk does not record it, so callers set
    /// this when they know the runtime.
    lts: bool,
    /// Whether the file carries a sequence chunk. Gates the room-level
    /// sequence list.
    has_seqn: bool,
}

impl VersionContext {
    pub fn new(version: GmVersion, bytecode: BytecodeVersion) -> Self {
        Self {
            version,
            bytecode,
            lts: false,
            has_seqn: false,
        }
    }

    pub fn with_seqn(mut self, has_seqn: bool) -> Self {
        self.has_seqn = has_seqn;
        self
    }

    pub fn set_lts(&mut self, lts: bool) {
        self.lts = lts;
    }

    pub fn version(&self) -> GmVersion {
        self.version
    }

    pub fn bytecode(&self) -> BytecodeVersion {
        self.bytecode
    }

    pub fn has_seqn(&self) -> bool {
        self.has_seqn
    }

    /// Whether the detected version is at least major.minor.release.build.
    pub fn is_at_least(&self, major: u32, minor: u32, release: u32, build: u32) -> bool {
        self.version >= GmVersion::new(major, minor, release, build)
    }

    /// Whether the detected version is at least year.month on a non-LTS
    /// runtime. LTS builds stay on the 2022 feature set, so the flag is only
    /// consulted for 2022.x versions.
    pub fn is_non_lts_at_least(&self, year: u32, month: u32) -> bool {
        if !self.is_at_least(year, month, 0, 0) {
            return false;
        }
        self.version.major > 2022 || !self.lts
    }

    /// Raise the detected version. Never lowers it; a no-op when `version`
    /// is not newer than the current one.
    pub fn upgrade_to(&mut self, version: GmVersion) {
        if version > self.version {
            log::debug!(
                "version context upgraded from {} to {}",
                self.version,
                version
            );
            self.version = version;
        }
    }
}
