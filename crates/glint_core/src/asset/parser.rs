//! GLB container parser.
//!
//! Layout: a 12-byte header (`magic`, `version`, `length`) followed by chunks
//! of (`length`, `type`, payload). The first chunk must be JSON; an optional
//! BIN chunk follows it.

use thiserror::Error;

/// `glTF` in little-endian ASCII.
pub const GLB_MAGIC: u32 = 0x4654_6C67;
/// `JSON` chunk type.
pub const CHUNK_JSON: u32 = 0x4E4F_534A;
/// `BIN\0` chunk type.
pub const CHUNK_BIN: u32 = 0x004E_4942;

const HEADER_SIZE: usize = 12;
const CHUNK_HEADER_SIZE: usize = 8;

/// Errors that can occur while splitting a GLB container.
#[derive(Error, Debug)]
pub enum GlbError {
    #[error("GLB container too small ({0} bytes)")]
    TooShort(usize),

    #[error("Bad magic 0x{0:08X}, not a binary glTF file")]
    BadMagic(u32),

    #[error("Unsupported GLB version {0} (only 2 is supported)")]
    UnsupportedVersion(u32),

    #[error("Header declares {declared} bytes but the file has {actual}")]
    LengthMismatch { declared: usize, actual: usize },

    #[error("Chunk at byte {offset} runs past the end of the file")]
    TruncatedChunk { offset: usize },

    #[error("First chunk is not a JSON chunk")]
    MissingJsonChunk,
}

/// Result type for container parsing.
pub type GlbResult<T> = Result<T, GlbError>;

/// The chunks of a GLB file, borrowed from the file contents.
#[derive(Debug)]
pub struct Glb<'a> {
    pub json: &'a [u8],
    pub bin: Option<&'a [u8]>,
    /// Non-fatal oddities found while parsing
    pub warnings: Vec<String>,
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

/// Split a GLB file into its JSON and BIN chunks.
pub fn parse_glb(data: &[u8]) -> GlbResult<Glb<'_>> {
    if data.len() < HEADER_SIZE {
        return Err(GlbError::TooShort(data.len()));
    }

    let magic = read_u32(data, 0);
    if magic != GLB_MAGIC {
        return Err(GlbError::BadMagic(magic));
    }

    let version = read_u32(data, 4);
    if version != 2 {
        return Err(GlbError::UnsupportedVersion(version));
    }

    let mut warnings = Vec::new();

    let declared = read_u32(data, 8) as usize;
    if declared < HEADER_SIZE {
        return Err(GlbError::TooShort(declared));
    }
    if declared > data.len() {
        return Err(GlbError::LengthMismatch {
            declared,
            actual: data.len(),
        });
    }
    if declared < data.len() {
        warnings.push(format!(
            "Ignoring {} trailing bytes after the declared GLB length",
            data.len() - declared
        ));
    }
    let data = &data[..declared];

    let mut json = None;
    let mut bin = None;
    let mut offset = HEADER_SIZE;

    while offset + CHUNK_HEADER_SIZE <= data.len() {
        let length = read_u32(data, offset) as usize;
        let chunk_type = read_u32(data, offset + 4);
        let start = offset + CHUNK_HEADER_SIZE;
        let end = start
            .checked_add(length)
            .filter(|&end| end <= data.len())
            .ok_or(GlbError::TruncatedChunk { offset })?;
        let payload = &data[start..end];

        match chunk_type {
            CHUNK_JSON if json.is_none() && offset == HEADER_SIZE => json = Some(payload),
            _ if json.is_none() => return Err(GlbError::MissingJsonChunk),
            CHUNK_BIN if bin.is_none() => bin = Some(payload),
            CHUNK_BIN => warnings.push("Ignoring extra BIN chunk".to_string()),
            other => warnings.push(format!("Skipping unknown chunk type 0x{other:08X}")),
        }

        offset = end;
    }

    if offset != data.len() {
        warnings.push(format!(
            "Ignoring {} stray bytes at the end of the GLB container",
            data.len() - offset
        ));
    }

    let json = json.ok_or(GlbError::MissingJsonChunk)?;

    Ok(Glb {
        json,
        bin,
        warnings,
    })
}
