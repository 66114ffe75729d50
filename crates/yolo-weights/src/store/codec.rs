//! Binary encoding of a versioned flat `f32` array.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ Magic (4 bytes)   "YWFA"     │
//! │ Tag (8 bytes)     u64 LE     │  element-format version tag
//! │ Count (8 bytes)   u64 LE     │  number of f32 values
//! ├──────────────────────────────┤
//! │ Values (count * 4) f32 LE    │
//! └──────────────────────────────┘
//! ```
//!
//! The tag is compared before the body is read. A stream written for a
//! different element format is reported as [`DecodeFailure::TagMismatch`].

use std::io::{self, Read, Write};

use sha2::{Digest, Sha256};

pub const MAGIC: [u8; 4] = *b"YWFA";
pub const HEADER_SIZE: usize = 20;

/// Upper bound on the element count accepted from a header (1 GiB of floats).
pub const MAX_ELEMENT_COUNT: u64 = 1 << 28;

/// Stable identifier of the stored element format.
pub const ELEMENT_FORMAT: &str = "f32:le";

/// Version tag of [`ELEMENT_FORMAT`]: the first 8 bytes of its SHA-256 digest.
pub fn element_version_tag() -> u64 {
    version_tag_for(ELEMENT_FORMAT)
}

pub fn version_tag_for(format_id: &str) -> u64 {
    let digest = Sha256::digest(format_id.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(head)
}

/// Why a stream could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeFailure {
    /// The stream was written for a different element format.
    TagMismatch { found: u64 },
    Malformed(String),
}

pub fn encode_weights(tag: u64, values: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_SIZE + values.len() * 4);
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&tag.to_le_bytes());
    out.extend_from_slice(&(values.len() as u64).to_le_bytes());
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

pub fn write_weights<W: Write>(writer: &mut W, tag: u64, values: &[f32]) -> io::Result<()> {
    writer.write_all(&MAGIC)?;
    writer.write_all(&tag.to_le_bytes())?;
    writer.write_all(&(values.len() as u64).to_le_bytes())?;
    for v in values {
        writer.write_all(&v.to_le_bytes())?;
    }
    Ok(())
}

/// Decode a full stream, rejecting anything but an exact, tag-matching payload.
pub fn decode_weights<R: Read + ?Sized>(
    reader: &mut R,
    expected_tag: u64,
) -> Result<Vec<f32>, DecodeFailure> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header).map_err(|e| read_failure("header", e))?;

    if header[..4] != MAGIC {
        return Err(DecodeFailure::Malformed(format!(
            "bad magic {:02x?}, expected {:02x?}",
            &header[..4],
            MAGIC
        )));
    }

    let tag = le_u64(&header[4..12]);
    if tag != expected_tag {
        return Err(DecodeFailure::TagMismatch { found: tag });
    }

    let count = le_u64(&header[12..20]);
    if count > MAX_ELEMENT_COUNT {
        return Err(DecodeFailure::Malformed(format!(
            "element count {count} exceeds limit {MAX_ELEMENT_COUNT}"
        )));
    }

    let body_len = count as usize * 4;
    let mut body = Vec::new();
    (&mut *reader)
        .take(body_len as u64)
        .read_to_end(&mut body)
        .map_err(|e| read_failure("body", e))?;
    if body.len() != body_len {
        return Err(DecodeFailure::Malformed(format!(
            "truncated body: expected {body_len} bytes, got {}",
            body.len()
        )));
    }

    let mut trailing = [0u8; 1];
    loop {
        match reader.read(&mut trailing) {
            Ok(0) => break,
            Ok(_) => return Err(DecodeFailure::Malformed("trailing bytes after body".into())),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(read_failure("trailer", e)),
        }
    }

    Ok(body
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

fn le_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}

fn read_failure(section: &str, err: io::Error) -> DecodeFailure {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        DecodeFailure::Malformed(format!("truncated {section}"))
    } else {
        DecodeFailure::Malformed(format!("read error in {section}: {err}"))
    }
}
