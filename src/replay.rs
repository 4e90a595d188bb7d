//! Replay content sequence (§5, §9 Design Notes; `SPEC_FULL.md`
//! `[SUPPLEMENT-1]`). The decoded document may be huge; the spec requires
//! random-access substring reads without forcing the whole thing into
//! memory. Below a threshold the bytes stay resident; above it they spill
//! to a temp file and are read back on demand — the same
//! memory-vs-`spawn_blocking` threshold shape as the teacher's
//! `compression_threshold_bytes` (see `config/builder.rs` in the teacher
//! crate), applied here to reads instead of compression.

use std::borrow::Cow;
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

/// Default: documents under 4 MiB stay in memory.
pub const DEFAULT_SPILL_THRESHOLD_BYTES: usize = 4 * 1024 * 1024;

/// Raw (not-yet-decoded) document bytes, either resident or spilled to disk.
pub enum ContentSequence {
    Memory(Arc<[u8]>),
    Spilled { path: PathBuf, len: usize },
}

impl ContentSequence {
    /// Wrap bytes already in memory.
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        ContentSequence::Memory(Arc::from(bytes))
    }

    /// Spill `bytes` to a fresh temp file if over `threshold`, otherwise
    /// keep them resident.
    pub fn from_bytes_with_threshold(bytes: Vec<u8>, threshold: usize) -> anyhow::Result<Self> {
        if bytes.len() <= threshold {
            return Ok(ContentSequence::from_bytes(bytes));
        }
        let mut file = tempfile::NamedTempFile::new()?;
        std::io::Write::write_all(&mut file, &bytes)?;
        let len = bytes.len();
        let (_, path) = file.keep()?;
        Ok(ContentSequence::Spilled { path, len })
    }

    fn raw_bytes(&self) -> anyhow::Result<Cow<'_, [u8]>> {
        match self {
            ContentSequence::Memory(bytes) => Ok(Cow::Borrowed(bytes)),
            ContentSequence::Spilled { path, len } => {
                let mut buf = Vec::with_capacity(*len);
                fs::File::open(path)?.read_to_end(&mut buf)?;
                Ok(Cow::Owned(buf))
            }
        }
    }

    /// Decode the full sequence using `charset` (an `encoding_rs` label).
    /// Unknown labels fall back to UTF-8 with lossy replacement, annotated
    /// by the caller (§4.B `unknown_charset`).
    pub fn as_str(&self, charset: &str) -> anyhow::Result<Cow<'_, str>> {
        let bytes = self.raw_bytes()?;
        let encoding = encoding_rs::Encoding::for_label(charset.as_bytes())
            .unwrap_or(encoding_rs::UTF_8);
        let (text, _, _) = encoding.decode(&bytes);
        Ok(Cow::Owned(text.into_owned()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            ContentSequence::Memory(bytes) => bytes.len(),
            ContentSequence::Spilled { len, .. } => *len,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_round_trip() {
        let seq = ContentSequence::from_bytes(b"<p>hi</p>".to_vec());
        assert_eq!(seq.as_str("utf-8").unwrap(), "<p>hi</p>");
    }

    #[test]
    fn threshold_keeps_small_docs_resident() {
        let seq = ContentSequence::from_bytes_with_threshold(b"small".to_vec(), 1024).unwrap();
        assert!(matches!(seq, ContentSequence::Memory(_)));
    }

    #[test]
    fn threshold_spills_large_docs() {
        let big = vec![b'x'; 2048];
        let seq = ContentSequence::from_bytes_with_threshold(big, 1024).unwrap();
        assert!(matches!(seq, ContentSequence::Spilled { .. }));
        assert_eq!(seq.len(), 2048);
    }

    #[test]
    fn unknown_charset_falls_back_to_utf8() {
        let seq = ContentSequence::from_bytes("héllo".as_bytes().to_vec());
        let text = seq.as_str("x-made-up-charset").unwrap();
        assert_eq!(text, "héllo");
    }
}
