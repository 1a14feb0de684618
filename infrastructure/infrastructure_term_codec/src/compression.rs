//! Compression Module
//!
//! Provides the zlib layer behind the compressed-term envelope, using the
//! `flate2` crate with the `miniz_oxide` backend (pure safe Rust).
//!
//! ## Overview
//!
//! - [`deflate`]: one-shot zlib compression of an encoded term body.
//! - [`inflate`]: chunked decompression through the low-level
//!   [`flate2::Decompress`] state machine. The chunked form is required
//!   because the envelope carries no compressed-payload length: the inflater
//!   must report exactly how many input bytes the zlib stream consumed so
//!   the decoder can hand back the trailing bytes of the next message, and
//!   it must tell a truncated stream apart from a corrupt one.

use flate2::write::ZlibEncoder;
use flate2::{Compression, Decompress, FlushDecompress, Status};
use std::io::Write;

/// Output growth step for the inflate loop
const INFLATE_CHUNK: usize = 64 * 1024;

/// Compression selection for the top-level encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionOption {
    /// Emit the plain form unconditionally
    Disabled,
    /// Compress at the default zlib level (6)
    Default,
    /// Compress at an explicit zlib level; values above 9 clamp to 9
    Level(u8),
}

impl CompressionOption {
    /// The zlib level to attempt, or `None` when compression is off
    pub(crate) fn zlib_level(self) -> Option<Compression> {
        match self {
            CompressionOption::Disabled => None,
            CompressionOption::Default => Some(Compression::new(6)),
            CompressionOption::Level(level) => Some(Compression::new(level.min(9) as u32)),
        }
    }
}

/// Decompression errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InflateError {
    /// The zlib stream ends before its end-of-stream marker
    Truncated,
    /// The stream inflates past the declared uncompressed size
    OversizedOutput {
        /// The size the envelope declared
        declared: usize,
    },
    /// The stream is not valid zlib data
    Corrupt(String),
}

impl std::fmt::Display for InflateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InflateError::Truncated => write!(f, "compressed data is truncated"),
            InflateError::OversizedOutput { declared } => {
                write!(f, "compressed data inflates past declared size {}", declared)
            }
            InflateError::Corrupt(message) => write!(f, "corrupt compressed data: {}", message),
        }
    }
}

impl std::error::Error for InflateError {}

/// Compress a buffer as a zlib stream
pub fn deflate(data: &[u8], level: Compression) -> Result<Vec<u8>, std::io::Error> {
    let mut encoder = ZlibEncoder::new(Vec::new(), level);
    encoder.write_all(data)?;
    encoder.finish()
}

/// Decompress one zlib stream from the front of `input`
///
/// Stops at the stream's end-of-stream marker; bytes after it are left for
/// the caller. The output is bounded by `declared_len`: a stream producing
/// more than that many bytes fails without inflating further.
///
/// # Arguments
/// * `input` - Buffer beginning with a zlib stream
/// * `declared_len` - Uncompressed size the envelope declared
///
/// # Returns
/// * `Ok((output, consumed))` - Decompressed bytes and how much of `input`
///   the stream consumed
/// * `Err(InflateError)` - Truncated, oversized or corrupt stream
pub fn inflate(input: &[u8], declared_len: usize) -> Result<(Vec<u8>, usize), InflateError> {
    let mut stream = Decompress::new(true);
    let mut output: Vec<u8> = Vec::new();

    loop {
        if output.len() == output.capacity() {
            output.reserve(INFLATE_CHUNK.min(declared_len - output.len() + 1));
        }

        let before_in = stream.total_in();
        let before_out = stream.total_out();
        let consumed = before_in as usize;

        // FlushDecompress::None keeps the stream resumable across output
        // chunks; Finish would demand the whole output buffer up front
        let status = stream
            .decompress_vec(&input[consumed..], &mut output, FlushDecompress::None)
            .map_err(|e| InflateError::Corrupt(e.to_string()))?;

        if output.len() > declared_len {
            return Err(InflateError::OversizedOutput {
                declared: declared_len,
            });
        }

        if status == Status::StreamEnd {
            return Ok((output, stream.total_in() as usize));
        }
        // No forward progress with output space available means the stream
        // ran out of input before its end marker
        if stream.total_in() == before_in && stream.total_out() == before_out {
            return Err(InflateError::Truncated);
        }
    }
}
