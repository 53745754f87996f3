//! Response body decoding.
//!
//! Bodies are inflated by sniffing, not by trusting `Content-Encoding`:
//! - gzip is recognised by its magic number (`1F 8B`)
//! - anything else gets one Brotli attempt (Brotli has no magic number)
//! - otherwise the body is passed through untouched
//!
//! Decoding never fails a test. A corrupt gzip stream is logged and the raw
//! bytes are used instead.

use std::io::Read;

use flate2::read::GzDecoder;
use log::{debug, warn};

use crate::error_handling::DecodeError;

/// First two bytes of every gzip stream.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

const BROTLI_BUFFER_SIZE: usize = 4096;

/// Compression detected on a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// gzip stream
    Gzip,
    /// Brotli stream
    Brotli,
}

/// Outcome of [`inflate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inflated {
    /// The body was compressed; here is the content.
    Decompressed {
        /// Detected compression
        encoding: Encoding,
        /// Decompressed bytes
        body: Vec<u8>,
    },
    /// The body is not in a recognised compressed format.
    NotCompressed,
}

/// Returns true if `body` starts with the gzip magic number.
///
/// Empty and one-byte bodies are simply "not gzip".
pub fn is_gzip(body: &[u8]) -> bool {
    body.starts_with(&GZIP_MAGIC)
}

/// Detects and undoes gzip or Brotli compression.
///
/// # Errors
///
/// Returns `DecodeError::CorruptGzip` when the gzip magic number is present
/// but the stream cannot be inflated. A failed Brotli attempt is not an
/// error: it only means the body is not Brotli.
pub fn inflate(body: &[u8]) -> Result<Inflated, DecodeError> {
    if body.is_empty() {
        return Ok(Inflated::NotCompressed);
    }

    if is_gzip(body) {
        let mut decoded = Vec::new();
        GzDecoder::new(body)
            .read_to_end(&mut decoded)
            .map_err(DecodeError::CorruptGzip)?;
        return Ok(Inflated::Decompressed {
            encoding: Encoding::Gzip,
            body: decoded,
        });
    }

    Ok(match try_brotli(body) {
        Some(decoded) => Inflated::Decompressed {
            encoding: Encoding::Brotli,
            body: decoded,
        },
        None => Inflated::NotCompressed,
    })
}

/// One Brotli attempt; `None` when `body` is not a complete Brotli stream.
fn try_brotli(body: &[u8]) -> Option<Vec<u8>> {
    let mut decompressor = brotli::Decompressor::new(body, BROTLI_BUFFER_SIZE);
    let mut decoded = Vec::new();
    if let Err(e) = decompressor.read_to_end(&mut decoded) {
        debug!("Body is not Brotli: {e}");
        return None;
    }

    // Plain data can open with bytes that form a complete Brotli stream,
    // usually an empty one. Trailing input or an empty result means plain
    let mut trailing = [0u8; 1];
    if decompressor.read(&mut trailing).is_err() || decoded.is_empty() {
        debug!("Body is not Brotli: empty stream or trailing data after stream end");
        return None;
    }
    Some(decoded)
}

/// Returns the decoded form of a response body.
///
/// Uncompressed bodies come back unchanged; a corrupt gzip stream is logged at
/// `warn` and the raw bytes are returned.
pub fn decode_body(body: &[u8]) -> Vec<u8> {
    match inflate(body) {
        Ok(Inflated::Decompressed { encoding, body: decoded }) => {
            debug!(
                "Inflated {:?} body: {} -> {} bytes",
                encoding,
                body.len(),
                decoded.len()
            );
            decoded
        }
        Ok(Inflated::NotCompressed) => body.to_vec(),
        Err(e) => {
            warn!("{e}; using the raw body");
            body.to_vec()
        }
    }
}
