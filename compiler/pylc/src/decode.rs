//! Turning a unit's bytes into text.
//!
//! Codecs are tried in a fixed order and the first that accepts the whole
//! input wins. ISO-8859-1 maps every byte, so the codecs after it only
//! matter if it is ever taken out of the list.

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use encoding_rs::{Encoding, GBK, UTF_16BE, UTF_16LE, UTF_8};
use tracing::{debug, warn};

use crate::error::DecodeError;

/// A character encoding a unit may be written in.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Codec {
    Utf8,
    Utf16,
    Latin1,
    Gbk,
    Ascii,
}

impl Codec {
    /// Attempt order.
    pub const ORDER: [Codec; 5] = [Codec::Utf8, Codec::Utf16, Codec::Latin1, Codec::Gbk, Codec::Ascii];

    /// Decode all of `bytes`, or `None` if any of it is invalid.
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            Codec::Utf8 => {
                let body = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
                strict(UTF_8, body)
            }
            // Without a byte order mark almost any even-length input is
            // valid UTF-16, so one is required.
            Codec::Utf16 => match Encoding::for_bom(bytes) {
                Some((encoding, len)) if encoding == UTF_16LE || encoding == UTF_16BE => {
                    strict(encoding, &bytes[len..])
                }
                _ => None,
            },
            Codec::Latin1 => Some(bytes.iter().map(|&b| char::from(b)).collect()),
            Codec::Gbk => strict(GBK, bytes),
            Codec::Ascii => bytes.is_ascii().then(|| bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }
}

fn strict(encoding: &'static Encoding, bytes: &[u8]) -> Option<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(Cow::into_owned)
}

/// Decode with the first codec that accepts `bytes`.
pub fn decode(bytes: &[u8]) -> Option<(String, Codec)> {
    Codec::ORDER
        .into_iter()
        .find_map(|codec| codec.decode(bytes).map(|text| (text, codec)))
}

/// Read and decode the file at `path`.
pub fn read_source(path: &Path) -> Result<String, DecodeError> {
    let bytes = fs::read(path).map_err(|source| DecodeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    match decode(&bytes) {
        Some((text, codec)) => {
            debug!(path = %path.display(), ?codec, "decoded");
            Ok(text)
        }
        None => {
            warn!(path = %path.display(), "no codec accepts the file");
            Err(DecodeError::Undecodable {
                path: path.to_path_buf(),
            })
        }
    }
}

#[cfg(test)]
mod tests;
