use encoding_rs::GBK;
use tracing::{debug, warn};

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

pub struct TextDecoder;

impl TextDecoder {
    /// Best-effort decode of an uploaded document. Never fails.
    ///
    /// Valid UTF-8 is returned as-is (minus a leading BOM). Anything else is
    /// retried as GBK, which covers most legacy Chinese novel dumps; an empty
    /// GBK result falls back to the lossy UTF-8 text.
    pub fn decode(bytes: &[u8]) -> String {
        let bytes = bytes.strip_prefix(&UTF8_BOM[..]).unwrap_or(bytes);

        match std::str::from_utf8(bytes) {
            Ok(text) => text.to_string(),
            Err(e) => {
                debug!("Input is not valid UTF-8 ({}), trying GBK", e);
                let lossy = String::from_utf8_lossy(bytes).into_owned();

                match Self::decode_fallback(bytes) {
                    Some(text) => text,
                    None => {
                        warn!("GBK fallback produced no text, keeping lossy UTF-8 output");
                        lossy
                    }
                }
            }
        }
    }

    fn decode_fallback(bytes: &[u8]) -> Option<String> {
        let (decoded, _encoding, had_errors) = GBK.decode(bytes);
        if had_errors {
            debug!("GBK decoding replaced malformed sequences");
        }

        if decoded.is_empty() {
            None
        } else {
            Some(decoded.into_owned())
        }
    }
}
