use super::ExtractionError;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Decode a plain-text upload verbatim. A leading UTF-8 BOM is dropped;
/// anything that is not valid UTF-8 is an encoding error.
pub fn decode_plain_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    String::from_utf8(body.to_vec()).map_err(|e| ExtractionError::EncodingError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_utf8_verbatim() {
        let text = decode_plain_text("Patient: Zoë Brontë\nAllergies: none".as_bytes()).unwrap();
        assert_eq!(text, "Patient: Zoë Brontë\nAllergies: none");
    }

    #[test]
    fn strips_byte_order_mark() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(b"Rx");
        assert_eq!(decode_plain_text(&bytes).unwrap(), "Rx");
    }

    #[test]
    fn invalid_utf8_is_encoding_error() {
        let err = decode_plain_text(&[0x50, 0xFF, 0xFE, 0x00]).unwrap_err();
        assert!(matches!(err, ExtractionError::EncodingError(_)));
        assert_eq!(err.cause(), "encoding-failed");
    }

    #[test]
    fn empty_file_is_empty_text() {
        assert_eq!(decode_plain_text(b"").unwrap(), "");
    }
}
