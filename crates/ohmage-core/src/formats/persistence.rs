//! Record encoding: a five-byte header followed by a postcard body.
//!
//! ```text
//! +------+------+------+------+---------+------------------+
//! | 'O'  | 'H'  | 'M'  | 'S'  | version | postcard(record) |
//! +------+------+------+------+---------+------------------+
//! ```

use crate::error::{CoreError, Result};
use crate::stream::StreamRecord;

/// Magic bytes at the start of every encoded record.
pub const RECORD_MAGIC: [u8; 4] = *b"OHMS";

/// Current record format version.
pub const RECORD_FORMAT_VERSION: u8 = 1;

const HEADER_LEN: usize = RECORD_MAGIC.len() + 1;

/// Encode a record with the current header.
pub fn encode_record(record: &StreamRecord) -> Result<Vec<u8>> {
    let body = postcard::to_allocvec(record)?;
    let mut bytes = Vec::with_capacity(HEADER_LEN + body.len());
    bytes.extend_from_slice(&RECORD_MAGIC);
    bytes.push(RECORD_FORMAT_VERSION);
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

/// Decode a record, checking magic and version.
pub fn decode_record(bytes: &[u8]) -> Result<StreamRecord> {
    let Some((header, body)) = bytes.split_at_checked(HEADER_LEN) else {
        return Err(CoreError::InvalidFormat(format!(
            "record too short: {} bytes",
            bytes.len()
        )));
    };
    if header[..RECORD_MAGIC.len()] != RECORD_MAGIC {
        return Err(CoreError::InvalidFormat("bad record magic".to_string()));
    }
    let version = header[RECORD_MAGIC.len()];
    if version != RECORD_FORMAT_VERSION {
        return Err(CoreError::InvalidFormat(format!(
            "unsupported record version {}",
            version
        )));
    }
    Ok(postcard::from_bytes(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::StreamId;

    fn record() -> StreamRecord {
        StreamRecord::new(
            "5f1c",
            StreamId::new("omh", "step-count", "1.0"),
            "alice",
            "2024-05-01T10:00:00Z",
            r#"{"step_count":120}"#,
        )
    }

    #[test]
    fn encoded_record_carries_header() {
        let bytes = encode_record(&record()).expect("encode");
        assert_eq!(&bytes[..4], b"OHMS");
        assert_eq!(bytes[4], RECORD_FORMAT_VERSION);
        assert_eq!(decode_record(&bytes).expect("decode"), record());
    }

    #[test]
    fn decode_rejects_foreign_bytes() {
        assert!(matches!(
            decode_record(b"OH"),
            Err(CoreError::InvalidFormat(_))
        ));
        assert!(matches!(
            decode_record(b"XXXX\x01rest"),
            Err(CoreError::InvalidFormat(_))
        ));

        let mut bytes = encode_record(&record()).expect("encode");
        bytes[4] = 9;
        assert!(matches!(
            decode_record(&bytes),
            Err(CoreError::InvalidFormat(msg)) if msg.contains('9')
        ));
    }
}
