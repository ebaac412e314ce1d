//! Length-prefixed framing for module stdin/stdout
//!
//! A frame is a decimal byte count on its own line followed by exactly that
//! many payload bytes: `<length>\n<payload>`. The module framer performs one
//! synchronous request/response cycle per process, so this is plain blocking
//! IO rather than an async codec.

use std::io::{BufRead, Write};

use crate::error::ProtocolError;

/// Maximum accepted payload size; guards against hostile length prefixes
pub const MAX_PAYLOAD_SIZE: usize = 16 * 1024 * 1024;

/// Read one frame from the reader
pub fn read_frame<R: BufRead>(reader: &mut R) -> Result<Vec<u8>, ProtocolError> {
    let mut line = String::new();
    let n = reader.read_line(&mut line)?;
    if n == 0 {
        return Err(ProtocolError::UnexpectedEof);
    }

    let size: usize = line
        .trim()
        .parse()
        .map_err(|_| ProtocolError::InvalidLength(line.trim().to_string()))?;

    if size > MAX_PAYLOAD_SIZE {
        return Err(ProtocolError::PayloadTooLarge {
            size,
            max: MAX_PAYLOAD_SIZE,
        });
    }

    let mut payload = vec![0u8; size];
    reader.read_exact(&mut payload)?;
    Ok(payload)
}

/// Write one frame to the writer
pub fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> Result<(), ProtocolError> {
    writeln!(writer, "{}", payload.len())?;
    writer.write_all(payload)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_frame_roundtrip() {
        let payload = br#"{"OpenCORE:Command":"create"}"#;

        let mut buf = Vec::new();
        write_frame(&mut buf, payload).unwrap();

        let mut cursor = Cursor::new(buf);
        let decoded = read_frame(&mut cursor).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn test_frame_length_matches_prefix() {
        let payload = b"hello world";
        let mut buf = Vec::new();
        write_frame(&mut buf, payload).unwrap();

        let newline = buf.iter().position(|&b| b == b'\n').unwrap();
        let prefix: usize = std::str::from_utf8(&buf[..newline])
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(prefix, payload.len());
        assert_eq!(buf.len(), newline + 1 + prefix);
    }

    #[test]
    fn test_truncated_payload() {
        let mut cursor = Cursor::new(b"10\nshort".to_vec());
        let result = read_frame(&mut cursor);
        assert!(matches!(result, Err(ProtocolError::Io(_))));
    }

    #[test]
    fn test_empty_input() {
        let mut cursor = Cursor::new(Vec::new());
        let result = read_frame(&mut cursor);
        assert!(matches!(result, Err(ProtocolError::UnexpectedEof)));
    }

    #[test]
    fn test_garbage_length_prefix() {
        let mut cursor = Cursor::new(b"not-a-number\n{}".to_vec());
        let result = read_frame(&mut cursor);
        assert!(matches!(result, Err(ProtocolError::InvalidLength(_))));
    }

    #[test]
    fn test_oversized_length_prefix() {
        let mut cursor = Cursor::new(format!("{}\n", MAX_PAYLOAD_SIZE + 1).into_bytes());
        let result = read_frame(&mut cursor);
        assert!(matches!(
            result,
            Err(ProtocolError::PayloadTooLarge { .. })
        ));
    }

    #[test]
    fn test_empty_payload() {
        let mut buf = Vec::new();
        write_frame(&mut buf, b"").unwrap();

        let mut cursor = Cursor::new(buf);
        let decoded = read_frame(&mut cursor).unwrap();
        assert!(decoded.is_empty());
    }
}
