//! Byte-level helpers for response buffers

use tracing::debug;

use crate::ResponseError;
use crate::response::status::StatusWord;

/// Split `data` into its trailing `(SW1, SW2)` and the payload before it
///
/// Fails with [`ResponseError::Incomplete`] below two bytes.
pub fn extract_response_parts(data: &[u8]) -> Result<((u8, u8), &[u8]), ResponseError> {
    let [payload @ .., sw1, sw2] = data else {
        debug!(len = data.len(), "Response shorter than a status word");
        return Err(ResponseError::Incomplete(data.len()));
    };

    Ok(((*sw1, *sw2), payload))
}

/// [`extract_response_parts`] with the status as a [`StatusWord`]
pub fn extract_status_and_payload(data: &[u8]) -> Result<(StatusWord, &[u8]), ResponseError> {
    let ((sw1, sw2), payload) = extract_response_parts(data)?;
    Ok((StatusWord::new(sw1, sw2), payload))
}

/// Read a length-prefixed field (`len || bytes`) from the front of `data`
///
/// Returns the field and the remainder of the buffer.
pub fn read_length_prefixed(data: &[u8]) -> Result<(&[u8], &[u8]), ResponseError> {
    let [len, rest @ ..] = data else {
        return Err(ResponseError::parse("missing length prefix"));
    };
    let len = usize::from(*len);
    if rest.len() < len {
        return Err(ResponseError::parse("length prefix exceeds buffer"));
    }
    Ok(rest.split_at(len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_response_parts() {
        let data = [0x01, 0x02, 0x03, 0x90, 0x00];
        let result = extract_response_parts(&data).unwrap();
        assert_eq!(result.0, (0x90, 0x00));
        assert_eq!(result.1, &[0x01, 0x02, 0x03]);

        let data = [0x90, 0x00];
        let result = extract_response_parts(&data).unwrap();
        assert_eq!(result.0, (0x90, 0x00));
        assert!(result.1.is_empty());

        assert_eq!(
            extract_response_parts(&[0x90]),
            Err(ResponseError::Incomplete(1))
        );
    }

    #[test]
    fn test_extract_status_and_payload() {
        let data = [0x01, 0x63, 0xC2];
        let (status, payload) = extract_status_and_payload(&data).unwrap();
        assert_eq!(status, StatusWord::new(0x63, 0xC2));
        assert_eq!(payload, &[0x01]);
    }

    #[test]
    fn test_read_length_prefixed() {
        let data = [0x03, 0xAA, 0xBB, 0xCC, 0x01];
        let (field, rest) = read_length_prefixed(&data).unwrap();
        assert_eq!(field, &[0xAA, 0xBB, 0xCC]);
        assert_eq!(rest, &[0x01]);

        assert!(read_length_prefixed(&[]).is_err());
        assert!(read_length_prefixed(&[0x04, 0x01]).is_err());
    }
}
