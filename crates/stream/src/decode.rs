//! Incremental UTF-8 decoding across transport chunk boundaries.

/// Decodes byte chunks into text, holding back an incomplete trailing
/// multi-byte sequence until the next chunk completes it.
///
/// Invalid sequences become U+FFFD, same as `String::from_utf8_lossy`.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode as much of `pending + bytes` as forms complete characters.
    pub fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::with_capacity(self.pending.len());

        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match e.error_len() {
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + bad);
                        }
                        None => {
                            // Incomplete sequence at the end: wait for more.
                            self.pending.drain(..valid);
                            break;
                        }
                    }
                }
            }
        }

        out
    }

    /// Flush whatever is still held back.  Called once at end of stream.
    pub fn finish(&mut self) -> String {
        let tail = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        tail
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_passes_through() {
        let mut d = Utf8Decoder::new();
        assert_eq!(d.decode(b"hello"), "hello");
        assert!(!d.has_pending());
    }

    #[test]
    fn split_cjk_character_is_reassembled() {
        let bytes = "第一".as_bytes();
        let mut d = Utf8Decoder::new();
        // "第" is three bytes; cut after the first two.
        assert_eq!(d.decode(&bytes[..2]), "");
        assert!(d.has_pending());
        assert_eq!(d.decode(&bytes[2..]), "第一");
        assert!(!d.has_pending());
    }

    #[test]
    fn byte_at_a_time() {
        let mut d = Utf8Decoder::new();
        let mut out = String::new();
        for b in "段落A，段落B".as_bytes() {
            out.push_str(&d.decode(std::slice::from_ref(b)));
        }
        assert_eq!(out, "段落A，段落B");
    }

    #[test]
    fn invalid_byte_is_replaced_and_decoding_continues() {
        let mut d = Utf8Decoder::new();
        assert_eq!(d.decode(b"a\xFFb"), "a\u{FFFD}b");
    }

    #[test]
    fn finish_flushes_truncated_sequence_lossily() {
        let mut d = Utf8Decoder::new();
        assert_eq!(d.decode(&"文".as_bytes()[..1]), "");
        assert_eq!(d.finish(), "\u{FFFD}");
        assert!(!d.has_pending());
    }
}
