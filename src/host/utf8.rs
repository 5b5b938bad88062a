/// Incremental UTF-8 decoder for PTY output.
///
/// Reads from the pseudo-terminal split the byte stream at arbitrary points.
/// An incomplete trailing sequence is held back until the next read completes
/// it; invalid sequences become U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8StreamDecoder {
    remainder: Vec<u8>,
}

impl Utf8StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode as much of `bytes` (plus any held-back prefix) as possible.
    pub fn push(&mut self, bytes: &[u8]) -> String {
        self.remainder.extend_from_slice(bytes);

        let mut output = String::with_capacity(self.remainder.len());
        let mut consumed = 0;
        while consumed < self.remainder.len() {
            let rest = &self.remainder[consumed..];
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    output.push_str(valid);
                    consumed = self.remainder.len();
                }
                Err(err) => {
                    let valid_up_to = err.valid_up_to();
                    if let Ok(valid) = std::str::from_utf8(&rest[..valid_up_to]) {
                        output.push_str(valid);
                    }
                    match err.error_len() {
                        Some(invalid_len) => {
                            output.push(char::REPLACEMENT_CHARACTER);
                            consumed += valid_up_to + invalid_len;
                        }
                        None => {
                            // Incomplete sequence at the end: wait for more bytes.
                            consumed += valid_up_to;
                            break;
                        }
                    }
                }
            }
        }

        self.remainder.drain(..consumed);
        output
    }

    /// Bytes held back waiting for the rest of a sequence.
    pub fn pending(&self) -> usize {
        self.remainder.len()
    }

    /// Flush a dangling partial sequence at end of stream.
    pub fn finish(&mut self) -> String {
        let tail = String::from_utf8_lossy(&self.remainder).into_owned();
        self.remainder.clear();
        tail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_passes_through() {
        let mut decoder = Utf8StreamDecoder::new();
        assert_eq!(decoder.push(b"ls -la\r\n"), "ls -la\r\n");
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn split_two_byte_sequence_is_joined() {
        let mut decoder = Utf8StreamDecoder::new();
        let bytes = "café".as_bytes();
        let (head, tail) = bytes.split_at(bytes.len() - 1);
        assert_eq!(decoder.push(head), "caf");
        assert_eq!(decoder.pending(), 1);
        assert_eq!(decoder.push(tail), "é");
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn four_byte_sequence_across_three_reads() {
        let mut decoder = Utf8StreamDecoder::new();
        let bytes = "🦀".as_bytes();
        assert_eq!(decoder.push(&bytes[..1]), "");
        assert_eq!(decoder.push(&bytes[1..3]), "");
        assert_eq!(decoder.push(&bytes[3..]), "🦀");
    }

    #[test]
    fn invalid_byte_is_replaced_and_decoding_continues() {
        let mut decoder = Utf8StreamDecoder::new();
        assert_eq!(decoder.push(b"a\xffb"), "a\u{FFFD}b");
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn invalid_then_incomplete() {
        let mut decoder = Utf8StreamDecoder::new();
        assert_eq!(decoder.push(b"\xff\xe2\x82"), "\u{FFFD}");
        assert_eq!(decoder.push(b"\xac"), "€");
    }

    #[test]
    fn finish_replaces_dangling_bytes() {
        let mut decoder = Utf8StreamDecoder::new();
        assert_eq!(decoder.push(b"ok\xe2\x82"), "ok");
        assert_eq!(decoder.finish(), "\u{FFFD}");
        assert_eq!(decoder.pending(), 0);
        assert_eq!(decoder.finish(), "");
    }
}
