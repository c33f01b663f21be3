/// Longest line kept while waiting for a terminator; anything longer is
/// flushed as one line.
pub const MAX_LINE_BYTES: usize = 4096;

/// Decode device output as ASCII, dropping (not replacing) any byte outside
/// the ASCII range.
pub fn decode_permissive(bytes: &[u8]) -> String {
    bytes
        .iter()
        .filter(|b| b.is_ascii())
        .map(|&b| char::from(b))
        .collect()
}

/// Accumulates bytes across reads and splits them into lines.
///
/// The scale may deliver a frame one byte at a time, so a partial line is
/// kept until its `\n` arrives. A trailing `\r` is stripped.
#[derive(Debug, Default)]
pub struct LineAssembler {
    buf: Vec<u8>,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Pop the next complete line, if any.
    pub fn next_line(&mut self) -> Option<Vec<u8>> {
        if let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.buf.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            return Some(line);
        }
        if self.buf.len() >= MAX_LINE_BYTES {
            return Some(std::mem::take(&mut self.buf));
        }
        None
    }

    /// Bytes buffered without a terminator yet.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reassembles_bytewise_frames() {
        let mut asm = LineAssembler::new();
        for b in b"  4.7" {
            asm.push(&[*b]);
            assert!(asm.next_line().is_none());
        }
        asm.push(b"2 kg\r\n  4.8");
        assert_eq!(asm.next_line().unwrap(), b"  4.72 kg");
        assert!(asm.next_line().is_none());
        assert_eq!(asm.pending(), 5);
    }

    #[test]
    fn yields_multiple_lines_in_order() {
        let mut asm = LineAssembler::new();
        asm.push(b"a\nb\r\n\n");
        assert_eq!(asm.next_line().unwrap(), b"a");
        assert_eq!(asm.next_line().unwrap(), b"b");
        assert_eq!(asm.next_line().unwrap(), b"");
        assert!(asm.next_line().is_none());
    }

    #[test]
    fn flushes_oversized_garbage() {
        let mut asm = LineAssembler::new();
        asm.push(&vec![b'x'; MAX_LINE_BYTES]);
        assert_eq!(asm.next_line().unwrap().len(), MAX_LINE_BYTES);
        assert_eq!(asm.pending(), 0);
    }

    #[test]
    fn decode_drops_high_bytes() {
        assert_eq!(decode_permissive(b"1\xc3\xa9.5 kg"), "1.5 kg");
    }
}
