// Output sink with a stack of buffers.
//
// Nested containers (blockquotes, lists, list items) render into a fresh
// buffer, then their exit handler pops it, rewrites it (prefixes, indents)
// and splices the result back into the parent buffer.

/// Append-only byte sink.
#[derive(Debug)]
pub struct Writer {
    buf: Vec<u8>,
    saved: Vec<Vec<u8>>,
    last_out: u8,
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer {
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            saved: Vec::new(),
            last_out: b'\n',
        }
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        if let Some(&last) = bytes.last() {
            self.buf.extend_from_slice(bytes);
            self.last_out = last;
        }
    }

    pub fn write_str(&mut self, s: &str) {
        self.write_bytes(s.as_bytes());
    }

    pub fn write_byte(&mut self, b: u8) {
        self.buf.push(b);
        self.last_out = b;
    }

    /// Write `\n` unless the last byte written was already one.
    pub fn newline(&mut self) {
        if self.last_out != b'\n' {
            self.write_byte(b'\n');
        }
    }

    /// Last byte written, `\n` before anything was written.
    pub fn last_byte(&self) -> u8 {
        self.last_out
    }

    /// Contents of the current buffer.
    pub fn current(&self) -> &[u8] {
        &self.buf
    }

    /// Start rendering into a fresh buffer.
    pub fn push_buffer(&mut self) {
        let outer = std::mem::take(&mut self.buf);
        self.saved.push(outer);
        self.last_out = b'\n';
    }

    /// Finish the current buffer and return its contents; the enclosing
    /// buffer becomes current again.
    pub fn pop_buffer(&mut self) -> Vec<u8> {
        let outer = self.saved.pop().unwrap_or_default();
        let inner = std::mem::replace(&mut self.buf, outer);
        self.last_out = self.buf.last().copied().unwrap_or(b'\n');
        inner
    }

    /// Number of enclosing buffers.
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Drop trailing spaces, tabs and newlines from the current buffer.
    pub fn trim_end(&mut self) {
        while matches!(self.buf.last(), Some(b' ' | b'\t' | b'\n')) {
            self.buf.pop();
        }
        if let Some(&last) = self.buf.last() {
            self.last_out = last;
        }
    }

    /// Drop leading and trailing spaces, tabs and newlines from the current
    /// buffer.
    pub fn trim(&mut self) {
        self.trim_end();
        let start = self
            .buf
            .iter()
            .position(|b| !matches!(b, b' ' | b'\t' | b'\n'))
            .unwrap_or(self.buf.len());
        self.buf.drain(..start);
    }

    /// Discard everything, including stacked buffers.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.saved.clear();
        self.last_out = b'\n';
    }

    /// Take the current buffer as a string.
    pub fn take_string(&mut self) -> String {
        let bytes = std::mem::take(&mut self.buf);
        self.last_out = b'\n';
        match String::from_utf8(bytes) {
            Ok(s) => s,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newline_only_when_needed() {
        let mut w = Writer::new();
        w.newline();
        assert!(w.current().is_empty());
        w.write_str("a");
        w.newline();
        w.newline();
        assert_eq!(w.take_string(), "a\n");
    }

    #[test]
    fn test_push_pop_restores_parent() {
        let mut w = Writer::new();
        w.write_str("outer");
        w.push_buffer();
        assert_eq!(w.depth(), 1);
        assert_eq!(w.last_byte(), b'\n');
        w.write_str("inner");
        let inner = w.pop_buffer();
        assert_eq!(inner, b"inner");
        assert_eq!(w.depth(), 0);
        assert_eq!(w.last_byte(), b'r');
        assert_eq!(w.take_string(), "outer");
    }

    #[test]
    fn test_trim() {
        let mut w = Writer::new();
        w.write_str("\n\t a b \n\n");
        w.trim();
        assert_eq!(w.last_byte(), b'b');
        assert_eq!(w.take_string(), "a b");
    }

    #[test]
    fn test_trim_empty_keeps_last_out() {
        let mut w = Writer::new();
        w.push_buffer();
        w.write_str(" ");
        w.trim();
        assert_eq!(w.last_byte(), b' ');
    }
}
