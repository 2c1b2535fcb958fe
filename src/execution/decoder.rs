//! Incremental decoding of the run output stream
//!
//! The backend sends raw text with arbitrary chunking, so a multi-byte
//! character may straddle two chunks. The decoder carries the incomplete
//! tail over to the next chunk instead of replacing it.

use crate::backend::ByteStream;
use crate::error::Result;
use futures::StreamExt;

/// Stateful UTF-8 decoder. Invalid sequences become U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8StreamDecoder {
    pending: Vec<u8>,
}

impl Utf8StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next chunk, holding back a trailing partial character
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut buf = std::mem::take(&mut self.pending);
        buf.extend_from_slice(chunk);

        let mut out = String::with_capacity(buf.len());
        let mut rest = buf.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(e) => {
                    let (valid, tail) = rest.split_at(e.valid_up_to());
                    out.push_str(&String::from_utf8_lossy(valid));
                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &tail[len..];
                        }
                        None => {
                            self.pending = tail.to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Flush at end of stream; a dangling partial character becomes U+FFFD
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }
        let tail = std::mem::take(&mut self.pending);
        String::from_utf8_lossy(&tail).into_owned()
    }

    /// Bytes held back waiting for the rest of a character
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// Pull-based reader producing decoded text fragments, one per chunk.
pub struct FragmentReader {
    inner: ByteStream,
    decoder: Utf8StreamDecoder,
    done: bool,
}

impl FragmentReader {
    pub fn new(inner: ByteStream) -> Self {
        Self {
            inner,
            decoder: Utf8StreamDecoder::new(),
            done: false,
        }
    }

    /// Next decoded fragment. `None` is end-of-stream; an `Err` ends the
    /// stream as well.
    pub async fn next_fragment(&mut self) -> Option<Result<String>> {
        if self.done {
            return None;
        }
        match self.inner.next().await {
            Some(Ok(bytes)) => Some(Ok(self.decoder.decode(&bytes))),
            Some(Err(e)) => {
                self.done = true;
                Some(Err(e))
            }
            None => {
                self.done = true;
                let tail = self.decoder.finish();
                if tail.is_empty() {
                    None
                } else {
                    Some(Ok(tail))
                }
            }
        }
    }
}
