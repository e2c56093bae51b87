//! IRC line codec for tokio.
//!
//! Decodes newline-terminated lines into [`Message`]s. A line that fails to
//! parse is logged and skipped; only I/O failures and runaway lines end the
//! stream. Invalid UTF-8 is decoded lossily.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

use crate::error::{self, ProtocolError};
use crate::message::Message;

/// Default inbound limit: 512 bytes of message plus room for IRCv3 tags.
pub const DEFAULT_MAX_LEN: usize = 512 + 8191;

/// Tokio codec for client-side IRC traffic.
pub struct IrcCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    max_len: usize,
}

impl Default for IrcCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl IrcCodec {
    /// Codec with the default line limit.
    pub fn new() -> Self {
        Self::with_max_len(DEFAULT_MAX_LEN)
    }

    /// Codec with a custom inbound line limit in bytes.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
        }
    }

    /// Prepare an outgoing line.
    ///
    /// Strips any existing terminator, truncates at an embedded line break,
    /// and rejects NUL so a console line can never smuggle in a second
    /// command.
    pub fn sanitize(data: &str) -> error::Result<&str> {
        let line = match data.find(['\r', '\n']) {
            Some(pos) => &data[..pos],
            None => data,
        };
        if line.contains('\0') {
            return Err(ProtocolError::IllegalControlChar('\0'));
        }
        Ok(line)
    }

    fn next_line(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') else {
            self.next_index = src.len();
            if src.len() > self.max_len {
                return Err(ProtocolError::LineTooLong {
                    actual: src.len(),
                    limit: self.max_len,
                });
            }
            return Ok(None);
        };

        let line = src.split_to(self.next_index + offset + 1);
        self.next_index = 0;
        if line.len() > self.max_len {
            return Err(ProtocolError::LineTooLong {
                actual: line.len(),
                limit: self.max_len,
            });
        }
        Ok(Some(String::from_utf8_lossy(&line).into_owned()))
    }
}

impl Decoder for IrcCodec {
    type Item = Message;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<Message>> {
        while let Some(line) = self.next_line(src)? {
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<Message>() {
                Ok(msg) => return Ok(Some(msg)),
                Err(e) => warn!(line = %line.trim_end(), error = %e, "Skipping malformed line"),
            }
        }
        Ok(None)
    }
}

impl Encoder<String> for IrcCodec {
    type Error = ProtocolError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> error::Result<()> {
        let line = Self::sanitize(&line)?;
        dst.reserve(line.len() + 2);
        dst.put_slice(line.as_bytes());
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

impl Encoder<Message> for IrcCodec {
    type Error = ProtocolError;

    fn encode(&mut self, msg: Message, dst: &mut BytesMut) -> error::Result<()> {
        <Self as Encoder<String>>::encode(self, msg.to_string(), dst)
    }
}
