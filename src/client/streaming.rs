//! Live event stream decoding.
//!
//! Accepts either server-sent events (`data: {...}` lines) or newline
//! delimited JSON. Comments, keep-alives and other SSE fields are skipped.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;
use pin_project_lite::pin_project;

use super::types::EventEntity;
use crate::{Error, Result};

/// Longest line accepted from the live stream.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

pin_project! {
    pub struct EventStreamParser<S> {
        #[pin]
        inner: S,
        buffer: Vec<u8>,
        pos: usize,
        done: bool,
    }
}

impl<S> EventStreamParser<S>
where
    S: Stream<Item = std::result::Result<Bytes, reqwest::Error>>,
{
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            buffer: Vec::with_capacity(4096),
            pos: 0,
            done: false,
        }
    }

    fn parse_line(line: &[u8]) -> Option<Result<EventEntity>> {
        let line = match std::str::from_utf8(line) {
            Ok(s) => s.trim(),
            Err(e) => {
                return Some(Err(Error::Stream(format!("Invalid UTF-8 in event: {}", e))));
            }
        };
        if line.is_empty() || line.starts_with(':') {
            return None;
        }

        let payload = if let Some(data) = line.strip_prefix("data:") {
            data.trim()
        } else if line.starts_with('{') {
            line
        } else {
            return None;
        };
        if payload.is_empty() {
            return None;
        }

        Some(
            serde_json::from_str::<EventEntity>(payload)
                .map_err(|e| Error::Stream(format!("Undecodable event: {}", e))),
        )
    }
}

impl<S> Stream for EventStreamParser<S>
where
    S: Stream<Item = std::result::Result<Bytes, reqwest::Error>>,
{
    type Item = Result<EventEntity>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            if let Some(rel) = this.buffer[*this.pos..].iter().position(|b| *b == b'\n') {
                let start = *this.pos;
                let end = start + rel;
                *this.pos = end + 1;

                let item = Self::parse_line(&this.buffer[start..end]);

                if this.buffer.len() > 8192 && *this.pos > this.buffer.len() / 2 {
                    this.buffer.drain(..*this.pos);
                    *this.pos = 0;
                }

                match item {
                    Some(item) => return Poll::Ready(Some(item)),
                    None => continue,
                }
            }

            if *this.done {
                return Poll::Ready(None);
            }

            if this.buffer.len() - *this.pos > MAX_LINE_BYTES {
                *this.done = true;
                this.buffer.clear();
                *this.pos = 0;
                return Poll::Ready(Some(Err(Error::Stream(format!(
                    "Event line exceeds {} bytes",
                    MAX_LINE_BYTES
                )))));
            }

            match this.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => {
                    if *this.pos > 0 && this.buffer.len() + bytes.len() > 16384 {
                        this.buffer.drain(..*this.pos);
                        *this.pos = 0;
                    }
                    this.buffer.extend_from_slice(&bytes);
                }
                Poll::Ready(Some(Err(e))) => {
                    *this.done = true;
                    return Poll::Ready(Some(Err(Error::Network(e))));
                }
                Poll::Ready(None) => {
                    *this.done = true;
                    if *this.pos < this.buffer.len() {
                        let start = *this.pos;
                        *this.pos = this.buffer.len();
                        if let Some(item) = Self::parse_line(&this.buffer[start..]) {
                            return Poll::Ready(Some(item));
                        }
                    }
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
