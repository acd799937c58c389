//! Content-Encoding negotiation and streaming compression
//!
//! Static assets are compressed on the fly: every chunk read from disk is fed
//! through a `flate2` encoder and whatever output it has produced so far is
//! forwarded, so the body is never buffered whole.

use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;
use futures_util::Stream;
use hyper::body::Bytes;
use std::io::{self, Write};
use std::pin::Pin;
use std::task::{Context, Poll};

/// Encoding applied to a response body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEncoding {
    Gzip,
    Deflate,
    Identity,
}

impl ContentEncoding {
    /// Pick an encoding from `Accept-Encoding`: gzip, then deflate, then none.
    ///
    /// Codings listed with `q=0` are refused and do not count.
    pub fn negotiate(accept_encoding: Option<&str>) -> Self {
        let Some(header) = accept_encoding else {
            return Self::Identity;
        };

        let accepted: Vec<String> = header
            .split(',')
            .filter_map(|item| {
                let mut parts = item.split(';');
                let coding = parts.next()?.trim().to_ascii_lowercase();
                let refused = parts.any(|param| {
                    param
                        .trim()
                        .strip_prefix("q=")
                        .and_then(|q| q.trim().parse::<f32>().ok())
                        .is_some_and(|q| q <= 0.0)
                });
                (!coding.is_empty() && !refused).then_some(coding)
            })
            .collect();

        if accepted.iter().any(|c| c == "gzip") {
            Self::Gzip
        } else if accepted.iter().any(|c| c == "deflate") {
            Self::Deflate
        } else {
            Self::Identity
        }
    }

    /// `Content-Encoding` header value, `None` for identity
    pub const fn header_value(self) -> Option<&'static str> {
        match self {
            Self::Gzip => Some("gzip"),
            Self::Deflate => Some("deflate"),
            Self::Identity => None,
        }
    }
}

enum Encoder {
    Gzip(GzEncoder<Vec<u8>>),
    // HTTP "deflate" is the zlib format
    Deflate(ZlibEncoder<Vec<u8>>),
    Identity,
}

impl Encoder {
    fn new(encoding: ContentEncoding) -> Self {
        match encoding {
            ContentEncoding::Gzip => Self::Gzip(GzEncoder::new(Vec::new(), Compression::default())),
            ContentEncoding::Deflate => {
                Self::Deflate(ZlibEncoder::new(Vec::new(), Compression::default()))
            }
            ContentEncoding::Identity => Self::Identity,
        }
    }

    /// Feed one chunk, returning the output produced so far
    fn write_chunk(&mut self, chunk: Bytes) -> io::Result<Bytes> {
        match self {
            Self::Gzip(e) => {
                e.write_all(&chunk)?;
                Ok(Bytes::from(std::mem::take(e.get_mut())))
            }
            Self::Deflate(e) => {
                e.write_all(&chunk)?;
                Ok(Bytes::from(std::mem::take(e.get_mut())))
            }
            Self::Identity => Ok(chunk),
        }
    }

    fn finish(&mut self) -> io::Result<Bytes> {
        match self {
            Self::Gzip(e) => {
                e.try_finish()?;
                Ok(Bytes::from(std::mem::take(e.get_mut())))
            }
            Self::Deflate(e) => {
                e.try_finish()?;
                Ok(Bytes::from(std::mem::take(e.get_mut())))
            }
            Self::Identity => Ok(Bytes::new()),
        }
    }
}

/// Byte stream compressed chunk by chunk
pub struct CompressStream<S> {
    inner: S,
    encoder: Encoder,
    done: bool,
}

impl<S> CompressStream<S> {
    /// Wrap `inner`; [`ContentEncoding::Identity`] passes chunks through
    pub fn new(inner: S, encoding: ContentEncoding) -> Self {
        Self {
            inner,
            encoder: Encoder::new(encoding),
            done: false,
        }
    }
}

impl<S> Stream for CompressStream<S>
where
    S: Stream<Item = io::Result<Bytes>> + Unpin,
{
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if this.done {
                return Poll::Ready(None);
            }
            match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Some(Ok(chunk))) => match this.encoder.write_chunk(chunk) {
                    // The encoder buffers internally; wait for more input
                    Ok(out) if out.is_empty() => {}
                    Ok(out) => return Poll::Ready(Some(Ok(out))),
                    Err(e) => {
                        this.done = true;
                        return Poll::Ready(Some(Err(e)));
                    }
                },
                Poll::Ready(Some(Err(e))) => {
                    this.done = true;
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Ready(None) => {
                    this.done = true;
                    return match this.encoder.finish() {
                        Ok(out) if out.is_empty() => Poll::Ready(None),
                        result => Poll::Ready(Some(result)),
                    };
                }
            }
        }
    }
}
