//! Response body for rendered images.
//!
//! The image is handed to hyper in fixed-size chunks. If the connection goes
//! away after the transfer started but before the last chunk was taken, the
//! body is dropped with data still pending and the failed write is logged.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use http_body::{Body, Frame, SizeHint};
use tracing::error;

/// Largest frame handed to the connection at once.
pub const IMAGE_CHUNK_SIZE: usize = 64 * 1024;

/// An in-memory image that reports an aborted transfer when dropped.
#[derive(Debug)]
pub struct ImageBody {
    remaining: Bytes,
    total: usize,
    started: bool,
}

impl ImageBody {
    /// Wrap encoded image bytes.
    pub fn new(image: Bytes) -> Self {
        Self {
            total: image.len(),
            remaining: image,
            started: false,
        }
    }

    /// Bytes not yet handed to the connection.
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }
}

impl Body for ImageBody {
    type Data = Bytes;
    type Error = std::convert::Infallible;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        self.started = true;

        if self.remaining.is_empty() {
            return Poll::Ready(None);
        }

        let len = self.remaining.len().min(IMAGE_CHUNK_SIZE);
        let chunk = self.remaining.split_to(len);
        Poll::Ready(Some(Ok(Frame::data(chunk))))
    }

    fn is_end_stream(&self) -> bool {
        self.remaining.is_empty()
    }

    fn size_hint(&self) -> SizeHint {
        SizeHint::with_exact(self.remaining.len() as u64)
    }
}

impl Drop for ImageBody {
    fn drop(&mut self) {
        // Bodies that were never polled (HEAD requests, short-circuited
        // responses) were not meant to be written
        if self.started && !self.remaining.is_empty() {
            error!(
                sent = self.total - self.remaining.len(),
                total = self.total,
                "Failed to write image response: connection closed before the body was sent"
            );
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
