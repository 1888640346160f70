//! Streaming chunk contracts and in-memory stream utilities.
//!
//! ```rust
//! use pprovider::{BoxedChunkStream, StreamChunk, VecChunkStream};
//!
//! let stream = VecChunkStream::new(vec![Ok(StreamChunk::content_delta("hello"))]);
//! let _boxed: BoxedChunkStream<'static> = Box::pin(stream);
//! ```

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;

use crate::{LlmError, StreamChunk};

/// Provider stream contract.
///
/// Invariants for consumers:
/// - Chunks are emitted in source order.
/// - The sequence is finite and non-restartable.
/// - A chunk carrying a `finish_reason` terminates the logical response;
///   once the stream yields `None`, it must not yield additional items.
/// - Dropping the stream cancels the underlying request.
pub trait ChunkStream: Stream<Item = Result<StreamChunk, LlmError>> + Send {}

impl<T> ChunkStream for T where T: Stream<Item = Result<StreamChunk, LlmError>> + Send {}

pub type BoxedChunkStream<'a> = Pin<Box<dyn ChunkStream + 'a>>;

#[derive(Debug)]
pub struct VecChunkStream {
    chunks: VecDeque<Result<StreamChunk, LlmError>>,
}

impl VecChunkStream {
    pub fn new(chunks: Vec<Result<StreamChunk, LlmError>>) -> Self {
        Self {
            chunks: chunks.into(),
        }
    }
}

impl Stream for VecChunkStream {
    type Item = Result<StreamChunk, LlmError>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<StreamChunk, LlmError>>> {
        Poll::Ready(self.chunks.pop_front())
    }
}
