use crate::error::{CyphalError, Result};
use std::borrow::Cow;
use std::iter::Peekable;

/// Re-chunks an ordered sequence of byte buffers into chunks of exactly `max_chunk`
/// bytes, except the last one which holds the remainder.
///
/// Chunks that lie within a single input buffer are borrowed. A chunk that crosses
/// input buffer boundaries is copied once into an owned buffer. Empty input buffers
/// are skipped, and empty input yields no chunks at all.
pub struct Refragment<'a, I>
where
    I: Iterator<Item = &'a [u8]>,
{
    buffers: Peekable<I>,
    current: &'a [u8],
    max_chunk: usize,
}

pub fn refragment<'a, I>(buffers: I, max_chunk: usize) -> Result<Refragment<'a, I::IntoIter>>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    if max_chunk < 1 {
        return Err(CyphalError::InvalidConfiguration(format!(
            "invalid chunk size: {max_chunk}"
        )));
    }
    Ok(Refragment {
        buffers: buffers.into_iter().peekable(),
        current: &[],
        max_chunk,
    })
}

impl<'a, I> Refragment<'a, I>
where
    I: Iterator<Item = &'a [u8]>,
{
    fn has_more_input(&mut self) -> bool {
        while let Some(next) = self.buffers.peek() {
            if !next.is_empty() {
                return true;
            }
            self.buffers.next();
        }
        false
    }
}

impl<'a, I> Iterator for Refragment<'a, I>
where
    I: Iterator<Item = &'a [u8]>,
{
    type Item = Cow<'a, [u8]>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.current.is_empty() {
            self.current = self.buffers.next()?;
        }

        if self.current.len() >= self.max_chunk {
            let (chunk, rest) = self.current.split_at(self.max_chunk);
            self.current = rest;
            return Some(Cow::Borrowed(chunk));
        }

        // Final remainder, nothing left to coalesce with
        if !self.has_more_input() {
            return Some(Cow::Borrowed(std::mem::take(&mut self.current)));
        }

        let mut chunk = Vec::with_capacity(self.max_chunk);
        chunk.extend_from_slice(std::mem::take(&mut self.current));
        while chunk.len() < self.max_chunk {
            let Some(next) = self.buffers.next() else {
                break;
            };
            let take = next.len().min(self.max_chunk - chunk.len());
            chunk.extend_from_slice(&next[..take]);
            self.current = &next[take..];
        }
        Some(Cow::Owned(chunk))
    }
}
