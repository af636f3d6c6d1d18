//! # Block Sources
//!
//! Where blocks come from. The runtime pulls from a [`BlockSource`] on its
//! own task and never cares whether the blocks are read from disk or
//! handed over by a test.

use crate::error::{RuntimeError, RuntimeResult};
use crate::handlers::Block;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};
use tracing::debug;

#[async_trait]
pub trait BlockSource: Send {
    /// The next block, or `None` once the source is exhausted.
    async fn next_block(&mut self) -> RuntimeResult<Option<Block>>;
}

/// One JSON block per line. Blank lines and `#` comments are skipped.
pub struct JsonLinesBlockSource<R> {
    lines: Lines<BufReader<R>>,
    line_no: usize,
}

impl JsonLinesBlockSource<File> {
    pub async fn open(path: impl AsRef<Path>) -> RuntimeResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .await
            .map_err(|e| RuntimeError::Source(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "[runtime] Block file opened");
        Ok(Self::from_reader(file))
    }
}

impl<R: AsyncRead + Unpin + Send> JsonLinesBlockSource<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
            line_no: 0,
        }
    }
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send> BlockSource for JsonLinesBlockSource<R> {
    async fn next_block(&mut self) -> RuntimeResult<Option<Block>> {
        loop {
            let line = self
                .lines
                .next_line()
                .await
                .map_err(|e| RuntimeError::Source(e.to_string()))?;
            let Some(line) = line else {
                return Ok(None);
            };
            self.line_no += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            return serde_json::from_str(trimmed).map(Some).map_err(|e| {
                RuntimeError::Source(format!("line {}: {}", self.line_no, e))
            });
        }
    }
}

/// Blocks held in memory, yielded in order.
#[derive(Default)]
pub struct VecBlockSource {
    blocks: VecDeque<Block>,
}

impl VecBlockSource {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self {
            blocks: blocks.into(),
        }
    }
}

#[async_trait]
impl BlockSource for VecBlockSource {
    async fn next_block(&mut self) -> RuntimeResult<Option<Block>> {
        Ok(self.blocks.pop_front())
    }
}
