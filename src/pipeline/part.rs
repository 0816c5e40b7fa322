use std::fmt;
use std::io::Cursor;
use std::pin::Pin;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};

pub type PartStream = Pin<Box<dyn AsyncRead + Send>>;

/// One transferable object. The content can be read exactly once.
pub struct Part {
    name: String,
    media_type: String,
    size_hint: Option<u64>,
    content: PartStream,
}

impl Part {
    pub fn new(
        name: impl Into<String>,
        media_type: impl Into<String>,
        size_hint: Option<u64>,
        content: PartStream,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            size_hint,
            content,
        }
    }

    /// In-memory part backed by an owned buffer
    pub fn from_bytes(
        name: impl Into<String>,
        media_type: impl Into<String>,
        data: Bytes,
    ) -> Self {
        let size = data.len() as u64;
        Self::new(name, media_type, Some(size), Box::pin(Cursor::new(data)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn size_hint(&self) -> Option<u64> {
        self.size_hint
    }

    pub fn into_stream(self) -> PartStream {
        self.content
    }

    /// Drain the content stream into one buffer
    pub async fn read_all(self) -> std::io::Result<Bytes> {
        let capacity = self.size_hint.unwrap_or(0).min(64 * 1024 * 1024) as usize;
        let mut buffer = Vec::with_capacity(capacity);
        let mut content = self.content;
        content.read_to_end(&mut buffer).await?;
        Ok(Bytes::from(buffer))
    }
}

impl fmt::Debug for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Part")
            .field("name", &self.name)
            .field("media_type", &self.media_type)
            .field("size_hint", &self.size_hint)
            .finish_non_exhaustive()
    }
}
