use crate::codec::ResponseEncoder;
use crate::protocol::{Framing, Message, ResponseHead, SendError};
use bytes::{Buf, Bytes, BytesMut};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::codec::Encoder;

/// Buffered write half of a connection.
///
/// Bytes are gathered with [`push`](Self::push) or [`write`](Self::write) and
/// go out on [`flush`](Self::flush).
#[derive(Debug)]
pub struct MessageWriter<W> {
    writer: W,
    buffer: BytesMut,
    encoder: ResponseEncoder,
}

impl<W> MessageWriter<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn with_capacity(writer: W, buffer_size: usize) -> Self {
        Self { writer, buffer: BytesMut::with_capacity(buffer_size), encoder: ResponseEncoder::new() }
    }

    #[inline]
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Appends bytes that are already encoded.
    #[inline]
    pub fn push(&mut self, bytes: &Bytes) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Encodes a response item written by the connection itself.
    #[inline]
    pub fn write<D>(&mut self, item: Message<(&ResponseHead, Framing), D>) -> Result<(), SendError>
    where
        D: Buf,
    {
        self.encoder.encode(item, &mut self.buffer)
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub async fn flush(&mut self) -> Result<(), SendError> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        self.writer.write_all(&self.buffer).await?;
        self.buffer.clear();
        Ok(self.writer.flush().await?)
    }

    /// Flushes what is buffered, then shuts the write half down.
    pub async fn shutdown(&mut self) -> Result<(), SendError> {
        self.flush().await?;
        Ok(self.writer.shutdown().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::PayloadItem;
    use http::StatusCode;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn buffers_until_flush() {
        let (client, server) = tokio::io::duplex(1024);
        let mut writer = MessageWriter::with_capacity(server, 64);

        writer.push(&Bytes::from_static(b"HTTP/1.1 200 OK\r\n"));
        assert!(matches!(writer.write(Message::<(&ResponseHead, Framing)>::Payload(PayloadItem::Eof)), Err(SendError::Io { .. })));
        assert_eq!(writer.buffered(), 17);
        writer.shutdown().await.unwrap();
        assert_eq!(writer.buffered(), 0);

        let mut received = String::new();
        let mut client = client;
        client.read_to_string(&mut received).await.unwrap();
        assert_eq!(received, "HTTP/1.1 200 OK\r\n");
    }

    #[tokio::test]
    async fn encodes_a_whole_response() {
        let (mut client, server) = tokio::io::duplex(1024);
        let mut writer = MessageWriter::with_capacity(server, 64);

        let head = ResponseHead::new(StatusCode::BAD_REQUEST);
        writer.write(Message::<_, Bytes>::Header((&head, Framing::Length(0)))).unwrap();
        writer.write(Message::<(&ResponseHead, Framing)>::Payload(PayloadItem::Eof)).unwrap();
        writer.shutdown().await.unwrap();

        let mut received = String::new();
        client.read_to_string(&mut received).await.unwrap();
        assert_eq!(received, "HTTP/1.1 400 Bad Request\r\ncontent-length: 0\r\n\r\n");
    }
}
