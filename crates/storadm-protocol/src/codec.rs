//! Tokio codec for newline-delimited JSON messages

use bytes::{BufMut, BytesMut};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use tokio_util::codec::{Decoder, Encoder};

use crate::error::ProtocolError;

/// Maximum size of a single encoded message, excluding the newline (16 MiB)
pub const MAX_LINE_SIZE: usize = 16 * 1024 * 1024;

/// Codec framing one JSON document per line
///
/// `In` is the type decoded from the peer, `Out` the type encoded to it. A
/// client uses `JsonLinesCodec<NodeResponse, NodeRequest>`, a node the
/// reverse.
#[derive(Debug)]
pub struct JsonLinesCodec<In, Out> {
    /// Bytes of the buffer already scanned for a newline
    scanned: usize,
    _marker: PhantomData<fn(Out) -> In>,
}

impl<In, Out> JsonLinesCodec<In, Out> {
    /// Create a new codec
    pub fn new() -> Self {
        Self {
            scanned: 0,
            _marker: PhantomData,
        }
    }
}

impl<In, Out> Default for JsonLinesCodec<In, Out> {
    fn default() -> Self {
        Self::new()
    }
}

impl<In: DeserializeOwned, Out> Decoder for JsonLinesCodec<In, Out> {
    type Item = In;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let newline = src[self.scanned..].iter().position(|b| *b == b'\n');

            let Some(offset) = newline else {
                if src.len() > MAX_LINE_SIZE {
                    return Err(ProtocolError::LineTooLarge {
                        size: src.len(),
                        max: MAX_LINE_SIZE,
                    });
                }
                self.scanned = src.len();
                return Ok(None);
            };

            let line_len = self.scanned + offset;
            self.scanned = 0;

            if line_len > MAX_LINE_SIZE {
                return Err(ProtocolError::LineTooLarge {
                    size: line_len,
                    max: MAX_LINE_SIZE,
                });
            }

            let line = src.split_to(line_len + 1);
            let payload = trim_line(&line[..line_len]);

            // Blank keepalive lines carry no message
            if payload.is_empty() {
                continue;
            }

            tracing::trace!(bytes = payload.len(), "Decoded line");
            return Ok(Some(serde_json::from_slice(payload)?));
        }
    }
}

impl<In, Out: Serialize> Encoder<Out> for JsonLinesCodec<In, Out> {
    type Error = ProtocolError;

    fn encode(&mut self, item: Out, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let payload = serde_json::to_vec(&item)?;

        if payload.len() > MAX_LINE_SIZE {
            return Err(ProtocolError::LineTooLarge {
                size: payload.len(),
                max: MAX_LINE_SIZE,
            });
        }

        dst.reserve(payload.len() + 1);
        dst.put_slice(&payload);
        dst.put_u8(b'\n');
        Ok(())
    }
}

fn trim_line(line: &[u8]) -> &[u8] {
    match line.last() {
        Some(b'\r') => &line[..line.len() - 1],
        _ => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendStatus;
    use crate::message::{BackendCommand, NodeRequest, NodeResponse};

    type ClientCodec = JsonLinesCodec<NodeResponse, NodeRequest>;
    type NodeCodec = JsonLinesCodec<NodeRequest, NodeResponse>;

    #[test]
    fn test_encode_is_single_line() {
        let mut codec = ClientCodec::new();
        let mut buf = BytesMut::new();
        codec
            .encode(
                NodeRequest::BackendControl {
                    backend_id: 1,
                    command: BackendCommand::Enable,
                },
                &mut buf,
            )
            .unwrap();

        assert_eq!(buf.iter().filter(|b| **b == b'\n').count(), 1);
        assert_eq!(buf.last(), Some(&b'\n'));

        let mut node = NodeCodec::new();
        let decoded = node.decode(&mut buf).unwrap().unwrap();
        assert_eq!(
            decoded,
            NodeRequest::BackendControl {
                backend_id: 1,
                command: BackendCommand::Enable,
            }
        );
        assert!(buf.is_empty());
    }

    #[test]
    fn test_partial_read() {
        let mut node = NodeCodec::new();
        let mut encoded = BytesMut::new();
        node.encode(
            NodeResponse::Backends {
                backends: vec![BackendStatus::enabled(4)],
            },
            &mut encoded,
        )
        .unwrap();

        let mut client = ClientCodec::new();
        let mut partial = encoded.split_to(10);
        assert!(client.decode(&mut partial).unwrap().is_none());

        partial.extend_from_slice(&encoded);
        match client.decode(&mut partial).unwrap() {
            Some(NodeResponse::Backends { backends }) => {
                assert_eq!(backends, vec![BackendStatus::enabled(4)]);
            }
            other => panic!("Expected backends, got {:?}", other),
        }
    }

    #[test]
    fn test_two_messages_in_one_buffer() {
        let mut client = ClientCodec::new();
        let mut buf = BytesMut::from(
            "{\"type\":\"stat\",\"stat\":{}}\r\n\n{\"type\":\"error\",\"code\":-5,\"message\":\"io\"}\n",
        );

        assert!(matches!(
            client.decode(&mut buf).unwrap(),
            Some(NodeResponse::Stat { .. })
        ));
        assert!(matches!(
            client.decode(&mut buf).unwrap(),
            Some(NodeResponse::Error { code: -5, .. })
        ));
        assert!(client.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_malformed_json() {
        let mut client = ClientCodec::new();
        let mut buf = BytesMut::from("not json\n");
        assert!(matches!(
            client.decode(&mut buf),
            Err(ProtocolError::Serialization(_))
        ));
    }
}
