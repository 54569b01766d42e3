use std::fmt;
use std::marker::PhantomData;

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder, LinesCodec};
use tracing::{debug, warn};

use crate::{ClientEvent, Envelope, Event, ProtocolError, ServerEvent};

// server reads client events and writes server events, client the reverse
pub type ServerCodec = EventCodec<ClientEvent, ServerEvent>;
pub type ClientCodec = EventCodec<ServerEvent, ClientEvent>;

/// Newline delimited JSON envelopes, decoding `In` and encoding `Out`.
///
/// Frames that fail to parse, or that name an event this side does not
/// understand, are logged and skipped. Only transport and framing errors are
/// surfaced, since those leave the stream in an unknown state.
pub struct EventCodec<In, Out> {
    lines: LinesCodec,
    _marker: PhantomData<fn(Out) -> In>,
}

impl<In, Out> EventCodec<In, Out> {
    pub fn new() -> Self {
        Self {
            lines: LinesCodec::new(),
            _marker: PhantomData,
        }
    }

    pub fn new_with_max_length(max_length: usize) -> Self {
        Self {
            lines: LinesCodec::new_with_max_length(max_length),
            _marker: PhantomData,
        }
    }
}

impl<In, Out> Default for EventCodec<In, Out> {
    fn default() -> Self {
        Self::new()
    }
}

impl<In, Out> Clone for EventCodec<In, Out> {
    fn clone(&self) -> Self {
        Self {
            lines: self.lines.clone(),
            _marker: PhantomData,
        }
    }
}

impl<In, Out> fmt::Debug for EventCodec<In, Out> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventCodec").field("lines", &self.lines).finish()
    }
}

impl<In: Event, Out> EventCodec<In, Out> {
    // parse a single line, None if it should be skipped
    fn parse(line: &str) -> Option<In> {
        if line.trim().is_empty() {
            return None;
        }

        let envelope: Envelope = match serde_json::from_str(line) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!("Dropping malformed frame: {}", e);
                return None;
            }
        };

        let name = envelope.event.clone();
        match In::from_envelope(envelope) {
            Ok(Some(event)) => Some(event),
            Ok(None) => {
                debug!("Ignoring unknown event {:?}", name);
                None
            }
            Err(e) => {
                warn!("Dropping {} frame with bad payload: {}", name, e);
                None
            }
        }
    }
}

impl<In: Event, Out> Decoder for EventCodec<In, Out> {
    type Item = In;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<In>, ProtocolError> {
        while let Some(line) = self.lines.decode(src)? {
            if let Some(event) = Self::parse(&line) {
                return Ok(Some(event));
            }
        }

        Ok(None)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<In>, ProtocolError> {
        while let Some(line) = self.lines.decode_eof(src)? {
            if let Some(event) = Self::parse(&line) {
                return Ok(Some(event));
            }
        }

        Ok(None)
    }
}

impl<In, Out: Event> Encoder<Out> for EventCodec<In, Out> {
    type Error = ProtocolError;

    fn encode(&mut self, item: Out, dst: &mut BytesMut) -> Result<(), ProtocolError> {
        let line = serde_json::to_string(&item.to_envelope()?)?;
        self.lines.encode(line, dst)?;
        Ok(())
    }
}
