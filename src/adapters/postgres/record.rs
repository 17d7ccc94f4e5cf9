//! Binary codec for persisted event records.
//!
//! Layout (all integers big-endian):
//!
//! header: `event_id:16B | aggregate_id:16B | version:u64 | kind:u8 |
//! occurred_at:i64` (nanoseconds since the Unix epoch)
//!
//! body, by kind:
//! - `UserRegistered`: `len:u16 | username`
//! - `PostPublished`: `author_id:16B | published_at:i64 | len:u16 | body`
//! - `PostRetracted`: empty
//! - `FollowStarted` / `FollowEnded`: `follower_id:16B | followee_id:16B`
//!
//! Variable-length strings are UTF-8 with a u16 length prefix. The record
//! is bit-exact: encoding the decoded envelope reproduces the input.

use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

use crate::domain::events::{
    DomainEvent, EventEnvelope, EventKind, FollowEnded, FollowStarted, PostPublished,
    PostRetracted, UserRegistered,
};
use crate::domain::value_objects::{EventId, PostBody, UserId, Username};

/// Record encoding / decoding failure.
#[derive(Debug)]
pub enum RecordError {
    /// The record ends before the expected field.
    Truncated,
    /// The kind discriminator is not a known event kind.
    UnknownKind(u8),
    /// A field failed validation while being reconstructed.
    Field(String),
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated => write!(f, "record truncated"),
            Self::UnknownKind(code) => write!(f, "unknown event kind code {}", code),
            Self::Field(msg) => write!(f, "invalid field: {}", msg),
        }
    }
}

impl std::error::Error for RecordError {}

fn put_uuid(out: &mut Vec<u8>, uuid: Uuid) {
    out.extend_from_slice(uuid.as_bytes());
}

fn put_timestamp(out: &mut Vec<u8>, at: DateTime<Utc>) -> Result<(), RecordError> {
    let nanos = at
        .timestamp_nanos_opt()
        .ok_or_else(|| RecordError::Field("timestamp out of range".into()))?;
    out.extend_from_slice(&nanos.to_be_bytes());
    Ok(())
}

fn put_string(out: &mut Vec<u8>, value: &str) {
    // Username and post body are both far below u16::MAX bytes.
    out.extend_from_slice(&(value.len() as u16).to_be_bytes());
    out.extend_from_slice(value.as_bytes());
}

/// Encode an envelope into its persisted record form.
pub fn encode(envelope: &EventEnvelope) -> Result<Vec<u8>, RecordError> {
    let mut out = Vec::with_capacity(64);

    put_uuid(&mut out, envelope.event_id.value());
    put_uuid(&mut out, envelope.aggregate_id);
    out.extend_from_slice(&envelope.version.to_be_bytes());
    out.push(envelope.kind().code());
    put_timestamp(&mut out, envelope.occurred_at)?;

    match &envelope.payload {
        DomainEvent::UserRegistered(e) => {
            put_string(&mut out, e.username.as_str());
        }
        DomainEvent::PostPublished(e) => {
            put_uuid(&mut out, e.author_id.value());
            put_timestamp(&mut out, e.published_at)?;
            put_string(&mut out, e.body.as_str());
        }
        DomainEvent::PostRetracted(_) => {}
        DomainEvent::FollowStarted(e) => {
            put_uuid(&mut out, e.follower_id.value());
            put_uuid(&mut out, e.followee_id.value());
        }
        DomainEvent::FollowEnded(e) => {
            put_uuid(&mut out, e.follower_id.value());
            put_uuid(&mut out, e.followee_id.value());
        }
    }

    Ok(out)
}

struct Reader<'a> {
    bytes: &'a [u8],
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], RecordError> {
        if self.bytes.len() < n {
            return Err(RecordError::Truncated);
        }
        let (head, rest) = self.bytes.split_at(n);
        self.bytes = rest;
        Ok(head)
    }

    fn uuid(&mut self) -> Result<Uuid, RecordError> {
        let bytes = self.take(16)?;
        let mut array = [0u8; 16];
        array.copy_from_slice(bytes);
        Ok(Uuid::from_bytes(array))
    }

    fn u8(&mut self) -> Result<u8, RecordError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, RecordError> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn u64(&mut self) -> Result<u64, RecordError> {
        let bytes = self.take(8)?;
        let mut array = [0u8; 8];
        array.copy_from_slice(bytes);
        Ok(u64::from_be_bytes(array))
    }

    fn timestamp(&mut self) -> Result<DateTime<Utc>, RecordError> {
        let bytes = self.take(8)?;
        let mut array = [0u8; 8];
        array.copy_from_slice(bytes);
        Ok(DateTime::from_timestamp_nanos(i64::from_be_bytes(array)))
    }

    fn string(&mut self) -> Result<&'a str, RecordError> {
        let len = self.u16()? as usize;
        let bytes = self.take(len)?;
        std::str::from_utf8(bytes).map_err(|_| RecordError::Field("invalid UTF-8".into()))
    }

    fn finished(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Decode a persisted record back into an envelope.
pub fn decode(bytes: &[u8]) -> Result<EventEnvelope, RecordError> {
    let mut reader = Reader { bytes };

    let event_id = EventId::from_uuid(reader.uuid()?);
    let aggregate_id = reader.uuid()?;
    let version = reader.u64()?;
    let kind_code = reader.u8()?;
    let occurred_at = reader.timestamp()?;

    let kind = EventKind::from_code(kind_code).ok_or(RecordError::UnknownKind(kind_code))?;

    let payload = match kind {
        EventKind::UserRegistered => {
            let username = Username::new(reader.string()?)
                .map_err(|e| RecordError::Field(format!("username: {:?}", e)))?;
            DomainEvent::UserRegistered(UserRegistered { username })
        }
        EventKind::PostPublished => {
            let author_id = UserId::from_uuid(reader.uuid()?);
            let published_at = reader.timestamp()?;
            let body = PostBody::new(reader.string()?)
                .map_err(|e| RecordError::Field(format!("body: {:?}", e)))?;
            DomainEvent::PostPublished(PostPublished {
                author_id,
                body,
                published_at,
            })
        }
        EventKind::PostRetracted => DomainEvent::PostRetracted(PostRetracted {}),
        EventKind::FollowStarted => DomainEvent::FollowStarted(FollowStarted {
            follower_id: UserId::from_uuid(reader.uuid()?),
            followee_id: UserId::from_uuid(reader.uuid()?),
        }),
        EventKind::FollowEnded => DomainEvent::FollowEnded(FollowEnded {
            follower_id: UserId::from_uuid(reader.uuid()?),
            followee_id: UserId::from_uuid(reader.uuid()?),
        }),
    };

    if !reader.finished() {
        return Err(RecordError::Field("trailing bytes".into()));
    }

    Ok(EventEnvelope {
        event_id,
        aggregate_id,
        version,
        occurred_at,
        payload,
    })
}
