//! Object-created notifications
//!
//! The resize function is subscribed either directly to the images bucket or
//! to an SNS topic the bucket publishes to. In the SNS case every message
//! body is itself an S3 event.

use aws_lambda_events::event::s3::S3Event;
use aws_lambda_events::event::sns::SnsEvent;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::{Error, Result};

const SNS_EVENT_SOURCE: &str = "aws:sns";

/// Sent by S3 when a notification is first configured. Carries no records.
const S3_TEST_EVENT: &str = "s3:TestEvent";

/// Event delivered to the resize function
#[derive(Debug, Clone)]
pub enum ObjectCreatedTrigger {
    Sns(SnsEvent),
    S3(S3Event),
}

impl ObjectCreatedTrigger {
    /// Classify a raw invocation payload by the source of its first record
    pub fn from_value(event: Value) -> Result<Self> {
        if is_test_event(&event) {
            info!("Skipping S3 test event");
            return Ok(Self::S3(S3Event::default()));
        }

        let source = event
            .get("Records")
            .and_then(|records| records.get(0))
            .and_then(|record| record.get("EventSource"))
            .and_then(Value::as_str);

        if source == Some(SNS_EVENT_SOURCE) {
            Ok(Self::Sns(serde_json::from_value(event)?))
        } else {
            Ok(Self::S3(serde_json::from_value(event)?))
        }
    }

    /// Keys of the created objects, in delivery order
    pub fn object_keys(&self) -> Result<Vec<String>> {
        match self {
            Self::S3(event) => s3_keys(event),
            Self::Sns(event) => {
                let mut keys = Vec::new();
                for record in &event.records {
                    let message_id = &record.sns.message_id;
                    let message: Value = serde_json::from_str(&record.sns.message)?;

                    if is_test_event(&message) {
                        info!(message_id = %message_id, "Skipping S3 test event");
                        continue;
                    }

                    let inner: S3Event = serde_json::from_value(message)?;
                    info!(message_id = %message_id, records = inner.records.len(), "Unwrapped SNS message");
                    keys.extend(s3_keys(&inner)?);
                }
                Ok(keys)
            }
        }
    }
}

fn is_test_event(value: &Value) -> bool {
    value.get("Event").and_then(Value::as_str) == Some(S3_TEST_EVENT)
}

fn s3_keys(event: &S3Event) -> Result<Vec<String>> {
    event
        .records
        .iter()
        .map(|record| {
            record.s3.object.key.clone().ok_or_else(|| {
                warn!(event_name = ?record.event_name, "S3 record without object key");
                Error::Validation("S3 record has no object key".to_string())
            })
        })
        .collect()
}

impl<'de> Deserialize<'de> for ObjectCreatedTrigger {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(D::Error::custom)
    }
}
