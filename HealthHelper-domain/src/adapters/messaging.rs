use std::collections::VecDeque;
use std::sync::Mutex;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::adapters::{MessagingAdapter, MessagingUnavailable};

/// Number of composed messages kept for inspection
const OUTBOX_CAPACITY: usize = 100;

/// A composed `smsto:` handoff
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboxEntry {
    pub phone_number: String,
    pub uri: String,
    pub body: String,
    pub composed_at: DateTime<Utc>,
}

/// Messaging handoff that composes `smsto:` intents.
///
/// Each handoff is logged and kept in a bounded outbox; nothing is
/// actually delivered.
#[derive(Debug, Default)]
pub struct SmsIntentAdapter {
    outbox: Mutex<VecDeque<OutboxEntry>>,
}

impl SmsIntentAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the `smsto:` URI for a phone number and body
    pub fn intent_uri(phone_number: &str, text: &str) -> String {
        let dial: String = phone_number
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '+')
            .collect();
        format!("smsto:{}?body={}", dial, urlencoding::encode(text))
    }

    /// Most recent handoffs, oldest first
    pub fn outbox(&self) -> Vec<OutboxEntry> {
        match self.outbox.lock() {
            Ok(outbox) => outbox.iter().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().iter().cloned().collect(),
        }
    }
}

#[async_trait]
impl MessagingAdapter for SmsIntentAdapter {
    async fn compose_message(&self, phone_number: &str, text: &str) -> Result<(), MessagingUnavailable> {
        if !phone_number.chars().any(|c| c.is_ascii_digit()) {
            warn!("No messaging handler for recipient {:?}", phone_number);
            return Err(MessagingUnavailable(format!("cannot address {:?}", phone_number)));
        }

        let entry = OutboxEntry {
            phone_number: phone_number.to_string(),
            uri: Self::intent_uri(phone_number, text),
            body: text.to_string(),
            composed_at: Utc::now(),
        };
        info!("Composed SMS handoff {}", entry.uri);

        let mut outbox = self
            .outbox
            .lock()
            .map_err(|_| MessagingUnavailable("outbox lock poisoned".to_string()))?;
        if outbox.len() >= OUTBOX_CAPACITY {
            outbox.pop_front();
        }
        outbox.push_back(entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_uri_encodes_body() {
        let uri = SmsIntentAdapter::intent_uri("+1 (555) 123-4567", "Help me\nMy location: x");
        assert_eq!(uri, "smsto:+15551234567?body=Help%20me%0AMy%20location%3A%20x");
    }

    #[tokio::test]
    async fn test_compose_records_outbox() {
        let adapter = SmsIntentAdapter::new();
        adapter.compose_message("911", "Help").await.unwrap();

        let outbox = adapter.outbox();
        assert_eq!(outbox.len(), 1);
        assert_eq!(outbox[0].uri, "smsto:911?body=Help");
    }

    #[tokio::test]
    async fn test_compose_fails_without_digits() {
        let adapter = SmsIntentAdapter::new();
        assert!(adapter.compose_message("() -", "Help").await.is_err());
        assert!(adapter.outbox().is_empty());
    }
}
