//! Domain event fan-out: always logged, also published to NATS when connected.

use crate::domain::events::DomainEvent;

#[derive(Clone, Default)]
pub struct EventPublisher {
    nats: Option<async_nats::Client>,
}

impl EventPublisher {
    pub fn new(nats: Option<async_nats::Client>) -> Self { Self { nats } }

    /// Log-only publisher.
    pub fn disabled() -> Self { Self::default() }

    pub async fn publish(&self, events: Vec<DomainEvent>) {
        for event in events {
            let subject = event.subject();
            tracing::info!(subject = %subject, event = ?event, "domain event");
            let Some(client) = &self.nats else { continue };
            let payload = match serde_json::to_vec(&event) {
                Ok(payload) => payload,
                Err(e) => { tracing::warn!(subject = %subject, error = %e, "event not serializable"); continue; }
            };
            if let Err(e) = client.publish(subject.clone(), payload.into()).await {
                tracing::warn!(subject = %subject, error = %e, "failed to publish event");
            }
        }
    }
}
