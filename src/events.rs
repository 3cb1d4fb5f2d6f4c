use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Events emitted by the service layer after successful mutations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    OrderStatusChanged {
        order_id: Uuid,
        old_status: String,
        new_status: String,
    },
    DeliveryAssigned {
        order_id: Uuid,
        delivery_person_id: Uuid,
        accrued: Decimal,
    },
    LedgerEntryRecorded {
        entry_id: Uuid,
        direction: String,
        amount: Decimal,
    },
    ExchangeRequested {
        exchange_id: Uuid,
        order_id: Uuid,
    },
    ExchangeStatusChanged {
        exchange_id: Uuid,
        new_status: String,
    },
    VariantsCreated {
        product_id: Uuid,
        count: usize,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Drains the event channel and logs every event. Runs until all senders drop.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::DeliveryAssigned {
                order_id,
                delivery_person_id,
                accrued,
            } => {
                info!(%order_id, %delivery_person_id, %accrued, "delivery assigned");
            }
            Event::OrderStatusChanged {
                order_id,
                old_status,
                new_status,
            } => {
                info!(%order_id, %old_status, %new_status, "order status changed");
            }
            other => info!(event = ?other, "event processed"),
        }
    }
    warn!("event channel closed; processor exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn send_fails_once_receiver_is_dropped() {
        let (tx, rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);
        drop(rx);

        let result = sender
            .send(Event::LedgerEntryRecorded {
                entry_id: Uuid::new_v4(),
                direction: "inbound".into(),
                amount: dec!(10),
            })
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn events_round_trip_through_channel() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);
        let order_id = Uuid::new_v4();

        sender
            .send(Event::ExchangeRequested {
                exchange_id: Uuid::new_v4(),
                order_id,
            })
            .await
            .unwrap();

        match rx.recv().await.unwrap() {
            Event::ExchangeRequested { order_id: got, .. } => assert_eq!(got, order_id),
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
