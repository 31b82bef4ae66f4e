//! `address_modified` notifications for downstream listeners.

use chrono::{DateTime, Utc};
use strum_macros::AsRefStr;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::debug;

use crate::model::Address;

/// Default capacity of the broadcast channel backing [`BroadcastPublisher`].
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum AddressChange {
    Created,
    Updated,
    Deleted,
}

/// Emitted after an address mutation has been committed. For
/// [`AddressChange::Deleted`] the snapshot refers to a row that no longer
/// exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressModified {
    pub change: AddressChange,
    pub address: Address,
    pub occurred_at: DateTime<Utc>,
}

impl AddressModified {
    pub fn new(change: AddressChange, address: Address) -> Self {
        Self {
            change,
            address,
            occurred_at: Utc::now(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PublishError {
    #[error("event channel unavailable: {0}")]
    Unavailable(String),
}

/// Outbound side of the address event channel.
pub trait AddressEventPublisher: Send + Sync {
    fn publish(&self, event: AddressModified) -> Result<(), PublishError>;
}

/// In-process fan-out over a tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct BroadcastPublisher {
    sender: broadcast::Sender<AddressModified>,
}

impl BroadcastPublisher {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AddressModified> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastPublisher {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl AddressEventPublisher for BroadcastPublisher {
    fn publish(&self, event: AddressModified) -> Result<(), PublishError> {
        // A send error only means nobody is listening right now.
        if let Err(broadcast::error::SendError(event)) = self.sender.send(event) {
            debug!(
                address_id = event.address.id,
                change = event.change.as_ref(),
                "address event dropped without subscribers"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CountryCode;

    fn address(id: i32) -> Address {
        Address {
            id,
            name: "Grace Hopper".into(),
            line_1: "1 Navy Way".into(),
            line_2: String::new(),
            city: "Arlington".into(),
            postcode: "22202".into(),
            country: CountryCode::parse("US").unwrap(),
        }
    }

    #[test]
    fn change_labels_are_snake_case() {
        assert_eq!(AddressChange::Created.as_ref(), "created");
        assert_eq!(AddressChange::Deleted.as_ref(), "deleted");
    }

    #[test]
    fn publishing_without_subscribers_is_not_an_error() {
        let publisher = BroadcastPublisher::default();
        assert_eq!(publisher.subscriber_count(), 0);
        publisher
            .publish(AddressModified::new(AddressChange::Created, address(1)))
            .expect("publish succeeds");
    }

    #[tokio::test]
    async fn subscribers_receive_each_event() {
        let publisher = BroadcastPublisher::new(8);
        let mut receiver = publisher.subscribe();

        publisher
            .publish(AddressModified::new(AddressChange::Updated, address(3)))
            .unwrap();
        publisher
            .publish(AddressModified::new(AddressChange::Deleted, address(3)))
            .unwrap();

        let first = receiver.recv().await.unwrap();
        assert_eq!(first.change, AddressChange::Updated);
        assert_eq!(first.address.id, 3);
        let second = receiver.recv().await.unwrap();
        assert_eq!(second.change, AddressChange::Deleted);
    }
}
