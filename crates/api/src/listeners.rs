use shipping_domain::services::events::AddressModified;
use tokio::sync::broadcast::{error::RecvError, Receiver};
use tracing::{info, warn};

/// Logs every address event until the channel closes.
pub async fn log_address_events(mut receiver: Receiver<AddressModified>) {
    loop {
        match receiver.recv().await {
            Ok(event) => info!(
                address_id = event.address.id,
                change = event.change.as_ref(),
                country = %event.address.country,
                occurred_at = %event.occurred_at,
                "address modified"
            ),
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "address event listener lagged behind");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
