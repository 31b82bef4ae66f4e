use std::sync::Arc;

use shipping_domain::services::{events::AddressEventPublisher, telemetry::TelemetryGuard};
use shipping_storage::SeaOrmStorage;

use crate::access::AccessPolicy;

#[derive(Clone)]
pub struct AppState {
    storage: SeaOrmStorage,
    publisher: Arc<dyn AddressEventPublisher>,
    access_policy: AccessPolicy,
    default_site: String,
    telemetry: TelemetryGuard,
}

impl AppState {
    pub fn new(
        storage: SeaOrmStorage,
        publisher: Arc<dyn AddressEventPublisher>,
        access_policy: AccessPolicy,
        default_site: impl Into<String>,
        telemetry: TelemetryGuard,
    ) -> Self {
        Self {
            storage,
            publisher,
            access_policy,
            default_site: default_site.into(),
            telemetry,
        }
    }

    pub fn storage(&self) -> &SeaOrmStorage {
        &self.storage
    }

    pub fn publisher(&self) -> &dyn AddressEventPublisher {
        self.publisher.as_ref()
    }

    pub fn access_policy(&self) -> &AccessPolicy {
        &self.access_policy
    }

    /// Site whose configuration applies to hosts without their own.
    pub fn default_site(&self) -> &str {
        &self.default_site
    }

    pub fn telemetry(&self) -> &TelemetryGuard {
        &self.telemetry
    }
}
