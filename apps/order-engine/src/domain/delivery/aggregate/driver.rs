//! Driver aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::delivery::errors::DeliveryError;
use crate::domain::delivery::value_objects::DriverAvailability;
use crate::domain::shared::{DriverId, TenantId};

/// The Driver aggregate root.
///
/// A driver is bound to at most one active delivery at a time; the Busy
/// flag is flipped atomically with the delivery assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    id: DriverId,
    tenant_id: TenantId,
    availability: DriverAvailability,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: u64,
}

impl Driver {
    /// Register a new driver, initially free.
    #[must_use]
    pub fn new(tenant_id: TenantId) -> Self {
        let now = Utc::now();
        Self {
            id: DriverId::generate(),
            tenant_id,
            availability: DriverAvailability::Free,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// Claim the driver for a delivery.
    ///
    /// # Errors
    ///
    /// Returns error unless the driver is currently free.
    pub fn mark_busy(&mut self) -> Result<(), DeliveryError> {
        if self.availability != DriverAvailability::Free {
            return Err(DeliveryError::DriverUnavailable {
                driver_id: self.id.to_string(),
                availability: self.availability,
            });
        }
        self.availability = DriverAvailability::Busy;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Release the driver after the delivery ends.
    pub fn mark_free(&mut self) {
        self.availability = DriverAvailability::Free;
        self.updated_at = Utc::now();
    }

    /// Change availability directly (shift start/end).
    ///
    /// # Errors
    ///
    /// Returns error if the driver is busy; the active delivery must end
    /// first.
    pub fn set_availability(
        &mut self,
        availability: DriverAvailability,
    ) -> Result<(), DeliveryError> {
        if self.availability == DriverAvailability::Busy
            && availability != DriverAvailability::Busy
        {
            return Err(DeliveryError::DriverBusy {
                driver_id: self.id.to_string(),
            });
        }
        self.availability = availability;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Driver ID.
    #[must_use]
    pub const fn id(&self) -> &DriverId {
        &self.id
    }

    /// Owning tenant.
    #[must_use]
    pub const fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    /// Current availability.
    #[must_use]
    pub const fn availability(&self) -> DriverAvailability {
        self.availability
    }

    /// Creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Version counter used for conditional writes.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Set the version counter. Called by persistence adapters only.
    pub fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_driver_is_free() {
        let driver = Driver::new(TenantId::new("tenant-1"));
        assert_eq!(driver.availability(), DriverAvailability::Free);
    }

    #[test]
    fn mark_busy_requires_free() {
        let mut driver = Driver::new(TenantId::new("tenant-1"));
        driver.mark_busy().unwrap();
        assert_eq!(driver.availability(), DriverAvailability::Busy);

        let result = driver.mark_busy();
        assert!(matches!(result, Err(DeliveryError::DriverUnavailable { .. })));
    }

    #[test]
    fn busy_driver_cannot_go_offline() {
        let mut driver = Driver::new(TenantId::new("tenant-1"));
        driver.mark_busy().unwrap();
        assert!(driver.set_availability(DriverAvailability::Offline).is_err());

        driver.mark_free();
        assert!(driver.set_availability(DriverAvailability::Offline).is_ok());
    }

    #[test]
    fn offline_driver_cannot_be_claimed() {
        let mut driver = Driver::new(TenantId::new("tenant-1"));
        driver.set_availability(DriverAvailability::Offline).unwrap();
        assert!(driver.mark_busy().is_err());
    }
}
