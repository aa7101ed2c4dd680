//! Repository Traits
//!
//! One store trait per entity; `Repository` bundles them so handlers can hold
//! a single `Arc<dyn Repository>`.

use async_trait::async_trait;

use crate::models::{
    Account, AccountChanges, MaintenanceStatus, Mileage, NewAccount, NewMileage, NewPart,
    NewVehicle, Part, PartChanges, Vehicle, VehicleChanges,
};
use crate::StorageError;

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Fails with `StorageError::Conflict` when the email is taken
    async fn create_account(&self, account: NewAccount) -> Result<Account, StorageError>;
    async fn account_by_id(&self, id: i64) -> Result<Option<Account>, StorageError>;
    async fn account_by_email(&self, email: &str) -> Result<Option<Account>, StorageError>;
    async fn update_account(
        &self,
        id: i64,
        changes: AccountChanges,
    ) -> Result<Option<Account>, StorageError>;
    /// Removes the account together with its vehicles
    async fn delete_account(&self, id: i64) -> Result<Option<Account>, StorageError>;
    async fn mark_verified(&self, id: i64) -> Result<Option<Account>, StorageError>;
}

#[async_trait]
pub trait VehicleStore: Send + Sync {
    async fn create_vehicle(&self, vehicle: NewVehicle) -> Result<Vehicle, StorageError>;
    async fn vehicle_by_id(&self, id: i64) -> Result<Option<Vehicle>, StorageError>;
    async fn vehicles_by_owner(&self, owner_id: i64) -> Result<Vec<Vehicle>, StorageError>;
    async fn update_vehicle(
        &self,
        id: i64,
        changes: VehicleChanges,
    ) -> Result<Option<Vehicle>, StorageError>;
    /// Removes the vehicle together with its parts and mileages
    async fn delete_vehicle(&self, id: i64) -> Result<Option<Vehicle>, StorageError>;
    async fn set_vehicle_status(
        &self,
        id: i64,
        status: MaintenanceStatus,
    ) -> Result<Option<Vehicle>, StorageError>;
}

#[async_trait]
pub trait PartStore: Send + Sync {
    async fn create_part(&self, part: NewPart) -> Result<Part, StorageError>;
    async fn part_by_id(&self, id: i64) -> Result<Option<Part>, StorageError>;
    async fn parts_by_vehicle(&self, vehicle_id: i64) -> Result<Vec<Part>, StorageError>;
    async fn update_part(&self, id: i64, changes: PartChanges)
        -> Result<Option<Part>, StorageError>;
    async fn delete_part(&self, id: i64) -> Result<Option<Part>, StorageError>;
    async fn set_part_status(
        &self,
        id: i64,
        status: MaintenanceStatus,
    ) -> Result<Option<Part>, StorageError>;
    /// Marks the part maintained and restarts its lifetime at `install_mileage`
    async fn maintain_part(
        &self,
        id: i64,
        install_mileage: i64,
    ) -> Result<Option<Part>, StorageError>;
}

#[async_trait]
pub trait MileageStore: Send + Sync {
    async fn create_mileage(&self, mileage: NewMileage) -> Result<Mileage, StorageError>;
    async fn mileage_by_id(&self, id: i64) -> Result<Option<Mileage>, StorageError>;
    /// Newest date first
    async fn mileages_by_vehicle(&self, vehicle_id: i64) -> Result<Vec<Mileage>, StorageError>;
    async fn update_mileage(&self, id: i64, mileage: i64)
        -> Result<Option<Mileage>, StorageError>;
    async fn delete_mileage(&self, id: i64) -> Result<Option<Mileage>, StorageError>;
}

/// Full data access surface
#[async_trait]
pub trait Repository: AccountStore + VehicleStore + PartStore + MileageStore {
    /// Liveness check used by the health endpoint
    async fn ping(&self) -> Result<(), StorageError>;
}
