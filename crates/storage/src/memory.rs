//! In-memory Repository

use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::models::{
    Account, AccountChanges, MaintenanceStatus, Mileage, NewAccount, NewMileage, NewPart,
    NewVehicle, Part, PartChanges, Vehicle, VehicleChanges,
};
use crate::repository::{AccountStore, MileageStore, PartStore, Repository, VehicleStore};
use crate::StorageError;

#[derive(Default)]
struct Tables {
    accounts: Vec<Account>,
    vehicles: Vec<Vehicle>,
    parts: Vec<Part>,
    mileages: Vec<Mileage>,
    next_id: i64,
}

impl Tables {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn remove_vehicle_children(&mut self, vehicle_id: i64) {
        self.parts.retain(|p| p.vehicle_id != vehicle_id);
        self.mileages.retain(|m| m.vehicle_id != vehicle_id);
    }
}

/// Repository keeping every table in a single mutex.
///
/// Mirrors the Postgres schema constraints that matter to callers: unique
/// account emails, one mileage per vehicle and date, and cascading deletes.
pub struct MemoryRepository {
    tables: Mutex<Tables>,
}

impl MemoryRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        info!("Creating in-memory repository");
        Self {
            tables: Mutex::new(Tables::default()),
        }
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, StorageError> {
        self.tables
            .lock()
            .map_err(|e| StorageError::DatabaseError(format!("Lock error: {}", e)))
    }

    /// Total number of stored accounts
    pub fn account_count(&self) -> usize {
        self.tables.lock().map(|t| t.accounts.len()).unwrap_or(0)
    }
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountStore for MemoryRepository {
    async fn create_account(&self, account: NewAccount) -> Result<Account, StorageError> {
        let mut tables = self.tables()?;
        if tables.accounts.iter().any(|a| a.email == account.email) {
            return Err(StorageError::Conflict(format!(
                "email {} already registered",
                account.email
            )));
        }

        let now = Utc::now();
        let record = Account {
            id: tables.allocate_id(),
            name: account.name,
            email: account.email,
            password_hash: account.password_hash,
            is_verified: false,
            created_at: now,
            updated_at: now,
        };
        tables.accounts.push(record.clone());
        debug!("Inserted account with ID {}", record.id);
        Ok(record)
    }

    async fn account_by_id(&self, id: i64) -> Result<Option<Account>, StorageError> {
        let tables = self.tables()?;
        Ok(tables.accounts.iter().find(|a| a.id == id).cloned())
    }

    async fn account_by_email(&self, email: &str) -> Result<Option<Account>, StorageError> {
        let tables = self.tables()?;
        Ok(tables.accounts.iter().find(|a| a.email == email).cloned())
    }

    async fn update_account(
        &self,
        id: i64,
        changes: AccountChanges,
    ) -> Result<Option<Account>, StorageError> {
        let mut tables = self.tables()?;
        if tables
            .accounts
            .iter()
            .any(|a| a.id != id && a.email == changes.email)
        {
            return Err(StorageError::Conflict(format!(
                "email {} already registered",
                changes.email
            )));
        }

        let Some(account) = tables.accounts.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        account.name = changes.name;
        account.email = changes.email;
        account.password_hash = changes.password_hash;
        account.updated_at = Utc::now();
        Ok(Some(account.clone()))
    }

    async fn delete_account(&self, id: i64) -> Result<Option<Account>, StorageError> {
        let mut tables = self.tables()?;
        let Some(index) = tables.accounts.iter().position(|a| a.id == id) else {
            return Ok(None);
        };
        let removed = tables.accounts.remove(index);

        let owned: Vec<i64> = tables
            .vehicles
            .iter()
            .filter(|v| v.owner_id == id)
            .map(|v| v.id)
            .collect();
        tables.vehicles.retain(|v| v.owner_id != id);
        for vehicle_id in owned {
            tables.remove_vehicle_children(vehicle_id);
        }
        Ok(Some(removed))
    }

    async fn mark_verified(&self, id: i64) -> Result<Option<Account>, StorageError> {
        let mut tables = self.tables()?;
        let Some(account) = tables.accounts.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        account.is_verified = true;
        account.updated_at = Utc::now();
        Ok(Some(account.clone()))
    }
}

#[async_trait]
impl VehicleStore for MemoryRepository {
    async fn create_vehicle(&self, vehicle: NewVehicle) -> Result<Vehicle, StorageError> {
        let mut tables = self.tables()?;
        if !tables.accounts.iter().any(|a| a.id == vehicle.owner_id) {
            return Err(StorageError::DatabaseError(format!(
                "owner {} does not exist",
                vehicle.owner_id
            )));
        }

        let now = Utc::now();
        let record = Vehicle {
            id: tables.allocate_id(),
            owner_id: vehicle.owner_id,
            name: vehicle.name,
            brand: vehicle.brand,
            model: vehicle.model,
            year: vehicle.year,
            status: MaintenanceStatus::Good,
            created_at: now,
            updated_at: now,
        };
        tables.vehicles.push(record.clone());
        debug!("Inserted vehicle with ID {}", record.id);
        Ok(record)
    }

    async fn vehicle_by_id(&self, id: i64) -> Result<Option<Vehicle>, StorageError> {
        let tables = self.tables()?;
        Ok(tables.vehicles.iter().find(|v| v.id == id).cloned())
    }

    async fn vehicles_by_owner(&self, owner_id: i64) -> Result<Vec<Vehicle>, StorageError> {
        let tables = self.tables()?;
        Ok(tables
            .vehicles
            .iter()
            .filter(|v| v.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn update_vehicle(
        &self,
        id: i64,
        changes: VehicleChanges,
    ) -> Result<Option<Vehicle>, StorageError> {
        let mut tables = self.tables()?;
        let Some(vehicle) = tables.vehicles.iter_mut().find(|v| v.id == id) else {
            return Ok(None);
        };
        vehicle.name = changes.name;
        vehicle.brand = changes.brand;
        vehicle.model = changes.model;
        vehicle.year = changes.year;
        vehicle.updated_at = Utc::now();
        Ok(Some(vehicle.clone()))
    }

    async fn delete_vehicle(&self, id: i64) -> Result<Option<Vehicle>, StorageError> {
        let mut tables = self.tables()?;
        let Some(index) = tables.vehicles.iter().position(|v| v.id == id) else {
            return Ok(None);
        };
        let removed = tables.vehicles.remove(index);
        tables.remove_vehicle_children(id);
        Ok(Some(removed))
    }

    async fn set_vehicle_status(
        &self,
        id: i64,
        status: MaintenanceStatus,
    ) -> Result<Option<Vehicle>, StorageError> {
        let mut tables = self.tables()?;
        let Some(vehicle) = tables.vehicles.iter_mut().find(|v| v.id == id) else {
            return Ok(None);
        };
        vehicle.status = status;
        vehicle.updated_at = Utc::now();
        Ok(Some(vehicle.clone()))
    }
}

#[async_trait]
impl PartStore for MemoryRepository {
    async fn create_part(&self, part: NewPart) -> Result<Part, StorageError> {
        let mut tables = self.tables()?;
        if !tables.vehicles.iter().any(|v| v.id == part.vehicle_id) {
            return Err(StorageError::DatabaseError(format!(
                "vehicle {} does not exist",
                part.vehicle_id
            )));
        }

        let now = Utc::now();
        let record = Part {
            id: tables.allocate_id(),
            vehicle_id: part.vehicle_id,
            name: part.name,
            brand: part.brand,
            model: part.model,
            year: part.year,
            install_mileage: part.install_mileage,
            lifetime_mileage: part.lifetime_mileage,
            status: MaintenanceStatus::Good,
            created_at: now,
            updated_at: now,
        };
        tables.parts.push(record.clone());
        debug!("Inserted part with ID {}", record.id);
        Ok(record)
    }

    async fn part_by_id(&self, id: i64) -> Result<Option<Part>, StorageError> {
        let tables = self.tables()?;
        Ok(tables.parts.iter().find(|p| p.id == id).cloned())
    }

    async fn parts_by_vehicle(&self, vehicle_id: i64) -> Result<Vec<Part>, StorageError> {
        let tables = self.tables()?;
        Ok(tables
            .parts
            .iter()
            .filter(|p| p.vehicle_id == vehicle_id)
            .cloned()
            .collect())
    }

    async fn update_part(
        &self,
        id: i64,
        changes: PartChanges,
    ) -> Result<Option<Part>, StorageError> {
        let mut tables = self.tables()?;
        let Some(part) = tables.parts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        part.name = changes.name;
        part.brand = changes.brand;
        part.model = changes.model;
        part.year = changes.year;
        part.install_mileage = changes.install_mileage;
        part.lifetime_mileage = changes.lifetime_mileage;
        part.updated_at = Utc::now();
        Ok(Some(part.clone()))
    }

    async fn delete_part(&self, id: i64) -> Result<Option<Part>, StorageError> {
        let mut tables = self.tables()?;
        let Some(index) = tables.parts.iter().position(|p| p.id == id) else {
            return Ok(None);
        };
        Ok(Some(tables.parts.remove(index)))
    }

    async fn set_part_status(
        &self,
        id: i64,
        status: MaintenanceStatus,
    ) -> Result<Option<Part>, StorageError> {
        let mut tables = self.tables()?;
        let Some(part) = tables.parts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        part.status = status;
        part.updated_at = Utc::now();
        Ok(Some(part.clone()))
    }

    async fn maintain_part(
        &self,
        id: i64,
        install_mileage: i64,
    ) -> Result<Option<Part>, StorageError> {
        let mut tables = self.tables()?;
        let Some(part) = tables.parts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        part.status = MaintenanceStatus::Maintained;
        part.install_mileage = install_mileage;
        part.updated_at = Utc::now();
        Ok(Some(part.clone()))
    }
}

#[async_trait]
impl MileageStore for MemoryRepository {
    async fn create_mileage(&self, mileage: NewMileage) -> Result<Mileage, StorageError> {
        let mut tables = self.tables()?;
        if !tables.vehicles.iter().any(|v| v.id == mileage.vehicle_id) {
            return Err(StorageError::DatabaseError(format!(
                "vehicle {} does not exist",
                mileage.vehicle_id
            )));
        }
        if tables
            .mileages
            .iter()
            .any(|m| m.vehicle_id == mileage.vehicle_id && m.date == mileage.date)
        {
            return Err(StorageError::Conflict(format!(
                "mileage for {} already stored",
                mileage.date
            )));
        }

        let now = Utc::now();
        let record = Mileage {
            id: tables.allocate_id(),
            vehicle_id: mileage.vehicle_id,
            mileage: mileage.mileage,
            date: mileage.date,
            created_at: now,
            updated_at: now,
        };
        tables.mileages.push(record.clone());
        debug!("Inserted mileage with ID {}", record.id);
        Ok(record)
    }

    async fn mileage_by_id(&self, id: i64) -> Result<Option<Mileage>, StorageError> {
        let tables = self.tables()?;
        Ok(tables.mileages.iter().find(|m| m.id == id).cloned())
    }

    async fn mileages_by_vehicle(&self, vehicle_id: i64) -> Result<Vec<Mileage>, StorageError> {
        let tables = self.tables()?;
        let mut readings: Vec<Mileage> = tables
            .mileages
            .iter()
            .filter(|m| m.vehicle_id == vehicle_id)
            .cloned()
            .collect();
        readings.sort_by(|a, b| b.date.cmp(&a.date).then(b.mileage.cmp(&a.mileage)));
        Ok(readings)
    }

    async fn update_mileage(
        &self,
        id: i64,
        mileage: i64,
    ) -> Result<Option<Mileage>, StorageError> {
        let mut tables = self.tables()?;
        let Some(reading) = tables.mileages.iter_mut().find(|m| m.id == id) else {
            return Ok(None);
        };
        reading.mileage = mileage;
        reading.updated_at = Utc::now();
        Ok(Some(reading.clone()))
    }

    async fn delete_mileage(&self, id: i64) -> Result<Option<Mileage>, StorageError> {
        let mut tables = self.tables()?;
        let Some(index) = tables.mileages.iter().position(|m| m.id == id) else {
            return Ok(None);
        };
        Ok(Some(tables.mileages.remove(index)))
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn ping(&self) -> Result<(), StorageError> {
        self.tables().map(|_| ())
    }
}
