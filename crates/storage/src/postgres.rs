//! Postgres Repository

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info};

use crate::models::{
    Account, AccountChanges, MaintenanceStatus, Mileage, NewAccount, NewMileage, NewPart,
    NewVehicle, Part, PartChanges, Vehicle, VehicleChanges,
};
use crate::repository::{AccountStore, MileageStore, PartStore, Repository, VehicleStore};
use crate::StorageError;

/// Repository backed by a Postgres connection pool
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    /// Connect to the database
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        info!("Connected to Postgres (max_connections={})", max_connections);
        Ok(Self { pool })
    }

    /// Apply embedded schema migrations
    pub async fn migrate(&self) -> Result<(), StorageError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }
}

#[async_trait]
impl AccountStore for PgRepository {
    async fn create_account(&self, account: NewAccount) -> Result<Account, StorageError> {
        let created = sqlx::query_as::<_, Account>(
            "INSERT INTO accounts (name, email, password_hash) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&account.name)
        .bind(&account.email)
        .bind(&account.password_hash)
        .fetch_one(&self.pool)
        .await?;
        debug!("Inserted account with ID {}", created.id);
        Ok(created)
    }

    async fn account_by_id(&self, id: i64) -> Result<Option<Account>, StorageError> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    async fn account_by_email(&self, email: &str) -> Result<Option<Account>, StorageError> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    async fn update_account(
        &self,
        id: i64,
        changes: AccountChanges,
    ) -> Result<Option<Account>, StorageError> {
        let account = sqlx::query_as::<_, Account>(
            "UPDATE accounts SET name = $1, email = $2, password_hash = $3, updated_at = NOW() \
             WHERE id = $4 RETURNING *",
        )
        .bind(&changes.name)
        .bind(&changes.email)
        .bind(&changes.password_hash)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }

    async fn delete_account(&self, id: i64) -> Result<Option<Account>, StorageError> {
        let account =
            sqlx::query_as::<_, Account>("DELETE FROM accounts WHERE id = $1 RETURNING *")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(account)
    }

    async fn mark_verified(&self, id: i64) -> Result<Option<Account>, StorageError> {
        let account = sqlx::query_as::<_, Account>(
            "UPDATE accounts SET is_verified = TRUE, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }
}

#[async_trait]
impl VehicleStore for PgRepository {
    async fn create_vehicle(&self, vehicle: NewVehicle) -> Result<Vehicle, StorageError> {
        let created = sqlx::query_as::<_, Vehicle>(
            "INSERT INTO vehicles (owner_id, name, brand, model, year, status) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(vehicle.owner_id)
        .bind(&vehicle.name)
        .bind(&vehicle.brand)
        .bind(&vehicle.model)
        .bind(vehicle.year)
        .bind(MaintenanceStatus::Good.as_str())
        .fetch_one(&self.pool)
        .await?;
        debug!("Inserted vehicle with ID {}", created.id);
        Ok(created)
    }

    async fn vehicle_by_id(&self, id: i64) -> Result<Option<Vehicle>, StorageError> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(vehicle)
    }

    async fn vehicles_by_owner(&self, owner_id: i64) -> Result<Vec<Vehicle>, StorageError> {
        let vehicles =
            sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE owner_id = $1 ORDER BY id")
                .bind(owner_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(vehicles)
    }

    async fn update_vehicle(
        &self,
        id: i64,
        changes: VehicleChanges,
    ) -> Result<Option<Vehicle>, StorageError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            "UPDATE vehicles SET name = $1, brand = $2, model = $3, year = $4, updated_at = NOW() \
             WHERE id = $5 RETURNING *",
        )
        .bind(&changes.name)
        .bind(&changes.brand)
        .bind(&changes.model)
        .bind(changes.year)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(vehicle)
    }

    async fn delete_vehicle(&self, id: i64) -> Result<Option<Vehicle>, StorageError> {
        let vehicle =
            sqlx::query_as::<_, Vehicle>("DELETE FROM vehicles WHERE id = $1 RETURNING *")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(vehicle)
    }

    async fn set_vehicle_status(
        &self,
        id: i64,
        status: MaintenanceStatus,
    ) -> Result<Option<Vehicle>, StorageError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            "UPDATE vehicles SET status = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
        )
        .bind(status.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(vehicle)
    }
}

#[async_trait]
impl PartStore for PgRepository {
    async fn create_part(&self, part: NewPart) -> Result<Part, StorageError> {
        let created = sqlx::query_as::<_, Part>(
            "INSERT INTO parts (vehicle_id, name, brand, model, year, install_mileage, \
             lifetime_mileage, status) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(part.vehicle_id)
        .bind(&part.name)
        .bind(&part.brand)
        .bind(&part.model)
        .bind(part.year)
        .bind(part.install_mileage)
        .bind(part.lifetime_mileage)
        .bind(MaintenanceStatus::Good.as_str())
        .fetch_one(&self.pool)
        .await?;
        debug!("Inserted part with ID {}", created.id);
        Ok(created)
    }

    async fn part_by_id(&self, id: i64) -> Result<Option<Part>, StorageError> {
        let part = sqlx::query_as::<_, Part>("SELECT * FROM parts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(part)
    }

    async fn parts_by_vehicle(&self, vehicle_id: i64) -> Result<Vec<Part>, StorageError> {
        let parts =
            sqlx::query_as::<_, Part>("SELECT * FROM parts WHERE vehicle_id = $1 ORDER BY id")
                .bind(vehicle_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(parts)
    }

    async fn update_part(
        &self,
        id: i64,
        changes: PartChanges,
    ) -> Result<Option<Part>, StorageError> {
        let part = sqlx::query_as::<_, Part>(
            "UPDATE parts SET name = $1, brand = $2, model = $3, year = $4, install_mileage = $5, \
             lifetime_mileage = $6, updated_at = NOW() WHERE id = $7 RETURNING *",
        )
        .bind(&changes.name)
        .bind(&changes.brand)
        .bind(&changes.model)
        .bind(changes.year)
        .bind(changes.install_mileage)
        .bind(changes.lifetime_mileage)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(part)
    }

    async fn delete_part(&self, id: i64) -> Result<Option<Part>, StorageError> {
        let part = sqlx::query_as::<_, Part>("DELETE FROM parts WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(part)
    }

    async fn set_part_status(
        &self,
        id: i64,
        status: MaintenanceStatus,
    ) -> Result<Option<Part>, StorageError> {
        let part = sqlx::query_as::<_, Part>(
            "UPDATE parts SET status = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
        )
        .bind(status.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(part)
    }

    async fn maintain_part(
        &self,
        id: i64,
        install_mileage: i64,
    ) -> Result<Option<Part>, StorageError> {
        let part = sqlx::query_as::<_, Part>(
            "UPDATE parts SET status = $1, install_mileage = $2, updated_at = NOW() \
             WHERE id = $3 RETURNING *",
        )
        .bind(MaintenanceStatus::Maintained.as_str())
        .bind(install_mileage)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(part)
    }
}

#[async_trait]
impl MileageStore for PgRepository {
    async fn create_mileage(&self, mileage: NewMileage) -> Result<Mileage, StorageError> {
        let created = sqlx::query_as::<_, Mileage>(
            "INSERT INTO mileages (vehicle_id, mileage, date) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(mileage.vehicle_id)
        .bind(mileage.mileage)
        .bind(mileage.date)
        .fetch_one(&self.pool)
        .await?;
        debug!("Inserted mileage with ID {}", created.id);
        Ok(created)
    }

    async fn mileage_by_id(&self, id: i64) -> Result<Option<Mileage>, StorageError> {
        let mileage = sqlx::query_as::<_, Mileage>("SELECT * FROM mileages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(mileage)
    }

    async fn mileages_by_vehicle(&self, vehicle_id: i64) -> Result<Vec<Mileage>, StorageError> {
        let mileages = sqlx::query_as::<_, Mileage>(
            "SELECT * FROM mileages WHERE vehicle_id = $1 ORDER BY date DESC, mileage DESC",
        )
        .bind(vehicle_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(mileages)
    }

    async fn update_mileage(
        &self,
        id: i64,
        mileage: i64,
    ) -> Result<Option<Mileage>, StorageError> {
        let updated = sqlx::query_as::<_, Mileage>(
            "UPDATE mileages SET mileage = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
        )
        .bind(mileage)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete_mileage(&self, id: i64) -> Result<Option<Mileage>, StorageError> {
        let deleted =
            sqlx::query_as::<_, Mileage>("DELETE FROM mileages WHERE id = $1 RETURNING *")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(deleted)
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
