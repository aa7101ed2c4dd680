//! Status Checker
//!
//! Re-assesses parts after writes that can move them across their wear
//! threshold, persists changed statuses, and emails the owner when a part
//! becomes due or overdue.

use mailer::templates::{
    maintenance_due_email, maintenance_overdue_email, MaintenanceNotice, PartSummary,
    VehicleSummary,
};
use mailer::Mailer;
use serde::Serialize;
use std::sync::Arc;
use storage::{Account, MaintenanceStatus, Mileage, Part, Repository, Vehicle};
use tracing::{debug, error, info, warn};

use crate::assess::{assess_part, vehicle_status};
use crate::predict::{current_mileage, MileageTrend};
use crate::{MaintenanceConfig, MaintenanceError};

/// A part whose stored status changed during a check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartTransition {
    pub part_id: i64,
    pub from: MaintenanceStatus,
    pub to: MaintenanceStatus,
}

/// Outcome of a status check
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub vehicle_id: i64,
    pub vehicle_status: MaintenanceStatus,
    pub transitions: Vec<PartTransition>,
    pub notifications_sent: usize,
    pub notifications_failed: usize,
}

impl StatusReport {
    fn new(vehicle_id: i64) -> Self {
        Self {
            vehicle_id,
            vehicle_status: MaintenanceStatus::Good,
            transitions: Vec::new(),
            notifications_sent: 0,
            notifications_failed: 0,
        }
    }
}

/// Mileage outlook for a vehicle
#[derive(Debug, Clone, Serialize)]
pub struct MileageForecast {
    pub vehicle_id: i64,
    pub days: u32,
    pub current_mileage: Option<i64>,
    pub predicted_mileage: Option<i64>,
    pub daily_rate: Option<f64>,
}

/// Mileage figures shared by every part of one vehicle
struct Odometer {
    current: Option<i64>,
    predicted: Option<i64>,
}

/// Assesses parts and keeps stored statuses current
pub struct StatusChecker {
    repo: Arc<dyn Repository>,
    mailer: Arc<dyn Mailer>,
    config: MaintenanceConfig,
}

impl StatusChecker {
    /// Create a new status checker
    pub fn new(
        repo: Arc<dyn Repository>,
        mailer: Arc<dyn Mailer>,
        config: MaintenanceConfig,
    ) -> Self {
        info!("Creating status checker with config: {:?}", config);
        Self {
            repo,
            mailer,
            config,
        }
    }

    pub fn config(&self) -> &MaintenanceConfig {
        &self.config
    }

    /// Assess one part, then refresh its vehicle's status
    pub async fn check_part(&self, part_id: i64) -> Result<StatusReport, MaintenanceError> {
        let part = self
            .repo
            .part_by_id(part_id)
            .await?
            .ok_or(MaintenanceError::PartNotFound(part_id))?;
        let vehicle = self.vehicle(part.vehicle_id).await?;
        let odometer = self.odometer(vehicle.id).await?;

        let mut report = StatusReport::new(vehicle.id);
        let mut owner = None;
        self.assess(&vehicle, part, &odometer, &mut owner, &mut report)
            .await?;
        report.vehicle_status = self.refresh(&vehicle).await?;
        Ok(report)
    }

    /// Assess every part of a vehicle, then refresh the vehicle's status
    pub async fn check_vehicle(&self, vehicle_id: i64) -> Result<StatusReport, MaintenanceError> {
        let vehicle = self.vehicle(vehicle_id).await?;
        let odometer = self.odometer(vehicle.id).await?;
        let parts = self.repo.parts_by_vehicle(vehicle.id).await?;
        debug!("Checking {} parts of vehicle {}", parts.len(), vehicle.id);

        let mut report = StatusReport::new(vehicle.id);
        let mut owner = None;
        for part in parts {
            self.assess(&vehicle, part, &odometer, &mut owner, &mut report)
                .await?;
        }
        report.vehicle_status = self.refresh(&vehicle).await?;

        info!(
            "Vehicle {} checked: {} ({} transitions, {} reminders sent, {} failed)",
            vehicle.id,
            report.vehicle_status,
            report.transitions.len(),
            report.notifications_sent,
            report.notifications_failed
        );
        Ok(report)
    }

    /// Recompute the vehicle status from stored part statuses
    pub async fn refresh_vehicle_status(
        &self,
        vehicle_id: i64,
    ) -> Result<MaintenanceStatus, MaintenanceError> {
        let vehicle = self.vehicle(vehicle_id).await?;
        self.refresh(&vehicle).await
    }

    /// Mark a part maintained, restarting its lifetime at the vehicle's
    /// current mileage. Without readings the install mileage is kept.
    pub async fn maintain_part(&self, part_id: i64) -> Result<Part, MaintenanceError> {
        let part = self
            .repo
            .part_by_id(part_id)
            .await?
            .ok_or(MaintenanceError::PartNotFound(part_id))?;
        let readings = self.repo.mileages_by_vehicle(part.vehicle_id).await?;
        let install_mileage = current_mileage(&readings).unwrap_or(part.install_mileage);

        let maintained = self
            .repo
            .maintain_part(part.id, install_mileage)
            .await?
            .ok_or(MaintenanceError::PartNotFound(part_id))?;
        info!(
            "Part {} maintained at {} km",
            maintained.id, maintained.install_mileage
        );

        self.refresh_vehicle_status(maintained.vehicle_id).await?;
        Ok(maintained)
    }

    /// Current and predicted mileage `days` ahead
    pub async fn forecast(
        &self,
        vehicle_id: i64,
        days: u32,
    ) -> Result<MileageForecast, MaintenanceError> {
        let vehicle = self.vehicle(vehicle_id).await?;
        let readings = self.repo.mileages_by_vehicle(vehicle.id).await?;
        let current = current_mileage(&readings);
        let trend = MileageTrend::from_readings(&readings);

        Ok(MileageForecast {
            vehicle_id: vehicle.id,
            days,
            current_mileage: current,
            predicted_mileage: trend.map(|t| t.project(days)).or(current),
            daily_rate: trend.map(|t| t.daily_rate),
        })
    }

    async fn vehicle(&self, vehicle_id: i64) -> Result<Vehicle, MaintenanceError> {
        self.repo
            .vehicle_by_id(vehicle_id)
            .await?
            .ok_or(MaintenanceError::VehicleNotFound(vehicle_id))
    }

    async fn odometer(&self, vehicle_id: i64) -> Result<Odometer, MaintenanceError> {
        let readings: Vec<Mileage> = self.repo.mileages_by_vehicle(vehicle_id).await?;
        let current = current_mileage(&readings);
        let predicted = MileageTrend::from_readings(&readings)
            .map(|trend| trend.project(self.config.horizon_days));
        Ok(Odometer { current, predicted })
    }

    async fn assess(
        &self,
        vehicle: &Vehicle,
        part: Part,
        odometer: &Odometer,
        owner: &mut Option<Account>,
        report: &mut StatusReport,
    ) -> Result<(), MaintenanceError> {
        let status = assess_part(&part, odometer.current, odometer.predicted);
        if status == part.status {
            return Ok(());
        }

        self.repo.set_part_status(part.id, status).await?;
        info!("Part {} status {} -> {}", part.id, part.status, status);
        metrics::counter!("servilog_status_transitions_total", "to" => status.as_str())
            .increment(1);
        report.transitions.push(PartTransition {
            part_id: part.id,
            from: part.status,
            to: status,
        });

        if status.needs_attention() {
            if owner.is_none() {
                *owner = self.repo.account_by_id(vehicle.owner_id).await?;
            }
            match owner.as_ref() {
                Some(account) => {
                    let current = odometer.current.unwrap_or_default();
                    if self.notify(account, vehicle, &part, status, current).await {
                        report.notifications_sent += 1;
                    } else {
                        report.notifications_failed += 1;
                    }
                }
                None => {
                    warn!(
                        "Vehicle {} has no owner account; reminder for part {} dropped",
                        vehicle.id, part.id
                    );
                    report.notifications_failed += 1;
                }
            }
        }
        Ok(())
    }

    async fn notify(
        &self,
        account: &Account,
        vehicle: &Vehicle,
        part: &Part,
        status: MaintenanceStatus,
        current_mileage: i64,
    ) -> bool {
        let notice = MaintenanceNotice {
            to: account.email.clone(),
            account_name: account.name.clone(),
            vehicle: VehicleSummary {
                name: vehicle.name.clone(),
                brand: vehicle.brand.clone(),
                model: vehicle.model.clone(),
            },
            part: PartSummary {
                name: part.name.clone(),
                brand: part.brand.clone(),
                model: part.model.clone(),
                install_mileage: part.install_mileage,
                lifetime_mileage: part.lifetime_mileage,
            },
            current_mileage,
        };
        let email = match status {
            MaintenanceStatus::MaintenanceOverdue => maintenance_overdue_email(&notice),
            _ => maintenance_due_email(&notice, self.config.horizon_days),
        };

        match self.mailer.send(email).await {
            Ok(()) => {
                metrics::counter!("servilog_reminders_total", "outcome" => "sent").increment(1);
                true
            }
            Err(e) => {
                error!("Reminder for part {} to {} failed: {}", part.id, account.email, e);
                metrics::counter!("servilog_reminders_total", "outcome" => "failed").increment(1);
                false
            }
        }
    }

    async fn refresh(&self, vehicle: &Vehicle) -> Result<MaintenanceStatus, MaintenanceError> {
        let parts = self.repo.parts_by_vehicle(vehicle.id).await?;
        let status = vehicle_status(parts.iter().map(|p| p.status));
        if status != vehicle.status {
            self.repo.set_vehicle_status(vehicle.id, status).await?;
            info!("Vehicle {} status {} -> {}", vehicle.id, vehicle.status, status);
        }
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mailer::{Email, LogMailer, MailError};
    use storage::{
        AccountStore, MemoryRepository, MileageStore, NewAccount, NewMileage, NewPart, NewVehicle,
        PartStore, VehicleStore,
    };

    struct FailingMailer;

    #[async_trait]
    impl Mailer for FailingMailer {
        async fn send(&self, _email: Email) -> Result<(), MailError> {
            Err(MailError::Delivery("relay unavailable".to_string()))
        }
    }

    struct Fixture {
        repo: Arc<MemoryRepository>,
        vehicle_id: i64,
    }

    impl Fixture {
        async fn new() -> Self {
            let repo = Arc::new(MemoryRepository::new());
            let account = repo
                .create_account(NewAccount {
                    name: "Rina".to_string(),
                    email: "rina@example.com".to_string(),
                    password_hash: "hash".to_string(),
                })
                .await
                .unwrap();
            let vehicle = repo
                .create_vehicle(NewVehicle {
                    owner_id: account.id,
                    name: "Daily".to_string(),
                    brand: "Honda".to_string(),
                    model: "Vario 125".to_string(),
                    year: Some(2021),
                })
                .await
                .unwrap();
            Self {
                repo,
                vehicle_id: vehicle.id,
            }
        }

        async fn part(&self, install: i64, lifetime: i64) -> Part {
            self.repo
                .create_part(NewPart {
                    vehicle_id: self.vehicle_id,
                    name: "Engine oil".to_string(),
                    brand: "AHM".to_string(),
                    model: "MPX2".to_string(),
                    year: None,
                    install_mileage: install,
                    lifetime_mileage: lifetime,
                })
                .await
                .unwrap()
        }

        async fn reading(&self, date: &str, mileage: i64) {
            self.repo
                .create_mileage(NewMileage {
                    vehicle_id: self.vehicle_id,
                    mileage,
                    date: date.parse().unwrap(),
                })
                .await
                .unwrap();
        }

        fn checker(&self, mailer: Arc<dyn Mailer>) -> StatusChecker {
            StatusChecker::new(self.repo.clone(), mailer, MaintenanceConfig::default())
        }
    }

    #[tokio::test]
    async fn test_overdue_part_sends_urgent_reminder() {
        let fx = Fixture::new().await;
        let part = fx.part(0, 10_000).await;
        fx.reading("2024-01-01", 1_000).await;
        fx.reading("2024-01-11", 11_000).await;

        let mailer = Arc::new(LogMailer::new());
        let report = fx.checker(mailer.clone()).check_part(part.id).await.unwrap();

        assert_eq!(report.vehicle_status, MaintenanceStatus::MaintenanceOverdue);
        assert_eq!(
            report.transitions,
            vec![PartTransition {
                part_id: part.id,
                from: MaintenanceStatus::Good,
                to: MaintenanceStatus::MaintenanceOverdue,
            }]
        );
        assert_eq!(report.notifications_sent, 1);

        let sent = mailer.sent();
        assert_eq!(sent[0].to, "rina@example.com");
        assert!(sent[0].subject.starts_with("Urgent"));

        let stored = fx.repo.part_by_id(part.id).await.unwrap().unwrap();
        assert_eq!(stored.status, MaintenanceStatus::MaintenanceOverdue);
        let vehicle = fx.repo.vehicle_by_id(fx.vehicle_id).await.unwrap().unwrap();
        assert_eq!(vehicle.status, MaintenanceStatus::MaintenanceOverdue);
    }

    #[tokio::test]
    async fn test_predicted_wear_marks_due() {
        let fx = Fixture::new().await;
        fx.part(0, 2_500).await;
        fx.part(0, 50_000).await;
        // 100 km/day, 2700 km expected a week after the last reading
        fx.reading("2024-01-01", 1_000).await;
        fx.reading("2024-01-11", 2_000).await;

        let mailer = Arc::new(LogMailer::new());
        let report = fx
            .checker(mailer.clone())
            .check_vehicle(fx.vehicle_id)
            .await
            .unwrap();

        assert_eq!(report.vehicle_status, MaintenanceStatus::MaintenanceDue);
        assert_eq!(report.transitions.len(), 1);
        assert_eq!(mailer.sent_count(), 1);
        assert!(mailer.sent()[0].text.contains("within 7 days"));
    }

    #[tokio::test]
    async fn test_reminder_only_on_transition() {
        let fx = Fixture::new().await;
        fx.part(0, 1_500).await;
        fx.reading("2024-01-01", 1_000).await;
        fx.reading("2024-01-02", 2_000).await;

        let mailer = Arc::new(LogMailer::new());
        let checker = fx.checker(mailer.clone());
        checker.check_vehicle(fx.vehicle_id).await.unwrap();
        let second = checker.check_vehicle(fx.vehicle_id).await.unwrap();

        assert!(second.transitions.is_empty());
        assert_eq!(second.notifications_sent, 0);
        assert_eq!(mailer.sent_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_reminder_does_not_fail_check() {
        let fx = Fixture::new().await;
        let part = fx.part(0, 500).await;
        fx.reading("2024-01-01", 800).await;

        let report = fx
            .checker(Arc::new(FailingMailer))
            .check_part(part.id)
            .await
            .unwrap();

        assert_eq!(report.notifications_sent, 0);
        assert_eq!(report.notifications_failed, 1);
        let stored = fx.repo.part_by_id(part.id).await.unwrap().unwrap();
        assert_eq!(stored.status, MaintenanceStatus::MaintenanceOverdue);
    }

    #[tokio::test]
    async fn test_maintain_resets_install_mileage() {
        let fx = Fixture::new().await;
        let part = fx.part(0, 5_000).await;
        fx.reading("2024-01-01", 4_000).await;
        fx.reading("2024-01-31", 6_000).await;

        let mailer = Arc::new(LogMailer::new());
        let checker = fx.checker(mailer.clone());
        checker.check_vehicle(fx.vehicle_id).await.unwrap();

        let maintained = checker.maintain_part(part.id).await.unwrap();
        assert_eq!(maintained.status, MaintenanceStatus::Maintained);
        assert_eq!(maintained.install_mileage, 6_000);

        let vehicle = fx.repo.vehicle_by_id(fx.vehicle_id).await.unwrap().unwrap();
        assert_eq!(vehicle.status, MaintenanceStatus::Good);

        // still far from the new threshold
        let report = checker.check_vehicle(fx.vehicle_id).await.unwrap();
        assert!(report.transitions.is_empty());
    }

    #[tokio::test]
    async fn test_maintain_without_readings_keeps_install() {
        let fx = Fixture::new().await;
        let part = fx.part(1_200, 5_000).await;

        let maintained = fx
            .checker(Arc::new(LogMailer::new()))
            .maintain_part(part.id)
            .await
            .unwrap();
        assert_eq!(maintained.install_mileage, 1_200);
    }

    #[tokio::test]
    async fn test_refresh_after_part_removed() {
        let fx = Fixture::new().await;
        let part = fx.part(0, 100).await;
        fx.reading("2024-01-01", 200).await;

        let checker = fx.checker(Arc::new(LogMailer::new()));
        checker.check_vehicle(fx.vehicle_id).await.unwrap();
        fx.repo.delete_part(part.id).await.unwrap();

        let status = checker.refresh_vehicle_status(fx.vehicle_id).await.unwrap();
        assert_eq!(status, MaintenanceStatus::Good);
    }

    #[tokio::test]
    async fn test_forecast() {
        let fx = Fixture::new().await;
        fx.reading("2024-01-01", 1_000).await;
        fx.reading("2024-01-05", 1_400).await;

        let forecast = fx
            .checker(Arc::new(LogMailer::new()))
            .forecast(fx.vehicle_id, 30)
            .await
            .unwrap();
        assert_eq!(forecast.current_mileage, Some(1_400));
        assert_eq!(forecast.predicted_mileage, Some(4_400));
        assert_eq!(forecast.daily_rate, Some(100.0));
    }

    #[tokio::test]
    async fn test_unknown_ids() {
        let fx = Fixture::new().await;
        let checker = fx.checker(Arc::new(LogMailer::new()));

        assert!(matches!(
            checker.check_part(999).await,
            Err(MaintenanceError::PartNotFound(999))
        ));
        assert!(matches!(
            checker.check_vehicle(999).await,
            Err(MaintenanceError::VehicleNotFound(999))
        ));
    }
}
