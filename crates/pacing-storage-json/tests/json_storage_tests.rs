use std::{fs, sync::Arc};

use chrono::{NaiveTime, TimeZone, Utc};
use pacing_core::{FixedClock, PacingApi, PacingStore};
use pacing_domain::DaypartingSchedule;
use pacing_storage_json::JsonSnapshotStorage;
use rust_decimal_macros::dec;
use tempfile::TempDir;

#[test]
fn missing_file_loads_as_empty_state() {
    let dir = TempDir::new().unwrap();
    let storage = JsonSnapshotStorage::new(dir.path().join("state.json"));
    assert!(!storage.exists());
    let snapshot = storage.load().unwrap();
    assert!(snapshot.brands.is_empty());
    assert!(snapshot.campaigns.is_empty());
}

#[test]
fn state_survives_a_restart() {
    let dir = TempDir::new().unwrap();
    let storage = JsonSnapshotStorage::new(dir.path().join("state").join("pacing.json"));
    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2024, 2, 3, 10, 0, 0).unwrap(),
    ));

    let store = Arc::new(storage.load_store().unwrap());
    let api = PacingApi::new(store.clone(), clock.clone());
    let brand = api.register_brand("Acme", dec!(100), dec!(1000)).unwrap();
    let campaign = api.register_campaign(brand.id, "Launch").unwrap();
    api.set_dayparting(
        campaign.id,
        DaypartingSchedule::new(
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
        ),
    )
    .unwrap();
    api.record_spend(campaign.id, dec!(110), Some("search".into()))
        .unwrap();
    api.enforce_budgets();
    storage.save_store(store.as_ref()).unwrap();

    let reloaded = Arc::new(storage.load_store().unwrap());
    let restored = reloaded.brand(brand.id).unwrap();
    assert_eq!(restored.current_daily_spend, dec!(110));
    assert!(!reloaded.campaign(campaign.id).unwrap().is_active);
    assert_eq!(reloaded.spend_logs_for_campaign(campaign.id).unwrap().len(), 1);

    let api = PacingApi::new(reloaded.clone(), clock);
    let summary = api.reset_daily_monthly(chrono::NaiveDate::from_ymd_opt(2024, 2, 4).unwrap());
    assert_eq!(summary.reactivated.len(), 1);
}

#[test]
fn save_leaves_no_temporary_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");
    let storage = JsonSnapshotStorage::new(&path);
    storage.save(&Default::default()).unwrap();

    assert!(path.exists());
    assert!(!dir.path().join("state.json.tmp").exists());
}

#[test]
fn corrupt_state_is_a_storage_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");
    fs::write(&path, "[1, 2").unwrap();
    let storage = JsonSnapshotStorage::new(&path);
    assert!(matches!(
        storage.load(),
        Err(pacing_core::CoreError::Storage(_))
    ));
}
