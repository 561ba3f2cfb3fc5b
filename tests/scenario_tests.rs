use std::sync::Arc;

use campaign_pacing::{
    domain::DaypartingSchedule,
    services::{FixedClock, InMemoryStore, PacingApi, PacingStore},
};
use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use rust_decimal_macros::dec;

fn api_at(
    y: i32,
    mo: u32,
    d: u32,
    h: u32,
    mi: u32,
) -> (PacingApi, Arc<InMemoryStore>, Arc<FixedClock>) {
    campaign_pacing::init();
    let store = Arc::new(InMemoryStore::new());
    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap(),
    ));
    (PacingApi::new(store.clone(), clock.clone()), store, clock)
}

fn at(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

#[test]
fn over_budget_brand_pauses_then_resumes_next_day() {
    let (api, store, clock) = api_at(2024, 3, 12, 10, 0);
    let brand = api.register_brand("Acme", dec!(100), dec!(1000)).unwrap();
    let campaign = api.register_campaign(brand.id, "Spring Sale").unwrap();

    api.record_spend(campaign.id, dec!(60), None).unwrap();
    assert!(api.enforce_budgets().is_empty());
    assert!(store.campaign(campaign.id).unwrap().is_active);

    api.record_spend(campaign.id, dec!(50), Some("retargeting".into()))
        .unwrap();
    let summary = api.get_brand_summary(brand.id).unwrap();
    assert_eq!(summary.current_daily_spend, dec!(110));
    assert!(summary.daily_exceeded);

    let paused = api.enforce_budgets();
    assert_eq!(paused.deactivated.len(), 1);
    assert_eq!(
        paused.describe(),
        "Deactivated 1 campaigns: Spring Sale (Acme)"
    );
    assert!(!store.campaign(campaign.id).unwrap().is_active);

    clock.advance(Duration::days(1));
    let reset = api.reset_today();
    assert_eq!(reset.daily_reset_brands, vec![brand.id]);
    assert!(reset.monthly_reset_brands.is_empty());
    assert_eq!(reset.reactivated.len(), 1);

    let brand = store.brand(brand.id).unwrap();
    assert_eq!(brand.current_daily_spend, dec!(0));
    assert_eq!(brand.current_monthly_spend, dec!(110));
    assert!(store.campaign(campaign.id).unwrap().is_active);
}

#[test]
fn overnight_window_follows_the_clock() {
    let (api, store, clock) = api_at(2024, 3, 12, 23, 0);
    let brand = api.register_brand("Nocturne", dec!(500), dec!(5000)).unwrap();
    let campaign = api.register_campaign(brand.id, "Late Show").unwrap();
    api.set_dayparting(campaign.id, DaypartingSchedule::new(at(22, 0), at(6, 0)))
        .unwrap();

    assert!(api.should_campaign_be_active(campaign.id).unwrap().0);
    assert!(api.enforce_dayparting().is_empty());

    clock.set(Utc.with_ymd_and_hms(2024, 3, 13, 5, 59, 0).unwrap());
    assert!(api.enforce_dayparting().is_empty());
    assert!(store.campaign(campaign.id).unwrap().is_active);

    clock.set(Utc.with_ymd_and_hms(2024, 3, 13, 12, 0, 0).unwrap());
    let (active, reasons) = api.should_campaign_be_active(campaign.id).unwrap();
    assert!(!active);
    assert_eq!(reasons, vec!["outside dayparting window".to_string()]);
    assert_eq!(api.enforce_dayparting().deactivated.len(), 1);

    clock.set(Utc.with_ymd_and_hms(2024, 3, 13, 22, 0, 0).unwrap());
    assert_eq!(api.enforce_dayparting().activated.len(), 1);
    assert!(store.campaign(campaign.id).unwrap().is_active);
}

#[test]
fn monthly_spend_clears_only_on_the_first() {
    let (api, store, _) = api_at(2024, 3, 31, 9, 0);
    let brand = api.register_brand("Acme", dec!(100), dec!(300)).unwrap();
    let campaign = api.register_campaign(brand.id, "Evergreen").unwrap();
    api.record_spend(campaign.id, dec!(80), None).unwrap();

    let mid_month = api.reset_daily_monthly(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
    assert!(mid_month.monthly_reset_brands.is_empty());
    assert_eq!(store.brand(brand.id).unwrap().current_monthly_spend, dec!(80));

    let first = api.reset_daily_monthly(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
    assert_eq!(first.monthly_reset_brands, vec![brand.id]);
    let brand = store.brand(brand.id).unwrap();
    assert_eq!(brand.current_daily_spend, dec!(0));
    assert_eq!(brand.current_monthly_spend, dec!(0));
}

#[test]
fn monthly_cap_keeps_campaigns_paused_across_daily_resets() {
    let (api, store, clock) = api_at(2024, 3, 20, 9, 0);
    let brand = api.register_brand("Acme", dec!(100), dec!(150)).unwrap();
    let campaign = api.register_campaign(brand.id, "Evergreen").unwrap();
    api.record_spend(campaign.id, dec!(90), None).unwrap();
    clock.advance(Duration::days(1));
    api.reset_today();
    api.record_spend(campaign.id, dec!(60), None).unwrap();

    let (_, reasons) = api.should_campaign_be_active(campaign.id).unwrap();
    assert_eq!(reasons, vec!["monthly budget exceeded".to_string()]);
    assert_eq!(api.enforce_budgets().deactivated.len(), 1);

    clock.advance(Duration::days(1));
    let reset = api.reset_today();
    assert!(reset.reactivated.is_empty());
    assert!(!store.campaign(campaign.id).unwrap().is_active);
}

#[test]
fn repeated_passes_change_nothing() {
    let (api, store, _) = api_at(2024, 3, 12, 12, 0);
    let brand = api.register_brand("Acme", dec!(10), dec!(100)).unwrap();
    let over = api.register_campaign(brand.id, "Over").unwrap();
    let other = api.register_brand("Globex", dec!(100), dec!(1000)).unwrap();
    let fine = api.register_campaign(other.id, "Fine").unwrap();
    api.record_spend(over.id, dec!(10), None).unwrap();

    let first = api.check_and_update_campaign_status();
    assert_eq!(first.budgets.deactivated.len(), 1);
    let versions = (
        store.campaign(over.id).unwrap().version,
        store.campaign(fine.id).unwrap().version,
    );

    let second = api.check_and_update_campaign_status();
    assert!(second.budgets.is_empty());
    assert!(second.dayparting.is_empty());
    assert_eq!(
        second.describe(),
        "Budget check: No changes; Dayparting check: No changes"
    );
    assert_eq!(
        versions,
        (
            store.campaign(over.id).unwrap().version,
            store.campaign(fine.id).unwrap().version,
        )
    );

    let day = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap();
    let reset = api.reset_daily_monthly(day);
    assert_eq!(reset.reactivated.len(), 1);
    let again = api.reset_daily_monthly(day);
    assert!(again.reactivated.is_empty());
}
