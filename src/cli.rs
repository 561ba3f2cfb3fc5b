//! Command-line entry point operating on a JSON state file.
//!
//! The state file is taken from `PACING_STATE` or the config's `state_path`.
//! `PACING_CONFIG` points at a config file; `PACING_NOW` (RFC 3339) pins the clock.

use std::{env, io::Write, path::PathBuf, sync::Arc};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use pacing_config::{Config, ConfigManager};
use pacing_core::{
    Clock, FixedClock, PacingApi, ReconcileScope, StoreSnapshot, SystemClock,
};
use pacing_domain::DaypartingSchedule;
use pacing_storage_json::JsonSnapshotStorage;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::{errors::CliError, utils::build_info};

pub const STATE_ENV: &str = "PACING_STATE";
pub const CONFIG_ENV: &str = "PACING_CONFIG";
pub const NOW_ENV: &str = "PACING_NOW";

const USAGE: &str = "Usage: pacing_cli <command>\n\
Commands:\n\
  init                                      Create an empty state file\n\
  brand <name> <daily> <monthly>            Register a brand\n\
  campaign <brand-id> <name>                Register a campaign\n\
  daypart <campaign-id> <HH:MM> <HH:MM> [tz] Attach a dayparting window\n\
  daypart-clear <campaign-id>               Remove a dayparting window\n\
  spend <campaign-id> <amount> [note...]    Record spend\n\
  enforce-budgets                           Pause campaigns of over-budget brands\n\
  enforce-dayparting                        Apply dayparting windows\n\
  check                                     Budget sweep then dayparting pass\n\
  reconcile [campaign-id]                   Full reconciliation\n\
  reset [YYYY-MM-DD]                        Daily/monthly reset and reactivation\n\
  summary <brand-id>                        Brand budget summary\n\
  status <campaign-id>                      Campaign status and spend\n\
  version                                   Build information";

/// Loads the config from `PACING_CONFIG`, else the platform default location.
pub fn load_config() -> Result<Config, CliError> {
    let manager = match env::var_os(CONFIG_ENV) {
        Some(path) => ConfigManager::new(PathBuf::from(path)),
        None => match ConfigManager::default_location() {
            Some(path) => ConfigManager::new(path),
            None => return Ok(Config::default()),
        },
    };
    Ok(manager.load()?)
}

fn state_path(config: &Config) -> Result<PathBuf, CliError> {
    env::var_os(STATE_ENV)
        .map(PathBuf::from)
        .or_else(|| config.state_path.clone())
        .ok_or_else(|| {
            CliError::Usage(format!(
                "no state file: set {STATE_ENV} or `state_path` in the config"
            ))
        })
}

fn clock() -> Result<Arc<dyn Clock>, CliError> {
    match env::var(NOW_ENV) {
        Ok(raw) => {
            let now = DateTime::parse_from_rfc3339(&raw)
                .map_err(|err| CliError::Input(format!("{NOW_ENV}=`{raw}`: {err}")))?;
            Ok(Arc::new(FixedClock::new(now.with_timezone(&Utc))))
        }
        Err(_) => Ok(Arc::new(SystemClock)),
    }
}

/// Runs one command and writes its result to `out`.
pub fn run_cli<I, W>(args: I, out: &mut W) -> Result<(), CliError>
where
    I: IntoIterator<Item = String>,
    W: Write,
{
    let mut args = args.into_iter();
    let command = args.next().ok_or_else(|| CliError::Usage(USAGE.into()))?;
    let rest: Vec<String> = args.collect();

    match command.as_str() {
        "version" => {
            writeln!(out, "{}", build_info::current().describe())?;
            return Ok(());
        }
        "help" | "--help" | "-h" => {
            writeln!(out, "{USAGE}")?;
            return Ok(());
        }
        _ => {}
    }

    let config = load_config()?;
    let storage = JsonSnapshotStorage::new(state_path(&config)?);

    if command == "init" {
        if !storage.exists() {
            storage.save(&StoreSnapshot::default())?;
        }
        writeln!(out, "Initialized state at {}", storage.path().display())?;
        return Ok(());
    }

    let store = Arc::new(storage.load_store()?);
    let api = PacingApi::with_max_retries(store.clone(), clock()?, config.max_conflict_retries);

    let (value, mutated) = match command.as_str() {
        "brand" => {
            let [name, daily, monthly] = positional::<3>(&rest, "brand <name> <daily> <monthly>")?;
            let brand = api.register_brand(name, parse_amount(daily)?, parse_amount(monthly)?)?;
            (to_json(&brand)?, true)
        }
        "campaign" => {
            let [brand_id, name] = positional::<2>(&rest, "campaign <brand-id> <name>")?;
            (to_json(&api.register_campaign(parse_id(brand_id)?, name)?)?, true)
        }
        "daypart" => {
            if rest.len() < 3 || rest.len() > 4 {
                return Err(usage("daypart <campaign-id> <HH:MM> <HH:MM> [tz]"));
            }
            let timezone = rest
                .get(3)
                .cloned()
                .unwrap_or_else(|| config.default_timezone.clone());
            let schedule = DaypartingSchedule::new(parse_time(&rest[1])?, parse_time(&rest[2])?)
                .with_timezone(timezone);
            (to_json(&api.set_dayparting(parse_id(&rest[0])?, schedule)?)?, true)
        }
        "daypart-clear" => {
            let [campaign_id] = positional::<1>(&rest, "daypart-clear <campaign-id>")?;
            (to_json(&api.clear_dayparting(parse_id(campaign_id)?)?)?, true)
        }
        "spend" => {
            if rest.len() < 2 {
                return Err(usage("spend <campaign-id> <amount> [note...]"));
            }
            let note = (rest.len() > 2).then(|| rest[2..].join(" "));
            let log = api.record_spend(parse_id(&rest[0])?, parse_amount(&rest[1])?, note)?;
            (to_json(&log)?, true)
        }
        "enforce-budgets" => (to_json(&api.enforce_budgets())?, true),
        "enforce-dayparting" => (to_json(&api.enforce_dayparting())?, true),
        "check" => (to_json(&api.check_and_update_campaign_status())?, true),
        "reconcile" => {
            let scope = match rest.first() {
                Some(id) => ReconcileScope::Campaign(parse_id(id)?),
                None => ReconcileScope::All,
            };
            (to_json(&api.reconcile(scope))?, true)
        }
        "reset" => {
            let summary = match rest.first() {
                Some(date) => api.reset_daily_monthly(parse_date(date)?),
                None => api.reset_today(),
            };
            (to_json(&summary)?, true)
        }
        "summary" => {
            let [brand_id] = positional::<1>(&rest, "summary <brand-id>")?;
            (to_json(&api.get_brand_summary(parse_id(brand_id)?)?)?, false)
        }
        "status" => {
            let [campaign_id] = positional::<1>(&rest, "status <campaign-id>")?;
            (to_json(&api.campaign_performance(parse_id(campaign_id)?)?)?, false)
        }
        other => return Err(CliError::Usage(format!("unknown command `{other}`\n{USAGE}"))),
    };

    if mutated {
        storage.save_store(store.as_ref())?;
    }
    writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
    Ok(())
}

fn usage(shape: &str) -> CliError {
    CliError::Usage(format!("usage: pacing_cli {shape}"))
}

fn positional<'a, const N: usize>(rest: &'a [String], shape: &str) -> Result<[&'a str; N], CliError> {
    if rest.len() != N {
        return Err(usage(shape));
    }
    Ok(std::array::from_fn(|i| rest[i].as_str()))
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, CliError> {
    Ok(serde_json::to_value(value)?)
}

fn parse_id(raw: &str) -> Result<Uuid, CliError> {
    Uuid::parse_str(raw.trim()).map_err(|err| CliError::Input(format!("`{raw}` is not an id: {err}")))
}

fn parse_amount(raw: &str) -> Result<Decimal, CliError> {
    raw.trim()
        .parse::<Decimal>()
        .map_err(|err| CliError::Input(format!("`{raw}` is not an amount: {err}")))
}

fn parse_time(raw: &str) -> Result<NaiveTime, CliError> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|err| CliError::Input(format!("`{raw}` is not a time of day: {err}")))
}

fn parse_date(raw: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|err| CliError::Input(format!("`{raw}` is not a YYYY-MM-DD date: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_times_with_and_without_seconds() {
        assert_eq!(parse_time("22:00").unwrap(), NaiveTime::from_hms_opt(22, 0, 0).unwrap());
        assert_eq!(parse_time("05:59:30").unwrap(), NaiveTime::from_hms_opt(5, 59, 30).unwrap());
        assert!(parse_time("25:00").is_err());
    }

    #[test]
    fn amounts_keep_decimal_precision() {
        assert_eq!(parse_amount("0.10").unwrap().to_string(), "0.10");
        assert!(parse_amount("ten").is_err());
    }

    #[test]
    fn positional_checks_arity() {
        let rest = vec!["a".to_string(), "b".to_string()];
        assert_eq!(positional::<2>(&rest, "x <a> <b>").unwrap(), ["a", "b"]);
        assert!(matches!(positional::<1>(&rest, "x <a>"), Err(CliError::Usage(_))));
    }

    #[test]
    fn missing_command_prints_usage() {
        let mut out = Vec::new();
        let err = run_cli(Vec::<String>::new(), &mut out).expect_err("usage");
        assert!(err.to_string().contains("Usage: pacing_cli"));
    }

    #[test]
    fn version_needs_no_state() {
        let mut out = Vec::new();
        run_cli(vec!["version".to_string()], &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("pacing_cli "));
    }
}
