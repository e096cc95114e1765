//! Billing status of an insurer derived from its last invoice date and cadence.
//!
//! Everything here is pure. Functions that depend on the current time come in pairs:
//! `foo` reads the local clock and `foo_at` takes `now` explicitly.

use crate::models::InsurerRecord;
use chrono::{Days, Local, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;

pub const DEFAULT_WARNING_DAYS: u32 = 3;

static INVOICE_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d{1,2})\.(\d{1,2})\.\s*(\d{4})\s*$").expect("valid invoice date pattern")
});

static TURNUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)-tägig").expect("valid turnus pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverdueThresholds {
    /// Largest number of overdue days still reported as a warning.
    pub warning_days: u32,
}

impl Default for OverdueThresholds {
    fn default() -> Self {
        Self {
            warning_days: DEFAULT_WARNING_DAYS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoDataReason {
    MissingInvoice,
    MissingTurnus,
    Unparseable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillingStatus {
    NoData(NoDataReason),
    Ok,
    Warning { days_overdue: u32 },
    Critical { days_overdue: u32 },
}

impl BillingStatus {
    pub fn key(&self) -> &'static str {
        match self {
            BillingStatus::NoData(_) => "no_data",
            BillingStatus::Ok => "ok",
            BillingStatus::Warning { .. } => "warning",
            BillingStatus::Critical { .. } => "critical",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            BillingStatus::NoData(_) => "gray",
            BillingStatus::Ok => "green",
            BillingStatus::Warning { .. } => "yellow",
            BillingStatus::Critical { .. } => "red",
        }
    }

    pub fn label(&self) -> String {
        match self {
            BillingStatus::NoData(NoDataReason::MissingInvoice) => "Keine Abrechnung".to_string(),
            BillingStatus::NoData(_) => "Aktuell".to_string(),
            BillingStatus::Ok => "Abrechnung OK".to_string(),
            BillingStatus::Warning { days_overdue } | BillingStatus::Critical { days_overdue } => {
                format!("Überfällig ({days_overdue} Tage)")
            }
        }
    }

    pub fn days_overdue(&self) -> u32 {
        match self {
            BillingStatus::Warning { days_overdue } | BillingStatus::Critical { days_overdue } => {
                *days_overdue
            }
            _ => 0,
        }
    }
}

/// Parses `DD.MM.YYYY` (or `DD.MM. YYYY`), ignoring anything after the first comma.
pub fn parse_invoice_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.split(',').next()?;
    let captures = INVOICE_DATE.captures(date_part)?;
    let day: u32 = captures[1].parse().ok()?;
    let month: u32 = captures[2].parse().ok()?;
    let year: i32 = captures[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn parse_turnus_days(raw: &str) -> Option<u32> {
    TURNUS.captures(raw)?[1].parse().ok()
}

/// Display form of a stored invoice date: the part before the first comma.
pub fn format_last_invoice_date(raw: &str) -> &str {
    raw.split(',').next().unwrap_or_default().trim()
}

/// Midnight of the invoice date plus the cadence.
pub fn due_date(record: &InsurerRecord) -> Option<NaiveDateTime> {
    let invoice = parse_invoice_date(record.last_invoice()?)?;
    let turnus_days = parse_turnus_days(record.turnus()?)?;
    invoice
        .checked_add_days(Days::new(u64::from(turnus_days)))?
        .and_hms_opt(0, 0, 0)
}

pub fn is_within_turnus(record: &InsurerRecord) -> bool {
    is_within_turnus_at(record, Local::now().naive_local())
}

pub fn is_within_turnus_at(record: &InsurerRecord, now: NaiveDateTime) -> bool {
    due_date(record).is_some_and(|due| now <= due)
}

pub fn days_overdue(record: &InsurerRecord) -> u32 {
    days_overdue_at(record, Local::now().naive_local())
}

/// Whole days past the due date, at least 1 once overdue. 0 when on time or without data.
pub fn days_overdue_at(record: &InsurerRecord, now: NaiveDateTime) -> u32 {
    let Some(due) = due_date(record) else {
        return 0;
    };
    if now <= due {
        return 0;
    }
    let days = (now - due).num_days();
    u32::try_from(days).unwrap_or(u32::MAX).max(1)
}

pub fn classify(record: &InsurerRecord, thresholds: OverdueThresholds) -> BillingStatus {
    classify_at(record, Local::now().naive_local(), thresholds)
}

pub fn classify_at(
    record: &InsurerRecord,
    now: NaiveDateTime,
    thresholds: OverdueThresholds,
) -> BillingStatus {
    if record.settlement_completed() {
        return BillingStatus::Ok;
    }
    if record.last_invoice().is_none() {
        return BillingStatus::NoData(NoDataReason::MissingInvoice);
    }
    if record.turnus().is_none() {
        return BillingStatus::NoData(NoDataReason::MissingTurnus);
    }
    let Some(due) = due_date(record) else {
        return BillingStatus::NoData(NoDataReason::Unparseable);
    };
    if now <= due {
        return BillingStatus::Ok;
    }

    let days_overdue = days_overdue_at(record, now);
    if days_overdue <= thresholds.warning_days {
        BillingStatus::Warning { days_overdue }
    } else {
        BillingStatus::Critical { days_overdue }
    }
}
