//! # Report Command
//!
//! Renders [`LedgerReport`] for the acting identity.

use std::collections::BTreeMap;

use cashbook_core::{LedgerReport, ReportFilter, Totals};
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};

use super::vault::vault_table;
use super::{render, table};
use crate::cli::ReportArgs;
use crate::error::{AppError, AppResult};
use crate::state::LedgerStore;

impl ReportArgs {
    /// Filter covering whole UTC days, both ends inclusive.
    pub fn to_filter(&self) -> AppResult<ReportFilter> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(AppError::validation(format!(
                    "--from {} is after --to {}",
                    from, to
                )));
            }
        }

        Ok(ReportFilter {
            from: self.from.map(start_of_day),
            to: self.to.map(end_of_day),
            company: self.company.clone(),
            location: self.location.clone(),
        })
    }
}

fn start_of_day(day: NaiveDate) -> chrono::DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN))
}

fn end_of_day(day: NaiveDate) -> chrono::DateTime<Utc> {
    let last = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    Utc.from_utc_datetime(&day.and_time(last))
}

pub async fn run(store: &LedgerStore, args: &ReportArgs, json: bool) -> AppResult<String> {
    let filter = args.to_filter()?;
    let report = store.report(&filter).await;
    render(json, &report, report_text)
}

fn report_text(report: &LedgerReport) -> String {
    if report.is_empty() {
        return format!(
            "No matching transactions\n\n{}",
            vault_table(&report.vault, report.vault_value)
        );
    }

    let summary = table(
        &["", "CREDIT", "DEBIT", "NET", "COUNT"],
        &[
            totals_row("All", &report.overall),
            totals_row("Cash", &report.cash),
            totals_row("UPI", &report.upi),
        ],
    );

    format!(
        "{}\n\nBy company\n{}\n\nBy location\n{}\n\nVault\n{}",
        summary,
        group_table(&report.by_company),
        group_table(&report.by_location),
        vault_table(&report.vault, report.vault_value)
    )
}

fn totals_row(label: &str, totals: &Totals) -> Vec<String> {
    vec![
        label.to_string(),
        totals.credit.to_string(),
        totals.debit.to_string(),
        totals.net.to_string(),
        totals.count.to_string(),
    ]
}

fn group_table(groups: &BTreeMap<String, Totals>) -> String {
    let rows: Vec<Vec<String>> = groups
        .iter()
        .map(|(name, totals)| totals_row(name, totals))
        .collect();
    table(&["NAME", "CREDIT", "DEBIT", "NET", "COUNT"], &rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_filter_covers_whole_days() {
        let args = ReportArgs {
            from: NaiveDate::from_ymd_opt(2024, 6, 1),
            to: NaiveDate::from_ymd_opt(2024, 6, 1),
            ..ReportArgs::default()
        };

        let filter = args.to_filter().unwrap();
        let from = filter.from.unwrap();
        let to = filter.to.unwrap();

        assert_eq!(from.hour(), 0);
        assert_eq!(to.hour(), 23);
        assert_eq!(to.minute(), 59);
        assert!(from < to);
    }

    #[test]
    fn test_reversed_range_is_rejected() {
        let args = ReportArgs {
            from: NaiveDate::from_ymd_opt(2024, 6, 2),
            to: NaiveDate::from_ymd_opt(2024, 6, 1),
            ..ReportArgs::default()
        };
        assert!(args.to_filter().is_err());
    }
}
