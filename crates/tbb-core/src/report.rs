//! Balance report pipeline: parse, filter, sort, disambiguate, paginate.
//!
//! Everything here is a pure function over the raw cell grid so the pipeline
//! is testable without any network or transport dependency. The request
//! timestamp is injected by the caller.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Local};

use crate::{config::Config, domain::BalanceRow, ports::SheetSource, Result};

/// Hard cap on one outgoing message, in characters.
pub const DEFAULT_PAGE_LIMIT: usize = 4096;

/// Parse data rows (the first grid row is the header) and drop excluded
/// accounts.
pub fn parse_grid(grid: &[Vec<String>]) -> Vec<BalanceRow> {
    grid.iter()
        .skip(1)
        .map(|cells| BalanceRow::from_cells(cells))
        .filter(|row| !row.is_excluded())
        .collect()
}

/// Numeric sort key for a balance string.
///
/// A value counts as numeric when removing every '.' leaves only digits;
/// numeric values compare as f64. Everything else keys as 0, including
/// values like "1.2.3" that pass the digit check but fail the float parse.
fn sort_key(balance: &str) -> f64 {
    let digits: String = balance.chars().filter(|c| *c != '.').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return 0.0;
    }
    balance.parse::<f64>().unwrap_or(0.0)
}

/// Stable descending sort by numeric balance; ties and non-numeric values
/// keep their input order.
pub fn sort_rows(rows: &mut [BalanceRow]) {
    rows.sort_by(|a, b| {
        sort_key(&b.balance)
            .partial_cmp(&sort_key(&a.balance))
            .unwrap_or(Ordering::Equal)
    });
}

/// Render one line per row, 1-indexed. A campaign name occurring more than
/// once gets the personal cabinet appended in parentheses.
pub fn render_lines(rows: &[BalanceRow]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for row in rows {
        *counts.entry(row.campaign.as_str()).or_insert(0) += 1;
    }

    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let line = if counts[row.campaign.as_str()] > 1 {
                format!(
                    "{}. {} ({}) | {}",
                    i + 1,
                    row.campaign,
                    row.personal_cabinet,
                    row.balance
                )
            } else {
                format!("{}. {} | {}", i + 1, row.campaign, row.balance)
            };
            tracing::debug!("{line}");
            line
        })
        .collect()
}

/// Greedy pagination: lines accumulate into newline-joined pages of at most
/// `limit` characters. A line is never split; the page break goes before the
/// line whose addition (plus separator) would overflow. Empty pages are
/// never produced.
pub fn paginate(lines: &[String], limit: usize) -> Vec<String> {
    let mut pages: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for line in lines {
        let line_len = line.chars().count();
        if current_len > 0 && current_len + line_len + 1 > limit {
            pages.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push('\n');
            current_len += 1;
        }
        current.push_str(line);
        current_len += line_len;
    }

    if !current.is_empty() {
        pages.push(current);
    }
    pages
}

/// Build the full report for a raw grid: a header line carrying the request
/// timestamp (its trailing newline yields the blank separator line), one
/// line per surviving row, paginated.
pub fn build_report(grid: &[Vec<String>], at: DateTime<Local>, limit: usize) -> Vec<String> {
    let mut rows = parse_grid(grid);
    sort_rows(&mut rows);

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(format!("Requested at {}\n", at.format("%d.%m.%Y %H:%M:%S")));
    lines.extend(render_lines(&rows));

    paginate(&lines, limit)
}

/// One fetch-format cycle against the configured sheet.
pub async fn balance_report(
    source: &dyn SheetSource,
    cfg: &Config,
    at: DateTime<Local>,
) -> Result<Vec<String>> {
    let grid = source
        .fetch_range(&cfg.spreadsheet_id, &cfg.worksheet_name, &cfg.sheet_range)
        .await?;
    Ok(build_report(&grid, at, cfg.message_limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EXCLUDED_BALANCE;
    use crate::ports::CellGrid;
    use crate::Error;
    use chrono::TimeZone;

    fn grid(rows: &[&[&str]]) -> CellGrid {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    fn ts() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap()
    }

    fn data_lines(pages: &[String]) -> Vec<String> {
        // Skip the header and the blank separator on the first page.
        let mut out = Vec::new();
        for (i, page) in pages.iter().enumerate() {
            for (j, line) in page.lines().enumerate() {
                if i == 0 && j < 2 {
                    continue;
                }
                out.push(line.to_string());
            }
        }
        out
    }

    #[test]
    fn sentinel_rows_never_reach_the_output() {
        let g = grid(&[
            &["Balance", "Campaign", "Cabinet"],
            &["200", "A", "c1"],
            &[EXCLUDED_BALANCE, "House", "c2"],
            &["100", "B", "c3"],
        ]);
        let pages = build_report(&g, ts(), DEFAULT_PAGE_LIMIT);
        assert!(!pages.concat().contains(EXCLUDED_BALANCE));
        assert!(!pages.concat().contains("House"));
    }

    #[test]
    fn line_count_matches_filtered_rows() {
        let g = grid(&[
            &["Balance", "Campaign", "Cabinet"],
            &["200", "A", "c1"],
            &[EXCLUDED_BALANCE, "House", "c2"],
            &["100", "B", "c3"],
            &["abc", "C", "c4"],
        ]);
        let pages = build_report(&g, ts(), DEFAULT_PAGE_LIMIT);
        assert_eq!(data_lines(&pages).len(), 3);
    }

    #[test]
    fn sorts_descending_by_numeric_balance() {
        let mut rows = parse_grid(&grid(&[
            &["Balance", "Campaign", "Cabinet"],
            &["50", "low", "c"],
            &["1.000.000", "million-ish", "c"],
            &["999", "mid", "c"],
            &["1200.5", "high", "c"],
        ]));
        sort_rows(&mut rows);

        let order: Vec<&str> = rows.iter().map(|r| r.campaign.as_str()).collect();
        // "1.000.000" passes the digit check but fails the float parse and
        // keys as 0, so it lands behind every real balance.
        assert_eq!(order, vec!["high", "mid", "low", "million-ish"]);
    }

    #[test]
    fn non_numeric_balances_keep_input_order_at_the_end() {
        let mut rows = parse_grid(&grid(&[
            &["Balance", "Campaign", "Cabinet"],
            &["n/a", "first-bad", "c"],
            &["75", "good", "c"],
            &["pending", "second-bad", "c"],
        ]));
        sort_rows(&mut rows);

        let order: Vec<&str> = rows.iter().map(|r| r.campaign.as_str()).collect();
        assert_eq!(order, vec!["good", "first-bad", "second-bad"]);
    }

    #[test]
    fn multi_dot_value_is_classified_numeric_but_keys_as_zero() {
        // Known edge of the inherited heuristic: "1.2.3" is all digits once
        // the dots are stripped, yet it cannot parse as a float.
        let mut rows = parse_grid(&grid(&[
            &["Balance", "Campaign", "Cabinet"],
            &["1.2.3", "versionish", "c"],
            &["1", "one", "c"],
        ]));
        sort_rows(&mut rows);
        assert_eq!(rows[0].campaign, "one");
        assert_eq!(rows[1].campaign, "versionish");
    }

    #[test]
    fn repeated_campaigns_get_cabinet_parenthetical() {
        let rows = parse_grid(&grid(&[
            &["Balance", "Campaign", "Cabinet"],
            &["300", "Dup", "cab-a"],
            &["200", "Solo", "cab-b"],
            &["100", "Dup", "cab-c"],
        ]));
        let lines = render_lines(&rows);
        assert_eq!(lines[0], "1. Dup (cab-a) | 300");
        assert_eq!(lines[1], "2. Solo | 200");
        assert_eq!(lines[2], "3. Dup (cab-c) | 100");
    }

    #[test]
    fn scenario_filter_sort_disambiguate() {
        let g = grid(&[
            &["Balance", "Campaign", "Cabinet"],
            &["100", "CampaignA", "CabA"],
            &[EXCLUDED_BALANCE, "CampaignB", "CabB"],
            &["50", "CampaignA", "CabC"],
        ]);
        let pages = build_report(&g, ts(), DEFAULT_PAGE_LIMIT);
        assert_eq!(pages.len(), 1);

        let lines: Vec<&str> = pages[0].lines().collect();
        assert_eq!(lines[0], "Requested at 02.01.2026 03:04:05");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "1. CampaignA (CabA) | 100");
        assert_eq!(lines[3], "2. CampaignA (CabC) | 50");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn pagination_respects_limit_and_loses_nothing() {
        let lines: Vec<String> = (1..=80)
            .map(|i| format!("{i}. campaign-{i:02} | {}", i * 100))
            .collect();
        let pages = paginate(&lines, 120);

        assert!(pages.len() > 1);
        for page in &pages {
            assert!(page.chars().count() <= 120);
            assert!(!page.is_empty());
        }

        let rejoined: Vec<String> = pages
            .iter()
            .flat_map(|p| p.lines().map(str::to_string))
            .collect();
        assert_eq!(rejoined, lines);
    }

    #[test]
    fn page_break_goes_before_the_overflowing_line() {
        let lines = vec!["aaaa".to_string(), "bbbb".to_string(), "cc".to_string()];
        // "aaaa\nbbbb" is 9 chars; adding "\ncc" would make 12 > 11.
        let pages = paginate(&lines, 11);
        assert_eq!(pages, vec!["aaaa\nbbbb".to_string(), "cc".to_string()]);
    }

    #[test]
    fn single_page_when_everything_fits() {
        let lines = vec!["a".to_string(), "b".to_string()];
        assert_eq!(paginate(&lines, DEFAULT_PAGE_LIMIT), vec!["a\nb".to_string()]);
    }

    #[test]
    fn header_counts_against_the_first_page() {
        let g = grid(&[
            &["Balance", "Campaign", "Cabinet"],
            &["100", "AAAAAAAAAA", "c"],
        ]);
        // Limit small enough that header + data line cannot share a page.
        let pages = build_report(&g, ts(), 40);
        assert_eq!(pages.len(), 2);
        assert!(pages[0].starts_with("Requested at "));
        assert_eq!(pages[1], "1. AAAAAAAAAA | 100");
    }

    #[test]
    fn same_timestamp_yields_identical_output() {
        let g = grid(&[
            &["Balance", "Campaign", "Cabinet"],
            &["100", "A", "c1"],
            &["50", "B", "c2"],
        ]);
        assert_eq!(
            build_report(&g, ts(), DEFAULT_PAGE_LIMIT),
            build_report(&g, ts(), DEFAULT_PAGE_LIMIT)
        );
    }

    struct StaticSheet(CellGrid);

    #[async_trait::async_trait]
    impl SheetSource for StaticSheet {
        async fn fetch_range(&self, _: &str, _: &str, _: &str) -> Result<CellGrid> {
            Ok(self.0.clone())
        }
    }

    struct FailingSheet;

    #[async_trait::async_trait]
    impl SheetSource for FailingSheet {
        async fn fetch_range(&self, _: &str, _: &str, _: &str) -> Result<CellGrid> {
            Err(Error::EmptyData("range E:G has no data rows".to_string()))
        }
    }

    fn test_config() -> Config {
        Config {
            telegram_bot_token: "token".to_string(),
            credentials_path: "credentials.json".into(),
            spreadsheet_id: "sheet-id".to_string(),
            worksheet_name: "Main".to_string(),
            sheet_range: "E:G".to_string(),
            fetch_timeout: std::time::Duration::from_secs(30),
            message_limit: DEFAULT_PAGE_LIMIT,
        }
    }

    #[tokio::test]
    async fn balance_report_runs_the_full_cycle() {
        let source = StaticSheet(grid(&[
            &["Balance", "Campaign", "Cabinet"],
            &["100", "A", "c1"],
        ]));
        let pages = balance_report(&source, &test_config(), ts()).await.unwrap();
        assert_eq!(pages.len(), 1);
        assert!(pages[0].ends_with("1. A | 100"));
    }

    #[tokio::test]
    async fn balance_report_propagates_fetch_errors() {
        let err = balance_report(&FailingSheet, &test_config(), ts())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EmptyData(_)));
    }
}
