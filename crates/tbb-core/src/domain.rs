/// Placeholder for a cell missing from a source row.
pub const MISSING_CELL: &str = "Not specified";

/// Balance string marking the internal house account; rows carrying it are
/// dropped before any other processing. The comparison is on the literal
/// string rendering, never a parsed number.
pub const EXCLUDED_BALANCE: &str = "9964476";

/// One advertising account row from the balance sheet (columns E:G).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BalanceRow {
    pub balance: String,
    pub campaign: String,
    pub personal_cabinet: String,
}

impl BalanceRow {
    /// Build a row from raw cells in sheet column order: balance, campaign,
    /// personal cabinet. Missing trailing cells fall back to the placeholder.
    pub fn from_cells(cells: &[String]) -> Self {
        let cell = |i: usize| {
            cells
                .get(i)
                .map(|s| s.as_str())
                .unwrap_or(MISSING_CELL)
                .to_string()
        };
        Self {
            balance: cell(0),
            campaign: cell(1),
            personal_cabinet: cell(2),
        }
    }

    pub fn is_excluded(&self) -> bool {
        self.balance == EXCLUDED_BALANCE
    }
}
