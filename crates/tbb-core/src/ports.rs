use async_trait::async_trait;

use crate::Result;

/// Raw cell grid as returned by the spreadsheet service: ordered rows of
/// ordered string cells, header row included.
pub type CellGrid = Vec<Vec<String>>;

/// Hexagonal port for the spreadsheet read side.
///
/// Google Sheets is the first implementation; the core depends only on this
/// narrow read-only interface.
#[async_trait]
pub trait SheetSource: Send + Sync {
    /// Fetch `range` (column span in letter notation, e.g. "E:G") of
    /// `worksheet` from the spreadsheet identified by `spreadsheet_id`.
    async fn fetch_range(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
        range: &str,
    ) -> Result<CellGrid>;
}
