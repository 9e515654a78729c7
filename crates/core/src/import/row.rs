use serde::{Deserialize, Serialize};

use crate::types::RowData;

/// Sheet line of the first data row; line 1 holds the column headers.
pub const FIRST_DATA_ROW: usize = 2;

/// One spreadsheet row as handed to the validation pipeline.
///
/// `index` is the sheet line number used in error reports and never changes.
/// `data` is enriched in place with resolved foreign keys before persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub index: usize,
    pub data: RowData,
}

impl Row {
    pub fn new(index: usize, data: RowData) -> Self {
        Self { index, data }
    }

    /// Number parsed rows by their sheet line.
    pub fn from_sheet(rows: impl IntoIterator<Item = RowData>) -> Vec<Row> {
        rows.into_iter()
            .enumerate()
            .map(|(position, data)| Row::new(position + FIRST_DATA_ROW, data))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rows_are_numbered_from_first_data_line() {
        let rows = Row::from_sheet(vec![RowData::new(), RowData::new()]);
        assert_eq!(rows.iter().map(|r| r.index).collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn rows_deserialize_from_json() {
        let row: Row = serde_json::from_value(json!({ "index": 4, "data": { "name": "Pool" } })).unwrap();
        assert_eq!(row.index, 4);
        assert_eq!(row.data["name"], json!("Pool"));
    }
}
