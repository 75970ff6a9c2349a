use std::path::Path;

use super::model::Table;
use crate::error::TableError;

/// Write a table as comma-separated CSV with a header row and no index column.
pub fn write_csv(table: &Table, path: &Path) -> Result<(), TableError> {
    let csv_err = |source| TableError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    writer.write_record(table.columns()).map_err(csv_err)?;
    for row in table.rows() {
        writer
            .write_record(row.iter().map(|cell| cell.to_string()))
            .map_err(csv_err)?;
    }
    writer.flush().map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::data::model::CellValue;

    #[test]
    fn test_write_csv_quotes_and_nulls() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");

        let mut table = Table::new(vec!["name".into(), "value".into()]);
        table.push_row(vec![CellValue::String("a,b".into()), CellValue::Float(1.0)]);
        table.push_row(vec![CellValue::String("c".into()), CellValue::Null]);
        write_csv(&table, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "name,value\n\"a,b\",1.0\nc,\n");
    }
}
