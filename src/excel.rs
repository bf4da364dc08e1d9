use crate::errors::SourceError;
use crate::import_batch::ImportBatch;
use crate::parameter_value::ParameterValue;
use calamine::{open_workbook_auto, DataType, Range, Reader, Sheets};
use indexmap::IndexMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// One row of a parameter sheet with `category`, `entity` and `value`
/// columns.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterRow {
    pub category: String,
    pub entity: String,
    pub value: ParameterValue,
}

/// A parameter sheet keyed by category and entity.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParameterTable {
    rows: Vec<ParameterRow>,
}

impl ParameterTable {
    pub fn from_range(range: &Range<DataType>) -> Result<Self, SourceError> {
        let mut rows = range.rows();
        let header = rows
            .next()
            .ok_or_else(|| SourceError("parameter sheet is empty".to_string()))?;
        let category_column = find_column(header, "category")?;
        let entity_column = find_column(header, "entity")?;
        let value_column = find_column(header, "value")?;
        let mut table = ParameterTable::default();
        for row in rows {
            let category = match row.get(category_column).and_then(DataType::get_string) {
                Some(category) => category.to_string(),
                None => continue,
            };
            let entity = match row.get(entity_column).and_then(DataType::get_string) {
                Some(entity) => entity.to_string(),
                None => continue,
            };
            let value = match row.get(value_column).and_then(cell_value) {
                Some(value) => value,
                None => continue,
            };
            table.rows.push(ParameterRow {
                category,
                entity,
                value,
            });
        }
        Ok(table)
    }

    /// The value of the first row matching both category and entity.
    pub fn find(&self, category: &str, entity: &str) -> Option<&ParameterValue> {
        self.rows
            .iter()
            .find(|row| row.category == category && row.entity == entity)
            .map(|row| &row.value)
    }

    pub fn find_number(&self, category: &str, entity: &str) -> Option<f64> {
        self.find(category, entity).and_then(ParameterValue::as_number)
    }

    pub fn rows_in_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = &'a ParameterRow> {
        self.rows.iter().filter(move |row| row.category == category)
    }
}

/// Declares the objects listed under the `spineopt_object` category, where
/// the entity column names the object class and the value column the
/// object.
pub fn objects_from_parameters(table: &ParameterTable) -> ImportBatch {
    let mut batch = ImportBatch::new();
    for row in table.rows_in_category("spineopt_object") {
        if let ParameterValue::Text(object_name) = &row.value {
            batch.add_object(&row.entity, object_name);
        }
    }
    batch
}

/// A sheet of named numeric columns, one value per time step. Empty cells
/// read as NaN.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SeriesTable {
    columns: IndexMap<String, Vec<f64>>,
}

impl SeriesTable {
    pub fn from_range(range: &Range<DataType>) -> Result<Self, SourceError> {
        let mut rows = range.rows();
        let header = rows
            .next()
            .ok_or_else(|| SourceError("time series sheet is empty".to_string()))?;
        let names: Vec<Option<String>> = header
            .iter()
            .map(|cell| cell.get_string().map(str::to_string))
            .collect();
        let mut columns: IndexMap<String, Vec<f64>> = names
            .iter()
            .flatten()
            .map(|name| (name.clone(), Vec::new()))
            .collect();
        for row in rows {
            for (position, name) in names.iter().enumerate() {
                let Some(name) = name else {
                    continue;
                };
                let value = row
                    .get(position)
                    .and_then(DataType::get_float)
                    .unwrap_or(f64::NAN);
                columns
                    .get_mut(name)
                    .expect("every named column should have a value vector")
                    .push(value);
            }
        }
        Ok(SeriesTable { columns })
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }
}

/// Keys a column with the supplied time stamps, ready for a time series
/// parameter value.
pub fn series_with_index(values: &[f64], time_index: &[String]) -> IndexMap<String, f64> {
    time_index.iter().cloned().zip(values.iter().copied()).collect()
}

/// An Excel workbook holding parameter and time series sheets.
pub struct ExcelSource {
    workbook: Sheets<BufReader<File>>,
}

impl ExcelSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let workbook = open_workbook_auto(path)
            .map_err(|error| SourceError(format!("cannot open '{}': {}", path.display(), error)))?;
        Ok(ExcelSource { workbook })
    }

    fn sheet_range(&mut self, sheet: &str) -> Result<Range<DataType>, SourceError> {
        self.workbook
            .worksheet_range(sheet)
            .ok_or_else(|| SourceError(format!("no sheet named '{}'", sheet)))?
            .map_err(|error| SourceError(format!("cannot read sheet '{}': {}", sheet, error)))
    }

    pub fn parameter_sheet(&mut self, sheet: &str) -> Result<ParameterTable, SourceError> {
        ParameterTable::from_range(&self.sheet_range(sheet)?)
    }

    pub fn series_sheet(&mut self, sheet: &str) -> Result<SeriesTable, SourceError> {
        SeriesTable::from_range(&self.sheet_range(sheet)?)
    }
}

fn find_column(header: &[DataType], name: &str) -> Result<usize, SourceError> {
    header
        .iter()
        .position(|cell| cell.get_string() == Some(name))
        .ok_or_else(|| SourceError(format!("parameter sheet has no '{}' column", name)))
}

fn cell_value(cell: &DataType) -> Option<ParameterValue> {
    match cell {
        DataType::Float(number) => Some(ParameterValue::Number(*number)),
        DataType::Int(number) => Some(ParameterValue::Number(*number as f64)),
        DataType::String(text) => Some(ParameterValue::Text(text.clone())),
        DataType::Bool(flag) => Some(ParameterValue::Number(f64::from(*flag))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string_cell(text: &str) -> DataType {
        DataType::String(text.to_string())
    }

    fn parameter_range() -> Range<DataType> {
        let mut range = Range::new((0, 0), (4, 2));
        range.set_value((0, 0), string_cell("category"));
        range.set_value((0, 1), string_cell("entity"));
        range.set_value((0, 2), string_cell("value"));
        range.set_value((1, 0), string_cell("spineopt_object"));
        range.set_value((1, 1), string_cell("node"));
        range.set_value((1, 2), string_cell("75FI_BEV_battery"));
        range.set_value((2, 0), string_cell("number_of_cars"));
        range.set_value((2, 1), string_cell("BEV"));
        range.set_value((2, 2), DataType::Float(250000.0));
        range.set_value((3, 0), string_cell("assumption"));
        range.set_value((3, 1), string_cell("Charging_efficiency_BEV"));
        range.set_value((3, 2), DataType::Float(0.9));
        // Rows without a value are ignored.
        range.set_value((4, 0), string_cell("assumption"));
        range.set_value((4, 1), string_cell("unset"));
        range
    }

    #[test]
    fn parameter_lookup_by_category_and_entity() {
        let table = ParameterTable::from_range(&parameter_range())
            .expect("parameter sheet should parse");
        assert_eq!(table.find_number("number_of_cars", "BEV"), Some(250000.0));
        assert_eq!(
            table.find_number("assumption", "Charging_efficiency_BEV"),
            Some(0.9)
        );
        assert_eq!(table.find("assumption", "unset"), None);
        assert_eq!(table.find("number_of_cars", "PHEV"), None);
    }

    #[test]
    fn object_declarations_come_from_the_spineopt_object_category() {
        let table = ParameterTable::from_range(&parameter_range())
            .expect("parameter sheet should parse");
        let batch = objects_from_parameters(&table);
        assert!(batch.has_object("node", "75FI_BEV_battery"));
        assert_eq!(batch.objects.len(), 1);
    }

    #[test]
    fn missing_column_is_an_error() {
        let mut range = Range::new((0, 0), (0, 1));
        range.set_value((0, 0), string_cell("category"));
        range.set_value((0, 1), string_cell("entity"));
        let error = ParameterTable::from_range(&range)
            .expect_err("sheet without a value column should fail");
        assert_eq!(error.to_string(), "parameter sheet has no 'value' column");
    }

    #[test]
    fn series_columns_keep_order_and_fill_gaps_with_nan() {
        let mut range = Range::new((0, 0), (3, 1));
        range.set_value((0, 0), string_cell("CONNECTED"));
        range.set_value((0, 1), string_cell("HOURLY_MILEAGE"));
        range.set_value((1, 0), DataType::Float(0.8));
        range.set_value((1, 1), DataType::Float(1.5));
        range.set_value((2, 0), DataType::Float(0.6));
        range.set_value((3, 0), DataType::Float(0.7));
        range.set_value((3, 1), DataType::Float(2.5));
        let table = SeriesTable::from_range(&range).expect("series sheet should parse");
        let names: Vec<&str> = table.column_names().collect();
        assert_eq!(names, vec!["CONNECTED", "HOURLY_MILEAGE"]);
        assert_eq!(table.column("CONNECTED"), Some(&[0.8, 0.6, 0.7][..]));
        let mileage = table.column("HOURLY_MILEAGE").expect("column should exist");
        assert_eq!(mileage[0], 1.5);
        assert!(mileage[1].is_nan());
        assert_eq!(mileage[2], 2.5);
    }

    #[test]
    fn opening_a_missing_workbook_is_an_error() {
        let temp_dir = tempfile::tempdir()
            .expect("temporary directory creation should be possible");
        let error = ExcelSource::open(&temp_dir.path().join("no_such.xlsx"))
            .err()
            .expect("opening a missing workbook should fail");
        assert!(error.to_string().contains("cannot open"));
    }

    #[test]
    fn series_with_index_pairs_stamps_and_values() {
        let index = vec![
            "2021-01-01 00:00:00".to_string(),
            "2021-01-01 01:00:00".to_string(),
        ];
        let series = series_with_index(&[1.0, 2.0], &index);
        let stamps: Vec<&String> = series.keys().collect();
        assert_eq!(stamps, vec!["2021-01-01 00:00:00", "2021-01-01 01:00:00"]);
        assert_eq!(series["2021-01-01 01:00:00"], 2.0);
    }
}
