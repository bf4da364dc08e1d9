use crate::errors::SourceError;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// One entry of a multidimensional parameter symbol: the full key tuple and
/// the value. The last key dimension is the time step.
#[derive(Clone, Debug, PartialEq)]
pub struct SymbolRecord {
    pub key: Vec<String>,
    pub value: f64,
}

/// Contract of a multidimensional-array source file.
///
/// Mirrors what the GDX reader of the original tool chain exposes; decoding
/// the actual GDX binary format is out of scope, so sources implement this
/// trait over whatever container they have.
pub trait SymbolSource {
    fn keys(&self) -> Vec<String>;
    fn dimension(&self, key: &str) -> Result<usize, SourceError>;
    /// Ordered dimension names, or `None` when the symbol has no declared domain.
    fn domain(&self, key: &str) -> Result<Option<Vec<String>>, SourceError>;
    /// Element tuples of a set-typed symbol.
    fn elements(&self, key: &str) -> Result<Vec<Vec<String>>, SourceError>;
    /// Records of a parameter-typed symbol.
    fn parameter_records(&self, key: &str) -> Result<Vec<SymbolRecord>, SourceError>;
}

/// Maps source dimension names of a known symbol to SpineOpt object classes.
pub fn domain_to_spineopt(key: &str) -> Option<Vec<(&'static str, &'static str)>> {
    match key {
        "ts_influx" => Some(vec![
            ("grid", "commodity"),
            ("node", "node"),
            ("f", "alternative"),
        ]),
        "ts_cf" => Some(vec![
            ("flow", "commodity"),
            ("node", "node"),
            ("f", "alternative"),
        ]),
        _ => None,
    }
}

/// A parameter symbol reshaped so that the time dimension runs along each
/// row: one row per distinct leading key, values in source order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimeSeriesTable {
    pub columns: Vec<String>,
    pub rows: Vec<TimeSeriesRow>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimeSeriesRow {
    pub index: Vec<String>,
    pub values: Vec<f64>,
}

impl TimeSeriesTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }
}

impl TimeSeriesRow {
    pub fn get<'a>(&'a self, table: &TimeSeriesTable, column: &str) -> Option<&'a str> {
        table
            .column_index(column)
            .and_then(|index| self.index.get(index))
            .map(String::as_str)
    }
}

/// Reshapes a time-indexed parameter symbol into a [`TimeSeriesTable`] with
/// its dimensions renamed to SpineOpt object classes.
///
/// Known symbols get their column names from [`domain_to_spineopt`]; for
/// anything else the caller has to supply `domain_in_spine`. The last source
/// dimension is always the time step and does not appear as a column.
pub fn prepare_time_series(
    source: &dyn SymbolSource,
    key: &str,
    domain_in_spine: Option<Vec<String>>,
) -> Result<TimeSeriesTable, SourceError> {
    let dimension = source.dimension(key)?;
    if dimension < 2 {
        return Err(SourceError(format!(
            "symbol '{}' has no index dimensions besides time",
            key
        )));
    }
    let mappings = domain_to_spineopt(key);
    let columns: Vec<String> = match (&mappings, source.domain(key)?) {
        (Some(mappings), Some(domain)) => domain
            .iter()
            .take(dimension - 1)
            .map(|name| {
                mappings
                    .iter()
                    .find(|(from, _)| from == name)
                    .map(|(_, to)| (*to).to_string())
                    .unwrap_or_else(|| name.clone())
            })
            .collect(),
        (Some(mappings), None) => mappings
            .iter()
            .take(dimension - 1)
            .map(|(_, to)| (*to).to_string())
            .collect(),
        (None, _) => domain_in_spine.ok_or_else(|| {
            SourceError(format!(
                "the SpineOpt domain of symbol '{}' needs specifying",
                key
            ))
        })?,
    };
    if columns.len() != dimension - 1 {
        return Err(SourceError(format!(
            "symbol '{}' has {} index dimensions but {} domain names were given",
            key,
            dimension - 1,
            columns.len()
        )));
    }
    let mut groups: IndexMap<Vec<String>, Vec<f64>> = IndexMap::new();
    for record in source.parameter_records(key)? {
        if record.key.len() != dimension {
            return Err(SourceError(format!(
                "record of symbol '{}' has {} key elements, expected {}",
                key,
                record.key.len(),
                dimension
            )));
        }
        let index = record.key[..dimension - 1].to_vec();
        groups.entry(index).or_default().push(record.value);
    }
    Ok(TimeSeriesTable {
        columns,
        rows: groups
            .into_iter()
            .map(|(index, values)| TimeSeriesRow { index, values })
            .collect(),
    })
}

/// A [`SymbolSource`] over a directory of CSV files, one file per symbol.
///
/// The header row names the dimensions; a trailing `value` column marks a
/// parameter symbol, its absence a set.
pub struct CsvSymbolSource {
    dir: PathBuf,
}

impl CsvSymbolSource {
    pub fn new(dir: &Path) -> Self {
        CsvSymbolSource {
            dir: dir.to_path_buf(),
        }
    }

    fn file_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", key))
    }

    fn header(&self, key: &str) -> Result<Vec<String>, SourceError> {
        let path = self.file_path(key);
        if !path.exists() {
            return Err(SourceError(format!(
                "the key '{}' does not exist; keys contained in this database: {:?}",
                key,
                self.keys()
            )));
        }
        let mut reader = csv::Reader::from_path(&path)?;
        let headers = reader.headers()?;
        Ok(headers.iter().map(String::from).collect())
    }

    fn is_parameter(header: &[String]) -> bool {
        header.last().map(String::as_str) == Some("value")
    }
}

impl SymbolSource for CsvSymbolSource {
    fn keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        if let Ok(entries) = std::fs::read_dir(&self.dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().map(|ext| ext == "csv").unwrap_or(false) {
                    if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                        keys.push(stem.to_string());
                    }
                }
            }
        }
        keys.sort();
        keys
    }

    fn dimension(&self, key: &str) -> Result<usize, SourceError> {
        let header = self.header(key)?;
        if Self::is_parameter(&header) {
            Ok(header.len() - 1)
        } else {
            Ok(header.len())
        }
    }

    fn domain(&self, key: &str) -> Result<Option<Vec<String>>, SourceError> {
        let header = self.header(key)?;
        if Self::is_parameter(&header) {
            Ok(Some(header[..header.len() - 1].to_vec()))
        } else {
            Ok(Some(header))
        }
    }

    fn elements(&self, key: &str) -> Result<Vec<Vec<String>>, SourceError> {
        let header = self.header(key)?;
        if Self::is_parameter(&header) {
            return Err(SourceError(format!(
                "symbol '{}' is a parameter, not a set",
                key
            )));
        }
        let mut reader = csv::Reader::from_path(self.file_path(key))?;
        let mut elements = Vec::new();
        for record in reader.records() {
            let record = record?;
            elements.push(record.iter().map(String::from).collect());
        }
        Ok(elements)
    }

    fn parameter_records(&self, key: &str) -> Result<Vec<SymbolRecord>, SourceError> {
        let header = self.header(key)?;
        if !Self::is_parameter(&header) {
            return Err(SourceError(format!(
                "symbol '{}' is a set, not a parameter",
                key
            )));
        }
        let mut reader = csv::Reader::from_path(self.file_path(key))?;
        let mut records = Vec::new();
        for record in reader.records() {
            let record = record?;
            let fields: Vec<&str> = record.iter().collect();
            let (value_field, key_fields) = fields
                .split_last()
                .ok_or_else(|| SourceError(format!("empty record in symbol '{}'", key)))?;
            let value = if value_field.is_empty() {
                f64::NAN
            } else {
                value_field.parse::<f64>().map_err(|_| {
                    SourceError(format!(
                        "invalid value '{}' in symbol '{}'",
                        value_field, key
                    ))
                })?
            };
            records.push(SymbolRecord {
                key: key_fields.iter().map(|field| (*field).to_string()).collect(),
                value,
            });
        }
        Ok(records)
    }
}
