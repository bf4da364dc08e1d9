use crate::errors::SourceError;
use crate::import_batch::ImportBatch;
use crate::parameter_value::ParameterValue;
use crate::symbols::{prepare_time_series, SymbolSource};
use indexmap::IndexMap;

/// Converts a time-indexed inflow symbol into node demand records.
///
/// Rows whose commodity and node do not contain the given names are skipped.
/// Values are negated (inflow is negative demand), values at or below the
/// `minima` threshold in magnitude are zeroed, missing values become 0.0,
/// and the series of the `f00` forecast (or `f01` when no `f00` exists) is
/// duplicated into the implicit Base alternative.
pub fn influx_to_demand(
    source: &dyn SymbolSource,
    key: &str,
    commodity: &str,
    node: &str,
    time_index: &[String],
    domain_in_spine: Option<Vec<String>>,
    minima: Option<f64>,
) -> Result<ImportBatch, SourceError> {
    demand_from_time_series(source, key, commodity, node, time_index, 1.0, domain_in_spine, minima)
}

/// Converts a capacity-factor symbol into source-node demand records.
///
/// Same rules as [`influx_to_demand`] with every value additionally scaled
/// by the total capacity (unit capacity times number of units) feeding the
/// source node.
pub fn capacity_factor_to_demand(
    source: &dyn SymbolSource,
    key: &str,
    commodity: &str,
    node: &str,
    time_index: &[String],
    total_capacity: f64,
    domain_in_spine: Option<Vec<String>>,
    minima: Option<f64>,
) -> Result<ImportBatch, SourceError> {
    demand_from_time_series(
        source,
        key,
        commodity,
        node,
        time_index,
        total_capacity,
        domain_in_spine,
        minima,
    )
}

#[allow(clippy::too_many_arguments)]
fn demand_from_time_series(
    source: &dyn SymbolSource,
    key: &str,
    commodity: &str,
    node: &str,
    time_index: &[String],
    scale: f64,
    domain_in_spine: Option<Vec<String>>,
    minima: Option<f64>,
) -> Result<ImportBatch, SourceError> {
    let table = prepare_time_series(source, key, domain_in_spine)?;
    let mut batch = ImportBatch::new();
    let has_base_alternative = table
        .rows
        .iter()
        .any(|row| row.get(&table, "alternative") == Some("f00"));
    for row in &table.rows {
        let row_commodity = row.get(&table, "commodity").ok_or_else(|| {
            SourceError(format!("symbol '{}' has no commodity dimension", key))
        })?;
        let row_node = row
            .get(&table, "node")
            .ok_or_else(|| SourceError(format!("symbol '{}' has no node dimension", key)))?;
        let row_alternative = row.get(&table, "alternative").ok_or_else(|| {
            SourceError(format!("symbol '{}' has no alternative dimension", key))
        })?;
        if !row_commodity.contains(commodity) || !row_node.contains(node) {
            continue;
        }
        let row_commodity = row_commodity.to_owned();
        let row_node = row_node.to_owned();
        let row_alternative = row_alternative.to_owned();
        batch.add_object_unique("commodity", &row_commodity);
        batch.add_object_unique("node", &row_node);
        batch.add_alternative_unique(&row_alternative);
        // The records of a series may start with padding; skip it and assume
        // all series of the symbol are equally long.
        let values = row
            .values
            .iter()
            .skip_while(|value| value.is_nan())
            .map(|value| {
                let mut value = -value * scale;
                if value.is_nan() {
                    value = 0.0;
                }
                if let Some(minima) = minima {
                    if value.abs() <= minima {
                        value = 0.0;
                    }
                }
                value
            });
        let series: IndexMap<String, f64> = time_index.iter().cloned().zip(values).collect();
        let is_base_copy = (has_base_alternative && row_alternative == "f00")
            || (!has_base_alternative && row_alternative == "f01");
        if is_base_copy {
            // A copy of f00 is set to be the Base alternative, f01 otherwise.
            batch.add_object_value(
                "node",
                &row_node,
                "demand",
                ParameterValue::time_series(series.clone(), true),
                None,
            );
        }
        batch.add_object_value(
            "node",
            &row_node,
            "demand",
            ParameterValue::time_series(series, true),
            Some(&row_alternative),
        );
        batch.add_relationship("node__commodity", &[&row_node, &row_commodity]);
    }
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::tests::StubSource;
    use crate::symbols::SymbolRecord;
    use std::collections::BTreeMap;

    fn record(key: &[&str], value: f64) -> SymbolRecord {
        SymbolRecord {
            key: key.iter().map(|part| (*part).to_string()).collect(),
            value,
        }
    }

    fn influx_source(records: Vec<SymbolRecord>) -> StubSource {
        let mut map = BTreeMap::new();
        map.insert("ts_influx".to_string(), records);
        StubSource {
            domain: Some(vec![
                "grid".to_string(),
                "node".to_string(),
                "f".to_string(),
                "t".to_string(),
            ]),
            records: map,
        }
    }

    fn time_index() -> Vec<String> {
        vec![
            "2021-01-01 00:00:00".to_string(),
            "2021-01-01 01:00:00".to_string(),
        ]
    }

    #[test]
    fn forecast_f00_is_copied_to_base_alternative() {
        let source = influx_source(vec![
            record(&["elec", "75FI", "f00", "t000001"], 10.0),
            record(&["elec", "75FI", "f00", "t000002"], 20.0),
            record(&["elec", "75FI", "f01", "t000001"], 30.0),
            record(&["elec", "75FI", "f01", "t000002"], 40.0),
        ]);
        let batch = influx_to_demand(&source, "ts_influx", "elec", "75FI", &time_index(), None, None)
            .expect("conversion should succeed");
        // f00 contributes a Base copy and its own alternative, f01 only itself.
        assert_eq!(batch.object_parameter_values.len(), 3);
        let base = batch
            .find_object_value("node", "75FI", "demand", "Base")
            .and_then(|value| value.as_time_series())
            .expect("Base demand should exist");
        assert_eq!(base["2021-01-01 00:00:00"], -10.0);
        let f01 = batch
            .find_object_value("node", "75FI", "demand", "f01")
            .and_then(|value| value.as_time_series())
            .expect("f01 demand should exist");
        assert_eq!(f01["2021-01-01 01:00:00"], -40.0);
        assert!(batch.has_object("commodity", "elec"));
        assert!(batch.has_object("node", "75FI"));
        assert!(batch.has_alternative("f00"));
        assert!(batch.has_alternative("f01"));
    }

    #[test]
    fn f01_becomes_base_when_f00_is_missing() {
        let source = influx_source(vec![
            record(&["elec", "75FI", "f01", "t000001"], 10.0),
            record(&["elec", "75FI", "f01", "t000002"], 20.0),
        ]);
        let batch = influx_to_demand(&source, "ts_influx", "elec", "75FI", &time_index(), None, None)
            .expect("conversion should succeed");
        assert!(batch
            .find_object_value("node", "75FI", "demand", "Base")
            .is_some());
        assert!(batch
            .find_object_value("node", "75FI", "demand", "f01")
            .is_some());
    }

    #[test]
    fn rows_of_other_nodes_are_skipped() {
        let source = influx_source(vec![
            record(&["elec", "75FI", "f00", "t000001"], 10.0),
            record(&["elec", "74FI", "f00", "t000001"], 99.0),
            record(&["heat", "75FI_heat", "f00", "t000001"], 5.0),
        ]);
        let batch = influx_to_demand(&source, "ts_influx", "elec", "75FI", &time_index(), None, None)
            .expect("conversion should succeed");
        assert!(batch.has_object("node", "75FI"));
        assert!(!batch.has_object("node", "74FI"));
        assert!(!batch.has_object("node", "75FI_heat"));
    }

    #[test]
    fn small_values_are_clamped_and_gaps_filled_with_zero() {
        let source = influx_source(vec![
            record(&["elec", "75FI", "f00", "t000001"], 1e-7),
            record(&["elec", "75FI", "f00", "t000002"], f64::NAN),
        ]);
        let batch = influx_to_demand(
            &source,
            "ts_influx",
            "elec",
            "75FI",
            &time_index(),
            None,
            Some(1e-6),
        )
        .expect("conversion should succeed");
        let base = batch
            .find_object_value("node", "75FI", "demand", "Base")
            .and_then(|value| value.as_time_series())
            .expect("Base demand should exist");
        assert_eq!(base["2021-01-01 00:00:00"], 0.0);
        assert_eq!(base["2021-01-01 01:00:00"], 0.0);
    }

    #[test]
    fn series_keys_follow_the_supplied_time_index() {
        let source = influx_source(vec![
            record(&["elec", "75FI", "f00", "t000001"], 1.0),
            record(&["elec", "75FI", "f00", "t000002"], 2.0),
        ]);
        let batch = influx_to_demand(&source, "ts_influx", "elec", "75FI", &time_index(), None, None)
            .expect("conversion should succeed");
        let base = batch
            .find_object_value("node", "75FI", "demand", "Base")
            .and_then(|value| value.as_time_series())
            .expect("Base demand should exist");
        let stamps: Vec<&String> = base.keys().collect();
        assert_eq!(stamps, vec!["2021-01-01 00:00:00", "2021-01-01 01:00:00"]);
    }

    #[test]
    fn capacity_factors_scale_with_total_capacity() {
        let mut map = BTreeMap::new();
        map.insert(
            "ts_cf".to_string(),
            vec![
                record(&["PV", "source_75FI_PV", "f00", "t000001"], 0.25),
                record(&["PV", "source_75FI_PV", "f00", "t000002"], 0.5),
            ],
        );
        let source = StubSource {
            domain: Some(vec![
                "flow".to_string(),
                "node".to_string(),
                "f".to_string(),
                "t".to_string(),
            ]),
            records: map,
        };
        let batch = capacity_factor_to_demand(
            &source,
            "ts_cf",
            "PV",
            "source_75FI_PV",
            &time_index(),
            1000.0,
            None,
            None,
        )
        .expect("conversion should succeed");
        let base = batch
            .find_object_value("node", "source_75FI_PV", "demand", "Base")
            .and_then(|value| value.as_time_series())
            .expect("Base demand should exist");
        assert_eq!(base["2021-01-01 00:00:00"], -250.0);
        assert_eq!(base["2021-01-01 01:00:00"], -500.0);
    }
}
