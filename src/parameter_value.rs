use crate::TimeStamp;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Renders a time stamp the way SpineOpt expects them in parameter values.
pub fn format_time_stamp(stamp: &TimeStamp) -> String {
    stamp.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// A parameter value attached to an object or a relationship.
///
/// Plain scalars are stored as such; time series, arrays, date times and
/// durations use the tagged map representation of the Spine database, e.g.
/// `{"type": "time_series", "data": {...}, "index": {"repeat": true}}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Number(f64),
    Text(String),
    Structured(StructuredValue),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StructuredValue {
    TimeSeries {
        data: IndexMap<String, f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<TimeSeriesIndex>,
    },
    Array {
        value_type: String,
        data: Vec<ArrayItem>,
    },
    DateTime {
        data: String,
    },
    Duration {
        data: String,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesIndex {
    pub repeat: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArrayItem {
    Number(f64),
    Text(String),
}

impl ParameterValue {
    pub fn time_series(data: IndexMap<String, f64>, repeat: bool) -> Self {
        ParameterValue::Structured(StructuredValue::TimeSeries {
            data,
            index: Some(TimeSeriesIndex { repeat }),
        })
    }

    pub fn date_time(stamp: &TimeStamp) -> Self {
        ParameterValue::Structured(StructuredValue::DateTime {
            data: format_time_stamp(stamp),
        })
    }

    pub fn duration(data: &str) -> Self {
        ParameterValue::Structured(StructuredValue::Duration {
            data: data.to_owned(),
        })
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ParameterValue::Number(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_time_series(&self) -> Option<&IndexMap<String, f64>> {
        match self {
            ParameterValue::Structured(StructuredValue::TimeSeries { data, .. }) => Some(data),
            _ => None,
        }
    }

    /// A time series with every value multiplied by `factor`; scalars scale
    /// directly, other kinds are returned as they are.
    pub fn scaled(&self, factor: f64) -> ParameterValue {
        match self {
            ParameterValue::Number(x) => ParameterValue::Number(x * factor),
            ParameterValue::Structured(StructuredValue::TimeSeries { data, index }) => {
                ParameterValue::Structured(StructuredValue::TimeSeries {
                    data: data.iter().map(|(k, v)| (k.clone(), v * factor)).collect(),
                    index: index.clone(),
                })
            }
            other => other.clone(),
        }
    }
}

impl From<f64> for ParameterValue {
    fn from(x: f64) -> Self {
        ParameterValue::Number(x)
    }
}

impl From<&str> for ParameterValue {
    fn from(text: &str) -> Self {
        ParameterValue::Text(text.to_owned())
    }
}

impl From<String> for ParameterValue {
    fn from(text: String) -> Self {
        ParameterValue::Text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn scalar_serializes_as_plain_number() {
        let value = ParameterValue::from(100.0);
        let json = serde_json::to_string(&value).expect("serialization should succeed");
        assert_eq!(json, "100.0");
    }

    #[test]
    fn time_series_round_trips_through_json_in_order() {
        let mut data = IndexMap::new();
        data.insert("2021-01-01 01:00:00".to_string(), 2.0);
        data.insert("2021-01-01 00:00:00".to_string(), 1.0);
        data.insert("2021-01-01 02:00:00".to_string(), 3.0);
        let value = ParameterValue::time_series(data, true);
        let json = serde_json::to_string(&value).expect("serialization should succeed");
        assert!(json.starts_with(r#"{"type":"time_series""#));
        let back: ParameterValue =
            serde_json::from_str(&json).expect("deserialization should succeed");
        let series = back.as_time_series().expect("value should be a time series");
        let stamps: Vec<&String> = series.keys().collect();
        assert_eq!(
            stamps,
            vec![
                "2021-01-01 01:00:00",
                "2021-01-01 00:00:00",
                "2021-01-01 02:00:00"
            ]
        );
    }

    #[test]
    fn duration_uses_tagged_representation() {
        let value = ParameterValue::duration("8h");
        let json = serde_json::to_string(&value).expect("serialization should succeed");
        assert_eq!(json, r#"{"type":"duration","data":"8h"}"#);
    }

    #[test]
    fn date_time_formats_like_the_source_data() {
        let stamp = NaiveDate::from_ymd_opt(2021, 1, 1)
            .expect("date should be valid")
            .and_hms_opt(0, 0, 0)
            .expect("time should be valid");
        let value = ParameterValue::date_time(&stamp);
        let json = serde_json::to_string(&value).expect("serialization should succeed");
        assert_eq!(json, r#"{"type":"date_time","data":"2021-01-01 00:00:00"}"#);
    }

    #[test]
    fn scaling_a_time_series_scales_every_value() {
        let mut data = IndexMap::new();
        data.insert("2021-01-01 00:00:00".to_string(), 2.0);
        data.insert("2021-01-01 01:00:00".to_string(), -4.0);
        let value = ParameterValue::time_series(data, false);
        let scaled = value.scaled(1.5);
        let series = scaled.as_time_series().expect("value should be a time series");
        assert_eq!(series["2021-01-01 00:00:00"], 3.0);
        assert_eq!(series["2021-01-01 01:00:00"], -6.0);
    }

    #[test]
    fn scaling_a_scalar_multiplies_it() {
        assert_eq!(
            ParameterValue::from(100.0).scaled(0.5).as_number(),
            Some(50.0)
        );
    }
}
