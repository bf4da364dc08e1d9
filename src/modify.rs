use crate::errors::SourceError;
use crate::import_batch::{Alternative, ImportBatch};
use crate::parameter_value::ParameterValue;

fn required_number(
    value: Option<&ParameterValue>,
    entity: &str,
    parameter: &str,
    alternative: &str,
) -> Result<f64, SourceError> {
    value.and_then(ParameterValue::as_number).ok_or_else(|| {
        SourceError(format!(
            "no numeric '{}' for '{}' under alternative '{}'",
            parameter, entity, alternative
        ))
    })
}

/// Adapts the start up related costs of a unit linearly per change of unit
/// capacity.
///
/// Looks the original values up in the exported dataset and returns a batch
/// that overrides them under `new_alternative`. When the unit participates
/// in a user constraint, `unit_constraint` names it so its started-up
/// coefficient is rescaled as well.
#[allow(clippy::too_many_arguments)]
pub fn adapt_start_up_costs_of_units(
    dataset: &ImportBatch,
    unit_name: &str,
    demand_node_name: &str,
    new_total_capacity: f64,
    new_number_of_units: f64,
    unit_constraint: Option<&str>,
    search_alternative: &str,
    new_alternative: &str,
) -> Result<ImportBatch, SourceError> {
    let mut batch = ImportBatch::new();
    if new_alternative != search_alternative {
        batch.add_alternative(Alternative::new(new_alternative));
    }

    let original_unit_capacity = required_number(
        dataset.find_relationship_value(
            "unit__to_node",
            &[unit_name, demand_node_name],
            "unit_capacity",
            search_alternative,
        ),
        unit_name,
        "unit_capacity",
        search_alternative,
    )?;
    let original_start_up_cost = required_number(
        dataset.find_object_value("unit", unit_name, "start_up_cost", search_alternative),
        unit_name,
        "start_up_cost",
        search_alternative,
    )?;

    let new_unit_capacity = new_total_capacity / new_number_of_units;
    let new_start_up_cost = new_unit_capacity / original_unit_capacity * original_start_up_cost;
    batch.add_object_value(
        "unit",
        unit_name,
        "start_up_cost",
        new_start_up_cost.into(),
        Some(new_alternative),
    );
    batch.add_object_value(
        "unit",
        unit_name,
        "number_of_units",
        new_number_of_units.into(),
        Some(new_alternative),
    );

    if let Some(unit_constraint) = unit_constraint {
        let original_coefficient = required_number(
            dataset.find_relationship_value(
                "unit__unit_constraint",
                &[unit_name, unit_constraint],
                "units_started_up_coefficient",
                search_alternative,
            ),
            unit_name,
            "units_started_up_coefficient",
            search_alternative,
        )?;
        let new_coefficient = new_unit_capacity / original_unit_capacity * original_coefficient;
        batch.add_relationship_value(
            "unit__unit_constraint",
            &[unit_name, unit_constraint],
            "units_started_up_coefficient",
            new_coefficient.into(),
            Some(new_alternative),
        );
    }
    Ok(batch)
}

/// Rescales the generation capacity of a unit to a new total.
///
/// The unit capacity is the total divided by the number of units, which is
/// either the given new count or the original one. A new count also renews
/// `fix_units_on` when the original database fixes it. The demand series of
/// the unit's source flow node, when one is named, is scaled by the ratio
/// of the new and original total capacities.
#[allow(clippy::too_many_arguments)]
pub fn modify_generation_capacity_of_units(
    dataset: &ImportBatch,
    unit_name: &str,
    demand_node_name: &str,
    new_total_capacity: f64,
    new_number_of_units: Option<f64>,
    source_node_name: Option<&str>,
    search_alternative: &str,
    new_alternative: &str,
) -> Result<ImportBatch, SourceError> {
    let mut batch = ImportBatch::new();
    if new_alternative != search_alternative {
        batch.add_alternative(Alternative::new(new_alternative));
    }

    let original_number_of_units = required_number(
        dataset.find_object_value("unit", unit_name, "number_of_units", search_alternative),
        unit_name,
        "number_of_units",
        search_alternative,
    )?;
    let original_unit_capacity = required_number(
        dataset.find_relationship_value(
            "unit__to_node",
            &[unit_name, demand_node_name],
            "unit_capacity",
            search_alternative,
        ),
        unit_name,
        "unit_capacity",
        search_alternative,
    )?;
    let original_total_capacity = original_unit_capacity * original_number_of_units;

    let number_of_units = match new_number_of_units {
        Some(count) => {
            let fixed = dataset
                .find_object_value("unit", unit_name, "fix_units_on", search_alternative)
                .is_some();
            if fixed {
                batch.add_object_value(
                    "unit",
                    unit_name,
                    "fix_units_on",
                    count.into(),
                    Some(new_alternative),
                );
            }
            count
        }
        None => original_number_of_units,
    };
    let unit_capacity = new_total_capacity / number_of_units;

    if let Some(source_node_name) = source_node_name {
        let original_source_flow = dataset
            .find_object_value("node", source_node_name, "demand", search_alternative)
            .filter(|value| value.as_time_series().is_some())
            .ok_or_else(|| {
                SourceError(format!(
                    "no demand time series for '{}' under alternative '{}'",
                    source_node_name, search_alternative
                ))
            })?;
        batch.add_object_value(
            "node",
            source_node_name,
            "demand",
            original_source_flow.scaled(new_total_capacity / original_total_capacity),
            Some(new_alternative),
        );
    }

    batch.add_object_value(
        "unit",
        unit_name,
        "number_of_units",
        number_of_units.into(),
        Some(new_alternative),
    );
    batch.add_relationship_value(
        "unit__to_node",
        &[unit_name, demand_node_name],
        "unit_capacity",
        unit_capacity.into(),
        Some(new_alternative),
    );
    Ok(batch)
}
