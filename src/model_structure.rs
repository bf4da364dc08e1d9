use crate::import_batch::{Alternative, ImportBatch, Scenario, ScenarioAlternative};
use crate::parameter_value::ParameterValue;
use crate::BASE_ALTERNATIVE;
use chrono::NaiveDate;

fn date_time_value(year: i32, month: u32, day: u32) -> ParameterValue {
    let stamp = NaiveDate::from_ymd_opt(year, month, day)
        .expect("model horizon dates should be valid")
        .and_hms_opt(0, 0, 0)
        .expect("midnight should be a valid time");
    ParameterValue::date_time(&stamp)
}

/// Creates the model object and the default stochastic and temporal
/// structures of a SpineOpt model under the given alternative.
pub fn default_model_structure(model_name: &str, alternative: &Alternative) -> ImportBatch {
    let stochastic_scenario = "deterministic";
    let stochastic_structure = "default";
    let temporal_block_1 = "tb1_core";
    let temporal_block_2 = "tb2_look_ahead";

    let mut batch = ImportBatch::new();
    if alternative.name != BASE_ALTERNATIVE {
        batch.add_alternative(alternative.clone());
    }
    let alt = Some(alternative.name.as_str());

    batch.add_object("model", model_name);
    batch.add_object("stochastic_scenario", stochastic_scenario);
    batch.add_object("stochastic_structure", stochastic_structure);
    batch.add_object("temporal_block", temporal_block_1);
    batch.add_object("temporal_block", temporal_block_2);

    batch.add_object_value("model", model_name, "duration_unit", "hour".into(), alt);
    batch.add_object_value(
        "model",
        model_name,
        "model_start",
        date_time_value(2021, 1, 1),
        alt,
    );
    batch.add_object_value(
        "model",
        model_name,
        "model_end",
        date_time_value(2021, 12, 30),
        alt,
    );
    batch.add_object_value(
        "model",
        model_name,
        "roll_forward",
        ParameterValue::duration("8h"),
        alt,
    );
    for (block, start, end, resolution) in [
        (temporal_block_1, "0h", "1D", "1h"),
        (temporal_block_2, "1D", "2D", "8h"),
    ] {
        batch.add_object_value(
            "temporal_block",
            block,
            "block_start",
            ParameterValue::duration(start),
            alt,
        );
        batch.add_object_value(
            "temporal_block",
            block,
            "block_end",
            ParameterValue::duration(end),
            alt,
        );
        batch.add_object_value(
            "temporal_block",
            block,
            "resolution",
            ParameterValue::duration(resolution),
            alt,
        );
    }

    batch.add_relationship(
        "model__default_stochastic_structure",
        &[model_name, stochastic_structure],
    );
    batch.add_relationship(
        "model__default_temporal_block",
        &[model_name, temporal_block_1],
    );
    batch.add_relationship(
        "model__default_temporal_block",
        &[model_name, temporal_block_2],
    );
    batch.add_relationship("model__stochastic_structure", &[model_name, stochastic_structure]);
    batch.add_relationship("model__temporal_block", &[model_name, temporal_block_1]);
    batch.add_relationship("model__temporal_block", &[model_name, temporal_block_2]);
    batch.add_relationship(
        "stochastic_structure__stochastic_scenario",
        &[stochastic_structure, stochastic_scenario],
    );

    batch.add_relationship_value(
        "stochastic_structure__stochastic_scenario",
        &[stochastic_structure, stochastic_scenario],
        "weight_relative_to_parents",
        1.0.into(),
        alt,
    );
    batch
}

/// Alternatives that narrow the model horizon to January or July.
pub fn model_horizon_alternatives(model_name: &str) -> (ImportBatch, String, String) {
    let alternative_1 = "Jan";
    let alternative_2 = "Jul";

    let mut batch = ImportBatch::new();
    batch.add_alternative(Alternative::new(alternative_1));
    batch.add_alternative(Alternative::new(alternative_2));
    batch.add_object("model", model_name);
    batch.add_object_value(
        "model",
        model_name,
        "model_start",
        date_time_value(2021, 1, 1),
        Some(alternative_1),
    );
    batch.add_object_value(
        "model",
        model_name,
        "model_end",
        date_time_value(2021, 2, 1),
        Some(alternative_1),
    );
    batch.add_object_value(
        "model",
        model_name,
        "model_start",
        date_time_value(2021, 7, 1),
        Some(alternative_2),
    );
    batch.add_object_value(
        "model",
        model_name,
        "model_end",
        date_time_value(2021, 8, 1),
        Some(alternative_2),
    );
    (batch, alternative_1.to_string(), alternative_2.to_string())
}

/// Fuel temporal blocks plus a low-resolution alternative for them; the
/// given nodes and units are attached to the blocks.
pub fn temporal_alternative(
    model_name: &str,
    nodes: &[&str],
    units: &[&str],
) -> (ImportBatch, String) {
    let temporal_block_1 = "tb3_fuel";
    let temporal_block_2 = "tb4_fuel_look_ahead";
    let alternative = Some(BASE_ALTERNATIVE);
    let active_alternative = "low_resolution";

    let mut batch = ImportBatch::new();
    batch.add_alternative(Alternative::with_description(
        active_alternative,
        "for PtL nodes with storage",
    ));

    batch.add_object("model", model_name);
    batch.add_object("temporal_block", temporal_block_1);
    batch.add_object("temporal_block", temporal_block_2);

    for (block, start, end, resolution, active_resolution) in [
        (temporal_block_1, "0h", "1D", "1h", "8h"),
        (temporal_block_2, "1D", "2D", "8h", "1D"),
    ] {
        batch.add_object_value(
            "temporal_block",
            block,
            "block_start",
            ParameterValue::duration(start),
            alternative,
        );
        batch.add_object_value(
            "temporal_block",
            block,
            "block_end",
            ParameterValue::duration(end),
            alternative,
        );
        batch.add_object_value(
            "temporal_block",
            block,
            "resolution",
            ParameterValue::duration(resolution),
            alternative,
        );
        batch.add_object_value(
            "temporal_block",
            block,
            "resolution",
            ParameterValue::duration(active_resolution),
            Some(active_alternative),
        );
    }

    batch.add_relationship("model__temporal_block", &[model_name, temporal_block_1]);
    batch.add_relationship("model__temporal_block", &[model_name, temporal_block_2]);
    for &node in nodes {
        batch.add_relationship("node__temporal_block", &[node, temporal_block_1]);
        batch.add_relationship("node__temporal_block", &[node, temporal_block_2]);
    }
    for &unit in units {
        batch.add_relationship("units_on__temporal_block", &[unit, temporal_block_1]);
        batch.add_relationship("units_on__temporal_block", &[unit, temporal_block_2]);
    }
    (batch, active_alternative.to_string())
}

const VARIABLE_OUTPUTS: [&str; 18] = [
    "unit_flow",
    "units_started_up",
    "units_shut_down",
    "units_available",
    "units_on",
    "connection_flow",
    "node_state",
    "node_slack_pos",
    "node_slack_neg",
    "node_injection",
    "units_mothballed",
    "unit_flow_op",
    "units_invested",
    "nonspin_ramp_up_unit_flow",
    "start_up_unit_flow",
    "units_invested_available",
    "ramp_up_unit_flow",
    "nonspin_units_started_up",
];

const OBJECTIVE_TERM_OUTPUTS: [&str; 15] = [
    "total_costs",
    "variable_om_costs",
    "fixed_om_costs",
    "taxes",
    "operating_costs",
    "fuel_costs",
    "unit_investment_costs",
    "connection_investment_costs",
    "storage_investment_costs",
    "start_up_costs",
    "shut_down_costs",
    "objective_penalties",
    "connection_flow_costs",
    "renewable_curtailment_costs",
    "ramp_costs",
];

/// The standard reports: one over all variables, one over all objective
/// terms, optionally bound to a model.
pub fn default_report_output(model_name: Option<&str>) -> ImportBatch {
    let mut batch = ImportBatch::new();
    for output in VARIABLE_OUTPUTS.iter().chain(OBJECTIVE_TERM_OUTPUTS.iter()) {
        batch.add_object("output", output);
    }
    batch.add_object("report", "all_objective_terms");
    batch.add_object("report", "all_variables");
    for output in OBJECTIVE_TERM_OUTPUTS {
        batch.add_relationship("report__output", &["all_objective_terms", output]);
    }
    for output in VARIABLE_OUTPUTS {
        batch.add_relationship("report__output", &["all_variables", output]);
    }
    if let Some(model_name) = model_name {
        batch.add_relationship("model__report", &[model_name, "all_objective_terms"]);
        batch.add_relationship("model__report", &[model_name, "all_variables"]);
    }
    batch
}

/// Builds a scenario with its affiliated alternatives.
///
/// The alternatives are ranked in the given order; the rightmost one
/// prioritises over the others in parameter values. Alternatives listed in
/// `alternatives_to_be_created` are declared by the batch as well.
pub fn build_scenario(
    scenario: Scenario,
    affiliated_alternatives: &[&str],
    alternatives_to_be_created: &[Alternative],
) -> ImportBatch {
    let mut batch = ImportBatch::new();
    let scenario_name = scenario.name.clone();
    batch.scenarios.push(scenario);
    for alternative in alternatives_to_be_created {
        batch.add_alternative(alternative.clone());
    }
    for alternative in affiliated_alternatives {
        batch
            .scenario_alternatives
            .push(ScenarioAlternative::new(&scenario_name, alternative));
    }
    batch
}

/// Folds independently built scenario batches into one.
pub fn set_scenarios<I>(scenarios: I) -> ImportBatch
where
    I: IntoIterator<Item = ImportBatch>,
{
    scenarios
        .into_iter()
        .fold(ImportBatch::new(), |combined, scenario| combined + scenario)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_structure_skips_base_alternative_record() {
        let batch = default_model_structure("CS_B3", &Alternative::new("Base"));
        assert!(batch.alternatives.is_empty());
        assert!(batch.has_object("model", "CS_B3"));
        assert!(batch.has_object("temporal_block", "tb1_core"));
        assert_eq!(batch.relationships.len(), 7);
        assert_eq!(
            batch
                .find_object_value("model", "CS_B3", "duration_unit", "Base")
                .cloned(),
            Some(ParameterValue::Text("hour".to_string()))
        );
        assert_eq!(
            batch
                .find_relationship_value(
                    "stochastic_structure__stochastic_scenario",
                    &["default", "deterministic"],
                    "weight_relative_to_parents",
                    "Base"
                )
                .and_then(ParameterValue::as_number),
            Some(1.0)
        );
    }

    #[test]
    fn non_base_alternative_is_declared_and_scopes_all_values() {
        let batch = default_model_structure("CS_B3", &Alternative::new("sensitivity"));
        assert_eq!(batch.alternatives, vec![Alternative::new("sensitivity")]);
        assert!(batch
            .object_parameter_values
            .iter()
            .all(|record| record.alternative_or_base() == "sensitivity"));
    }

    #[test]
    fn horizon_alternatives_scope_start_and_end() {
        let (batch, jan, jul) = model_horizon_alternatives("CS_B3");
        assert_eq!(jan, "Jan");
        assert_eq!(jul, "Jul");
        assert_eq!(batch.alternatives.len(), 2);
        assert!(batch.find_object_value("model", "CS_B3", "model_start", "Jan").is_some());
        assert!(batch.find_object_value("model", "CS_B3", "model_end", "Jul").is_some());
        assert!(batch
            .find_object_value("model", "CS_B3", "model_start", "Base")
            .is_none());
    }

    #[test]
    fn temporal_alternative_attaches_nodes_and_units() {
        let (batch, active) =
            temporal_alternative("CS_B3", &["PtL_H2_tank"], &["PtL_gasoline_production"]);
        assert_eq!(active, "low_resolution");
        assert!(batch.relationships.iter().any(|relationship| {
            relationship.class_name == "node__temporal_block"
                && relationship.members == ["PtL_H2_tank", "tb3_fuel"]
        }));
        assert!(batch.relationships.iter().any(|relationship| {
            relationship.class_name == "units_on__temporal_block"
                && relationship.members == ["PtL_gasoline_production", "tb4_fuel_look_ahead"]
        }));
        // Base resolution plus the low resolution override per block.
        let resolutions: Vec<&str> = batch
            .object_parameter_values
            .iter()
            .filter(|record| record.parameter_name == "resolution")
            .map(|record| record.alternative_or_base())
            .collect();
        assert_eq!(resolutions, vec!["Base", "low_resolution", "Base", "low_resolution"]);
    }

    #[test]
    fn report_outputs_cover_variables_and_objective_terms() {
        let batch = default_report_output(Some("CS_B3"));
        assert_eq!(batch.objects.len(), 33 + 2);
        let variable_links = batch
            .relationships
            .iter()
            .filter(|relationship| {
                relationship.class_name == "report__output"
                    && relationship.members[0] == "all_variables"
            })
            .count();
        assert_eq!(variable_links, 18);
        let objective_links = batch
            .relationships
            .iter()
            .filter(|relationship| {
                relationship.class_name == "report__output"
                    && relationship.members[0] == "all_objective_terms"
            })
            .count();
        assert_eq!(objective_links, 15);
        assert!(batch.relationships.iter().any(|relationship| {
            relationship.class_name == "model__report"
                && relationship.members == ["CS_B3", "all_variables"]
        }));
    }

    #[test]
    fn scenario_alternatives_keep_their_rank() {
        let batch = build_scenario(
            Scenario::new("Base_energy_system", true, Some("electricity and heat only")),
            &["Base", "no_transport", "no_PtL"],
            &[Alternative::new("no_transport"), Alternative::new("no_PtL")],
        );
        assert_eq!(batch.scenarios.len(), 1);
        assert_eq!(batch.alternatives.len(), 2);
        let order: Vec<&str> = batch
            .scenario_alternatives
            .iter()
            .map(|record| record.alternative_name.as_str())
            .collect();
        assert_eq!(order, vec!["Base", "no_transport", "no_PtL"]);
    }

    #[test]
    fn set_scenarios_folds_batches_in_order() {
        let first = build_scenario(Scenario::new("S1", true, None), &["Base"], &[]);
        let second = build_scenario(Scenario::new("S2", false, None), &["Base"], &[]);
        let combined = set_scenarios([first, second]);
        let names: Vec<&str> = combined
            .scenarios
            .iter()
            .map(|scenario| scenario.name.as_str())
            .collect();
        assert_eq!(names, vec!["S1", "S2"]);
        assert_eq!(combined.scenario_alternatives.len(), 2);
    }
}
