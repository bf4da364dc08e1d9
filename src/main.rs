use backbone2spine::import_batch::{Alternative, ImportBatch, Scenario};
use backbone2spine::io_config;
use backbone2spine::model_structure::{
    build_scenario, default_model_structure, default_report_output, model_horizon_alternatives,
    set_scenarios, temporal_alternative,
};
use backbone2spine::store::Database;
use backbone2spine::BASE_ALTERNATIVE;

const MODEL_NAME: &str = "CS_B3_75FI_excl_hydro_and_reserves";
// Storage nodes and fuel production units built by the PtX conversion.
const STORAGE_NODES: [&str; 2] = ["PtL_H2_tank", "PtL_gasoline_tank"];
const FUEL_UNITS: [&str; 1] = ["PtL_gasoline_production"];

const TRANSPORT_ALTERNATIVES: [&str; 3] = ["no_transport", "transport_low_EV", "transport_all_EV"];
const DISCHARGE_ALTERNATIVES: [&str; 2] = ["no_flex_discharge", "all_flex_discharge"];
const PTL_ALTERNATIVES: [&str; 2] = ["no_PtL", "PtL_power_to_gasoline"];

fn main() {
    let arguments = io_config::get_arguments("spineopt_structure");
    let mut db = io_config::open_spinedb(&arguments.output_db, arguments.create);
    if let Some(json_path) = &arguments.json_path {
        io_config::import_json(json_path, &mut db);
    }

    println!("Building the default model structure. . .");
    default_model_structure(MODEL_NAME, &Alternative::new(BASE_ALTERNATIVE)).import_data(&mut db);

    let (temporal_batch, temporal_alt) =
        temporal_alternative(MODEL_NAME, &STORAGE_NODES, &FUEL_UNITS);
    temporal_batch.import_data(&mut db);

    let (horizon_batch, horizon_alt_1, horizon_alt_2) = model_horizon_alternatives(MODEL_NAME);
    horizon_batch.import_data(&mut db);

    println!("Building scenarios. . .");
    set_scenarios(scenario_grid(&horizon_alt_1, &horizon_alt_2, &temporal_alt))
        .import_data(&mut db);

    // The report is bound to whatever model object the store now holds.
    let dataset = db.export_dataset();
    let model_name = dataset
        .objects
        .iter()
        .find(|object| object.class_name == "model")
        .map(|object| object.name.clone());
    default_report_output(model_name.as_deref()).import_data(&mut db);
}

/// The core scenarios: the plain energy system plus every combination of
/// transport electrification, flexible discharge, power-to-liquids and
/// model horizon.
fn scenario_grid(
    horizon_alt_1: &str,
    horizon_alt_2: &str,
    temporal_alt: &str,
) -> Vec<ImportBatch> {
    let category_alternatives: Vec<Alternative> = TRANSPORT_ALTERNATIVES
        .iter()
        .chain(DISCHARGE_ALTERNATIVES.iter())
        .chain(PTL_ALTERNATIVES.iter())
        .map(|name| Alternative::new(name))
        .collect();
    let mut scenarios = vec![build_scenario(
        Scenario::new("Base_energy_system", true, Some("electricity and heat only")),
        &[BASE_ALTERNATIVE, "no_transport", "no_flex_discharge", "no_PtL"],
        &category_alternatives,
    )];
    for horizon_alt in [horizon_alt_1, horizon_alt_2] {
        for &transport_alt in &TRANSPORT_ALTERNATIVES[1..] {
            for discharge_alt in DISCHARGE_ALTERNATIVES {
                for ptl_alt in PTL_ALTERNATIVES {
                    let fleet = transport_alt
                        .strip_prefix("transport_")
                        .unwrap_or(transport_alt);
                    let name = format!("{}__{}__{}__{}", fleet, discharge_alt, ptl_alt, horizon_alt);
                    scenarios.push(build_scenario(
                        Scenario::new(&name, true, None),
                        &[BASE_ALTERNATIVE, transport_alt, discharge_alt, ptl_alt, horizon_alt],
                        &[],
                    ));
                    // Power-to-liquids scenarios get a low resolution variant.
                    if ptl_alt != "no_PtL" {
                        scenarios.push(build_scenario(
                            Scenario::new(&format!("{}__{}", name, temporal_alt), true, None),
                            &[
                                BASE_ALTERNATIVE,
                                transport_alt,
                                discharge_alt,
                                ptl_alt,
                                horizon_alt,
                                temporal_alt,
                            ],
                            &[],
                        ));
                    }
                }
            }
        }
    }
    scenarios
}
