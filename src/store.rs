use crate::errors::{ImportRejection, StoreError};
use crate::import_batch::{
    Alternative, ImportBatch, Object, ObjectGroup, ObjectParameterValue, Relationship,
    RelationshipParameterValue, Scenario, ScenarioAlternative, ToolFeatureMethod,
};

/// Result of one typed import call: accepted-record count plus rejections.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImportOutcome {
    pub imported: usize,
    pub rejections: Vec<ImportRejection>,
}

impl ImportOutcome {
    pub fn accepted(imported: usize) -> Self {
        ImportOutcome {
            imported,
            rejections: Vec::new(),
        }
    }
}

/// Contract of the destination store.
///
/// Each typed operation takes an ordered sequence of records and reports how
/// many were accepted together with the rejections; nothing is durable until
/// `commit` succeeds.
pub trait Database {
    fn import_alternatives(&mut self, alternatives: &[Alternative]) -> ImportOutcome;
    fn import_objects(&mut self, objects: &[Object]) -> ImportOutcome;
    fn import_object_parameter_values(
        &mut self,
        values: &[ObjectParameterValue],
    ) -> ImportOutcome;
    fn import_object_groups(&mut self, groups: &[ObjectGroup]) -> ImportOutcome;
    fn import_relationships(&mut self, relationships: &[Relationship]) -> ImportOutcome;
    fn import_relationship_parameter_values(
        &mut self,
        values: &[RelationshipParameterValue],
    ) -> ImportOutcome;
    fn import_scenarios(&mut self, scenarios: &[Scenario]) -> ImportOutcome;
    fn import_scenario_alternatives(
        &mut self,
        scenario_alternatives: &[ScenarioAlternative],
    ) -> ImportOutcome;
    fn import_tool_feature_methods(&mut self, methods: &[ToolFeatureMethod]) -> ImportOutcome;

    /// Bulk load of a whole dataset, used e.g. for JSON template seeds.
    ///
    /// Categories are applied in the same dependency order as batch imports.
    fn import_dataset(&mut self, data: &ImportBatch) -> ImportOutcome {
        let mut imported = 0;
        let mut rejections = Vec::new();
        let mut collect = |outcome: ImportOutcome| {
            imported += outcome.imported;
            rejections.extend(outcome.rejections);
        };
        collect(self.import_alternatives(&data.alternatives));
        collect(self.import_objects(&data.objects));
        collect(self.import_object_parameter_values(&data.object_parameter_values));
        collect(self.import_object_groups(&data.object_groups));
        collect(self.import_relationships(&data.relationships));
        collect(self.import_relationship_parameter_values(&data.relationship_parameter_values));
        collect(self.import_scenarios(&data.scenarios));
        collect(self.import_scenario_alternatives(&data.scenario_alternatives));
        collect(self.import_tool_feature_methods(&data.tool_feature_methods));
        ImportOutcome {
            imported,
            rejections,
        }
    }

    /// Reads the whole store back as a dataset, modulo store-assigned ids.
    fn export_dataset(&self) -> ImportBatch;

    /// Finalizes the pending session.
    fn commit(&mut self, message: &str) -> Result<(), StoreError>;
}
