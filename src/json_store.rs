use crate::errors::StoreError;
use crate::import_batch::{
    Alternative, ImportBatch, Object, ObjectGroup, ObjectParameterValue, Relationship,
    RelationshipParameterValue, Scenario, ScenarioAlternative, ToolFeatureMethod,
};
use crate::memory_store::MemoryStore;
use crate::store::{Database, ImportOutcome};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// A Spine database persisted as a JSON dataset file.
///
/// The store lives in memory between commits; a successful `commit` writes
/// the whole exported dataset back to the file.
pub struct JsonFileStore {
    path: PathBuf,
    store: MemoryStore,
}

impl JsonFileStore {
    /// Opens the store at `path`, loading the existing dataset unless
    /// `create_new_db` asks for a fresh one. A missing file also yields a
    /// fresh empty store.
    pub fn open(path: &Path, create_new_db: bool) -> Result<Self, StoreError> {
        let mut store = MemoryStore::new();
        if !create_new_db && path.exists() {
            let file = File::open(path)?;
            let data: ImportBatch = serde_json::from_reader(BufReader::new(file))?;
            let outcome = store.import_dataset(&data);
            for rejection in outcome.rejections {
                eprintln!("Warning: {}", rejection);
            }
        }
        Ok(JsonFileStore {
            path: path.to_path_buf(),
            store,
        })
    }
}

impl Database for JsonFileStore {
    fn import_alternatives(&mut self, alternatives: &[Alternative]) -> ImportOutcome {
        self.store.import_alternatives(alternatives)
    }

    fn import_objects(&mut self, objects: &[Object]) -> ImportOutcome {
        self.store.import_objects(objects)
    }

    fn import_object_parameter_values(
        &mut self,
        values: &[ObjectParameterValue],
    ) -> ImportOutcome {
        self.store.import_object_parameter_values(values)
    }

    fn import_object_groups(&mut self, groups: &[ObjectGroup]) -> ImportOutcome {
        self.store.import_object_groups(groups)
    }

    fn import_relationships(&mut self, relationships: &[Relationship]) -> ImportOutcome {
        self.store.import_relationships(relationships)
    }

    fn import_relationship_parameter_values(
        &mut self,
        values: &[RelationshipParameterValue],
    ) -> ImportOutcome {
        self.store.import_relationship_parameter_values(values)
    }

    fn import_scenarios(&mut self, scenarios: &[Scenario]) -> ImportOutcome {
        self.store.import_scenarios(scenarios)
    }

    fn import_scenario_alternatives(
        &mut self,
        scenario_alternatives: &[ScenarioAlternative],
    ) -> ImportOutcome {
        self.store.import_scenario_alternatives(scenario_alternatives)
    }

    fn import_tool_feature_methods(&mut self, methods: &[ToolFeatureMethod]) -> ImportOutcome {
        self.store.import_tool_feature_methods(methods)
    }

    fn export_dataset(&self) -> ImportBatch {
        self.store.export_dataset()
    }

    fn commit(&mut self, message: &str) -> Result<(), StoreError> {
        self.store.commit(message)?;
        let file = File::create(&self.path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), &self.store.export_dataset())?;
        Ok(())
    }
}
