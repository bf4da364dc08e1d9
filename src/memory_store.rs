use crate::errors::{ImportRejection, StoreError};
use crate::import_batch::{
    Alternative, ImportBatch, Object, ObjectGroup, ObjectParameterValue, Relationship,
    RelationshipParameterValue, Scenario, ScenarioAlternative, ToolFeatureMethod,
};
use crate::parameter_value::ParameterValue;
use crate::store::{Database, ImportOutcome};
use crate::BASE_ALTERNATIVE;
use indexmap::IndexMap;

type ObjectValueKey = (String, String, String, String);
type RelationshipValueKey = (String, Vec<String>, String, String);

/// An in-memory Spine database applying the destination integrity rules.
///
/// Objects and alternatives must exist before records referencing them are
/// accepted; re-declaring an existing entity is idempotent and re-importing
/// an existing parameter value key overrides the stored value. The "Base"
/// alternative exists from the start.
pub struct MemoryStore {
    alternatives: Vec<Alternative>,
    objects: Vec<Object>,
    object_values: IndexMap<ObjectValueKey, ParameterValue>,
    object_groups: Vec<ObjectGroup>,
    relationships: Vec<Relationship>,
    relationship_values: IndexMap<RelationshipValueKey, ParameterValue>,
    scenarios: Vec<Scenario>,
    scenario_alternatives: Vec<ScenarioAlternative>,
    tool_feature_methods: Vec<ToolFeatureMethod>,
    commit_messages: Vec<String>,
    dirty: bool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore {
            alternatives: vec![Alternative::new(BASE_ALTERNATIVE)],
            objects: Vec::new(),
            object_values: IndexMap::new(),
            object_groups: Vec::new(),
            relationships: Vec::new(),
            relationship_values: IndexMap::new(),
            scenarios: Vec::new(),
            scenario_alternatives: Vec::new(),
            tool_feature_methods: Vec::new(),
            commit_messages: Vec::new(),
            dirty: false,
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn commit_messages(&self) -> &Vec<String> {
        &self.commit_messages
    }

    fn has_alternative(&self, name: &str) -> bool {
        self.alternatives
            .iter()
            .any(|alternative| alternative.name == name)
    }

    fn has_object(&self, class_name: &str, name: &str) -> bool {
        self.objects
            .iter()
            .any(|object| object.class_name == class_name && object.name == name)
    }

    fn has_object_named(&self, name: &str) -> bool {
        self.objects.iter().any(|object| object.name == name)
    }

    fn has_relationship(&self, class_name: &str, members: &[String]) -> bool {
        self.relationships
            .iter()
            .any(|relationship| {
                relationship.class_name == class_name && relationship.members == members
            })
    }

    fn has_scenario(&self, name: &str) -> bool {
        self.scenarios.iter().any(|scenario| scenario.name == name)
    }
}

impl Database for MemoryStore {
    fn import_alternatives(&mut self, alternatives: &[Alternative]) -> ImportOutcome {
        let mut imported = 0;
        for alternative in alternatives {
            if self.has_alternative(&alternative.name) {
                continue;
            }
            self.alternatives.push(alternative.clone());
            self.dirty = true;
            imported += 1;
        }
        ImportOutcome::accepted(imported)
    }

    fn import_objects(&mut self, objects: &[Object]) -> ImportOutcome {
        let mut imported = 0;
        for object in objects {
            if self.has_object(&object.class_name, &object.name) {
                continue;
            }
            self.objects.push(object.clone());
            self.dirty = true;
            imported += 1;
        }
        ImportOutcome::accepted(imported)
    }

    fn import_object_parameter_values(
        &mut self,
        values: &[ObjectParameterValue],
    ) -> ImportOutcome {
        let mut outcome = ImportOutcome::default();
        for record in values {
            if !self.has_object(&record.class_name, &record.object_name) {
                outcome.rejections.push(ImportRejection(format!(
                    "parameter value '{}' references unknown object ({}, {})",
                    record.parameter_name, record.class_name, record.object_name
                )));
                continue;
            }
            let alternative = record.alternative_or_base().to_owned();
            if !self.has_alternative(&alternative) {
                outcome.rejections.push(ImportRejection(format!(
                    "parameter value '{}' of object '{}' references unknown alternative '{}'",
                    record.parameter_name, record.object_name, alternative
                )));
                continue;
            }
            let key = (
                record.class_name.clone(),
                record.object_name.clone(),
                record.parameter_name.clone(),
                alternative,
            );
            self.object_values.insert(key, record.value.clone());
            self.dirty = true;
            outcome.imported += 1;
        }
        outcome
    }

    fn import_object_groups(&mut self, groups: &[ObjectGroup]) -> ImportOutcome {
        let mut outcome = ImportOutcome::default();
        for group in groups {
            if !self.has_object(&group.class_name, &group.member_name) {
                outcome.rejections.push(ImportRejection(format!(
                    "group '{}' references unknown member object ({}, {})",
                    group.group_name, group.class_name, group.member_name
                )));
                continue;
            }
            // The group object itself is declared on first use.
            if !self.has_object(&group.class_name, &group.group_name) {
                self.objects
                    .push(Object::new(&group.class_name, &group.group_name));
            }
            if self.object_groups.contains(group) {
                continue;
            }
            self.object_groups.push(group.clone());
            self.dirty = true;
            outcome.imported += 1;
        }
        outcome
    }

    fn import_relationships(&mut self, relationships: &[Relationship]) -> ImportOutcome {
        let mut outcome = ImportOutcome::default();
        for relationship in relationships {
            let missing = relationship
                .members
                .iter()
                .find(|member| !self.has_object_named(member));
            if let Some(member) = missing {
                outcome.rejections.push(ImportRejection(format!(
                    "relationship of class '{}' references unknown object '{}'",
                    relationship.class_name, member
                )));
                continue;
            }
            if self.has_relationship(&relationship.class_name, &relationship.members) {
                continue;
            }
            self.relationships.push(relationship.clone());
            self.dirty = true;
            outcome.imported += 1;
        }
        outcome
    }

    fn import_relationship_parameter_values(
        &mut self,
        values: &[RelationshipParameterValue],
    ) -> ImportOutcome {
        let mut outcome = ImportOutcome::default();
        for record in values {
            if !self.has_relationship(&record.class_name, &record.members) {
                outcome.rejections.push(ImportRejection(format!(
                    "parameter value '{}' references unknown relationship ({}, [{}])",
                    record.parameter_name,
                    record.class_name,
                    record.members.join(", ")
                )));
                continue;
            }
            let alternative = record.alternative_or_base().to_owned();
            if !self.has_alternative(&alternative) {
                outcome.rejections.push(ImportRejection(format!(
                    "parameter value '{}' of relationship class '{}' references unknown alternative '{}'",
                    record.parameter_name, record.class_name, alternative
                )));
                continue;
            }
            let key = (
                record.class_name.clone(),
                record.members.clone(),
                record.parameter_name.clone(),
                alternative,
            );
            self.relationship_values.insert(key, record.value.clone());
            self.dirty = true;
            outcome.imported += 1;
        }
        outcome
    }

    fn import_scenarios(&mut self, scenarios: &[Scenario]) -> ImportOutcome {
        let mut imported = 0;
        for scenario in scenarios {
            match self
                .scenarios
                .iter_mut()
                .find(|existing| existing.name == scenario.name)
            {
                Some(existing) => *existing = scenario.clone(),
                None => self.scenarios.push(scenario.clone()),
            }
            self.dirty = true;
            imported += 1;
        }
        ImportOutcome::accepted(imported)
    }

    fn import_scenario_alternatives(
        &mut self,
        scenario_alternatives: &[ScenarioAlternative],
    ) -> ImportOutcome {
        let mut outcome = ImportOutcome::default();
        for record in scenario_alternatives {
            if !self.has_scenario(&record.scenario_name) {
                outcome.rejections.push(ImportRejection(format!(
                    "scenario alternative references unknown scenario '{}'",
                    record.scenario_name
                )));
                continue;
            }
            if !self.has_alternative(&record.alternative_name) {
                outcome.rejections.push(ImportRejection(format!(
                    "scenario '{}' references unknown alternative '{}'",
                    record.scenario_name, record.alternative_name
                )));
                continue;
            }
            let duplicate = self.scenario_alternatives.iter().any(|existing| {
                existing.scenario_name == record.scenario_name
                    && existing.alternative_name == record.alternative_name
            });
            if duplicate {
                continue;
            }
            let position = record.before_alternative.as_ref().and_then(|before| {
                self.scenario_alternatives.iter().position(|existing| {
                    existing.scenario_name == record.scenario_name
                        && existing.alternative_name == *before
                })
            });
            let mut stored = record.clone();
            stored.before_alternative = None;
            match position {
                Some(index) => self.scenario_alternatives.insert(index, stored),
                None => self.scenario_alternatives.push(stored),
            }
            self.dirty = true;
            outcome.imported += 1;
        }
        outcome
    }

    fn import_tool_feature_methods(&mut self, methods: &[ToolFeatureMethod]) -> ImportOutcome {
        let mut imported = 0;
        for method in methods {
            if self.tool_feature_methods.contains(method) {
                continue;
            }
            self.tool_feature_methods.push(method.clone());
            self.dirty = true;
            imported += 1;
        }
        ImportOutcome::accepted(imported)
    }

    fn export_dataset(&self) -> ImportBatch {
        let mut data = ImportBatch::new();
        data.alternatives = self.alternatives.clone();
        data.objects = self.objects.clone();
        data.object_parameter_values = self
            .object_values
            .iter()
            .map(|((class_name, object_name, parameter_name, alternative), value)| {
                ObjectParameterValue::new(
                    class_name,
                    object_name,
                    parameter_name,
                    value.clone(),
                    Some(alternative),
                )
            })
            .collect();
        data.object_groups = self.object_groups.clone();
        data.relationships = self.relationships.clone();
        data.relationship_parameter_values = self
            .relationship_values
            .iter()
            .map(|((class_name, members, parameter_name, alternative), value)| {
                RelationshipParameterValue {
                    class_name: class_name.clone(),
                    members: members.clone(),
                    parameter_name: parameter_name.clone(),
                    value: value.clone(),
                    alternative: Some(alternative.clone()),
                }
            })
            .collect();
        data.scenarios = self.scenarios.clone();
        data.scenario_alternatives = self.scenario_alternatives.clone();
        data.tool_feature_methods = self.tool_feature_methods.clone();
        data
    }

    fn commit(&mut self, message: &str) -> Result<(), StoreError> {
        if !self.dirty {
            return Err(StoreError("nothing to commit".to_string()));
        }
        self.commit_messages.push(message.to_owned());
        self.dirty = false;
        Ok(())
    }
}
