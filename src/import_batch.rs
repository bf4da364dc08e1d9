use crate::parameter_value::ParameterValue;
use crate::store::Database;
use crate::BASE_ALTERNATIVE;
use serde::{Deserialize, Serialize};
use std::ops::Add;

/// A named variant dimension for parameter values.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Alternative {
    pub fn new(name: &str) -> Self {
        Alternative {
            name: name.to_owned(),
            description: None,
        }
    }

    pub fn with_description(name: &str, description: &str) -> Self {
        Alternative {
            name: name.to_owned(),
            description: Some(description.to_owned()),
        }
    }
}

impl From<&str> for Alternative {
    fn from(name: &str) -> Self {
        Alternative::new(name)
    }
}

/// A named instance of an entity class, e.g. a node called "75FI".
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Object {
    pub class_name: String,
    pub name: String,
}

impl Object {
    pub fn new(class_name: &str, name: &str) -> Self {
        Object {
            class_name: class_name.to_owned(),
            name: name.to_owned(),
        }
    }
}

/// Membership of an object in a group object of the same class.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectGroup {
    pub class_name: String,
    pub group_name: String,
    pub member_name: String,
}

impl ObjectGroup {
    pub fn new(class_name: &str, group_name: &str, member_name: &str) -> Self {
        ObjectGroup {
            class_name: class_name.to_owned(),
            group_name: group_name.to_owned(),
            member_name: member_name.to_owned(),
        }
    }
}

/// An n-ary relationship instance; member order matches the class dimensions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub class_name: String,
    pub members: Vec<String>,
}

impl Relationship {
    pub fn new(class_name: &str, members: &[&str]) -> Self {
        Relationship {
            class_name: class_name.to_owned(),
            members: members.iter().map(|member| (*member).to_owned()).collect(),
        }
    }
}

/// A parameter value on an object, optionally scoped to an alternative.
///
/// A missing alternative means the implicit "Base" alternative.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectParameterValue {
    pub class_name: String,
    pub object_name: String,
    pub parameter_name: String,
    pub value: ParameterValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative: Option<String>,
}

impl ObjectParameterValue {
    pub fn new(
        class_name: &str,
        object_name: &str,
        parameter_name: &str,
        value: ParameterValue,
        alternative: Option<&str>,
    ) -> Self {
        ObjectParameterValue {
            class_name: class_name.to_owned(),
            object_name: object_name.to_owned(),
            parameter_name: parameter_name.to_owned(),
            value,
            alternative: alternative.map(String::from),
        }
    }

    pub fn alternative_or_base(&self) -> &str {
        self.alternative.as_deref().unwrap_or(BASE_ALTERNATIVE)
    }
}

/// A parameter value on a relationship, optionally scoped to an alternative.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RelationshipParameterValue {
    pub class_name: String,
    pub members: Vec<String>,
    pub parameter_name: String,
    pub value: ParameterValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative: Option<String>,
}

impl RelationshipParameterValue {
    pub fn new(
        class_name: &str,
        members: &[&str],
        parameter_name: &str,
        value: ParameterValue,
        alternative: Option<&str>,
    ) -> Self {
        RelationshipParameterValue {
            class_name: class_name.to_owned(),
            members: members.iter().map(|member| (*member).to_owned()).collect(),
            parameter_name: parameter_name.to_owned(),
            value,
            alternative: alternative.map(String::from),
        }
    }

    pub fn alternative_or_base(&self) -> &str {
        self.alternative.as_deref().unwrap_or(BASE_ALTERNATIVE)
    }
}

/// A named combination of alternatives.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Scenario {
    pub fn new(name: &str, active: bool, description: Option<&str>) -> Self {
        Scenario {
            name: name.to_owned(),
            active,
            description: description.map(String::from),
        }
    }
}

/// Priority ordering of an alternative within a scenario.
///
/// When `before_alternative` is given the alternative is inserted before it,
/// otherwise at the end; later alternatives override earlier ones.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioAlternative {
    pub scenario_name: String,
    pub alternative_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_alternative: Option<String>,
}

impl ScenarioAlternative {
    pub fn new(scenario_name: &str, alternative_name: &str) -> Self {
        ScenarioAlternative {
            scenario_name: scenario_name.to_owned(),
            alternative_name: alternative_name.to_owned(),
            before_alternative: None,
        }
    }
}

/// A capability-binding tuple, opaque to the importer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolFeatureMethod {
    pub tool_name: String,
    pub class_name: String,
    pub parameter_name: String,
    pub method_name: String,
}

impl ToolFeatureMethod {
    pub fn new(tool_name: &str, class_name: &str, parameter_name: &str, method_name: &str) -> Self {
        ToolFeatureMethod {
            tool_name: tool_name.to_owned(),
            class_name: class_name.to_owned(),
            parameter_name: parameter_name.to_owned(),
            method_name: method_name.to_owned(),
        }
    }
}

/// Accepted-record counts per import category, in commit order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImportCounts {
    pub alternatives: usize,
    pub objects: usize,
    pub object_parameter_values: usize,
    pub object_groups: usize,
    pub relationships: usize,
    pub relationship_parameter_values: usize,
    pub scenarios: usize,
    pub scenario_alternatives: usize,
    pub tool_feature_methods: usize,
}

/// An in-memory accumulator of pending records destined for a Spine database.
///
/// Builder functions append to the public sequences; independent batches are
/// folded together with `+` which concatenates every sequence preserving
/// order. The empty batch is the identity of the combination. Nothing is
/// validated or deduplicated here; the destination store applies its
/// integrity rules at import time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportBatch {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<Alternative>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub objects: Vec<Object>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub object_parameter_values: Vec<ObjectParameterValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub object_groups: Vec<ObjectGroup>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<Relationship>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationship_parameter_values: Vec<RelationshipParameterValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scenarios: Vec<Scenario>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scenario_alternatives: Vec<ScenarioAlternative>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_feature_methods: Vec<ToolFeatureMethod>,
}

impl ImportBatch {
    pub fn new() -> Self {
        ImportBatch::default()
    }

    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
            && self.objects.is_empty()
            && self.object_parameter_values.is_empty()
            && self.object_groups.is_empty()
            && self.relationships.is_empty()
            && self.relationship_parameter_values.is_empty()
            && self.scenarios.is_empty()
            && self.scenario_alternatives.is_empty()
            && self.tool_feature_methods.is_empty()
    }

    /// Concatenates `other`'s sequences after this batch's sequences.
    pub fn merge_from(&mut self, other: ImportBatch) {
        self.alternatives.extend(other.alternatives);
        self.objects.extend(other.objects);
        self.object_parameter_values
            .extend(other.object_parameter_values);
        self.object_groups.extend(other.object_groups);
        self.relationships.extend(other.relationships);
        self.relationship_parameter_values
            .extend(other.relationship_parameter_values);
        self.scenarios.extend(other.scenarios);
        self.scenario_alternatives.extend(other.scenario_alternatives);
        self.tool_feature_methods.extend(other.tool_feature_methods);
    }

    pub fn combine(mut self, other: ImportBatch) -> ImportBatch {
        self.merge_from(other);
        self
    }

    pub fn add_alternative(&mut self, alternative: Alternative) {
        self.alternatives.push(alternative);
    }

    pub fn add_object(&mut self, class_name: &str, name: &str) {
        self.objects.push(Object::new(class_name, name));
    }

    pub fn has_object(&self, class_name: &str, name: &str) -> bool {
        self.objects
            .iter()
            .any(|object| object.class_name == class_name && object.name == name)
    }

    /// Declares an object unless the batch already holds it.
    pub fn add_object_unique(&mut self, class_name: &str, name: &str) {
        if !self.has_object(class_name, name) {
            self.add_object(class_name, name);
        }
    }

    pub fn has_alternative(&self, name: &str) -> bool {
        self.alternatives
            .iter()
            .any(|alternative| alternative.name == name)
    }

    pub fn add_alternative_unique(&mut self, name: &str) {
        if !self.has_alternative(name) {
            self.add_alternative(Alternative::new(name));
        }
    }

    pub fn add_relationship(&mut self, class_name: &str, members: &[&str]) {
        self.relationships.push(Relationship::new(class_name, members));
    }

    pub fn add_object_value(
        &mut self,
        class_name: &str,
        object_name: &str,
        parameter_name: &str,
        value: ParameterValue,
        alternative: Option<&str>,
    ) {
        self.object_parameter_values.push(ObjectParameterValue::new(
            class_name,
            object_name,
            parameter_name,
            value,
            alternative,
        ));
    }

    pub fn add_relationship_value(
        &mut self,
        class_name: &str,
        members: &[&str],
        parameter_name: &str,
        value: ParameterValue,
        alternative: Option<&str>,
    ) {
        self.relationship_parameter_values
            .push(RelationshipParameterValue::new(
                class_name,
                members,
                parameter_name,
                value,
                alternative,
            ));
    }

    /// Looks up an object parameter value in an exported dataset.
    pub fn find_object_value(
        &self,
        class_name: &str,
        object_name: &str,
        parameter_name: &str,
        alternative: &str,
    ) -> Option<&ParameterValue> {
        self.object_parameter_values
            .iter()
            .find(|record| {
                record.class_name == class_name
                    && record.object_name == object_name
                    && record.parameter_name == parameter_name
                    && record.alternative_or_base() == alternative
            })
            .map(|record| &record.value)
    }

    /// Looks up a relationship parameter value in an exported dataset.
    pub fn find_relationship_value(
        &self,
        class_name: &str,
        members: &[&str],
        parameter_name: &str,
        alternative: &str,
    ) -> Option<&ParameterValue> {
        self.relationship_parameter_values
            .iter()
            .find(|record| {
                record.class_name == class_name
                    && record.members == members
                    && record.parameter_name == parameter_name
                    && record.alternative_or_base() == alternative
            })
            .map(|record| &record.value)
    }

    /// Redirects object parameter values of `parameter_name` to an alternative.
    ///
    /// Every matching record scoped to some other alternative is zeroed in
    /// place, and a copy carrying the original value is appended under
    /// `active_alternative`.
    pub fn redirect_object_values(&mut self, parameter_name: &str, active_alternative: &str) {
        let mut redirected = Vec::new();
        for record in self.object_parameter_values.iter_mut() {
            if record.parameter_name == parameter_name
                && record.alternative_or_base() != active_alternative
            {
                let mut copy = record.clone();
                copy.alternative = Some(active_alternative.to_owned());
                redirected.push(copy);
                record.value = ParameterValue::Number(0.0);
            }
        }
        self.object_parameter_values.extend(redirected);
    }

    /// Same as [`ImportBatch::redirect_object_values`] for relationship values.
    pub fn redirect_relationship_values(&mut self, parameter_name: &str, active_alternative: &str) {
        let mut redirected = Vec::new();
        for record in self.relationship_parameter_values.iter_mut() {
            if record.parameter_name == parameter_name
                && record.alternative_or_base() != active_alternative
            {
                let mut copy = record.clone();
                copy.alternative = Some(active_alternative.to_owned());
                redirected.push(copy);
                record.value = ParameterValue::Number(0.0);
            }
        }
        self.relationship_parameter_values.extend(redirected);
    }

    /// Pushes all pending records to the store and commits best-effort.
    ///
    /// Categories are sent in dependency order so that names declared by
    /// earlier categories exist when later ones reference them. Rejected
    /// records are reported as warnings and dropped; the remaining
    /// categories are still imported. A failing final commit is logged and
    /// swallowed as well.
    pub fn import_data(&self, output_db: &mut dyn Database) -> ImportCounts {
        let mut counts = ImportCounts::default();
        counts.alternatives = send(output_db.import_alternatives(&self.alternatives));
        counts.objects = send(output_db.import_objects(&self.objects));
        counts.object_parameter_values =
            send(output_db.import_object_parameter_values(&self.object_parameter_values));
        counts.object_groups = send(output_db.import_object_groups(&self.object_groups));
        counts.relationships = send(output_db.import_relationships(&self.relationships));
        counts.relationship_parameter_values = send(
            output_db.import_relationship_parameter_values(&self.relationship_parameter_values),
        );
        counts.scenarios = send(output_db.import_scenarios(&self.scenarios));
        counts.scenario_alternatives =
            send(output_db.import_scenario_alternatives(&self.scenario_alternatives));
        counts.tool_feature_methods =
            send(output_db.import_tool_feature_methods(&self.tool_feature_methods));

        if let Err(error) = output_db.commit("Converted Backbone model") {
            eprintln!("Warning: {}", error);
        }

        println!(
            " {} alternatives in addition to the 'Base' are added",
            counts.alternatives
        );
        println!(" {} objects", counts.objects);
        println!(
            " {} object_parameter_values",
            counts.object_parameter_values
        );
        println!(
            " {} objects added as the member of some groups",
            counts.object_groups
        );
        println!(" {} relationships", counts.relationships);
        println!(
            " {} relationship_parameter_values",
            counts.relationship_parameter_values
        );
        println!(" {} scenarios", counts.scenarios);
        println!(
            " {} combinations of scenario_alternatives",
            counts.scenario_alternatives
        );
        println!(
            " {} tool_feature_methods defined",
            counts.tool_feature_methods
        );
        println!("Done.");
        counts
    }
}

fn send(outcome: crate::store::ImportOutcome) -> usize {
    for rejection in &outcome.rejections {
        eprintln!("Warning: {}", rejection);
    }
    outcome.imported
}

impl Add for ImportBatch {
    type Output = ImportBatch;

    fn add(self, other: ImportBatch) -> ImportBatch {
        self.combine(other)
    }
}
