//! Node-type catalog.
//!
//! The catalog maps a node's `type` key to the two facts the engine needs:
//! its category (used by the validator's connectivity and debate rules) and
//! its declared output fields (used to turn upstream nodes into selectable
//! variables). The catalog is passed explicitly to every operation that needs
//! it; there is no process-wide registry.

use crate::error::CatalogError;
use rootcause::prelude::Report;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Structural category of a node type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeCategory {
    /// Starts a run. Must have an outgoing edge.
    Trigger,
    /// LLM-backed participant.
    Agent,
    /// Final arbiter of a debate.
    Judge,
    /// Context or topic a debate is about.
    Topic,
    /// Visual container. Exempt from connectivity rules.
    Group,
    /// Terminal sink.
    Output,
    /// Any other functional step.
    Action,
}

impl NodeCategory {
    /// Returns the lowercase category name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trigger => "trigger",
            Self::Agent => "agent",
            Self::Judge => "judge",
            Self::Topic => "topic",
            Self::Group => "group",
            Self::Output => "output",
            Self::Action => "action",
        }
    }
}

impl fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field a node type produces for downstream nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputField {
    /// Variable name.
    pub name: String,
    /// Short description shown in the variable picker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl OutputField {
    /// Creates an output field without a description.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Catalog entry for one node type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeTypeSpec {
    /// The `type` key nodes use to refer to this entry.
    #[serde(rename = "type")]
    pub node_type: String,
    /// Structural category.
    pub category: NodeCategory,
    /// Declared output fields.
    #[serde(default)]
    pub outputs: Vec<OutputField>,
}

impl NodeTypeSpec {
    /// Creates an entry without output fields.
    #[must_use]
    pub fn new(node_type: impl Into<String>, category: NodeCategory) -> Self {
        Self {
            node_type: node_type.into(),
            category,
            outputs: Vec::new(),
        }
    }

    /// Adds an output field.
    #[must_use]
    pub fn with_output(mut self, field: OutputField) -> Self {
        self.outputs.push(field);
        self
    }
}

/// Lookup from node type to category and declared outputs.
pub trait NodeTypeCatalog: Send + Sync {
    /// Returns the category of a node type, or `None` if the type is unknown.
    fn category(&self, node_type: &str) -> Option<NodeCategory>;

    /// Returns the declared output fields of a node type.
    ///
    /// Unknown types declare no outputs.
    fn output_fields(&self, node_type: &str) -> &[OutputField];
}

/// An immutable, in-memory catalog.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    types: HashMap<String, NodeTypeSpec>,
}

#[derive(Deserialize)]
struct CatalogDocument {
    types: Vec<NodeTypeSpec>,
}

impl StaticCatalog {
    /// Builds a catalog from entries.
    ///
    /// # Errors
    ///
    /// Returns an error if a type key appears more than once.
    pub fn new(specs: impl IntoIterator<Item = NodeTypeSpec>) -> Result<Self, Report<CatalogError>> {
        let mut types = HashMap::new();
        for spec in specs {
            if types.contains_key(&spec.node_type) {
                return Err(CatalogError::DuplicateType {
                    node_type: spec.node_type,
                }
                .into());
            }
            types.insert(spec.node_type.clone(), spec);
        }
        Ok(Self { types })
    }

    /// Parses a catalog from JSON of the form `{ "types": [ ... ] }`.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or declares a type twice.
    pub fn from_json(json: &str) -> Result<Self, Report<CatalogError>> {
        let document: CatalogDocument =
            serde_json::from_str(json).map_err(|e| CatalogError::Parse {
                details: e.to_string(),
            })?;
        Self::new(document.types)
    }

    /// The default node palette of the workflow studio.
    #[must_use]
    pub fn builtin() -> Self {
        use NodeCategory::{Action, Agent, Group, Judge, Output, Topic, Trigger};

        let specs = [
            NodeTypeSpec::new("manual_trigger", Trigger)
                .with_output(OutputField::new("input").with_description("Payload supplied at start")),
            NodeTypeSpec::new("schedule_trigger", Trigger)
                .with_output(OutputField::new("triggered_at").with_description("Scheduled fire time")),
            NodeTypeSpec::new("webhook_trigger", Trigger)
                .with_output(OutputField::new("body").with_description("Request body"))
                .with_output(OutputField::new("headers").with_description("Request headers")),
            NodeTypeSpec::new("llm_agent", Agent)
                .with_output(OutputField::new("text").with_description("Model response")),
            NodeTypeSpec::new("debate_topic", Topic)
                .with_output(OutputField::new("topic").with_description("Debate motion")),
            NodeTypeSpec::new("debate_agent", Agent)
                .with_output(OutputField::new("argument").with_description("Final argument")),
            NodeTypeSpec::new("debate_judge", Judge)
                .with_output(OutputField::new("verdict").with_description("Winning position"))
                .with_output(OutputField::new("score").with_description("Confidence score")),
            NodeTypeSpec::new("knowledge_search", Action)
                .with_output(OutputField::new("documents").with_description("Matched documents")),
            NodeTypeSpec::new("http_request", Action)
                .with_output(OutputField::new("status").with_description("HTTP status code"))
                .with_output(OutputField::new("body").with_description("Response body")),
            NodeTypeSpec::new("data_transform", Action)
                .with_output(OutputField::new("result").with_description("Transformed value")),
            NodeTypeSpec::new("condition", Action),
            NodeTypeSpec::new("group", Group),
            NodeTypeSpec::new("output", Output),
            NodeTypeSpec::new("notification", Output),
        ];

        Self {
            types: specs
                .into_iter()
                .map(|spec| (spec.node_type.clone(), spec))
                .collect(),
        }
    }

    /// Returns the entry for a type key.
    #[must_use]
    pub fn get(&self, node_type: &str) -> Option<&NodeTypeSpec> {
        self.types.get(node_type)
    }

    /// Returns the number of known types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl NodeTypeCatalog for StaticCatalog {
    fn category(&self, node_type: &str) -> Option<NodeCategory> {
        self.types.get(node_type).map(|spec| spec.category)
    }

    fn output_fields(&self, node_type: &str) -> &[OutputField] {
        self.types
            .get(node_type)
            .map(|spec| spec.outputs.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_classifies_palette() {
        let catalog = StaticCatalog::builtin();
        assert_eq!(catalog.category("manual_trigger"), Some(NodeCategory::Trigger));
        assert_eq!(catalog.category("debate_judge"), Some(NodeCategory::Judge));
        assert_eq!(catalog.category("group"), Some(NodeCategory::Group));
        assert_eq!(catalog.category("unknown_widget"), None);
    }

    #[test]
    fn unknown_types_declare_no_outputs() {
        let catalog = StaticCatalog::builtin();
        assert!(catalog.output_fields("unknown_widget").is_empty());
        assert!(catalog.output_fields("output").is_empty());
        assert_eq!(catalog.output_fields("http_request").len(), 2);
    }

    #[test]
    fn from_json_reads_entries() {
        let catalog = StaticCatalog::from_json(
            r#"{
                "types": [
                    { "type": "rss_feed", "category": "trigger", "outputs": [ { "name": "items" } ] },
                    { "type": "scorer", "category": "judge" }
                ]
            }"#,
        )
        .expect("parse");

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.category("rss_feed"), Some(NodeCategory::Trigger));
        assert_eq!(catalog.output_fields("rss_feed")[0].name, "items");
        assert!(catalog.output_fields("scorer").is_empty());
    }

    #[test]
    fn duplicate_types_are_rejected() {
        let result = StaticCatalog::new([
            NodeTypeSpec::new("scorer", NodeCategory::Judge),
            NodeTypeSpec::new("scorer", NodeCategory::Agent),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn malformed_catalog_is_rejected() {
        assert!(StaticCatalog::from_json(r#"{ "types": [ { "type": "x", "category": "robot" } ] }"#).is_err());
    }
}
