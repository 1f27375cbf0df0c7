// Resource Schema
//
// Framework-independent declaration of the SAST settings resource:
// which attributes exist, which the caller sets and which the server
// computes.

use serde::Serialize;

use crate::record::DEFAULT_RESOURCE_TYPE;

/// Suffix appended to the provider type name.
pub const RESOURCE_SUFFIX: &str = "_sast";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    String,
    Bool,
    Object,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: &'static str,
    pub kind: AttributeKind,
    pub required: bool,
    pub computed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
}

impl Attribute {
    fn required(name: &'static str, kind: AttributeKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            computed: false,
            default: None,
            attributes: Vec::new(),
        }
    }

    fn computed(name: &'static str, kind: AttributeKind) -> Self {
        Self {
            required: false,
            computed: true,
            ..Self::required(name, kind)
        }
    }

    fn nested(name: &'static str, attributes: Vec<Attribute>) -> Self {
        Self {
            attributes,
            ..Self::required(name, AttributeKind::Object)
        }
    }

    fn with_default(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceSchema {
    pub type_name: String,
    pub attributes: Vec<Attribute>,
}

impl ResourceSchema {
    /// Look up an attribute by dotted path, e.g. `data.attributes.sast_enabled`.
    pub fn attribute(&self, path: &str) -> Option<&Attribute> {
        let mut level = &self.attributes;
        let mut found = None;

        for segment in path.split('.') {
            let attr = level.iter().find(|a| a.name == segment)?;
            level = &attr.attributes;
            found = Some(attr);
        }

        found
    }
}

/// Resource type name as registered under a provider.
pub fn resource_type_name(provider_type_name: &str) -> String {
    format!("{provider_type_name}{RESOURCE_SUFFIX}")
}

/// Schema of the SAST settings resource.
pub fn sast_resource_schema(provider_type_name: &str) -> ResourceSchema {
    ResourceSchema {
        type_name: resource_type_name(provider_type_name),
        attributes: vec![Attribute::nested(
            "data",
            vec![
                Attribute::nested(
                    "attributes",
                    vec![
                        Attribute::required("sast_enabled", AttributeKind::Bool),
                        Attribute::computed("autofix_enabled", AttributeKind::Bool),
                    ],
                ),
                Attribute::required("id", AttributeKind::String),
                Attribute::computed("type", AttributeKind::String)
                    .with_default(DEFAULT_RESOURCE_TYPE),
            ],
        )],
    }
}
