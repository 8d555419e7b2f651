use std::fmt;

use serde::{Deserialize, Serialize};

use crate::syntax::{find_attribute, Value};
use crate::types::Location;

/// The kind of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SectionType {
    Variable,
    Output,
    Local,
    Module,
    Provider,
    Resource,
    Data,
}

impl SectionType {
    pub const ALL: [SectionType; 7] = [
        SectionType::Variable,
        SectionType::Output,
        SectionType::Local,
        SectionType::Module,
        SectionType::Provider,
        SectionType::Resource,
        SectionType::Data,
    ];

    /// The block keyword that declares a section of this type. `local`
    /// sections are entries of a `locals` block.
    pub fn keyword(&self) -> &'static str {
        match self {
            SectionType::Variable => "variable",
            SectionType::Output => "output",
            SectionType::Local => "locals",
            SectionType::Module => "module",
            SectionType::Provider => "provider",
            SectionType::Resource => "resource",
            SectionType::Data => "data",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<SectionType> {
        let section_type = match keyword {
            "variable" => SectionType::Variable,
            "output" => SectionType::Output,
            "locals" => SectionType::Local,
            "module" => SectionType::Module,
            "provider" => SectionType::Provider,
            "resource" => SectionType::Resource,
            "data" => SectionType::Data,
            _ => return None,
        };
        Some(section_type)
    }

    /// Typed sections carry a subtype between the keyword and the name.
    pub fn is_typed(&self) -> bool {
        matches!(self, SectionType::Resource | SectionType::Data)
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SectionType::Local => "local",
            other => other.keyword(),
        };
        f.write_str(name)
    }
}

/// A named declaration in one file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Section {
    pub section_type: SectionType,
    /// Resource or data source type; `Some` only for typed sections.
    pub subtype: Option<String>,
    pub name: String,
    /// The whole block, keyword through closing brace. For locals, the entry.
    pub location: Location,
    /// The name, excluding quotes.
    pub name_location: Location,
    /// The subtype, excluding quotes; `Some` only for typed sections.
    pub type_location: Option<Location>,
    /// The block body, or the assigned value for locals.
    pub value: Option<Value>,
}

impl Section {
    /// `{type}.{subtype}.{name}` for typed sections, `{type}.{name}` otherwise.
    pub fn id(&self) -> String {
        match &self.subtype {
            Some(subtype) => format!("{}.{}.{}", self.section_type, subtype, self.name),
            None => format!("{}.{}", self.section_type, self.name),
        }
    }

    /// The interpolation text that refers to this section if it were named
    /// `name`. Providers cannot be referenced.
    pub fn reference_text(&self, name: &str) -> Option<String> {
        let subtype = self.subtype.as_deref().unwrap_or_default();
        let text = match self.section_type {
            SectionType::Variable => format!("var.{name}"),
            SectionType::Local => format!("local.{name}"),
            SectionType::Module => format!("module.{name}"),
            SectionType::Data => format!("data.{subtype}.{name}"),
            SectionType::Resource => format!("{subtype}.{name}"),
            SectionType::Output => name.to_string(),
            SectionType::Provider => return None,
        };
        Some(text)
    }

    /// An attribute set directly in the block body.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.value
            .as_ref()
            .and_then(Value::as_map)
            .and_then(|body| find_attribute(body, name))
    }
}
