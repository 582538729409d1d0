use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

//==============================================================================
// Handles
//==============================================================================

/// Opaque handle returned by a [`Builder`](crate::builder::Builder) create call.
///
/// The transformers only pass handles back to the builder; they never look at
/// the number inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(u64);

impl ObjectId {
    pub fn new(raw: u64) -> Self {
        ObjectId(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Name → value pairs: module constraints or technical identifiers.
pub type Properties = BTreeMap<String, String>;

//==============================================================================
// Action modes
//==============================================================================

/// How a test step value is applied at execution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionMode {
    Input,
    Verify,
    Buffer,
}

impl fmt::Display for ActionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionMode::Input => "Input",
            ActionMode::Verify => "Verify",
            ActionMode::Buffer => "Buffer",
        };
        f.write_str(name)
    }
}

//==============================================================================
// Source formats
//==============================================================================

/// The third-party tool a source file was authored with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// UFT keyword-driven framework archive
    Uft,
    /// Selenium keyword spreadsheet
    Selenium,
    /// Manual test case spreadsheet
    Manual,
    /// Data sheet of a UFT archive
    DataSheet,
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceFormat::Uft => "UFT",
            SourceFormat::Selenium => "Selenium",
            SourceFormat::Manual => "Manual",
            SourceFormat::DataSheet => "Data sheet",
        };
        f.write_str(name)
    }
}

//==============================================================================
// Control descriptor
//==============================================================================

/// Everything a row says about the control it acts on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlDescriptor {
    pub name: Option<String>,
    pub business_type: Option<String>,
    pub identifiers: Properties,
}

impl ControlDescriptor {
    /// Rows without technical identifiers do not create a control.
    pub fn is_creatable(&self) -> bool {
        !self.identifiers.is_empty()
    }

    pub fn is_table(&self) -> bool {
        self.business_type.as_deref() == Some("Table")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_without_identifiers_is_not_creatable() {
        let descriptor = ControlDescriptor {
            name: Some("Login".to_string()),
            business_type: Some("Button".to_string()),
            identifiers: Properties::new(),
        };
        assert!(!descriptor.is_creatable());
    }

    #[test]
    fn test_descriptor_table_detection() {
        let mut descriptor = ControlDescriptor::default();
        assert!(!descriptor.is_table());
        descriptor.business_type = Some("Table".to_string());
        assert!(descriptor.is_table());
    }

    #[test]
    fn test_object_id_display() {
        assert_eq!(ObjectId::new(7).to_string(), "#7");
    }
}
