//! Migration definition: where created objects go and where the connector works.

use crate::error::{ConnectorError, ConnectorResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Destination folders and working directory for one migration run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Definition {
    /// Folder that receives created test cases
    pub test_cases_folder: String,
    /// Folder that receives created modules and special execution tasks
    pub modules_folder: String,
    /// Folder that receives test sheets built from data sheets
    pub test_case_design_folder: String,
    /// Working directory (the extracted archive for UFT migrations)
    pub migration_folder: PathBuf,
    /// Steering engine recorded on created modules; `None` for manual test cases
    pub engine: Option<String>,
}

impl Default for Definition {
    fn default() -> Self {
        Definition {
            test_cases_folder: "TestCases".to_string(),
            modules_folder: "Modules".to_string(),
            test_case_design_folder: "TestCaseDesign".to_string(),
            migration_folder: PathBuf::from("."),
            engine: Some("Html".to_string()),
        }
    }
}

impl Definition {
    /// Load a definition from a YAML file. Missing keys fall back to defaults.
    pub fn from_file(path: &Path) -> ConnectorResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConnectorError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> ConnectorResult<Self> {
        let definition: Definition = serde_yaml::from_str(content)
            .map_err(|e| ConnectorError::Config(e.to_string()))?;
        definition.validate()?;
        Ok(definition)
    }

    fn validate(&self) -> ConnectorResult<()> {
        let folders = [
            ("test_cases_folder", &self.test_cases_folder),
            ("modules_folder", &self.modules_folder),
            ("test_case_design_folder", &self.test_case_design_folder),
        ];
        for (key, value) in folders {
            if value.trim().is_empty() {
                return Err(ConnectorError::Config(format!("'{}' must not be empty", key)));
            }
        }
        Ok(())
    }

    pub fn with_migration_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.migration_folder = folder.into();
        self
    }

    pub fn without_engine(mut self) -> Self {
        self.engine = None;
        self
    }

    /// `Framework/TestCase` below the migration folder
    pub fn test_case_dir(&self) -> PathBuf {
        self.migration_folder.join("Framework").join("TestCase")
    }

    /// `Framework/DataSheet` below the migration folder
    pub fn data_sheet_dir(&self) -> PathBuf {
        self.migration_folder.join("Framework").join("DataSheet")
    }

    /// `Framework/ObjectRepository` below the migration folder
    pub fn object_repository_dir(&self) -> PathBuf {
        self.migration_folder.join("Framework").join("ObjectRepository")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let definition = Definition::from_yaml("modules_folder: Imported/Modules\n").unwrap();
        assert_eq!(definition.modules_folder, "Imported/Modules");
        assert_eq!(definition.test_cases_folder, "TestCases");
        assert_eq!(definition.engine.as_deref(), Some("Html"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = Definition::from_yaml("module_folder: typo\n");
        assert!(matches!(result, Err(ConnectorError::Config(_))));
    }

    #[test]
    fn test_empty_folder_rejected() {
        let result = Definition::from_yaml("test_cases_folder: \"  \"\n");
        assert!(matches!(result, Err(ConnectorError::Config(_))));
    }

    #[test]
    fn test_framework_layout() {
        let definition = Definition::default().with_migration_folder("/tmp/archive");
        assert_eq!(
            definition.test_case_dir(),
            PathBuf::from("/tmp/archive/Framework/TestCase")
        );
        assert_eq!(
            definition.object_repository_dir(),
            PathBuf::from("/tmp/archive/Framework/ObjectRepository")
        );
    }
}
