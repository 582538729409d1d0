//! Builder: the object-creation capability the transformers emit against.
//!
//! [`Builder`] mirrors the destination system's creation API. Every create
//! call returns an opaque [`ObjectId`] that later calls refer back to.
//! [`ObjectModel`] is the in-memory implementation: it records each object in
//! creation order, checks that handles refer to objects of the right kind, and
//! serializes the result for import into the destination.

use crate::error::{ConnectorError, ConnectorResult};
use crate::types::{ActionMode, ObjectId, Properties};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Row/column coordinates of a table cell, e.g. `#1` / `#2`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableCell {
    pub row: String,
    pub column: String,
}

pub trait Builder {
    fn create_test_case(&mut self, name: &str, folder: &str) -> ConnectorResult<ObjectId>;

    fn create_module(
        &mut self,
        name: &str,
        folder: &str,
        properties: &Properties,
    ) -> ConnectorResult<ObjectId>;

    fn create_special_execution_task(
        &mut self,
        name: &str,
        folder: &str,
        library: &str,
        function: &str,
    ) -> ConnectorResult<ObjectId>;

    fn create_test_step_from_module(
        &mut self,
        name: &str,
        module: ObjectId,
        test_case: ObjectId,
    ) -> ConnectorResult<ObjectId>;

    fn create_module_attribute(
        &mut self,
        name: &str,
        business_type: &str,
        action_mode: ActionMode,
        module: ObjectId,
        identifiers: &Properties,
    ) -> ConnectorResult<ObjectId>;

    /// Table control; the destination adds the row, column and cell attributes.
    fn create_module_attribute_as_table(
        &mut self,
        name: &str,
        module: ObjectId,
        identifiers: &Properties,
    ) -> ConnectorResult<ObjectId>;

    fn create_special_execution_task_attribute(
        &mut self,
        name: &str,
        module: ObjectId,
    ) -> ConnectorResult<ObjectId>;

    fn set_test_step_value(
        &mut self,
        value: &str,
        test_step: ObjectId,
        attribute: ObjectId,
        action_mode: Option<ActionMode>,
    ) -> ConnectorResult<()>;

    fn set_test_step_value_as_table_cell(
        &mut self,
        value: &str,
        test_step: ObjectId,
        attribute: ObjectId,
        cell: &TableCell,
        action_mode: Option<ActionMode>,
    ) -> ConnectorResult<()>;

    fn convert_test_case_to_template(
        &mut self,
        test_case: ObjectId,
        test_sheet: ObjectId,
    ) -> ConnectorResult<()>;

    fn create_test_sheet(&mut self, name: &str, folder: &str) -> ConnectorResult<ObjectId>;

    fn create_instance_collection(&mut self, test_sheet: ObjectId) -> ConnectorResult<ObjectId>;

    fn create_instance(&mut self, name: &str, collection: ObjectId) -> ConnectorResult<ObjectId>;

    fn create_td_attribute(&mut self, name: &str, test_sheet: ObjectId)
        -> ConnectorResult<ObjectId>;

    fn set_attribute_value(
        &mut self,
        value: &str,
        attribute: ObjectId,
        instance: ObjectId,
    ) -> ConnectorResult<()>;

    fn create_manual_test_step(
        &mut self,
        name: &str,
        test_case: ObjectId,
    ) -> ConnectorResult<ObjectId>;

    fn create_manual_test_step_value(
        &mut self,
        name: &str,
        test_step: ObjectId,
        value: &str,
        action_mode: ActionMode,
    ) -> ConnectorResult<ObjectId>;
}

//==============================================================================
// In-memory object model
//==============================================================================

/// One recorded object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelObject {
    TestCase {
        name: String,
        folder: String,
    },
    Module {
        name: String,
        folder: String,
        engine: Option<String>,
        properties: Properties,
    },
    SpecialExecutionTask {
        name: String,
        folder: String,
        library: String,
        function: String,
    },
    TestStep {
        name: String,
        module: ObjectId,
        test_case: ObjectId,
    },
    ModuleAttribute {
        name: String,
        module: ObjectId,
        business_type: String,
        action_mode: ActionMode,
        identifiers: Properties,
    },
    TableAttribute {
        name: String,
        module: ObjectId,
        identifiers: Properties,
    },
    SpecialExecutionTaskAttribute {
        name: String,
        module: ObjectId,
    },
    TestStepValue {
        test_step: ObjectId,
        attribute: ObjectId,
        value: String,
        action_mode: Option<ActionMode>,
        #[serde(skip_serializing_if = "Option::is_none")]
        cell: Option<TableCell>,
    },
    TemplateConversion {
        test_case: ObjectId,
        test_sheet: ObjectId,
    },
    TestSheet {
        name: String,
        folder: String,
    },
    InstanceCollection {
        test_sheet: ObjectId,
    },
    Instance {
        name: String,
        collection: ObjectId,
    },
    TestSheetAttribute {
        name: String,
        test_sheet: ObjectId,
    },
    AttributeValue {
        attribute: ObjectId,
        instance: ObjectId,
        value: String,
    },
    ManualTestStep {
        name: String,
        test_case: ObjectId,
    },
    ManualTestStepValue {
        name: String,
        test_step: ObjectId,
        value: String,
        action_mode: ActionMode,
    },
}

impl ModelObject {
    pub fn kind(&self) -> &'static str {
        match self {
            ModelObject::TestCase { .. } => "test_case",
            ModelObject::Module { .. } => "module",
            ModelObject::SpecialExecutionTask { .. } => "special_execution_task",
            ModelObject::TestStep { .. } => "test_step",
            ModelObject::ModuleAttribute { .. } => "module_attribute",
            ModelObject::TableAttribute { .. } => "table_attribute",
            ModelObject::SpecialExecutionTaskAttribute { .. } => {
                "special_execution_task_attribute"
            }
            ModelObject::TestStepValue { .. } => "test_step_value",
            ModelObject::TemplateConversion { .. } => "template_conversion",
            ModelObject::TestSheet { .. } => "test_sheet",
            ModelObject::InstanceCollection { .. } => "instance_collection",
            ModelObject::Instance { .. } => "instance",
            ModelObject::TestSheetAttribute { .. } => "test_sheet_attribute",
            ModelObject::AttributeValue { .. } => "attribute_value",
            ModelObject::ManualTestStep { .. } => "manual_test_step",
            ModelObject::ManualTestStepValue { .. } => "manual_test_step_value",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub id: ObjectId,
    #[serde(flatten)]
    pub object: ModelObject,
}

/// Records created objects in creation order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ObjectModel {
    engine: Option<String>,
    objects: Vec<Entry>,
}

impl ObjectModel {
    pub fn new(engine: Option<String>) -> Self {
        ObjectModel {
            engine,
            objects: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.objects
    }

    /// Handles are positions: object `#n` sits at index `n - 1`.
    pub fn get(&self, id: ObjectId) -> Option<&ModelObject> {
        let index = usize::try_from(id.get().checked_sub(1)?).ok()?;
        self.objects
            .get(index)
            .filter(|entry| entry.id == id)
            .map(|entry| &entry.object)
    }

    /// Objects of one kind, in creation order
    pub fn of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a ModelObject> + 'a {
        self.objects
            .iter()
            .map(|entry| &entry.object)
            .filter(move |object| object.kind() == kind)
    }

    pub fn count(&self, kind: &str) -> usize {
        self.of_kind(kind).count()
    }

    pub fn counts_by_kind(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.objects {
            *counts.entry(entry.object.kind()).or_insert(0) += 1;
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn to_yaml(&self) -> ConnectorResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn to_json(&self) -> ConnectorResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write as JSON when the extension is `.json`, YAML otherwise.
    pub fn write(&self, path: &Path) -> ConnectorResult<()> {
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let content = if is_json { self.to_json()? } else { self.to_yaml()? };
        fs::write(path, content)?;
        Ok(())
    }

    fn push(&mut self, object: ModelObject) -> ObjectId {
        let id = ObjectId::new(self.objects.len() as u64 + 1);
        debug!(%id, kind = object.kind(), "created");
        self.objects.push(Entry { id, object });
        id
    }

    /// Fail unless `id` names an object of one of `kinds`.
    fn check_handle(&self, id: ObjectId, kinds: &[&str], role: &str) -> ConnectorResult<()> {
        match self.get(id) {
            Some(object) if kinds.contains(&object.kind()) => Ok(()),
            Some(object) => Err(ConnectorError::Builder(format!(
                "{} {} is a {}, expected {}",
                role,
                id,
                object.kind(),
                kinds.join(" or ")
            ))),
            None => Err(ConnectorError::Builder(format!("unknown {} {}", role, id))),
        }
    }
}

const MODULES: &[&str] = &["module", "special_execution_task"];
const ATTRIBUTES: &[&str] = &[
    "module_attribute",
    "table_attribute",
    "special_execution_task_attribute",
];

impl Builder for ObjectModel {
    fn create_test_case(&mut self, name: &str, folder: &str) -> ConnectorResult<ObjectId> {
        Ok(self.push(ModelObject::TestCase {
            name: name.to_string(),
            folder: folder.to_string(),
        }))
    }

    fn create_module(
        &mut self,
        name: &str,
        folder: &str,
        properties: &Properties,
    ) -> ConnectorResult<ObjectId> {
        let engine = self.engine.clone();
        Ok(self.push(ModelObject::Module {
            name: name.to_string(),
            folder: folder.to_string(),
            engine,
            properties: properties.clone(),
        }))
    }

    fn create_special_execution_task(
        &mut self,
        name: &str,
        folder: &str,
        library: &str,
        function: &str,
    ) -> ConnectorResult<ObjectId> {
        Ok(self.push(ModelObject::SpecialExecutionTask {
            name: name.to_string(),
            folder: folder.to_string(),
            library: library.to_string(),
            function: function.to_string(),
        }))
    }

    fn create_test_step_from_module(
        &mut self,
        name: &str,
        module: ObjectId,
        test_case: ObjectId,
    ) -> ConnectorResult<ObjectId> {
        self.check_handle(module, MODULES, "module")?;
        self.check_handle(test_case, &["test_case"], "test case")?;
        Ok(self.push(ModelObject::TestStep {
            name: name.to_string(),
            module,
            test_case,
        }))
    }

    fn create_module_attribute(
        &mut self,
        name: &str,
        business_type: &str,
        action_mode: ActionMode,
        module: ObjectId,
        identifiers: &Properties,
    ) -> ConnectorResult<ObjectId> {
        self.check_handle(module, &["module"], "module")?;
        Ok(self.push(ModelObject::ModuleAttribute {
            name: name.to_string(),
            module,
            business_type: business_type.to_string(),
            action_mode,
            identifiers: identifiers.clone(),
        }))
    }

    fn create_module_attribute_as_table(
        &mut self,
        name: &str,
        module: ObjectId,
        identifiers: &Properties,
    ) -> ConnectorResult<ObjectId> {
        self.check_handle(module, &["module"], "module")?;
        Ok(self.push(ModelObject::TableAttribute {
            name: name.to_string(),
            module,
            identifiers: identifiers.clone(),
        }))
    }

    fn create_special_execution_task_attribute(
        &mut self,
        name: &str,
        module: ObjectId,
    ) -> ConnectorResult<ObjectId> {
        self.check_handle(module, &["special_execution_task"], "special execution task")?;
        Ok(self.push(ModelObject::SpecialExecutionTaskAttribute {
            name: name.to_string(),
            module,
        }))
    }

    fn set_test_step_value(
        &mut self,
        value: &str,
        test_step: ObjectId,
        attribute: ObjectId,
        action_mode: Option<ActionMode>,
    ) -> ConnectorResult<()> {
        self.check_handle(test_step, &["test_step"], "test step")?;
        self.check_handle(attribute, ATTRIBUTES, "attribute")?;
        self.push(ModelObject::TestStepValue {
            test_step,
            attribute,
            value: value.to_string(),
            action_mode,
            cell: None,
        });
        Ok(())
    }

    fn set_test_step_value_as_table_cell(
        &mut self,
        value: &str,
        test_step: ObjectId,
        attribute: ObjectId,
        cell: &TableCell,
        action_mode: Option<ActionMode>,
    ) -> ConnectorResult<()> {
        self.check_handle(test_step, &["test_step"], "test step")?;
        self.check_handle(attribute, &["table_attribute"], "table attribute")?;
        self.push(ModelObject::TestStepValue {
            test_step,
            attribute,
            value: value.to_string(),
            action_mode,
            cell: Some(cell.clone()),
        });
        Ok(())
    }

    fn convert_test_case_to_template(
        &mut self,
        test_case: ObjectId,
        test_sheet: ObjectId,
    ) -> ConnectorResult<()> {
        self.check_handle(test_case, &["test_case"], "test case")?;
        self.check_handle(test_sheet, &["test_sheet"], "test sheet")?;
        self.push(ModelObject::TemplateConversion {
            test_case,
            test_sheet,
        });
        Ok(())
    }

    fn create_test_sheet(&mut self, name: &str, folder: &str) -> ConnectorResult<ObjectId> {
        Ok(self.push(ModelObject::TestSheet {
            name: name.to_string(),
            folder: folder.to_string(),
        }))
    }

    fn create_instance_collection(&mut self, test_sheet: ObjectId) -> ConnectorResult<ObjectId> {
        self.check_handle(test_sheet, &["test_sheet"], "test sheet")?;
        Ok(self.push(ModelObject::InstanceCollection { test_sheet }))
    }

    fn create_instance(&mut self, name: &str, collection: ObjectId) -> ConnectorResult<ObjectId> {
        self.check_handle(collection, &["instance_collection"], "instance collection")?;
        Ok(self.push(ModelObject::Instance {
            name: name.to_string(),
            collection,
        }))
    }

    fn create_td_attribute(
        &mut self,
        name: &str,
        test_sheet: ObjectId,
    ) -> ConnectorResult<ObjectId> {
        self.check_handle(test_sheet, &["test_sheet"], "test sheet")?;
        Ok(self.push(ModelObject::TestSheetAttribute {
            name: name.to_string(),
            test_sheet,
        }))
    }

    fn set_attribute_value(
        &mut self,
        value: &str,
        attribute: ObjectId,
        instance: ObjectId,
    ) -> ConnectorResult<()> {
        self.check_handle(attribute, &["test_sheet_attribute"], "test sheet attribute")?;
        self.check_handle(instance, &["instance"], "instance")?;
        self.push(ModelObject::AttributeValue {
            attribute,
            instance,
            value: value.to_string(),
        });
        Ok(())
    }

    fn create_manual_test_step(
        &mut self,
        name: &str,
        test_case: ObjectId,
    ) -> ConnectorResult<ObjectId> {
        self.check_handle(test_case, &["test_case"], "test case")?;
        Ok(self.push(ModelObject::ManualTestStep {
            name: name.to_string(),
            test_case,
        }))
    }

    fn create_manual_test_step_value(
        &mut self,
        name: &str,
        test_step: ObjectId,
        value: &str,
        action_mode: ActionMode,
    ) -> ConnectorResult<ObjectId> {
        self.check_handle(test_step, &["manual_test_step"], "manual test step")?;
        Ok(self.push(ModelObject::ManualTestStepValue {
            name: name.to_string(),
            test_step,
            value: value.to_string(),
            action_mode,
        }))
    }
}
