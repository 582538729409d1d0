//! Row-state transformers: worksheets in, builder calls out.
//!
//! Each source format has its own transformer. They share the module
//! automaton ([`ModuleState`]), the fixed-shape special execution tasks, and
//! the data-reference rewriting used by data-driven test cases.

pub mod data_sheet;
pub mod manual;
pub mod selenium;
pub mod uft;

pub use data_sheet::{DataInstance, DataSheetDir, DataSheetSource, DataTable};
pub use manual::ManualTransformer;
pub use selenium::SeleniumTransformer;
pub use uft::{SkippedRow, UftSheet, UftTransformer};

use crate::builder::Builder;
use crate::config::Definition;
use crate::error::ConnectorResult;
use crate::types::ObjectId;

/// Marks a value that refers to a data-sheet column, e.g. `DT_UserName`.
pub const DATA_REFERENCE_PREFIX: &str = "DT_";

/// Separates an identification property from its value, e.g. `name:=q`.
pub const ASSIGNMENT_MARKER: &str = ":=";

/// Whether controls can be attached to a module right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModuleState {
    /// The next control needs a new module first.
    #[default]
    AwaitingModule,
    /// Controls go into `module`; their values into `test_step`.
    ModuleReady {
        module: ObjectId,
        test_step: ObjectId,
    },
}

impl ModuleState {
    pub fn ready(self) -> Option<(ObjectId, ObjectId)> {
        match self {
            ModuleState::ModuleReady { module, test_step } => Some((module, test_step)),
            ModuleState::AwaitingModule => None,
        }
    }
}

/// Non-empty segments of `text` split on `separator`.
pub(crate) fn segments<'t>(text: &'t str, separator: &str) -> Vec<&'t str> {
    text.split(separator).filter(|s| !s.is_empty()).collect()
}

/// True when the last `:`-segment of `value` starts with [`DATA_REFERENCE_PREFIX`].
pub fn is_data_reference(value: &str) -> bool {
    segments(value, ":")
        .last()
        .is_some_and(|last| last.starts_with(DATA_REFERENCE_PREFIX))
}

/// Replace the trailing data reference with a data-sheet placeholder:
/// `A:B:DT_X` → `A:B:{XL[X]}`. Values without a reference are returned as is.
pub fn rewrite_data_reference(value: &str) -> String {
    let mut parts: Vec<String> = segments(value, ":").into_iter().map(str::to_string).collect();
    match parts.pop() {
        Some(last) if last.starts_with(DATA_REFERENCE_PREFIX) => {
            parts.push(format!("{{XL[{}]}}", &last[DATA_REFERENCE_PREFIX.len()..]));
            parts.join(":")
        }
        _ => value.to_string(),
    }
}

/// `Open URL` special execution task with its `Url` value.
pub(crate) fn open_url(
    builder: &mut dyn Builder,
    definition: &Definition,
    test_case: ObjectId,
    url: &str,
) -> ConnectorResult<()> {
    let module = builder.create_special_execution_task(
        "Open URL",
        &definition.modules_folder,
        "Framework",
        "OpenUrl",
    )?;
    let test_step = builder.create_test_step_from_module("Open URL", module, test_case)?;
    let attribute = builder.create_special_execution_task_attribute("Url", module)?;
    builder.set_test_step_value(url, test_step, attribute, None)
}

/// `TBox Window Operation` special execution task closing the window whose
/// caption starts with `caption`.
pub(crate) fn close_window(
    builder: &mut dyn Builder,
    definition: &Definition,
    test_case: ObjectId,
    caption: &str,
) -> ConnectorResult<()> {
    let module = builder.create_special_execution_task(
        "TBox Window Operation",
        &definition.modules_folder,
        "Framework",
        "WindowOperation",
    )?;
    let test_step = builder.create_test_step_from_module("Close Window", module, test_case)?;
    let attribute = builder.create_special_execution_task_attribute("Caption", module)?;
    builder.set_test_step_value(&format!("{}*", caption), test_step, attribute, None)?;
    let attribute = builder.create_special_execution_task_attribute("Operation", module)?;
    builder.set_test_step_value("Close", test_step, attribute, None)
}
