//! Manual test-case workbooks: test cases, steps, and their input and
//! expected values, no automation modules.

use crate::builder::Builder;
use crate::columns::{ColumnMap, Field};
use crate::config::Definition;
use crate::error::{ConnectorError, ConnectorResult};
use crate::sheet::Grid;
use crate::types::{ActionMode, ObjectId, SourceFormat};
use tracing::info;

#[derive(Debug, Default)]
struct ManualContext {
    test_case: Option<ObjectId>,
    test_step: Option<ObjectId>,
    test_cases: Vec<ObjectId>,
}

pub struct ManualTransformer<'a> {
    definition: &'a Definition,
}

impl<'a> ManualTransformer<'a> {
    pub fn new(definition: &'a Definition) -> Self {
        ManualTransformer { definition }
    }

    /// Migrate one worksheet. A sheet may hold any number of test cases, one
    /// per non-empty `TestCase` cell; their handles are returned in order.
    pub fn transform_sheet(
        &self,
        grid: &Grid,
        builder: &mut dyn Builder,
    ) -> ConnectorResult<Vec<ObjectId>> {
        info!(sheet = grid.name(), rows = grid.height(), "migrating manual worksheet");
        let columns = ColumnMap::from_header(grid, SourceFormat::Manual)?;
        let mut context = ManualContext::default();

        for row in grid.data_rows() {
            self.process_row(&mut context, grid, &columns, row, builder)
                .map_err(|e| e.at_row(grid.name(), row + 1))?;
        }
        Ok(context.test_cases)
    }

    fn process_row(
        &self,
        context: &mut ManualContext,
        grid: &Grid,
        columns: &ColumnMap,
        row: usize,
        builder: &mut dyn Builder,
    ) -> ConnectorResult<()> {
        for (col, field) in columns.iter() {
            let text = grid.cell(row, col);
            if text.is_empty() {
                continue;
            }
            match field {
                Field::TestCase => {
                    let test_case =
                        builder.create_test_case(text, &self.definition.test_cases_folder)?;
                    context.test_case = Some(test_case);
                    context.test_step = None;
                    context.test_cases.push(test_case);
                }
                Field::Action => {
                    let test_case = context.test_case.ok_or_else(|| {
                        ConnectorError::SourceFormat(format!(
                            "action '{}' before any TestCase",
                            text
                        ))
                    })?;
                    context.test_step = Some(builder.create_manual_test_step(text, test_case)?);
                }
                Field::InputParameter => {
                    let test_step = current_step(context, text)?;
                    // the parameter's value sits in the next column, mapped or not
                    let value = grid.cell(row, col + 1);
                    builder.create_manual_test_step_value(
                        text,
                        test_step,
                        value,
                        ActionMode::Input,
                    )?;
                }
                Field::ExpectedResult => {
                    let test_step = current_step(context, text)?;
                    builder.create_manual_test_step_value(
                        text,
                        test_step,
                        "",
                        ActionMode::Verify,
                    )?;
                }
                _ => {}
            }
        }
        Ok(())
    }
}

fn current_step(context: &ManualContext, name: &str) -> ConnectorResult<ObjectId> {
    context.test_step.ok_or_else(|| {
        ConnectorError::SourceFormat(format!("step value '{}' before any Action", name))
    })
}
