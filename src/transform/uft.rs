//! UFT keyword-driven test scripts.
//!
//! Each worksheet becomes one test case. Rows describe a page (module), the
//! control acted on, a keyword, and a value. Page and control properties are
//! either written inline (`name:=value`) or looked up in the object
//! repository. A value referring to the data sheet (`DT_...`) turns the test
//! case into a template bound to the test sheet built from that data sheet.

use super::data_sheet::{self, DataSheetSource};
use super::{
    close_window, is_data_reference, open_url, rewrite_data_reference, segments, ModuleState,
    ASSIGNMENT_MARKER,
};
use crate::builder::{Builder, TableCell};
use crate::columns::{ColumnMap, Field, FieldBag};
use crate::config::Definition;
use crate::error::{ConnectorError, ConnectorResult, ErrorKind};
use crate::object_map;
use crate::repository::ObjectRepository;
use crate::sheet::Grid;
use crate::types::{ActionMode, ControlDescriptor, ObjectId, Properties, SourceFormat};
use tracing::{debug, info, warn};

/// UFT framework keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UftKeyword {
    Open,
    CloseWindow,
    Click,
    SetValue,
    SelectValue,
    GetValue,
    VerifyProperty,
    VerifyPropertyTable,
}

impl UftKeyword {
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "Open" => Some(UftKeyword::Open),
            "CloseWindow" => Some(UftKeyword::CloseWindow),
            "Click" => Some(UftKeyword::Click),
            "SetValue" => Some(UftKeyword::SetValue),
            "SelectValue" => Some(UftKeyword::SelectValue),
            "GetValue" => Some(UftKeyword::GetValue),
            "VerifyProperty" => Some(UftKeyword::VerifyProperty),
            "VerifyProperty_Table" => Some(UftKeyword::VerifyPropertyTable),
            _ => None,
        }
    }
}

/// Whether the current test case is data driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum TemplateState {
    #[default]
    Plain,
    Template,
}

/// State carried from row to row within one worksheet.
#[derive(Debug)]
struct UftContext {
    test_case: ObjectId,
    module: ModuleState,
    browser: Option<String>,
    /// Browser and page of the last page looked up in the repository
    repository_page: Option<(String, String)>,
    data_table: Option<ObjectId>,
    template: TemplateState,
    /// The last `Page` cell was not found in the repository
    page_missing: bool,
    /// Repository misses of the current row
    misses: Vec<ConnectorError>,
}

impl UftContext {
    fn new(test_case: ObjectId) -> Self {
        UftContext {
            test_case,
            module: ModuleState::AwaitingModule,
            browser: None,
            repository_page: None,
            data_table: None,
            template: TemplateState::Plain,
            page_missing: false,
            misses: Vec::new(),
        }
    }

    /// Keep a repository miss for the row report; every other error passes.
    fn tolerate_miss<T>(&mut self, result: ConnectorResult<T>) -> ConnectorResult<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::RepositoryLookup => {
                self.misses.push(e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// A row whose control was dropped because the object repository had no
/// matching definition. Rows are 1-based spreadsheet rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub sheet: String,
    pub row: usize,
    pub message: String,
}

/// Result of migrating one worksheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UftSheet {
    pub test_case: ObjectId,
    pub skipped: Vec<SkippedRow>,
}

pub struct UftTransformer<'a> {
    definition: &'a Definition,
    repository: &'a dyn ObjectRepository,
    data_sheets: &'a dyn DataSheetSource,
}

impl<'a> UftTransformer<'a> {
    pub fn new(
        definition: &'a Definition,
        repository: &'a dyn ObjectRepository,
        data_sheets: &'a dyn DataSheetSource,
    ) -> Self {
        UftTransformer {
            definition,
            repository,
            data_sheets,
        }
    }

    /// Migrate one worksheet into one test case.
    ///
    /// A repository miss only costs its row the control; the row is reported
    /// in [`UftSheet::skipped`] and migration carries on with the next row.
    pub fn transform_sheet(
        &self,
        grid: &Grid,
        builder: &mut dyn Builder,
    ) -> ConnectorResult<UftSheet> {
        info!(sheet = grid.name(), rows = grid.height(), "migrating UFT worksheet");
        let columns = ColumnMap::from_header(grid, SourceFormat::Uft)?;
        let test_case = builder.create_test_case(grid.name(), &self.definition.test_cases_folder)?;
        let mut context = UftContext::new(test_case);
        let mut skipped = Vec::new();

        for row in grid.data_rows() {
            let bag = columns.field_bag(grid, row);
            self.process_row(&mut context, &bag, builder)
                .map_err(|e| e.at_row(grid.name(), row + 1))?;
            for miss in context.misses.drain(..) {
                warn!(sheet = grid.name(), row = row + 1, error = %miss, "control skipped");
                skipped.push(SkippedRow {
                    sheet: grid.name().to_string(),
                    row: row + 1,
                    message: miss.to_string(),
                });
            }
        }
        Ok(UftSheet { test_case, skipped })
    }

    fn process_row(
        &self,
        context: &mut UftContext,
        bag: &FieldBag<'_>,
        builder: &mut dyn Builder,
    ) -> ConnectorResult<()> {
        if let Some(browser) = bag.get(&Field::Browser) {
            context.browser = Some(browser.to_string());
        }

        if let Some(page) = bag.get(&Field::Page) {
            let opened = self.open_page(context, page, builder);
            let found = context.tolerate_miss(opened)?.is_some();
            context.page_missing = !found;
            if !found {
                context.module = ModuleState::AwaitingModule;
                context.repository_page = None;
            }
        }

        let mut control = ControlDescriptor::default();
        let class_hint = bag.get(&Field::Object).unwrap_or("");
        if !class_hint.is_empty() {
            control.business_type = Some(object_map::business_type(class_hint)?.to_string());
        }

        if let Some(identifier) = bag.get(&Field::Identifier) {
            let resolved = self.resolve_identifier(context, identifier, class_hint, &mut control);
            if context.tolerate_miss(resolved)?.is_none() {
                control = ControlDescriptor::default();
            }
        }

        let keyword = match bag.get(&Field::Keyword) {
            Some(label) => {
                let keyword = UftKeyword::parse(label);
                if keyword.is_none() {
                    warn!(keyword = label, "unrecognized UFT keyword ignored");
                }
                keyword
            }
            None => None,
        };

        let value = match bag.get(&Field::Value) {
            Some(raw) => self.resolve_value(context, raw, builder)?,
            None => String::new(),
        };

        match keyword {
            Some(UftKeyword::Open) => {
                open_url(builder, self.definition, context.test_case, &value)?;
                context.module = ModuleState::AwaitingModule;
                context.page_missing = false;
                return Ok(());
            }
            Some(UftKeyword::CloseWindow) => {
                close_window(builder, self.definition, context.test_case, &value)?;
                context.module = ModuleState::AwaitingModule;
                context.page_missing = false;
                return Ok(());
            }
            _ => {}
        }

        if !control.is_creatable() {
            return Ok(());
        }
        let name = control.name.as_deref().unwrap_or_default();
        let Some((module, test_step)) = context.module.ready() else {
            if context.page_missing {
                context.misses.push(ConnectorError::RepositoryLookup(format!(
                    "control '{}' belongs to a page missing from the object repository",
                    name
                )));
                return Ok(());
            }
            return Err(ConnectorError::SourceFormat(format!(
                "control '{}' appears before any Page",
                name
            )));
        };
        let attribute = if control.is_table() {
            builder.create_module_attribute_as_table(name, module, &control.identifiers)?
        } else {
            builder.create_module_attribute(
                name,
                control.business_type.as_deref().unwrap_or("Control"),
                ActionMode::Input,
                module,
                &control.identifiers,
            )?
        };

        match keyword {
            Some(UftKeyword::Click) => {
                builder.set_test_step_value("{Click}", test_step, attribute, Some(ActionMode::Input))
            }
            Some(UftKeyword::SetValue) | Some(UftKeyword::SelectValue) => {
                builder.set_test_step_value(&value, test_step, attribute, Some(ActionMode::Input))
            }
            Some(UftKeyword::GetValue) => {
                builder.set_test_step_value(&value, test_step, attribute, Some(ActionMode::Buffer))
            }
            Some(UftKeyword::VerifyProperty) => {
                let parts = segments(&value, ":");
                if parts.len() < 2 {
                    return Err(ConnectorError::SourceFormat(format!(
                        "VerifyProperty expects 'property:value', got '{}'",
                        value
                    )));
                }
                let expected = format!("{}={}", parts[0], parts[1..].join(":"));
                builder.set_test_step_value(
                    &expected,
                    test_step,
                    attribute,
                    Some(ActionMode::Verify),
                )
            }
            Some(UftKeyword::VerifyPropertyTable) => {
                let parts = segments(&value, ":");
                if parts.len() < 3 {
                    return Err(ConnectorError::SourceFormat(format!(
                        "VerifyProperty_Table expects 'row:column:value', got '{}'",
                        value
                    )));
                }
                let cell = TableCell {
                    row: format!("#{}", parts[0]),
                    column: format!("#{}", parts[1]),
                };
                builder.set_test_step_value_as_table_cell(
                    &parts[2..].join(":"),
                    test_step,
                    attribute,
                    &cell,
                    Some(ActionMode::Verify),
                )
            }
            Some(UftKeyword::Open) | Some(UftKeyword::CloseWindow) | None => Ok(()),
        }
    }

    /// Create the module and test step for a `Page` cell.
    fn open_page(
        &self,
        context: &mut UftContext,
        page: &str,
        builder: &mut dyn Builder,
    ) -> ConnectorResult<()> {
        let parts = segments(page, ASSIGNMENT_MARKER);
        let page_name = parts
            .last()
            .map(|s| s.to_string())
            .ok_or_else(|| ConnectorError::SourceFormat(format!("empty page '{}'", page)))?;

        let properties = if page.contains(ASSIGNMENT_MARKER) {
            Properties::from([("Title".to_string(), page_name.clone())])
        } else {
            let browser = context.browser.clone().ok_or_else(|| {
                ConnectorError::SourceFormat(format!(
                    "page '{}' refers to the object repository but no Browser is set",
                    page_name
                ))
            })?;
            let properties = self.repository.module_properties(&browser, &page_name)?;
            context.repository_page = Some((browser, page_name.clone()));
            properties
        };

        let module =
            builder.create_module(&page_name, &self.definition.modules_folder, &properties)?;
        let test_step = builder.create_test_step_from_module(&page_name, module, context.test_case)?;
        debug!(page = %page_name, %module, "module ready");
        context.module = ModuleState::ModuleReady { module, test_step };
        Ok(())
    }

    /// Fill in the control name and identifiers from an `Identifier` cell.
    fn resolve_identifier(
        &self,
        context: &UftContext,
        identifier: &str,
        class_hint: &str,
        control: &mut ControlDescriptor,
    ) -> ConnectorResult<()> {
        if identifier.contains(ASSIGNMENT_MARKER) {
            let parts = segments(identifier, ASSIGNMENT_MARKER);
            let [property, value, ..] = parts.as_slice() else {
                return Err(ConnectorError::SourceFormat(format!(
                    "identifier '{}' has no value",
                    identifier
                )));
            };
            let technical_id = object_map::technical_id(property)?;
            control.name = parts.last().map(|s| s.to_string());
            control
                .identifiers
                .insert(technical_id.to_string(), value.to_string());
        } else {
            let (browser, page) = context.repository_page.as_ref().ok_or_else(|| {
                ConnectorError::RepositoryLookup(format!(
                    "control '{}' refers to the object repository but no repository page is open",
                    identifier
                ))
            })?;
            let identifiers =
                self.repository
                    .control_properties(browser, page, class_hint, identifier)?;
            control.name = Some(identifier.to_string());
            control.identifiers.extend(identifiers);
        }
        Ok(())
    }

    /// Apply data-sheet promotion and placeholder rewriting to a `Value` cell.
    fn resolve_value(
        &self,
        context: &mut UftContext,
        raw: &str,
        builder: &mut dyn Builder,
    ) -> ConnectorResult<String> {
        if !is_data_reference(raw) {
            return Ok(raw.to_string());
        }
        if context.template == TemplateState::Plain {
            let test_sheet = match context.data_table {
                Some(id) => id,
                None => {
                    let grid = self.data_sheets.data_sheet()?;
                    let table = data_sheet::transform(
                        &grid,
                        &self.definition.test_case_design_folder,
                        builder,
                    )?;
                    context.data_table = Some(table.test_sheet);
                    table.test_sheet
                }
            };
            builder.convert_test_case_to_template(context.test_case, test_sheet)?;
            context.template = TemplateState::Template;
            info!(test_case = %context.test_case, "test case converted to template");
        }
        Ok(rewrite_data_reference(raw))
    }
}
