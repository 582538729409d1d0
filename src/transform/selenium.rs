//! Selenium keyword spreadsheets.
//!
//! Pages are not named in the source, so modules are generated as `Page1`,
//! `Page2`, ... with a wildcard title. A button click is taken to leave the
//! current page: the next control starts a new module.

use super::{close_window, open_url, ModuleState};
use crate::builder::Builder;
use crate::columns::{ColumnMap, Field, FieldBag};
use crate::config::Definition;
use crate::error::{ConnectorError, ConnectorResult};
use crate::object_map;
use crate::sheet::Grid;
use crate::types::{ActionMode, ObjectId, Properties, SourceFormat};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeleniumKeyword {
    EnterUrl,
    CloseWindow,
    ClickOnButton,
    Select,
    EnterText,
}

impl SeleniumKeyword {
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "enter_URL" => Some(SeleniumKeyword::EnterUrl),
            "close_Window" => Some(SeleniumKeyword::CloseWindow),
            "click_On_Button" => Some(SeleniumKeyword::ClickOnButton),
            "select" => Some(SeleniumKeyword::Select),
            "enter_Text" => Some(SeleniumKeyword::EnterText),
            _ => None,
        }
    }

    /// Business type of the control the keyword acts on.
    fn business_type(self) -> Option<&'static str> {
        match self {
            SeleniumKeyword::ClickOnButton => Some("Button"),
            SeleniumKeyword::Select => Some("ComboBox"),
            SeleniumKeyword::EnterText => Some("TextBox"),
            SeleniumKeyword::EnterUrl | SeleniumKeyword::CloseWindow => None,
        }
    }
}

#[derive(Debug)]
struct SeleniumContext {
    test_case: ObjectId,
    module: ModuleState,
    page_number: usize,
}

pub struct SeleniumTransformer<'a> {
    definition: &'a Definition,
}

impl<'a> SeleniumTransformer<'a> {
    pub fn new(definition: &'a Definition) -> Self {
        SeleniumTransformer { definition }
    }

    pub fn transform_sheet(
        &self,
        grid: &Grid,
        builder: &mut dyn Builder,
    ) -> ConnectorResult<ObjectId> {
        info!(sheet = grid.name(), rows = grid.height(), "migrating Selenium worksheet");
        let columns = ColumnMap::from_header(grid, SourceFormat::Selenium)?;
        let test_case = builder.create_test_case(grid.name(), &self.definition.test_cases_folder)?;
        let mut context = SeleniumContext {
            test_case,
            module: ModuleState::AwaitingModule,
            page_number: 1,
        };

        for row in grid.data_rows() {
            let bag = columns.field_bag(grid, row);
            self.process_row(&mut context, &bag, builder)
                .map_err(|e| e.at_row(grid.name(), row + 1))?;
        }
        Ok(test_case)
    }

    fn process_row(
        &self,
        context: &mut SeleniumContext,
        bag: &FieldBag<'_>,
        builder: &mut dyn Builder,
    ) -> ConnectorResult<()> {
        let Some(label) = bag.get(&Field::Keyword) else {
            return Ok(());
        };
        let Some(keyword) = SeleniumKeyword::parse(label) else {
            warn!(keyword = label, "unrecognized Selenium keyword ignored");
            return Ok(());
        };
        let data = bag.get(&Field::Value).unwrap_or("");

        let Some(business_type) = keyword.business_type() else {
            if keyword == SeleniumKeyword::EnterUrl {
                open_url(builder, self.definition, context.test_case, data)?;
            } else {
                close_window(builder, self.definition, context.test_case, data)?;
            }
            context.module = ModuleState::AwaitingModule;
            return Ok(());
        };

        let Some(locator_value) = bag.get(&Field::LocatorValue) else {
            warn!(keyword = label, "no locator value, row skipped");
            return Ok(());
        };
        let locator_type = bag.get(&Field::LocatorType).ok_or_else(|| {
            ConnectorError::SourceFormat(format!("locator '{}' has no locator type", locator_value))
        })?;
        let identifiers = Properties::from([(
            object_map::locator_technical_id(locator_type)?.to_string(),
            locator_value.to_string(),
        )]);

        let (module, test_step) = self.ensure_module(context, builder)?;
        let attribute = builder.create_module_attribute(
            locator_value,
            business_type,
            ActionMode::Input,
            module,
            &identifiers,
        )?;
        let value = if keyword == SeleniumKeyword::ClickOnButton {
            "{CLICK}"
        } else {
            data
        };
        builder.set_test_step_value(value, test_step, attribute, Some(ActionMode::Input))?;

        if keyword == SeleniumKeyword::ClickOnButton {
            context.module = ModuleState::AwaitingModule;
            context.page_number += 1;
        }
        Ok(())
    }

    fn ensure_module(
        &self,
        context: &mut SeleniumContext,
        builder: &mut dyn Builder,
    ) -> ConnectorResult<(ObjectId, ObjectId)> {
        if let Some(ready) = context.module.ready() {
            return Ok(ready);
        }
        let name = format!("Page{}", context.page_number);
        let properties = Properties::from([("Title".to_string(), "*".to_string())]);
        let module = builder.create_module(&name, &self.definition.modules_folder, &properties)?;
        let test_step = builder.create_test_step_from_module(&name, module, context.test_case)?;
        debug!(page = %name, %module, "module ready");
        context.module = ModuleState::ModuleReady { module, test_step };
        Ok((module, test_step))
    }
}
