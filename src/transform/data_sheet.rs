//! Data-sheet transformer: a tabular data source becomes a test sheet with
//! attributes and one instance per iteration.

use crate::builder::Builder;
use crate::columns::{ColumnMap, Field};
use crate::error::{ConnectorError, ConnectorResult};
use crate::sheet::{Grid, Workbook};
use crate::types::{ObjectId, SourceFormat};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A created test sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataTable {
    pub test_sheet: ObjectId,
    pub name: String,
    /// Attribute name → attribute handle
    pub attributes: BTreeMap<String, ObjectId>,
    pub instances: Vec<DataInstance>,
}

/// One iteration of a test sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataInstance {
    pub id: ObjectId,
    pub name: String,
    /// Attribute name → value
    pub values: BTreeMap<String, String>,
}

/// Where a data-driven test case gets its data sheet from.
pub trait DataSheetSource {
    fn data_sheet(&self) -> ConnectorResult<Grid>;
}

impl DataSheetSource for Grid {
    fn data_sheet(&self) -> ConnectorResult<Grid> {
        Ok(self.clone())
    }
}

/// First worksheet of the first file (by name) in a directory, the way a UFT
/// archive keeps its `Framework/DataSheet`.
#[derive(Debug, Clone)]
pub struct DataSheetDir {
    dir: PathBuf,
}

impl DataSheetDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DataSheetDir { dir: dir.into() }
    }

    fn first_file(&self) -> ConnectorResult<PathBuf> {
        let entries = fs::read_dir(&self.dir).map_err(|e| {
            ConnectorError::DataSheet(format!("cannot read {}: {}", self.dir.display(), e))
        })?;
        let mut files: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        files.sort();
        files.into_iter().next().ok_or_else(|| {
            ConnectorError::DataSheet(format!("no data sheet in {}", self.dir.display()))
        })
    }
}

impl DataSheetSource for DataSheetDir {
    fn data_sheet(&self) -> ConnectorResult<Grid> {
        let path = self.first_file()?;
        debug!(file = %path.display(), "reading data sheet");
        read_first_sheet(&path)
    }
}

fn read_first_sheet(path: &Path) -> ConnectorResult<Grid> {
    Workbook::open(path)
        .and_then(|mut workbook| workbook.first_grid())
        .map_err(|e| e.in_file(path))
}

/// Test sheet under construction.
#[derive(Default)]
struct SheetState {
    table: Option<DataTable>,
    collection: Option<ObjectId>,
}

impl SheetState {
    fn apply_row(
        &mut self,
        grid: &Grid,
        columns: &ColumnMap,
        row: usize,
        folder: &str,
        builder: &mut dyn Builder,
    ) -> ConnectorResult<()> {
        let bag = columns.field_bag(grid, row);
        if bag.is_empty() {
            return Ok(());
        }

        if let Some(name) = bag.get(&Field::SheetName) {
            let test_sheet = builder.create_test_sheet(name, folder)?;
            self.collection = Some(builder.create_instance_collection(test_sheet)?);
            self.table = Some(DataTable {
                test_sheet,
                name: name.to_string(),
                attributes: BTreeMap::new(),
                instances: Vec::new(),
            });
        }

        let mut instance: Option<usize> = None;
        if let Some(iteration) = bag.get(&Field::Iteration) {
            let (Some(table), Some(collection)) = (self.table.as_mut(), self.collection) else {
                return Err(ConnectorError::DataSheet(
                    "Iteration before any TC_Name".to_string(),
                ));
            };
            let name = format!("TC_{}", iteration);
            let id = builder.create_instance(&name, collection)?;
            table.instances.push(DataInstance {
                id,
                name,
                values: BTreeMap::new(),
            });
            instance = Some(table.instances.len() - 1);
        }

        for (col, field) in columns.iter() {
            let Field::Attribute(attribute) = field else {
                continue;
            };
            let value = grid.cell(row, col);
            if value.is_empty() {
                continue;
            }
            let Some(table) = self.table.as_mut() else {
                return Err(ConnectorError::DataSheet(format!(
                    "value for '{}' before any TC_Name",
                    attribute
                )));
            };
            let Some(index) = instance else {
                return Err(ConnectorError::DataSheet(format!(
                    "value for '{}' in a row without Iteration",
                    attribute
                )));
            };
            let attribute_id = match table.attributes.get(attribute) {
                Some(id) => *id,
                None => {
                    let id = builder.create_td_attribute(attribute, table.test_sheet)?;
                    table.attributes.insert(attribute.clone(), id);
                    id
                }
            };
            let target = &mut table.instances[index];
            builder.set_attribute_value(value, attribute_id, target.id)?;
            target.values.insert(attribute.clone(), value.to_string());
        }
        Ok(())
    }
}

/// Build a test sheet from `grid` in the test-case-design `folder`.
///
/// Identity columns (`TC_Name`, `Iteration`) of a row are applied before its
/// attribute columns, so column order within a row does not matter. A
/// `TC_Name` starts a new test sheet; the returned table is the last one.
pub fn transform(
    grid: &Grid,
    folder: &str,
    builder: &mut dyn Builder,
) -> ConnectorResult<DataTable> {
    let columns = ColumnMap::from_header(grid, SourceFormat::DataSheet)?;
    let mut state = SheetState::default();

    for row in grid.data_rows() {
        state
            .apply_row(grid, &columns, row, folder, builder)
            .map_err(|e| e.at_row(grid.name(), row + 1))?;
    }

    let table = state.table.ok_or_else(|| {
        ConnectorError::DataSheet(format!("worksheet '{}' has no TC_Name", grid.name()))
    })?;
    info!(
        sheet = %table.name,
        attributes = table.attributes.len(),
        instances = table.instances.len(),
        "data sheet migrated"
    );
    Ok(table)
}
