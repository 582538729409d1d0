//! Column mapper: header labels → semantic fields, per source format.

use crate::error::{ConnectorError, ConnectorResult};
use crate::sheet::Grid;
use crate::types::SourceFormat;
use std::collections::BTreeMap;

/// Semantic meaning of a mapped column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    // UFT
    Browser,
    Page,
    Object,
    Identifier,
    // UFT and Selenium
    Keyword,
    Value,
    // Selenium
    LocatorType,
    LocatorValue,
    // Manual
    TestCase,
    Action,
    InputParameter,
    ExpectedResult,
    // Data sheet
    SheetName,
    Iteration,
    Attribute(String),
}

const UFT_LABELS: &[(&str, Field)] = &[
    ("Browser", Field::Browser),
    ("Page", Field::Page),
    ("Object", Field::Object),
    ("Identifier", Field::Identifier),
    ("Keyword", Field::Keyword),
    ("Value", Field::Value),
];

const SELENIUM_LABELS: &[(&str, Field)] = &[
    ("FunctionKeyword", Field::Keyword),
    ("Locator Type", Field::LocatorType),
    ("Locator Value", Field::LocatorValue),
    ("Test Data", Field::Value),
];

const MANUAL_LABELS: &[(&str, Field)] = &[
    ("TestCase", Field::TestCase),
    ("Action", Field::Action),
    ("Input Parameter", Field::InputParameter),
    ("Expected Result", Field::ExpectedResult),
];

impl SourceFormat {
    /// Field for a header label. Matching is exact and case-sensitive.
    pub fn field_for_label(self, label: &str) -> Option<Field> {
        let table = match self {
            SourceFormat::Uft => UFT_LABELS,
            SourceFormat::Selenium => SELENIUM_LABELS,
            SourceFormat::Manual => MANUAL_LABELS,
            SourceFormat::DataSheet => {
                return match label {
                    "" => None,
                    "TC_Name" => Some(Field::SheetName),
                    "Iteration" => Some(Field::Iteration),
                    other => Some(Field::Attribute(other.to_string())),
                };
            }
        };
        table
            .iter()
            .find(|(known, _)| *known == label)
            .map(|(_, field)| field.clone())
    }
}

/// Column index → field for one worksheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    columns: BTreeMap<usize, Field>,
}

impl ColumnMap {
    /// Map the header row of `grid`. Unknown labels stay unmapped.
    pub fn from_header(grid: &Grid, format: SourceFormat) -> ConnectorResult<Self> {
        let mut columns = BTreeMap::new();
        let mut seen: BTreeMap<Field, usize> = BTreeMap::new();
        for col in 0..grid.width() {
            let label = grid.header(col);
            let Some(field) = format.field_for_label(label) else {
                continue;
            };
            if let Some(first) = seen.insert(field.clone(), col) {
                return Err(ConnectorError::SourceFormat(format!(
                    "worksheet '{}': header '{}' appears in columns {} and {}",
                    grid.name(),
                    label,
                    first + 1,
                    col + 1
                )));
            }
            columns.insert(col, field);
        }
        Ok(ColumnMap { columns })
    }

    pub fn field(&self, col: usize) -> Option<&Field> {
        self.columns.get(&col)
    }

    pub fn column_of(&self, field: &Field) -> Option<usize> {
        self.columns
            .iter()
            .find(|(_, f)| *f == field)
            .map(|(col, _)| *col)
    }

    /// Mapped columns in column order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Field)> {
        self.columns.iter().map(|(col, field)| (*col, field))
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Field bag for one row: every mapped, non-empty cell.
    pub fn field_bag<'g>(&self, grid: &'g Grid, row: usize) -> FieldBag<'g> {
        let values = self
            .iter()
            .filter_map(|(col, field)| {
                let text = grid.cell(row, col);
                (!text.is_empty()).then(|| (field.clone(), text))
            })
            .collect();
        FieldBag { values }
    }
}

/// Per-row field → cell text. Empty cells are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldBag<'g> {
    values: BTreeMap<Field, &'g str>,
}

impl<'g> FieldBag<'g> {
    pub fn get(&self, field: &Field) -> Option<&'g str> {
        self.values.get(field).copied()
    }

    pub fn contains(&self, field: &Field) -> bool {
        self.values.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selenium_header_mapping() {
        let grid = Grid::from_rows(
            "Login",
            &[vec!["Step", "FunctionKeyword", "Locator Type", "Locator Value", "Test Data"]],
        )
        .unwrap();
        let map = ColumnMap::from_header(&grid, SourceFormat::Selenium).unwrap();
        assert_eq!(map.field(0), None);
        assert_eq!(map.field(1), Some(&Field::Keyword));
        assert_eq!(map.field(4), Some(&Field::Value));
        assert_eq!(map.column_of(&Field::LocatorValue), Some(3));
    }

    #[test]
    fn test_label_matching_is_case_sensitive() {
        assert_eq!(SourceFormat::Uft.field_for_label("keyword"), None);
        assert_eq!(SourceFormat::Uft.field_for_label("Keyword"), Some(Field::Keyword));
    }

    #[test]
    fn test_data_sheet_labels_become_attributes() {
        assert_eq!(
            SourceFormat::DataSheet.field_for_label("UserName"),
            Some(Field::Attribute("UserName".to_string()))
        );
        assert_eq!(SourceFormat::DataSheet.field_for_label("TC_Name"), Some(Field::SheetName));
        assert_eq!(SourceFormat::DataSheet.field_for_label(""), None);
    }

    #[test]
    fn test_duplicate_header_rejected() {
        let grid = Grid::from_rows("Dup", &[vec!["Keyword", "Value", "Keyword"]]).unwrap();
        let result = ColumnMap::from_header(&grid, SourceFormat::Uft);
        assert!(matches!(result, Err(ConnectorError::SourceFormat(_))));
    }

    #[test]
    fn test_field_bag_skips_empty_cells() {
        let grid = Grid::from_rows(
            "Sheet1",
            &[vec!["Keyword", "Value", "Notes"], vec!["Click", "", "ignored"]],
        )
        .unwrap();
        let map = ColumnMap::from_header(&grid, SourceFormat::Uft).unwrap();
        let bag = map.field_bag(&grid, 1);
        assert_eq!(bag.get(&Field::Keyword), Some("Click"));
        assert!(!bag.contains(&Field::Value));
    }
}
