use std::path::PathBuf;
use thiserror::Error;

pub type ConnectorResult<T> = Result<T, ConnectorError>;

#[derive(Error, Debug)]
pub enum ConnectorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Source format error: {0}")]
    SourceFormat(String),

    #[error("Mapping error: {0}")]
    Mapping(String),

    #[error("Repository lookup error: {0}")]
    RepositoryLookup(String),

    #[error("Data sheet error: {0}")]
    DataSheet(String),

    #[error("Builder error: {0}")]
    Builder(String),

    #[error("sheet '{sheet}', row {row}: {source}")]
    Row {
        sheet: String,
        row: usize,
        #[source]
        source: Box<ConnectorError>,
    },

    #[error("{}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: Box<ConnectorError>,
    },
}

/// Coarse classification of a [`ConnectorError`], looking through location wrappers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Serialization,
    Spreadsheet,
    Xml,
    Config,
    SourceFormat,
    Mapping,
    RepositoryLookup,
    DataSheet,
    Builder,
}

impl ConnectorError {
    /// Attach the worksheet name and 1-based row number to an error.
    pub fn at_row(self, sheet: &str, row: usize) -> Self {
        ConnectorError::Row {
            sheet: sheet.to_string(),
            row,
            source: Box::new(self),
        }
    }

    /// Attach the source file to an error.
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        ConnectorError::File {
            path: path.into(),
            source: Box::new(self),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ConnectorError::Io(_) => ErrorKind::Io,
            ConnectorError::Yaml(_) | ConnectorError::Json(_) => ErrorKind::Serialization,
            ConnectorError::Spreadsheet(_) => ErrorKind::Spreadsheet,
            ConnectorError::Xml(_) => ErrorKind::Xml,
            ConnectorError::Config(_) => ErrorKind::Config,
            ConnectorError::SourceFormat(_) => ErrorKind::SourceFormat,
            ConnectorError::Mapping(_) => ErrorKind::Mapping,
            ConnectorError::RepositoryLookup(_) => ErrorKind::RepositoryLookup,
            ConnectorError::DataSheet(_) => ErrorKind::DataSheet,
            ConnectorError::Builder(_) => ErrorKind::Builder,
            ConnectorError::Row { source, .. } | ConnectorError::File { source, .. } => {
                source.kind()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_looks_through_location() {
        let err = ConnectorError::Mapping("unknown class 'WebFoo'".to_string())
            .at_row("Login", 4)
            .in_file("Framework/TestCase/login.xlsx");
        assert_eq!(err.kind(), ErrorKind::Mapping);
    }

    #[test]
    fn test_located_message() {
        let err = ConnectorError::RepositoryLookup("no page 'Home'".to_string())
            .at_row("Login", 3)
            .in_file("login.xlsx");
        let msg = err.to_string();
        assert!(msg.starts_with("login.xlsx: sheet 'Login', row 3"));
        assert!(msg.contains("no page 'Home'"));
    }
}
