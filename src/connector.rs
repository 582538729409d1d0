//! Connectors: one per source format. They find the workbooks to migrate,
//! run the matching transformer over every worksheet, and apply the
//! per-file failure policy.

use crate::builder::Builder;
use crate::config::Definition;
use crate::error::{ConnectorError, ConnectorResult};
use crate::repository::RepositoryIndex;
use crate::sheet::Workbook;
use crate::transform::{DataSheetDir, ManualTransformer, SeleniumTransformer, UftTransformer};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// What to do when one file fails to migrate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop at the first failing file.
    #[default]
    Abort,
    /// Record the failure and carry on with the next file. Objects created
    /// before the failure stay in the builder.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub message: String,
}

/// A row that migrated without its control: the object repository had no
/// matching definition for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowWarning {
    pub path: PathBuf,
    pub sheet: String,
    pub row: usize,
    pub message: String,
}

/// Outcome of a migration run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationSummary {
    pub files_processed: Vec<PathBuf>,
    pub failures: Vec<FileFailure>,
    pub skipped_rows: Vec<RowWarning>,
    pub objects_created: BTreeMap<String, usize>,
}

impl MigrationSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Attach per-kind object counts, e.g. from `ObjectModel::counts_by_kind`.
    pub fn with_object_counts<K: ToString>(mut self, counts: BTreeMap<K, usize>) -> Self {
        self.objects_created = counts
            .into_iter()
            .map(|(kind, count)| (kind.to_string(), count))
            .collect();
        self
    }

    pub fn merge(&mut self, other: MigrationSummary) {
        self.files_processed.extend(other.files_processed);
        self.failures.extend(other.failures);
        self.skipped_rows.extend(other.skipped_rows);
        for (kind, count) in other.objects_created {
            *self.objects_created.entry(kind).or_insert(0) += count;
        }
    }

    fn record(
        &mut self,
        path: &Path,
        result: ConnectorResult<()>,
        policy: FailurePolicy,
    ) -> ConnectorResult<()> {
        match result {
            Ok(()) => {
                self.files_processed.push(path.to_path_buf());
                Ok(())
            }
            Err(e) => {
                let e = e.in_file(path);
                match policy {
                    FailurePolicy::Abort => Err(e),
                    FailurePolicy::Skip => {
                        warn!(file = %path.display(), error = %e, "file skipped");
                        self.failures.push(FileFailure {
                            path: path.to_path_buf(),
                            message: e.to_string(),
                        });
                        Ok(())
                    }
                }
            }
        }
    }
}

/// Regular files of `dir`, sorted by name.
fn sorted_files(dir: &Path) -> ConnectorResult<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| ConnectorError::from(e).in_file(dir))?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}

/// Migrates an extracted UFT archive.
pub struct UftConnector<'a> {
    definition: &'a Definition,
    policy: FailurePolicy,
}

impl<'a> UftConnector<'a> {
    pub fn new(definition: &'a Definition, policy: FailurePolicy) -> Self {
        UftConnector { definition, policy }
    }

    /// Migrate every workbook in `Framework/TestCase` of the archive at `dir`.
    pub fn migrate_archive(
        &self,
        dir: &Path,
        builder: &mut dyn Builder,
    ) -> ConnectorResult<MigrationSummary> {
        let definition = self.definition.clone().with_migration_folder(dir);
        let test_case_dir = definition.test_case_dir();
        if !test_case_dir.is_dir() {
            return Err(ConnectorError::SourceFormat(format!(
                "{} is not an extracted UFT archive: no Framework/TestCase directory",
                dir.display()
            )));
        }

        let repository = RepositoryIndex::load_dir(&definition.object_repository_dir())?;
        let data_sheets = DataSheetDir::new(definition.data_sheet_dir());
        info!(
            archive = %dir.display(),
            repository_pages = repository.page_count(),
            "migrating UFT archive"
        );
        let transformer = UftTransformer::new(&definition, &repository, &data_sheets);

        let mut summary = MigrationSummary::default();
        for path in sorted_files(&test_case_dir)? {
            info!(file = %path.display(), "migrating test script");
            let mut skipped = Vec::new();
            let result = Workbook::open(&path).and_then(|mut workbook| {
                for grid in workbook.grids()? {
                    skipped.extend(transformer.transform_sheet(&grid, builder)?.skipped);
                }
                Ok(())
            });
            summary
                .skipped_rows
                .extend(skipped.into_iter().map(|row| RowWarning {
                    path: path.clone(),
                    sheet: row.sheet,
                    row: row.row,
                    message: row.message,
                }));
            summary.record(&path, result, self.policy)?;
        }
        Ok(summary)
    }
}

/// Migrates Selenium keyword workbooks.
pub struct SeleniumConnector<'a> {
    definition: &'a Definition,
    policy: FailurePolicy,
}

impl<'a> SeleniumConnector<'a> {
    pub fn new(definition: &'a Definition, policy: FailurePolicy) -> Self {
        SeleniumConnector { definition, policy }
    }

    pub fn migrate_file(
        &self,
        path: &Path,
        builder: &mut dyn Builder,
    ) -> ConnectorResult<MigrationSummary> {
        info!(file = %path.display(), "migrating Selenium workbook");
        let transformer = SeleniumTransformer::new(self.definition);
        let result = Workbook::open(path).and_then(|mut workbook| {
            for grid in workbook.grids()? {
                transformer.transform_sheet(&grid, builder)?;
            }
            Ok(())
        });
        let mut summary = MigrationSummary::default();
        summary.record(path, result, self.policy)?;
        Ok(summary)
    }
}

/// Migrates manual test-case workbooks.
pub struct ManualConnector<'a> {
    definition: &'a Definition,
    policy: FailurePolicy,
}

impl<'a> ManualConnector<'a> {
    pub fn new(definition: &'a Definition, policy: FailurePolicy) -> Self {
        ManualConnector { definition, policy }
    }

    pub fn migrate_file(
        &self,
        path: &Path,
        builder: &mut dyn Builder,
    ) -> ConnectorResult<MigrationSummary> {
        info!(file = %path.display(), "migrating manual test-case workbook");
        let transformer = ManualTransformer::new(self.definition);
        let result = Workbook::open(path).and_then(|mut workbook| {
            for grid in workbook.grids()? {
                transformer.transform_sheet(&grid, builder)?;
            }
            Ok(())
        });
        let mut summary = MigrationSummary::default();
        summary.record(path, result, self.policy)?;
        Ok(summary)
    }
}
