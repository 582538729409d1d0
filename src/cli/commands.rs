use crate::builder::ObjectModel;
use crate::config::Definition;
use crate::connector::{
    FailurePolicy, ManualConnector, MigrationSummary, SeleniumConnector, UftConnector,
};
use crate::error::ConnectorResult;
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Options shared by every migration command.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Object model output (`.json` for JSON, YAML otherwise)
    pub output: PathBuf,
    /// Definition YAML; built-in defaults when absent
    pub definition: Option<PathBuf>,
    pub keep_going: bool,
    pub verbose: bool,
}

impl RunOptions {
    fn policy(&self) -> FailurePolicy {
        if self.keep_going {
            FailurePolicy::Skip
        } else {
            FailurePolicy::Abort
        }
    }

    fn load_definition(&self) -> ConnectorResult<Definition> {
        match &self.definition {
            Some(path) => {
                if self.verbose {
                    println!("   Definition: {}", path.display());
                }
                Definition::from_file(path)
            }
            None => Ok(Definition::default()),
        }
    }
}

/// Execute the uft command
pub fn uft(archive: PathBuf, options: &RunOptions) -> ConnectorResult<MigrationSummary> {
    println!("{}", "🧪 tc-connector - UFT archive migration".bold().green());
    println!("   Archive: {}", archive.display());
    println!("   Output:  {}\n", options.output.display());

    let definition = options
        .load_definition()?
        .with_migration_folder(&archive);
    let mut model = ObjectModel::new(definition.engine.clone());
    let summary = UftConnector::new(&definition, options.policy())
        .migrate_archive(&archive, &mut model)?;
    finish(model, summary, options)
}

/// Execute the selenium command
pub fn selenium(files: Vec<PathBuf>, options: &RunOptions) -> ConnectorResult<MigrationSummary> {
    println!("{}", "🧪 tc-connector - Selenium migration".bold().green());
    print_inputs(&files, options);

    let definition = options.load_definition()?;
    let mut model = ObjectModel::new(definition.engine.clone());
    let connector = SeleniumConnector::new(&definition, options.policy());
    let mut summary = MigrationSummary::default();
    for file in &files {
        summary.merge(connector.migrate_file(file, &mut model)?);
    }
    finish(model, summary, options)
}

/// Execute the manual command
pub fn manual(files: Vec<PathBuf>, options: &RunOptions) -> ConnectorResult<MigrationSummary> {
    println!("{}", "🧪 tc-connector - Manual test case migration".bold().green());
    print_inputs(&files, options);

    // manual test cases are not bound to a steering engine
    let definition = options.load_definition()?.without_engine();
    let mut model = ObjectModel::new(None);
    let connector = ManualConnector::new(&definition, options.policy());
    let mut summary = MigrationSummary::default();
    for file in &files {
        summary.merge(connector.migrate_file(file, &mut model)?);
    }
    finish(model, summary, options)
}

fn print_inputs(files: &[PathBuf], options: &RunOptions) {
    for file in files {
        println!("   Input:  {}", file.display());
    }
    println!("   Output: {}\n", options.output.display());
}

/// Write the model and print the run summary.
fn finish(
    model: ObjectModel,
    summary: MigrationSummary,
    options: &RunOptions,
) -> ConnectorResult<MigrationSummary> {
    if options.verbose {
        println!("{}", "💾 Writing object model...".cyan());
    }
    model.write(&options.output)?;
    let summary = summary.with_object_counts(model.counts_by_kind());
    print_summary(&summary, &options.output, options.verbose);
    Ok(summary)
}

fn print_summary(summary: &MigrationSummary, output: &Path, verbose: bool) {
    if summary.is_success() {
        println!("{}", "✅ Migration Complete!".bold().green());
    } else {
        println!(
            "{}",
            format!(
                "⚠️  Migration finished with {} failed file(s)",
                summary.failures.len()
            )
            .bold()
            .yellow()
        );
    }
    println!("   Files migrated: {}", summary.files_processed.len());
    if verbose {
        for file in &summary.files_processed {
            println!("      {}", file.display());
        }
    }
    for (kind, count) in &summary.objects_created {
        println!("   {} {}", format!("{:<34}", kind).bright_blue(), count);
    }
    for failure in &summary.failures {
        println!("   {} {}", "❌".red(), failure.message.red());
    }
    if !summary.skipped_rows.is_empty() {
        println!(
            "   {}",
            format!("{} row(s) migrated without their control", summary.skipped_rows.len())
                .yellow()
        );
    }
    for skipped in &summary.skipped_rows {
        println!(
            "      {} [{}] row {}: {}",
            skipped.path.display(),
            skipped.sheet,
            skipped.row,
            skipped.message.yellow()
        );
    }
    println!("   Object model: {}\n", output.display());
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
