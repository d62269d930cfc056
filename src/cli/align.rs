//! Align a build.
//!
//! Reads the build description, registers every module with one shared
//! [`AlignmentBarrier`] from concurrent blocking tasks, and writes the finished model.
//! Exactly one registration performs the alignment; the command checks that.
//!
//! When the output model already exists from an earlier run it is read first. Its aligned
//! dependencies seed the new run and its project version is continued, so aligning the same
//! build twice yields `-00002` rather than a second `-00001`. Pass `--fresh` to ignore it.

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::Colorize;
use futures::future::join_all;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use super::CliConfig;
use crate::alignment::{AlignmentAuthority, DependencySource};
use crate::authority::FileAuthority;
use crate::barrier::{AlignmentBarrier, RegistrationStatus};
use crate::config::{AlignmentConfig, BuildDescription, parse_property};
use crate::core::AlignError;
use crate::model::{AlignmentModel, MODEL_FILE_NAME};
use crate::report::AlignmentReport;

#[derive(Args, Debug)]
pub struct AlignCommand {
    /// Build description listing every module and its dependencies
    #[arg(short, long, value_name = "FILE")]
    pub build: PathBuf,

    /// Where to write the alignment model
    #[arg(short, long, value_name = "FILE", default_value = MODEL_FILE_NAME)]
    pub output: PathBuf,

    /// Write a text report of every change
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Write a JSON report of every change
    #[arg(long, value_name = "FILE")]
    pub report_json: Option<PathBuf>,

    /// Ignore an existing model at the output path instead of continuing from it
    #[arg(long)]
    pub fresh: bool,

    /// Configuration property, e.g. `-D versionIncrementalSuffix=temporary`
    #[arg(short = 'D', value_name = "KEY=VALUE", value_parser = parse_property)]
    pub properties: Vec<(String, String)>,
}

impl AlignCommand {
    /// # Errors
    ///
    /// Returns configuration errors before any module registers, then the first
    /// registration or alignment failure.
    pub async fn execute(self, cli_config: &CliConfig) -> Result<()> {
        let mut config = cli_config.load()?;
        config.apply_properties(self.properties.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;
        config.validate()?;
        info!("Running alignment with {:?}", config);

        let build = BuildDescription::load(&self.build)?;
        let previous = self.previous_model()?;
        let barrier = Arc::new(self.barrier(&config, &build, previous.as_ref(), cli_config)?);
        let registrations = build.registrations()?;
        let total = registrations.len();

        let tasks = registrations.into_iter().map(|registration| {
            let barrier = Arc::clone(&barrier);
            tokio::task::spawn_blocking(move || barrier.register(registration))
        });

        let mut completed = 0;
        let mut first_error: Option<AlignError> = None;
        for joined in join_all(tasks).await {
            match joined.context("Module registration task panicked")? {
                Ok(RegistrationStatus::Complete(_)) => completed += 1,
                Ok(RegistrationStatus::Pending { remaining }) => {
                    debug!("Registration stored, {} modules remaining", remaining);
                }
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e.into());
        }
        if completed != 1 {
            bail!("Expected exactly one registration to complete the alignment, saw {completed}");
        }

        let model = barrier.finished_model()?;
        let handle = barrier.handle()?;
        model.save(&self.output)?;

        let report = AlignmentReport::from_model(&model, &handle, config.report_non_aligned);
        if let Some(path) = &self.report {
            report.write_text(path)?;
        }
        if let Some(path) = &self.report_json {
            report.write_json(path)?;
        }

        if handle.skipped_by_policy {
            println!(
                "{} Dependency source is '{}', no dependencies were aligned",
                "!".yellow(),
                config.dependency_source
            );
        }
        println!(
            "{} Aligned {} modules ({} replacements), project version {}",
            "✓".green(),
            total,
            report.replacement_count(),
            handle.new_project_version.as_str().bold()
        );
        println!("  Model written to {}", self.output.display());
        Ok(())
    }

    /// The model an earlier run left at the output path, if any.
    fn previous_model(&self) -> Result<Option<AlignmentModel>> {
        if self.fresh || !self.output.exists() {
            return Ok(None);
        }
        let model = AlignmentModel::load(&self.output).with_context(|| {
            format!(
                "Existing model {} is unreadable; remove it or pass --fresh",
                self.output.display()
            )
        })?;
        info!(
            "Continuing from existing model {} with project version {}",
            self.output.display(),
            model.root().version().unwrap_or("<unset>")
        );
        Ok(Some(model))
    }

    fn barrier(
        &self,
        config: &AlignmentConfig,
        build: &BuildDescription,
        previous: Option<&AlignmentModel>,
        cli_config: &CliConfig,
    ) -> Result<AlignmentBarrier> {
        let authority: Option<Arc<dyn AlignmentAuthority>> = match config.dependency_source {
            DependencySource::Rest => config
                .authority_path(&cli_config.base_dir())
                .map(|path| Arc::new(FileAuthority::new(path)) as Arc<dyn AlignmentAuthority>),
            DependencySource::None => None,
        };

        let orchestrator = config.orchestrator(authority, previous)?;
        let model = build.to_model()?;
        let barrier = AlignmentBarrier::new(model, orchestrator, config.barrier_policy())
            .with_context(|| format!("Cannot prepare alignment of {}", self.build.display()))?;
        Ok(match previous {
            Some(previous) => barrier.with_previous_model(previous),
            None => barrier,
        })
    }
}
