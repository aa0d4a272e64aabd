//! Per-table orchestration: compose the base and model skeletons, render
//! both artifacts and reconcile each one independently. Bulk runs isolate
//! failures per table and finish with a stale-file sweep of the output
//! directory.

use crate::composer::{ParentSource, SkeletonComposer};
use crate::descriptor::ParentDescriptor;
use crate::guard::{Confirm, FileStore, OverridePolicy, RegenerationGuard};
use crate::templates::{self, Template};
use heck::{ToSnakeCase, ToUpperCamelCase};
use sculpt_core::{Config, Pattern, RunSummary, SculptResult, TableReport, Warning};
use sculpt_introspect::SchemaProvider;
use std::path::PathBuf;

pub struct ModelGenerator<'a, S: FileStore> {
    config: &'a Config,
    descriptor: ParentDescriptor,
    guard: RegenerationGuard<S>,
    output_dir: PathBuf,
    base_template: Template,
    model_template: Template,
    produced: Vec<PathBuf>,
}

impl<'a, S: FileStore> ModelGenerator<'a, S> {
    pub fn new(config: &'a Config, descriptor: ParentDescriptor, store: S) -> Self {
        let output_dir = PathBuf::from(
            config
                .get_str("generation.output_dir")
                .unwrap_or("generated"),
        );
        Self {
            config,
            descriptor,
            guard: RegenerationGuard::new(store),
            output_dir,
            base_template: Template::base(),
            model_template: Template::model(),
            produced: Vec::new(),
        }
    }

    pub fn with_templates(mut self, base: Template, model: Template) -> Self {
        self.base_template = base;
        self.model_template = model;
        self
    }

    pub fn store(&self) -> &S {
        self.guard.store()
    }

    /// Ordered pass list: `generation.passes` from config, or the stock
    /// order.
    fn pass_ids(&self) -> SculptResult<Vec<String>> {
        match self.config.get("generation.passes") {
            None => Ok(crate::passes::DEFAULT_PASS_IDS
                .iter()
                .map(|s| s.to_string())
                .collect()),
            Some(value) => value
                .as_sequence()
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|v| v.as_str().map(str::to_string))
                        .collect()
                })
                .ok_or_else(|| {
                    sculpt_core::SculptError::Configuration(
                        "generation.passes must be a list of pass ids".to_string(),
                    )
                }),
        }
    }

    /// Generate both artifacts for one table. The base file follows the
    /// run's override policy; the model file is generated once and never
    /// overwritten.
    pub fn generate_table(
        &mut self,
        provider: &dyn SchemaProvider,
        table_name: &str,
        policy: OverridePolicy,
        confirm: &mut dyn Confirm,
    ) -> SculptResult<(TableReport, Vec<Warning>)> {
        let table = provider.describe_table(table_name)?;
        let namespace = self.config.get_str("generation.namespace").unwrap_or("models");
        let base_suffix = self.config.get_str("generation.base_suffix").unwrap_or("Base");

        let class_name = table.name.to_upper_camel_case();
        let base_class = format!("{}{}", class_name, base_suffix);
        let module = table.name.to_snake_case();

        let pass_ids = self.pass_ids()?;
        let pass_refs: Vec<&str> = pass_ids.iter().map(String::as_str).collect();
        let composer = SkeletonComposer::with_passes(self.config, &pass_refs)?;

        let base = composer.compose(
            &table,
            &base_class,
            &format!("{}::base", namespace),
            ParentSource::Descriptor(&self.descriptor),
            true,
        )?;

        let model = SkeletonComposer::with_passes(self.config, &[])?.compose(
            &table,
            &class_name,
            namespace,
            ParentSource::Skeleton(&base),
            false,
        )?;

        let base_content =
            templates::render(&self.base_template, &templates::base_context(&base, &table.name))?;
        let model_content =
            templates::render(&self.model_template, &templates::model_context(&model, &module))?;

        let base_path = self.output_dir.join("base").join(format!("{}.rs", module));
        let model_path = self.output_dir.join(format!("{}.rs", module));

        let mut report = TableReport::new(&table.name);
        let mut warnings = Vec::new();

        let outcome = self.guard.reconcile(
            &base_path,
            &base_content,
            policy,
            Some(&self.descriptor.name),
            confirm,
        )?;
        self.produced.push(base_path.clone());
        report.record(base_path, outcome.outcome);
        warnings.extend(outcome.warnings);

        let outcome = self.guard.reconcile(
            &model_path,
            &model_content,
            OverridePolicy::Never,
            Some(&base_class),
            confirm,
        )?;
        self.produced.push(model_path.clone());
        report.record(model_path, outcome.outcome);
        warnings.extend(outcome.warnings);

        Ok((report, warnings))
    }

    /// Bulk generation. A failing table is recorded and the run continues;
    /// warnings accumulate into the summary, including on-disk files the
    /// current generation set does not account for.
    pub fn generate_all(
        &mut self,
        provider: &dyn SchemaProvider,
        exclude: &[Pattern],
        policy: OverridePolicy,
        confirm: &mut dyn Confirm,
    ) -> SculptResult<RunSummary> {
        let mut summary = RunSummary::new();

        for table_name in provider.list_tables(exclude)? {
            match self.generate_table(provider, &table_name, policy, confirm) {
                Ok((report, warnings)) => {
                    summary.push_report(report);
                    for warning in warnings {
                        summary.push_warning(warning);
                    }
                }
                Err(err) => {
                    tracing::warn!(table = %table_name, error = %err, "table generation failed");
                    let mut report = TableReport::new(&table_name);
                    report.error = Some(err.to_string());
                    summary.push_report(report);
                }
            }
        }

        for path in self.guard.store().list(&self.output_dir)? {
            if !self.produced.contains(&path) {
                summary.push_warning(Warning::StaleFile { path });
            }
        }

        Ok(summary)
    }
}
