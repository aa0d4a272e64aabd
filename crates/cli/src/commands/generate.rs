use crate::confirm::InquireConfirm;
use console::style;
use sculpt_codegen::{ModelGenerator, OsFileStore, OverridePolicy, ParentDescriptor};
use sculpt_core::{Config, Outcome, Pattern, RunSummary, SculptResult};
use sculpt_introspect::{SchemaProvider, TypeMapper, YamlSchemaProvider};
use std::path::Path;
use std::str::FromStr;

pub struct GenerateArgs {
    pub schema: String,
    pub config: Option<String>,
    pub connection: Option<String>,
    pub tables: Vec<String>,
    pub exclude: Vec<String>,
    pub override_policy: Option<String>,
    pub descriptor: Option<String>,
    pub raw_types: bool,
}

pub fn run(args: GenerateArgs) -> anyhow::Result<()> {
    let mapper = TypeMapper::new().with_raw_corrections(args.raw_types);
    let provider = YamlSchemaProvider::from_path(Path::new(&args.schema), &mapper)?;

    let config = match &args.config {
        Some(path) => Config::load(
            Path::new(path),
            provider.driver(),
            args.connection.as_deref(),
        )?,
        None => Config::builtin(),
    };

    let policy_name = args
        .override_policy
        .as_deref()
        .or_else(|| config.get_str("generation.override"))
        .unwrap_or("ask");
    let policy = OverridePolicy::from_str(policy_name)?;

    let descriptor = match &args.descriptor {
        Some(path) => ParentDescriptor::from_yaml(&std::fs::read_to_string(path)?)?,
        None => ParentDescriptor::builtin(),
    };

    let exclude = compile_patterns(&args.exclude)?;

    let mut generator = ModelGenerator::new(&config, descriptor, OsFileStore);
    let mut confirm = InquireConfirm;

    let summary = if args.tables.is_empty() {
        generator.generate_all(&provider, &exclude, policy, &mut confirm)?
    } else {
        // explicit table selection: errors propagate instead of being
        // isolated, and no stale-file sweep runs over a partial set
        let mut summary = RunSummary::new();
        for table in &args.tables {
            let (report, warnings) =
                generator.generate_table(&provider, table, policy, &mut confirm)?;
            summary.push_report(report);
            for warning in warnings {
                summary.push_warning(warning);
            }
        }
        summary
    };

    print_summary(&summary);

    if summary.failures().count() > 0 {
        anyhow::bail!("{} table(s) failed", summary.failures().count());
    }
    Ok(())
}

fn compile_patterns(patterns: &[String]) -> SculptResult<Vec<Pattern>> {
    patterns.iter().map(|p| Pattern::new(p)).collect()
}

fn print_summary(summary: &RunSummary) {
    for report in &summary.reports {
        match &report.error {
            Some(error) => {
                println!(
                    "{} {}: {}",
                    style("failed").red().bold(),
                    report.table,
                    error
                );
            }
            None => {
                for (path, outcome) in &report.artifacts {
                    let label = match outcome {
                        Outcome::Created => style("created").green(),
                        Outcome::Updated => style("updated").yellow(),
                        Outcome::Identical => style("identical").dim(),
                        Outcome::Skipped => style("skipped").yellow(),
                    };
                    println!("{:>10} {}", label, path.display());
                }
            }
        }
    }

    for warning in &summary.warnings {
        println!("{:>10} {}", style("warning").magenta(), warning);
    }

    println!(
        "{} created, {} updated, {} identical, {} skipped",
        summary.count(Outcome::Created),
        summary.count(Outcome::Updated),
        summary.count(Outcome::Identical),
        summary.count(Outcome::Skipped),
    );
}
