use sculpt_core::{Pattern, SculptResult};
use sculpt_introspect::{SchemaProvider, TypeMapper, YamlSchemaProvider};
use std::path::Path;

pub fn run(schema: &str, exclude: &[String]) -> anyhow::Result<()> {
    let provider = YamlSchemaProvider::from_path(Path::new(schema), &TypeMapper::new())?;
    let exclude: Vec<Pattern> = exclude
        .iter()
        .map(|p| Pattern::new(p))
        .collect::<SculptResult<_>>()?;

    for table in provider.list_tables(&exclude)? {
        println!("{}", table);
    }
    Ok(())
}
