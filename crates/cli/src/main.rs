mod commands;
mod confirm;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sculpt")]
#[command(about = "Generate ORM model classes from a database schema")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate base and model class files for schema tables
    Generate {
        /// Schema document to introspect
        #[arg(long, default_value = "schema.yaml")]
        schema: String,

        /// Generator configuration file
        #[arg(long)]
        config: Option<String>,

        /// Connection overlay to apply from the configuration
        #[arg(long)]
        connection: Option<String>,

        /// Generate only these tables (repeatable); default is all
        #[arg(long = "table")]
        tables: Vec<String>,

        /// Table name patterns to skip (repeatable)
        #[arg(long = "exclude")]
        exclude: Vec<String>,

        /// Override policy for existing base files: always, never or ask
        #[arg(long = "override")]
        override_policy: Option<String>,

        /// Parent descriptor document replacing the built-in base model
        #[arg(long)]
        descriptor: Option<String>,

        /// Apply raw column corrections (tinyint(1) booleans)
        #[arg(long)]
        raw_types: bool,
    },

    /// List the tables a schema document provides
    Tables {
        #[arg(long, default_value = "schema.yaml")]
        schema: String,

        #[arg(long = "exclude")]
        exclude: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            schema,
            config,
            connection,
            tables,
            exclude,
            override_policy,
            descriptor,
            raw_types,
        } => commands::generate::run(commands::generate::GenerateArgs {
            schema,
            config,
            connection,
            tables,
            exclude,
            override_policy,
            descriptor,
            raw_types,
        }),
        Commands::Tables { schema, exclude } => commands::tables::run(&schema, &exclude),
    }
}
