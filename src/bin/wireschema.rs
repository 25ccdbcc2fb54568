//! # wireschema CLI
//!
//! Loads a declaration document, validates it and prints what the code
//! generator would see.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use wireschema::schema::render::RenderContext;
use wireschema::schema::source::load_schema;
use wireschema::SchemaModel;

/// Schema-driven binary protocol toolkit.
#[derive(Parser, Debug)]
#[command(name = "wireschema", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a schema and print a summary.
    Check {
        /// YAML or JSON declaration document
        schema: PathBuf,
    },
    /// Print the template context as JSON.
    Context {
        /// YAML or JSON declaration document
        schema: PathBuf,
        /// Namespace handed to the templates
        #[arg(long, default_value = "")]
        namespace: String,
    },
    /// Print the validated model as JSON.
    Dump {
        /// YAML or JSON declaration document
        schema: PathBuf,
    },
}

fn load(path: &Path) -> anyhow::Result<SchemaModel> {
    load_schema(path).with_context(|| format!("failed to load {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check { schema } => {
            let model = load(&schema)?;
            println!(
                "{}: ok ({} types, {} messages, {} constant groups, {} byte order)",
                schema.display(),
                model.types().len(),
                model.messages().len(),
                model.const_groups().len(),
                model.byte_order(),
            );
            for message in model.messages() {
                match message.fixed_wire_size() {
                    Some(size) => println!("  {} [{}]: {size} bytes", message.name, message.id),
                    None => println!("  {} [{}]: variable", message.name, message.id),
                }
            }
        }
        Commands::Context { schema, namespace } => {
            let model = load(&schema)?;
            let document = RenderContext::new(&model, namespace).document();
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        Commands::Dump { schema } => {
            let model = load(&schema)?;
            println!("{}", serde_json::to_string_pretty(&model)?);
        }
    }

    Ok(())
}
