//! OxiRS SAMM JSON command line tool
//!
//! Shows information about an Aspect Model, validates it, and generates its
//! JSON Schema and example payload.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use oxirs_samm_json::metamodel::ModelElement;
use oxirs_samm_json::parser::load_turtle_file;
use oxirs_samm_json::{
    build_model_with, generate_instance_with, generate_schema_with, GeneratorConfig, Model,
    SammError,
};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "oxirs-samm-json")]
#[command(about = "Generate JSON Schema and example payloads from SAMM Aspect Models")]
#[command(version)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Logging level, overridden by RUST_LOG
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Display information about an Aspect Model
    Info {
        /// Turtle file of the Aspect Model
        input: PathBuf,
    },
    /// Validate an Aspect Model
    Validate {
        input: PathBuf,
        /// Treat model diagnostics as errors
        #[arg(long)]
        strict: bool,
    },
    /// Generate the JSON Schema of an Aspect Model
    Schema {
        input: PathBuf,
        /// Output file, standard output when absent
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Generate an example JSON payload of an Aspect Model
    Instance {
        input: PathBuf,
        /// Output file, standard output when absent
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Generate both the JSON Schema and the example payload
    All {
        input: PathBuf,
        /// Output JSON Schema file
        #[arg(long)]
        schema: Option<PathBuf>,
        /// Output JSON payload file
        #[arg(long)]
        instance: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::default(),
    };

    match args.command {
        Command::Info { input } => {
            let model = load_model(&input, &config)?;
            print_info(&input, &model);
        }
        Command::Validate { input, strict } => validate(&input, &config, strict)?,
        Command::Schema { input, output } => {
            let model = load_model(&input, &config)?;
            let schema = generate_schema_with(&model, &config.schema);
            emit(&schema, output.as_deref(), "JSON Schema")?;
        }
        Command::Instance { input, output } => {
            let model = load_model(&input, &config)?;
            let instance = generate_instance_with(&model, &config.instance);
            emit(&instance, output.as_deref(), "JSON instance")?;
        }
        Command::All {
            input,
            schema,
            instance,
        } => {
            if schema.is_none() && instance.is_none() {
                bail!("Please specify at least one output file (--schema or --instance)");
            }
            let model = load_model(&input, &config)?;
            if let Some(path) = schema {
                emit(
                    &generate_schema_with(&model, &config.schema),
                    Some(path.as_path()),
                    "JSON Schema",
                )?;
            }
            if let Some(path) = instance {
                emit(
                    &generate_instance_with(&model, &config.instance),
                    Some(path.as_path()),
                    "JSON instance",
                )?;
            }
        }
    }

    Ok(())
}

fn load_model(input: &Path, config: &GeneratorConfig) -> Result<Model> {
    let graph = load_turtle_file(input)
        .with_context(|| format!("Failed to load {}", input.display()))?;
    let model = build_model_with(&graph, config)
        .with_context(|| format!("Failed to resolve the Aspect Model in {}", input.display()))?;
    info!(
        "Resolved {} with {} diagnostics",
        model.aspect().urn(),
        model.diagnostics.len()
    );
    Ok(model)
}

fn validate(input: &Path, config: &GeneratorConfig, strict: bool) -> Result<()> {
    let graph = load_turtle_file(input)
        .with_context(|| format!("Failed to load {}", input.display()))?;
    let (errors, warnings) = match build_model_with(&graph, config) {
        Ok(model) => {
            let errors: Vec<String> = model
                .validate_metadata(&config.schema.language)
                .into_iter()
                .map(|finding| finding.message)
                .collect();
            let diagnostics: Vec<String> = model
                .diagnostics
                .iter()
                .map(|diagnostic| format!("{}: {}", diagnostic.element, diagnostic.message))
                .collect();
            if strict {
                ([errors, diagnostics].concat(), Vec::new())
            } else {
                (errors, diagnostics)
            }
        }
        Err(SammError::MissingAspect) => {
            (vec!["No Aspect found in the model".to_string()], Vec::new())
        }
        Err(e) => {
            return Err(e).with_context(|| {
                format!("Failed to resolve the Aspect Model in {}", input.display())
            })
        }
    };

    if !warnings.is_empty() {
        println!("Warnings:");
        for warning in &warnings {
            println!("  - {warning}");
        }
    }
    if !errors.is_empty() {
        println!("Validation errors:");
        for error in &errors {
            println!("  - {error}");
        }
        bail!("{} failed validation with {} errors", input.display(), errors.len());
    }
    println!("Model is valid!");
    Ok(())
}

fn emit(document: &Value, output: Option<&Path>, label: &str) -> Result<()> {
    let text = serde_json::to_string_pretty(document)?;
    match output {
        Some(path) => {
            std::fs::write(path, format!("{text}\n"))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("{label} written to: {}", path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn print_info(input: &Path, model: &Model) {
    let aspect = model.aspect();
    println!("SAMM Model: {}", input.display());
    println!("Namespace: {}", model.namespace);
    println!();
    println!("Aspect: {}", aspect.urn());
    if let Some(name) = aspect.metadata.get_preferred_name("en") {
        println!("  Name: {name}");
    }
    if let Some(description) = aspect.metadata.get_description("en") {
        println!("  Description: {description}");
    }
    println!("  Properties: {}", aspect.properties().len());
    println!("  Operations: {}", aspect.operations.len());
    println!("  Events: {}", aspect.events.len());
    println!();

    println!("Entities: {}", model.entities.len());
    for id in model.entities.keys() {
        println!("  - {id}");
    }
    println!("Characteristics: {}", model.characteristics.len());
    println!("Properties: {}", model.properties.len());

    if !model.diagnostics.is_empty() {
        println!();
        println!("Diagnostics:");
        for diagnostic in &model.diagnostics {
            println!("  - {}: {}", diagnostic.element, diagnostic.message);
        }
    }
}
