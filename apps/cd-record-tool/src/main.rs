//! CLI tool for record stream inspection and schema checking.
//!
//! Provides commands for:
//! - Walking a record stream and printing what each record is
//! - Listing the built-in record types
//! - Building a schema declaration file and printing its layout

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use cd_record_core::schema::{builtin_schemas, SchemaDecl, StructureSchema};
use cd_record_core::{Area, CodecConfig, FieldAccess, RecordFactory, RecordRef, StreamEntry};

#[derive(Parser, Debug)]
#[command(name = "cd-record-tool", version, about = "Inspect CD record streams and schemas")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Walk a record stream and print one line per record
    Dump {
        file: PathBuf,
        /// Area the stream belongs to (defaults to the configured area)
        #[arg(long)]
        area: Option<Area>,
        /// Codec configuration file (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print every fixed field of recognized records
        #[arg(long)]
        fields: bool,
    },
    /// List the registered record types
    Schemas {
        /// Print full schema descriptions as JSON
        #[arg(long)]
        json: bool,
    },
    /// Build a schema declaration (.toml or .json) and print its layout
    CheckSchema { file: PathBuf },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    match Cli::parse().command {
        Command::Dump {
            file,
            area,
            config,
            fields,
        } => dump(&file, area, config.as_deref(), fields),
        Command::Schemas { json } => schemas(json),
        Command::CheckSchema { file } => check_schema(&file),
    }
}

fn load_config(path: Option<&Path>) -> Result<CodecConfig> {
    let mut config = match path {
        Some(path) => CodecConfig::from_file(path)?,
        None => CodecConfig::default(),
    };
    config.apply_env_overrides()?;
    Ok(config)
}

fn dump(file: &Path, area: Option<Area>, config: Option<&Path>, fields: bool) -> Result<()> {
    let config = load_config(config)?;
    let area = area.unwrap_or(config.default_area);
    let data = std::fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let factory = RecordFactory::with_builtin_records(config)?;

    let mut records = 0;
    let mut unrecognized = 0;
    for entry in factory.stream(&data, area) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!("{}", err);
                println!("error: {}", err);
                continue;
            }
        };
        records += 1;
        match &entry {
            StreamEntry::Known {
                record_type,
                offset,
                bytes,
            } => {
                println!(
                    "{:>8}  {:<24} {:#06x}  {} bytes",
                    offset,
                    record_type.name,
                    record_type.key.signature,
                    bytes.len()
                );
                if fields {
                    print_fields(&RecordRef::new(&record_type.schema, bytes), "");
                }
            }
            StreamEntry::Unrecognized {
                key,
                offset,
                length,
            } => {
                unrecognized += 1;
                println!(
                    "{:>8}  {:<24} {:#06x}  {} bytes",
                    offset, "unrecognized", key.signature, length
                );
            }
        }
    }
    println!(
        "{} records in {} ({} unrecognized)",
        records, area, unrecognized
    );
    Ok(())
}

fn print_fields(view: &RecordRef<'_>, prefix: &str) {
    for field in view.schema().fields() {
        let path = format!("{}{}", prefix, field.name);
        if field.primitive().is_some() {
            match view.get_raw(&field.name) {
                Ok(raw) => println!("          {:<32} {:#x}", path, raw),
                Err(err) => println!("          {:<32} error: {}", path, err),
            }
        } else if let Ok(inner) = view.substructure(&field.name) {
            print_fields(&inner, &format!("{}.", path));
        } else {
            println!("          {:<32} <{}>", path, field.kind.describe());
        }
    }
    for variable in view.schema().variables() {
        let path = format!("{}{}", prefix, variable.name);
        match view.variable(&variable.name) {
            Ok(value) => println!("          {:<32} {} bytes", path, value.bytes.len()),
            Err(err) => println!("          {:<32} error: {}", path, err),
        }
    }
}

fn schemas(json: bool) -> Result<()> {
    let factory = RecordFactory::with_builtin_records(CodecConfig::default())?;
    let types = factory.registry().types();

    if json {
        let descriptions: Vec<_> = types.iter().map(|t| t.schema.describe()).collect();
        println!("{}", serde_json::to_string_pretty(&descriptions)?);
        return Ok(());
    }

    println!("{:<24} {:<18} {:<8} {:>6}", "NAME", "AREA", "SIG", "FIXED");
    for record_type in types {
        println!(
            "{:<24} {:<18} {:#06x} {:>6}",
            record_type.name,
            record_type.key.area,
            record_type.key.signature,
            record_type.schema.fixed_size()
        );
    }
    Ok(())
}

fn check_schema(file: &Path) -> Result<()> {
    let text = std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let decl = match file.extension().and_then(|e| e.to_str()) {
        Some("toml") => SchemaDecl::from_toml(&text)?,
        Some("json") => SchemaDecl::from_json(&text)?,
        _ => bail!("expected a .toml or .json declaration: {}", file.display()),
    };
    let schema = decl.build(builtin_schemas()?)?;
    print_layout(&schema);
    Ok(())
}

fn print_layout(schema: &StructureSchema) {
    println!("{} ({} bytes fixed)", schema.name(), schema.fixed_size());
    for field in schema.fields() {
        println!(
            "  {:>4}  {:<24} {:>4}  {}",
            field.offset,
            field.name,
            field.size,
            field.kind.describe()
        );
    }
    for variable in schema.variables() {
        println!(
            "        {:<24} {} ({:?})",
            variable.name,
            variable.kind.describe(),
            variable.length
        );
    }
    for masked in schema.masked_fields() {
        println!(
            "        {:<24} {} & {:#x} >> {}",
            masked.name, masked.source, masked.mask, masked.shift
        );
    }
}
