use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use colored::Colorize;
use panos_config::registry::{self, Kind};
use panos_config::{Settings, Version};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use xml_tree::{parse_file, write, XmlNode};

mod cli;

use cli::{Cli, CodecArgs, Command, ConvertArgs, KindsArgs, OutputFormat, VariantArgs};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = Settings::load(cli.settings.as_deref())
        .with_context(|| "failed to load settings")?;
    debug!(version = %settings.version, "settings loaded");

    match cli.command {
        Command::Kinds(args) => run_kinds(args),
        Command::Variant(args) => run_variant(args, &settings),
        Command::Decode(args) => run_decode(args, &settings),
        Command::Encode(args) => run_encode(args, &settings),
        Command::Convert(args) => run_convert(args),
        Command::Settings => run_settings(&settings),
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn lookup(name: &str) -> Result<&'static Kind> {
    registry::find(name)
        .ok_or_else(|| anyhow!("unknown object kind '{name}' (see `panos-config kinds`)"))
}

#[derive(Serialize)]
struct KindSummary {
    name: &'static str,
    tag: &'static str,
    thresholds: Vec<ThresholdSummary>,
}

#[derive(Serialize)]
struct ThresholdSummary {
    version: String,
    variant: String,
}

fn run_kinds(args: KindsArgs) -> Result<()> {
    let summaries: Vec<KindSummary> = registry::kinds()
        .into_iter()
        .map(|kind| KindSummary {
            name: kind.name,
            tag: kind.tag,
            thresholds: kind
                .thresholds
                .iter()
                .map(|t| ThresholdSummary {
                    version: t.version().to_string(),
                    variant: t.variant.to_string(),
                })
                .collect(),
        })
        .collect();

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summaries)?),
        OutputFormat::Text => {
            for summary in &summaries {
                let thresholds = if summary.thresholds.is_empty() {
                    "single variant".dimmed().to_string()
                } else {
                    summary
                        .thresholds
                        .iter()
                        .map(|t| format!("{} from {}", t.variant, t.version))
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                println!("{:<22} <{}> {}", summary.name.bold(), summary.tag, thresholds);
            }
        }
    }
    Ok(())
}

fn run_variant(args: VariantArgs, settings: &Settings) -> Result<()> {
    let kind = lookup(&args.kind)?;
    let version = args.version.unwrap_or_else(|| settings.version.clone());
    println!("{}", (kind.variant_for)(&version));
    Ok(())
}

fn run_decode(args: CodecArgs, settings: &Settings) -> Result<()> {
    let kind = lookup(&args.kind)?;
    let version = args.version.unwrap_or_else(|| settings.version.clone());
    let records = decode_file(kind, &args.file, &version)?;
    emit(&serde_json::to_string_pretty(&records)?, args.output.as_deref())
}

fn run_encode(args: CodecArgs, settings: &Settings) -> Result<()> {
    let kind = lookup(&args.kind)?;
    let version = args.version.unwrap_or_else(|| settings.version.clone());
    let raw = fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let records: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse JSON {}", args.file.display()))?;
    let elements = (kind.encode)(&records, &version)
        .with_context(|| format!("failed to encode {} for {version}", kind.name))?;
    emit(&render(&elements)?, args.output.as_deref())
}

fn run_convert(args: ConvertArgs) -> Result<()> {
    let kind = lookup(&args.kind)?;
    debug!(
        kind = kind.name,
        from = %(kind.variant_for)(&args.from),
        to = %(kind.variant_for)(&args.to),
        "converting"
    );
    let records = decode_file(kind, &args.file, &args.from)?;
    let elements = (kind.encode)(&records, &args.to)
        .with_context(|| format!("failed to encode {} for {}", kind.name, args.to))?;
    emit(&render(&elements)?, args.output.as_deref())
}

fn run_settings(settings: &Settings) -> Result<()> {
    let rendered = toml::to_string_pretty(settings).context("failed to render settings")?;
    emit(&rendered, None)
}

fn decode_file(kind: &Kind, path: &Path, version: &Version) -> Result<serde_json::Value> {
    let node = parse_file(path).with_context(|| format!("failed to parse {}", path.display()))?;
    (kind.decode)(&node, version)
        .with_context(|| format!("failed to decode {} for {version}", kind.name))
}

fn render(elements: &[XmlNode]) -> Result<String> {
    let mut out = String::new();
    for element in elements {
        out.push_str(&String::from_utf8(write(element)?)?);
        out.push('\n');
    }
    Ok(out)
}

fn emit(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => fs::write(path, text)
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            print!("{text}");
            if !text.ends_with('\n') {
                println!();
            }
            Ok(())
        }
    }
}
