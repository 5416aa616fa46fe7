use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use panos_config::Version;

#[derive(Parser, Debug)]
#[command(name = "panos-config")]
#[command(about = "Encode, decode and convert PAN-OS configuration objects offline")]
pub struct Cli {
    /// Settings file overriding the built-in defaults.
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// List the registered object kinds and their firmware thresholds.
    Kinds(KindsArgs),
    /// Show which wire variant a firmware selects for a kind.
    Variant(VariantArgs),
    /// Decode device XML into normalized JSON records.
    Decode(CodecArgs),
    /// Encode JSON records into device XML.
    Encode(CodecArgs),
    /// Decode XML written for one firmware and re-encode it for another.
    Convert(ConvertArgs),
    /// Print the effective settings as TOML.
    Settings,
}

#[derive(Parser, Debug)]
pub struct KindsArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct VariantArgs {
    #[arg(long)]
    pub kind: String,
    /// Firmware version; defaults to the settings version.
    #[arg(long)]
    pub version: Option<Version>,
}

#[derive(Parser, Debug)]
pub struct CodecArgs {
    #[arg(long)]
    pub kind: String,
    /// Firmware version; defaults to the settings version.
    #[arg(long)]
    pub version: Option<Version>,
    /// Input file: device XML for decode, JSON for encode.
    pub file: PathBuf,
    /// Write the result here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct ConvertArgs {
    #[arg(long)]
    pub kind: String,
    /// Firmware the input was written for.
    #[arg(long)]
    pub from: Version,
    /// Firmware to encode for.
    #[arg(long)]
    pub to: Version,
    pub file: PathBuf,
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}
