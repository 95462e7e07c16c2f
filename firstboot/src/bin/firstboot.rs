//! CLI for first-boot node setup

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use firstboot::config::BootstrapConfig;
use firstboot::logging::init_logging;
use firstboot::materialize::{
    MountEntry, expand_run_list, launch_mappings, mount_entry, nfs_mount_entry,
};
use firstboot::metadata::{MetadataDir, MetadataSource, OhaiDocument};
use firstboot::resources::{NfsMount, ResourceRegistry, Role, Volume, from_settings_list};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "firstboot", version, about = "First-boot node identity and resources")]
struct Firstboot {
    /// Bootstrap configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: FirstbootCommand,
}

#[derive(Debug, Subcommand)]
enum FirstbootCommand {
    /// Resolves node identity and persists first-boot credentials
    Bootstrap(BootstrapArgs),
    /// Prints provider block device mappings for volumes created at launch
    BlockDevices(BlockDevicesArgs),
    /// Prints fstab entries for volumes or NFS mounts
    Mounts(MountsArgs),
    /// Prints the expanded run list for one or more roles
    RunList(RunListArgs),
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
struct SourceArgs {
    /// directory holding instance-id, ami-launch-index and user-data files
    #[arg(long)]
    metadata_dir: Option<PathBuf>,
    /// JSON document with an `ec2` section
    #[arg(long)]
    ohai: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct BootstrapArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// write the report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct BlockDevicesArgs {
    /// JSON list of volume settings
    #[arg(long)]
    volumes: PathBuf,
}

#[derive(Debug, Args)]
struct MountsArgs {
    /// JSON list of volume settings
    #[arg(long, conflicts_with = "nfs", required_unless_present = "nfs")]
    volumes: Option<PathBuf>,
    /// JSON map of NFS mount target to settings
    #[arg(long)]
    nfs: Option<PathBuf>,
    /// NFS server for mounts without an explicit device
    #[arg(long, requires = "nfs")]
    nfs_server: Option<String>,
}

#[derive(Debug, Args)]
struct RunListArgs {
    /// JSON list of role settings
    #[arg(long)]
    roles: PathBuf,
    /// roles to expand, in order
    #[arg(required = true)]
    role: Vec<String>,
}

fn main() -> ExitCode {
    match do_run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("firstboot: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn do_run() -> anyhow::Result<()> {
    let args = Firstboot::parse();

    let config = match &args.config {
        Some(path) => BootstrapConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => BootstrapConfig::default(),
    };
    let _log_guard = init_logging(&config.log).context("failed to initialize logging")?;

    match args.command {
        FirstbootCommand::Bootstrap(args) => bootstrap(&config, args),
        FirstbootCommand::BlockDevices(args) => block_devices(args),
        FirstbootCommand::Mounts(args) => mounts(args),
        FirstbootCommand::RunList(args) => run_list(args),
    }
}

fn bootstrap(config: &BootstrapConfig, args: BootstrapArgs) -> anyhow::Result<()> {
    let source: Box<dyn MetadataSource> = match (args.source.metadata_dir, args.source.ohai) {
        (Some(dir), _) => Box::new(MetadataDir::new(dir)),
        (None, Some(path)) => Box::new(OhaiDocument::new(path)),
        (None, None) => anyhow::bail!("a metadata source is required"),
    };

    let report = firstboot::bootstrap(config, source.as_ref()).context("bootstrap failed")?;
    let mut json = serde_json::to_string_pretty(&report)?;
    json.push('\n');

    match args.output {
        Some(path) => std::fs::write(&path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?,
        None => print!("{json}"),
    }
    Ok(())
}

fn block_devices(args: BlockDevicesArgs) -> anyhow::Result<()> {
    let volumes: Vec<Volume> = from_settings_list(None, read_json(&args.volumes)?)
        .with_context(|| format!("invalid volumes in {}", args.volumes.display()))?;

    let mappings: Vec<Value> = launch_mappings(&volumes)
        .iter()
        .map(|m| Value::Object(m.to_provider_map()))
        .collect();
    println!("{}", serde_json::to_string_pretty(&mappings)?);
    Ok(())
}

fn mounts(args: MountsArgs) -> anyhow::Result<()> {
    let entries: Vec<MountEntry> = match (args.volumes, args.nfs) {
        (Some(path), _) => {
            let volumes: Vec<Volume> = from_settings_list(None, read_json(&path)?)
                .with_context(|| format!("invalid volumes in {}", path.display()))?;
            volumes.iter().filter_map(mount_entry).collect()
        }
        (None, Some(path)) => {
            let mounts = NfsMount::from_attributes(None, &read_json(&path)?)
                .with_context(|| format!("invalid nfs mounts in {}", path.display()))?;
            mounts
                .iter()
                .map(|m| nfs_mount_entry(m, args.nfs_server.as_deref()))
                .collect::<Result<Vec<_>, _>>()?
        }
        (None, None) => anyhow::bail!("either --volumes or --nfs is required"),
    };

    for entry in entries {
        println!("{}", entry.fstab_line());
    }
    Ok(())
}

fn run_list(args: RunListArgs) -> anyhow::Result<()> {
    let mut registry = ResourceRegistry::new();
    for role in from_settings_list::<Role>(None, read_json(&args.roles)?)
        .with_context(|| format!("invalid roles in {}", args.roles.display()))?
    {
        registry.insert(role)?;
    }

    let names: Vec<&str> = args.role.iter().map(String::as_str).collect();
    for item in expand_run_list(&registry, &names)? {
        println!("{item}");
    }
    Ok(())
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}
