// src/main.rs

use anyhow::{Context, Result};
use appx_content::{
    CapabilityAddition, ChangeOutcome, ChangePlan, ContentChange, MANIFEST_FILE_NAME,
    NamespaceTable,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "appx-content")]
#[command(author, version, about = "Apply content changes to application package manifests", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply every change of a plan file to a content root
    Apply {
        /// Content root containing AppxManifest.xml
        root: PathBuf,
        /// Change plan (TOML)
        #[arg(short, long)]
        plan: PathBuf,
    },
    /// Append a single capability declaration to the manifest
    AddCapability {
        /// Content root containing AppxManifest.xml
        root: PathBuf,
        /// Value of the Name attribute
        #[arg(short, long)]
        name: String,
        /// Registered namespace prefix (std, mp, uap, iot, build)
        #[arg(long)]
        namespace: Option<String>,
        /// Element name (default: Capability)
        #[arg(long)]
        element: Option<String>,
        /// Bind the capability to a device
        #[arg(long)]
        device_id: Option<String>,
        /// Device function type (requires --device-id)
        #[arg(long, requires = "device_id")]
        function_type: Option<String>,
    },
    /// List the registered namespace prefixes
    Namespaces,
}

fn print_outcome(description: &str, outcome: ChangeOutcome) {
    match outcome {
        ChangeOutcome::Applied => println!("applied  {}", description),
        ChangeOutcome::Skipped => println!(
            "skipped  {} (no {})",
            description, MANIFEST_FILE_NAME
        ),
    }
}

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Apply { root, plan }) => {
            info!("Applying plan {} to {}", plan.display(), root.display());
            let plan = ChangePlan::from_file(&plan)
                .with_context(|| format!("Failed to load change plan {}", plan.display()))?;

            let set = plan.into_change_set();
            let reports = set
                .apply(&root)
                .with_context(|| format!("Failed to apply changes to {}", root.display()))?;

            for report in &reports {
                print_outcome(&report.description, report.outcome);
            }
            Ok(())
        }
        Some(Commands::AddCapability {
            root,
            name,
            namespace,
            element,
            device_id,
            function_type,
        }) => {
            let mut builder = CapabilityAddition::builder(name);
            if let Some(namespace) = namespace {
                builder = builder.namespace(namespace);
            }
            if let Some(element) = element {
                builder = builder.capability(element);
            }
            if let Some(device_id) = device_id {
                builder = builder.device_id(device_id);
            }
            if let Some(function_type) = function_type {
                builder = builder.function_type(function_type);
            }
            let addition = builder.build();
            addition.validate()?;

            let applied = addition
                .apply_to_content(&root)
                .with_context(|| format!("Failed to update manifest in {}", root.display()))?;
            print_outcome(&addition.describe(), ChangeOutcome::from(applied));
            Ok(())
        }
        Some(Commands::Namespaces) => {
            for (prefix, uri) in NamespaceTable::manifest().iter() {
                println!("{:<6} {}", prefix, uri);
            }
            Ok(())
        }
        None => {
            // No command provided, show help
            println!("appx-content v{}", env!("CARGO_PKG_VERSION"));
            println!("Run 'appx-content --help' for usage information");
            Ok(())
        }
    }
}
