//! compute-setup CLI - Register a Kubernetes cluster as Dataloop compute
//!
//! # Main Commands
//!
//! ```bash
//! compute-setup setup -c configs/config-prod.json   # Build, validate, encode and register
//! compute-setup build -c config.json -o out.txt     # Build the Base64 artifact only
//! compute-setup validate -c config.json             # Check a config without writing anything
//! compute-setup list                                # List available config files
//! compute-setup decode base64_config.txt            # Show the JSON inside an artifact
//! ```

use clap::{Parser, Subcommand};
use compute_setup::discovery::{list_configs, render_listing, DEFAULT_CONFIG_FILE};
use compute_setup::logs::log_error;
use compute_setup::{
    decode_file, provision_with, run_pipeline, Environment, GatewayClient, LoadError,
    PipelineError, PipelineOptions,
};
use std::error::Error;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "compute-setup")]
#[command(about = "Create and configure Dataloop compute from a Kubernetes cluster", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full setup: build the artifact, create the compute, set it as default driver
    Setup {
        /// Path to JSON config file
        #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,

        /// Move running services to the new driver
        #[arg(long)]
        update_existing_services: bool,
    },

    /// Build and write the Base64 artifact without contacting the platform
    Build {
        /// Path to JSON config file
        #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,

        /// Artifact path (default: output.base64ConfigFile from the config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a config file without writing the artifact
    Validate {
        /// Path to JSON config file
        #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
    },

    /// Decode an artifact and print the compute configuration
    Decode {
        /// Base64 artifact file
        input: PathBuf,
    },

    /// List available configuration files
    List {
        /// Directory containing config.json and configs/
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Setup {
            config,
            update_existing_services,
        } => cmd_setup(&config, update_existing_services).await,

        Commands::Build { config, output } => cmd_build(&config, output),

        Commands::Validate { config } => cmd_validate(&config),

        Commands::Decode { input } => cmd_decode(&input),

        Commands::List { dir } => cmd_list(&dir),
    };

    if let Err(e) = result {
        report_error(e.as_ref());
        std::process::exit(1);
    }
}

async fn cmd_setup(config: &Path, update_existing_services: bool) -> Result<(), Box<dyn Error>> {
    let run = run_pipeline(config, &PipelineOptions::default())?;
    let artifact = run
        .artifact
        .as_ref()
        .ok_or("artifact was not written")?;

    let environment = Environment::parse(run.environment()).map_err(PipelineError::from)?;
    let client = GatewayClient::from_env(environment).map_err(PipelineError::from)?;
    eprintln!(
        "\n🚀 Creating compute in '{}' ({})",
        client.environment().name(),
        client.environment().gateway()
    );

    let compute = provision_with(&client, &artifact.path, run.org_id(), update_existing_services)
        .await
        .map_err(PipelineError::from)?;

    eprintln!("\n{}", "=".repeat(50));
    eprintln!("✅ Setup completed successfully!");
    eprintln!("   Compute:   {}", compute.name);
    eprintln!("   Cluster:   {}", run.summary.cluster);
    eprintln!("   Namespace: {}", run.summary.namespace);
    eprintln!("{}", "=".repeat(50));
    Ok(())
}

fn cmd_build(config: &Path, output: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let options = PipelineOptions {
        output_override: output,
        write_artifact: true,
    };
    let run = run_pipeline(config, &options)?;

    if let Some(ref artifact) = run.artifact {
        eprintln!("\n💾 Artifact: {}", artifact.path.display());
    }
    eprintln!("✨ Done!");
    Ok(())
}

fn cmd_validate(config: &Path) -> Result<(), Box<dyn Error>> {
    let options = PipelineOptions {
        output_override: None,
        write_artifact: false,
    };
    let run = run_pipeline(config, &options)?;

    if run.warnings.is_empty() {
        eprintln!("\n✅ {} is valid", config.display());
    } else {
        eprintln!(
            "\n✅ {} is valid ({} warning(s))",
            config.display(),
            run.warnings.len()
        );
    }
    Ok(())
}

fn cmd_decode(input: &Path) -> Result<(), Box<dyn Error>> {
    let compute = decode_file(input)?;
    println!("{}", serde_json::to_string_pretty(&compute)?);
    Ok(())
}

fn cmd_list(dir: &Path) -> Result<(), Box<dyn Error>> {
    let configs = list_configs(dir);
    print!("{}", render_listing(dir, &configs));
    Ok(())
}

/// Print the error with hints matching its kind
fn report_error(e: &(dyn Error + 'static)) {
    match e.downcast_ref::<PipelineError>() {
        Some(PipelineError::Load(load)) if load.is_not_found() => {
            eprintln!();
            log_error(load.to_string());
            eprintln!("\nAvailable options:");
            eprintln!("  1. Create {}", DEFAULT_CONFIG_FILE);
            eprintln!("  2. Copy template: cp configs/config-template.json configs/config-myenv.json");
            eprintln!("  3. Specify existing file: compute-setup setup --config <path>");
            eprintln!("\nRun 'compute-setup list' to see available config files");
        }
        Some(PipelineError::Load(load @ LoadError::Json { .. })) => {
            eprintln!();
            log_error(load.to_string());
            eprintln!("\nTip: Validate your JSON at https://jsonlint.com");
        }
        Some(err) if err.is_config_error() => {
            eprintln!();
            log_error(err.to_string());
        }
        Some(err @ PipelineError::Provision(_)) => {
            eprintln!();
            log_error(format!("Error: {}", err));
            eprintln!("\n📝 Troubleshooting tips:");
            eprintln!("  • Ensure organization.orgId is set and valid");
            eprintln!("  • Ensure cluster.endpoint is a valid HTTPS URL");
            eprintln!("  • Ensure authentication.token is provided");
            eprintln!("  • Verify network/proxy settings if required");
            eprintln!("  • See README.md for detailed help");
        }
        _ => {
            eprintln!();
            log_error(format!("Error: {}", e));
        }
    }
}
