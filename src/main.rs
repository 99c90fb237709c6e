//! Generate an AWS CLI config from the accounts visible in the SSO portal.
//!
//! Opens a browser on the SSO start page, waits for the account list to
//! render (sign in if prompted), and writes one profile per account/role
//! pair to the output file.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use aws_gen_config::config::GenConfig;

#[derive(Parser, Debug)]
#[command(
    name = "aws-gen-config",
    version,
    about = "Generate an AWS CLI config with SSO profiles scraped from the account portal"
)]
struct Cli {
    /// SSO start page URL
    #[arg(long)]
    start_url: Option<String>,

    /// Name for the generated sso-session stanza
    #[arg(long)]
    session_name: Option<String>,

    /// Region the SSO service is hosted in
    #[arg(long)]
    sso_region: Option<String>,

    /// Default region for generated profiles
    #[arg(long)]
    region: Option<String>,

    /// Role to request per account (repeatable, replaces the default list)
    #[arg(long = "role", value_name = "ROLE")]
    roles: Vec<String>,

    /// Output file path
    #[arg(long, short)]
    output: Option<String>,

    /// Chrome/Chromium executable to launch
    #[arg(long, env = "CHROMIUM_PATH")]
    chrome: Option<String>,

    /// Browser profile directory to reuse (keeps the SSO session between runs)
    #[arg(long)]
    user_data_dir: Option<String>,

    /// Run the browser headless (requires a still-valid SSO session)
    #[arg(long)]
    headless: bool,

    /// Seconds to wait for the account list before giving up
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Read config from this file instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    /// Overlay the flags that were actually given onto the loaded config
    fn apply(self, config: &mut GenConfig) {
        if let Some(start_url) = self.start_url {
            config.start_url = start_url;
        }
        if let Some(session_name) = self.session_name {
            config.sso_session = session_name;
        }
        if let Some(sso_region) = self.sso_region {
            config.sso_region = sso_region;
        }
        if let Some(region) = self.region {
            config.default_region = region;
        }
        if !self.roles.is_empty() {
            config.roles = self.roles;
        }
        if let Some(output) = self.output {
            config.output_path = output;
        }
        if let Some(chrome) = self.chrome {
            config.chrome_path = Some(chrome);
        }
        if let Some(user_data_dir) = self.user_data_dir {
            config.user_data_dir = Some(user_data_dir);
        }
        if self.headless {
            config.headless = true;
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.timeout_secs = timeout_secs;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _guard = aws_gen_config::init_logging();

    info!("Starting aws-gen-config");
    if let Some(dir) = aws_gen_config::log_dir() {
        info!("Log files saved to: {}", dir.display());
    }

    let mut config = match &cli.config {
        Some(path) => GenConfig::load_from(path)?,
        None => GenConfig::load(),
    };
    cli.apply(&mut config);
    config.validate()?;

    aws_gen_config::run(&config).await?;

    println!("✅ AWS config written to {}", config.output_path);
    Ok(())
}
