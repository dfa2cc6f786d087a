use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

pub const STARTER_TEMPLATE: &str = r##"<mjml>
  <mj-head>
    <mj-title>Hello from Stencil</mj-title>
  </mj-head>
  <mj-body background-color="#f4f4f4">
    <mj-section padding="20px 0">
      <mj-column vertical-align="top">
        <mj-image src="https://example.com/logo.png" alt="Logo" width="120px" />
        <mj-text padding="10px 25px">Welcome aboard!</mj-text>
        <mj-button href="https://example.com" align="center">Get started</mj-button>
      </mj-column>
    </mj-section>
  </mj-body>
</mjml>
"##;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Starter template file name
    #[arg(short, long, default_value = "template.mjml")]
    pub template: String,

    /// Disable scaffolding in the generated config
    #[arg(long)]
    pub no_scaffolding: bool,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Stencil project...".bright_blue().bold());

    let template_path = PathBuf::from(cwd).join(&args.template);
    if !template_path.exists() {
        fs::write(&template_path, STARTER_TEMPLATE)?;
        println!("  {} Created {}", "✓".green(), args.template);
    }

    let config = Config {
        scaffolding: !args.no_scaffolding,
        ..Config::default()
    };
    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Edit {}", args.template);
    println!("  2. Run: stencil lint {}", args.template);
    println!("  3. Run: stencil export {}", args.template);

    Ok(())
}
