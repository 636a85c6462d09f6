//! Configuration management commands.

use std::path::Path;

use console::style;

use pagecheck::config::{Config, Settings};

/// Print the effective settings and where they came from.
pub async fn cmd_config_show(
    settings: &Settings,
    config_path: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(settings)?);
        return Ok(());
    }

    let source = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => Config::discover().await,
    };
    let source = source
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());

    println!("{} Configuration ({})", style("→").cyan(), source);
    println!("  {:<18} {}", "output_dir:", settings.output_dir.display());
    println!(
        "  {:<18} {}",
        "user_agent:",
        settings.user_agent.as_deref().unwrap_or("(default)")
    );
    println!("  {:<18} {}s", "request_timeout:", settings.request_timeout);
    println!("  {:<18} {}ms", "request_delay_ms:", settings.request_delay_ms);
    println!("  {:<18} {}", "window_days:", settings.window_days);
    println!("  {:<18} {}", "report_format:", settings.report_format);
    Ok(())
}
