//! `airadvisor onboard` — First-time setup.

use airadvisor_config::AppConfig;
use std::path::Path;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("🌫️  AirAdvisor — First-Time Setup");
    println!("=================================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("⚠️  Config already exists at: {}", config_path.display());
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("✅ Created config.toml at: {}", config_path.display());
    }

    let config = AppConfig::load_from(&config_path)?;
    write_default_rules(&config.rules_path())?;

    println!("\n📝 Next steps:");
    println!("   1. Set GEMINI_API_KEY and OPENWEATHER_API_KEY (or edit config.toml)");
    println!("   2. Run: airadvisor profile set <name> --condition asthma --age-group adult");
    println!("   3. Run: airadvisor ask <name> --city <city> <question>\n");

    println!("🎉 Setup complete!\n");

    Ok(())
}

/// Write the built-in rule table to `path` unless a file is already there.
pub fn write_default_rules(path: &Path) -> Result<bool, std::io::Error> {
    if path.exists() {
        println!("  Rule file exists: {}", path.display());
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, airadvisor_advisory::default_rules_json())?;
    println!("✅ Created rules.json at: {}", path.display());
    Ok(true)
}
