//! `airadvisor doctor` — Diagnose system health.

use airadvisor_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 AirAdvisor Doctor — System Diagnostics");
    println!("=========================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("  ✅ Config file found: {}", config_path.display());
    } else {
        println!("  ⚠️  No config file — using defaults (run `airadvisor onboard`)");
        issues += 1;
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  ⚠️  Cannot continue without a valid config.");
            return Ok(());
        }
    };

    if config.has_api_key() {
        println!("  ✅ Language-model API key configured ({})", config.default_provider);
    } else {
        println!("  ⚠️  No language-model API key — set GEMINI_API_KEY or add api_key to config.toml");
        issues += 1;
    }

    if config.has_air_quality_key() {
        println!("  ✅ OpenWeather API key configured");
    } else {
        println!("  ⚠️  No OpenWeather API key — set OPENWEATHER_API_KEY");
        issues += 1;
    }

    let rules_path = config.rules_path();
    match airadvisor_advisory::load_rules_file(&rules_path) {
        Ok(table) => println!("  ✅ Rule file loaded: {} rules from {}", table.len(), rules_path.display()),
        Err(e) => {
            println!("  ❌ Rule file unusable: {e}");
            issues += 1;
        }
    }

    match airadvisor_advisory::open_store(&config).await {
        Ok(store) => match store.count().await {
            Ok(n) => println!("  ✅ Profile store reachable ({} profiles, {})", n, store.name()),
            Err(e) => {
                println!("  ❌ Profile store query failed: {e}");
                issues += 1;
            }
        },
        Err(e) => {
            println!("  ❌ Profile store unreachable: {e}");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
