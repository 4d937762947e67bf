//! `airadvisor ask` — Run one advisory request and print the reply.

use airadvisor_config::AppConfig;
use airadvisor_core::advisory::AdvisoryRequest;

pub async fn run(
    name: &str,
    city: &str,
    question: &str,
    show_diagnostics: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if !config.has_api_key() {
        eprintln!("  ⚠️  No language-model API key configured; set GEMINI_API_KEY or AIRADVISOR_API_KEY.");
    }
    if !config.has_air_quality_key() {
        eprintln!("  ⚠️  No OpenWeather API key configured; air quality will be unavailable.");
    }

    let pipeline = airadvisor_advisory::build_from_config(&config).await?;
    let outcome = pipeline
        .advise(&AdvisoryRequest::new(name, city, question))
        .await?;

    println!("{}", outcome.reply());

    if show_diagnostics {
        let diagnostics = serde_json::json!({
            "outcome": outcome.kind(),
            "stages": outcome.diagnostics(),
        });
        println!("\n{}", serde_json::to_string_pretty(&diagnostics)?);
    }

    Ok(())
}
