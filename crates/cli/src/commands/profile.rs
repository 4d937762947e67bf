//! `airadvisor profile` — Save or show a health profile.

use airadvisor_config::AppConfig;
use airadvisor_core::profile::HealthProfile;

pub async fn set(name: &str, condition: &str, age_group: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let pipeline = airadvisor_advisory::build_from_config(&config).await?;

    let profile = pipeline
        .save_profile(HealthProfile::new(name, condition, age_group))
        .await?;

    println!("✅ Profile saved/updated successfully");
    print_profile(&profile);
    if !profile.condition.is_recognized() {
        println!(
            "   ⚠️  '{}' is not a known condition; no precaution rule will match it.",
            profile.condition
        );
    }

    Ok(())
}

pub async fn show(name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let pipeline = airadvisor_advisory::build_from_config(&config).await?;

    match pipeline.find_profile(name).await? {
        Some(profile) => print_profile(&profile),
        None => println!("No profile stored for '{name}'."),
    }

    Ok(())
}

fn print_profile(profile: &HealthProfile) {
    println!("   Name:       {}", profile.name);
    println!("   Condition:  {}", profile.condition);
    println!("   Age group:  {}", profile.age_group);
    println!("   Updated:    {}", profile.updated_at.format("%Y-%m-%d %H:%M:%S UTC"));
}
