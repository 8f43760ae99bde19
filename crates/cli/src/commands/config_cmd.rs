//! `ace config` — Configuration management commands.

use ace_config::AppConfig;

use super::session::CliResult;

pub async fn validate() -> CliResult {
    println!("Validating configuration...");

    match AppConfig::load() {
        Ok(config) => {
            println!("   ✅ Config parsed and validated");
            println!();
            println!("   Server:   {}", config.ollama.url);
            println!("   Model:    {}", config.ollama.model);
            println!(
                "   Curator:  top {} bullets, max {} kept, refine every {} runs",
                config.curator.max_relevant_bullets,
                config.curator.max_context_size,
                config.curator.refine_interval
            );
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

pub async fn show() -> CliResult {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

pub async fn path() -> CliResult {
    let config_path = AppConfig::config_dir().join("config.toml");
    println!("{}", config_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    #[test]
    fn config_path_is_valid() {
        let path = ace_config::AppConfig::config_dir().join("config.toml");
        assert!(path.to_str().unwrap().ends_with("config.toml"));
    }
}
