//! Check command handler.

use agent_shim_core::{ShimSettings, validate_settings};

use crate::error::CliError;

/// Validate the settings and print a summary.
pub fn execute(settings: &ShimSettings) -> Result<(), CliError> {
    validate_settings(settings)?;

    let placeholders = settings
        .template
        .placeholders()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    println!("Template:     {}", settings.template);
    println!("Placeholders: {placeholders}");
    println!("Model name:   {}", settings.model_name);
    println!("Listen on:    http://{}/v1", settings.bind_address());
    println!(
        "Execution:    {} (quoting: {}, system policy: {})",
        settings.exec_mode, settings.quote_mode, settings.system_policy
    );
    match settings.timeout {
        Some(timeout) => println!("Timeout:      {timeout:?}"),
        None => println!("Timeout:      none"),
    }
    println!("Configuration OK");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_valid_template() {
        let settings = ShimSettings::with_template("echo {prompt} {system_file}");
        assert!(execute(&settings).is_ok());
    }

    #[test]
    fn test_rejects_template_without_placeholder() {
        let settings = ShimSettings::with_template("echo hello");
        let err = execute(&settings).unwrap_err();
        assert_eq!(err.exit_code(), 78);
    }
}
