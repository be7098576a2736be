// Configuration loading from a file on disk

use matcha_watcher::AppConfig;
use matcha_watcher::config::NotifyMode;
use matcha_watcher::plugins::traits::ParseMode;
use std::io::Write;

#[test]
fn test_file_overrides_defaults() -> anyhow::Result<()> {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
    writeln!(
        file,
        r#"
[scheduler]
check_interval_secs = 60
simulate_restock = true

[notifications.telegram]
parse_mode = "html"
notify_mode = "per_item_with_summary"
"#
    )?;

    let config = AppConfig::load(Some(file.path()))?;
    config.validate()?;

    assert_eq!(config.scheduler.check_interval_secs, 60);
    assert_eq!(config.scheduler.run_duration_secs, 12 * 60 * 60);
    assert!(config.scheduler.simulate_restock);
    assert_eq!(config.notifications.telegram.parse_mode, ParseMode::Html);
    assert_eq!(config.notifications.telegram.notify_mode, NotifyMode::PerItemWithSummary);
    assert!(config.notifications.telegram.bot_token.is_none());

    Ok(())
}

#[test]
fn test_invalid_values_fail_validation() -> anyhow::Result<()> {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
    writeln!(file, "[scheduler]\ncheck_interval_secs = 0")?;

    let config = AppConfig::load(Some(file.path()))?;
    assert!(config.validate().is_err());

    Ok(())
}
