// Telegram notifier setup against a mocked Bot API

use super::*;
use matcha_watcher::plugins::notifiers::TelegramNotifier;
use matcha_watcher::plugins::traits::{NotificationMessage, NotifierPlugin};

fn manager_for(config: &AppConfig) -> PluginManager {
    PluginManager::new(NotificationSettings::from(&config.notifications.telegram))
}

#[tokio::test]
async fn test_verified_bot_enables_notifications() -> anyhow::Result<()> {
    let sites = VendorSites::start().await;
    let telegram = MockServer::start().await;
    mount_telegram(&telegram).await;

    let config = get_test_config(&sites, &telegram);
    let plugins = manager_for(&config);

    assert!(plugins.initialize_default_notifiers(&config.notifications.telegram).await);
    assert!(plugins.has_notifier("telegram").await);

    Ok(())
}

#[tokio::test]
async fn test_rejected_token_disables_notifications() -> anyhow::Result<()> {
    let sites = VendorSites::start().await;
    let telegram = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "ok": false,
            "error_code": 401,
            "description": "Unauthorized"
        })))
        .mount(&telegram)
        .await;

    let config = get_test_config(&sites, &telegram);
    let plugins = manager_for(&config);

    assert!(!plugins.initialize_default_notifiers(&config.notifications.telegram).await);
    assert!(!plugins.has_notifier("telegram").await);

    Ok(())
}

#[tokio::test]
async fn test_missing_chat_id_disables_notifications() -> anyhow::Result<()> {
    let sites = VendorSites::start().await;
    let telegram = MockServer::start().await;
    mount_telegram(&telegram).await;

    let mut config = get_test_config(&sites, &telegram);
    config.notifications.telegram.chat_id = None;
    let plugins = manager_for(&config);

    assert!(!plugins.initialize_default_notifiers(&config.notifications.telegram).await);

    // Credentials are checked before any request goes out
    assert!(telegram.received_requests().await.unwrap_or_default().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_malformed_chat_id_disables_notifications() -> anyhow::Result<()> {
    let sites = VendorSites::start().await;
    let telegram = MockServer::start().await;

    let mut config = get_test_config(&sites, &telegram);
    config.notifications.telegram.chat_id = Some("not-a-number".to_string());
    let plugins = manager_for(&config);

    assert!(!plugins.initialize_default_notifiers(&config.notifications.telegram).await);
    assert!(!plugins.has_notifier("telegram").await);

    Ok(())
}

#[tokio::test]
async fn test_unverified_notifier_skips_get_me() -> anyhow::Result<()> {
    let sites = VendorSites::start().await;
    let telegram = MockServer::start().await;

    let mut config = get_test_config(&sites, &telegram);
    config.notifications.telegram.verify_on_startup = false;
    let plugins = manager_for(&config);

    assert!(plugins.initialize_default_notifiers(&config.notifications.telegram).await);
    assert!(telegram.received_requests().await.unwrap_or_default().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_send_message_payload() -> anyhow::Result<()> {
    let sites = VendorSites::start().await;
    let telegram = MockServer::start().await;
    mount_telegram(&telegram).await;

    let config = get_test_config(&sites, &telegram);
    let notifier = TelegramNotifier::from_config(&config.notifications.telegram)?;

    let result = notifier
        .notify(&NotificationMessage {
            text: "🍵 Nakamura IN STOCK: *Matcha Houou*".to_string(),
            parse_mode: Default::default(),
            disable_link_preview: true,
        })
        .await?;

    assert!(result.success);
    assert_eq!(result.message_id.as_deref(), Some("telegram-7"));

    let messages = sent_messages(&telegram).await;
    assert_eq!(
        messages,
        vec![json!({
            "chat_id": -100200300,
            "text": "🍵 Nakamura IN STOCK: *Matcha Houou*",
            "parse_mode": "MarkdownV2",
            "disable_web_page_preview": true
        })]
    );

    Ok(())
}
