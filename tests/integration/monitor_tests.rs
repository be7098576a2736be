// End-to-end monitoring cycles against mocked vendor listings

use super::*;
use matcha_watcher::config::NotifyMode;
use matcha_watcher::plugins::traits::ParseMode;

async fn serve_all(
    sites: &VendorSites,
    ippodo: &[(&str, bool)],
    nakamura: &[(&str, bool)],
    marukyu: &[(&str, bool)],
) {
    serve_listing(&sites.ippodo, ippodo_page(ippodo)).await;
    serve_listing(&sites.nakamura, nakamura_page(nakamura)).await;
    serve_listing(&sites.marukyu, marukyu_page(marukyu)).await;
}

#[tokio::test]
async fn test_restock_detected_across_all_vendors() -> anyhow::Result<()> {
    let sites = VendorSites::start().await;
    let telegram = MockServer::start().await;
    mount_telegram(&telegram).await;

    let config = get_test_config(&sites, &telegram);
    let mut monitor = create_test_monitor(&config).await?;

    serve_all(
        &sites,
        &[("Sayaka 40g", false), ("Kan 30g", true)],
        &[("Matcha Houou", false)],
        &[("Unkaku", false), ("Wako", false)],
    )
    .await;

    let first = monitor.run_cycle().await;
    assert_eq!(first.restock_count(), 0);
    assert!(first.failed_sites().is_empty());
    assert!(sent_messages(&telegram).await.is_empty());

    serve_all(
        &sites,
        &[("Sayaka 40g", true), ("Kan 30g", true)],
        &[("Matcha Houou", false)],
        &[("Unkaku", true), ("Wako", false)],
    )
    .await;

    let second = monitor.run_cycle().await;
    assert_eq!(second.restock_count(), 2);

    let sites_in_order: Vec<&str> = second.sites.iter().map(|s| s.site.as_str()).collect();
    assert_eq!(sites_in_order, vec!["Ippodo", "Nakamura", "Marukyu"]);

    let messages = sent_messages(&telegram).await;
    assert_eq!(messages.len(), 2);

    let texts = sent_texts(&messages);
    assert!(texts[0].starts_with("🍵 Ippodo IN STOCK: *Sayaka 40g*"));
    assert!(texts[0].contains("https://global\\.ippodo\\-tea\\.co\\.jp/products/sayaka\\-40g"));
    assert!(texts[1].starts_with("🍵 Marukyu IN STOCK: *Unkaku*"));

    for message in &messages {
        assert_eq!(message["chat_id"], json!(-100200300));
        assert_eq!(message["parse_mode"], json!("MarkdownV2"));
        assert_eq!(message["disable_web_page_preview"], json!(true));
    }

    // Nothing new on a third pass
    let third = monitor.run_cycle().await;
    assert_eq!(third.restock_count(), 0);
    assert_eq!(sent_messages(&telegram).await.len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_vendor_outage_does_not_block_other_alerts() -> anyhow::Result<()> {
    let sites = VendorSites::start().await;
    let telegram = MockServer::start().await;
    mount_telegram(&telegram).await;

    let config = get_test_config(&sites, &telegram);
    let mut monitor = create_test_monitor(&config).await?;

    serve_all(
        &sites,
        &[("Kan 30g", false)],
        &[("Matcha Houou", false)],
        &[("Unkaku", false)],
    )
    .await;
    monitor.run_cycle().await;

    serve_error(&sites.ippodo, 500).await;
    serve_listing(&sites.nakamura, nakamura_page(&[("Matcha Houou", true)])).await;
    serve_listing(&sites.marukyu, marukyu_page(&[("Unkaku", true)])).await;

    let report = monitor.run_cycle().await;

    assert_eq!(report.failed_sites(), vec!["Ippodo"]);
    assert!(report.sites[0].error.as_deref().unwrap().contains("500"));
    assert_eq!(report.restock_count(), 2);

    // The failed vendor keeps its last known state
    assert_eq!(monitor.state().get("Kan 30g"), Some(false));
    assert_eq!(monitor.state().get("Matcha Houou"), Some(true));

    let texts = sent_texts(&sent_messages(&telegram).await);
    assert_eq!(texts.len(), 2);
    assert!(texts[0].contains("*Matcha Houou*"));
    assert!(texts[1].contains("*Unkaku*"));

    Ok(())
}

#[tokio::test]
async fn test_simulated_restock_alerts_on_second_cycle() -> anyhow::Result<()> {
    let sites = VendorSites::start().await;
    let telegram = MockServer::start().await;
    mount_telegram(&telegram).await;

    let mut config = get_test_config(&sites, &telegram);
    config.scheduler.simulate_restock = true;
    let mut monitor = create_test_monitor(&config).await?;

    serve_all(
        &sites,
        &[("Kan 30g", true)],
        &[("Matcha Houou", true), ("Premium Matcha", false)],
        &[],
    )
    .await;

    let first = monitor.run_cycle().await;
    assert_eq!(first.restock_count(), 0);
    assert!(sent_messages(&telegram).await.is_empty());

    let second = monitor.run_cycle().await;
    assert_eq!(second.restock_count(), 2);

    let texts = sent_texts(&sent_messages(&telegram).await);
    assert_eq!(texts.len(), 2);
    assert!(texts[0].contains("*Kan 30g*"));
    assert!(texts[1].contains("*Matcha Houou*"));

    Ok(())
}

#[tokio::test]
async fn test_summary_mode_sends_site_summary() -> anyhow::Result<()> {
    let sites = VendorSites::start().await;
    let telegram = MockServer::start().await;
    mount_telegram(&telegram).await;

    let mut config = get_test_config(&sites, &telegram);
    config.notifications.telegram.notify_mode = NotifyMode::PerItemWithSummary;
    let mut monitor = create_test_monitor(&config).await?;

    serve_all(&sites, &[], &[("Matcha Houou", false), ("Premium Matcha", false)], &[]).await;
    monitor.run_cycle().await;

    serve_listing(
        &sites.nakamura,
        nakamura_page(&[("Matcha Houou", true), ("Premium Matcha", true)]),
    )
    .await;
    let report = monitor.run_cycle().await;

    assert_eq!(report.sites[1].notifications_sent, 3);

    let messages = sent_messages(&telegram).await;
    assert_eq!(messages.len(), 3);

    let summary = &messages[2];
    let text = summary["text"].as_str().unwrap();
    assert!(text.starts_with("🍵 *Nakamura IS IN STOCK*\nTotal matcha restocked: 2\n"));
    assert!(text.ends_with("/collections/matcha"));
    assert_eq!(summary["disable_web_page_preview"], json!(false));

    Ok(())
}

#[tokio::test]
async fn test_html_parse_mode_end_to_end() -> anyhow::Result<()> {
    let sites = VendorSites::start().await;
    let telegram = MockServer::start().await;
    mount_telegram(&telegram).await;

    let mut config = get_test_config(&sites, &telegram);
    config.notifications.telegram.parse_mode = ParseMode::Html;
    let mut monitor = create_test_monitor(&config).await?;

    serve_all(&sites, &[], &[], &[("Unkaku", false)]).await;
    monitor.run_cycle().await;
    serve_listing(&sites.marukyu, marukyu_page(&[("Unkaku", true)])).await;
    monitor.run_cycle().await;

    let messages = sent_messages(&telegram).await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["parse_mode"], json!("HTML"));
    assert!(messages[0]["text"].as_str().unwrap().contains("<b>Unkaku</b>"));

    Ok(())
}

#[tokio::test]
async fn test_blacklisted_products_are_never_tracked() -> anyhow::Result<()> {
    let sites = VendorSites::start().await;
    let telegram = MockServer::start().await;
    mount_telegram(&telegram).await;

    let config = get_test_config(&sites, &telegram);
    let mut monitor = create_test_monitor(&config).await?;

    serve_all(&sites, &[("Matcha To-Go Packets", false)], &[("Teaware Chawan", false)], &[]).await;
    let report = monitor.run_cycle().await;
    assert!(report.sites.iter().all(|s| s.products.is_empty()));

    serve_all(&sites, &[("Matcha To-Go Packets", true)], &[("Teaware Chawan", true)], &[]).await;
    let report = monitor.run_cycle().await;

    assert_eq!(report.restock_count(), 0);
    assert!(monitor.state().is_empty());
    assert!(sent_messages(&telegram).await.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_monitoring_continues_when_telegram_rejects_messages() -> anyhow::Result<()> {
    let sites = VendorSites::start().await;
    let telegram = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: can't parse entities"
        })))
        .mount(&telegram)
        .await;

    let mut config = get_test_config(&sites, &telegram);
    config.notifications.telegram.verify_on_startup = false;
    let mut monitor = create_test_monitor(&config).await?;

    serve_all(&sites, &[], &[("Matcha Houou", false)], &[]).await;
    monitor.run_cycle().await;
    serve_listing(&sites.nakamura, nakamura_page(&[("Matcha Houou", true)])).await;

    let report = monitor.run_cycle().await;
    assert_eq!(report.restock_count(), 1);
    assert_eq!(report.sites[1].notifications_sent, 0);
    assert_eq!(report.sites[1].notifications_failed, 1);
    assert_eq!(monitor.state().get("Matcha Houou"), Some(true));

    // No retry on the next cycle
    monitor.run_cycle().await;
    assert_eq!(sent_messages(&telegram).await.len(), 1);

    Ok(())
}
