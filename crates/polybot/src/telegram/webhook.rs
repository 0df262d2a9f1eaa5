//! Webhook registration
//!
//! Telegram keeps at most one webhook per bot. Startup always removes the
//! current one first so a redeploy under a new URL never races the old hook.

use std::time::Duration;

use teloxide::prelude::*;

/// Pause between removing and registering the hook
const REREGISTER_DELAY: Duration = Duration::from_millis(500);

/// Replaces the bot's webhook with `url` and logs the bot identity
pub async fn register_webhook(bot: &Bot, url: url::Url) -> anyhow::Result<()> {
    bot.delete_webhook().await?;
    tokio::time::sleep(REREGISTER_DELAY).await;

    // The URL embeds the token; log only the host.
    log::info!(
        "Setting webhook on {}",
        url.host_str().unwrap_or("<no host>")
    );
    bot.set_webhook(url).await?;

    let me = bot.get_me().await?;
    log::info!(
        "Telegram Bot information: id={}, username=@{}, name={}",
        me.id,
        me.username(),
        me.first_name
    );
    Ok(())
}

/// Removes the bot's webhook
pub async fn delete_webhook(bot: &Bot) -> anyhow::Result<()> {
    bot.delete_webhook().await?;
    log::info!("Webhook removed");
    Ok(())
}
