use crate::channels::util::{split_message, truncate_chars};
use crate::commands::{self, CommandContext, Listing, Reply};
use crate::config::NotesSettings;
use crate::notes::NoteStore;
use serenity::all::{
    ChannelId, Client, Context, CreateEmbed, CreateEmbedFooter, CreateMessage, EventHandler,
    GatewayIntents, Http, Message, Ready,
};

/// Discord's per-message character limit
const MESSAGE_LIMIT: usize = 2000;

const EMBED_TITLE_LIMIT: usize = 256;
const EMBED_DESCRIPTION_LIMIT: usize = 4096;
const EMBED_FIELD_NAME_LIMIT: usize = 256;
const EMBED_FIELD_VALUE_LIMIT: usize = 1024;
const EMBED_FIELD_COUNT_LIMIT: usize = 25;
const EMBED_FOOTER_LIMIT: usize = 2048;

const HELP_COLOUR: u32 = 0xff0000;
const LISTING_COLOUR: u32 = 0x00ff00;

struct NotesHandler {
    store: NoteStore,
    settings: NotesSettings,
}

#[serenity::async_trait]
impl EventHandler for NotesHandler {
    async fn message(&self, ctx: Context, msg: Message) {
        // Ignore messages from bots (including ourselves)
        if msg.author.bot {
            return;
        }

        let command_ctx = CommandContext {
            store: &self.store,
            settings: &self.settings,
        };
        let Some(reply) = commands::handle(&msg.content, &command_ctx).await else {
            return;
        };

        log::info!(
            "Discord: Command from {} ({}): {}",
            msg.author.name,
            msg.author.id,
            truncate_chars(&msg.content, 80)
        );
        log::debug!("Discord: Reply: {}", truncate_chars(&reply.to_plain_text(), 200));

        send_reply(&ctx.http, msg.channel_id, reply).await;
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        log::info!("Discord: Bot connected as {}", ready.user.name);
    }
}

/// Render a listing as an embed, clamped to Discord's embed limits
fn build_embed(listing: &Listing, colour: u32) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(truncate_chars(&listing.title, EMBED_TITLE_LIMIT))
        .colour(colour);

    if let Some(description) = &listing.description {
        embed = embed.description(truncate_chars(description, EMBED_DESCRIPTION_LIMIT));
    }

    for (name, value) in listing.fields.iter().take(EMBED_FIELD_COUNT_LIMIT) {
        embed = embed.field(
            truncate_chars(name, EMBED_FIELD_NAME_LIMIT),
            truncate_chars(value, EMBED_FIELD_VALUE_LIMIT),
            false,
        );
    }

    if let Some(footer) = &listing.footer {
        embed = embed.footer(CreateEmbedFooter::new(truncate_chars(footer, EMBED_FOOTER_LIMIT)));
    }

    embed
}

async fn send_text(http: &Http, channel_id: ChannelId, text: &str) {
    for chunk in split_message(text, MESSAGE_LIMIT) {
        if let Err(e) = channel_id.say(http, &chunk).await {
            log::error!("Discord: Failed to send message: {}", e);
        }
    }
}

async fn send_embed(http: &Http, channel_id: ChannelId, embed: CreateEmbed) {
    if let Err(e) = channel_id
        .send_message(http, CreateMessage::new().embed(embed))
        .await
    {
        log::error!("Discord: Failed to send embed: {}", e);
    }
}

async fn send_reply(http: &Http, channel_id: ChannelId, reply: Reply) {
    match reply {
        Reply::Text(text) => send_text(http, channel_id, &text).await,
        Reply::Help { message, help } => {
            if let Some(message) = message {
                send_text(http, channel_id, &message).await;
            }
            send_embed(http, channel_id, build_embed(&help, HELP_COLOUR)).await;
        }
        Reply::Listing(listing) => {
            send_embed(http, channel_id, build_embed(&listing, LISTING_COLOUR)).await
        }
    }
}

/// Connect to the Discord gateway and answer commands until ctrl-c
pub async fn start_discord_listener(
    bot_token: &str,
    store: NoteStore,
    settings: NotesSettings,
) -> Result<(), String> {
    log::info!(
        "Starting Discord listener (prefix '{}', storage {})",
        settings.command_prefix,
        store.describe()
    );

    // Set up intents - we need message content to read commands
    let intents = GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let handler = NotesHandler { store, settings };

    let mut client = Client::builder(bot_token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| format!("Failed to create Discord client: {}", e))?;

    log::info!("Discord: Client created successfully");

    let shard_manager = client.shard_manager.clone();

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            log::info!("Discord listener received shutdown signal");
            shard_manager.shutdown_all().await;
        }
        result = client.start() => {
            if let Err(e) = result {
                let error = format!("Discord client error: {}", e);
                log::error!("{}", error);
                return Err(error);
            }
            log::info!("Discord listener stopped");
        }
    }

    Ok(())
}
