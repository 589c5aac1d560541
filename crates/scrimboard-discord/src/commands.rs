//! Discord slash commands: `/scrim_add`, `/list_scrims`, `/edit_scrim`.
//!
//! Registration happens in `ready()` when `config.slash_commands` is true.
//! `/edit_scrim` answers with a modal; its submission arrives as a separate
//! `Interaction::Modal` and is handled by [`handle_modal`].

use std::collections::HashMap;

use chrono::Utc;
use chrono_tz::Tz;
use serenity::builder::{
    CreateActionRow, CreateCommand, CreateCommandOption, CreateInputText,
    CreateInteractionResponse, CreateInteractionResponseMessage, CreateModal,
};
use serenity::model::application::{
    ActionRowComponent, CommandInteraction, CommandOptionType, InputTextStyle, ModalInteraction,
};
use serenity::model::id::GuildId;
use serenity::prelude::Context;
use tracing::{info, warn};

use scrimboard_core::time::{format_modal_datetime, parse_modal_datetime, parse_slash_datetime};
use scrimboard_core::{Scrim, ScrimDraft, ScrimError, ScrimId};
use scrimboard_store::{EventSource, StoreError};

use crate::context::DiscordAppContext;
use crate::error::Result;

const EDIT_MODAL_PREFIX: &str = "edit_scrim:";
const BAD_SLASH_INPUT: &str =
    "Invalid date or time format. Use DD/MM/YYYY and HH:MMAM/PM (e.g., 23/12/2025 8:00PM)";

/// Register slash commands. Guild-scoped when `guild_id` is set, global otherwise.
pub async fn register_commands(ctx: &Context, guild_id: Option<GuildId>) {
    let text = |name: &str, description: &str, required: bool| {
        CreateCommandOption::new(CommandOptionType::String, name, description).required(required)
    };

    let commands = vec![
        CreateCommand::new("scrim_add")
            .description("Add a new scrim")
            .add_option(text("name", "Name of the Team/VOD", true))
            .add_option(text("date", "Date of scrim in DD/MM/YYYY", true))
            .add_option(text("start_time", "Start time e.g., 8:00PM", true))
            .add_option(text("end_time", "End time e.g., 10:00PM", true))
            .add_option(text("contact", "Optional contact name", false))
            .add_option(text("note", "Optional note", false)),
        CreateCommand::new("list_scrims").description("List all upcoming scrims"),
        CreateCommand::new("edit_scrim")
            .description("Edit a scrim")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Integer,
                    "scrim_id",
                    "ID shown by /list_scrims",
                )
                .required(true),
            ),
    ];

    match guild_id {
        Some(gid) => match gid.set_commands(&ctx.http, commands).await {
            Ok(cmds) => info!(guild = %gid, count = cmds.len(), "registered guild slash commands"),
            Err(e) => warn!(guild = %gid, error = %e, "failed to register guild commands"),
        },
        None => {
            match serenity::model::application::Command::set_global_commands(&ctx.http, commands)
                .await
            {
                Ok(cmds) => info!(count = cmds.len(), "registered global slash commands"),
                Err(e) => warn!(error = %e, "failed to register global slash commands"),
            }
        }
    }
}

/// Dispatch a slash command interaction to the appropriate handler.
pub async fn handle_interaction(
    app: &DiscordAppContext,
    ctx: &Context,
    command: &CommandInteraction,
) {
    let result = match command.data.name.as_str() {
        "scrim_add" => handle_scrim_add(app, ctx, command).await,
        "list_scrims" => handle_list_scrims(app, ctx, command).await,
        "edit_scrim" => handle_edit_scrim(app, ctx, command).await,
        _ => {
            respond_ephemeral(ctx, command, "Unknown command.").await;
            Ok(())
        }
    };

    if let Err(e) = result {
        warn!(command = %command.data.name, error = %e, "slash command error");
        respond_ephemeral(ctx, command, "Something went wrong, check the bot logs.").await;
    }
}

fn str_option<'a>(command: &'a CommandInteraction, name: &str) -> Option<&'a str> {
    command
        .data
        .options
        .iter()
        .find(|o| o.name == name)
        .and_then(|o| o.value.as_str())
}

/// `/scrim_add name date start_time end_time [contact] [note]`
async fn handle_scrim_add(
    app: &DiscordAppContext,
    ctx: &Context,
    command: &CommandInteraction,
) -> Result<()> {
    let name = str_option(command, "name").unwrap_or("");
    let date = str_option(command, "date").unwrap_or("");
    let times = (
        str_option(command, "start_time").unwrap_or(""),
        str_option(command, "end_time").unwrap_or(""),
    );

    let (start, end) = match (
        parse_slash_datetime(date, times.0, app.tz),
        parse_slash_datetime(date, times.1, app.tz),
    ) {
        (Ok(s), Ok(e)) => (s, e),
        _ => {
            respond_ephemeral(ctx, command, BAD_SLASH_INPUT).await;
            return Ok(());
        }
    };

    let draft = match ScrimDraft::new(
        name,
        start,
        end,
        str_option(command, "contact"),
        str_option(command, "note"),
    ) {
        Ok(d) => d,
        Err(e) => {
            respond_ephemeral(ctx, command, &e.to_string()).await;
            return Ok(());
        }
    };

    let scrim = app.store.add_scrim(&draft)?;
    info!(scrim_id = %scrim.id, name = %scrim.name, user = %command.user.name, "scrim added via slash command");
    app.request_refresh("slash scrim_add");

    respond_ephemeral(ctx, command, "Scrim added ✅").await;
    Ok(())
}

/// `/list_scrims`: ids for use with `/edit_scrim`.
async fn handle_list_scrims(
    app: &DiscordAppContext,
    ctx: &Context,
    command: &CommandInteraction,
) -> Result<()> {
    let scrims = app.store.list_active(Utc::now())?;
    respond_ephemeral(ctx, command, &scrim_list_text(&scrims)).await;
    Ok(())
}

/// `/edit_scrim scrim_id`: opens a pre-filled modal.
async fn handle_edit_scrim(
    app: &DiscordAppContext,
    ctx: &Context,
    command: &CommandInteraction,
) -> Result<()> {
    let id = command
        .data
        .options
        .iter()
        .find(|o| o.name == "scrim_id")
        .and_then(|o| o.value.as_i64());

    let scrim = match id {
        Some(id) => app.store.get_scrim(ScrimId(id))?,
        None => None,
    };
    let Some(scrim) = scrim else {
        respond_ephemeral(ctx, command, "Scrim not found").await;
        return Ok(());
    };

    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Modal(edit_modal(&scrim, app.tz)),
        )
        .await?;
    Ok(())
}

/// Handle the edit modal submission.
pub async fn handle_modal(app: &DiscordAppContext, ctx: &Context, modal: &ModalInteraction) {
    let Some(id) = parse_modal_id(&modal.data.custom_id) else {
        warn!(custom_id = %modal.data.custom_id, "unknown modal submission");
        return;
    };

    let mut values = HashMap::new();
    for row in &modal.data.components {
        for component in &row.components {
            if let ActionRowComponent::InputText(input) = component {
                values.insert(
                    input.custom_id.clone(),
                    input.value.clone().unwrap_or_default(),
                );
            }
        }
    }

    let reply = match draft_from_modal(&values, app.tz) {
        Err(ScrimError::InvalidDateTime { .. }) => "Invalid date/time format".to_string(),
        Err(e) => e.to_string(),
        Ok(draft) => match app.store.update_scrim(id, &draft) {
            Ok(scrim) => {
                info!(scrim_id = %scrim.id, user = %modal.user.name, "scrim edited via modal");
                app.request_refresh("slash edit_scrim");
                "Scrim updated ✅".to_string()
            }
            Err(StoreError::ScrimNotFound { .. }) => "Scrim not found".to_string(),
            Err(e) => {
                warn!(scrim_id = %id, error = %e, "scrim update failed");
                "Something went wrong, check the bot logs.".to_string()
            }
        },
    };

    let _ = modal
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(reply)
                    .ephemeral(true),
            ),
        )
        .await;
}

/// One line per scrim: `ID: \`7\` | **Alpha** | <t:…:f>`.
pub fn scrim_list_text(scrims: &[Scrim]) -> String {
    if scrims.is_empty() {
        return "No upcoming scrims.".to_string();
    }
    scrims
        .iter()
        .map(|s| format!("ID: `{}` | **{}** | <t:{}:f>", s.id, s.name, s.start.timestamp()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn edit_modal(scrim: &Scrim, tz: Tz) -> CreateModal {
    let input = |label: &str, id: &str, value: String, required: bool| {
        CreateActionRow::InputText(
            CreateInputText::new(InputTextStyle::Short, label, id)
                .value(value)
                .required(required),
        )
    };

    CreateModal::new(format!("{EDIT_MODAL_PREFIX}{}", scrim.id), "Edit Scrim").components(vec![
        input("Name", "name", scrim.name.clone(), true),
        input(
            "Start Time (DD/MM/YYYY HH:MMAM/PM)",
            "start",
            format_modal_datetime(scrim.start, tz),
            true,
        ),
        input(
            "End Time (DD/MM/YYYY HH:MMAM/PM)",
            "end",
            format_modal_datetime(scrim.end, tz),
            true,
        ),
        input("Contact", "contact", scrim.contact.clone().unwrap_or_default(), false),
        input("Note", "note", scrim.note.clone().unwrap_or_default(), false),
    ])
}

fn parse_modal_id(custom_id: &str) -> Option<ScrimId> {
    custom_id
        .strip_prefix(EDIT_MODAL_PREFIX)?
        .parse()
        .ok()
        .map(ScrimId)
}

fn draft_from_modal(values: &HashMap<String, String>, tz: Tz) -> scrimboard_core::Result<ScrimDraft> {
    let field = |key: &str| values.get(key).map(String::as_str);
    let start = parse_modal_datetime(field("start").unwrap_or(""), tz)?;
    let end = parse_modal_datetime(field("end").unwrap_or(""), tz)?;
    ScrimDraft::new(
        field("name").unwrap_or(""),
        start,
        end,
        field("contact"),
        field("note"),
    )
}

/// Send an ephemeral response to a slash command (only visible to the invoker).
async fn respond_ephemeral(ctx: &Context, command: &CommandInteraction, content: &str) {
    let _ = command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(content)
                    .ephemeral(true),
            ),
        )
        .await;
}
