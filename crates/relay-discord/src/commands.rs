//! Application command catalog and global registration.

use serenity::all::{
    ApplicationId, Command, CommandOptionType, CommandType, CreateCommand, CreateCommandOption,
    Http,
};

use relay_core::events::{DELETE_COMMAND, DELETE_CONTEXT_COMMAND, DELETE_OPTION, PING_COMMAND};

pub fn catalog() -> Vec<CreateCommand> {
    vec![
        CreateCommand::new(PING_COMMAND).description("Checks the bot's API latency to Discord."),
        CreateCommand::new(DELETE_COMMAND)
            .description("Deletes an image the bot posted in the target channel.")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    DELETE_OPTION,
                    "Message ID or message link",
                )
                .required(true),
            ),
        CreateCommand::new(DELETE_CONTEXT_COMMAND).kind(CommandType::Message),
    ]
}

/// Replace the application's global commands with [`catalog`]. Returns how many were registered.
pub async fn register_global(token: &str, application_id: u64) -> anyhow::Result<usize> {
    let http = Http::new(token);
    http.set_application_id(ApplicationId::new(application_id));
    let registered = Command::set_global_commands(&http, catalog()).await?;
    Ok(registered.len())
}
