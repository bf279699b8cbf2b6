use anyhow::{Context, Result};
use serde::Serialize;
use serenity::model::id::GuildId;
use tracing::{error, info};

use lavaqueue::config::NodeConfig;
use lavaqueue::queue;
use lavaqueue::rest::{NodeRestClient, RequestContext};
use lavaqueue::QueueError;

const USAGE: &str = "uso: lavaqueue <guild_id> <queue|history|next [n]|previous [n]|shuffle|clear|clear-history|remove <index>>\n       lavaqueue --health-check";

#[tokio::main]
async fn main() -> Result<()> {
    // Inicializar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lavaqueue=debug".parse()?)
                .add_directive("reqwest=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("🎵 lavaqueue v{}", env!("CARGO_PKG_VERSION"));

    // Cargar configuración
    let config = NodeConfig::load()?;
    info!("{}", config.summary());

    let client = NodeRestClient::new(&config)?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|arg| arg == "--health-check") {
        return health_check(&client).await;
    }

    let session_id = config
        .session_id
        .as_deref()
        .context("LAVALINK_SESSION_ID es obligatorio para operar la cola")?;

    let [guild, command, rest @ ..] = args.as_slice() else {
        anyhow::bail!("{}", USAGE);
    };
    let guild_id = guild
        .parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .map(GuildId::new)
        .with_context(|| format!("guild_id inválido: {}", guild))?;
    let ctx = RequestContext::new(config.request_timeout);

    let result = run_command(&ctx, &client, session_id, guild_id, command, rest).await;
    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("❌ {}", e);
            Err(e.into())
        }
    }
}

async fn run_command(
    ctx: &RequestContext,
    client: &NodeRestClient,
    session_id: &str,
    guild_id: GuildId,
    command: &str,
    rest: &[String],
) -> Result<(), CommandError> {
    match command {
        "queue" => print_json(&queue::get_queue(ctx, client, session_id, guild_id).await?),
        "history" => print_json(&queue::get_history(ctx, client, session_id, guild_id).await?),
        "next" => {
            let track = queue::queue_next_track(ctx, client, session_id, guild_id, count_arg(rest)?).await?;
            print_json(&track)
        }
        "previous" => {
            let track = queue::queue_previous_track(ctx, client, session_id, guild_id, count_arg(rest)?).await?;
            print_json(&track)
        }
        "shuffle" => Ok(queue::shuffle_queue(ctx, client, session_id, guild_id).await?),
        "clear" => Ok(queue::clear_queue(ctx, client, session_id, guild_id).await?),
        "clear-history" => Ok(queue::clear_history(ctx, client, session_id, guild_id).await?),
        "remove" => {
            let index = rest
                .first()
                .ok_or_else(|| CommandError::Usage("remove necesita un índice".to_string()))?
                .parse()
                .map_err(|_| CommandError::Usage("índice inválido".to_string()))?;
            Ok(queue::remove_queue_track(ctx, client, session_id, guild_id, index).await?)
        }
        other => Err(CommandError::Usage(format!("comando desconocido: {}\n{}", other, USAGE))),
    }
}

#[derive(Debug, thiserror::Error)]
enum CommandError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Queue(#[from] QueueError),
    #[error("no se pudo imprimir la respuesta: {0}")]
    Output(#[from] serde_json::Error),
}

fn count_arg(rest: &[String]) -> Result<i32, CommandError> {
    match rest.first() {
        Some(raw) => raw
            .parse()
            .map_err(|_| CommandError::Usage(format!("cuenta inválida: {}", raw))),
        None => Ok(1),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CommandError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn health_check(client: &NodeRestClient) -> Result<()> {
    let version = client.version().await?;
    println!("OK {}", version.trim());
    Ok(())
}
