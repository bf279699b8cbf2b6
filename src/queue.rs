//! # Queue Module
//!
//! Queue control operations against the Lavalink queue plugin.
//!
//! Each function issues exactly one request for one session and guild, and
//! keeps no state between calls: concurrent calls for the same guild are
//! fine, and the node decides the order in which they apply.
//!
//! ## Response handling
//!
//! - Status outside 2xx: always [`QueueError::Remote`], whatever the body
//! - 204 or empty body: `None` for operations whose result is optional
//! - Any other success body: decoded, or [`QueueError::Decode`] on mismatch
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use lavaqueue::config::NodeConfig;
//! use lavaqueue::queue;
//! use lavaqueue::rest::{NodeRestClient, RequestContext};
//! use serenity::model::id::GuildId;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = NodeRestClient::new(&NodeConfig::load()?)?;
//! let ctx = RequestContext::default();
//! let guild_id = GuildId::new(817327181659111454);
//!
//! match queue::queue_next_track(&ctx, &client, "xtaug914v9k5032f", guild_id, 1).await? {
//!     Some(track) => println!("Reproduciendo: {}", track.title()),
//!     None => println!("No quedan tracks"),
//! }
//! # Ok(())
//! # }
//! ```

use reqwest::Method;
use serde::de::DeserializeOwned;
use serenity::model::id::GuildId;
use tracing::{debug, warn};

use crate::error::{QueueError, RemoteError};
use crate::model::{Queue, QueueTrack, QueueUpdate, Track};
use crate::rest::{NodeRequest, NodeResponse, RequestContext, RestClient, API_PREFIX};

/// Obtiene el snapshot actual de la cola
pub async fn get_queue<C>(
    ctx: &RequestContext,
    client: &C,
    session_id: &str,
    guild_id: GuildId,
) -> Result<Queue, QueueError>
where
    C: RestClient + ?Sized,
{
    let request = NodeRequest::new(Method::GET, queue_path(session_id, guild_id));
    let response = send(ctx, client, request).await?;
    decode_required(response)
}

/// Aplica una actualización parcial; devuelve el nuevo track actual si cambió
pub async fn update_queue<C>(
    ctx: &RequestContext,
    client: &C,
    session_id: &str,
    guild_id: GuildId,
    update: &QueueUpdate,
) -> Result<Option<Track>, QueueError>
where
    C: RestClient + ?Sized,
{
    let request = NodeRequest::new(Method::PATCH, queue_path(session_id, guild_id)).with_json(update)?;
    let response = send(ctx, client, request).await?;
    decode_optional(response)
}

/// Agrega tracks al final de la cola, en orden.
///
/// Si la cola estaba parada el nodo empieza a reproducir y devuelve el track actual.
pub async fn add_queue_tracks<C>(
    ctx: &RequestContext,
    client: &C,
    session_id: &str,
    guild_id: GuildId,
    tracks: &[QueueTrack],
) -> Result<Option<Track>, QueueError>
where
    C: RestClient + ?Sized,
{
    let path = format!("{}/tracks", queue_path(session_id, guild_id));
    let request = NodeRequest::new(Method::POST, path).with_json(tracks)?;
    let response = send(ctx, client, request).await?;
    decode_optional(response)
}

/// Avanza `count` tracks. `None` significa que no quedan tracks.
pub async fn queue_next_track<C>(
    ctx: &RequestContext,
    client: &C,
    session_id: &str,
    guild_id: GuildId,
    count: i32,
) -> Result<Option<Track>, QueueError>
where
    C: RestClient + ?Sized,
{
    let path = format!("{}/next", queue_path(session_id, guild_id));
    let request = NodeRequest::new(Method::POST, path).with_query("count", effective_count(count));
    let response = send(ctx, client, request).await?;
    decode_optional(response)
}

/// Retrocede `count` tracks tomándolos del historial
pub async fn queue_previous_track<C>(
    ctx: &RequestContext,
    client: &C,
    session_id: &str,
    guild_id: GuildId,
    count: i32,
) -> Result<Option<Track>, QueueError>
where
    C: RestClient + ?Sized,
{
    let path = format!("{}/previous", queue_path(session_id, guild_id));
    let request = NodeRequest::new(Method::POST, path).with_query("count", effective_count(count));
    let response = send(ctx, client, request).await?;
    decode_optional(response)
}

/// Elimina el track en la posición `index` de la cola
pub async fn remove_queue_track<C>(
    ctx: &RequestContext,
    client: &C,
    session_id: &str,
    guild_id: GuildId,
    index: usize,
) -> Result<(), QueueError>
where
    C: RestClient + ?Sized,
{
    let path = format!("{}/tracks/{}", queue_path(session_id, guild_id), index);
    let response = send(ctx, client, NodeRequest::new(Method::DELETE, path)).await?;
    expect_success(response)
}

pub async fn shuffle_queue<C>(
    ctx: &RequestContext,
    client: &C,
    session_id: &str,
    guild_id: GuildId,
) -> Result<(), QueueError>
where
    C: RestClient + ?Sized,
{
    let path = format!("{}/shuffle", queue_path(session_id, guild_id));
    let response = send(ctx, client, NodeRequest::new(Method::POST, path)).await?;
    expect_success(response)
}

/// Vacía la cola pendiente; el track actual sigue sonando
pub async fn clear_queue<C>(
    ctx: &RequestContext,
    client: &C,
    session_id: &str,
    guild_id: GuildId,
) -> Result<(), QueueError>
where
    C: RestClient + ?Sized,
{
    let request = NodeRequest::new(Method::DELETE, queue_path(session_id, guild_id));
    let response = send(ctx, client, request).await?;
    expect_success(response)
}

/// Tracks ya reproducidos, del más antiguo al más reciente
pub async fn get_history<C>(
    ctx: &RequestContext,
    client: &C,
    session_id: &str,
    guild_id: GuildId,
) -> Result<Vec<Track>, QueueError>
where
    C: RestClient + ?Sized,
{
    let request = NodeRequest::new(Method::GET, history_path(session_id, guild_id));
    let response = send(ctx, client, request).await?;
    decode_required(response)
}

pub async fn clear_history<C>(
    ctx: &RequestContext,
    client: &C,
    session_id: &str,
    guild_id: GuildId,
) -> Result<(), QueueError>
where
    C: RestClient + ?Sized,
{
    let request = NodeRequest::new(Method::DELETE, history_path(session_id, guild_id));
    let response = send(ctx, client, request).await?;
    expect_success(response)
}

/// Cuenta mínima de 1 para next/previous
pub fn effective_count(count: i32) -> u32 {
    count.max(1).unsigned_abs()
}

fn player_path(session_id: &str, guild_id: GuildId) -> String {
    format!(
        "{}/sessions/{}/players/{}",
        API_PREFIX,
        urlencoding::encode(session_id),
        guild_id
    )
}

fn queue_path(session_id: &str, guild_id: GuildId) -> String {
    format!("{}/queue", player_path(session_id, guild_id))
}

fn history_path(session_id: &str, guild_id: GuildId) -> String {
    format!("{}/history", player_path(session_id, guild_id))
}

async fn send<C>(ctx: &RequestContext, client: &C, request: NodeRequest) -> Result<NodeResponse, QueueError>
where
    C: RestClient + ?Sized,
{
    debug!("🎼 {} {}", request.method, request.path);
    ctx.run(async { client.execute(request).await.map_err(QueueError::Transport) })
        .await
}

fn check_status(response: &NodeResponse) -> Result<(), QueueError> {
    if response.is_success() {
        return Ok(());
    }

    let err = RemoteError::from_response(response.status, &response.body);
    warn!("❌ Error del nodo ({}): {}", err.status, err.message);
    Err(QueueError::Remote(err))
}

fn expect_success(response: NodeResponse) -> Result<(), QueueError> {
    check_status(&response)
}

fn decode_optional<T: DeserializeOwned>(response: NodeResponse) -> Result<Option<T>, QueueError> {
    check_status(&response)?;

    if response.is_empty() {
        return Ok(None);
    }

    serde_json::from_slice(&response.body)
        .map(Some)
        .map_err(QueueError::Decode)
}

fn decode_required<T: DeserializeOwned>(response: NodeResponse) -> Result<T, QueueError> {
    let status = response.status.as_u16();
    decode_optional(response)?.ok_or(QueueError::EmptyBody { status })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QueueMode;
    use crate::model::track::tests::track_json;
    use crate::rest::{MockRestClient, CONTENT_TYPE_JSON};
    use async_trait::async_trait;
    use bytes::Bytes;
    use pretty_assertions::assert_eq;
    use reqwest::StatusCode;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    const SESSION: &str = "xtaug914v9k5032f";

    fn guild() -> GuildId {
        GuildId::new(817327181659111454)
    }

    fn respond(
        method: Method,
        path: &'static str,
        status: StatusCode,
        body: impl Into<Bytes>,
    ) -> MockRestClient {
        let body = body.into();
        let mut client = MockRestClient::new();
        client
            .expect_execute()
            .withf(move |request| request.method == method && request.path == path)
            .times(1)
            .returning(move |_| Ok(NodeResponse::new(status, body.clone())));
        client
    }

    #[tokio::test]
    async fn test_get_queue_repeat_queue_empty() {
        let client = respond(
            Method::GET,
            "/v4/sessions/xtaug914v9k5032f/players/817327181659111454/queue",
            StatusCode::OK,
            r#"{ "type": "repeat_queue", "tracks": [] }"#,
        );

        let queue = get_queue(&RequestContext::default(), &client, SESSION, guild()).await.unwrap();

        assert_eq!(queue.mode, QueueMode::RepeatQueue);
        assert!(queue.tracks.is_empty());
    }

    #[tokio::test]
    async fn test_get_queue_unknown_mode_is_decode_error() {
        let client = respond(
            Method::GET,
            "/v4/sessions/xtaug914v9k5032f/players/817327181659111454/queue",
            StatusCode::OK,
            r#"{"type":"loop_all","tracks":[]}"#,
        );

        let err = get_queue(&RequestContext::default(), &client, SESSION, guild()).await.unwrap_err();
        assert!(matches!(err, QueueError::Decode(_)));
    }

    #[tokio::test]
    async fn test_get_queue_empty_body_is_not_an_empty_queue() {
        let client = respond(
            Method::GET,
            "/v4/sessions/xtaug914v9k5032f/players/817327181659111454/queue",
            StatusCode::NO_CONTENT,
            "",
        );

        let err = get_queue(&RequestContext::default(), &client, SESSION, guild()).await.unwrap_err();
        assert!(matches!(err, QueueError::EmptyBody { status: 204 }));
    }

    #[tokio::test]
    async fn test_add_tracks_no_content() {
        let mut client = MockRestClient::new();
        client
            .expect_execute()
            .withf(|request| {
                request.method == Method::POST
                    && request.path == "/v4/sessions/xtaug914v9k5032f/players/817327181659111454/queue/tracks"
                    && request.content_type == Some(CONTENT_TYPE_JSON)
                    && request.body.as_deref() == Some(&br#"[{"encoded":"QAAA"},{"encoded":"QAAB","user_data":{"requester":1}}]"#[..])
            })
            .times(1)
            .returning(|_| Ok(NodeResponse::no_content()));

        let user_data = serde_json::value::RawValue::from_string(r#"{"requester":1}"#.to_string()).unwrap();
        let tracks = vec![
            QueueTrack::new("QAAA"),
            QueueTrack::new("QAAB").with_user_data(user_data),
        ];

        let current = add_queue_tracks(&RequestContext::default(), &client, SESSION, guild(), &tracks)
            .await
            .unwrap();
        assert!(current.is_none());
    }

    #[tokio::test]
    async fn test_add_tracks_starts_playback() {
        let body = track_json("QAAA", "First");
        let client = respond(
            Method::POST,
            "/v4/sessions/xtaug914v9k5032f/players/817327181659111454/queue/tracks",
            StatusCode::OK,
            body,
        );

        let current = add_queue_tracks(&RequestContext::default(), &client, SESSION, guild(), &[QueueTrack::new("QAAA")])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current.title(), "First");
    }

    #[tokio::test]
    async fn test_next_on_empty_queue() {
        let mut client = MockRestClient::new();
        client
            .expect_execute()
            .withf(|request| {
                request.method == Method::POST
                    && request.path == "/v4/sessions/xtaug914v9k5032f/players/817327181659111454/queue/next"
                    && request.query == vec![("count".to_string(), "3".to_string())]
                    && request.body.is_none()
            })
            .times(1)
            .returning(|_| Ok(NodeResponse::no_content()));

        let next = queue_next_track(&RequestContext::default(), &client, SESSION, guild(), 3)
            .await
            .unwrap();
        assert!(next.is_none());
    }

    #[tokio::test]
    async fn test_next_and_previous_clamp_count() {
        for count in [0, -5, i32::MIN] {
            let mut client = MockRestClient::new();
            client
                .expect_execute()
                .withf(|request| request.query == vec![("count".to_string(), "1".to_string())])
                .times(2)
                .returning(|_| Ok(NodeResponse::no_content()));

            let ctx = RequestContext::default();
            queue_next_track(&ctx, &client, SESSION, guild(), count).await.unwrap();
            queue_previous_track(&ctx, &client, SESSION, guild(), count).await.unwrap();
        }
    }

    #[test]
    fn test_effective_count() {
        assert_eq!(effective_count(0), 1);
        assert_eq!(effective_count(-1), 1);
        assert_eq!(effective_count(1), 1);
        assert_eq!(effective_count(25), 25);
    }

    #[tokio::test]
    async fn test_previous_returns_track() {
        let body = track_json("QAAZ", "Back Again");
        let client = respond(
            Method::POST,
            "/v4/sessions/xtaug914v9k5032f/players/817327181659111454/queue/previous",
            StatusCode::OK,
            body,
        );

        let track = queue_previous_track(&RequestContext::default(), &client, SESSION, guild(), 1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(track.encoded, "QAAZ");
    }

    #[tokio::test]
    async fn test_patch_bad_request_is_remote_error() {
        let mut client = MockRestClient::new();
        client
            .expect_execute()
            .withf(|request| {
                request.method == Method::PATCH
                    && request.path == "/v4/sessions/xtaug914v9k5032f/players/817327181659111454/queue"
                    && request.body.as_deref() == Some(&br#"{"type":"normal"}"#[..])
            })
            .times(1)
            .returning(|_| Ok(NodeResponse::new(StatusCode::BAD_REQUEST, r#"{"message":"invalid type"}"#)));

        let update = QueueUpdate::new().with_mode(QueueMode::Normal);
        let err = update_queue(&RequestContext::default(), &client, SESSION, guild(), &update)
            .await
            .unwrap_err();

        let remote = err.remote().expect("remote error");
        assert_eq!(remote.status, 400);
        assert_eq!(remote.message, "invalid type");
    }

    #[tokio::test]
    async fn test_update_with_empty_tracks_sends_empty_array() {
        let mut client = MockRestClient::new();
        client
            .expect_execute()
            .withf(|request| request.body.as_deref() == Some(&br#"{"tracks":[]}"#[..]))
            .times(1)
            .returning(|_| Ok(NodeResponse::no_content()));

        let update = QueueUpdate::new().with_tracks(Vec::new());
        let current = update_queue(&RequestContext::default(), &client, SESSION, guild(), &update)
            .await
            .unwrap();
        assert!(current.is_none());
    }

    #[tokio::test]
    async fn test_error_status_never_decodes_domain_value() {
        // cuerpo válido de Queue pero con status de error
        let body = r#"{"type":"normal","tracks":[]}"#;
        for status in [StatusCode::MULTIPLE_CHOICES, StatusCode::NOT_FOUND, StatusCode::INTERNAL_SERVER_ERROR] {
            let client = respond(
                Method::GET,
                "/v4/sessions/xtaug914v9k5032f/players/817327181659111454/queue",
                status,
                body,
            );

            let err = get_queue(&RequestContext::default(), &client, SESSION, guild()).await.unwrap_err();
            assert!(err.is_remote(), "status {status}");
            assert_eq!(err.remote().unwrap().status, status.as_u16());
        }
    }

    #[tokio::test]
    async fn test_optional_results_accept_any_empty_success() {
        for status in [StatusCode::OK, StatusCode::CREATED, StatusCode::ACCEPTED, StatusCode::NO_CONTENT] {
            let mut client = MockRestClient::new();
            client
                .expect_execute()
                .times(4)
                .returning(move |_| Ok(NodeResponse::new(status, "")));

            let ctx = RequestContext::default();
            assert!(update_queue(&ctx, &client, SESSION, guild(), &QueueUpdate::new()).await.unwrap().is_none());
            assert!(add_queue_tracks(&ctx, &client, SESSION, guild(), &[]).await.unwrap().is_none());
            assert!(queue_next_track(&ctx, &client, SESSION, guild(), 1).await.unwrap().is_none());
            assert!(queue_previous_track(&ctx, &client, SESSION, guild(), 1).await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn test_garbage_success_body_is_decode_error() {
        let client = respond(
            Method::POST,
            "/v4/sessions/xtaug914v9k5032f/players/817327181659111454/queue/next",
            StatusCode::OK,
            "not json",
        );

        let err = queue_next_track(&RequestContext::default(), &client, SESSION, guild(), 1)
            .await
            .unwrap_err();
        assert!(err.is_protocol());
        assert!(!err.is_remote());
    }

    #[tokio::test]
    async fn test_empty_result_operations() {
        let cases: [(Method, &'static str); 4] = [
            (Method::DELETE, "/v4/sessions/xtaug914v9k5032f/players/817327181659111454/queue/tracks/2"),
            (Method::POST, "/v4/sessions/xtaug914v9k5032f/players/817327181659111454/queue/shuffle"),
            (Method::DELETE, "/v4/sessions/xtaug914v9k5032f/players/817327181659111454/queue"),
            (Method::DELETE, "/v4/sessions/xtaug914v9k5032f/players/817327181659111454/history"),
        ];

        for (index, (method, path)) in cases.into_iter().enumerate() {
            let client = respond(method, path, StatusCode::NO_CONTENT, "");
            let ctx = RequestContext::default();

            let result = match index {
                0 => remove_queue_track(&ctx, &client, SESSION, guild(), 2).await,
                1 => shuffle_queue(&ctx, &client, SESSION, guild()).await,
                2 => clear_queue(&ctx, &client, SESSION, guild()).await,
                _ => clear_history(&ctx, &client, SESSION, guild()).await,
            };
            assert!(result.is_ok(), "{path}");
        }
    }

    #[tokio::test]
    async fn test_clear_queue_reports_remote_error() {
        let client = respond(
            Method::DELETE,
            "/v4/sessions/xtaug914v9k5032f/players/817327181659111454/queue",
            StatusCode::NOT_FOUND,
            r#"{"timestamp":1667857581613,"status":404,"error":"Not Found","message":"Player not found","path":"/v4/sessions/xtaug914v9k5032f/players/817327181659111454/queue"}"#,
        );

        let err = clear_queue(&RequestContext::default(), &client, SESSION, guild()).await.unwrap_err();
        assert_eq!(err.remote().unwrap().message, "Player not found");
    }

    #[tokio::test]
    async fn test_get_history_preserves_order() {
        let body = format!("[{},{}]", track_json("QAA1", "One"), track_json("QAA2", "Two"));
        let client = respond(
            Method::GET,
            "/v4/sessions/xtaug914v9k5032f/players/817327181659111454/history",
            StatusCode::OK,
            body,
        );

        let history = get_history(&RequestContext::default(), &client, SESSION, guild()).await.unwrap();
        let titles: Vec<&str> = history.iter().map(Track::title).collect();
        assert_eq!(titles, vec!["One", "Two"]);
    }

    #[tokio::test]
    async fn test_session_id_is_percent_encoded() {
        let client = respond(
            Method::GET,
            "/v4/sessions/a%2Fb%20c/players/817327181659111454/history",
            StatusCode::OK,
            "[]",
        );

        let history = get_history(&RequestContext::default(), &client, "a/b c", guild()).await.unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_transport_error_is_passed_through() {
        let mut client = MockRestClient::new();
        client
            .expect_execute()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("connection refused")));

        let err = shuffle_queue(&RequestContext::default(), &client, SESSION, guild()).await.unwrap_err();
        assert!(matches!(&err, QueueError::Transport(source) if source.to_string() == "connection refused"));
        assert!(err.is_transport());
    }

    struct SlowClient;

    #[async_trait]
    impl RestClient for SlowClient {
        async fn execute(&self, _request: NodeRequest) -> anyhow::Result<NodeResponse> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(NodeResponse::new(StatusCode::OK, r#"{"type":"normal","tracks":[]}"#))
        }
    }

    #[tokio::test]
    async fn test_timeout_returns_no_partial_value() {
        let ctx = RequestContext::new(Duration::from_millis(20));
        let err = get_queue(&ctx, &SlowClient, SESSION, guild()).await.unwrap_err();
        assert!(matches!(err, QueueError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_cancellation_aborts_request() {
        let token = CancellationToken::new();
        let ctx = RequestContext::default().with_cancellation(token.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        });

        let err = queue_next_track(&ctx, &SlowClient, SESSION, guild(), 1).await.unwrap_err();
        canceller.await.unwrap();
        assert!(matches!(err, QueueError::Cancelled));
    }

    #[tokio::test]
    async fn test_works_through_trait_object() {
        let client: Box<dyn RestClient> = Box::new(respond(
            Method::POST,
            "/v4/sessions/xtaug914v9k5032f/players/817327181659111454/queue/shuffle",
            StatusCode::NO_CONTENT,
            "",
        ));

        shuffle_queue(&RequestContext::default(), client.as_ref(), SESSION, guild())
            .await
            .unwrap();
    }
}
