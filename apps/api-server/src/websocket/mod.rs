//! Realtime transport: a socket.io endpoint bridging browser connections
//! into the fan-out broker.
//!
//! Clients emit `join`/`leave` with a post id and receive
//! `comment_message` events for the `comments_<postID>` channel they are
//! in. Runs on its own listener next to the Actix HTTP server.

use std::sync::Arc;

use socketioxide::SocketIo;
use socketioxide::extract::{Data, SocketRef, State};
use uuid::Uuid;

use quill_core::ports::{CommentEvent, CommentFanout, Recipient, comment_channel};
use quill_shared::events::{COMMENT_MESSAGE_EVENT, CommentMessage};

/// Shared state for WebSocket handlers.
#[derive(Clone)]
pub struct WsState {
    pub fanout: Arc<dyn CommentFanout>,
}

/// One joined socket, seen by the broker as a recipient. Emitting does not
/// block; a closed socket just misses the event.
struct SocketRecipient {
    id: Uuid,
    socket: SocketRef,
}

impl Recipient for SocketRecipient {
    fn id(&self) -> Uuid {
        self.id
    }

    fn deliver(&self, event: &CommentEvent) -> bool {
        let message = CommentMessage::new(
            event.author.clone(),
            event.body.clone(),
            event.created_date,
        );
        self.socket.emit(COMMENT_MESSAGE_EVENT, &message).is_ok()
    }
}

/// Stable recipient id for a socket. The broker's join is idempotent per
/// id, so repeated joins from one connection collapse into one membership.
fn recipient_id(socket: &SocketRef) -> Uuid {
    let sid = socket.id.to_string();
    Uuid::new_v5(&Uuid::NAMESPACE_OID, sid.as_bytes())
}

/// Configure WebSocket handlers.
pub fn configure_socket_handlers(io: SocketIo) {
    io.ns("/", |socket: SocketRef| async move {
        tracing::info!(socket_id = %socket.id, "Client connected");

        // Join a post's comment group
        socket.on(
            "join",
            |socket: SocketRef, Data::<String>(post), State(state): State<WsState>| async move {
                let Ok(post_id) = post.parse::<Uuid>() else {
                    tracing::warn!(socket_id = %socket.id, value = %post, "Join with invalid post id");
                    return;
                };
                let room = comment_channel(post_id);
                socket.join(room.clone()).ok();

                let recipient = Arc::new(SocketRecipient {
                    id: recipient_id(&socket),
                    socket: socket.clone(),
                });
                state.fanout.join(post_id, recipient).await;

                tracing::info!(socket_id = %socket.id, room = %room, "Client joined room");
                socket.emit("joined", &room).ok();
            },
        );

        // Leave a post's comment group
        socket.on(
            "leave",
            |socket: SocketRef, Data::<String>(post), State(state): State<WsState>| async move {
                let Ok(post_id) = post.parse::<Uuid>() else {
                    return;
                };
                socket.leave(comment_channel(post_id)).ok();
                state.fanout.leave(post_id, recipient_id(&socket)).await;
                tracing::info!(socket_id = %socket.id, post_id = %post_id, "Client left room");
            },
        );

        // Teardown leaves every group; publishers are never blocked on it
        socket.on_disconnect(
            |socket: SocketRef, State(state): State<WsState>| async move {
                tracing::info!(socket_id = %socket.id, "Client disconnected");
                state.fanout.drop_connection(recipient_id(&socket)).await;
            },
        );
    });
}

/// Serve the socket.io endpoint on its own listener.
pub async fn run_realtime_server(
    addr: (String, u16),
    fanout: Arc<dyn CommentFanout>,
) -> std::io::Result<()> {
    use hyper_util::rt::{TokioExecutor, TokioIo};
    use hyper_util::server::conn::auto::Builder;
    use hyper_util::service::TowerToHyperService;

    let (svc, io) = SocketIo::builder()
        .with_state(WsState { fanout })
        .build_svc();
    configure_socket_handlers(io);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Realtime listener on {}", listener.local_addr()?);

    loop {
        let (stream, _) = listener.accept().await?;
        let svc = svc.clone();
        tokio::spawn(async move {
            let io = TokioIo::new(stream);
            if let Err(e) = Builder::new(TokioExecutor::new())
                .serve_connection_with_upgrades(io, TowerToHyperService::new(svc))
                .await
            {
                tracing::debug!("Realtime connection ended: {}", e);
            }
        });
    }
}
