// web-server/src/counter_socket.rs
use actix::{Actor, ActorContext, ActorFutureExt, AsyncContext, StreamHandler, WrapFuture};
use actix_web::{get, web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use filedrop_common::models::CounterKind;
use filedrop_common::store::CounterRepository;
use filedrop_common::{parse_count_event, CountUpdated};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::middleware::RequireLogin;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

/// One browser's counter channel. Events are applied strictly in arrival order.
pub struct CounterSocket {
    counters: Arc<dyn CounterRepository>,
    last_heartbeat: Instant,
}

impl CounterSocket {
    pub fn new(counters: Arc<dyn CounterRepository>) -> Self {
        Self {
            counters,
            last_heartbeat: Instant::now(),
        }
    }

    fn heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if Instant::now().duration_since(act.last_heartbeat) > CLIENT_TIMEOUT {
                tracing::warn!("Counter socket heartbeat timeout");
                ctx.stop();
                return;
            }

            ctx.ping(b"");
        });
    }

    fn apply(&mut self, kind: CounterKind, ctx: &mut ws::WebsocketContext<Self>) {
        let counters = Arc::clone(&self.counters);

        // `wait` holds back the next frame until this increment has landed
        ctx.wait(
            async move { counters.increment(kind).await }
                .into_actor(self)
                .map(move |result, _act, ctx| match result {
                    Ok(value) => {
                        tracing::debug!("{} updated: {}", kind, value);
                        match serde_json::to_string(&CountUpdated::new(kind, value)) {
                            Ok(json) => ctx.text(json),
                            Err(e) => tracing::error!("Failed to serialize count reply: {}", e),
                        }
                    }
                    Err(e) => tracing::error!("Failed to increment {}: {}", kind, e),
                }),
        );
    }
}

impl Actor for CounterSocket {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!("Counter socket connected");
        self.last_heartbeat = Instant::now();
        self.heartbeat(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("Counter socket disconnected");
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for CounterSocket {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.last_heartbeat = Instant::now();
                match parse_count_event(&text) {
                    Some(kind) => self.apply(kind, ctx),
                    None => tracing::warn!("Ignoring unrecognised count event"),
                }
            }
            Ok(ws::Message::Close(reason)) => {
                tracing::info!("Counter socket closing: {:?}", reason);
                ctx.close(reason);
                ctx.stop();
            }
            Err(e) => {
                tracing::warn!("Counter socket protocol error: {}", e);
                ctx.stop();
            }
            _ => (),
        }
    }
}

#[get("/count", wrap = "RequireLogin::default()")]
pub async fn count_socket(
    req: HttpRequest,
    stream: web::Payload,
    counters: web::Data<dyn CounterRepository>,
) -> Result<HttpResponse, Error> {
    ws::start(CounterSocket::new(counters.into_inner()), &req, stream)
}

#[cfg(test)]
mod tests {
    use actix_web::http::{header, StatusCode};
    use actix_web::test;
    use awc::ws;
    use filedrop_common::models::CounterKind;
    use filedrop_common::CountUpdated;
    use futures_util::{SinkExt, StreamExt};

    use crate::testing::{self, test_app, TestState};

    fn upgrade_request() -> test::TestRequest {
        test::TestRequest::get()
            .uri("/count")
            .insert_header((header::CONNECTION, "upgrade"))
            .insert_header((header::UPGRADE, "websocket"))
            .insert_header((header::SEC_WEBSOCKET_VERSION, "13"))
            .insert_header((header::SEC_WEBSOCKET_KEY, "dGhlIHNhbXBsZSBub25jZQ=="))
    }

    #[actix_web::test]
    async fn test_socket_requires_login() {
        let state = TestState::new().await;
        let app = test_app!(state);

        let resp = test::call_service(&app, upgrade_request().to_request()).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    }

    #[actix_web::test]
    async fn test_socket_upgrades_for_logged_in_client() {
        let state = TestState::new().await;
        let cookie = testing::logged_in_cookie(&state).await;
        let app = test_app!(state);

        let resp = test::call_service(&app, upgrade_request().cookie(cookie).to_request()).await;
        assert_eq!(resp.status(), StatusCode::SWITCHING_PROTOCOLS);
    }

    #[actix_web::test]
    async fn test_events_are_counted_in_order() {
        let state = TestState::new().await;
        let cookie = testing::logged_in_cookie(&state).await;
        let srv = testing::start_server(&state);

        let (resp, mut conn) = awc::Client::new()
            .ws(srv.url("/count"))
            .cookie(cookie)
            .connect()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SWITCHING_PROTOCOLS);

        let events = [
            r#"{"type":"download"}"#,
            "not json",
            r#"{"type":"rename"}"#,
            r#"{"type":"download"}"#,
            r#"{"type":"preview"}"#,
            r#"{"type":"download"}"#,
        ];
        for event in events {
            conn.send(ws::Message::Text(event.into())).await.unwrap();
        }

        // malformed and unknown events get no reply, so the four replies line up
        // one-to-one with the valid events
        let mut replies = Vec::new();
        while replies.len() < 4 {
            match conn.next().await.unwrap().unwrap() {
                ws::Frame::Text(bytes) => {
                    replies.push(serde_json::from_slice::<CountUpdated>(&bytes).unwrap())
                }
                _ => continue,
            }
        }

        assert_eq!(
            replies,
            vec![
                CountUpdated::new(CounterKind::Download, 1),
                CountUpdated::new(CounterKind::Download, 2),
                CountUpdated::new(CounterKind::Preview, 1),
                CountUpdated::new(CounterKind::Download, 3),
            ]
        );
        assert_eq!(replies[0].status, "updated");

        assert_eq!(state.counters.get(CounterKind::Download).await.unwrap(), 3);
        assert_eq!(state.counters.get(CounterKind::Preview).await.unwrap(), 1);
    }

    #[actix_web::test]
    async fn test_anonymous_client_cannot_open_socket() {
        let state = TestState::new().await;
        let srv = testing::start_server(&state);

        let result = awc::Client::new().ws(srv.url("/count")).connect().await;
        assert!(result.is_err());
        assert_eq!(state.counters.get(CounterKind::Preview).await.unwrap(), 0);
    }
}
