use crate::server::commands::{self, Command};
use crate::server::driver::{SimulationDriver, SnapshotUpdate, Subscribe};
use crate::server::server::AppState;

use actix::prelude::*;
use actix_web::web;
use actix_web_actors::ws;
use std::time::{Duration, Instant};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(120);

// WebSocket actor streaming live snapshots to a canvas
pub(crate) struct SimulationWs {
    app_state: web::Data<AppState>,
    driver: Addr<SimulationDriver>,
    heartbeat: Instant,
}

impl SimulationWs {
    pub fn new(app_state: web::Data<AppState>, driver: Addr<SimulationDriver>) -> Self {
        Self {
            app_state,
            driver,
            heartbeat: Instant::now(),
        }
    }

    fn send_json(ctx: &mut ws::WebsocketContext<Self>, value: &serde_json::Value) {
        match serde_json::to_string(value) {
            Ok(text) => ctx.text(text),
            Err(e) => log::error!("Failed to serialize websocket message: {}", e),
        }
    }

    fn handle_command(&mut self, text: &str, ctx: &mut ws::WebsocketContext<Self>) {
        let command = match serde_json::from_str::<Command>(text) {
            Ok(command) => command,
            Err(e) => {
                log::warn!("Invalid command from client: {}", e);
                Self::send_json(
                    ctx,
                    &serde_json::json!({ "error": format!("Invalid command: {}", e) }),
                );
                return;
            }
        };
        log::debug!("Received command {:?}", command);
        // the resulting snapshot reaches this client through its subscription
        if let Err(e) = commands::apply(&self.app_state, &self.driver, command) {
            log::info!("Command rejected: {}", e);
            Self::send_json(ctx, &serde_json::json!({ "error": e.to_string() }));
        }
    }

    // Heartbeat to keep connection alive
    fn heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if Instant::now().duration_since(act.heartbeat) > CLIENT_TIMEOUT {
                log::info!("Websocket connection timeout, disconnecting");
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }
}

impl Actor for SimulationWs {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        log::info!("WebSocket connection started");

        match self.app_state.with_simulation(|sim| sim.snapshot()) {
            Ok(snapshot) => Self::send_json(
                ctx,
                &serde_json::json!({
                    "status": "connected",
                    "message": "WebSocket connection established",
                    "snapshot": snapshot,
                }),
            ),
            Err(e) => {
                log::error!("Failed to read simulation: {}", e);
                Self::send_json(ctx, &serde_json::json!({ "error": e.to_string() }));
                ctx.close(None);
                ctx.stop();
                return;
            }
        }

        self.driver.do_send(Subscribe(ctx.address().recipient()));
        self.heartbeat(ctx);
    }
}

impl Handler<SnapshotUpdate> for SimulationWs {
    type Result = ();

    fn handle(&mut self, msg: SnapshotUpdate, ctx: &mut ws::WebsocketContext<Self>) {
        match serde_json::to_string(&msg.0) {
            Ok(text) => ctx.text(text),
            Err(e) => log::error!("Failed to serialize snapshot: {}", e),
        }
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for SimulationWs {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.heartbeat = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.heartbeat = Instant::now();
                self.handle_command(&text, ctx);
            }
            Ok(ws::Message::Binary(_)) => {
                // We don't handle binary messages
                self.heartbeat = Instant::now();
            }
            Ok(ws::Message::Close(reason)) => {
                log::info!("WebSocket closed by client: {:?}", reason);
                ctx.close(reason);
                ctx.stop();
            }
            _ => {
                log::warn!("Unhandled WebSocket message, stopping actor");
                ctx.stop();
            }
        }
    }
}
