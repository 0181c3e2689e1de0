use crate::layers::error::Error;
use crate::opt::aco::AcoConfig;
use crate::opt::simulation::Simulation;
use crate::server::commands::{self, Command};
use crate::server::cors::cors_middleware;
use crate::server::driver::SimulationDriver;
use crate::server::sim_ws::SimulationWs;

use actix::prelude::*;
use actix_web::{
    get, http::StatusCode, post, web, App, HttpRequest, HttpResponse, HttpServer, Responder,
    ResponseError,
};
use actix_web_actors::ws;
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::Duration;

// The one simulation shared by every client
pub struct AppState {
    simulation: Mutex<Simulation>,
}

impl AppState {
    pub fn new(simulation: Simulation) -> Self {
        AppState {
            simulation: Mutex::new(simulation),
        }
    }

    /// Run `f` with exclusive access to the simulation
    pub fn with_simulation<T>(&self, f: impl FnOnce(&mut Simulation) -> T) -> Result<T, Error> {
        let mut guard = self.simulation.lock().map_err(|_| Error::StatePoisoned)?;
        Ok(f(&mut guard))
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::NotEnoughCities { .. } | Error::InvalidCoordinates { .. } => {
                StatusCode::BAD_REQUEST
            }
            Error::SimulationRunning => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string()
        }))
    }
}

#[derive(Deserialize)]
struct CityParams {
    x: f64,
    y: f64,
}

#[get("/snapshot")]
async fn get_snapshot(data: web::Data<AppState>) -> Result<HttpResponse, Error> {
    let snapshot = data.with_simulation(|sim| sim.snapshot())?;
    Ok(HttpResponse::Ok().json(snapshot))
}

#[post("/cities")]
async fn add_city(
    city: web::Json<CityParams>,
    data: web::Data<AppState>,
    driver: web::Data<Addr<SimulationDriver>>,
) -> Result<HttpResponse, Error> {
    let snapshot = commands::apply(
        &data,
        &driver,
        Command::AddCity {
            x: city.x,
            y: city.y,
        },
    )?;
    Ok(HttpResponse::Ok().json(snapshot))
}

#[post("/start")]
async fn start_simulation(
    data: web::Data<AppState>,
    driver: web::Data<Addr<SimulationDriver>>,
) -> Result<HttpResponse, Error> {
    let snapshot = commands::apply(&data, &driver, Command::Start)?;
    Ok(HttpResponse::Ok().json(snapshot))
}

#[post("/clear")]
async fn clear_simulation(
    data: web::Data<AppState>,
    driver: web::Data<Addr<SimulationDriver>>,
) -> Result<HttpResponse, Error> {
    let snapshot = commands::apply(&data, &driver, Command::Clear)?;
    Ok(HttpResponse::Ok().json(snapshot))
}

#[get("/simulate-live")]
async fn simulate_live(
    req: HttpRequest,
    stream: web::Payload,
    data: web::Data<AppState>,
    driver: web::Data<Addr<SimulationDriver>>,
) -> Result<HttpResponse, actix_web::Error> {
    log::info!("WebSocket connection request for simulate-live");
    let ws = SimulationWs::new(data.clone(), driver.get_ref().clone());
    ws::start(ws, &req, stream)
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Register every route on an app, used by `start_server` and the integration tests
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_snapshot)
        .service(add_city)
        .service(start_simulation)
        .service(clear_simulation)
        .service(simulate_live)
        .service(health);
}

pub async fn start_server(
    host: &str,
    port: u16,
    params: AcoConfig,
    tick_interval: Duration,
) -> std::io::Result<()> {
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    params.print_stats();
    let simulation = Simulation::new(params)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;

    let app_state = web::Data::new(AppState::new(simulation));
    let driver = web::Data::new(SimulationDriver::new(app_state.clone(), tick_interval).start());

    log::info!("Starting server on {}:{}", host, port);
    HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware())
            .app_data(app_state.clone())
            .app_data(driver.clone())
            .configure(configure)
    })
    .bind(addr)?
    .run()
    .await?;

    log::info!("Server on {}:{} stopped", host, port);
    Ok(())
}
