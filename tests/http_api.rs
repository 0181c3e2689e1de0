use std::time::Duration;

use actix::Actor;
use actix_web::{http::StatusCode, test, web, App};
use serde_json::Value;

use ant_colony::opt::aco::AcoConfig;
use ant_colony::opt::simulation::Simulation;
use ant_colony::server::driver::SimulationDriver;
use ant_colony::server::server::{configure, AppState};

fn app_data(tick: Duration) -> (web::Data<AppState>, web::Data<actix::Addr<SimulationDriver>>) {
    let sim = Simulation::new(AcoConfig {
        seed: Some(3),
        ..AcoConfig::default()
    })
    .unwrap();
    let state = web::Data::new(AppState::new(sim));
    let driver = web::Data::new(SimulationDriver::new(state.clone(), tick).start());
    (state, driver)
}

#[actix_web::test]
async fn test_start_rejected_without_two_cities() {
    let (state, driver) = app_data(Duration::from_secs(3600));
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .app_data(driver.clone())
            .configure(configure),
    )
    .await;

    let req = test::TestRequest::post().uri("/start").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/cities")
        .set_json(serde_json::json!({"x": 10.0, "y": 20.0}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post().uri("/start").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("at least 2 cities"));

    let req = test::TestRequest::get().uri("/snapshot").to_request();
    let snapshot: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(snapshot["phase"], "ready");
    assert_eq!(snapshot["cities"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn test_start_and_clear() {
    let (state, driver) = app_data(Duration::from_secs(3600));
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .app_data(driver.clone())
            .configure(configure),
    )
    .await;

    for (x, y) in [(0.0, 0.0), (100.0, 50.0)] {
        let req = test::TestRequest::post()
            .uri("/cities")
            .set_json(serde_json::json!({"x": x, "y": y}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    let req = test::TestRequest::post().uri("/start").to_request();
    let snapshot: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(snapshot["phase"], "running");
    assert_eq!(snapshot["pheromones"], serde_json::json!([[1.0, 1.0], [1.0, 1.0]]));

    // placing cities mid-run is refused
    let req = test::TestRequest::post()
        .uri("/cities")
        .set_json(serde_json::json!({"x": 5.0, "y": 5.0}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // drive one iteration by hand
    let snapshot = state.with_simulation(|sim| sim.step()).unwrap().unwrap();
    assert_eq!(snapshot.ants.len(), 10);
    assert!(snapshot.ants.iter().all(|a| a.tour.len() == 2));

    let req = test::TestRequest::post().uri("/clear").to_request();
    let snapshot: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(snapshot["phase"], "empty");
    assert!(snapshot["ants"].as_array().unwrap().is_empty());
    assert!(snapshot["bestTour"].is_null());
    assert!(snapshot["pheromones"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_scheduled_iterations_stop_after_clear() {
    let (state, driver) = app_data(Duration::from_millis(10));
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .app_data(driver.clone())
            .configure(configure),
    )
    .await;

    for (x, y) in [(0.0, 0.0), (100.0, 0.0), (50.0, 80.0)] {
        let req = test::TestRequest::post()
            .uri("/cities")
            .set_json(serde_json::json!({"x": x, "y": y}))
            .to_request();
        test::call_service(&app, req).await;
    }
    let req = test::TestRequest::post().uri("/start").to_request();
    test::call_service(&app, req).await;

    actix_rt::time::sleep(Duration::from_millis(100)).await;
    let req = test::TestRequest::get().uri("/snapshot").to_request();
    let snapshot: Value = test::call_and_read_body_json(&app, req).await;
    assert!(snapshot["iteration"].as_u64().unwrap() >= 1);
    assert!(!snapshot["bestTour"].is_null());

    let req = test::TestRequest::post().uri("/clear").to_request();
    test::call_service(&app, req).await;
    actix_rt::time::sleep(Duration::from_millis(50)).await;

    let req = test::TestRequest::get().uri("/snapshot").to_request();
    let snapshot: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(snapshot["phase"], "empty");
    assert_eq!(snapshot["iteration"], 0);
    assert!(snapshot["ants"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_health() {
    let (state, driver) = app_data(Duration::from_secs(3600));
    let app = test::init_service(
        App::new()
            .app_data(state)
            .app_data(driver)
            .configure(configure),
    )
    .await;
    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
}
