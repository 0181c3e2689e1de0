use actix::Addr;
use serde::Deserialize;

use crate::layers::{city::City, error::Error};
use crate::opt::simulation::Snapshot;
use crate::server::driver::{Publish, SimulationDriver, StartTicking};
use crate::server::server::AppState;

/// Input events accepted from the canvas, over HTTP or the live websocket
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Command {
    AddCity { x: f64, y: f64 },
    Start,
    Clear,
}

/// Apply a command to the shared simulation and publish the resulting snapshot.
///
/// A rejected command leaves the simulation untouched and publishes nothing.
pub fn apply(
    state: &AppState,
    driver: &Addr<SimulationDriver>,
    command: Command,
) -> Result<Snapshot, Error> {
    let (snapshot, started) = state.with_simulation(|sim| -> Result<_, Error> {
        let started = match command {
            Command::AddCity { x, y } => {
                sim.add_city(City::new(x, y)?)?;
                None
            }
            Command::Start => Some(sim.start()?),
            Command::Clear => {
                sim.clear();
                None
            }
        };
        Ok((sim.snapshot(), started))
    })??;

    if let Some(epoch) = started {
        driver.do_send(StartTicking { epoch });
    }
    driver.do_send(Publish(snapshot.clone()));
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_commands() {
        let add: Command = serde_json::from_str(r#"{"type":"addCity","x":12.5,"y":40}"#).unwrap();
        assert_eq!(add, Command::AddCity { x: 12.5, y: 40.0 });
        let start: Command = serde_json::from_str(r#"{"type":"start"}"#).unwrap();
        assert_eq!(start, Command::Start);
        let clear: Command = serde_json::from_str(r#"{"type":"clear"}"#).unwrap();
        assert_eq!(clear, Command::Clear);
        assert!(serde_json::from_str::<Command>(r#"{"type":"pause"}"#).is_err());
    }
}
