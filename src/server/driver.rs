use std::sync::Arc;
use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::web;

use crate::opt::simulation::Snapshot;
use crate::server::server::AppState;

/// Snapshot pushed to every subscriber after an iteration or a state transition
#[derive(Message, Clone)]
#[rtype(result = "()")]
pub struct SnapshotUpdate(pub Arc<Snapshot>);

#[derive(Message)]
#[rtype(result = "()")]
pub struct Subscribe(pub Recipient<SnapshotUpdate>);

#[derive(Message)]
#[rtype(result = "()")]
pub struct Publish(pub Snapshot);

/// Begin the periodic iterations of the run identified by `epoch`
#[derive(Message)]
#[rtype(result = "()")]
pub struct StartTicking {
    pub epoch: u64,
}

// Message to trigger the next iteration
#[derive(Message)]
#[rtype(result = "()")]
struct RunNextIteration {
    epoch: u64,
}

/// Fixed-cadence scheduler for the shared simulation.
///
/// The next tick is only scheduled once the previous iteration and its broadcast are done,
/// so iterations never overlap. A tick whose epoch no longer matches the simulation is dropped
/// and not rescheduled.
pub struct SimulationDriver {
    app_state: web::Data<AppState>,
    tick_interval: Duration,
    subscribers: Vec<Recipient<SnapshotUpdate>>,
}

impl SimulationDriver {
    pub fn new(app_state: web::Data<AppState>, tick_interval: Duration) -> Self {
        Self {
            app_state,
            tick_interval,
            subscribers: Vec::new(),
        }
    }

    fn broadcast(&mut self, snapshot: Snapshot) {
        self.subscribers.retain(|s| s.connected());
        let update = SnapshotUpdate(Arc::new(snapshot));
        for subscriber in self.subscribers.iter() {
            subscriber.do_send(update.clone());
        }
    }

    fn schedule(&self, epoch: u64, ctx: &mut Context<Self>) {
        ctx.run_later(self.tick_interval, move |_, ctx| {
            ctx.address().do_send(RunNextIteration { epoch });
        });
    }
}

impl Actor for SimulationDriver {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        log::info!(
            "Simulation driver started, ticking every {}ms",
            self.tick_interval.as_millis()
        );
    }
}

impl Handler<Subscribe> for SimulationDriver {
    type Result = ();

    fn handle(&mut self, msg: Subscribe, _ctx: &mut Context<Self>) {
        self.subscribers.push(msg.0);
        log::debug!("Subscriber added, {} connected", self.subscribers.len());
    }
}

impl Handler<Publish> for SimulationDriver {
    type Result = ();

    fn handle(&mut self, msg: Publish, _ctx: &mut Context<Self>) {
        self.broadcast(msg.0);
    }
}

impl Handler<StartTicking> for SimulationDriver {
    type Result = ();

    fn handle(&mut self, msg: StartTicking, ctx: &mut Context<Self>) {
        log::debug!("Scheduling iterations for epoch {}", msg.epoch);
        self.schedule(msg.epoch, ctx);
    }
}

impl Handler<RunNextIteration> for SimulationDriver {
    type Result = ();

    fn handle(&mut self, msg: RunNextIteration, ctx: &mut Context<Self>) {
        let start = Instant::now();
        let snapshot = match self.app_state.with_simulation(|sim| sim.tick(msg.epoch)) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::error!("Failed to run iteration: {}", e);
                return;
            }
        };

        if let Some(snapshot) = snapshot {
            log::debug!(
                "Iteration {} done in {}ms",
                snapshot.iteration,
                start.elapsed().as_millis()
            );
            self.broadcast(snapshot);
            self.schedule(msg.epoch, ctx);
        }
    }
}
