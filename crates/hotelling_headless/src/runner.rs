//! Headless session runner implementation.

use std::io::{self, BufRead, Write};

use hotelling_core::components::PlayerId;
use hotelling_core::engine::{Engine, Outcome};
use hotelling_core::error::{EngineError, Result as EngineResult};
use hotelling_core::math::MapPoint;
use tracing::{debug, info, warn};

use crate::protocol::{Command, ProductOutput, ReportOutput, Response, PROTOCOL_VERSION};
use crate::session_file::SessionFile;

/// Headless runner driving one engine from JSON-line commands.
pub struct HeadlessRunner {
    engine: Engine,
}

impl HeadlessRunner {
    /// Create a runner for the session described by `session`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Configuration`] if the session values are invalid.
    pub fn new(session: &SessionFile) -> EngineResult<Self> {
        let engine = Engine::from_seed(session.config(), session.seed)?;
        Ok(Self { engine })
    }

    /// The engine being driven.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// The greeting sent before any command is read.
    pub fn ready(&self) -> Response {
        let config = self.engine.config();
        Response::Ready {
            version: PROTOCOL_VERSION.to_string(),
            players: config.player_count,
            customers: config.customer_count,
            map_width: config.map_width,
            map_height: config.map_height,
        }
    }

    /// Run the protocol loop until `quit` or end of input.
    ///
    /// Every non-blank input line produces exactly one response line.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        write_response(&mut output, &self.ready())?;

        for line in input.lines() {
            let line = line?;
            let Some(response) = self.handle_line(&line) else {
                continue;
            };
            write_response(&mut output, &response)?;
            if response == Response::Bye {
                info!("quit received");
                return Ok(());
            }
        }

        debug!("input closed");
        write_response(&mut output, &Response::Bye)
    }

    /// Parse and handle one input line. Blank lines yield `None`.
    pub fn handle_line(&mut self, line: &str) -> Option<Response> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        match Command::from_json(line) {
            Ok(cmd) => Some(self.handle(cmd)),
            Err(e) => {
                warn!(error = %e, "unparseable command");
                Some(Response::error(format!("Invalid command: {e}")))
            }
        }
    }

    /// Apply one command to the engine.
    pub fn handle(&mut self, cmd: Command) -> Response {
        let name = cmd.name();
        debug!(cmd = name, "handling command");

        let result = match cmd {
            Command::Place { player, x, y } => self.place(player, x, y),
            Command::Confirm => self.engine.confirm_placement(),
            Command::NextRound => self.engine.advance_from_results(),
            Command::Reset => Ok(self.engine.reset()),
            Command::Setup => self.engine.enter_setup(),
            Command::Begin => self.engine.begin(),
            Command::Query => return self.state(),
            Command::Hash => {
                return Response::StateHash {
                    hash: self.engine.state_hash(),
                }
            }
            Command::Quit => return Response::Bye,
        };

        self.respond(name, result)
    }

    fn place(&mut self, player: Option<u32>, x: f64, y: f64) -> EngineResult<Outcome> {
        let player = player.map_or_else(|| self.engine.active_player(), PlayerId);
        let config = self.engine.config();
        let position = MapPoint::from_f64(x, y).ok_or(EngineError::PositionOutOfBounds {
            x,
            y,
            width: config.map_width,
            height: config.map_height,
        })?;
        self.engine.place_product(player, position)
    }

    fn respond(&self, name: &str, result: EngineResult<Outcome>) -> Response {
        match result {
            Ok(outcome) => Response::from_outcome(&outcome, self.engine.scoreboard().scores()),
            Err(e) => Response::rejected(name, e),
        }
    }

    fn state(&self) -> Response {
        let engine = &self.engine;
        let products = engine
            .registry()
            .products()
            .iter()
            .map(|p| {
                let (x, y) = p.position.to_f64();
                ProductOutput {
                    player: p.owner.index(),
                    x,
                    y,
                    customers: p.assigned_count,
                }
            })
            .collect();

        Response::State {
            phase: engine.phase(),
            active_player: engine.active_player().index(),
            completed_rounds: engine.completed_rounds(),
            products,
            customers: engine.registry().customer_count(),
            scores: engine.scoreboard().scores().to_vec(),
            last_report: engine.last_report().map(ReportOutput::from),
            session_winner: engine.session_winner().map(|p| p.index()),
        }
    }
}

fn write_response<W: Write>(output: &mut W, response: &Response) -> io::Result<()> {
    output.write_all(response.to_json_line().as_bytes())?;
    output.flush()
}
