pub mod session;

use crate::catalog::Catalog;
use crate::error::{GameError, GameResult};
use crate::protocol::{ServerMessage, PROTOCOL_VERSION};
use crate::types::*;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

pub use session::{GameSession, GuessOutcome};

/// Shared application state
///
/// Locks are always taken catalog first, then session.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<RwLock<Catalog>>,
    pub session: Arc<RwLock<GameSession>>,
    /// Broadcast channel for notifications to every connected client
    pub broadcast: broadcast::Sender<ServerMessage>,
}

impl AppState {
    pub fn new(catalog: Catalog) -> Self {
        let (tx, _rx) = broadcast::channel(100);
        Self {
            catalog: Arc::new(RwLock::new(catalog)),
            session: Arc::new(RwLock::new(GameSession::new())),
            broadcast: tx,
        }
    }

    /// Send a message to all clients
    pub fn broadcast_to_all(&self, msg: ServerMessage) {
        // No receivers connected is fine
        let _ = self.broadcast.send(msg);
    }

    /// Everything a freshly connected client needs to render
    pub async fn welcome(&self) -> ServerMessage {
        let catalog = self.catalog.read().await;
        let session = self.session.read().await;

        ServerMessage::Welcome {
            protocol: PROTOCOL_VERSION.to_string(),
            session_id: session.id.clone(),
            server_now: chrono::Utc::now().to_rfc3339(),
            categories: catalog.list_categories(),
            active_category: catalog.active_category().as_option(),
            teams: session.teams().to_vec(),
            scores: session.standings(),
            view: session.view(),
        }
    }

    pub async fn get_view(&self) -> PhaseView {
        self.session.read().await.view()
    }

    pub async fn get_standings(&self) -> Vec<TeamScore> {
        self.session.read().await.standings()
    }

    // =========================================================================
    // Setup
    // =========================================================================

    pub async fn select_category(&self, category: Option<String>) -> GameResult<ServerMessage> {
        let mut catalog = self.catalog.write().await;
        let session = self.session.read().await;
        if session.phase() != GamePhase::Setup {
            return Err(GameError::InvalidAction {
                action: "change the category",
                phase: session.phase(),
            });
        }

        catalog.set_active_category(CategoryFilter::from_option(category));
        let msg = ServerMessage::CategoriesChanged {
            categories: catalog.list_categories(),
            active_category: catalog.active_category().as_option(),
        };
        self.broadcast_to_all(msg.clone());
        Ok(msg)
    }

    /// Add one team, or several from comma-separated input. Nothing is added
    /// unless every name is accepted.
    pub async fn add_team(&self, raw: &str) -> GameResult<ServerMessage> {
        let mut session = self.session.write().await;

        match parse_team_list(raw).as_slice() {
            [] => return Err(GameError::validation("Team name must not be empty")),
            [name] => session.add_team(name)?,
            names => {
                let mut next = session.clone();
                for name in names {
                    next.add_team(name)?;
                }
                *session = next;
            }
        }
        Ok(self.teams_changed(&session))
    }

    pub async fn remove_team(&self, name: &str) -> GameResult<ServerMessage> {
        let mut session = self.session.write().await;
        session.remove_team(name)?;
        Ok(self.teams_changed(&session))
    }

    fn teams_changed(&self, session: &GameSession) -> ServerMessage {
        let msg = ServerMessage::TeamsChanged {
            teams: session.teams().to_vec(),
        };
        self.broadcast_to_all(msg.clone());
        msg
    }

    // =========================================================================
    // Game flow
    // =========================================================================

    /// Start a game; uses the setup roster when no team list is given
    pub async fn start_game(&self, teams: Option<Vec<String>>) -> GameResult<ServerMessage> {
        let mut catalog = self.catalog.write().await;
        let mut session = self.session.write().await;

        let teams = teams.unwrap_or_else(|| session.teams().to_vec());
        session.start_game(teams, &mut catalog)?;

        self.broadcast_to_all(ServerMessage::TeamsChanged {
            teams: session.teams().to_vec(),
        });
        self.broadcast_to_all(ServerMessage::Scores {
            scores: session.standings(),
        });
        Ok(self.phase_changed(&session))
    }

    pub async fn ready_for_turn(&self) -> GameResult<ServerMessage> {
        let mut session = self.session.write().await;
        session.ready_for_turn()?;
        Ok(self.phase_changed(&session))
    }

    pub async fn submit_guess(&self, text: &str) -> GameResult<ServerMessage> {
        let mut session = self.session.write().await;
        if let GuessOutcome::RoundComplete { .. } = session.submit_guess(text)? {
            self.broadcast_to_all(ServerMessage::Scores {
                scores: session.standings(),
            });
        }
        Ok(self.phase_changed(&session))
    }

    pub async fn skip(&self) -> GameResult<ServerMessage> {
        let mut catalog = self.catalog.write().await;
        let mut session = self.session.write().await;
        session.skip(&mut catalog)?;
        Ok(self.phase_changed(&session))
    }

    pub async fn next_round(&self) -> GameResult<ServerMessage> {
        let mut catalog = self.catalog.write().await;
        let mut session = self.session.write().await;
        session.next_round(&mut catalog)?;
        Ok(self.phase_changed(&session))
    }

    /// Throw the session away and return to setup
    pub async fn reset_game(&self) -> ServerMessage {
        let mut catalog = self.catalog.write().await;
        let mut session = self.session.write().await;
        session.reset();
        catalog.reset_used();

        self.broadcast_to_all(ServerMessage::TeamsChanged { teams: Vec::new() });
        self.broadcast_to_all(ServerMessage::Scores { scores: Vec::new() });
        self.phase_changed(&session)
    }

    fn phase_changed(&self, session: &GameSession) -> ServerMessage {
        let msg = ServerMessage::Phase {
            view: session.view(),
        };
        self.broadcast_to_all(msg.clone());
        msg
    }
}
