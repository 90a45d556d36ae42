//! WebSocket message dispatch
//!
//! Maps each inbound event to the matching `AppState` call and turns the
//! outcome into the reply for the sending client.

use crate::error::GameResult;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;
use std::sync::Arc;

/// Handle a client message and return the reply for the sender
pub async fn handle_message(msg: ClientMessage, state: &Arc<AppState>) -> Option<ServerMessage> {
    let result = match msg {
        ClientMessage::SelectCategory { category } => {
            tracing::info!("Category selected: {:?}", category);
            state.select_category(category).await
        }

        ClientMessage::AddTeam { name } => {
            tracing::info!("Adding team: {}", name);
            state.add_team(&name).await
        }

        ClientMessage::RemoveTeam { name } => {
            tracing::info!("Removing team: {}", name);
            state.remove_team(&name).await
        }

        ClientMessage::StartGame { teams } => {
            tracing::info!("Starting game");
            state.start_game(teams).await
        }

        ClientMessage::ReadyForTurn => state.ready_for_turn().await,

        ClientMessage::SubmitGuess { text } => state.submit_guess(&text).await,

        ClientMessage::Skip => {
            tracing::info!("Skipping prompt");
            state.skip().await
        }

        ClientMessage::NextRound => state.next_round().await,

        ClientMessage::NewGame => {
            tracing::info!("New game requested");
            Ok(state.reset_game().await)
        }
    };

    Some(reply(result))
}

fn reply(result: GameResult<ServerMessage>) -> ServerMessage {
    match result {
        Ok(msg) => msg,
        Err(e) => {
            tracing::warn!("Action rejected: {}", e);
            ServerMessage::from(&e)
        }
    }
}
