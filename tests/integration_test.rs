use std::collections::HashSet;
use std::sync::Arc;
use topten::catalog::{AliasPolicy, Catalog};
use topten::protocol::{ClientMessage, ServerMessage};
use topten::state::AppState;
use topten::types::{GamePhase, PhaseView, MAX_ROUNDS};
use topten::ws::handlers::handle_message;

fn sample_catalog() -> Catalog {
    let prompts: Vec<serde_json::Value> = (0..12)
        .map(|i| {
            serde_json::json!({
                "id": format!("list-{}", i),
                "category": if i < 4 { "Geography" } else { "Music" },
                "prompt": format!("Top list number {}", i),
                "fact_label": "Value",
                "fact_unit": "units",
                "answers": [
                    {"name": "Alpha", "fact": 300, "aliases": ["A"]},
                    {"name": "Bravo", "fact": 200.5},
                    {"name": "Charlie", "aliases": ["C", "Chuck"]}
                ]
            })
        })
        .collect();
    Catalog::seeded(
        serde_json::from_value(serde_json::Value::Array(prompts)).unwrap(),
        AliasPolicy::Strict,
        2024,
    )
    .unwrap()
}

async fn send(state: &Arc<AppState>, msg: ClientMessage) -> ServerMessage {
    handle_message(msg, state)
        .await
        .expect("handler should always reply")
}

async fn current_prompt_id(state: &Arc<AppState>) -> String {
    state
        .session
        .read()
        .await
        .current_prompt()
        .map(|p| p.id.clone())
        .expect("prompt should be loaded")
}

/// End-to-end test for a complete game
#[tokio::test]
async fn test_full_game_flow() {
    let state = Arc::new(AppState::new(sample_catalog()));

    // 1. Setup: category and roster
    match send(
        &state,
        ClientMessage::SelectCategory {
            category: Some("Geography".to_string()),
        },
    )
    .await
    {
        ServerMessage::CategoriesChanged {
            categories,
            active_category,
        } => {
            assert_eq!(categories, vec!["Geography", "Music"]);
            assert_eq!(active_category.as_deref(), Some("Geography"));
        }
        other => panic!("Expected CategoriesChanged, got {:?}", other),
    }

    for name in ["Owls", "Foxes", "Bears"] {
        send(
            &state,
            ClientMessage::AddTeam {
                name: name.to_string(),
            },
        )
        .await;
    }

    // 2. Start game with the roster
    match send(&state, ClientMessage::StartGame { teams: None }).await {
        ServerMessage::Phase {
            view: PhaseView::Handoff { team, round_no },
        } => {
            assert_eq!(team, "Owls");
            assert_eq!(round_no, 1);
        }
        other => panic!("Expected Handoff, got {:?}", other),
    }

    let mut seen_prompts = Vec::new();

    // 3. Play all rounds: Owls always hit #3, Foxes #1 via alias, Bears miss
    for round in 1..=MAX_ROUNDS {
        seen_prompts.push(current_prompt_id(&state).await);

        for (team, guess) in [("Owls", "charlie!"), ("Foxes", "a"), ("Bears", "Delta")] {
            match send(&state, ClientMessage::ReadyForTurn).await {
                ServerMessage::Phase {
                    view:
                        PhaseView::Turn {
                            team: turn_team,
                            round_no,
                            max_points,
                            fact_label,
                            ..
                        },
                } => {
                    assert_eq!(turn_team, team);
                    assert_eq!(round_no, round);
                    assert_eq!(max_points, 3);
                    assert_eq!(fact_label, "Value");
                }
                other => panic!("Expected Turn, got {:?}", other),
            }

            let reply = send(
                &state,
                ClientMessage::SubmitGuess {
                    text: guess.to_string(),
                },
            )
            .await;

            if team == "Bears" {
                match reply {
                    ServerMessage::Phase {
                        view:
                            PhaseView::Reveal {
                                results,
                                answers,
                                game_over,
                                ..
                            },
                    } => {
                        assert_eq!(results.len(), 3);
                        assert_eq!(results[0].points, 3);
                        assert_eq!(results[0].rank, Some(3));
                        assert!(results[0].perfect);
                        assert_eq!(results[1].points, 1);
                        assert_eq!(results[2].points, 0);
                        assert_eq!(results[2].rank, None);
                        assert_eq!(results[2].guess, "Delta");

                        assert_eq!(answers[0].fact_text.as_deref(), Some("300 units"));
                        assert_eq!(answers[1].fact_text.as_deref(), Some("200.5 units"));
                        assert_eq!(answers[2].fact_text, None);

                        assert_eq!(game_over, round == MAX_ROUNDS);
                    }
                    other => panic!("Expected Reveal, got {:?}", other),
                }
            } else {
                assert!(matches!(
                    reply,
                    ServerMessage::Phase {
                        view: PhaseView::Handoff { .. }
                    }
                ));
            }
        }

        let reply = send(&state, ClientMessage::NextRound).await;
        if round < MAX_ROUNDS {
            assert!(matches!(
                reply,
                ServerMessage::Phase {
                    view: PhaseView::Handoff { round_no, .. }
                } if round_no == round + 1
            ));
        } else {
            match reply {
                ServerMessage::Phase {
                    view:
                        PhaseView::GameOver {
                            winners,
                            final_scores,
                        },
                } => {
                    assert_eq!(winners, vec!["Owls"]);
                    assert_eq!(final_scores[0].team, "Owls");
                    assert_eq!(final_scores[0].score, 3 * MAX_ROUNDS);
                    assert_eq!(final_scores[1].score, MAX_ROUNDS);
                    assert_eq!(final_scores[2].score, 0);
                }
                other => panic!("Expected GameOver, got {:?}", other),
            }
        }
    }

    // 4. Geography has 4 prompts: each appears once before any repeat
    let first_cycle: HashSet<_> = seen_prompts[..4].iter().cloned().collect();
    assert_eq!(first_cycle.len(), 4);

    // 5. New game returns to setup with a clean session
    match send(&state, ClientMessage::NewGame).await {
        ServerMessage::Phase {
            view: PhaseView::Setup,
        } => {}
        other => panic!("Expected Setup, got {:?}", other),
    }
    let session = state.session.read().await;
    assert_eq!(session.phase(), GamePhase::Setup);
    assert!(session.teams().is_empty());
    assert_eq!(session.completed_rounds(), 0);
}

#[tokio::test]
async fn test_skip_keeps_round_and_scores() {
    let state = Arc::new(AppState::new(sample_catalog()));
    send(
        &state,
        ClientMessage::StartGame {
            teams: Some(vec!["A".to_string(), "B".to_string()]),
        },
    )
    .await;

    let skipped = current_prompt_id(&state).await;
    send(&state, ClientMessage::ReadyForTurn).await;
    send(
        &state,
        ClientMessage::SubmitGuess {
            text: "Alpha".to_string(),
        },
    )
    .await;

    match send(&state, ClientMessage::Skip).await {
        ServerMessage::Phase {
            view: PhaseView::Handoff { team, round_no },
        } => {
            assert_eq!(team, "A");
            assert_eq!(round_no, 1);
        }
        other => panic!("Expected Handoff, got {:?}", other),
    }

    assert_ne!(current_prompt_id(&state).await, skipped);
    assert!(state.catalog.read().await.is_used(&skipped));

    let session = state.session.read().await;
    assert_eq!(session.completed_rounds(), 0);
    assert_eq!(session.score_of("A"), 0);
}

#[tokio::test]
async fn test_out_of_order_actions_rejected() {
    let state = Arc::new(AppState::new(sample_catalog()));

    for msg in [
        ClientMessage::ReadyForTurn,
        ClientMessage::Skip,
        ClientMessage::NextRound,
        ClientMessage::SubmitGuess {
            text: "Alpha".to_string(),
        },
    ] {
        match send(&state, msg).await {
            ServerMessage::Error { code, .. } => assert_eq!(code, "INVALID_ACTION"),
            other => panic!("Expected Error, got {:?}", other),
        }
    }

    assert_eq!(state.get_view().await, PhaseView::Setup);
}

#[tokio::test]
async fn test_start_rejected_for_empty_category() {
    let state = Arc::new(AppState::new(sample_catalog()));
    send(
        &state,
        ClientMessage::SelectCategory {
            category: Some("Cooking".to_string()),
        },
    )
    .await;

    match send(
        &state,
        ClientMessage::StartGame {
            teams: Some(vec!["A".to_string(), "B".to_string()]),
        },
    )
    .await
    {
        ServerMessage::Error { code, .. } => assert_eq!(code, "VALIDATION_FAILED"),
        other => panic!("Expected Error, got {:?}", other),
    }
    assert_eq!(state.get_view().await, PhaseView::Setup);
}

#[tokio::test]
async fn test_clients_receive_broadcasts() {
    let state = Arc::new(AppState::new(sample_catalog()));
    let mut rx = state.broadcast.subscribe();

    send(
        &state,
        ClientMessage::StartGame {
            teams: Some(vec!["A".to_string(), "B".to_string()]),
        },
    )
    .await;

    let mut kinds = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        kinds.push(match msg {
            ServerMessage::TeamsChanged { .. } => "teams",
            ServerMessage::Scores { .. } => "scores",
            ServerMessage::Phase { .. } => "phase",
            _ => "other",
        });
    }
    assert_eq!(kinds, vec!["teams", "scores", "phase"]);
}
