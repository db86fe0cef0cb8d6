//! End-to-end shootouts against a real coordinator on a local port.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use shootout::network::ErrorCode;
use shootout::{
    Agent, AgentConfig, AgentError, AgentOutcome, Coordinator, CoordinatorClient,
    CoordinatorServer, Participant, RoundState, ServerConfig, StaticRosterSource,
};

async fn start_server(participants: Vec<Participant>) -> (Arc<CoordinatorServer>, String) {
    let coordinator = Coordinator::with_seed(StaticRosterSource::new(participants), 42).unwrap();
    let server = Arc::new(CoordinatorServer::new(ServerConfig::default(), Arc::new(coordinator)));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());

    let running = server.clone();
    tokio::spawn(async move { running.serve(listener).await });

    (server, url)
}

fn fast_agent(url: &str) -> Agent {
    Agent::new(AgentConfig {
        server_url: url.to_string(),
        shot_interval: Duration::from_millis(5),
        poll_interval: Duration::from_millis(5),
        retry_backoff: Duration::from_millis(5),
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_two_agents_exactly_one_winner() {
    let (server, url) = start_server(vec![
        Participant::new("Johnny", 30, 10),
        Participant::new("Bill", 30, 15),
    ])
    .await;

    let johnny = fast_agent(&url);
    let bill = fast_agent(&url);
    let (first, second) = tokio::join!(johnny.run(), bill.run());
    let outcomes = [first.unwrap(), second.unwrap()];

    let winners: Vec<_> = outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            AgentOutcome::Won(me) => Some(me.name.clone()),
            AgentOutcome::Lost { .. } => None,
        })
        .collect();
    assert_eq!(winners.len(), 1);

    for outcome in &outcomes {
        if let AgentOutcome::Lost { winner } = outcome {
            assert_eq!(winner.name, winners[0]);
            assert!(winner.alive);
        }
    }

    let client = CoordinatorClient::new(&url);
    let status = client.status().await.unwrap();
    assert_eq!(status.state, RoundState::Concluded);
    assert_eq!(status.round, 2);
    assert_eq!(status.winner.as_deref(), Some(winners[0].as_str()));

    // the reloaded roster starts from full health
    let fresh = client.register().await.unwrap();
    assert_eq!(fresh, Participant::new("Johnny", 30, 10));

    server.shutdown();
}

#[tokio::test]
async fn test_lone_agent_wins() {
    let (server, url) = start_server(vec![Participant::new("Solo", 5, 1)]).await;

    let solo = fast_agent(&url);
    let outcome = solo.run().await.unwrap();
    assert_eq!(outcome, AgentOutcome::Won(Participant::new("Solo", 5, 1)));

    server.shutdown();
}

#[tokio::test]
async fn test_late_agent_finds_registration_closed() {
    let (server, url) = start_server(vec![
        Participant::new("Johnny", 30, 10),
        Participant::new("Bill", 30, 15),
    ])
    .await;

    let client = CoordinatorClient::new(&url);
    client.register().await.unwrap();
    client.register().await.unwrap();
    assert!(client.is_active().await.unwrap());

    let err = client.register().await.unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::RegistrationClosed));

    let late = fast_agent(&url);
    let result = late.run().await;
    assert!(matches!(result, Err(AgentError::RegistrationClosed)));

    server.shutdown();
}
