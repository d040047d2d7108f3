use std::{collections::HashMap, sync::Arc};

use tokio::time::Duration;

use surety_common::{
    config::ProtocolConfig, env::events::LedgerEvent, ether, Address, FlightCode, StatusCode,
};
use surety_node::{
    build_runtime,
    config::{FlightPlan, NodeConfig, SimulationConfig},
    runtime::{
        builder::policy_from_config,
        dispatcher::{await_finalization, JobStatus, StatusQuery},
        status_policy::{FixedStatus, RandomStatus},
    },
    scenario::{payout_ratio_permille, run_scenario},
    NodeError,
};

/// Index space of three: every oracle holds every index, so any request has
/// all oracles eligible.
fn dense_config(oracles: u32) -> NodeConfig {
    NodeConfig {
        protocol: ProtocolConfig { index_space: 3, ..Default::default() },
        simulation: SimulationConfig {
            oracle_count: oracles,
            finalization_timeout_ms: 3_000,
            ..Default::default()
        },
    }
}

#[tokio::test]
async fn test_airline_delay_pays_every_passenger() {
    let config = dense_config(7);
    let runtime = build_runtime(&config, Arc::new(FixedStatus(StatusCode::LateAirline))).await.unwrap();

    let report = run_scenario(&runtime, &config).await.unwrap();

    assert_eq!(report.oracles, 7);
    assert_eq!(report.registered_airlines, 6);
    assert!(report.flights.iter().all(|f| f.status == Some(StatusCode::LateAirline)));
    assert_eq!(report.passengers.len(), 3);
    for p in &report.passengers {
        assert_eq!(p.premium, ether(1));
        assert_eq!(p.withdrawn, ether(3) / 2);
        assert_eq!(runtime.gateway.balance_of(&p.passenger).await, ether(3) / 2);
    }
    assert_eq!(payout_ratio_permille(&report), 1500);

    runtime.shutdown().await;
}

#[tokio::test]
async fn test_on_time_flights_pay_nothing() {
    let config = dense_config(5);
    let runtime = build_runtime(&config, Arc::new(FixedStatus(StatusCode::OnTime))).await.unwrap();

    let report = run_scenario(&runtime, &config).await.unwrap();

    assert!(report.flights.iter().all(|f| f.status == Some(StatusCode::OnTime)));
    assert!(report.passengers.iter().all(|p| p.withdrawn == 0));
    assert_eq!(payout_ratio_permille(&report), 0);

    runtime.shutdown().await;
}

#[tokio::test]
async fn test_random_statuses_still_reach_consensus() {
    let mut config = dense_config(6);
    config.simulation.flights = (0..4)
        .map(|i| FlightPlan { code: format!("SR{i:04}"), timestamp: 1_700_000_000 + i })
        .collect();
    let runtime = build_runtime(&config, Arc::new(RandomStatus::new(11))).await.unwrap();

    let report = run_scenario(&runtime, &config).await.unwrap();

    assert_eq!(report.flights.len(), 4);
    for flight in &report.flights {
        let status = flight.status.expect("honest oracles agree on one code");
        let code = FlightCode::new(&flight.code).unwrap();
        assert_eq!(runtime.ledger.flight(&code).await.unwrap().status, status);
    }

    runtime.shutdown().await;
}

#[tokio::test]
async fn test_dispatcher_tracks_jobs() {
    let config = dense_config(3);
    let runtime = build_runtime(&config, Arc::new(FixedStatus(StatusCode::LateWeather))).await.unwrap();
    let query = StatusQuery {
        requester: Address::derive("passenger-0"),
        airline: runtime.genesis_airline,
        flight: FlightCode::new("UA3716").unwrap(),
        timestamp: 1,
    };

    let mut events = runtime.ledger.subscribe();
    let id = runtime.dispatcher.enqueue(query.clone()).await.unwrap();
    let key = runtime.dispatcher.wait_for(id, Duration::from_secs(2)).await.unwrap();
    assert_eq!(runtime.dispatcher.job(&id).await.unwrap().status, JobStatus::Submitted(key));

    let status = await_finalization(&runtime.ledger, &mut events, key, Duration::from_secs(3)).await.unwrap();
    assert_eq!(status, StatusCode::LateWeather);

    // Paused ledger: the job is recorded as failed.
    runtime.ledger.set_operating_status(runtime.admin, false).await.unwrap();
    let id = runtime.dispatcher.enqueue(query).await.unwrap();
    assert!(matches!(
        runtime.dispatcher.wait_for(id, Duration::from_secs(2)).await,
        Err(NodeError::Dispatch(_))
    ));
    assert!(matches!(runtime.dispatcher.job(&id).await.unwrap().status, JobStatus::Failed(_)));
    assert!(runtime.dispatcher.list_pending_jobs().await.is_empty());
    assert_eq!(runtime.dispatcher.list_jobs().await.len(), 2);

    runtime.shutdown().await;
}

#[tokio::test]
async fn test_finalization_times_out_without_quorum() {
    let config = dense_config(2);
    let runtime = build_runtime(&config, Arc::new(FixedStatus(StatusCode::LateAirline))).await.unwrap();

    let mut events = runtime.ledger.subscribe();
    let key = runtime
        .ledger
        .request_status(runtime.admin, runtime.genesis_airline, FlightCode::new("UA3716").unwrap(), 1)
        .await
        .unwrap();

    let err = await_finalization(&runtime.ledger, &mut events, key, Duration::from_millis(300))
        .await
        .unwrap_err();
    assert!(matches!(err, NodeError::Timeout { .. }));
    assert_eq!(runtime.ledger.response_tally(&key, StatusCode::LateAirline).await, 2);

    runtime.shutdown().await;
}

#[tokio::test]
async fn test_silent_oracles_leave_request_open() {
    let mut config = dense_config(5);
    config.simulation.drop_rate = 1.0;
    config.simulation.finalization_timeout_ms = 300;
    let runtime = build_runtime(&config, Arc::new(FixedStatus(StatusCode::LateAirline))).await.unwrap();

    let report = run_scenario(&runtime, &config).await.unwrap();
    assert!(report.flights.iter().all(|f| f.status.is_none()));
    assert!(report.passengers.iter().all(|p| p.withdrawn == 0));

    runtime.shutdown().await;
}

#[tokio::test]
async fn test_disagreeing_oracles_settle_on_first_quorum() {
    // 21 answers over six codes: some code always collects three.
    let mut config = dense_config(21);
    config.simulation.independent_oracles = true;
    config.simulation.flights = (0..4)
        .map(|i| FlightPlan { code: format!("IR{i:04}"), timestamp: 1_700_000_000 + i })
        .collect();
    let runtime = build_runtime(&config, policy_from_config(&config).unwrap()).await.unwrap();

    let report = run_scenario(&runtime, &config).await.unwrap();
    assert!(report.flights.iter().all(|f| f.status.is_some()));

    let mut reports: HashMap<_, Vec<StatusCode>> = HashMap::new();
    let mut finalized = Vec::new();
    for record in runtime.ledger.events_since(0).await {
        match record.event {
            LedgerEvent::OracleReport { key, status, .. } => reports.entry(key).or_default().push(status),
            LedgerEvent::FlightStatusInfo { key, status } => finalized.push((key, status)),
            _ => {}
        }
    }
    assert_eq!(finalized.len(), 4);

    let mut disagreement = false;
    for (key, status) in finalized {
        let answers = &reports[&key];
        let count = |code: StatusCode| answers.iter().filter(|s| **s == code).count();
        assert_eq!(count(status), 3);
        assert!(StatusCode::ALL.into_iter().filter(|c| *c != status).all(|c| count(c) < 3));
        disagreement |= answers.iter().any(|s| *s != status);

        let flight = runtime.ledger.flight(&key.flight).await.unwrap();
        assert_eq!(flight.status, status);
    }
    assert!(disagreement);

    runtime.shutdown().await;
}
