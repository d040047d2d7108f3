use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, info};

use surety_common::{
    config::LateResponsePolicy,
    env::{request::RequestKey, response::StatusResponse},
    Address, Result, StatusCode, SuretyError,
};

use super::registry::OracleRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RoundState {
    Open,
    Finalized(StatusCode),
}

/// Outcome of an accepted response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Counted; `count` responders now agree on `status`.
    Tallied { status: StatusCode, count: usize },
    /// This response pushed `status` to quorum.
    Finalized(StatusCode),
    /// The key was already final; the response is kept for audit only.
    RecordedLate { finalized: StatusCode },
}

/// Responses received for a single request key.
#[derive(Debug, Clone)]
pub struct ResponseRound {
    pub requester: Address,
    pub state: RoundState,
    tallies: BTreeMap<StatusCode, Vec<Address>>,
    responders: HashSet<Address>,
    late: Vec<StatusResponse>,
}

impl ResponseRound {
    fn new(requester: Address) -> Self {
        Self {
            requester,
            state: RoundState::Open,
            tallies: BTreeMap::new(),
            responders: HashSet::new(),
            late: Vec::new(),
        }
    }

    pub fn voters_for(&self, status: StatusCode) -> &[Address] {
        self.tallies.get(&status).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Tallies oracle responses per request key and finalizes each key once.
#[derive(Debug, Clone)]
pub struct ConsensusAggregator {
    min_responses: usize,
    late_policy: LateResponsePolicy,
    rounds: HashMap<RequestKey, ResponseRound>,
}

impl ConsensusAggregator {
    pub fn new(min_responses: usize, late_policy: LateResponsePolicy) -> Self {
        Self {
            min_responses: min_responses.max(1),
            late_policy,
            rounds: HashMap::new(),
        }
    }

    pub fn open(&mut self, key: RequestKey, requester: Address) -> Result<()> {
        if self.rounds.contains_key(&key) {
            return Err(SuretyError::AlreadyRegistered(format!("request {key}")));
        }
        self.rounds.insert(key, ResponseRound::new(requester));
        info!(target: "consensus", "EVENT:OPEN_REQUEST key={} requester={}", key, requester);
        Ok(())
    }

    pub fn contains(&self, key: &RequestKey) -> bool {
        self.rounds.contains_key(key)
    }

    pub fn round(&self, key: &RequestKey) -> Option<&ResponseRound> {
        self.rounds.get(key)
    }

    pub fn state(&self, key: &RequestKey) -> Option<RoundState> {
        self.rounds.get(key).map(|r| r.state)
    }

    pub fn status_of(&self, key: &RequestKey) -> Option<StatusCode> {
        match self.state(key)? {
            RoundState::Finalized(status) => Some(status),
            RoundState::Open => None,
        }
    }

    pub fn tally(&self, key: &RequestKey, status: StatusCode) -> usize {
        self.rounds
            .get(key)
            .map(|r| r.voters_for(status).len())
            .unwrap_or(0)
    }

    pub fn late_responses(&self, key: &RequestKey) -> &[StatusResponse] {
        self.rounds.get(key).map(|r| r.late.as_slice()).unwrap_or(&[])
    }

    /// Checks that `response` would be accepted, without touching any tally.
    pub fn check(&self, registry: &OracleRegistry, response: &StatusResponse) -> Result<()> {
        let indexes = registry.indexes_of(&response.oracle)?;
        if !indexes.contains(&response.index) {
            return Err(SuretyError::UnauthorizedOracle {
                oracle: response.oracle,
                index: response.index,
            });
        }

        let key = response.key();
        let round = self
            .rounds
            .get(&key)
            .ok_or_else(|| SuretyError::UnknownRequest(key.to_string()))?;

        if round.responders.contains(&response.oracle) {
            return Err(SuretyError::DuplicateResponse {
                oracle: response.oracle,
                key: key.to_string(),
            });
        }

        if let (RoundState::Finalized(_), LateResponsePolicy::Reject) = (round.state, self.late_policy) {
            return Err(SuretyError::RequestClosed(key.to_string()));
        }
        Ok(())
    }

    pub fn submit_response(
        &mut self,
        registry: &OracleRegistry,
        response: &StatusResponse,
    ) -> Result<Submission> {
        self.check(registry, response)?;

        let key = response.key();
        let min_responses = self.min_responses;
        let round = self
            .rounds
            .get_mut(&key)
            .ok_or_else(|| SuretyError::UnknownRequest(key.to_string()))?;
        round.responders.insert(response.oracle);

        if let RoundState::Finalized(finalized) = round.state {
            round.late.push(response.clone());
            debug!(
                "🕰️ Late response from {} on {} ({} kept, {} final)",
                response.oracle, key, response.status, finalized
            );
            return Ok(Submission::RecordedLate { finalized });
        }

        let voters = round.tallies.entry(response.status).or_default();
        voters.push(response.oracle);
        let count = voters.len();

        info!(
            target: "consensus",
            "EVENT:ORACLE_REPORT key={} oracle={} status={} count={}",
            key, response.oracle, response.status, count
        );

        if count >= min_responses {
            round.state = RoundState::Finalized(response.status);
            info!(target: "consensus", "EVENT:FINALIZE key={} status={}", key, response.status);
            info!("✅ Status {} finalized for {}", response.status, key);
            return Ok(Submission::Finalized(response.status));
        }

        Ok(Submission::Tallied { status: response.status, count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::assigner::IndexAssigner;
    use proptest::prelude::*;
    use surety_common::FlightCode;

    struct Fixture {
        registry: OracleRegistry,
        index: u8,
        holders: Vec<Address>,
        outsider: Address,
    }

    /// 40 oracles; picks the most shared index so there are plenty of eligible responders.
    fn fixture() -> Fixture {
        let mut registry = OracleRegistry::new(IndexAssigner::new(10, 2024).unwrap());
        for i in 0..40 {
            registry.register(Address::derive(&format!("oracle-{i}"))).unwrap();
        }
        let index = (0..10u8).max_by_key(|i| registry.holders(*i).len()).unwrap();
        let holders: Vec<Address> = registry.holders(index).into_iter().collect();
        let outsider = (0..40)
            .map(|i| Address::derive(&format!("oracle-{i}")))
            .find(|a| !holders.contains(a))
            .unwrap();
        Fixture { registry, index, holders, outsider }
    }

    fn key(index: u8, flight: &str) -> RequestKey {
        RequestKey::new(index, Address::derive("airline-0"), FlightCode::new(flight).unwrap(), 1_700_000_000)
    }

    fn aggregator() -> ConsensusAggregator {
        ConsensusAggregator::new(3, LateResponsePolicy::AcceptAndIgnore)
    }

    #[test]
    fn test_third_matching_response_finalizes() {
        let fx = fixture();
        let mut agg = aggregator();
        let k = key(fx.index, "UA3716");
        agg.open(k, Address::derive("passenger")).unwrap();

        let mut outcomes = Vec::new();
        for oracle in &fx.holders[..3] {
            let r = StatusResponse::new(*oracle, &k, StatusCode::LateAirline);
            outcomes.push(agg.submit_response(&fx.registry, &r).unwrap());
        }

        assert_eq!(outcomes[0], Submission::Tallied { status: StatusCode::LateAirline, count: 1 });
        assert_eq!(outcomes[1], Submission::Tallied { status: StatusCode::LateAirline, count: 2 });
        assert_eq!(outcomes[2], Submission::Finalized(StatusCode::LateAirline));
        assert_eq!(agg.status_of(&k), Some(StatusCode::LateAirline));
    }

    #[test]
    fn test_split_votes_do_not_finalize() {
        let fx = fixture();
        let mut agg = aggregator();
        let k = key(fx.index, "UA3716");
        agg.open(k, Address::derive("passenger")).unwrap();

        let statuses = [StatusCode::OnTime, StatusCode::LateWeather, StatusCode::OnTime, StatusCode::LateWeather];
        for (oracle, status) in fx.holders.iter().zip(statuses) {
            agg.submit_response(&fx.registry, &StatusResponse::new(*oracle, &k, status)).unwrap();
        }
        assert_eq!(agg.state(&k), Some(RoundState::Open));
        assert_eq!(agg.tally(&k, StatusCode::OnTime), 2);
        assert_eq!(agg.tally(&k, StatusCode::LateWeather), 2);
    }

    #[test]
    fn test_wrong_index_is_unauthorized_and_not_counted() {
        let fx = fixture();
        let mut agg = aggregator();
        let k = key(fx.index, "UA3716");
        agg.open(k, Address::derive("passenger")).unwrap();

        let r = StatusResponse::new(fx.outsider, &k, StatusCode::LateAirline);
        let err = agg.submit_response(&fx.registry, &r).unwrap_err();
        assert!(matches!(err, SuretyError::UnauthorizedOracle { index, .. } if index == fx.index));
        assert_eq!(agg.tally(&k, StatusCode::LateAirline), 0);
    }

    #[test]
    fn test_unregistered_and_unknown_request() {
        let fx = fixture();
        let mut agg = aggregator();
        let k = key(fx.index, "UA3716");

        let stranger = StatusResponse::new(Address::derive("stranger"), &k, StatusCode::OnTime);
        assert!(matches!(
            agg.submit_response(&fx.registry, &stranger),
            Err(SuretyError::NotRegistered(_))
        ));

        let r = StatusResponse::new(fx.holders[0], &k, StatusCode::OnTime);
        assert!(matches!(agg.submit_response(&fx.registry, &r), Err(SuretyError::UnknownRequest(_))));
    }

    #[test]
    fn test_one_voice_per_oracle() {
        let fx = fixture();
        let mut agg = aggregator();
        let k = key(fx.index, "UA3716");
        agg.open(k, Address::derive("passenger")).unwrap();

        let r = StatusResponse::new(fx.holders[0], &k, StatusCode::LateAirline);
        agg.submit_response(&fx.registry, &r).unwrap();
        for _ in 0..3 {
            assert!(matches!(
                agg.submit_response(&fx.registry, &r),
                Err(SuretyError::DuplicateResponse { .. })
            ));
        }
        assert_eq!(agg.state(&k), Some(RoundState::Open));
    }

    #[test]
    fn test_late_response_recorded_but_ignored() {
        let fx = fixture();
        let mut agg = aggregator();
        let k = key(fx.index, "UA3716");
        agg.open(k, Address::derive("passenger")).unwrap();

        for oracle in &fx.holders[..3] {
            agg.submit_response(&fx.registry, &StatusResponse::new(*oracle, &k, StatusCode::OnTime)).unwrap();
        }
        let late = StatusResponse::new(fx.holders[3], &k, StatusCode::LateAirline);
        let outcome = agg.submit_response(&fx.registry, &late).unwrap();

        assert_eq!(outcome, Submission::RecordedLate { finalized: StatusCode::OnTime });
        assert_eq!(agg.status_of(&k), Some(StatusCode::OnTime));
        assert_eq!(agg.late_responses(&k), &[late]);
        assert_eq!(agg.tally(&k, StatusCode::LateAirline), 0);
    }

    #[test]
    fn test_late_response_rejected_under_strict_policy() {
        let fx = fixture();
        let mut agg = ConsensusAggregator::new(3, LateResponsePolicy::Reject);
        let k = key(fx.index, "UA3716");
        agg.open(k, Address::derive("passenger")).unwrap();

        for oracle in &fx.holders[..3] {
            agg.submit_response(&fx.registry, &StatusResponse::new(*oracle, &k, StatusCode::OnTime)).unwrap();
        }
        let late = StatusResponse::new(fx.holders[3], &k, StatusCode::OnTime);
        assert!(matches!(agg.submit_response(&fx.registry, &late), Err(SuretyError::RequestClosed(_))));
        assert!(agg.late_responses(&k).is_empty());
    }

    #[test]
    fn test_open_twice_fails() {
        let mut agg = aggregator();
        let k = key(0, "UA3716");
        agg.open(k, Address::derive("a")).unwrap();
        assert!(agg.open(k, Address::derive("b")).is_err());
        assert_eq!(agg.round(&k).unwrap().requester, Address::derive("a"));
    }

    /// Walks `responses` in order and returns the first status to collect `quorum` votes.
    fn first_to_quorum(responses: &[StatusCode], quorum: usize) -> Option<StatusCode> {
        let mut counts: HashMap<StatusCode, usize> = HashMap::new();
        for status in responses {
            let c = counts.entry(*status).or_default();
            *c += 1;
            if *c >= quorum {
                return Some(*status);
            }
        }
        None
    }

    fn status_strategy() -> impl Strategy<Value = StatusCode> {
        prop::sample::select(StatusCode::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_first_code_to_quorum_wins(
            statuses in prop::collection::vec(status_strategy(), 1..10),
            other in prop::collection::vec(status_strategy(), 1..10),
            interleave in prop::collection::vec(any::<bool>(), 20),
        ) {
            let fx = fixture();
            prop_assume!(fx.holders.len() >= 10);

            let mut agg = aggregator();
            let a = key(fx.index, "UA3716");
            let b = key(fx.index, "ND1309");
            agg.open(a, Address::derive("p1")).unwrap();
            agg.open(b, Address::derive("p2")).unwrap();

            let mut queue_a = statuses.iter().enumerate().peekable();
            let mut queue_b = other.iter().enumerate().peekable();
            let mut flips = interleave.iter().cycle();

            while queue_a.peek().is_some() || queue_b.peek().is_some() {
                let take_a = match (queue_a.peek(), queue_b.peek()) {
                    (Some(_), None) => true,
                    (None, Some(_)) => false,
                    _ => *flips.next().unwrap_or(&true),
                };
                let (k, (i, status)) = if take_a {
                    (a, queue_a.next().unwrap())
                } else {
                    (b, queue_b.next().unwrap())
                };
                let r = StatusResponse::new(fx.holders[i], &k, *status);
                agg.submit_response(&fx.registry, &r).unwrap();
            }

            prop_assert_eq!(agg.status_of(&a), first_to_quorum(&statuses, 3));
            prop_assert_eq!(agg.status_of(&b), first_to_quorum(&other, 3));
        }
    }
}
