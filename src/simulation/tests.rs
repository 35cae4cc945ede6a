//! End-to-end tests for simulation runs

#[cfg(test)]
mod simulation_tests {
    use crate::agreement::strategies::AlwaysFlip;
    use crate::agreement::*;
    use crate::config::SimulationConfig;
    use crate::simulation::*;
    use std::sync::Arc;

    // Initialize logger for tests (only once)
    static INIT: std::sync::Once = std::sync::Once::new();

    fn init() {
        INIT.call_once(|| {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("error")),
                )
                .with_test_writer()
                .try_init();
        });
    }

    #[test]
    fn test_four_generals_one_traitor() {
        init();
        let config = SimulationConfig::new(4, 1).with_traitors([3]);
        let mut simulation = Simulation::new(config).unwrap();
        simulation.run_all_rounds().unwrap();
        let decisions = simulation.decisions().unwrap();

        assert_eq!(decisions[&0], Message::Attack);
        assert_eq!(decisions[&1], Message::Attack);
        assert_eq!(decisions[&2], Message::Attack);
    }

    #[test]
    fn test_default_scenario_agrees_with_reference() {
        init();
        let mut simulation = Simulation::new(SimulationConfig::default()).unwrap();
        simulation.run_all_rounds().unwrap();
        let decisions = simulation.decisions().unwrap();

        assert_eq!(decisions, simulation.reference_decisions());
        for id in 1..=4 {
            assert_eq!(decisions[&id], Message::Attack, "general {}", id);
        }
    }

    #[test]
    fn test_invalid_config_is_rejected_before_any_round() {
        init();
        let config = SimulationConfig::new(4, 1).with_traitors([7]);
        match Simulation::new(config) {
            Err(AgreementError::InvalidConfig(e)) => assert_eq!(e.field, "traitors"),
            Err(e) => panic!("Expected configuration error, got {}", e),
            Ok(_) => panic!("Expected configuration error"),
        }

        assert!(matches!(
            Simulation::new(SimulationConfig::new(3, 2)),
            Err(AgreementError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rounds_must_run_in_order() {
        init();
        let mut simulation = Simulation::new(SimulationConfig::new(4, 1)).unwrap();

        assert_eq!(
            simulation.run_round(1).unwrap_err(),
            AgreementError::RoundOutOfOrder {
                expected: 0,
                requested: 1
            }
        );
        assert_eq!(simulation.run_round(0).unwrap(), 3);
        assert_eq!(simulation.run_round(1).unwrap(), 9);
        assert!(simulation.is_complete());
        assert!(simulation.run_round(2).is_err());
    }

    #[test]
    fn test_deciding_before_all_rounds_fails() {
        init();
        let mut simulation = Simulation::new(SimulationConfig::new(4, 1)).unwrap();
        simulation.run_round(0).unwrap();

        assert_eq!(
            simulation.decisions().unwrap_err(),
            AgreementError::RoundsIncomplete {
                completed: 1,
                required: 2
            }
        );
    }

    #[test]
    fn test_tree_is_shared_not_rebuilt() {
        init();
        let simulation = Simulation::new(SimulationConfig::default()).unwrap();
        assert_eq!(**simulation.tree(), PathTree::build(7, 2));
        assert_eq!(simulation.participants().len(), 7);
        assert!(simulation.participant(5).unwrap().is_traitor());
        assert!(!simulation.participant(4).unwrap().is_traitor());
    }

    #[test]
    fn test_custom_strategy() {
        init();
        let config = SimulationConfig::new(4, 1).with_traitors([3]);
        let mut simulation = Simulation::with_strategy(config, Arc::new(AlwaysFlip)).unwrap();
        assert_eq!(simulation.strategy().name(), "Always Flip");
        simulation.run_all_rounds().unwrap();

        let lied = simulation
            .participant(1)
            .unwrap()
            .record(&RelayPath::root().child(3))
            .unwrap();
        assert_eq!(lied.input, Message::Retreat);
        assert_eq!(simulation.decisions().unwrap()[&1], Message::Attack);
    }

    #[tokio::test]
    async fn test_concurrent_rounds_match_sequential() {
        init();
        let config = SimulationConfig::default();

        let mut sequential = Simulation::new(config.clone()).unwrap();
        sequential.run_all_rounds().unwrap();

        let mut concurrent = Simulation::new(config).unwrap();
        concurrent.run_all_rounds_concurrent().await.unwrap();

        assert_eq!(
            sequential.decisions().unwrap(),
            concurrent.decisions().unwrap()
        );
        for (seq, con) in sequential
            .participants()
            .iter()
            .zip(concurrent.participants())
        {
            assert_eq!(seq.ledger().len(), con.ledger().len());
        }
    }

    #[tokio::test]
    async fn test_concurrent_round_order_enforced() {
        init();
        let mut simulation = Simulation::new(SimulationConfig::new(5, 1)).unwrap();
        assert!(simulation.run_round_concurrent(1).await.is_err());
        assert_eq!(simulation.run_round_concurrent(0).await.unwrap(), 4);
        assert_eq!(simulation.run_round_concurrent(1).await.unwrap(), 16);
    }

    #[tokio::test]
    async fn test_runners_produce_identical_outcomes() {
        init();
        let config = SimulationConfig::new(7, 2)
            .with_traitors([2, 5])
            .with_order(Message::Retreat);
        let runners: Vec<Arc<dyn AgreementRunner>> =
            vec![Arc::new(SequentialRunner), Arc::new(ConcurrentRunner)];

        let outcomes: Vec<Outcome> = compare_runners(&config, runners)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].runner, "Sequential");
        assert_eq!(outcomes[1].runner, "Concurrent");
        assert_eq!(outcomes[0].decisions, outcomes[1].decisions);
        assert!(outcomes.iter().all(|o| o.agreement && o.validity));
        assert_eq!(outcomes[0].agreed_order(), Some(Message::Retreat));
    }

    #[tokio::test]
    async fn test_runner_for_follows_config() {
        init();
        let config = SimulationConfig::new(4, 1).with_concurrency(true);
        assert_eq!(runner_for(&config).name(), "Concurrent");
        assert_eq!(
            runner_for(&config.clone().with_concurrency(false)).name(),
            "Sequential"
        );

        let outcome = runner_for(&config).run(&config).await.unwrap();
        assert!(outcome.agreement);
        assert!(outcome.validity);
        assert_eq!(outcome.loyal_lieutenants, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_two_traitors_beyond_tolerance_complete() {
        init();
        let config = SimulationConfig::new(4, 1).with_traitors([1, 3]);
        let outcome = SequentialRunner.run(&config).await.unwrap();

        assert_eq!(outcome.decisions.len(), 4);
        assert_eq!(outcome.decision(0), Some(Message::Attack));
        // One loyal lieutenant agrees with itself
        assert!(outcome.agreement);
    }

    #[tokio::test]
    async fn test_runner_reports_invalid_config() {
        init();
        let config = SimulationConfig::new(4, 1).with_traitors([0]);
        let result = ConcurrentRunner.run(&config).await;
        assert!(matches!(result, Err(AgreementError::InvalidConfig(_))));
    }

    #[test]
    fn test_lenient_policy_runs_clean_simulation_identically() {
        init();
        let strict = SimulationConfig::new(5, 1).with_traitors([2]);
        let lenient = strict.clone().with_fault_policy(FaultPolicy::Lenient);

        let mut a = Simulation::new(strict).unwrap();
        a.run_all_rounds().unwrap();
        let mut b = Simulation::new(lenient).unwrap();
        b.run_all_rounds().unwrap();

        assert_eq!(a.decisions().unwrap(), b.decisions().unwrap());
    }
}
