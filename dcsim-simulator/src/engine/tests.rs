use super::*;
use crate::workload::{ConstantService, ScriptedArrivals};
use dcsim_core::RequestId;
use proptest::prelude::*;
use tracing_test::traced_test;

fn config(servers: usize, policy: &str) -> SimulationConfig {
    SimulationConfig {
        servers,
        arrival_rate: 2.0,
        service_rate: 1.5,
        duration: 50.0,
        step: 1.0,
        policy: policy.into(),
        request_timeout: None,
        seed: Some(42),
    }
}

fn scripted(
    config: &SimulationConfig,
    arrivals: impl IntoIterator<Item = u64>,
    service: SimTime,
) -> SimulationEngine {
    SimulationEngine::with_workload(
        config,
        SimulationRng::from_seed(0),
        Box::new(ScriptedArrivals::new(arrivals)),
        Box::new(ConstantService::new(service)),
    )
    .unwrap()
}

fn ids<'a>(requests: impl IntoIterator<Item = &'a Request>) -> Vec<u64> {
    requests.into_iter().map(|request| request.id().0).collect()
}

#[test]
fn test_construction_builds_servers_in_order() {
    let engine = SimulationEngine::new(&config(3, "least-loaded")).unwrap();
    let server_ids: Vec<ServerId> = engine.servers().iter().map(Server::id).collect();
    assert_eq!(server_ids, vec![ServerId(0), ServerId(1), ServerId(2)]);
    assert_eq!(engine.policy(), DispatchPolicy::LeastLoaded);
    assert_eq!(engine.now(), 0.0);
    assert_eq!(engine.total_ticks(), 50);
    assert!((engine.utilization() - 2.0 / 4.5).abs() < 1e-12);
}

#[test]
fn test_unknown_policy_fails_before_running() {
    let err = SimulationEngine::new(&config(2, "fastest-first"))
        .err()
        .unwrap();
    assert_eq!(err, SimulationError::UnknownPolicy("fastest-first".into()));
    assert!(err.is_configuration());
}

#[test]
fn test_rejects_invalid_parameters() {
    let base = config(2, "cyclic");
    let cases = [
        SimulationConfig {
            servers: 0,
            ..base.clone()
        },
        SimulationConfig {
            step: 0.0,
            ..base.clone()
        },
        SimulationConfig {
            step: -1.0,
            ..base.clone()
        },
        SimulationConfig {
            service_rate: 0.0,
            ..base.clone()
        },
        SimulationConfig {
            arrival_rate: -1.0,
            ..base.clone()
        },
        SimulationConfig {
            duration: -5.0,
            ..base.clone()
        },
        SimulationConfig {
            duration: f64::NAN,
            ..base.clone()
        },
        SimulationConfig {
            request_timeout: Some(-0.1),
            ..base.clone()
        },
    ];
    for case in cases {
        let err = SimulationEngine::new(&case).err().unwrap();
        assert!(
            matches!(err, SimulationError::InvalidParameter { .. }),
            "{case:?} gave {err:?}"
        );
    }
}

#[test]
fn test_tick_count_is_floor_of_duration_over_step() {
    let mut engine = SimulationEngine::new(&SimulationConfig {
        duration: 10.0,
        step: 3.0,
        ..config(1, "cyclic")
    })
    .unwrap();
    assert_eq!(engine.total_ticks(), 3);
    let report = engine.run().unwrap();
    assert_eq!(report.final_time, 9.0);
}

#[test]
fn test_zero_duration_runs_no_ticks() {
    let mut engine = SimulationEngine::new(&SimulationConfig {
        duration: 0.0,
        ..config(2, "cyclic")
    })
    .unwrap();
    let report = engine.run().unwrap();
    assert_eq!(report.final_time, 0.0);
    assert_eq!(report.generated, 0);
}

#[test]
fn test_scenario_zero_arrival_rate() {
    let mut engine = SimulationEngine::new(&SimulationConfig {
        arrival_rate: 0.0,
        ..config(1, "cyclic")
    })
    .unwrap();
    let report = engine.run().unwrap();

    assert_eq!(report.generated, 0);
    assert_eq!(report.completed, 0);
    assert_eq!(report.dropped, 0);
    assert_eq!(report.abandoned, 0);
    assert_eq!(report.drop_rate, 0.0);
    assert_eq!(report.average_response_time, 0.0);
    assert_eq!(engine.metrics().percentile(50.0), 0.0);
    assert_eq!(report.final_time, 50.0);
}

#[test]
fn test_scenario_zero_timeout_evicted_next_tick() {
    let cfg = SimulationConfig {
        request_timeout: Some(0.0),
        ..config(1, "cyclic")
    };
    let mut engine = scripted(&cfg, [1, 1], 10.0);

    // t = 1: the first request arrives and goes straight into service.
    let tick = engine.step().unwrap();
    assert!(tick.dropped.is_empty());
    assert!(engine.servers()[0].is_busy());

    // t = 2: the second request arrives while the server is busy. Its wait
    // is still zero, so it survives this tick's eviction.
    let tick = engine.step().unwrap();
    assert!(tick.dropped.is_empty());
    assert_eq!(engine.servers()[0].queue_length(), 1);

    // t = 3: it has waited 1 > 0 and is dropped.
    let tick = engine.step().unwrap();
    assert_eq!(ids(&tick.dropped), vec![2]);
    assert_eq!(tick.dropped[0].start_time(), None);
    assert_eq!(engine.metrics().dropped(), 1);
    assert_eq!(engine.servers()[0].queue_length(), 0);
}

#[test]
fn test_scenario_cyclic_assignment() {
    let mut engine = scripted(&config(2, "cyclic"), [4], 100.0);
    engine.step().unwrap();

    let first = &engine.servers()[0];
    let second = &engine.servers()[1];
    assert_eq!(first.current().map(Request::id), Some(RequestId(1)));
    assert_eq!(second.current().map(Request::id), Some(RequestId(2)));
    assert_eq!(ids(first.waiting()), vec![3]);
    assert_eq!(ids(second.waiting()), vec![4]);
}

#[test]
fn test_least_loaded_spreads_burst() {
    let mut engine = scripted(&config(3, "least-loaded"), [0, 5], 100.0);
    engine.step().unwrap();
    engine.step().unwrap();

    // Queue lengths at dispatch: [0,0,0] -> 0, [1,0,0] -> 1, [1,1,0] -> 2,
    // [1,1,1] -> 0, [2,1,1] -> 1. Heads then move into service.
    let servers = engine.servers();
    assert_eq!(servers[0].current().map(Request::id), Some(RequestId(1)));
    assert_eq!(servers[1].current().map(Request::id), Some(RequestId(2)));
    assert_eq!(servers[2].current().map(Request::id), Some(RequestId(3)));
    assert_eq!(ids(servers[0].waiting()), vec![4]);
    assert_eq!(ids(servers[1].waiting()), vec![5]);
    assert_eq!(servers[2].queue_length(), 0);
}

#[test]
fn test_scenario_drain_completes_at_final_clock() {
    let cfg = SimulationConfig {
        duration: 3.0,
        ..config(1, "cyclic")
    };
    let mut engine = scripted(&cfg, [1], 10.0);
    let report = engine.run().unwrap();

    assert_eq!(report.final_time, 3.0);
    assert_eq!(report.completed, 1);
    assert_eq!(engine.metrics().response_times(), &[2.0]);
    assert!(!engine.servers()[0].is_busy());
}

#[test]
fn test_drain_abandons_waiting_requests() {
    let cfg = SimulationConfig {
        duration: 2.0,
        ..config(1, "cyclic")
    };
    let mut engine = scripted(&cfg, [3], 10.0);
    let report = engine.run().unwrap();

    assert_eq!(report.generated, 3);
    assert_eq!(report.completed, 1);
    assert_eq!(report.dropped, 0);
    assert_eq!(report.abandoned, 2);
    assert_eq!(report.total_requests(), 1);
    assert_eq!(engine.servers()[0].queue_length(), 2);
}

#[test]
fn test_complete_and_start_next_in_same_tick() {
    let mut engine = scripted(&config(1, "cyclic"), [2], 1.0);
    engine.step().unwrap();
    let tick = engine.step().unwrap();

    assert_eq!(ids(&tick.completed), vec![1]);
    let current = engine.servers()[0].current().unwrap();
    assert_eq!(current.id(), RequestId(2));
    assert_eq!(current.start_time(), Some(2.0));
    assert_eq!(current.wait_time(), Some(1.0));
}

#[test]
fn test_step_stops_at_duration() {
    let cfg = SimulationConfig {
        duration: 3.0,
        ..config(1, "cyclic")
    };
    let mut engine = scripted(&cfg, [1], 100.0);
    for _ in 0..3 {
        engine.step().unwrap();
    }
    let err = engine.step().unwrap_err();
    assert_eq!(err, SimulationError::RunFinished(3.0));
    assert!(!err.is_configuration());
    assert_eq!(engine.now(), 3.0);

    let report = engine.run().unwrap();
    assert_eq!(report.final_time, 3.0);
    assert_eq!(engine.metrics().response_times(), &[2.0]);
}

#[test]
fn test_step_after_run_leaves_state_untouched() {
    let mut engine = scripted(&config(2, "cyclic"), [3, 1], 4.0);
    let report = engine.run().unwrap();
    assert!(matches!(engine.step(), Err(SimulationError::RunFinished(_))));
    assert_eq!(engine.now(), report.final_time);
    assert_eq!(engine.run().unwrap(), report);
}

#[test]
fn test_status_after_drain() {
    let cfg = SimulationConfig {
        duration: 2.0,
        ..config(2, "least-loaded")
    };
    let mut engine = scripted(&cfg, [3], 10.0);
    engine.run().unwrap();

    let status = engine.status();
    let lines: Vec<&str> = status.lines().collect();
    assert_eq!(lines[0], "Dispatcher [least-loaded]");
    assert_eq!(lines[1], "  server-0 (mu=1.5, status=idle, queue_len=1)");
    assert_eq!(lines[2], "  server-1 (mu=1.5, status=idle, queue_len=0)");
}

#[test]
fn test_run_is_idempotent_once_finished() {
    let mut engine = SimulationEngine::new(&config(3, "cyclic")).unwrap();
    let first = engine.run().unwrap();
    assert!(engine.is_finished());
    let second = engine.run().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_same_seed_reproduces_run() {
    let cfg = SimulationConfig {
        request_timeout: Some(5.0),
        arrival_rate: 4.0,
        ..config(3, "least-loaded")
    };
    let mut a = SimulationEngine::new(&cfg).unwrap();
    let mut b = SimulationEngine::new(&cfg).unwrap();
    let report_a = a.run().unwrap();
    let report_b = b.run().unwrap();

    assert_eq!(report_a, report_b);
    assert_eq!(a.metrics().response_times(), b.metrics().response_times());
}

#[test]
fn test_different_seeds_produce_different_fingerprints() {
    let mut a = SimulationEngine::new(&config(3, "cyclic")).unwrap();
    let mut b = SimulationEngine::new(&SimulationConfig {
        seed: Some(43),
        ..config(3, "cyclic")
    })
    .unwrap();
    assert_ne!(a.run().unwrap().fingerprint, b.run().unwrap().fingerprint);
}

#[test]
fn test_unseeded_run_reports_its_seed() {
    let cfg = SimulationConfig {
        seed: None,
        ..config(2, "cyclic")
    };
    let mut original = SimulationEngine::new(&cfg).unwrap();
    let report = original.run().unwrap();

    let mut replay = SimulationEngine::new(&SimulationConfig {
        seed: Some(report.seed),
        ..cfg
    })
    .unwrap();
    assert_eq!(replay.run().unwrap().fingerprint, report.fingerprint);
}

#[test]
fn test_recorder_mirrors_metrics() {
    let recorder = MetricsRecorder::new().unwrap();
    let cfg = SimulationConfig {
        request_timeout: Some(2.0),
        arrival_rate: 5.0,
        ..config(2, "cyclic")
    };
    let mut engine = SimulationEngine::new(&cfg)
        .unwrap()
        .with_recorder(recorder.clone());
    let report = engine.run().unwrap();

    assert_eq!(recorder.arrived.get() as u64, report.generated);
    assert_eq!(recorder.completed.get() as u64, report.completed);
    assert_eq!(recorder.dropped.get() as u64, report.dropped);
    assert_eq!(recorder.response_time.get_sample_count(), report.completed);
}

#[test]
fn test_report_display() {
    let mut engine = SimulationEngine::new(&config(3, "cyclic")).unwrap();
    let text = engine.run().unwrap().to_string();
    assert!(text.contains("Completed requests"));
    assert!(text.contains("Median response time"));
    assert!(text.contains("ρ = 0.4444"));

    let mut idle = SimulationEngine::new(&SimulationConfig {
        arrival_rate: 0.0,
        ..config(1, "cyclic")
    })
    .unwrap();
    let text = idle.run().unwrap().to_string();
    assert!(!text.contains("Median response time"));
}

#[test]
fn test_report_serializes() {
    let mut engine = SimulationEngine::new(&config(2, "least-loaded")).unwrap();
    let yaml = serde_yaml::to_string(&engine.run().unwrap()).unwrap();
    assert!(yaml.contains("policy: least-loaded"));
    assert!(yaml.contains("fingerprint:"));
}

#[traced_test]
#[test]
fn test_run_logs_lifecycle() {
    let mut engine = SimulationEngine::new(&SimulationConfig {
        duration: 5.0,
        ..config(1, "cyclic")
    })
    .unwrap();
    engine.run().unwrap();
    assert!(logs_contain("Starting simulation"));
    assert!(logs_contain("Simulation complete"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_request_lifecycle_invariants(
        seed in any::<u64>(),
        servers in 1usize..5,
        arrival_rate in 0.0f64..6.0,
        timeout in proptest::option::of(0.0f64..8.0),
        least_loaded in any::<bool>(),
    ) {
        let policy = if least_loaded { "least-loaded" } else { "cyclic" };
        let cfg = SimulationConfig {
            servers,
            arrival_rate,
            duration: 40.0,
            request_timeout: timeout,
            seed: Some(seed),
            ..config(servers, policy)
        };
        let mut engine = SimulationEngine::new(&cfg).unwrap();

        while engine.clock.ticks() < engine.total_ticks() {
            let tick = engine.step().unwrap();
            for request in &tick.completed {
                let start = request.start_time().unwrap();
                let completion = request.completion_time().unwrap();
                prop_assert!(request.arrival_time() <= start);
                prop_assert!(start <= completion);
                // Completion snaps forward to a tick, so only float rounding can shave it.
                prop_assert!(request.response_time().unwrap() >= request.service_duration() - 1e-9);
            }
            for request in &tick.dropped {
                prop_assert_eq!(request.start_time(), None);
                prop_assert!(tick.time - request.arrival_time() > request.timeout());
            }
            let metrics = engine.metrics();
            prop_assert!(metrics.completed() + metrics.dropped() <= engine.generated());
            prop_assert_eq!(metrics.response_times().len() as u64, metrics.completed());
        }

        let report = engine.run().unwrap();
        prop_assert_eq!(report.completed + report.dropped + report.abandoned, report.generated);
    }
}
