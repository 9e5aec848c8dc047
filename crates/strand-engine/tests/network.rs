//! A scheduled network recording into a shared log.

use std::sync::Arc;

use proptest::prelude::*;
use strand_core::IdAllocator;
use strand_engine::{Node, Scheduler, SchedulerConfig};
use strand_log::SharedLog;
use strand_model::{InitialState, TransitionModel};
use strand_process::{Observation, ProcessInstance};
use strand_test_utils::{coin, fixed_emission};

#[test]
fn hidden_chain_with_emissions_is_recorded() {
    let ids = IdAllocator::new();
    let log = SharedLog::new(&ids);
    let mut hidden =
        ProcessInstance::finite(coin(Some(21)), |o: &Observation| o.step >= 12, &ids).unwrap();
    let mut emitted = ProcessInstance::dependent(fixed_emission(), &hidden, &ids).unwrap();
    log.open(&mut hidden);
    log.open(&mut emitted);
    let (hidden_id, emitted_id) = (hidden.id(), emitted.id());

    let mut scheduler = Scheduler::new(SchedulerConfig {
        nodes: vec![Node::every_tick(hidden), Node::every_tick(emitted)],
        stop_when_exhausted: true,
    })
    .unwrap();
    let report = scheduler.forward(1_000).unwrap();
    assert_eq!(report.advances, 24);
    assert_eq!(report.ticks, 13);

    let states = log.playback_vec(hidden_id).unwrap();
    let emissions = log.playback_vec(emitted_id).unwrap();
    assert_eq!(states.len(), 12);
    let expected: Vec<usize> = states.iter().map(|&s| if s == 0 { 2 } else { 0 }).collect();
    assert_eq!(emissions, expected);
}

#[test]
fn replicas_of_one_seed_are_deduplicated() {
    let ids = IdAllocator::new();
    let log = SharedLog::new(&ids);
    let model = Arc::new(TransitionModel::random(3, Some(99)).unwrap());
    let nodes: Vec<Node> = (0..4)
        .map(|_| {
            let mut p = ProcessInstance::builder(Arc::clone(&model))
                .build(&ids)
                .unwrap();
            // Same stream seed (the model's); align the random initial pick.
            p.force_next(0).unwrap();
            log.open(&mut p);
            Node::every_tick(p)
        })
        .collect();
    let mut scheduler = Scheduler::new(SchedulerConfig {
        nodes,
        stop_when_exhausted: false,
    })
    .unwrap();
    scheduler.forward(50).unwrap();

    let stats = log.stats();
    assert_eq!(stats.instances, 4);
    assert_eq!(stats.raw_states, 50);
    assert_eq!(stats.ref_states, 150);
    let first = log.playback_vec(scheduler.instances().next().unwrap().id());
    for p in scheduler.instances() {
        assert_eq!(log.playback_vec(p.id()), first);
    }
}

#[test]
fn slow_node_steps_on_its_pattern() {
    let ids = IdAllocator::new();
    let model = Arc::new(
        TransitionModel::new(
            &[[0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]],
            InitialState::Fixed(2),
            None,
        )
        .unwrap(),
    );
    let p = ProcessInstance::endless(model, &ids).unwrap();
    let id = p.id();
    let mut scheduler = Scheduler::new(SchedulerConfig {
        nodes: vec![Node::new(p, vec![false, true, true])],
        stop_when_exhausted: false,
    })
    .unwrap();
    scheduler.forward(6).unwrap();
    let p = scheduler.instance(id).unwrap();
    assert_eq!(p.step(), 4);
    assert_eq!(p.state(), Some(2));
}

proptest! {
    #[test]
    fn periodic_nodes_advance_once_per_period(
        period in 1usize..8,
        offset in 0usize..8,
        ticks in 0u64..64,
    ) {
        let ids = IdAllocator::new();
        let p = ProcessInstance::endless(coin(Some(1)), &ids).unwrap();
        let id = p.id();
        let mut scheduler = Scheduler::new(SchedulerConfig {
            nodes: vec![Node::periodic(p, period, offset)],
            stop_when_exhausted: false,
        })
        .unwrap();
        let report = scheduler.forward(ticks).unwrap();
        let phase = (offset % period) as u64;
        let expected = (0..ticks).filter(|t| t % period as u64 == phase).count();
        prop_assert_eq!(report.advances, expected as u64);
        prop_assert_eq!(scheduler.instance(id).unwrap().step(), expected);
        prop_assert_eq!(scheduler.current_tick(), ticks);
    }
}
