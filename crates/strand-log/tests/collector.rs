//! End-to-end tests: process instances recording into a shared log.

use proptest::prelude::*;
use strand_core::{Emitter, Event, GroupKey, IdAllocator, InstanceId, TapeKey};
use strand_log::{EventLog, LogConfig, SharedLog};
use strand_model::ModelPatch;
use strand_process::{BranchOverrides, Observation, ProcessInstance};
use strand_test_utils::{coin, three_cycle, two_cycle};

#[test]
fn identical_continuations_are_fully_shared() {
    let ids = IdAllocator::new();
    let log = SharedLog::new(&ids);
    let mut parent = ProcessInstance::endless(coin(Some(3)), &ids).unwrap();
    assert!(log.open(&mut parent));
    parent.skip(10).unwrap();
    assert_eq!(log.stats().raw_states, 10);

    let mut child = parent.branch(&BranchOverrides::default()).unwrap();
    assert_eq!(log.stats().raw_states, 10);
    assert_eq!(log.length(child.id()), Some(10));

    parent.skip(5).unwrap();
    child.skip(5).unwrap();
    let stats = log.stats();
    assert_eq!(stats.raw_states, 15);
    assert_eq!(stats.ref_states, 15);
    assert_eq!(log.playback_vec(parent.id()), log.playback_vec(child.id()));
}

#[test]
fn recording_resumes_after_event_dropped_on_busy_log() {
    let ids = IdAllocator::new();
    let log = SharedLog::new(&ids);
    let mut p = ProcessInstance::endless(coin(Some(8)), &ids).unwrap();
    log.open(&mut p);
    p.skip(2).unwrap();
    {
        let _held = log.borrow();
        p.advance().unwrap();
    }
    let later: Vec<usize> = (0..5).map(|_| p.advance().unwrap().unwrap()).collect();

    assert_eq!(log.length(p.id()), Some(7));
    assert_eq!(log.retrieve(p.id(), 2), None);
    for (k, &state) in later.iter().enumerate() {
        assert_eq!(log.retrieve(p.id(), 3 + k), Some(state));
    }
}

#[test]
fn recording_resumes_after_resubscribe() {
    let ids = IdAllocator::new();
    let log = SharedLog::new(&ids);
    let mut p = ProcessInstance::endless(coin(Some(8)), &ids).unwrap();
    log.open(&mut p);
    p.skip(2).unwrap();
    p.unbind(log.id());
    p.skip(1).unwrap();
    assert_eq!(log.length(p.id()), Some(2));

    assert!(log.open(&mut p));
    let later: Vec<usize> = (0..5).map(|_| p.advance().unwrap().unwrap()).collect();
    assert_eq!(log.length(p.id()), Some(7));
    assert_eq!(log.first_step(p.id()), Some(0));
    assert_eq!(log.retrieve(p.id(), 2), None);
    assert_eq!(log.playback_vec(p.id()).unwrap()[2..], later[..]);
}

#[test]
fn divergent_branch_keeps_prefix() {
    let ids = IdAllocator::new();
    let log = SharedLog::new(&ids);
    let mut parent = ProcessInstance::endless(two_cycle(Some(1)), &ids).unwrap();
    log.open(&mut parent);
    parent.skip(4).unwrap();

    let sticky = ModelPatch::new().matrix(vec![vec![1.0, 0.0], vec![1.0, 0.0]]);
    let mut child = parent.branch(&BranchOverrides::model(sticky)).unwrap();
    assert_eq!(child.group(), parent.group());
    child.skip(3).unwrap();
    parent.skip(3).unwrap();

    assert_eq!(
        log.playback_vec(child.id()).unwrap(),
        vec![0, 1, 0, 1, 0, 0, 0]
    );
    assert_eq!(
        log.playback_vec(parent.id()).unwrap(),
        vec![0, 1, 0, 1, 0, 1, 0]
    );
    // The parent agrees with the branch at steps 4 and 6 and references it there.
    assert_eq!(log.stats().raw_states, 8);
}

#[test]
fn branch_with_new_seed_records_under_new_group() {
    let ids = IdAllocator::new();
    let log = SharedLog::new(&ids);
    let mut parent = ProcessInstance::endless(two_cycle(Some(1)), &ids).unwrap();
    log.open(&mut parent);
    parent.skip(2).unwrap();
    let mut child = parent
        .branch(&BranchOverrides::model(ModelPatch::new().seed(2)))
        .unwrap();
    child.skip(2).unwrap();
    let log = log.borrow();
    assert_eq!(log.group_of(child.id()), Some(GroupKey::Seeded(2)));
    assert_eq!(log.first_step(child.id()), Some(2));
    assert_eq!(log.retrieve(child.id(), 3), Some(1));
    assert_eq!(log.retrieve(child.id(), 0), None);
}

#[test]
fn closing_unsubscribes_on_next_emit() {
    let ids = IdAllocator::new();
    let log = SharedLog::new(&ids);
    let mut p = ProcessInstance::endless(three_cycle(None), &ids).unwrap();
    log.open(&mut p);
    p.skip(2).unwrap();
    log.close();
    p.skip(2).unwrap();
    assert_eq!(p.bound_sink_count(), 0);
    assert_eq!(log.length(p.id()), Some(2));
    let mut q = ProcessInstance::endless(three_cycle(None), &ids).unwrap();
    assert!(!log.open(&mut q));
}

#[test]
fn dropped_log_unsubscribes() {
    let ids = IdAllocator::new();
    let mut p = ProcessInstance::endless(three_cycle(None), &ids).unwrap();
    {
        let log = SharedLog::new(&ids);
        log.open(&mut p);
        p.advance().unwrap();
        assert_eq!(log.length(p.id()), Some(1));
    }
    p.advance().unwrap();
    assert_eq!(p.bound_sink_count(), 0);
}

#[test]
fn finite_playback_feeds_fit() {
    let ids = IdAllocator::new();
    let log = SharedLog::new(&ids);
    let mut p =
        ProcessInstance::finite(three_cycle(Some(6)), |o: &Observation| o.step >= 9, &ids)
            .unwrap();
    log.open(&mut p);
    p.take_all().unwrap();
    let seq = log.playback_vec(p.id()).unwrap();
    assert_eq!(seq.len(), 9);
    let fitted = p
        .model()
        .fit(seq.windows(2).map(|w| (w[0], w[1])), Default::default())
        .unwrap();
    assert_eq!(fitted.to_rows(), p.model().to_rows());
}

#[test]
fn two_logs_record_independently() {
    let ids = IdAllocator::new();
    let deduped = SharedLog::new(&ids);
    let plain = SharedLog::with_config(&ids, LogConfig { deduplicate: false });
    let mut a = ProcessInstance::endless(two_cycle(Some(2)), &ids).unwrap();
    let mut b = ProcessInstance::endless(two_cycle(Some(2)), &ids).unwrap();
    for log in [&deduped, &plain] {
        log.open(&mut a);
        log.open(&mut b);
    }
    a.skip(6).unwrap();
    b.skip(6).unwrap();
    assert_ne!(deduped.id(), plain.id());
    assert_eq!(deduped.stats().raw_states, 6);
    assert_eq!(plain.stats().raw_states, 12);
    assert_eq!(deduped.playback_vec(b.id()), plain.playback_vec(b.id()));
}

fn replay(log: &EventLog, instance: InstanceId) -> Vec<usize> {
    log.playback(instance).map(Iterator::collect).unwrap_or_default()
}

proptest! {
    #[test]
    fn retrieve_playback_and_count_agree(
        seqs in proptest::collection::vec(proptest::collection::vec(0usize..3, 1..24), 1..5),
        seeded in any::<bool>(),
        branch_at in 0usize..24,
    ) {
        let group = if seeded { GroupKey::Seeded(5) } else { GroupKey::Unseeded };
        let mut log = EventLog::new(IdAllocator::new().next_log(), LogConfig::default());
        let longest = seqs.iter().map(Vec::len).max().unwrap_or(0);
        for step in 0..longest {
            for (i, seq) in seqs.iter().enumerate() {
                if let Some(&state) = seq.get(step) {
                    let e = Event { group, instance: InstanceId(i as u64), step, state };
                    prop_assert!(log.put(e));
                }
            }
        }

        // A branch of instance 0 that continues with its own states.
        let branch = InstanceId(100);
        let src = &seqs[0];
        prop_assert!(log.redirect(TapeKey::new(group, InstanceId(0)), TapeKey::new(group, branch)));
        let mut expected_branch = src.clone();
        for k in 0..branch_at.min(8) {
            let state = (k + branch_at) % 3;
            let step = src.len() + k;
            let e = Event { group, instance: branch, step, state };
            prop_assert!(log.put(e));
            expected_branch.push(state);
        }

        let mut all: Vec<(InstanceId, Vec<usize>)> = seqs
            .iter()
            .enumerate()
            .map(|(i, s)| (InstanceId(i as u64), s.clone()))
            .collect();
        all.push((branch, expected_branch));

        for (id, expected) in &all {
            let played = replay(&log, *id);
            prop_assert_eq!(&played, expected);
            let len = log.length(*id).unwrap();
            prop_assert_eq!(len, expected.len());
            for (s, &state) in played.iter().enumerate() {
                prop_assert_eq!(log.retrieve(*id, s), Some(state));
            }
            prop_assert_eq!(log.retrieve(*id, len), None);
            let ones = log.count(*id, &[1], None).unwrap();
            prop_assert_eq!(ones.values().sum::<usize>(), len);
        }

        let stats = log.stats();
        let raw_expected: usize = seqs.iter().map(Vec::len).sum::<usize>() + branch_at.min(8);
        if seeded {
            prop_assert!(stats.raw_states <= raw_expected);
        } else {
            prop_assert_eq!(stats.raw_states, raw_expected);
        }
    }
}
