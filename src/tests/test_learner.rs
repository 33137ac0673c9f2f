use ndarray::{array, Array2};

use super::support::{disagreeing_pair, transition, RecordingEstimator};
use crate::error::RlError;
use crate::learner::{Learner, UpdateRule};

#[test]
fn test_terminal_target_is_reward() {
    let (online, target) = disagreeing_pair();
    for rule in [UpdateRule::Dqn, UpdateRule::DoubleDqn] {
        let learner = Learner::new(rule, 0.9).unwrap();
        let t = transition([1.0, 0.0], 2, 5.0, [0.0, 1.0], true);
        assert_eq!(learner.bootstrap(&online, &target, &t).unwrap(), 5.0);
    }
    // terminal transitions never look at s'
    assert_eq!(target.predict_calls(), 0);
    assert_eq!(online.predict_calls(), 0);
}

#[test]
fn test_dqn_uses_target_max() {
    let (online, target) = disagreeing_pair();
    let learner = Learner::new(UpdateRule::Dqn, 0.5).unwrap();

    // target(s' = [1, 0]) = [1, 4, 2] -> max 4
    let t = transition([0.0, 1.0], 0, 1.0, [1.0, 0.0], false);
    let value = learner.bootstrap(&online, &target, &t).unwrap();
    assert_eq!(value, 1.0 + 0.5 * 4.0);

    assert_eq!(online.predict_calls(), 0);
    assert_eq!(target.single_predictions_of(&t.next_state), 1);
}

#[test]
fn test_double_dqn_selects_online_evaluates_target() {
    let (online, target) = disagreeing_pair();
    let learner = Learner::new(UpdateRule::DoubleDqn, 0.5).unwrap();

    // online(s' = [1, 0]) = [3, 1, 0] -> action 0; target(s')[0] = 1
    let t = transition([0.0, 1.0], 0, 1.0, [1.0, 0.0], false);
    let value = learner.bootstrap(&online, &target, &t).unwrap();
    assert_eq!(value, 1.0 + 0.5 * 1.0);
}

#[test]
fn test_double_dqn_calls_each_estimator_once_per_non_terminal_sample() {
    let (mut online, target) = disagreeing_pair();
    let learner = Learner::new(UpdateRule::DoubleDqn, 0.9).unwrap();

    let batch = vec![
        transition([1.0, 0.0], 0, 1.0, [0.0, 1.0], false),
        transition([0.0, 1.0], 1, -1.0, [1.0, 1.0], false),
        transition([1.0, 1.0], 2, 5.0, [2.0, 0.0], true),
    ];
    let refs: Vec<_> = batch.iter().collect();
    learner.step(&mut online, &target, &refs).unwrap();

    for t in &batch[..2] {
        assert_eq!(online.single_predictions_of(&t.next_state), 1);
        assert_eq!(target.single_predictions_of(&t.next_state), 1);
    }
    assert_eq!(online.single_predictions_of(&batch[2].next_state), 0);
    assert_eq!(target.single_predictions_of(&batch[2].next_state), 0);

    // target: one call per non-terminal sample, nothing else
    assert_eq!(target.predict_calls(), 2);
    // online: one batched call for current states + one per non-terminal sample
    assert_eq!(online.predict_calls(), 3);
    assert_eq!(online.name, "online");
    assert_eq!(target.name, "target");
}

#[test]
fn test_rules_disagree_on_same_transition() {
    let (online, target) = disagreeing_pair();
    let t = transition([0.0, 1.0], 1, 0.0, [1.0, 0.0], false);

    let dqn = Learner::new(UpdateRule::Dqn, 1.0).unwrap();
    let ddqn = Learner::new(UpdateRule::DoubleDqn, 1.0).unwrap();
    let single = dqn.bootstrap(&online, &target, &t).unwrap();
    let double = ddqn.bootstrap(&online, &target, &t).unwrap();

    assert_eq!(single, 4.0);
    assert_eq!(double, 1.0);
    assert!(double <= single);
}

#[test]
fn test_target_vector_passes_through_untaken_actions() {
    for rule in [UpdateRule::Dqn, UpdateRule::DoubleDqn] {
        let (mut online, target) = disagreeing_pair();
        let learner = Learner::new(rule, 0.9).unwrap();

        let batch = vec![
            transition([1.0, 0.0], 0, 1.0, [0.0, 1.0], false),
            transition([0.0, 1.0], 2, 3.0, [1.0, 0.0], true),
            transition([1.0, 2.0], 1, -2.0, [2.0, 1.0], false),
        ];
        let refs: Vec<_> = batch.iter().collect();
        let before: Vec<_> = batch.iter().map(|t| t.state.dot(&online.weights)).collect();

        learner.step(&mut online, &target, &refs).unwrap();

        assert_eq!(online.fits.len(), 1);
        let (states, targets) = &online.fits[0];
        assert_eq!(states.nrows(), 3);
        for (i, t) in batch.iter().enumerate() {
            assert_eq!(states.row(i), t.state.view());
            for a in 0..3 {
                if a != t.action {
                    assert_eq!(targets[[i, a]], before[i][a], "rule {:?}, row {}, action {}", rule, i, a);
                }
            }
        }
        // terminal row carries the plain reward
        assert_eq!(targets[[1, 2]], 3.0);
    }
}

#[test]
fn test_step_reports_stats() {
    let (mut online, target) = disagreeing_pair();
    let learner = Learner::new(UpdateRule::Dqn, 0.0).unwrap();
    let batch = vec![
        transition([1.0, 0.0], 0, 2.0, [0.0, 1.0], false),
        transition([0.0, 1.0], 1, 4.0, [1.0, 0.0], true),
    ];
    let refs: Vec<_> = batch.iter().collect();
    let stats = learner.step(&mut online, &target, &refs).unwrap();
    assert_eq!(stats.batch_size, 2);
    // gamma = 0 so targets are the rewards
    assert_eq!(stats.mean_target, 3.0);
}

#[test]
fn test_step_rejects_empty_batch() {
    let (mut online, target) = disagreeing_pair();
    let learner = Learner::new(UpdateRule::Dqn, 0.9).unwrap();
    let result = learner.step(&mut online, &target, &[]);
    assert!(matches!(result, Err(RlError::EmptyBuffer(_))));
    assert!(online.fits.is_empty());
}

#[test]
fn test_malformed_state_is_dimension_mismatch() {
    let (mut online, target) = disagreeing_pair();
    let learner = Learner::new(UpdateRule::Dqn, 0.9).unwrap();
    let mut bad = transition([1.0, 0.0], 0, 1.0, [0.0, 1.0], false);
    bad.next_state = array![1.0, 2.0, 3.0];
    let result = learner.step(&mut online, &target, &[&bad]);
    assert!(matches!(result, Err(RlError::DimensionMismatch { .. })));
    assert!(online.fits.is_empty());
}

#[test]
fn test_out_of_range_action_is_rejected() {
    let (mut online, target) = disagreeing_pair();
    let learner = Learner::new(UpdateRule::DoubleDqn, 0.9).unwrap();
    let bad = transition([1.0, 0.0], 3, 1.0, [0.0, 1.0], false);
    let result = learner.step(&mut online, &target, &[&bad]);
    assert!(matches!(result, Err(RlError::InvalidAction { action: 3, num_actions: 3 })));
}

#[test]
fn test_fit_failure_propagates() {
    let (mut online, target) = disagreeing_pair();
    online.fail_fit.set(true);
    let learner = Learner::new(UpdateRule::Dqn, 0.9).unwrap();
    let t = transition([1.0, 0.0], 0, 1.0, [0.0, 1.0], false);
    assert!(matches!(learner.step(&mut online, &target, &[&t]), Err(RlError::Numerical(_))));
}

#[test]
fn test_mismatched_target_shape_is_rejected() {
    let (mut online, _) = disagreeing_pair();
    let target = RecordingEstimator::new("target", array![[1.0, 0.0], [0.0, 1.0]]);
    let learner = Learner::new(UpdateRule::Dqn, 0.9).unwrap();
    let t = transition([1.0, 0.0], 0, 1.0, [0.0, 1.0], false);
    assert!(matches!(
        learner.step(&mut online, &target, &[&t]),
        Err(RlError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_discount_factor_bounds() {
    assert!(Learner::new(UpdateRule::Dqn, 1.5).is_err());
    assert!(Learner::new(UpdateRule::Dqn, -0.1).is_err());
    let mut learner = Learner::new(UpdateRule::Dqn, 0.0).unwrap();
    assert!(learner.set_discount_factor(1.0).is_ok());
    assert!(learner.set_discount_factor(2.0).is_err());
    assert_eq!(learner.discount_factor(), 1.0);
}

#[test]
fn test_update_rule_tags_and_parsing() {
    assert_eq!(UpdateRule::Dqn.tag(), "dqn");
    assert_eq!(UpdateRule::DoubleDqn.tag(), "ddqn");
    assert_eq!("DDQN".parse::<UpdateRule>().unwrap(), UpdateRule::DoubleDqn);
    assert_eq!("double_dqn".parse::<UpdateRule>().unwrap(), UpdateRule::DoubleDqn);
    assert_eq!("dqn".parse::<UpdateRule>().unwrap(), UpdateRule::Dqn);
    assert!("sarsa".parse::<UpdateRule>().is_err());
}

#[test]
fn test_all_nan_predictions_fail_both_rules() {
    let online = RecordingEstimator::new("online", Array2::from_elem((2, 3), f32::NAN));
    let target = RecordingEstimator::new("target", Array2::from_elem((2, 3), f32::NAN));
    let t = transition([1.0, 0.0], 0, 1.0, [0.0, 1.0], false);

    for rule in [UpdateRule::Dqn, UpdateRule::DoubleDqn] {
        let learner = Learner::new(rule, 0.9).unwrap();
        assert!(
            matches!(learner.bootstrap(&online, &target, &t), Err(RlError::Numerical(_))),
            "rule {:?}",
            rule
        );
    }
}

#[test]
fn test_nan_target_values_abort_the_step() {
    let (mut online, _) = disagreeing_pair();
    let target = RecordingEstimator::new("target", Array2::from_elem((2, 3), f32::NAN));
    let t = transition([1.0, 0.0], 0, 1.0, [0.0, 1.0], false);

    let learner = Learner::new(UpdateRule::Dqn, 0.9).unwrap();
    assert!(matches!(learner.step(&mut online, &target, &[&t]), Err(RlError::Numerical(_))));
    assert!(online.fits.is_empty());
}

#[test]
fn test_dqn_skips_nan_entries_when_taking_the_max() {
    let (online, _) = disagreeing_pair();
    let target = RecordingEstimator::new("target", array![[f32::NAN, 2.0, 1.0], [0.0, 0.0, 0.0]]);
    let learner = Learner::new(UpdateRule::Dqn, 1.0).unwrap();
    let t = transition([0.0, 1.0], 0, 0.5, [1.0, 0.0], false);
    assert_eq!(learner.bootstrap(&online, &target, &t).unwrap(), 2.5);
}
