use crate::config::{AgentConfig, RunConfig, TrainerConfig};
use crate::error::RlError;
use crate::learner::UpdateRule;
use crate::schedule::Schedule;

#[test]
fn test_agent_config_defaults() {
    let config = AgentConfig::default();
    assert_eq!(config.learning_rate, 0.001);
    assert_eq!(config.discount_factor, 0.95);
    assert_eq!(config.batch_size, 16);
    assert_eq!(config.memory_size, 100);
    assert_eq!(config.update_rule, UpdateRule::Dqn);
    assert_eq!(config.exploration, Schedule::exponential(0.01, 1.0, 0.001));
    assert!(config.validate().is_ok());
}

#[test]
fn test_agent_config_rejects_invalid_values() {
    let cases = vec![
        ("learning_rate", AgentConfig::default().with_learning_rate(0.0)),
        ("learning_rate", AgentConfig::default().with_learning_rate(f32::NAN)),
        ("discount_factor", AgentConfig::default().with_discount_factor(-0.01)),
        ("discount_factor", AgentConfig::default().with_discount_factor(1.01)),
        ("batch_size", AgentConfig::default().with_batch_size(0)),
        ("memory_size", AgentConfig::default().with_memory_size(0)),
        (
            "exploration.max_rate",
            AgentConfig::default().with_exploration(Schedule::exponential(0.1, 1.5, 0.01)),
        ),
    ];
    for (field, config) in cases {
        match config.validate() {
            Err(RlError::InvalidParameter { name, .. }) => assert_eq!(name, field),
            other => panic!("expected invalid {}, got {:?}", field, other),
        }
    }
}

#[test]
fn test_discount_factor_bounds_are_inclusive() {
    assert!(AgentConfig::default().with_discount_factor(0.0).validate().is_ok());
    assert!(AgentConfig::default().with_discount_factor(1.0).validate().is_ok());
}

#[test]
fn test_trainer_config_validation() {
    assert!(TrainerConfig::default().validate().is_ok());

    let mut config = TrainerConfig::default();
    config.target_sync_interval = Some(0);
    assert!(config.validate().is_err());

    let mut config = TrainerConfig::default();
    config.train_every = 0;
    assert!(config.validate().is_err());

    let mut config = TrainerConfig::default();
    config.model_name.clear();
    assert!(config.validate().is_err());
}

#[test]
fn test_partial_json_fills_defaults() {
    let text = r#"{
        "agent": { "discount_factor": 0.99, "update_rule": "double_dqn" },
        "trainer": { "episodes": 500, "target_sync_interval": 10 }
    }"#;
    let config: RunConfig = serde_json::from_str(text).unwrap();
    assert_eq!(config.agent.discount_factor, 0.99);
    assert_eq!(config.agent.update_rule, UpdateRule::DoubleDqn);
    assert_eq!(config.agent.batch_size, 16);
    assert_eq!(config.trainer.episodes, 500);
    assert_eq!(config.trainer.target_sync_interval, Some(10));
    assert_eq!(config.trainer.max_steps, 200);
    assert_eq!(config.trainer.start_episode, 0);
}

#[test]
fn test_schedule_json_is_tagged() {
    let text = r#"{ "agent": { "exploration": { "kind": "constant", "value": 0.2 } } }"#;
    let config: RunConfig = serde_json::from_str(text).unwrap();
    assert_eq!(config.agent.exploration, Schedule::Constant { value: 0.2 });
}

#[test]
fn test_run_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.json");

    let mut config = RunConfig::default();
    config.agent = config.agent.with_seed(17).with_batch_size(64);
    config.trainer.checkpoint_interval = Some(25);
    config.to_json_file(&path).unwrap();

    let loaded = RunConfig::from_json_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_run_config_file_is_validated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, r#"{ "agent": { "discount_factor": 3.0 } }"#).unwrap();
    assert!(matches!(
        RunConfig::from_json_file(&path),
        Err(RlError::InvalidParameter { .. })
    ));

    std::fs::write(&path, "not json").unwrap();
    assert!(matches!(RunConfig::from_json_file(&path), Err(RlError::Serialization(_))));

    assert!(matches!(
        RunConfig::from_json_file(dir.path().join("missing.json")),
        Err(RlError::Io(_))
    ));
}
