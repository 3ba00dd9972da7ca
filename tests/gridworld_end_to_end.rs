mod common;

use common::small_grid;
use tdlab::{
    envs::{Direction, GridPosition, GridWorldConfig, render_policy},
    pipeline::{
        EvaluationConfig, Evaluator, ExperimentConfig, SnapshotPeriod, TrainingConfig,
        TrainingLoop, run_experiment,
    },
    td::{LearningParams, TdAgent, UpdateRule},
};

fn sarsa_params() -> LearningParams {
    LearningParams::default()
        .with_learning_rate(0.5)
        .with_discount(0.95)
        .with_epsilon(0.1)
}

#[test]
fn sarsa_finds_the_exit() {
    let (world, task) = small_grid();
    let agent = TdAgent::new(world, task, UpdateRule::Sarsa, sarsa_params()).unwrap();
    let config = TrainingConfig::default()
        .with_period(SnapshotPeriod::Episodes(500))
        .with_snapshots(11)
        .with_step_budget(200)
        .with_seed(42);

    let snapshots: Vec<_> = TrainingLoop::new(agent, config)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(snapshots.len(), 11);
    let last = snapshots.last().unwrap();
    assert_eq!(last.episodes, 5000);

    let evaluator = Evaluator::new(
        EvaluationConfig::default()
            .with_episodes(100)
            .with_step_budget(200)
            .with_seed(7),
        sarsa_params(),
    )
    .unwrap();
    let (world, task) = small_grid();
    let outcome = evaluator.evaluate(world, task, &last.table).unwrap();
    assert!(
        outcome.mean_reward > 10.0,
        "greedy policy earns {}",
        outcome.mean_reward
    );
    assert_eq!(outcome.truncated, 0);

    let table = &last.table;
    let below_exit = table.best_actions(&GridPosition::new(2, 1), &Direction::ALL);
    assert_eq!(below_exit, vec![Direction::Up]);
    let left_of_exit = table.best_actions(&GridPosition::new(1, 2), &Direction::ALL);
    assert_eq!(left_of_exit, vec![Direction::Right]);

    let map = GridWorldConfig::default().map().unwrap();
    let rendered = render_policy(&map, table);
    let rows: Vec<&str> = rendered.lines().collect();
    assert_eq!(rows.len(), 3);
    assert!(rows[0].ends_with(">E"), "top row {}", rows[0]);
    assert!(rows[1].ends_with('^'), "middle row {}", rows[1]);
}

#[test]
fn untrained_snapshot_scores_worse_than_trained() {
    let config = ExperimentConfig::default()
        .with_trials(4)
        .with_seed(3)
        .with_rule(UpdateRule::QLearning)
        .with_learning(sarsa_params())
        .with_training(
            TrainingConfig::default()
                .with_period(SnapshotPeriod::Episodes(100))
                .with_snapshots(4)
                .with_step_budget(50),
        )
        .with_evaluation(
            EvaluationConfig::default()
                .with_episodes(5)
                .with_step_budget(50),
        );

    let result = run_experiment(config, |seed| {
        let (world, task) = small_grid();
        Ok((world.with_seed(seed), task))
    })
    .unwrap();

    assert_eq!(result.trials, 4);
    assert_eq!(result.series.len(), 4);
    let first = &result.series[0];
    let last = result.final_point().unwrap();
    assert!(last.mean > first.mean, "{} vs {}", last.mean, first.mean);
    assert!(last.half_width >= 0.0);
}

#[test]
fn experiments_are_reproducible() {
    let config = ExperimentConfig::default()
        .with_trials(3)
        .with_seed(17)
        .with_rule(UpdateRule::SarsaLambda { lambda: 0.8 })
        .with_training(
            TrainingConfig::default()
                .with_period(SnapshotPeriod::Steps(150))
                .with_snapshots(3)
                .with_step_budget(40),
        )
        .with_evaluation(EvaluationConfig::default().with_episodes(3).with_step_budget(40));
    let grid = GridWorldConfig::default()
        .with_size(4, 3)
        .with_exit(GridPosition::new(3, 2))
        .with_pit(GridPosition::new(1, 1))
        .with_slip_probability(0.1);

    let factory = |seed: u64| -> tdlab::Result<_> {
        let (world, task) = grid.build()?;
        Ok((world.with_seed(seed), task))
    };
    let first = run_experiment(config.clone(), factory).unwrap();
    let second = run_experiment(config, factory).unwrap();
    assert_eq!(first, second);
}
