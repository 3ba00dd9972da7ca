//! TD-control agent
//!
//! One agent type drives every update rule. The rule is injected as an
//! [`UpdateRule`] value; the agent owns the step loop, the pending
//! transition and the episode bookkeeping.

use rand::{SeedableRng, rngs::StdRng};

use crate::{
    Error, Result,
    ports::{Domain, EpisodeSummary, Task},
    td::{
        params::LearningParams,
        policy::EpsilonGreedy,
        traces::EligibilityTraces,
        update::{NextState, Transition, UpdateRule},
        value_table::ValueTable,
    },
};

/// Default per-episode step budget
pub const DEFAULT_STEP_BUDGET: usize = 200;

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Where the agent is in its episode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodePhase {
    /// No action taken since the last reset
    AwaitingFirstAction,
    /// At least one action taken, episode not over
    InEpisode,
    /// Episode over; `episode_ended` must run before acting again
    EpisodeTerminal,
}

/// How a single step left the episode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continuing,
    /// The task reported the next state as final
    Terminal,
    /// The step budget ran out first
    Truncated,
}

/// Result of one environment step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub reward: f64,
    pub outcome: StepOutcome,
}

/// Transition whose update waits for the next action
#[derive(Debug, Clone)]
struct Pending<S, A> {
    state: S,
    action: A,
    reward: f64,
}

/// ε-greedy agent learning a value table with a TD-control rule
pub struct TdAgent<D: Domain, T: Task<D>> {
    domain: D,
    task: T,
    table: ValueTable<D::State, D::Action>,
    rule: UpdateRule,
    params: LearningParams,
    traces: Option<EligibilityTraces<D::State, D::Action>>,
    step_budget: usize,
    rng: StdRng,
    phase: EpisodePhase,
    last_outcome: Option<StepOutcome>,
    pending: Option<Pending<D::State, D::Action>>,
    cumulative_reward: f64,
    episode_steps: usize,
    episodes_completed: usize,
    total_steps: usize,
}

impl<D: Domain, T: Task<D>> TdAgent<D, T> {
    /// Create an agent with an empty value table
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `params` or `rule` are out of range.
    pub fn new(domain: D, task: T, rule: UpdateRule, params: LearningParams) -> Result<Self> {
        params.validate()?;
        rule.validate()?;
        Ok(Self {
            domain,
            task,
            table: ValueTable::new(params.initial_value),
            rule,
            params,
            traces: rule.trace_decay().map(EligibilityTraces::new),
            step_budget: DEFAULT_STEP_BUDGET,
            rng: build_rng(None),
            phase: EpisodePhase::AwaitingFirstAction,
            last_outcome: None,
            pending: None,
            cumulative_reward: 0.0,
            episode_steps: 0,
            episodes_completed: 0,
            total_steps: 0,
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = build_rng(Some(seed));
        self
    }

    /// Replace the value table (e.g. to evaluate a snapshot)
    pub fn with_table(mut self, table: ValueTable<D::State, D::Action>) -> Self {
        self.table = table;
        self
    }

    /// Maximum number of steps per episode
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] for a zero budget.
    pub fn with_step_budget(mut self, step_budget: usize) -> Result<Self> {
        if step_budget == 0 {
            return Err(Error::invalid_config("step budget must be positive"));
        }
        self.step_budget = step_budget;
        Ok(self)
    }

    /// Take one step in the domain
    ///
    /// Picks an action ε-greedily, applies it, completes the update for the
    /// previous transition now that the next action is known, and on a
    /// terminal successor performs the final update with zero future value.
    ///
    /// # Errors
    ///
    /// - [`Error::EpisodeOver`] if the previous episode has not been closed
    /// - [`Error::NoActionsAvailable`] if the current state offers no actions
    /// - any error the domain reports for the chosen action
    pub fn act(&mut self) -> Result<Step> {
        if self.phase == EpisodePhase::EpisodeTerminal {
            return Err(Error::EpisodeOver);
        }

        let state = self.domain.current_state();
        let legal_actions = self.domain.actions(&state);
        let policy = EpsilonGreedy::new(self.params.epsilon);
        let action = policy.select(&self.table, &state, &legal_actions, &mut self.rng)?;

        if let Some(pending) = self.pending.take() {
            let transition = Transition {
                state: &pending.state,
                action: &pending.action,
                reward: pending.reward,
                next: NextState::Continuing {
                    state: &state,
                    legal_actions: &legal_actions,
                    next_action: Some(&action),
                },
            };
            self.learn(&transition)?;
        }

        self.domain.apply_action(&action)?;
        let next_state = self.domain.current_state();
        let reward = self.task.reward(&state, &action, &next_state);

        self.cumulative_reward += reward;
        self.episode_steps += 1;
        self.total_steps += 1;

        let outcome = if self.task.is_final(&next_state) {
            let transition = Transition {
                state: &state,
                action: &action,
                reward,
                next: NextState::Terminal,
            };
            self.learn(&transition)?;
            self.phase = EpisodePhase::EpisodeTerminal;
            StepOutcome::Terminal
        } else if self.episode_steps >= self.step_budget {
            // Cut short: the unfinished transition is dropped, not bootstrapped
            self.phase = EpisodePhase::EpisodeTerminal;
            StepOutcome::Truncated
        } else {
            self.pending = Some(Pending {
                state,
                action,
                reward,
            });
            self.phase = EpisodePhase::InEpisode;
            StepOutcome::Continuing
        };

        self.last_outcome = Some(outcome);
        Ok(Step { reward, outcome })
    }

    fn learn(&mut self, transition: &Transition<'_, D::State, D::Action>) -> Result<()> {
        if self.params.learning_rate == 0.0 {
            return Ok(());
        }
        self.rule
            .apply(&mut self.table, self.traces.as_mut(), transition, &self.params)?;
        Ok(())
    }

    /// Reward collected since the episode started
    pub fn cumulative_reward(&self) -> f64 {
        self.cumulative_reward
    }

    /// Close the current episode and reset the domain
    ///
    /// Clears the pending transition and eligibility traces and returns the
    /// finished episode's summary. Closing an episode that did not reach a
    /// final state reports it as truncated.
    pub fn episode_ended(&mut self) -> EpisodeSummary {
        let summary = EpisodeSummary {
            episode: self.episodes_completed,
            reward: self.cumulative_reward,
            steps: self.episode_steps,
            truncated: self.last_outcome != Some(StepOutcome::Terminal),
        };

        self.domain.reset();
        self.pending = None;
        if let Some(traces) = self.traces.as_mut() {
            traces.clear();
        }
        self.cumulative_reward = 0.0;
        self.episode_steps = 0;
        self.episodes_completed += 1;
        self.phase = EpisodePhase::AwaitingFirstAction;
        self.last_outcome = None;

        summary
    }

    /// Act until the episode ends, then close it
    pub fn run_episode(&mut self) -> Result<EpisodeSummary> {
        loop {
            let step = self.act()?;
            if step.outcome != StepOutcome::Continuing {
                return Ok(self.episode_ended());
            }
        }
    }

    pub fn table(&self) -> &ValueTable<D::State, D::Action> {
        &self.table
    }

    /// Deep copy of the live value table
    pub fn snapshot(&self) -> ValueTable<D::State, D::Action> {
        self.table.clone()
    }

    pub fn into_table(self) -> ValueTable<D::State, D::Action> {
        self.table
    }

    pub fn traces(&self) -> Option<&EligibilityTraces<D::State, D::Action>> {
        self.traces.as_ref()
    }

    pub fn domain(&self) -> &D {
        &self.domain
    }

    pub fn task(&self) -> &T {
        &self.task
    }

    pub fn rule(&self) -> UpdateRule {
        self.rule
    }

    pub fn params(&self) -> &LearningParams {
        &self.params
    }

    pub fn phase(&self) -> EpisodePhase {
        self.phase
    }

    pub fn step_budget(&self) -> usize {
        self.step_budget
    }

    pub fn episodes_completed(&self) -> usize {
        self.episodes_completed
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }
}
