//! Resolution engine - the turn state machine
//!
//! A turn starts when the player picks a column and ends when the grid is
//! stable again:
//!
//! ```text
//! Idle --column--> Dropping --landed--> Resolving{ gravity waves, match pass }*
//!      <--------------------------- spawn next ------------------------------'
//!                                    (or GameOver if the spawn column is topped out)
//! ```
//!
//! The engine never mutates the grid directly while planning. Every change is
//! a transition bound in the [`AnimationScheduler`]; the grid only changes when
//! [`ResolutionEngine::tick`] finds a finished transition and applies its
//! completion action. A stage waits until every transition it scheduled has
//! completed (fan-out, then join) before the state machine moves on.

use merge_drop_core::{
    AnimationScheduler, Completion, CompletionAction, ConfigError, EngineConfig, EngineSnapshot,
    FallingBlock, GridModel, Motion, ScoreTracker, SpawnController, SpawnOutcome, Transition,
    TransitionConflict, TransitionId, UnlockedValues,
};

use crate::resolve::{detect_matches, plan_gravity, GravityStep, MergePlan};
use crate::types::{CellPos, EngineEvent, Phase, TurnSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// Gravity waves until nothing floats. `moved` records whether any cell fell
    /// during this iteration.
    Gravity { moved: bool },
    /// Waiting for the merges of this iteration's match pass.
    Merging { moved: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TurnState {
    Idle,
    Dropping,
    Resolving(Stage),
    GameOver,
}

/// Complete engine state
#[derive(Debug, Clone)]
pub struct ResolutionEngine {
    config: EngineConfig,
    grid: GridModel,
    scheduler: AnimationScheduler,
    spawner: SpawnController,
    score: ScoreTracker,
    state: TurnState,
    started: bool,
    game_active: bool,
    /// Monotonic engine clock, advanced only by `tick`.
    now_ms: u64,
    /// Transitions the current stage is waiting on.
    pending: Vec<TransitionId>,
    /// Reused completion buffer.
    completions: Vec<Completion>,
    events: Vec<EngineEvent>,
    turn: TurnSummary,
    last_turn: TurnSummary,
}

impl ResolutionEngine {
    /// Create an engine with an empty grid.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = GridModel::new(config.rows, config.cols);
        Ok(Self::from_parts(config, grid))
    }

    /// Create an engine over an existing grid.
    ///
    /// The grid's dimensions override the configured ones, and every value
    /// already on the grid counts as unlocked.
    pub fn with_grid(config: EngineConfig, grid: GridModel) -> Result<Self, ConfigError> {
        let config = config.with_size(grid.rows(), grid.cols());
        config.validate()?;
        let mut engine = Self::from_parts(config, grid);
        let present: Vec<u32> = engine.grid.occupied().map(|(_, v)| v).collect();
        for value in present {
            engine.spawner.unlock(value);
        }
        Ok(engine)
    }

    fn from_parts(config: EngineConfig, grid: GridModel) -> Self {
        Self {
            scheduler: AnimationScheduler::new(grid.rows(), grid.cols()),
            spawner: SpawnController::new(grid.cols(), config.seed),
            grid,
            config,
            score: ScoreTracker::new(),
            state: TurnState::Idle,
            started: false,
            game_active: false,
            now_ms: 0,
            pending: Vec::new(),
            completions: Vec::new(),
            events: Vec::new(),
            turn: TurnSummary::default(),
            last_turn: TurnSummary::default(),
        }
    }

    /// Start the game and spawn the first block.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.game_active = true;
        log::info!(
            "game started: {}x{} grid, seed {}",
            self.config.rows,
            self.config.cols,
            self.config.seed
        );
        self.spawn_next();
    }

    /// Start a fresh game on an empty grid, seeded from the current RNG state.
    pub fn restart(&mut self) {
        let pointer = self.spawner.pointer_column();
        let config = self.config.with_seed(self.spawner.rng_state());
        let grid = GridModel::new(config.rows, config.cols);
        *self = Self::from_parts(config, grid);
        self.spawner.set_pointer_column(pointer as i32);
        self.start();
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn grid(&self) -> &GridModel {
        &self.grid
    }

    pub fn scheduler(&self) -> &AnimationScheduler {
        &self.scheduler
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            TurnState::Idle => Phase::Idle,
            TurnState::Dropping => Phase::Dropping,
            TurnState::Resolving(_) => Phase::Resolving,
            TurnState::GameOver => Phase::GameOver,
        }
    }

    /// True while a turn is in progress; column choices are rejected.
    pub fn is_processing(&self) -> bool {
        self.phase().is_processing()
    }

    pub fn is_game_active(&self) -> bool {
        self.game_active
    }

    pub fn started(&self) -> bool {
        self.started
    }

    /// Running score, including merges not yet published.
    pub fn score(&self) -> u32 {
        self.score.total()
    }

    /// Score as presented at the end of the last resolve iteration.
    pub fn published_score(&self) -> u32 {
        self.score.published()
    }

    pub fn unlocked(&self) -> &UnlockedValues {
        self.spawner.unlocked()
    }

    pub fn falling(&self) -> Option<&FallingBlock> {
        self.spawner.falling()
    }

    pub fn pointer_column(&self) -> u8 {
        self.spawner.pointer_column()
    }

    pub fn last_turn(&self) -> TurnSummary {
        self.last_turn
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Queue preset spawn values (see [`SpawnController::queue_values`]).
    pub fn queue_values(&mut self, values: impl IntoIterator<Item = u32>) {
        self.spawner.queue_values(values);
    }

    /// Move the pointer (and the falling block) to `col`, clamped to the grid.
    pub fn set_pointer_column(&mut self, col: i32) {
        if self.state == TurnState::GameOver {
            return;
        }
        self.spawner.set_pointer_column(col);
    }

    /// Take all events queued since the last call.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    /// Player picked `col` for the falling block.
    ///
    /// Returns `Ok(false)` without touching any state when the input cannot be
    /// used: a turn is in progress, the game is not active, `col` is out of
    /// range, or the column is full.
    pub fn on_column_chosen(&mut self, col: i32) -> Result<bool, TransitionConflict> {
        if self.state != TurnState::Idle || !self.game_active {
            log::trace!("column {} ignored: {}", col, self.phase().as_str());
            return Ok(false);
        }
        if col < 0 || col >= self.config.cols as i32 {
            log::trace!("column {} ignored: out of range", col);
            return Ok(false);
        }
        let col = col as u8;

        let Some(block) = self.spawner.falling().copied() else {
            return Ok(false);
        };
        let Some(row) = self.grid.lowest_empty_row(col) else {
            log::debug!("column {} is full", col);
            return Ok(false);
        };

        let layout = self.config.layout;
        let pos = CellPos::new(row, col);
        let id = self.scheduler.schedule(
            pos,
            Transition {
                start_ms: self.now_ms,
                duration_ms: self.config.drop_ms,
                motion: Motion::Drop {
                    value: block.value,
                    from_offset: layout.preview_offset,
                    to_offset: layout.row_offset(row),
                },
                action: CompletionAction::Place { value: block.value },
            },
        )?;
        log::debug!("drop {} into ({}, {})", block.value, row, col);

        self.pending.push(id);
        self.turn = TurnSummary::default();
        self.state = TurnState::Dropping;
        Ok(true)
    }

    /// Advance the engine clock by `elapsed_ms`.
    ///
    /// Finished transitions apply their completion actions (in cell order), then
    /// the state machine moves forward as far as it can without waiting. New
    /// transitions start at the updated clock and never finish in the same tick.
    pub fn tick(&mut self, elapsed_ms: u32) -> Result<(), TransitionConflict> {
        if !self.started {
            return Ok(());
        }
        self.now_ms += elapsed_ms as u64;
        self.spawner
            .ease_preview(self.config.layout.preview_smoothing);

        let mut done = std::mem::take(&mut self.completions);
        done.clear();
        self.scheduler.advance(self.now_ms, &mut done);
        for completion in &done {
            self.complete(*completion);
        }
        self.completions = done;

        self.advance_turn()
    }

    /// Apply one transition's completion action to the model.
    fn complete(&mut self, completion: Completion) {
        self.pending.retain(|&id| id != completion.id);
        let pos = completion.pos;

        match completion.action {
            CompletionAction::Place { value } => {
                self.grid.set(pos.row, pos.col, value);
                self.spawner.take_falling();
                self.events.push(EngineEvent::Placed { pos, value });
            }
            CompletionAction::Fall { from } => match self.grid.get_at(from) {
                Some(value) => {
                    self.grid.set(pos.row, pos.col, value);
                    self.grid.clear(from.row, from.col);
                }
                None => {
                    log::error!(
                        "gravity source ({}, {}) emptied while in flight",
                        from.row,
                        from.col
                    );
                }
            },
            CompletionAction::Merge { source, value } => {
                self.grid.set(pos.row, pos.col, value);
                self.grid.clear(source.row, source.col);
                if self.spawner.unlock(value) {
                    log::info!("unlocked {}", value);
                    self.events.push(EngineEvent::ValueUnlocked(value));
                }
                self.score.add_score(value);
                self.turn.merges += 1;
                self.turn.points = self.turn.points.saturating_add(value);
                self.events.push(EngineEvent::Merged { pos, source, value });
            }
        }
    }

    /// Step the turn state machine until it has to wait for transitions.
    fn advance_turn(&mut self) -> Result<(), TransitionConflict> {
        while self.pending.is_empty() {
            match self.state {
                TurnState::Idle | TurnState::GameOver => return Ok(()),
                TurnState::Dropping => {
                    self.state = TurnState::Resolving(Stage::Gravity { moved: false });
                }
                TurnState::Resolving(Stage::Gravity { moved }) => {
                    let steps = plan_gravity(&self.grid);
                    if !steps.is_empty() {
                        for step in steps {
                            self.schedule_fall(step)?;
                        }
                        self.state = TurnState::Resolving(Stage::Gravity { moved: true });
                        continue;
                    }

                    let merges = detect_matches(&self.grid);
                    if merges.is_empty() {
                        self.end_iteration(moved, false);
                    } else {
                        for merge in merges {
                            self.schedule_merge(merge)?;
                        }
                        self.state = TurnState::Resolving(Stage::Merging { moved });
                    }
                }
                TurnState::Resolving(Stage::Merging { moved }) => {
                    self.end_iteration(moved, true);
                }
            }
        }
        Ok(())
    }

    fn schedule_fall(&mut self, step: GravityStep) -> Result<(), TransitionConflict> {
        let layout = self.config.layout;
        let id = self.scheduler.schedule(
            step.to,
            Transition {
                start_ms: self.now_ms,
                duration_ms: self.config.gravity_ms(),
                motion: Motion::Drop {
                    value: step.value,
                    from_offset: layout.row_offset(step.from.row),
                    to_offset: layout.row_offset(step.to.row),
                },
                action: CompletionAction::Fall { from: step.from },
            },
        )?;
        self.pending.push(id);
        Ok(())
    }

    fn schedule_merge(&mut self, merge: MergePlan) -> Result<(), TransitionConflict> {
        let id = self.scheduler.schedule(
            merge.target,
            Transition {
                start_ms: self.now_ms,
                duration_ms: self.config.merge_ms,
                motion: Motion::Merge {
                    old_value: merge.old_value,
                    new_value: merge.new_value,
                },
                action: CompletionAction::Merge {
                    source: merge.source,
                    value: merge.new_value,
                },
            },
        )?;
        log::debug!(
            "merge {} at ({}, {}) from ({}, {})",
            merge.new_value,
            merge.target.row,
            merge.target.col,
            merge.source.row,
            merge.source.col
        );
        self.pending.push(id);
        Ok(())
    }

    /// One gravity+match iteration finished: publish the score and loop again
    /// if anything changed.
    fn end_iteration(&mut self, gravity_changed: bool, matches_found: bool) {
        self.turn.passes += 1;
        if self.score.publish() {
            self.events
                .push(EngineEvent::ScorePublished(self.score.published()));
        }

        if gravity_changed || matches_found {
            self.state = TurnState::Resolving(Stage::Gravity { moved: false });
        } else {
            self.finish_turn();
        }
    }

    fn finish_turn(&mut self) {
        self.last_turn = self.turn;
        log::info!(
            "turn settled: {} passes, {} merges, +{} (score {})",
            self.turn.passes,
            self.turn.merges,
            self.turn.points,
            self.score.total()
        );
        self.events.push(EngineEvent::TurnFinished(self.turn));
        self.state = TurnState::Idle;
        self.spawn_next();
    }

    fn spawn_next(&mut self) {
        match self.spawner.spawn_next(&self.grid, &self.config.layout) {
            SpawnOutcome::Spawned => {}
            SpawnOutcome::Blocked => self.game_over(),
        }
    }

    fn game_over(&mut self) {
        if !self.game_active {
            return;
        }
        self.game_active = false;
        self.state = TurnState::GameOver;
        log::info!("game over: score {}", self.score.total());
        self.events.push(EngineEvent::GameOver {
            score: self.score.total(),
        });
    }

    /// Write the current frame's view into `out`.
    pub fn snapshot_into(&self, out: &mut EngineSnapshot) {
        let layout = &self.config.layout;
        out.fill_cells(&self.grid, &self.scheduler, layout, self.now_ms);
        // While dropping, the block is drawn by its transition instead.
        let falling = match self.state {
            TurnState::Dropping => None,
            _ => self.spawner.falling(),
        };
        out.set_falling(falling, layout);
        out.pointer_column = self.spawner.pointer_column();
        out.score = self.score.published();
        out.live_score = self.score.total();
        out.unlocked.clear();
        out.unlocked.extend_from_slice(self.spawner.unlocked().as_slice());
        out.phase = self.phase();
        out.game_active = self.game_active;
        out.last_turn = self.last_turn;
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        let mut snap = EngineSnapshot::new(self.config.rows, self.config.cols);
        self.snapshot_into(&mut snap);
        snap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settle(engine: &mut ResolutionEngine) {
        for _ in 0..10_000 {
            if !engine.is_processing() {
                return;
            }
            engine.tick(16).unwrap();
        }
        panic!("engine did not settle");
    }

    #[test]
    fn test_new_engine_is_idle_and_inactive() {
        let engine = ResolutionEngine::new(EngineConfig::default()).unwrap();
        assert_eq!(engine.phase(), Phase::Idle);
        assert!(!engine.is_game_active());
        assert!(engine.falling().is_none());
        assert_eq!(engine.score(), 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EngineConfig::default().with_size(0, 5);
        assert_eq!(
            ResolutionEngine::new(config).unwrap_err(),
            ConfigError::ZeroRows
        );
    }

    #[test]
    fn test_input_before_start_is_ignored() {
        let mut engine = ResolutionEngine::new(EngineConfig::default()).unwrap();
        assert_eq!(engine.on_column_chosen(0), Ok(false));
        engine.tick(1000).unwrap();
        assert_eq!(engine.now_ms(), 0);
    }

    #[test]
    fn test_drop_lands_after_duration() {
        let mut engine = ResolutionEngine::new(EngineConfig::default()).unwrap();
        engine.start();
        assert_eq!(engine.on_column_chosen(2), Ok(true));
        assert_eq!(engine.phase(), Phase::Dropping);

        engine.tick(199).unwrap();
        assert_eq!(engine.grid().get(5, 2), None);
        assert_eq!(engine.phase(), Phase::Dropping);

        engine.tick(1).unwrap();
        assert_eq!(engine.grid().get(5, 2), Some(2));
        // Nothing to resolve: the turn ends and a new block spawns in the same tick.
        assert_eq!(engine.phase(), Phase::Idle);
        assert!(engine.falling().is_some());
        assert_eq!(engine.last_turn().passes, 1);
    }

    #[test]
    fn test_input_rejected_while_processing() {
        let mut engine = ResolutionEngine::new(EngineConfig::default()).unwrap();
        engine.start();
        assert_eq!(engine.on_column_chosen(0), Ok(true));
        assert_eq!(engine.on_column_chosen(1), Ok(false));
        assert_eq!(engine.scheduler().in_flight(), 1);
        settle(&mut engine);
        assert_eq!(engine.grid().get(5, 1), None);
    }

    #[test]
    fn test_out_of_range_column_ignored() {
        let mut engine = ResolutionEngine::new(EngineConfig::default()).unwrap();
        engine.start();
        assert_eq!(engine.on_column_chosen(-1), Ok(false));
        assert_eq!(engine.on_column_chosen(5), Ok(false));
        assert_eq!(engine.phase(), Phase::Idle);
        assert!(engine.scheduler().is_idle());
    }

    #[test]
    fn test_score_published_per_iteration() {
        let mut engine = ResolutionEngine::new(EngineConfig::default()).unwrap();
        engine.start();
        engine.on_column_chosen(0).unwrap();
        settle(&mut engine);
        engine.on_column_chosen(0).unwrap();

        // Drop lands, then the merge runs; the running score moves first.
        let mut saw_unpublished = false;
        while engine.is_processing() {
            engine.tick(16).unwrap();
            if engine.score() != engine.published_score() {
                saw_unpublished = true;
            }
        }
        assert!(!saw_unpublished, "merge completion and publish share a tick");
        assert_eq!(engine.published_score(), 4);

        let events = engine.drain_events();
        let published: Vec<u32> = events
            .iter()
            .filter_map(|e| match e {
                EngineEvent::ScorePublished(s) => Some(*s),
                _ => None,
            })
            .collect();
        assert_eq!(published, vec![4]);
    }

    #[test]
    fn test_restart_resets_board_and_score() {
        let mut engine = ResolutionEngine::new(EngineConfig::default()).unwrap();
        engine.start();
        engine.on_column_chosen(0).unwrap();
        settle(&mut engine);
        engine.on_column_chosen(0).unwrap();
        settle(&mut engine);
        assert_eq!(engine.score(), 4);

        engine.set_pointer_column(3);
        engine.restart();
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.grid().filled(), 0);
        assert!(engine.is_game_active());
        assert_eq!(engine.falling().unwrap().column, 3);
        assert_eq!(engine.unlocked().as_slice(), &[2]);
    }

    #[test]
    fn test_snapshot_reflects_engine() {
        let mut engine = ResolutionEngine::new(EngineConfig::default()).unwrap();
        engine.start();
        engine.on_column_chosen(1).unwrap();
        engine.tick(100).unwrap();

        let snap = engine.snapshot();
        assert_eq!(snap.phase, Phase::Dropping);
        let view = snap.cell(5, 1).transition.unwrap();
        assert!((view.progress - 0.5).abs() < 1e-6);
        assert_eq!(view.value, 2);
        assert!(snap.falling.is_none());
        assert_eq!(snap.unlocked, vec![2]);
    }
}
