//! DNA puzzle gate
//!
//! Kills fill the mutation meter. When it is full the player may open the
//! gate, which freezes the world and presents one puzzle. A correct confirm
//! clears the gate (bonus score); giving up infects the player, who then
//! loses health periodically until dawn.
//!
//! ```text
//! Inactive --accept--> Active --correct confirm--> Cleared  --continue--> Inactive
//!                         \----surrender---------> Infected --continue--> Inactive (+ drain)
//! ```

pub mod dna;
pub mod variants;

use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::timer::OneShotTimer;
pub use dna::{Base, MutationKind};
pub use variants::{
    Answer, InputMode, PuzzleInstance, PuzzleVariant, PuzzleView, Selection, VariantKind,
};

/// The puzzle currently on the board plus the player's input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivePuzzle {
    pub instance: PuzzleInstance,
    pub answer: Answer,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum GateState {
    #[default]
    Inactive,
    Active(Box<ActivePuzzle>),
    /// Success modal showing; bonus already paid
    Cleared,
    /// Failure modal showing
    Infected,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfirmLabel {
    #[default]
    Confirm,
    /// Shown for a second after a wrong or empty confirm
    SelectPrompt,
}

impl ConfirmLabel {
    pub fn text(self) -> &'static str {
        match self {
            ConfirmLabel::Confirm => "CONFIRM",
            ConfirmLabel::SelectPrompt => "SELECT!",
        }
    }
}

/// Player input on the puzzle board and its modals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuzzleAction {
    Select(Selection),
    /// Tap the n-th choice on the board
    Choose(usize),
    PushBase(Base),
    ClearBuilt,
    Confirm,
    /// Give up on the current puzzle
    Surrender,
    /// Dismiss the Cleared / Infected modal
    Continue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    Ignored,
    Updated,
    /// Wrong or incomplete answer; still on the board
    Wrong,
    Solved { bonus: u64 },
    Infected,
    /// Modal dismissed, world resumes
    Resumed,
    /// Infected modal dismissed, drain started
    InfectionStarted,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PuzzleGate {
    pub state: GateState,
    /// 0..=MUTATION_KILLS_NEEDED
    pub meter: u8,
    /// Trigger affordance visible
    pub show_trigger: bool,
    pub confirm_label: ConfirmLabel,
    label_reset: OneShotTimer,
    /// Armed while the player is infected; fires once per drain tick
    infection: Option<OneShotTimer>,
}

impl PuzzleGate {
    pub fn is_puzzle_active(&self) -> bool {
        matches!(self.state, GateState::Active(_))
    }

    pub fn current_wave_cleared(&self) -> bool {
        matches!(self.state, GateState::Cleared)
    }

    pub fn show_solve_puzzle_btn(&self) -> bool {
        self.show_trigger
    }

    pub fn is_inactive(&self) -> bool {
        matches!(self.state, GateState::Inactive)
    }

    /// Hostiles and shooting stay suspended until the gate is back to Inactive
    pub fn freezes_world(&self) -> bool {
        !self.is_inactive()
    }

    pub fn is_infected(&self) -> bool {
        self.infection.is_some()
    }

    pub fn active(&self) -> Option<&ActivePuzzle> {
        match &self.state {
            GateState::Active(p) => Some(p),
            _ => None,
        }
    }

    pub fn view(&self) -> Option<PuzzleView> {
        self.active().map(|p| p.instance.view())
    }

    /// Count a kill. Returns true when this kill makes the trigger available.
    pub fn record_kill(&mut self) -> bool {
        if !self.is_inactive() || self.show_trigger {
            return false;
        }
        self.meter = (self.meter + 1).min(MUTATION_KILLS_NEEDED);
        if self.meter >= MUTATION_KILLS_NEEDED {
            self.show_trigger = true;
            return true;
        }
        false
    }

    /// Open the gate if the trigger is available
    pub fn accept(&mut self, wave: u32, rng: &mut Pcg32) -> Option<VariantKind> {
        if !self.is_inactive() || !self.show_trigger {
            return None;
        }
        self.show_trigger = false;
        let instance = PuzzleInstance::for_wave(wave, rng);
        let kind = instance.kind();
        self.state = GateState::Active(Box::new(ActivePuzzle {
            instance,
            answer: Answer::default(),
        }));
        self.confirm_label = ConfirmLabel::Confirm;
        self.label_reset.cancel();
        log::info!("Puzzle opened: {} (wave {wave})", kind.as_str());
        Some(kind)
    }

    pub fn apply(&mut self, action: PuzzleAction) -> GateOutcome {
        match std::mem::take(&mut self.state) {
            GateState::Active(mut puzzle) => {
                let outcome = self.apply_active(&mut puzzle, action);
                // Still on the board unless the action resolved the gate
                if self.is_inactive() {
                    self.state = GateState::Active(puzzle);
                }
                outcome
            }
            GateState::Cleared if action == PuzzleAction::Continue => {
                log::info!("Puzzle cleared, resuming");
                GateOutcome::Resumed
            }
            GateState::Infected if action == PuzzleAction::Continue => {
                self.infection = Some(OneShotTimer::armed(INFECTION_DRAIN_MS));
                log::info!("Infection drain started");
                GateOutcome::InfectionStarted
            }
            other => {
                self.state = other;
                GateOutcome::Ignored
            }
        }
    }

    fn apply_active(&mut self, puzzle: &mut ActivePuzzle, action: PuzzleAction) -> GateOutcome {
        match action {
            PuzzleAction::Select(selection) => {
                puzzle.answer.selected = Some(selection);
                GateOutcome::Updated
            }
            PuzzleAction::Choose(index) => {
                if puzzle.instance.build_capacity().is_some() {
                    return match Base::DNA.get(index) {
                        Some(&base) => self.apply_active(puzzle, PuzzleAction::PushBase(base)),
                        None => GateOutcome::Ignored,
                    };
                }
                match puzzle.instance.selection_for(index) {
                    Some(selection) => {
                        puzzle.answer.selected = Some(selection);
                        GateOutcome::Updated
                    }
                    None => GateOutcome::Ignored,
                }
            }
            PuzzleAction::PushBase(base) => {
                let capacity = puzzle.instance.build_capacity().unwrap_or(0);
                if puzzle.answer.built.len() < capacity {
                    puzzle.answer.built.push(base);
                    GateOutcome::Updated
                } else {
                    GateOutcome::Ignored
                }
            }
            PuzzleAction::ClearBuilt => {
                puzzle.answer.built.clear();
                GateOutcome::Updated
            }
            PuzzleAction::Confirm => {
                if puzzle.instance.grade(&puzzle.answer) {
                    self.resolve(GateState::Cleared);
                    log::info!("Puzzle solved: +{PUZZLE_BONUS}");
                    GateOutcome::Solved {
                        bonus: PUZZLE_BONUS,
                    }
                } else {
                    self.confirm_label = ConfirmLabel::SelectPrompt;
                    self.label_reset.arm(CONFIRM_RESET_MS);
                    GateOutcome::Wrong
                }
            }
            PuzzleAction::Surrender => {
                self.resolve(GateState::Infected);
                log::info!("Puzzle abandoned: player infected");
                GateOutcome::Infected
            }
            PuzzleAction::Continue => GateOutcome::Ignored,
        }
    }

    /// Leave Active: the board and its pending label reset go away
    fn resolve(&mut self, next: GateState) {
        self.label_reset.cancel();
        self.confirm_label = ConfirmLabel::Confirm;
        self.meter = 0;
        self.show_trigger = false;
        self.state = next;
    }

    /// Advance gate timers. Returns true when an infection drain tick lands.
    pub fn advance(&mut self, dt_ms: f32) -> bool {
        if self.label_reset.advance(dt_ms) {
            self.confirm_label = ConfirmLabel::Confirm;
        }
        let Some(timer) = self.infection.as_mut() else {
            return false;
        };
        if timer.advance(dt_ms) {
            timer.arm(INFECTION_DRAIN_MS);
            return true;
        }
        false
    }

    /// Dawn cures the infection. Returns true if the player was infected.
    pub fn cure(&mut self) -> bool {
        self.infection.take().is_some()
    }

    /// Drop the board and every pending timer
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;

    fn ready_gate() -> PuzzleGate {
        let mut gate = PuzzleGate::default();
        for _ in 0..MUTATION_KILLS_NEEDED {
            gate.record_kill();
        }
        gate
    }

    fn open_basic(gate: &mut PuzzleGate) -> usize {
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(gate.accept(1, &mut rng), Some(VariantKind::BasicComplement));
        match &gate.active().unwrap().instance {
            PuzzleInstance::BasicComplement(p) => p.correct,
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_trigger_appears_on_fourth_kill() {
        let mut gate = PuzzleGate::default();
        assert!(!gate.record_kill());
        assert!(!gate.record_kill());
        assert!(!gate.record_kill());
        assert!(gate.record_kill());
        assert!(gate.show_solve_puzzle_btn());
        assert!(!gate.record_kill());
        assert_eq!(gate.meter, MUTATION_KILLS_NEEDED);
    }

    #[test]
    fn test_accept_requires_trigger() {
        let mut gate = PuzzleGate::default();
        let mut rng = Pcg32::seed_from_u64(2);
        assert_eq!(gate.accept(1, &mut rng), None);
        assert!(gate.is_inactive());
    }

    #[test]
    fn test_wrong_confirm_shows_prompt_then_reverts() {
        let mut gate = ready_gate();
        let correct = open_basic(&mut gate);
        assert_eq!(gate.apply(PuzzleAction::Confirm), GateOutcome::Wrong);
        assert_eq!(gate.confirm_label.text(), "SELECT!");
        assert!(gate.is_puzzle_active());

        gate.apply(PuzzleAction::Choose((correct + 1) % 3));
        assert!(!gate.advance(600.0));
        assert_eq!(gate.apply(PuzzleAction::Confirm), GateOutcome::Wrong);
        // Re-armed: the first timer would have fired at 1000 ms
        gate.advance(500.0);
        assert_eq!(gate.confirm_label, ConfirmLabel::SelectPrompt);
        gate.advance(500.0);
        assert_eq!(gate.confirm_label, ConfirmLabel::Confirm);
        assert!(gate.is_puzzle_active());
    }

    #[test]
    fn test_solving_clears_and_cancels_label_timer() {
        let mut gate = ready_gate();
        let correct = open_basic(&mut gate);
        gate.apply(PuzzleAction::Confirm);
        gate.apply(PuzzleAction::Choose(correct));
        assert_eq!(
            gate.apply(PuzzleAction::Confirm),
            GateOutcome::Solved { bonus: PUZZLE_BONUS }
        );
        assert!(gate.current_wave_cleared());
        assert_eq!(gate.meter, 0);
        assert_eq!(gate.confirm_label, ConfirmLabel::Confirm);
        assert!(gate.freezes_world());

        assert!(!gate.record_kill());
        assert_eq!(gate.meter, 0);

        assert_eq!(gate.apply(PuzzleAction::Continue), GateOutcome::Resumed);
        assert!(gate.is_inactive());
        assert!(!gate.freezes_world());
    }

    #[test]
    fn test_build_board_respects_capacity() {
        let mut gate = PuzzleGate::default();
        let instance = PuzzleInstance::generate(
            VariantKind::BuildComplement,
            1,
            &mut Pcg32::seed_from_u64(3),
        );
        let target = match &instance {
            PuzzleInstance::BuildComplement(b) => b.target.clone(),
            _ => unreachable!(),
        };
        gate.state = GateState::Active(Box::new(ActivePuzzle {
            instance,
            answer: Answer::default(),
        }));
        for _ in 0..10 {
            gate.apply(PuzzleAction::PushBase(Base::A));
        }
        assert_eq!(gate.active().unwrap().answer.built.len(), target.len());
        gate.apply(PuzzleAction::ClearBuilt);
        for base in &target {
            let idx = Base::DNA.iter().position(|b| b == base).unwrap();
            gate.apply(PuzzleAction::Choose(idx));
        }
        assert!(matches!(gate.apply(PuzzleAction::Confirm), GateOutcome::Solved { .. }));
    }

    #[test]
    fn test_surrender_infects_and_drains_until_cured() {
        let mut gate = ready_gate();
        open_basic(&mut gate);
        assert_eq!(gate.apply(PuzzleAction::Surrender), GateOutcome::Infected);
        assert_eq!(gate.meter, 0);
        assert!(!gate.is_infected());
        assert_eq!(gate.apply(PuzzleAction::Continue), GateOutcome::InfectionStarted);
        assert!(gate.is_inactive());
        assert!(gate.is_infected());

        assert!(!gate.advance(4999.0));
        assert!(gate.advance(2.0));
        assert!(!gate.advance(4000.0));
        assert!(gate.advance(1000.0));

        assert!(gate.cure());
        assert!(!gate.advance(10_000.0));
    }

    #[test]
    fn test_continue_ignored_while_active() {
        let mut gate = ready_gate();
        open_basic(&mut gate);
        assert_eq!(gate.apply(PuzzleAction::Continue), GateOutcome::Ignored);
        assert!(gate.is_puzzle_active());
    }

    proptest! {
        #[test]
        fn prop_meter_is_min_kills_four(kills in 0usize..40) {
            let mut gate = PuzzleGate::default();
            for _ in 0..kills {
                gate.record_kill();
            }
            prop_assert_eq!(gate.meter as usize, kills.min(MUTATION_KILLS_NEEDED as usize));
            prop_assert_eq!(gate.show_solve_puzzle_btn(), kills >= MUTATION_KILLS_NEEDED as usize);
        }
    }
}
