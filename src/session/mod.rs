//! Session lifecycle
//!
//! `Title -> Starting -> Running -> Ended -> (Title | Running)`.
//!
//! The session owns the one `GameState` and decides when it is stepped.
//! Async work (wallet signatures, leaderboard writes) runs outside and hands
//! results back with a ticket; results for a run that has since been reset
//! or torn down are ignored.

pub mod claim;

use std::cell::RefCell;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::services::host::{HostEvent, HostMessage};
use crate::services::wallet::{self, SignedIntent, WalletError, WalletProvider};
use crate::settings::Settings;
use crate::sim::state::{GameEvent, GameState, Gun};
use crate::sim::tick::{TickInput, tick};
use crate::sim::timer::OneShotTimer;
pub use claim::{ClaimError, ClaimFlow, ClaimState, ClaimTicket, Coin, RewardTier, drive_claim};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Title,
    /// "Starting Game..." pause before the first frame
    Starting,
    Running,
    Ended,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub seed: u64,
    /// Title screen asks for a signed zero-value transaction before play
    pub require_entry_tx: bool,
    pub leaderboard_panel_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 0x5eed,
            require_entry_tx: true,
            leaderboard_panel_size: LEADERBOARD_PANEL_SIZE,
        }
    }
}

/// End-of-run snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub score: u64,
    /// Wave number at death minus one
    pub days_survived: u32,
    pub kills: u32,
    pub cash: u32,
    pub weapon: Gun,
}

impl RunReport {
    pub fn from_state(state: &GameState) -> Self {
        Self {
            score: state.score,
            days_survived: state.wave().saturating_sub(1),
            kills: state.kills,
            cash: state.cash,
            weapon: state.player.gun,
        }
    }

    pub fn text(&self) -> String {
        format!(
            "Score: {}\nSurvived: {} days\nKills:{}\nCash: {}\nWeapon: {}",
            self.score,
            self.days_survived,
            self.kills,
            self.cash,
            self.weapon.as_str()
        )
    }
}

/// What pressing play did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayRequest {
    Ignored,
    /// Sign the entry transaction, then report back with this ticket
    NeedsSignature(EntryTicket),
    Starting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryTicket {
    generation: u64,
}

#[derive(Debug)]
pub struct Session {
    pub config: SessionConfig,
    pub settings: Settings,
    pub state: GameState,
    pub claim: ClaimFlow,
    /// Title screen message ("Transaction\ncancelled", ...)
    pub entry_message: Option<&'static str>,
    phase: SessionPhase,
    /// Bumped whenever a run is reset or the session is torn down
    generation: u64,
    alive: bool,
    entry_pending: bool,
    start_timer: OneShotTimer,
    report: Option<RunReport>,
    outbox: Vec<HostEvent>,
}

impl Session {
    pub fn new(config: SessionConfig, settings: Settings) -> Self {
        let state = GameState::new(config.seed);
        Self {
            config,
            settings,
            state,
            claim: ClaimFlow::default(),
            entry_message: None,
            phase: SessionPhase::Title,
            generation: 0,
            alive: true,
            entry_pending: false,
            start_timer: OneShotTimer::default(),
            report: None,
            outbox: Vec::new(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn report(&self) -> Option<&RunReport> {
        self.report.as_ref()
    }

    /// Play button visible on the title screen
    pub fn can_press_play(&self) -> bool {
        self.alive && self.phase == SessionPhase::Title && !self.entry_pending
    }

    /// Title screen status line
    pub fn entry_status(&self) -> Option<&'static str> {
        match self.phase {
            SessionPhase::Starting => Some("Starting Game..."),
            SessionPhase::Title if self.entry_pending => Some("Confirm in wallet..."),
            _ => None,
        }
    }

    pub fn drain_host_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.outbox)
    }

    pub fn press_play(&mut self) -> PlayRequest {
        if !self.can_press_play() {
            return PlayRequest::Ignored;
        }
        self.entry_message = None;
        if self.config.require_entry_tx {
            self.entry_pending = true;
            return PlayRequest::NeedsSignature(EntryTicket {
                generation: self.generation,
            });
        }
        self.begin_starting();
        PlayRequest::Starting
    }

    /// Hand back the entry signature. Returns false if the result was dropped.
    pub fn apply_entry_signature(
        &mut self,
        ticket: &EntryTicket,
        result: Result<SignedIntent, WalletError>,
    ) -> bool {
        if !self.alive
            || ticket.generation != self.generation
            || self.phase != SessionPhase::Title
            || !self.entry_pending
        {
            log::debug!("Dropping stale entry signature");
            return false;
        }
        self.entry_pending = false;
        match result {
            Ok(_) => self.begin_starting(),
            Err(err) => {
                log::warn!("Entry transaction failed: {err}");
                self.entry_message = Some(err.user_message());
            }
        }
        true
    }

    fn begin_starting(&mut self) {
        self.phase = SessionPhase::Starting;
        self.start_timer.arm(START_DELAY_MS);
        log::info!("Starting game");
    }

    fn enter_running(&mut self) {
        self.phase = SessionPhase::Running;
        self.outbox.push(HostEvent::Ready);
        log::info!("Run started (seed {})", self.state.seed);
    }

    /// Step one rendered frame. Returns the simulation events it produced.
    pub fn frame(&mut self, input: &TickInput, dt_ms: f32) -> Vec<GameEvent> {
        if !self.alive {
            return Vec::new();
        }
        match self.phase {
            SessionPhase::Title => {}
            SessionPhase::Starting => {
                if self.start_timer.advance(dt_ms) {
                    self.enter_running();
                }
            }
            SessionPhase::Running => {
                tick(&mut self.state, input, dt_ms);
                if self.state.player.is_dead() {
                    self.end_run();
                }
            }
            SessionPhase::Ended => self.claim.advance(dt_ms),
        }

        let events = self.state.drain_events();
        for event in &events {
            if matches!(event, GameEvent::PlayerHit { .. } | GameEvent::PlayerDied)
                && self.settings.effective_haptics()
            {
                self.outbox.push(HostEvent::Haptic);
            }
        }
        events
    }

    /// Terminal condition: freeze the world and take the snapshot
    fn end_run(&mut self) {
        self.phase = SessionPhase::Ended;
        for zombie in &mut self.state.zombies {
            zombie.vel = Vec2::ZERO;
            zombie.knockback = Vec2::ZERO;
        }
        self.state.bullets.clear();
        self.state.player.can_be_hit = false;
        self.state.player.invuln_ms = 0.0;
        self.state.push_event(GameEvent::PlayerDied);

        let report = RunReport::from_state(&self.state);
        log::info!(
            "Run over: score {}, {} days, {} kills",
            report.score,
            report.days_survived,
            report.kills
        );
        self.outbox.push(HostEvent::GameOver {
            score: report.score,
        });
        self.report = Some(report);
        self.claim = ClaimFlow::default();
    }

    /// Continue button is enabled
    pub fn can_continue(&self) -> bool {
        self.alive && self.phase == SessionPhase::Ended && !self.claim.is_busy()
    }

    /// Leave the end screen (continue, or exit after a reveal) for the title
    pub fn continue_to_title(&mut self) -> bool {
        if !self.can_continue() {
            return false;
        }
        self.reset_run();
        self.phase = SessionPhase::Title;
        log::info!("Back to title");
        true
    }

    /// Fresh run straight into Running (R key, host "play_again")
    pub fn restart(&mut self) {
        if !self.alive {
            return;
        }
        self.reset_run();
        log::info!("Restarting run");
        self.enter_running();
    }

    pub fn handle_host_message(&mut self, message: HostMessage) {
        match message {
            // A claim awaiting its signature must not lose its run
            HostMessage::PlayAgain if self.claim.is_busy() => {
                log::info!("Ignoring play_again while a claim is in flight");
            }
            HostMessage::PlayAgain => self.restart(),
            HostMessage::ToggleMute { is_muted } => {
                self.settings.muted = is_muted.unwrap_or(!self.settings.muted);
                log::info!("Muted: {}", self.settings.muted);
            }
        }
    }

    /// Drop everything and invalidate outstanding async work
    pub fn teardown(&mut self) {
        self.reset_run();
        self.alive = false;
        self.phase = SessionPhase::Title;
        self.outbox.clear();
        log::info!("Session torn down");
    }

    fn reset_run(&mut self) {
        self.generation += 1;
        self.state.reset();
        self.claim = ClaimFlow::default();
        self.report = None;
        self.start_timer.cancel();
        self.entry_pending = false;
        self.entry_message = None;
    }

    fn is_current(&self, generation: u64) -> bool {
        self.alive && generation == self.generation && self.phase == SessionPhase::Ended
    }

    pub fn begin_claim(&mut self) -> Option<ClaimTicket> {
        if !self.is_current(self.generation) || !self.claim.begin() {
            return None;
        }
        Some(ClaimTicket {
            generation: self.generation,
            score: self.report.as_ref().map_or(0, |r| r.score),
        })
    }

    /// Signature result; returns the signing account on success
    pub fn apply_claim_signature(
        &mut self,
        ticket: &ClaimTicket,
        result: Result<SignedIntent, WalletError>,
    ) -> Result<String, ClaimError> {
        if !self.is_current(ticket.generation) {
            return Err(ClaimError::Stale);
        }
        match result {
            Ok(signed) => {
                if !self.claim.signed() {
                    return Err(ClaimError::Stale);
                }
                Ok(signed.account)
            }
            Err(err) => {
                self.claim.fail(&err);
                Err(ClaimError::Wallet(err))
            }
        }
    }

    /// Score write finished (either way); start opening the chest
    pub fn apply_claim_saved(&mut self, ticket: &ClaimTicket) -> Result<(), ClaimError> {
        if !self.is_current(ticket.generation) {
            return Err(ClaimError::Stale);
        }
        let reward = RewardTier::roll(&mut self.state.rng);
        if !self.claim.open(reward) {
            return Err(ClaimError::Stale);
        }
        Ok(())
    }
}

/// Title screen entry: sign, then hand the result back. Returns true if it
/// was applied to the live session.
pub async fn drive_entry(session: &RefCell<Session>, wallet: &dyn WalletProvider) -> bool {
    let PlayRequest::NeedsSignature(ticket) = session.borrow_mut().press_play() else {
        return false;
    };
    let signed = wallet::sign_intent(wallet).await;
    session.borrow_mut().apply_entry_signature(&ticket, signed)
}
