//! Audio system using Web Audio API
//!
//! Procedurally generated sound effects and a night-time drone. Which sound a
//! simulation event makes is decided here as plain data; only the synthesis
//! is browser-specific.

use crate::sim::state::{GameEvent, Gun, ZombieKind};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    PistolShot,
    ShotgunBlast,
    /// Hostile hit but still standing
    ZombieHit,
    ZombieDeath,
    /// Giants get a heavier death
    GiantDeath,
    /// Projectile stopped by an obstacle
    BulletImpact,
    PlayerHurt,
    CashPickup,
    Purchase,
    /// Night ends
    Dawn,
    PuzzleOpen,
    PuzzleWrong,
    PuzzleSolved,
    Infected,
    GameOver,
}

/// What the night music loop should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicCue {
    Start,
    Stop,
}

pub fn sound_for(event: &GameEvent) -> Option<SoundEffect> {
    let effect = match event {
        GameEvent::ShotFired { gun: Gun::Pistol, .. } => SoundEffect::PistolShot,
        GameEvent::ShotFired { gun: Gun::Shotgun, .. } => SoundEffect::ShotgunBlast,
        GameEvent::ZombieHit { .. } => SoundEffect::ZombieHit,
        GameEvent::ZombieKilled {
            kind: ZombieKind::Giant,
            ..
        } => SoundEffect::GiantDeath,
        GameEvent::ZombieKilled { .. } => SoundEffect::ZombieDeath,
        GameEvent::BulletImpact { .. } => SoundEffect::BulletImpact,
        GameEvent::PlayerHit { .. } | GameEvent::InfectionDamage { .. } => SoundEffect::PlayerHurt,
        GameEvent::CashCollected { .. } => SoundEffect::CashPickup,
        GameEvent::Purchased { .. } => SoundEffect::Purchase,
        GameEvent::DayBreak { .. } => SoundEffect::Dawn,
        GameEvent::PuzzleStarted { .. } => SoundEffect::PuzzleOpen,
        GameEvent::PuzzleWrong => SoundEffect::PuzzleWrong,
        GameEvent::PuzzleSolved { .. } => SoundEffect::PuzzleSolved,
        GameEvent::PlayerInfected => SoundEffect::Infected,
        GameEvent::PlayerDied => SoundEffect::GameOver,
        GameEvent::ZombieSpawned { .. }
        | GameEvent::ZombiesWiped { .. }
        | GameEvent::NightFall { .. }
        | GameEvent::PuzzleReady
        | GameEvent::InfectionCured => return None,
    };
    Some(effect)
}

/// Music plays through the night and stops at dawn or death
pub fn music_cue(event: &GameEvent) -> Option<MusicCue> {
    match event {
        GameEvent::NightFall { .. } => Some(MusicCue::Start),
        GameEvent::DayBreak { .. } | GameEvent::PlayerDied => Some(MusicCue::Stop),
        _ => None,
    }
}

/// Sounds for one frame, each effect at most once (a shotgun volley that
/// kills three hostiles plays one death sound)
pub fn frame_sounds(events: &[GameEvent]) -> Vec<SoundEffect> {
    let mut sounds: Vec<SoundEffect> = Vec::new();
    for effect in events.iter().filter_map(sound_for) {
        if !sounds.contains(&effect) {
            sounds.push(effect);
        }
    }
    sounds
}

/// Last music cue in a frame wins
pub fn frame_music_cue(events: &[GameEvent]) -> Option<MusicCue> {
    events.iter().filter_map(music_cue).last()
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{MusicCue, SoundEffect, frame_music_cue, frame_sounds};
    use crate::settings::Settings;
    use crate::sim::state::GameEvent;

    /// Drone peak gain at full music volume
    const MUSIC_GAIN: f32 = 0.12;

    struct MusicLoop {
        oscillators: Vec<OscillatorNode>,
        gain: GainNode,
    }

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        sfx_volume: f32,
        music_volume: f32,
        music: Option<MusicLoop>,
    }

    impl AudioManager {
        pub fn new(settings: &Settings) -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                sfx_volume: settings.effective_volume(),
                music_volume: settings.effective_music_volume(),
                music: None,
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        /// Pick up mute and volume changes
        pub fn apply_settings(&mut self, settings: &Settings) {
            self.sfx_volume = settings.effective_volume();
            let music_volume = settings.effective_music_volume();
            if music_volume != self.music_volume {
                self.music_volume = music_volume;
                if let Some(music) = &self.music {
                    music.gain.gain().set_value(music_volume * MUSIC_GAIN);
                }
            }
        }

        /// Play everything one frame of the simulation asked for
        pub fn handle_events(&mut self, events: &[GameEvent]) {
            match frame_music_cue(events) {
                Some(MusicCue::Start) => self.start_music(),
                Some(MusicCue::Stop) => self.stop_music(),
                None => {}
            }
            for effect in frame_sounds(events) {
                self.play(effect);
            }
        }

        /// Play a sound effect
        pub fn play(&self, effect: SoundEffect) {
            let vol = self.sfx_volume;
            if vol <= 0.0 {
                return;
            }

            let Some(ctx) = &self.ctx else { return };

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match effect {
                SoundEffect::PistolShot => self.play_pistol(ctx, vol),
                SoundEffect::ShotgunBlast => self.play_shotgun(ctx, vol),
                SoundEffect::ZombieHit => self.play_zombie_hit(ctx, vol),
                SoundEffect::ZombieDeath => self.play_zombie_death(ctx, vol),
                SoundEffect::GiantDeath => self.play_giant_death(ctx, vol),
                SoundEffect::BulletImpact => self.play_impact(ctx, vol),
                SoundEffect::PlayerHurt => self.play_hurt(ctx, vol),
                SoundEffect::CashPickup => self.play_arpeggio(ctx, vol, &[600.0, 800.0, 1000.0], 0.08),
                SoundEffect::Purchase => self.play_arpeggio(ctx, vol, &[500.0, 700.0], 0.1),
                SoundEffect::Dawn => self.play_arpeggio(ctx, vol, &[400.0, 500.0, 600.0, 800.0], 0.1),
                SoundEffect::PuzzleOpen => self.play_puzzle_open(ctx, vol),
                SoundEffect::PuzzleWrong => self.play_wrong(ctx, vol),
                SoundEffect::PuzzleSolved => {
                    self.play_arpeggio(ctx, vol, &[500.0, 600.0, 700.0, 800.0, 1000.0], 0.08)
                }
                SoundEffect::Infected => self.play_infected(ctx, vol),
                SoundEffect::GameOver => self.play_game_over(ctx, vol),
            }
        }

        // === Music ===

        /// Fade in the night drone
        fn start_music(&mut self) {
            if self.music.is_some() {
                return;
            }
            let Some(ctx) = &self.ctx else { return };
            let Ok(gain) = ctx.create_gain() else { return };
            if gain.connect_with_audio_node(&ctx.destination()).is_err() {
                return;
            }
            let t = ctx.current_time();
            gain.gain().set_value_at_time(0.001, t).ok();
            gain.gain()
                .linear_ramp_to_value_at_time(self.music_volume * MUSIC_GAIN, t + 2.0)
                .ok();

            // Low fifth with a slow beat between the voices
            let mut oscillators = Vec::new();
            for (freq, osc_type) in [
                (55.0, OscillatorType::Sine),
                (82.6, OscillatorType::Triangle),
                (55.4, OscillatorType::Sine),
            ] {
                let Ok(osc) = ctx.create_oscillator() else {
                    continue;
                };
                osc.set_type(osc_type);
                osc.frequency().set_value(freq);
                if osc.connect_with_audio_node(&gain).is_ok() && osc.start().is_ok() {
                    oscillators.push(osc);
                }
            }
            log::debug!("Night music on");
            self.music = Some(MusicLoop { oscillators, gain });
        }

        /// Fade out the drone; a no-op when it is not playing
        pub fn stop_music(&mut self) {
            let Some(music) = self.music.take() else {
                return;
            };
            let Some(ctx) = &self.ctx else { return };
            let t = ctx.current_time();
            music.gain.gain().cancel_scheduled_values(t).ok();
            music.gain.gain().set_value_at_time(music.gain.gain().value(), t).ok();
            music.gain.gain().linear_ramp_to_value_at_time(0.0, t + 0.5).ok();
            for osc in &music.oscillators {
                osc.stop_with_when(t + 0.6).ok();
            }
            log::debug!("Night music off");
        }

        // === Sound generators ===

        /// Create an oscillator with gain envelope
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Single falling blip
        fn sweep(
            &self,
            ctx: &AudioContext,
            (from, to): (f32, f32),
            osc_type: OscillatorType,
            level: f32,
            length: f64,
        ) {
            let Some((osc, gain)) = self.create_osc(ctx, from, osc_type) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(level, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + length)
                .ok();
            osc.frequency().set_value_at_time(from, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(to, t + length)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + length + 0.05).ok();
        }

        /// Pistol - short snap
        fn play_pistol(&self, ctx: &AudioContext, vol: f32) {
            self.sweep(ctx, (900.0, 180.0), OscillatorType::Square, vol * 0.18, 0.06);
        }

        /// Shotgun - wide crack over a thump
        fn play_shotgun(&self, ctx: &AudioContext, vol: f32) {
            self.sweep(ctx, (220.0, 45.0), OscillatorType::Sawtooth, vol * 0.35, 0.18);
            self.sweep(ctx, (1500.0, 300.0), OscillatorType::Square, vol * 0.15, 0.08);
        }

        /// Hostile hit - soft tap
        fn play_zombie_hit(&self, ctx: &AudioContext, vol: f32) {
            self.sweep(ctx, (300.0, 220.0), OscillatorType::Triangle, vol * 0.25, 0.05);
        }

        /// Hostile down - groan
        fn play_zombie_death(&self, ctx: &AudioContext, vol: f32) {
            self.sweep(ctx, (180.0, 40.0), OscillatorType::Sawtooth, vol * 0.3, 0.25);
        }

        /// Giant down - deep bass impact with a metallic edge
        fn play_giant_death(&self, ctx: &AudioContext, vol: f32) {
            self.sweep(ctx, (90.0, 30.0), OscillatorType::Sine, vol * 0.5, 0.4);
            self.sweep(ctx, (400.0, 200.0), OscillatorType::Square, vol * 0.2, 0.2);
        }

        /// Bullet into a wall - higher ping
        fn play_impact(&self, ctx: &AudioContext, vol: f32) {
            self.sweep(ctx, (400.0, 380.0), OscillatorType::Sine, vol * 0.2, 0.06);
        }

        /// Player hurt - dull thud
        fn play_hurt(&self, ctx: &AudioContext, vol: f32) {
            self.sweep(ctx, (220.0, 90.0), OscillatorType::Square, vol * 0.3, 0.15);
        }

        /// Puzzle board opens - rising shimmer
        fn play_puzzle_open(&self, ctx: &AudioContext, vol: f32) {
            self.sweep(ctx, (600.0, 950.0), OscillatorType::Sine, vol * 0.25, 0.25);
        }

        /// Wrong answer - two low blips
        fn play_wrong(&self, ctx: &AudioContext, vol: f32) {
            for (i, freq) in [200.0, 160.0].iter().enumerate() {
                let delay = i as f64 * 0.12;
                if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Square) {
                    let t = ctx.current_time() + delay;
                    gain.gain().set_value_at_time(vol * 0.2, t).ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, t + 0.1)
                        .ok();
                    osc.start_with_when(t).ok();
                    osc.stop_with_when(t + 0.12).ok();
                }
            }
        }

        /// Infection - ominous descend
        fn play_infected(&self, ctx: &AudioContext, vol: f32) {
            self.sweep(ctx, (300.0, 20.0), OscillatorType::Sine, vol * 0.4, 0.8);
        }

        /// Notes in sequence, each fading out
        fn play_arpeggio(&self, ctx: &AudioContext, vol: f32, notes: &[f32], step: f64) {
            for (i, freq) in notes.iter().enumerate() {
                let delay = i as f64 * step;
                if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Triangle) {
                    let t = ctx.current_time() + delay;
                    gain.gain().set_value_at_time(vol * 0.25, t).ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, t + 0.25)
                        .ok();
                    osc.start_with_when(t).ok();
                    osc.stop_with_when(t + 0.3).ok();
                }
            }
        }

        /// Game over - sad descending
        fn play_game_over(&self, ctx: &AudioContext, vol: f32) {
            for (i, freq) in [400.0, 350.0, 300.0, 200.0].iter().enumerate() {
                let delay = i as f64 * 0.2;
                if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Sine) {
                    let t = ctx.current_time() + delay;
                    gain.gain().set_value_at_time(vol * 0.3, t).ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                        .ok();
                    osc.start_with_when(t).ok();
                    osc.stop_with_when(t + 0.4).ok();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_weapon_sounds() {
        assert_eq!(
            sound_for(&GameEvent::ShotFired { gun: Gun::Pistol, pellets: 1 }),
            Some(SoundEffect::PistolShot)
        );
        assert_eq!(
            sound_for(&GameEvent::ShotFired { gun: Gun::Shotgun, pellets: 3 }),
            Some(SoundEffect::ShotgunBlast)
        );
    }

    #[test]
    fn test_giant_death_is_distinct() {
        let giant = GameEvent::ZombieKilled { id: 1, kind: ZombieKind::Giant, reward: 25 };
        let kid = GameEvent::ZombieKilled { id: 2, kind: ZombieKind::Kid, reward: 10 };
        assert_eq!(sound_for(&giant), Some(SoundEffect::GiantDeath));
        assert_eq!(sound_for(&kid), Some(SoundEffect::ZombieDeath));
    }

    #[test]
    fn test_music_follows_night() {
        assert_eq!(music_cue(&GameEvent::NightFall { wave: 1 }), Some(MusicCue::Start));
        assert_eq!(music_cue(&GameEvent::DayBreak { wave: 2 }), Some(MusicCue::Stop));
        assert_eq!(music_cue(&GameEvent::PlayerDied), Some(MusicCue::Stop));
        assert_eq!(music_cue(&GameEvent::PuzzleReady), None);
    }

    #[test]
    fn test_frame_sounds_play_each_effect_once() {
        let events = vec![
            GameEvent::ShotFired { gun: Gun::Shotgun, pellets: 3 },
            GameEvent::ZombieKilled { id: 1, kind: ZombieKind::Normal, reward: 5 },
            GameEvent::ZombieKilled { id: 2, kind: ZombieKind::Normal, reward: 5 },
            GameEvent::ZombieSpawned { id: 3, kind: ZombieKind::Kid },
            GameEvent::BulletImpact { pos: Vec2::ZERO },
            GameEvent::ZombieKilled { id: 4, kind: ZombieKind::Normal, reward: 5 },
        ];
        assert_eq!(
            frame_sounds(&events),
            vec![
                SoundEffect::ShotgunBlast,
                SoundEffect::ZombieDeath,
                SoundEffect::BulletImpact
            ]
        );
    }

    #[test]
    fn test_last_cue_in_frame_wins() {
        // One long frame can cross dusk and dawn
        let events = vec![
            GameEvent::NightFall { wave: 1 },
            GameEvent::ZombiesWiped { count: 0 },
            GameEvent::DayBreak { wave: 1 },
        ];
        assert_eq!(frame_music_cue(&events), Some(MusicCue::Stop));
        assert_eq!(frame_music_cue(&[GameEvent::PuzzleWrong]), None);
    }
}
