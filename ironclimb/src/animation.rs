//! Frame clocks for sprite animations.
//!
//! Nothing here touches textures; an [`Animator`] only tracks which frame of
//! which clip is showing and reports when a one-shot clip finishes, which the
//! gameplay uses to release the player's action lock and to return enemies to
//! their idle pose.

/// A named sequence of frames played at a fixed rate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationClip {
    pub name: &'static str,
    pub frame_count: usize,
    /// Frames per second.
    pub frame_rate: f32,
    pub looping: bool,
}

impl AnimationClip {
    pub const fn new(name: &'static str, frame_count: usize, frame_rate: f32, looping: bool) -> Self {
        Self {
            name,
            frame_count,
            frame_rate,
            looping,
        }
    }

    pub fn frame_duration(&self) -> f32 {
        1.0 / self.frame_rate
    }

    /// Time a one-shot clip takes from its first frame to completion.
    pub fn duration(&self) -> f32 {
        self.frame_count as f32 * self.frame_duration()
    }
}

pub const PLAYER_RUN: AnimationClip = AnimationClip::new("run", 4, 10.0, true);
pub const PLAYER_SHOOT: AnimationClip = AnimationClip::new("shoot", 7, 20.0, false);
pub const ENEMY_IDLE: AnimationClip = AnimationClip::new("enemy-idle", 1, 10.0, true);
pub const ENEMY_SHOOT: AnimationClip = AnimationClip::new("enemy-shoot", 4, 20.0, false);

/// Plays one clip at a time.
#[derive(Clone, Debug, Default)]
pub struct Animator {
    clip: Option<AnimationClip>,
    frame: usize,
    timer: f32,
    playing: bool,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `clip`. Requesting the clip that is already playing keeps its progress.
    pub fn play(&mut self, clip: AnimationClip) {
        if self.playing && self.clip.map(|c| c.name) == Some(clip.name) {
            return;
        }
        self.clip = Some(clip);
        self.frame = 0;
        self.timer = 0.0;
        self.playing = true;
    }

    /// Stop and forget the current clip (the sprite shows its idle texture).
    pub fn stop(&mut self) {
        self.clip = None;
        self.frame = 0;
        self.timer = 0.0;
        self.playing = false;
    }

    pub fn current(&self) -> Option<&'static str> {
        self.clip.filter(|_| self.playing).map(|c| c.name)
    }

    pub fn is_playing(&self, clip: AnimationClip) -> bool {
        self.current() == Some(clip.name)
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Advance by `dt` seconds. Returns the clip that completed during this
    /// update, if a one-shot clip reached its end.
    pub fn update(&mut self, dt: f32) -> Option<AnimationClip> {
        let clip = self.clip?;
        if !self.playing || clip.frame_count == 0 {
            return None;
        }

        self.timer += dt;
        let frame_duration = clip.frame_duration();
        while self.timer >= frame_duration {
            self.timer -= frame_duration;
            self.frame += 1;
            if self.frame >= clip.frame_count {
                if clip.looping {
                    self.frame = 0;
                } else {
                    self.frame = clip.frame_count - 1;
                    self.playing = false;
                    return Some(clip);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_shot_clip_completes_once() {
        let mut animator = Animator::new();
        animator.play(PLAYER_SHOOT);
        let mut completions = 0;
        let mut elapsed = 0.0;
        while elapsed < 1.0 {
            if animator.update(1.0 / 60.0) == Some(PLAYER_SHOOT) {
                completions += 1;
            }
            elapsed += 1.0 / 60.0;
        }
        assert_eq!(completions, 1);
        assert_eq!(animator.current(), None);
        assert_eq!(animator.frame(), 6);
    }

    #[test]
    fn shoot_lasts_seven_frames_at_twenty_fps() {
        let mut animator = Animator::new();
        animator.play(PLAYER_SHOOT);
        assert_eq!(animator.update(0.30), None);
        assert_eq!(animator.update(0.06), Some(PLAYER_SHOOT));
        assert!((PLAYER_SHOOT.duration() - 0.35).abs() < 1e-6);
    }

    #[test]
    fn looping_clip_never_completes() {
        let mut animator = Animator::new();
        animator.play(PLAYER_RUN);
        for _ in 0..600 {
            assert_eq!(animator.update(1.0 / 60.0), None);
        }
        assert!(animator.is_playing(PLAYER_RUN));
    }

    #[test]
    fn replaying_the_same_clip_keeps_progress() {
        let mut animator = Animator::new();
        animator.play(PLAYER_RUN);
        animator.update(0.25);
        assert_eq!(animator.frame(), 2);
        animator.play(PLAYER_RUN);
        assert_eq!(animator.frame(), 2);
        animator.play(PLAYER_SHOOT);
        assert_eq!(animator.frame(), 0);
    }
}
