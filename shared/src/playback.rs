//! Song timing and the per-frame inputs of the post-process shader.

use crate::constants::{BASE_PIXEL_SIZE, MAX_TRANSITION, TRANSITION_SECONDS};

/// Elapsed playback time of the current song.
///
/// Advanced by the frame delta while playing, so it pauses with the music.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlaybackClock {
    elapsed: f32,
    duration: f32,
    playing: bool,
}

impl PlaybackClock {
    /// Restart the clock for a song of `duration` seconds and start playing.
    pub fn start(&mut self, duration: f32) {
        self.elapsed = 0.0;
        self.duration = duration.max(0.0);
        self.playing = true;
    }

    pub fn stop(&mut self) {
        *self = Self::default();
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn resume(&mut self) {
        if self.duration > 0.0 {
            self.playing = true;
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn advance(&mut self, dt: f32) {
        if self.playing && dt.is_finite() && dt > 0.0 {
            self.elapsed = (self.elapsed + dt).min(self.duration);
        }
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn remaining(&self) -> f32 {
        (self.duration - self.elapsed).max(0.0)
    }

    /// Fraction of the song played, in [0, 1]. A zero-length song reports 0.
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self) -> bool {
        self.duration > 0.0 && self.elapsed >= self.duration
    }
}

/// Uniform values consumed by the full-screen post-process pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameUniforms {
    pub time: f32,
    pub frame_count: f32,
    pub song_progress: f32,
    /// Fade/pixelation amount in [0, `MAX_TRANSITION`], highest at the song edges.
    pub transition: f32,
    pub stage_number: i32,
    pub pixel_size: f32,
}

impl Default for FrameUniforms {
    fn default() -> Self {
        Self {
            time: 0.0,
            frame_count: 0.0,
            song_progress: 0.0,
            transition: MAX_TRANSITION,
            stage_number: 1,
            pixel_size: BASE_PIXEL_SIZE,
        }
    }
}

impl FrameUniforms {
    /// Reset the per-stage counters and select the stage's shader variant.
    pub fn begin_stage(&mut self, stage_number: i32) {
        *self = Self {
            stage_number,
            ..Self::default()
        };
    }

    /// Advance one rendered frame.
    pub fn advance(&mut self, dt: f32, clock: &PlaybackClock) {
        self.frame_count += 1.0;
        if dt.is_finite() && dt > 0.0 {
            self.time += dt;
        }
        self.song_progress = clock.progress();
        self.transition = transition_for(clock);
    }

    /// Scale factor for the path's breathing effect at the current frame.
    pub fn path_pulse_scale(&self, base: f32, amplitude: f32) -> f32 {
        base + amplitude * (self.frame_count * 0.01).sin()
    }
}

/// `MAX_TRANSITION` at the very start and end of a song, ramping linearly to 0 over
/// `TRANSITION_SECONDS`; fully transitioned while nothing plays.
pub fn transition_for(clock: &PlaybackClock) -> f32 {
    if !clock.is_playing() && clock.elapsed() <= 0.0 {
        return MAX_TRANSITION;
    }
    let edge = clock.elapsed().min(clock.remaining());
    let t = (edge / TRANSITION_SECONDS).clamp(0.0, 1.0);
    MAX_TRANSITION * (1.0 - t)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1.0e-4;

    #[test]
    fn progress_tracks_elapsed_time() {
        let mut clock = PlaybackClock::default();
        clock.start(10.0);
        clock.advance(2.5);
        assert!((clock.progress() - 0.25).abs() < EPS);

        clock.advance(100.0);
        assert_eq!(clock.progress(), 1.0);
        assert!(clock.is_finished());
    }

    #[test]
    fn paused_clock_does_not_advance() {
        let mut clock = PlaybackClock::default();
        clock.start(10.0);
        clock.advance(1.0);
        clock.pause();
        clock.advance(5.0);
        assert!((clock.elapsed() - 1.0).abs() < EPS);

        clock.resume();
        clock.advance(1.0);
        assert!((clock.elapsed() - 2.0).abs() < EPS);
    }

    #[test]
    fn zero_duration_reports_no_progress() {
        let mut clock = PlaybackClock::default();
        clock.start(0.0);
        clock.advance(1.0);
        assert_eq!(clock.progress(), 0.0);
        assert!(!clock.is_finished());
    }

    #[test]
    fn transition_ramps_at_both_edges() {
        let mut clock = PlaybackClock::default();
        clock.start(60.0);
        assert!((transition_for(&clock) - MAX_TRANSITION).abs() < EPS);

        clock.advance(TRANSITION_SECONDS * 0.5);
        assert!((transition_for(&clock) - MAX_TRANSITION * 0.5).abs() < 1.0e-2);

        clock.advance(10.0);
        assert_eq!(transition_for(&clock), 0.0);

        clock.advance(60.0);
        assert!((transition_for(&clock) - MAX_TRANSITION).abs() < EPS);
    }

    #[test]
    fn uniforms_count_frames_and_reset_per_stage() {
        let mut clock = PlaybackClock::default();
        clock.start(30.0);
        let mut uniforms = FrameUniforms::default();
        uniforms.begin_stage(3);

        for _ in 0..10 {
            clock.advance(0.5);
            uniforms.advance(0.5, &clock);
        }
        assert_eq!(uniforms.frame_count, 10.0);
        assert!((uniforms.time - 5.0).abs() < EPS);
        assert!((uniforms.song_progress - 5.0 / 30.0).abs() < EPS);
        assert_eq!(uniforms.stage_number, 3);

        uniforms.begin_stage(4);
        assert_eq!(uniforms.frame_count, 0.0);
        assert_eq!(uniforms.stage_number, 4);
    }

    #[test]
    fn pulse_scale_rests_at_base_without_amplitude() {
        let uniforms = FrameUniforms {
            frame_count: 157.0,
            ..FrameUniforms::default()
        };
        assert_eq!(uniforms.path_pulse_scale(1.0, 0.0), 1.0);
        assert_eq!(uniforms.path_pulse_scale(0.9, 0.0), 0.9);
        let scale = uniforms.path_pulse_scale(0.9, 0.05);
        assert!((scale - (0.9 + 0.05 * 1.57f32.sin())).abs() < EPS);
    }
}
