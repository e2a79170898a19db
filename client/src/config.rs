//! Runtime options read from the command line and environment.
//!
//! Supported:
//!   --track <n>, --track=<n>      start track `n` immediately instead of showing the menu
//!   --volume <v>, --volume=<v>    music volume in [0, 1]
//!   --muted                       silence the music
//!   RHYTHM_TRACK, RHYTHM_VOLUME   environment fallbacks for the two valued options
//!
//! CLI values win over the environment. Unparseable values are logged and ignored.

use bevy::prelude::*;

const DEFAULT_VOLUME: f32 = 1.0;

#[derive(Resource, Clone, Debug, PartialEq)]
pub struct RunConfig {
    pub track: Option<u32>,
    pub volume: f32,
    pub muted: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            track: None,
            volume: DEFAULT_VOLUME,
            muted: false,
        }
    }
}

impl RunConfig {
    /// Effective linear music volume.
    pub fn music_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.volume }
    }
}

pub(super) fn plugin(app: &mut App) {
    let config = read_config_from_cli_env();
    info!("Run config: {config:?}");
    app.insert_resource(config);
}

fn read_config_from_cli_env() -> RunConfig {
    parse_config(std::env::args().skip(1), |key| std::env::var(key).ok())
}

fn parse_config(
    args: impl IntoIterator<Item = String>,
    env: impl Fn(&str) -> Option<String>,
) -> RunConfig {
    let mut track: Option<String> = None;
    let mut volume: Option<String> = None;
    let mut muted = false;

    let mut pending_key: Option<&'static str> = None;
    for arg in args {
        if let Some(key) = pending_key.take() {
            match key {
                "track" => track = Some(arg),
                _ => volume = Some(arg),
            }
        } else if arg == "--track" {
            pending_key = Some("track");
        } else if let Some(val) = arg.strip_prefix("--track=") {
            track = Some(val.to_string());
        } else if arg == "--volume" {
            pending_key = Some("volume");
        } else if let Some(val) = arg.strip_prefix("--volume=") {
            volume = Some(val.to_string());
        } else if arg == "--muted" {
            muted = true;
        }
    }

    let track = track
        .or_else(|| env("RHYTHM_TRACK"))
        .and_then(|raw| match raw.trim().parse::<u32>() {
            Ok(n) => Some(n),
            Err(err) => {
                warn!("Ignoring track {raw:?}: {err}");
                None
            }
        });

    let volume = volume
        .or_else(|| env("RHYTHM_VOLUME"))
        .and_then(|raw| match raw.trim().parse::<f32>() {
            Ok(v) if v.is_finite() => Some(v.clamp(0.0, 1.0)),
            _ => {
                warn!("Ignoring volume {raw:?}");
                None
            }
        })
        .unwrap_or(DEFAULT_VOLUME);

    RunConfig {
        track,
        volume,
        muted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_without_arguments() {
        assert_eq!(parse_config(Vec::new(), no_env), RunConfig::default());
    }

    #[test]
    fn reads_both_argument_forms() {
        let config = parse_config(args(&["--track", "4", "--volume=0.25", "--muted"]), no_env);
        assert_eq!(config.track, Some(4));
        assert_eq!(config.volume, 0.25);
        assert!(config.muted);
        assert_eq!(config.music_volume(), 0.0);
    }

    #[test]
    fn cli_wins_over_environment() {
        let env = |key: &str| match key {
            "RHYTHM_TRACK" => Some("9".to_string()),
            "RHYTHM_VOLUME" => Some("0.5".to_string()),
            _ => None,
        };
        let config = parse_config(args(&["--track=2"]), env);
        assert_eq!(config.track, Some(2));
        assert_eq!(config.volume, 0.5);
    }

    #[test]
    fn bad_values_fall_back() {
        let config = parse_config(args(&["--track", "two", "--volume", "loud"]), no_env);
        assert_eq!(config.track, None);
        assert_eq!(config.volume, DEFAULT_VOLUME);

        let config = parse_config(args(&["--volume", "7"]), no_env);
        assert_eq!(config.volume, 1.0);
    }
}
