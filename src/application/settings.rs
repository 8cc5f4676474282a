//! Functions for loading application settings.
//!
//! Settings are layered: defaults first, then an optional JSON file, then the command
//! line. Only window dimensions, title, headless mode and a frame limit are exposed as
//! flags.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::*;
use crate::math::prelude::Color;
use crate::window::WindowParams;

/// A structure containing configuration data for the engine, which are used to
/// specify hardware setup stuff to create the window and other context information.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub engine: EngineParams,
    pub window: WindowParams,
    /// Runs without a window, on top of the in-memory video backend.
    pub headless: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineParams {
    /// The color every frame is cleared with.
    pub clear_color: Color,
    /// Enables depth testing, and clears the depth buffer with every frame.
    pub depth_test: bool,
    /// Stops the main loop after this many frames.
    pub max_frames: Option<u64>,
}

impl Default for EngineParams {
    fn default() -> Self {
        EngineParams {
            clear_color: Color::new(0.2, 0.3, 0.3, 1.0),
            depth_test: false,
            max_frames: None,
        }
    }
}

impl Settings {
    /// Loads settings from a JSON file. Missing fields take their default values.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|err| err_format!("Failed to open settings {:?}: {}", path, err))?;

        let settings = serde_json::from_reader(BufReader::new(file))?;
        info!("Loaded settings from {:?}.", path);
        Ok(settings)
    }

    /// Parses command line arguments on top of the default settings.
    pub fn from_args<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Settings::default().merge_args(args)
    }

    /// Parses the arguments of the current process on top of `self`.
    pub fn merge_env(self) -> Result<Self> {
        self.merge_args(::std::env::args().skip(1))
    }

    /// Applies command line arguments on top of `self`. A `--config <path>` file replaces
    /// `self` entirely before the remaining flags are applied, regardless of its position.
    pub fn merge_args<I, S>(self, args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();

        let mut settings = self;
        if let Some(index) = args.iter().position(|v| v == "--config") {
            let path = value("--config", args.get(index + 1))?;
            settings = Settings::load(path)?;
        }

        let mut iter = args.iter();
        while let Some(flag) = iter.next() {
            match flag.as_str() {
                "--config" => {
                    iter.next();
                }
                "--headless" => settings.headless = true,
                "--width" => settings.window.size.x = parse(flag, iter.next())?,
                "--height" => settings.window.size.y = parse(flag, iter.next())?,
                "--title" => settings.window.title = value(flag, iter.next())?.clone(),
                "--frames" => settings.engine.max_frames = Some(parse(flag, iter.next())?),
                _ => return Err(err_format!("Unknown argument `{}`.", flag)),
            }
        }

        Ok(settings)
    }
}

fn value<'a>(flag: &str, v: Option<&'a String>) -> Result<&'a String> {
    v.ok_or_else(|| err_format!("Missing value for `{}`.", flag))
}

fn parse<T: FromStr>(flag: &str, v: Option<&String>) -> Result<T> {
    let v = value(flag, v)?;
    v.parse()
        .map_err(|_| err_format!("Invalid value `{}` for `{}`.", v, flag))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::prelude::Vector2;

    #[test]
    fn args() {
        let settings = Settings::from_args(vec![
            "--width",
            "320",
            "--height",
            "240",
            "--title",
            "Hello",
            "--headless",
            "--frames",
            "3",
        ])
        .unwrap();

        assert_eq!(settings.window.size, Vector2::new(320, 240));
        assert_eq!(settings.window.title, "Hello");
        assert!(settings.headless);
        assert_eq!(settings.engine.max_frames, Some(3));

        let settings = Settings::from_args(Vec::<String>::new()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn keep_base() {
        let mut base = Settings::default();
        base.window.title = "Triangle".to_owned();

        let settings = base.clone().merge_args(vec!["--width", "64"]).unwrap();
        assert_eq!(settings.window.title, "Triangle");
        assert_eq!(settings.window.size, Vector2::new(64, 600));
    }

    #[test]
    fn invalid_args() {
        assert!(Settings::from_args(vec!["--width"]).is_err());
        assert!(Settings::from_args(vec!["--width", "wide"]).is_err());
        assert!(Settings::from_args(vec!["--height", "-1"]).is_err());
        assert!(Settings::from_args(vec!["--fullscreen"]).is_err());
        assert!(Settings::from_args(vec!["--config", "/nonexistent/settings.json"]).is_err());
    }

    #[test]
    fn json() {
        let settings: Settings = serde_json::from_str(
            r#"{ "window": { "title": "Cubes", "size": { "x": 1024, "y": 768 } },
                 "engine": { "depth_test": true } }"#,
        )
        .unwrap();

        assert_eq!(settings.window.title, "Cubes");
        assert_eq!(settings.window.size, Vector2::new(1024, 768));
        assert!(settings.window.vsync);
        assert!(settings.engine.depth_test);
        assert_eq!(settings.engine.max_frames, None);
        assert!(!settings.headless);
    }

    #[test]
    fn config_file() {
        let path = ::std::env::temp_dir().join("lantern-settings-config-file.json");
        ::std::fs::write(&path, r#"{ "headless": true, "window": { "title": "File" } }"#)
            .unwrap();

        let path = path.to_string_lossy().into_owned();
        let settings =
            Settings::from_args(vec!["--title", "Args", "--config", path.as_str()]).unwrap();

        assert!(settings.headless);
        assert_eq!(settings.window.title, "Args");
    }
}
