use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use winit::dpi::LogicalSize;

use framewright_engine::logging::LoggingConfig;
use framewright_engine::time::TimerConfig;
use framewright_engine::window::RuntimeConfig;

/// Which scene to drive.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
pub enum SampleKind {
    /// Textured triangle lit through a normal map by a rotating light.
    Triangle,
    /// Vertically scrolling starfield with an animated ship sprite.
    Starfield,
}

#[derive(Debug, Parser)]
#[command(name = "framewright-samples", version, about = "Framewright sample scenes")]
pub struct Args {
    #[arg(long, value_enum, default_value_t = SampleKind::Triangle)]
    pub sample: SampleKind,

    /// Run updates at a fixed rate instead of once per frame.
    #[arg(long, value_name = "HZ", value_parser = clap::value_parser!(u32).range(1..=1000))]
    pub fixed_fps: Option<u32>,

    /// Directory to load textures from; procedural stand-ins are used otherwise.
    #[arg(long, value_name = "DIR")]
    pub content: Option<PathBuf>,

    /// Log filter, `env_logger` syntax (overrides RUST_LOG).
    #[arg(long, value_name = "FILTER")]
    pub log: Option<String>,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long, default_value_t = 800, value_parser = clap::value_parser!(u32).range(320..))]
    pub width: u32,

    #[arg(long, default_value_t = 600, value_parser = clap::value_parser!(u32).range(200..))]
    pub height: u32,
}

impl Args {
    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            env_filter: self.log.clone(),
            ..LoggingConfig::default()
        }
    }

    pub fn timer_config(&self) -> TimerConfig {
        match self.fixed_fps {
            Some(hz) => TimerConfig::fixed(hz),
            None => TimerConfig::default(),
        }
    }

    pub fn runtime_config(&self) -> RuntimeConfig {
        let title = match (&self.title, self.sample) {
            (Some(title), _) => title.clone(),
            (None, SampleKind::Triangle) => "framewright: normal-mapped triangle".to_string(),
            (None, SampleKind::Starfield) => "framewright: starfield".to_string(),
        };

        RuntimeConfig {
            title,
            initial_size: LogicalSize::new(self.width as f64, self.height as f64),
            ..RuntimeConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("framewright-samples").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_to_variable_step_triangle() {
        let args = parse(&[]).unwrap();

        assert_eq!(args.sample, SampleKind::Triangle);
        assert!(!args.timer_config().fixed_time_step);
        assert_eq!(args.content, None);

        let runtime = args.runtime_config();
        assert_eq!(runtime.initial_size, LogicalSize::new(800.0, 600.0));
        assert_eq!(runtime.min_size, LogicalSize::new(320.0, 200.0));
    }

    #[test]
    fn fixed_fps_enables_fixed_step() {
        let args = parse(&["--fixed-fps", "30", "--sample", "starfield"]).unwrap();

        let timer = args.timer_config();
        assert!(timer.fixed_time_step);
        assert_eq!(timer.target_elapsed, Duration::from_secs(1) / 30);
        assert_eq!(args.sample, SampleKind::Starfield);
        assert_eq!(args.runtime_config().title, "framewright: starfield");
    }

    #[test]
    fn rejects_sizes_below_minimum() {
        assert!(parse(&["--width", "100"]).is_err());
        assert!(parse(&["--height", "199"]).is_err());
        assert!(parse(&["--width", "320", "--height", "200"]).is_ok());
    }

    #[test]
    fn rejects_zero_fixed_fps_and_unknown_sample() {
        assert!(parse(&["--fixed-fps", "0"]).is_err());
        assert!(parse(&["--sample", "teapot"]).is_err());
    }

    #[test]
    fn fixed_fps_is_capped() {
        assert!(parse(&["--fixed-fps", "4294967295"]).is_err());
        assert!(parse(&["--fixed-fps", "1001"]).is_err());

        let args = parse(&["--fixed-fps", "1000"]).unwrap();
        assert_eq!(args.timer_config().target_elapsed, Duration::from_millis(1));
    }

    #[test]
    fn explicit_title_and_log_filter() {
        let args = parse(&["--title", "demo", "--log", "debug", "--content", "assets"]).unwrap();

        assert_eq!(args.runtime_config().title, "demo");
        assert_eq!(args.logging_config().env_filter.as_deref(), Some("debug"));
        assert_eq!(args.content, Some(PathBuf::from("assets")));
    }
}
