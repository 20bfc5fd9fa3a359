use anyhow::Result;
use clap::Parser;

use framewright_engine::device::GpuInit;
use framewright_engine::logging::init_logging;
use framewright_engine::window::Runtime;

use framewright_samples::cli::{Args, SampleKind};
use framewright_samples::content::ContentSource;
use framewright_samples::starfield::StarfieldScene;
use framewright_samples::triangle::NormalMappedTriangle;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.logging_config());

    let content = ContentSource::new(args.content.clone());
    let runtime = args.runtime_config();
    let timer = args.timer_config();

    log::info!(
        "starting {:?} sample ({}x{}, {})",
        args.sample,
        args.width,
        args.height,
        match args.fixed_fps {
            Some(hz) => format!("fixed {hz} Hz"),
            None => "variable step".to_string(),
        }
    );

    match args.sample {
        SampleKind::Triangle => Runtime::run(
            runtime,
            GpuInit::default(),
            timer,
            NormalMappedTriangle::new(content),
        ),
        SampleKind::Starfield => Runtime::run(
            runtime,
            GpuInit::default(),
            timer,
            StarfieldScene::new(content),
        ),
    }
}
