use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::process::ExitCode;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use frame_encoder::{
    config::{CodecRegistry, Settings},
    driver::{EncodePipeline, EncodeSummary, ProgressMarks},
    ffmpeg::FfmpegBackend,
    session::EncoderBackend,
};

mod cli;

use cli::Cli;

fn init_logging() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .filter_module("frame_encoder", log::LevelFilter::Info)
        .filter_module("simple_encoder", log::LevelFilter::Info)
        .parse_default_env()
        .init();
}

fn run(cli: &Cli, settings: Settings) -> anyhow::Result<EncodeSummary> {
    frame_encoder::init()?;
    let backend = FfmpegBackend::new(settings.codec.clone());
    println!("Using {}", backend.name());

    let input = File::open(&cli.infile)
        .with_context(|| format!("Failed to open {} for reading", cli.infile.display()))?;
    let output = File::create(&cli.outfile)
        .with_context(|| format!("Failed to open {} for writing", cli.outfile.display()))?;

    let mut pipeline =
        EncodePipeline::new(&backend, settings).with_progress(ProgressMarks::new(io::stdout()));
    let summary = pipeline
        .run(BufReader::new(input), BufWriter::new(output))
        .with_context(|| format!("Failed to encode {}", cli.infile.display()))?;

    println!();
    println!("Processed {} frames.", summary.frames_processed);
    Ok(summary)
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let settings = match cli.settings(&CodecRegistry::default()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("{}", Cli::command().render_usage());
            return ExitCode::FAILURE;
        }
    };

    match run(&cli, settings) {
        Ok(summary) => {
            log::info!(
                "wrote {} packets ({} keyframes, {} bytes) to {}",
                summary.packets_written,
                summary.keyframes_written,
                summary.bytes_written,
                cli.outfile.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
