//! CLI for enginedoctor: hold the phone to the engine, get a turbulence score.

mod commands;

use clap::{Parser, Subcommand};

use commands::ParamArgs;

#[derive(Parser)]
#[command(name = "enginedoctor")]
#[command(about = "enginedoctor — score engine sound for rhythmic turbulence")]
#[command(version = enginedoctor_core::VERSION)]
struct Cli {
    /// More log output (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Diagnose a recording on disk (.wav natively, anything else via ffmpeg)
    Diagnose {
        /// Path to the recording
        path: String,

        #[command(flatten)]
        params: ParamArgs,

        /// Output view: summary (default) or detailed (per-chunk scores)
        #[arg(long, default_value = "summary", value_parser = ["summary", "detailed"])]
        view: String,

        /// Write the full report as JSON
        #[arg(long)]
        output: Option<String>,

        /// Include a decimated waveform in the JSON report
        #[arg(long)]
        preview: bool,
    },

    /// Record from the microphone, then diagnose
    Record {
        /// Recording length (e.g. "5", "5s", "500ms")
        #[arg(long, default_value = "5s")]
        duration: String,

        /// Capture sample rate in Hz
        #[arg(long, default_value = "44100")]
        sample_rate: u32,

        /// Also keep the recording as a 16-bit WAV file
        #[arg(long)]
        save: Option<String>,

        #[command(flatten)]
        params: ParamArgs,

        /// Output view: summary (default) or detailed (per-chunk scores)
        #[arg(long, default_value = "summary", value_parser = ["summary", "detailed"])]
        view: String,

        /// Write the full report as JSON
        #[arg(long)]
        output: Option<String>,
    },

    /// Write a synthetic engine recording for calibration
    Synth {
        /// Output WAV path
        path: String,

        /// steady (healthy tone), rough (one quiet chunk) or misfire (dropout across two chunks)
        #[arg(long, default_value = "steady", value_parser = ["steady", "rough", "misfire"])]
        kind: String,

        /// Length in seconds
        #[arg(long, default_value = "1.0")]
        seconds: f64,

        /// Sample rate in Hz
        #[arg(long, default_value = "44100")]
        sample_rate: u32,

        /// Tone frequency in Hz
        #[arg(long, default_value = "440.0")]
        freq: f64,

        /// Noise seed
        #[arg(long, default_value = "1")]
        seed: u64,
    },

    /// List audio sources and whether they work on this machine
    Sources,

    /// Start an HTTP diagnosis server
    Server {
        /// Port to listen on
        #[arg(long, default_value = "8043")]
        port: u16,

        /// Bind address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Largest accepted request, in interleaved samples
        #[arg(long, default_value_t = enginedoctor_server::DEFAULT_MAX_SAMPLES)]
        max_samples: usize,

        #[command(flatten)]
        params: ParamArgs,
    },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Diagnose {
            path,
            params,
            view,
            output,
            preview,
        } => commands::diagnose::run(commands::diagnose::DiagnoseCommandConfig {
            path: &path,
            params: commands::params_or_exit(&params),
            view: &view,
            output_path: output.as_deref(),
            include_preview: preview,
        }),
        Commands::Record {
            duration,
            sample_rate,
            save,
            params,
            view,
            output,
        } => commands::record::run(commands::record::RecordCommandConfig {
            duration: &duration,
            sample_rate,
            save_path: save.as_deref(),
            params: commands::params_or_exit(&params),
            view: &view,
            output_path: output.as_deref(),
        }),
        Commands::Synth {
            path,
            kind,
            seconds,
            sample_rate,
            freq,
            seed,
        } => commands::synth::run(commands::synth::SynthCommandConfig {
            path: &path,
            kind: &kind,
            seconds,
            sample_rate,
            freq_hz: freq,
            seed,
        }),
        Commands::Sources => commands::sources::run(),
        Commands::Server {
            port,
            host,
            max_samples,
            params,
        } => commands::server::run(&host, port, commands::params_or_exit(&params), max_samples),
    }
}
