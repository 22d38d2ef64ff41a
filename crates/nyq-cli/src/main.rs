//! Nyquist Sampling Explorer Command-Line Interface
//!
//! This CLI provides tools for:
//! - Composing test signals from sinusoidal terms
//! - Finding dominant frequencies and the Nyquist-valid sampling range
//! - Sampling, adding noise and reconstructing a signal
//! - Sweeping the sampling rate to see where reconstruction breaks down
//!
//! Signals are read and written as `Time,Signal` tables.

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use nyq_core::analysis::statistics::SignalStats;
use nyq_core::analysis::{folded_frequency, DominantFrequencySet};
use nyq_core::io::{read_signal_file, write_signal_file};
use nyq_core::reconstruct::ReconstructionMethod;
use nyq_core::sampling::SamplingBounds;
use nyq_core::synth::{
    generated_file_name, validate_terms, SignalSynthesizer, TermSpec, DEFAULT_DURATION,
    DEFAULT_SAMPLE_RATE,
};
use nyq_core::types::Signal;
use nyq_sim::noise::{NoiseSpec, SnrScale};
use nyq_sim::pipeline::{
    analyze, sweep_rates, AnalysisConfig, Experiment, ExperimentConfig, ExperimentOutput,
    SweepPoint,
};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "nyq")]
#[command(author, version, about = "Nyquist sampling and reconstruction explorer", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Where the signal comes from: a table file or inline terms
#[derive(Args, Debug, Clone)]
struct SignalSource {
    /// Input signal table (Time,Signal)
    #[arg(short, long, conflicts_with = "term")]
    input: Option<PathBuf>,

    /// Sinusoidal term as frequency:amplitude[:phase_degrees] (repeatable)
    #[arg(short, long)]
    term: Vec<String>,

    /// Sample rate for inline terms in Hz
    #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
    sample_rate: f64,

    /// Duration for inline terms in seconds
    #[arg(long, default_value_t = DEFAULT_DURATION)]
    duration: f64,
}

/// Noise settings shared by reconstruct and sweep
#[derive(Args, Debug, Clone)]
struct NoiseArgs {
    /// Noise SNR in dB
    #[arg(long, conflicts_with = "snr_percent")]
    snr_db: Option<f64>,

    /// Noise SNR as a percentage of the SNR scale (100 = no noise)
    #[arg(long)]
    snr_percent: Option<f64>,

    /// SNR at 0 %
    #[arg(long, default_value_t = 0.0)]
    snr_min_db: f64,

    /// SNR approached at 100 %
    #[arg(long, default_value_t = 100.0)]
    snr_max_db: f64,

    /// Noise seed for repeatable runs
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose a signal from sinusoidal terms and write it as a table
    Synth {
        /// Term as frequency:amplitude[:phase_degrees] (repeatable)
        #[arg(short, long, required = true)]
        term: Vec<String>,

        /// Sample rate in Hz
        #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
        sample_rate: f64,

        /// Duration in seconds
        #[arg(long, default_value_t = DEFAULT_DURATION)]
        duration: f64,

        /// Output file (defaults to generated_signal_<f>Hz_....csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Find dominant frequencies and the valid sampling range
    Analyze {
        #[command(flatten)]
        source: SignalSource,

        /// Minimum DFT magnitude of a peak
        #[arg(long)]
        threshold: Option<f64>,

        /// Keep only the strongest N frequencies
        #[arg(long)]
        max_frequencies: Option<usize>,

        /// Also print time-domain statistics
        #[arg(long)]
        stats: bool,

        /// Output format (text, json, csv)
        #[arg(long, default_value = "text")]
        format: String,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Sample, add noise and reconstruct a signal
    Reconstruct {
        #[command(flatten)]
        source: SignalSource,

        /// Sampling rate in Hz (defaults to the Nyquist-plus-one rate)
        #[arg(short, long)]
        rate: Option<f64>,

        /// Reconstruction method (sinc, zoh, lanczos[:a])
        #[arg(short, long)]
        method: Option<String>,

        #[command(flatten)]
        noise: NoiseArgs,

        /// Use the rate as given instead of clamping it into [1, 4·f_max]
        #[arg(long)]
        no_clamp: bool,

        /// Experiment configuration file (JSON); flags override its fields
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format (text, json, csv)
        #[arg(long, default_value = "text")]
        format: String,

        /// Write the result to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Reconstruct over a range of sampling rates and report the error
    Sweep {
        #[command(flatten)]
        source: SignalSource,

        /// Explicit rates in Hz (comma separated)
        #[arg(long, value_delimiter = ',')]
        rates: Vec<f64>,

        /// Number of evenly spaced rates across [1, 4·f_max]
        #[arg(long, default_value_t = 20)]
        steps: usize,

        /// Reconstruction method (sinc, zoh, lanczos[:a])
        #[arg(short, long)]
        method: Option<String>,

        #[command(flatten)]
        noise: NoiseArgs,

        /// Experiment configuration file (JSON); flags override its fields
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format (text, json, csv)
        #[arg(long, default_value = "text")]
        format: String,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn validate_format(format: &str) -> Result<&str> {
    match format {
        "text" | "json" | "csv" => Ok(format),
        _ => anyhow::bail!("Unknown output format: '{}'. Use: text, json, csv", format),
    }
}

fn parse_method(method: &str) -> Result<ReconstructionMethod> {
    method
        .parse()
        .with_context(|| format!("Invalid reconstruction method: {}", method))
}

fn parse_terms(terms: &[String]) -> Result<Vec<TermSpec>> {
    if terms.is_empty() {
        anyhow::bail!("At least one --term frequency:amplitude[:phase] is required");
    }
    Ok(terms.iter().map(|t| TermSpec::parse(t)).collect())
}

/// Resolve the noise flags into a spec; `None` when no noise flag was given
fn parse_noise(args: &NoiseArgs) -> Result<Option<NoiseSpec>> {
    if let Some(snr_db) = args.snr_db {
        return Ok(Some(NoiseSpec::with_snr_db(snr_db)));
    }
    match args.snr_percent {
        Some(percent) => {
            let scale = SnrScale::new(args.snr_min_db, args.snr_max_db)?;
            Ok(Some(scale.spec_for_percent(percent)?))
        }
        None => Ok(None),
    }
}

fn load_signal(source: &SignalSource) -> Result<Signal> {
    match &source.input {
        Some(path) => {
            let signal = read_signal_file(path)
                .with_context(|| format!("Failed to read signal table {:?}", path))?;
            info!("Loaded {} samples from {:?}", signal.len(), path);
            Ok(signal)
        }
        None => {
            let specs = parse_terms(&source.term)
                .context("Provide a signal with --input or one or more --term values")?;
            let signal = SignalSynthesizer::new(source.sample_rate, source.duration)
                .compose(&specs)
                .context("Failed to compose signal")?;
            info!("Composed {} samples from {} terms", signal.len(), specs.len());
            Ok(signal)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<ExperimentConfig> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {:?}", path))?;
            serde_json::from_str(&text).with_context(|| format!("Invalid config {:?}", path))
        }
        None => Ok(ExperimentConfig::default()),
    }
}

fn build_config(
    config_path: Option<&Path>,
    rate: Option<f64>,
    method: Option<&str>,
    noise: &NoiseArgs,
    no_clamp: bool,
) -> Result<ExperimentConfig> {
    let mut config = load_config(config_path)?;

    if let Some(rate) = rate {
        config.target_rate_hz = Some(rate);
    }
    if let Some(method) = method {
        config.method = parse_method(method)?;
    }
    if let Some(spec) = parse_noise(noise)? {
        config.noise = spec;
    }
    if noise.seed.is_some() {
        config.seed = noise.seed;
    }
    if no_clamp {
        config.clamp_to_bounds = false;
    }

    Ok(config)
}

fn emit(output: Option<PathBuf>, text: &str, what: &str) -> Result<()> {
    if let Some(output_path) = output {
        std::fs::write(&output_path, text)
            .with_context(|| format!("Failed to write {:?}", output_path))?;
        println!("{} written to {:?}", what, output_path);
    } else {
        println!("{}", text);
    }
    Ok(())
}

fn format_bounds(bounds: Option<&SamplingBounds>) -> String {
    match bounds {
        Some(b) => format!(
            "Sampling Range\n  Max dominant frequency: {:.2} Hz\n  Rate range:             {:.1} .. {:.1} Hz\n  Minimum valid rate:     {:.0} Hz\n",
            b.max_dominant_frequency, b.min_rate_hz, b.max_rate_hz, b.minimum_valid_rate
        ),
        None => "Sampling Range\n  No dominant frequency above threshold\n".to_string(),
    }
}

fn cmd_synth(terms: Vec<String>, sample_rate: f64, duration: f64, output: Option<PathBuf>) -> Result<()> {
    let specs = parse_terms(&terms)?;
    let validated = validate_terms(&specs)?;
    let signal = SignalSynthesizer::new(sample_rate, duration)
        .synthesize(&validated)
        .context("Failed to synthesize signal")?;

    let path = output.unwrap_or_else(|| PathBuf::from(generated_file_name(&validated)));
    write_signal_file(&path, &signal)
        .with_context(|| format!("Failed to write signal table {:?}", path))?;

    println!("Signal written to {:?}", path);
    println!("Samples: {} at {} Hz ({} s)", signal.len(), sample_rate, duration);
    Ok(())
}

fn cmd_analyze(
    source: SignalSource,
    threshold: Option<f64>,
    max_frequencies: Option<usize>,
    stats: bool,
    format: String,
    output: Option<PathBuf>,
) -> Result<()> {
    let format = validate_format(&format)?;
    let signal = load_signal(&source)?;

    let mut config = AnalysisConfig::default();
    if let Some(threshold) = threshold {
        config.threshold = threshold;
    }
    config.max_frequencies = max_frequencies;

    let analysis = analyze(&signal, &config)?;
    let signal_stats = SignalStats::compute(signal.amplitude(), Some(signal.sample_rate()));

    let output_text = match format {
        "json" => {
            let mut report = serde_json::json!({
                "num_samples": signal.len(),
                "sample_rate": signal.sample_rate(),
                "dominant": analysis.dominant.peaks(),
                "bounds": analysis.bounds,
            });
            if stats {
                report["stats"] = serde_json::to_value(&signal_stats)?;
            }
            serde_json::to_string_pretty(&report)?
        }
        "csv" => analysis.dominant.to_csv(),
        _ => {
            let mut text = String::new();
            if stats {
                text.push_str(&signal_stats.to_text());
                text.push('\n');
            }
            text.push_str(&analysis.dominant.to_text());
            if let Some((freq, mag)) = analysis.profile.find_peak() {
                text.push_str(&format!("Strongest bin: {:.2} Hz (|X| = {:.3})\n", freq.abs(), mag));
            }
            text.push('\n');
            text.push_str(&format_bounds(analysis.bounds.as_ref()));
            text
        }
    };

    emit(output, &output_text, "Analysis")
}

fn reconstruction_text(
    output: &ExperimentOutput,
    dominant: &DominantFrequencySet,
    bounds: Option<&SamplingBounds>,
    method: ReconstructionMethod,
) -> String {
    let rate = output.sampling.target_rate_hz;
    let mut text = String::new();
    text.push_str("Reconstruction\n");
    text.push_str(&"═".repeat(44));
    text.push('\n');
    text.push_str(&format!("  Method:              {}\n", method.name()));
    text.push_str(&format!("  Sampling rate:       {:.2} Hz\n", rate));
    if let Some(b) = bounds {
        text.push_str(&format!("  Rate / f_max:        {:.0} %\n", b.rate_percent(rate)));
    }
    if let Some(effective) = output.sparse.effective_rate() {
        text.push_str(&format!("  Effective rate:      {:.2} Hz\n", effective));
    }
    text.push_str(&format!(
        "  Samples kept:        {} (stride {})\n",
        output.sparse.len(),
        output.sparse.stride()
    ));
    text.push_str(&format!(
        "  Nyquist satisfied:   {}\n",
        if output.satisfies_nyquist { "yes" } else { "no" }
    ));
    if let Some(reason) = &output.reconstructed.fallback {
        text.push_str(&format!("  Fallback:            {}\n", reason));
    }
    text.push_str(&format!("  Baseline noise:      {:.6} (power)\n", output.noise_stats.noise_power));
    text.push_str(&format!("  Noise scale:         {:.3}\n", output.noise_scale));
    text.push_str(&format!("  RMSE:                {:.6}\n", output.error.rmse));
    text.push_str(&format!("  Max abs error:       {:.6}\n", output.error.max_abs_error));
    text.push_str(&format!("  Reconstruction SNR:  {:.2} dB\n", output.error.snr_db));
    text.push_str(&format!("  Noiseless RMSE:      {:.6}\n", output.clean_error.rmse));

    if !output.satisfies_nyquist && !dominant.is_empty() {
        text.push_str("\nApparent frequencies after sampling\n");
        for f in dominant.frequencies() {
            text.push_str(&format!(
                "  {:>8.2} Hz -> {:>8.2} Hz\n",
                f,
                folded_frequency(f, rate)
            ));
        }
    }
    text
}

fn reconstruction_csv(signal: &Signal, output: &ExperimentOutput) -> String {
    let mut csv = String::from("Time,Original,Noisy,Reconstructed,Degraded,Difference\n");
    for (i, (t, a)) in signal.iter().enumerate() {
        csv.push_str(&format!(
            "{},{},{},{},{},{}\n",
            t,
            a,
            output.noisy.amplitude()[i],
            output.reconstructed.amplitude[i],
            output.degraded.amplitude()[i],
            output.difference[i]
        ));
    }
    csv
}

#[allow(clippy::too_many_arguments)]
fn cmd_reconstruct(
    source: SignalSource,
    rate: Option<f64>,
    method: Option<String>,
    noise: NoiseArgs,
    no_clamp: bool,
    config: Option<PathBuf>,
    format: String,
    output: Option<PathBuf>,
) -> Result<()> {
    let format = validate_format(&format)?;
    let config = build_config(config.as_deref(), rate, method.as_deref(), &noise, no_clamp)?;
    let signal = load_signal(&source)?;

    let experiment = Experiment::new(signal, config)?;
    let result = experiment.run()?;

    let output_text = match format {
        "json" => serde_json::to_string_pretty(&result)?,
        "csv" => reconstruction_csv(experiment.signal(), &result),
        _ => reconstruction_text(
            &result,
            &experiment.analysis().dominant,
            experiment.bounds(),
            config.method,
        ),
    };

    emit(output, &output_text, "Reconstruction")
}

fn sweep_text(points: &[SweepPoint], bounds: Option<&SamplingBounds>, method: ReconstructionMethod) -> String {
    let mut text = String::new();
    text.push_str(&format!("Sampling Rate Sweep ({})\n", method.name()));
    text.push_str(&"═".repeat(62));
    text.push('\n');
    text.push_str(&format!(
        "{:>10}  {:>7}  {:>7}  {:>8}  {:>12}  {:>12}\n",
        "Rate (Hz)", "Stride", "Kept", "Nyquist", "RMSE", "Clean RMSE"
    ));
    text.push_str(&"─".repeat(62));
    text.push('\n');

    for p in points {
        text.push_str(&format!(
            "{:>10.2}  {:>7}  {:>7}  {:>8}  {:>12.6}  {:>12.6}{}\n",
            p.rate_hz,
            p.stride,
            p.num_samples,
            if p.satisfies_nyquist { "yes" } else { "no" },
            p.error.rmse,
            p.clean_error.rmse,
            if p.fallback { "  (zero fallback)" } else { "" }
        ));
    }

    if let Some(b) = bounds {
        text.push_str(&format!("\nMinimum valid rate: {:.0} Hz\n", b.minimum_valid_rate));
    }
    text
}

fn sweep_csv(points: &[SweepPoint]) -> String {
    let mut csv = String::from("rate_hz,stride,num_samples,satisfies_nyquist,fallback,rmse,max_abs_error,clean_rmse\n");
    for p in points {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{}\n",
            p.rate_hz,
            p.stride,
            p.num_samples,
            p.satisfies_nyquist,
            p.fallback,
            p.error.rmse,
            p.error.max_abs_error,
            p.clean_error.rmse
        ));
    }
    csv
}

#[allow(clippy::too_many_arguments)]
fn cmd_sweep(
    source: SignalSource,
    rates: Vec<f64>,
    steps: usize,
    method: Option<String>,
    noise: NoiseArgs,
    config: Option<PathBuf>,
    format: String,
    output: Option<PathBuf>,
) -> Result<()> {
    let format = validate_format(&format)?;
    let config = build_config(config.as_deref(), None, method.as_deref(), &noise, false)?;
    let signal = load_signal(&source)?;
    let experiment = Experiment::new(signal, config)?;

    let rates = if rates.is_empty() {
        let bounds = experiment.bounds().context(
            "Signal has no dominant frequency above threshold; pass explicit --rates",
        )?;
        sweep_rates(bounds, steps)
    } else {
        rates
    };
    info!("Sweeping {} rates with {}", rates.len(), config.method.name());

    let points = experiment.sweep(&rates)?;

    let output_text = match format {
        "json" => serde_json::to_string_pretty(&points)?,
        "csv" => sweep_csv(&points),
        _ => sweep_text(&points, experiment.bounds(), config.method),
    };

    emit(output, &output_text, "Sweep")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Synth {
            term,
            sample_rate,
            duration,
            output,
        } => cmd_synth(term, sample_rate, duration, output),

        Commands::Analyze {
            source,
            threshold,
            max_frequencies,
            stats,
            format,
            output,
        } => cmd_analyze(source, threshold, max_frequencies, stats, format, output),

        Commands::Reconstruct {
            source,
            rate,
            method,
            noise,
            no_clamp,
            config,
            format,
            output,
        } => cmd_reconstruct(source, rate, method, noise, no_clamp, config, format, output),

        Commands::Sweep {
            source,
            rates,
            steps,
            method,
            noise,
            config,
            format,
            output,
        } => cmd_sweep(source, rates, steps, method, noise, config, format, output),

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noise_args() -> NoiseArgs {
        NoiseArgs {
            snr_db: None,
            snr_percent: None,
            snr_min_db: 0.0,
            snr_max_db: 100.0,
            seed: None,
        }
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_noise() {
        assert_eq!(parse_noise(&noise_args()).unwrap(), None);

        let args = NoiseArgs {
            snr_db: Some(12.0),
            ..noise_args()
        };
        assert_eq!(parse_noise(&args).unwrap(), Some(NoiseSpec::with_snr_db(12.0)));

        let args = NoiseArgs {
            snr_percent: Some(100.0),
            ..noise_args()
        };
        assert_eq!(parse_noise(&args).unwrap(), Some(NoiseSpec::disabled()));

        let args = NoiseArgs {
            snr_percent: Some(25.0),
            snr_min_db: -20.0,
            snr_max_db: 20.0,
            ..noise_args()
        };
        assert_eq!(parse_noise(&args).unwrap(), Some(NoiseSpec::with_snr_db(-10.0)));
    }

    #[test]
    fn test_build_config_overrides() {
        let args = NoiseArgs {
            seed: Some(5),
            ..noise_args()
        };
        let config = build_config(None, Some(42.0), Some("lanczos:4"), &args, true).unwrap();
        assert_eq!(config.target_rate_hz, Some(42.0));
        assert_eq!(config.method, ReconstructionMethod::LanczosResampling { window: 4 });
        assert_eq!(config.seed, Some(5));
        assert!(!config.clamp_to_bounds);
        assert!(!config.noise.is_enabled());

        assert!(build_config(None, None, Some("cubic"), &noise_args(), false).is_err());
    }

    #[test]
    fn test_parse_cli() {
        let cli = Cli::try_parse_from([
            "nyq", "reconstruct", "--term", "5:1", "--term", "20:0.5:90", "--rate", "41",
            "--method", "zoh", "--snr-db", "20", "--format", "csv",
        ])
        .unwrap();
        match cli.command {
            Commands::Reconstruct { source, rate, method, noise, .. } => {
                assert_eq!(source.term, vec!["5:1", "20:0.5:90"]);
                assert_eq!(rate, Some(41.0));
                assert_eq!(method.as_deref(), Some("zoh"));
                assert_eq!(noise.snr_db, Some(20.0));
            }
            _ => panic!("expected reconstruct"),
        }

        assert!(Cli::try_parse_from(["nyq", "analyze", "-i", "a.csv", "-t", "5:1"]).is_err());
    }

    #[test]
    fn test_load_signal_from_terms() {
        let source = SignalSource {
            input: None,
            term: vec!["5:1".to_string()],
            sample_rate: 100.0,
            duration: 0.5,
        };
        assert_eq!(load_signal(&source).unwrap().len(), 50);

        let empty = SignalSource {
            term: Vec::new(),
            ..source
        };
        assert!(load_signal(&empty).is_err());
    }

    #[test]
    fn test_reconstruction_text_reports_rate_percent() {
        let source = SignalSource {
            input: None,
            term: vec!["5:1".to_string()],
            sample_rate: 1000.0,
            duration: 1.0,
        };
        let config = ExperimentConfig::default().with_rate(11.0);
        let experiment = Experiment::new(load_signal(&source).unwrap(), config).unwrap();
        let result = experiment.run().unwrap();

        let text = reconstruction_text(
            &result,
            &experiment.analysis().dominant,
            experiment.bounds(),
            ReconstructionMethod::SincInterpolation,
        );
        assert!(text.contains("Rate / f_max:        220 %"), "got:\n{}", text);
        // Stride 90 on a 1 ms grid
        assert!(text.contains("Effective rate:      11.11 Hz"), "got:\n{}", text);

        let bare = reconstruction_text(
            &result,
            &experiment.analysis().dominant,
            None,
            ReconstructionMethod::SincInterpolation,
        );
        assert!(!bare.contains("Rate / f_max"));
    }

    #[test]
    fn test_validate_format() {
        assert!(validate_format("json").is_ok());
        assert!(validate_format("png").is_err());
    }
}
