use clap::{Args, Parser, Subcommand};
use scalematch::io::{load_gray_image, save_gray_image, ImageFileSink};
use scalematch::{
    EdgeConfig, KernelChoice, LocateConfig, Locator, MatchBox, MatchCandidate, MatchConfig,
    MatchResult, Outcome, ScaleMatchError, ScaleRange,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

const EXIT_FOUND: u8 = 0;
const EXIT_NOT_FOUND: u8 = 1;
const EXIT_INPUT: u8 = 3;
const EXIT_NO_VALID_SCALE: u8 = 4;
const EXIT_INTERNAL: u8 = 5;

#[derive(Parser, Debug)]
#[command(author, version, about = "Scale-invariant template locator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
    /// Enable tracing output on stderr for performance profiling.
    #[arg(long, global = true)]
    trace: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Locate TEMPLATE inside IMAGE and print the decision as JSON.
    Locate(LocateArgs),
    /// Cut a grayscale template patch out of a screenshot.
    Crop(CropArgs),
    /// Print an example config and exit.
    PrintExample,
    /// Print the JSON schema of the config and exit.
    PrintSchema,
}

#[derive(Args, Debug)]
struct LocateArgs {
    /// Template image (the pattern to find).
    template: PathBuf,
    /// Target image (the screenshot to search).
    image: PathBuf,
    /// Decision threshold; overrides the config file.
    #[arg(long)]
    thresh: Option<f32>,
    /// Write the target with the match box drawn when a match is found.
    #[arg(long, value_name = "OUT")]
    debug: Option<PathBuf>,
    /// Path to a JSON configuration file.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct CropArgs {
    /// Source screenshot.
    image: PathBuf,
    #[arg(long)]
    x: usize,
    #[arg(long)]
    y: usize,
    #[arg(long)]
    width: usize,
    #[arg(long)]
    height: usize,
    /// Output path for the cropped template.
    #[arg(long, value_name = "FILE")]
    out: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum KernelConfig {
    Auto,
    Dense,
    Sparse,
}

impl From<KernelConfig> for KernelChoice {
    fn from(value: KernelConfig) -> Self {
        match value {
            KernelConfig::Auto => KernelChoice::Auto,
            KernelConfig::Dense => KernelChoice::Dense,
            KernelConfig::Sparse => KernelChoice::Sparse,
        }
    }
}

#[derive(Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Config {
    threshold: f32,
    min_scale: f64,
    max_scale: f64,
    step: f64,
    low_threshold: f32,
    high_threshold: f32,
    blur: bool,
    parallel: bool,
    kernel: KernelConfig,
    time_budget_ms: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        let cfg = LocateConfig::default();
        Self {
            threshold: cfg.threshold,
            min_scale: cfg.search.scales.min_scale,
            max_scale: cfg.search.scales.max_scale,
            step: cfg.search.scales.step,
            low_threshold: cfg.edge.low_threshold,
            high_threshold: cfg.edge.high_threshold,
            blur: cfg.edge.blur,
            parallel: cfg.search.parallel,
            kernel: KernelConfig::Auto,
            time_budget_ms: None,
        }
    }
}

impl Config {
    fn into_locate_config(self) -> LocateConfig {
        LocateConfig {
            edge: EdgeConfig {
                blur: self.blur,
                low_threshold: self.low_threshold,
                high_threshold: self.high_threshold,
            },
            search: MatchConfig {
                scales: ScaleRange {
                    min_scale: self.min_scale,
                    max_scale: self.max_scale,
                    step: self.step,
                },
                kernel: self.kernel.into(),
                parallel: self.parallel,
                time_budget: self.time_budget_ms.map(Duration::from_millis),
                ..MatchConfig::default()
            },
            threshold: self.threshold,
        }
    }
}

#[derive(Debug, Serialize)]
struct CandidateRecord {
    score: f32,
    scale: f64,
    width: usize,
    height: usize,
    x: usize,
    y: usize,
}

impl From<MatchCandidate> for CandidateRecord {
    fn from(value: MatchCandidate) -> Self {
        Self {
            score: value.score,
            scale: value.scale,
            width: value.width,
            height: value.height,
            x: value.x,
            y: value.y,
        }
    }
}

#[derive(Debug, Serialize)]
struct BoxRecord {
    x: usize,
    y: usize,
    w: usize,
    h: usize,
}

impl From<MatchBox> for BoxRecord {
    fn from(value: MatchBox) -> Self {
        Self {
            x: value.x,
            y: value.y,
            w: value.w,
            h: value.h,
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    found: bool,
    best: CandidateRecord,
    threshold: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    match_box: Option<BoxRecord>,
}

impl From<MatchResult> for Output {
    fn from(value: MatchResult) -> Self {
        Self {
            found: value.found,
            best: value.best.into(),
            threshold: value.threshold,
            match_box: value.match_box.map(BoxRecord::from),
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Match(#[from] ScaleMatchError),
    #[error("failed to encode output: {0}")]
    Output(#[from] serde_json::Error),
    #[error("failed to initialize tracing: {0}")]
    Tracing(String),
}

impl CliError {
    fn exit_code(&self) -> u8 {
        match self {
            Self::ConfigRead { .. } | Self::ConfigParse { .. } => EXIT_INPUT,
            Self::Match(err) => match err {
                ScaleMatchError::NoValidScale { .. } => EXIT_NO_VALID_SCALE,
                ScaleMatchError::DebugWrite { .. } => EXIT_INTERNAL,
                ScaleMatchError::InvalidDimensions { .. }
                | ScaleMatchError::InvalidStride { .. }
                | ScaleMatchError::BufferTooSmall { .. }
                | ScaleMatchError::RoiOutOfBounds { .. }
                | ScaleMatchError::InvalidImage { .. }
                | ScaleMatchError::InvalidConfig { .. } => EXIT_INPUT,
            },
            Self::Output(_) | Self::Tracing(_) => EXIT_INTERNAL,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = init_tracing(cli.trace).and_then(|()| run(cli.command));
    match result {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

fn init_tracing(enabled: bool) -> Result<(), CliError> {
    if !enabled {
        return Ok(());
    }
    let directive = "scalematch=info"
        .parse()
        .map_err(|err| CliError::Tracing(format!("{err}")))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn run(command: Command) -> Result<u8, CliError> {
    match command {
        Command::Locate(args) => locate(args),
        Command::Crop(args) => crop(args),
        Command::PrintExample => {
            println!("{EXAMPLE_JSON}");
            Ok(EXIT_FOUND)
        }
        Command::PrintSchema => {
            println!("{SCHEMA_JSON}");
            Ok(EXIT_FOUND)
        }
    }
}

fn load_config(args: &LocateArgs) -> Result<LocateConfig, CliError> {
    let config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str(&text).map_err(|source| CliError::ConfigParse {
                path: path.clone(),
                source,
            })?
        }
        None => Config::default(),
    };
    let mut cfg = config.into_locate_config();
    if let Some(thresh) = args.thresh {
        cfg.threshold = thresh;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn locate(args: LocateArgs) -> Result<u8, CliError> {
    let cfg = load_config(&args)?;
    let template = load_gray_image(&args.template)?;
    let image = load_gray_image(&args.image)?;
    let locator = Locator::new().with_config(cfg);

    let outcome = match &args.debug {
        Some(path) => {
            let mut sink = ImageFileSink::new(path);
            let report = locator.locate_with_sink(image.view(), template.view(), &mut sink)?;
            if let Some(err) = &report.debug_error {
                eprintln!("warning: {err}");
            }
            report.outcome
        }
        None => locator.locate(image.view(), template.view())?,
    };

    let code = match outcome {
        Outcome::Found(_) => EXIT_FOUND,
        Outcome::NotFound(_) => EXIT_NOT_FOUND,
    };
    let output = Output::from(outcome.into_result());
    println!("{}", serde_json::to_string(&output)?);
    Ok(code)
}

fn crop(args: CropArgs) -> Result<u8, CliError> {
    let image = load_gray_image(&args.image)?;
    let view = image.view();
    let patch = view.roi(args.x, args.y, args.width, args.height)?;
    save_gray_image(patch, &args.out)?;
    tracing::info!(
        x = args.x,
        y = args.y,
        width = args.width,
        height = args.height,
        out = %args.out.display(),
        "template cropped"
    );
    Ok(EXIT_FOUND)
}

#[cfg(test)]
mod tests {
    use super::{CliError, Config, KernelConfig, Output, EXIT_INPUT, EXIT_NO_VALID_SCALE};
    use scalematch::{decide, KernelChoice, MatchCandidate, ScaleMatchError};
    use std::time::Duration;

    fn candidate(score: f32) -> MatchCandidate {
        MatchCandidate {
            score,
            scale: 0.8,
            width: 16,
            height: 16,
            x: 50,
            y: 60,
        }
    }

    #[test]
    fn empty_config_uses_library_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        let cfg = config.into_locate_config();
        assert_eq!(cfg, scalematch::LocateConfig::default());
    }

    #[test]
    fn example_config_parses() {
        let config: Config = serde_json::from_str(super::EXAMPLE_JSON).unwrap();
        assert_eq!(config.kernel, KernelConfig::Auto);
        assert_eq!(config.threshold, 0.7);
    }

    #[test]
    fn partial_config_overrides_selected_fields() {
        let text = r#"{"max_scale": 2.0, "kernel": "sparse", "time_budget_ms": 250}"#;
        let config: Config = serde_json::from_str(text).unwrap();
        let cfg = config.into_locate_config();
        assert_eq!(cfg.search.scales.max_scale, 2.0);
        assert_eq!(cfg.search.scales.min_scale, 0.4);
        assert_eq!(cfg.search.kernel, KernelChoice::Sparse);
        assert_eq!(cfg.search.time_budget, Some(Duration::from_millis(250)));
    }

    #[test]
    fn unknown_config_fields_are_rejected() {
        assert!(serde_json::from_str::<Config>(r#"{"treshold": 0.5}"#).is_err());
    }

    #[test]
    fn error_classes_map_to_exit_codes() {
        let no_scale = CliError::Match(ScaleMatchError::NoValidScale {
            template_width: 100,
            template_height: 100,
            target_width: 30,
            target_height: 30,
        });
        assert_eq!(no_scale.exit_code(), EXIT_NO_VALID_SCALE);

        let unreadable = CliError::Match(ScaleMatchError::InvalidImage {
            reason: "missing.png: not found".to_string(),
        });
        assert_eq!(unreadable.exit_code(), EXIT_INPUT);

        let bad_config = CliError::Match(ScaleMatchError::InvalidConfig {
            reason: "scale step must be > 0",
        });
        assert_eq!(bad_config.exit_code(), EXIT_INPUT);
    }

    #[test]
    fn match_box_is_omitted_when_not_found() {
        let json = serde_json::to_value(Output::from(decide(candidate(0.4), 0.7))).unwrap();
        assert_eq!(json["found"], false);
        assert!(json.get("match_box").is_none());
        assert_eq!(json["best"]["x"], 50);

        let json = serde_json::to_value(Output::from(decide(candidate(0.9), 0.7))).unwrap();
        assert_eq!(json["found"], true);
        assert_eq!(json["match_box"]["w"], 16);
        assert_eq!(json["match_box"]["y"], 60);
    }
}
