//! fitrack - Command-line interface for the fitness tracker core
//!
//! Commands:
//! - replay: Feed a recorded sensor stream through a tracker (batch mode)
//! - run: Process sensor events from stdin (streaming mode)
//! - reset: Start a new session in a state file
//! - status: Show the session stored in a state file
//! - validate: Validate sensor event schema
//! - doctor: Diagnose configuration and state files
//! - schema: Print schema information

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use fitness_tracker::metrics::StepMetrics;
use fitness_tracker::sensor::{SensorEvent, SensorEventReader, SCHEMA_VERSION};
use fitness_tracker::store::{load_session, JsonFileStore, KeyValueStore, MemoryStore, PREFS_NAME};
use fitness_tracker::types::DisplayFrame;
use fitness_tracker::{
    ChartKind, RebootPolicy, StepTracker, TrackerConfig, PRODUCER_NAME, TRACKER_VERSION,
};
use tracing_subscriber::EnvFilter;

/// fitrack - On-device step tracking core
#[derive(Parser)]
#[command(name = "fitrack")]
#[command(version = TRACKER_VERSION)]
#[command(about = "Turn step-counter sensor readings into step, distance and calorie displays", long_about = None)]
struct Cli {
    /// Log filter used when RUST_LOG is unset (e.g. "info", "fitness_tracker=debug")
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Feed a recorded sensor stream through a tracker (batch mode)
    Replay {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// State file holding the session offsets (loaded, then saved on exit)
        #[arg(long)]
        state: Option<PathBuf>,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Process sensor events from stdin (streaming mode)
    Run {
        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// State file holding the session offsets (loaded, then saved on exit)
        #[arg(long)]
        state: Option<PathBuf>,

        /// Buffer output instead of flushing after each frame
        #[arg(long)]
        no_flush: bool,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Start a new session in a state file
    Reset {
        /// State file to reset [default: FitnessPrefs.json]
        #[arg(long)]
        state: Option<PathBuf>,

        /// Output the cleared frame as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the session stored in a state file
    Status {
        /// State file to read [default: FitnessPrefs.json]
        #[arg(long)]
        state: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Validate sensor event schema
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose configuration and state files
    Doctor {
        /// Check a state file
        #[arg(long)]
        state: Option<PathBuf>,

        /// Check a configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,

        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },
}

/// Tracker configuration: a JSON file plus per-field overrides
#[derive(Args)]
struct ConfigArgs {
    /// Configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stride length in meters
    #[arg(long)]
    stride_length: Option<f64>,

    /// Body weight in kg
    #[arg(long)]
    weight: Option<f64>,

    /// Daily step goal
    #[arg(long)]
    daily_goal: Option<u64>,

    /// Append a chart point every N events
    #[arg(long)]
    chart_every: Option<u32>,

    /// Number of chart points kept
    #[arg(long)]
    history_capacity: Option<usize>,

    /// Include the goal progress indicator
    #[arg(long)]
    progress: bool,

    /// Chart style
    #[arg(long)]
    chart_kind: Option<ChartKindArg>,

    /// Omit the chart
    #[arg(long)]
    no_chart: bool,

    /// How to handle a sensor counter that went backwards
    #[arg(long)]
    reboot_policy: Option<RebootPolicyArg>,

    /// Simulate a device without a step counter
    #[arg(long)]
    no_sensor: bool,
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one event per line)
    Ndjson,
    /// JSON array of events
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one frame per line)
    Ndjson,
    /// JSON array of frames
    Json,
    /// Pretty-printed JSON
    JsonPretty,
    /// Text fields as the screen shows them
    Text,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Input schema (step.sensor_event.v1)
    Input,
    /// Output schema (display frame)
    Output,
}

#[derive(Clone, ValueEnum)]
enum ChartKindArg {
    Line,
    Bar,
}

#[derive(Clone, ValueEnum)]
enum RebootPolicyArg {
    Clamp,
    Rebaseline,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .try_init();
}

fn run(cli: Cli) -> Result<(), FitrackCliError> {
    match cli.command {
        Commands::Replay {
            input,
            output,
            input_format,
            output_format,
            state,
            config,
        } => cmd_replay(&input, &output, input_format, output_format, state.as_deref(), &config),

        Commands::Run {
            output_format,
            state,
            no_flush,
            config,
        } => cmd_run(output_format, state.as_deref(), !no_flush, &config),

        Commands::Reset { state, json } => {
            cmd_reset(&state.unwrap_or_else(default_state_path), json)
        }

        Commands::Status {
            state,
            json,
            config,
        } => cmd_status(&state.unwrap_or_else(default_state_path), json, &config),

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Doctor {
            state,
            config,
            json,
        } => cmd_doctor(state.as_deref(), config.as_deref(), json),

        Commands::Schema {
            schema_type,
            json_schema,
        } => cmd_schema(schema_type, json_schema),
    }
}

fn cmd_replay(
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
    state: Option<&Path>,
    config_args: &ConfigArgs,
) -> Result<(), FitrackCliError> {
    let input_data = read_input(input)?;

    let events = match input_format {
        InputFormat::Ndjson => SensorEventReader::parse_ndjson(&input_data)?,
        InputFormat::Json => SensorEventReader::parse_array(&input_data)?,
    };

    if events.is_empty() {
        return Err(FitrackCliError::NoEvents);
    }

    let mut tracker = build_tracker(config_args, state)?;
    tracker.resume();

    let frames = replay_events(&mut tracker, &events)?;
    report_notices(&mut tracker);

    if frames.is_empty() {
        return Err(FitrackCliError::NoFrames);
    }

    let output_data = format_output(&frames, &output_format)?;

    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_run(
    output_format: OutputFormat,
    state: Option<&Path>,
    flush: bool,
    config_args: &ConfigArgs,
) -> Result<(), FitrackCliError> {
    let mut tracker = build_tracker(config_args, state)?;
    tracker.resume();
    report_notices(&mut tracker);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    stream_events(&mut tracker, stdin.lock(), &mut stdout, &output_format, flush)
}

/// Replay a batch, then persist whatever the events before a failure produced
fn replay_events(
    tracker: &mut StepTracker,
    events: &[SensorEvent],
) -> Result<Vec<DisplayFrame>, FitrackCliError> {
    let replayed = tracker.replay(events);
    let saved = tracker.pause();
    let frames = replayed?;
    saved?;
    Ok(frames)
}

/// Stream NDJSON events into the tracker and frames out, then pause.
///
/// The tracker is paused (and its offsets saved) even when the stream stops
/// on a bad line, so the state file matches the last frame written.
fn stream_events<R: BufRead, W: Write>(
    tracker: &mut StepTracker,
    input: R,
    out: &mut W,
    output_format: &OutputFormat,
    flush: bool,
) -> Result<(), FitrackCliError> {
    let streamed = write_frames(tracker, input, out, output_format, flush);
    let saved = tracker.pause();
    streamed?;
    saved?;
    Ok(())
}

fn write_frames<R: BufRead, W: Write>(
    tracker: &mut StepTracker,
    input: R,
    out: &mut W,
    output_format: &OutputFormat,
    flush: bool,
) -> Result<(), FitrackCliError> {
    let mut frames: Vec<DisplayFrame> = Vec::new();

    for line in input.lines() {
        let line = line?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        let event: SensorEvent = serde_json::from_str(trimmed).map_err(|e| {
            FitrackCliError::ParseError(format!("Failed to parse event: {}", e))
        })?;

        let Some(frame) = tracker.on_sensor_event(&event)? else {
            continue;
        };

        match output_format {
            OutputFormat::Json | OutputFormat::JsonPretty => frames.push(frame),
            OutputFormat::Ndjson | OutputFormat::Text => {
                let rendered = format_output(std::slice::from_ref(&frame), output_format)?;
                write!(out, "{}", rendered)?;
                if flush {
                    out.flush()?;
                }
            }
        }
    }

    if !frames.is_empty() {
        write!(out, "{}", format_output(&frames, output_format)?)?;
    }
    out.flush()?;
    Ok(())
}

fn cmd_reset(state: &Path, json: bool) -> Result<(), FitrackCliError> {
    let store = JsonFileStore::open(state)?;
    let mut tracker = StepTracker::new(TrackerConfig::default(), Box::new(store), true)?;

    let frame = tracker.reset()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&frame)?);
    } else {
        println!(
            "Session reset at {} cumulative steps",
            tracker.state().previous_total_steps
        );
        print!("{}", render_text(&frame));
    }

    Ok(())
}

fn cmd_status(state: &Path, json: bool, config_args: &ConfigArgs) -> Result<(), FitrackCliError> {
    if !state.exists() {
        return Err(FitrackCliError::MissingState(state.display().to_string()));
    }

    let config = build_config(config_args)?;
    let store = JsonFileStore::open(state)?;
    let session = load_session(&store)?;
    let metrics = StepMetrics::derive(session.current_steps(), &config);

    let report = StatusReport {
        total_steps: session.total_steps,
        previous_total_steps: session.previous_total_steps,
        current_steps: metrics.steps,
        distance_km: metrics.distance_km,
        calories_kcal: metrics.calories_kcal,
        progress_percent: metrics.progress_percent,
        daily_goal: config.daily_goal,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Session Status");
        println!("==============");
        println!("Cumulative steps: {}", report.total_steps);
        println!("Session offset:   {}", report.previous_total_steps);
        println!("{}", metrics.steps_text());
        println!("{}", metrics.distance_text());
        println!("{}", metrics.calories_text());
        println!("Progress: {}% of {}", report.progress_percent, report.daily_goal);
    }

    Ok(())
}

fn cmd_validate(input: &Path, input_format: InputFormat, json: bool) -> Result<(), FitrackCliError> {
    let input_data = read_input(input)?;

    let events = match input_format {
        InputFormat::Ndjson => SensorEventReader::parse_ndjson(&input_data)?,
        InputFormat::Json => SensorEventReader::parse_array(&input_data)?,
    };

    let results = SensorEventReader::validate_events(&events);

    let report = ValidationReport {
        total_events: events.len(),
        step_events: events.iter().filter(|e| e.is_step_counter()).count(),
        valid_events: events.len() - results.len(),
        invalid_events: results.len(),
        errors: results
            .iter()
            .map(|r| ValidationErrorDetail {
                index: r.index,
                event_id: r.event_id.clone(),
                error: r.error.to_string(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total events:   {}", report.total_events);
        println!("Step events:    {}", report.step_events);
        println!("Valid events:   {}", report.valid_events);
        println!("Invalid events: {}", report.invalid_events);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!(
                    "  - Event {} (index {}): {}",
                    err.event_id.as_deref().unwrap_or("unknown"),
                    err.index,
                    err.error
                );
            }
        }
    }

    if report.invalid_events > 0 {
        Err(FitrackCliError::ValidationFailed(report.invalid_events))
    } else {
        Ok(())
    }
}

fn cmd_doctor(state: Option<&Path>, config: Option<&Path>, json: bool) -> Result<(), FitrackCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "tracker_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("fitness-tracker version {}", TRACKER_VERSION),
    });

    checks.push(DoctorCheck {
        name: "schema_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Input schema: {}", SCHEMA_VERSION),
    });

    if let Some(config_path) = config {
        let check = match fs::read_to_string(config_path) {
            Ok(content) => match TrackerConfig::from_json(&content) {
                Ok(cfg) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Ok,
                    message: format!(
                        "Config valid (goal {}, stride {} m, weight {} kg)",
                        cfg.daily_goal, cfg.stride_length_m, cfg.weight_kg
                    ),
                },
                Err(e) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Invalid config: {}", e),
                },
            },
            Err(e) => DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Error,
                message: format!("Cannot read config file: {}", e),
            },
        };
        checks.push(check);
    }

    if let Some(state_path) = state {
        let check = if state_path.exists() {
            match JsonFileStore::open(state_path).and_then(|store| load_session(&store)) {
                Ok(session) if session.total_steps < session.previous_total_steps => DoctorCheck {
                    name: "state".to_string(),
                    status: CheckStatus::Warning,
                    message: format!(
                        "Offset {} is above the last cumulative count {} (device rebooted?)",
                        session.previous_total_steps, session.total_steps
                    ),
                },
                Ok(session) => DoctorCheck {
                    name: "state".to_string(),
                    status: CheckStatus::Ok,
                    message: format!(
                        "State file valid ({} steps this session)",
                        session.current_steps()
                    ),
                },
                Err(e) => DoctorCheck {
                    name: "state".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Invalid state file: {}", e),
                },
            }
        } else {
            DoctorCheck {
                name: "state".to_string(),
                status: CheckStatus::Warning,
                message: "State file does not exist (a fresh session will start at 0)".to_string(),
            }
        };
        checks.push(check);
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (streaming mode ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: TRACKER_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("fitrack Doctor Report");
        println!("=====================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(FitrackCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn cmd_schema(schema_type: SchemaType, json_schema: bool) -> Result<(), FitrackCliError> {
    match schema_type {
        SchemaType::Input => {
            if json_schema {
                println!("{}", get_input_json_schema());
            } else {
                println!("Input Schema: {}", SCHEMA_VERSION);
                println!();
                println!("One platform sensor callback per record:");
                println!("- schema_version: {}", SCHEMA_VERSION);
                println!("- event_id: optional unique id");
                println!("- timestamp: RFC 3339 delivery time");
                println!("- sensor: step_counter, step_detector, accelerometer, or any other name");
                println!("- values: raw values; step_counter carries the cumulative count since boot in values[0]");
                println!("- accuracy: optional platform accuracy level");
                println!();
                println!("Only step_counter events change the session; other sensors are ignored.");
            }
        }
        SchemaType::Output => {
            if json_schema {
                println!("{}", get_output_json_schema());
            } else {
                println!("Output Schema: display frame");
                println!();
                println!("- instance_id, sequence: producing tracker and redraw number");
                println!("- cause: startup | sensor_event | reset");
                println!("- steps, steps_text");
                println!("- distance_km, distance_text");
                println!("- calories_kcal, calories_text");
                println!("- progress_percent: present when the progress widget is enabled");
                println!("- chart: {{ label, description, kind, points: [{{ x, y, label }}] }} when the chart is enabled");
            }
        }
    }

    Ok(())
}

// Helper functions

/// State file used when none is given, named after the preferences namespace
fn default_state_path() -> PathBuf {
    PathBuf::from(format!("{}.json", PREFS_NAME))
}

fn read_input(input: &Path) -> Result<String, FitrackCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn build_config(args: &ConfigArgs) -> Result<TrackerConfig, FitrackCliError> {
    let mut config = match &args.config {
        Some(path) => TrackerConfig::from_json(&fs::read_to_string(path)?)?,
        None => TrackerConfig::default(),
    };

    if let Some(stride) = args.stride_length {
        config.stride_length_m = stride;
    }
    if let Some(weight) = args.weight {
        config.weight_kg = weight;
    }
    if let Some(goal) = args.daily_goal {
        config.daily_goal = goal;
    }
    if let Some(every) = args.chart_every {
        config.chart_every = every;
    }
    if let Some(capacity) = args.history_capacity {
        config.history_capacity = capacity;
    }
    if args.progress {
        config.widgets.progress = true;
    }
    if args.no_chart {
        config.widgets.chart = false;
    }
    if let Some(kind) = &args.chart_kind {
        config.widgets.chart_kind = match kind {
            ChartKindArg::Line => ChartKind::Line,
            ChartKindArg::Bar => ChartKind::Bar,
        };
    }
    if let Some(policy) = &args.reboot_policy {
        config.reboot_policy = match policy {
            RebootPolicyArg::Clamp => RebootPolicy::Clamp,
            RebootPolicyArg::Rebaseline => RebootPolicy::Rebaseline,
        };
    }

    config.validate()?;
    Ok(config)
}

fn build_tracker(args: &ConfigArgs, state: Option<&Path>) -> Result<StepTracker, FitrackCliError> {
    let config = build_config(args)?;
    let store: Box<dyn KeyValueStore> = match state {
        Some(path) => Box::new(JsonFileStore::open(path)?),
        None => Box::new(MemoryStore::new()),
    };
    Ok(StepTracker::new(config, store, !args.no_sensor)?)
}

fn report_notices(tracker: &mut StepTracker) {
    for notice in tracker.take_notices() {
        eprintln!("{}", notice.message());
    }
}

fn render_text(frame: &DisplayFrame) -> String {
    let mut out = format!(
        "{}\n{}\n{}\n",
        frame.steps_text, frame.distance_text, frame.calories_text
    );
    if let Some(progress) = frame.progress_percent {
        out.push_str(&format!("Progress: {}%\n", progress));
    }
    if let Some(chart) = &frame.chart {
        let points: Vec<String> = chart
            .points
            .iter()
            .map(|p| format!("{}={}", p.label, p.y))
            .collect();
        out.push_str(&format!("Chart ({}): {}\n", chart.kind.as_str(), points.join(" ")));
    }
    out
}

fn format_output(frames: &[DisplayFrame], format: &OutputFormat) -> Result<String, FitrackCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for frame in frames {
                lines.push(serde_json::to_string(frame)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(frames)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(frames)?),
        OutputFormat::Text => Ok(frames
            .iter()
            .map(render_text)
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

fn get_input_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": SCHEMA_VERSION,
        "description": "Platform sensor callback",
        "type": "object",
        "required": ["schema_version", "timestamp", "sensor", "values"],
        "properties": {
            "schema_version": {
                "type": "string",
                "const": SCHEMA_VERSION
            },
            "event_id": { "type": "string" },
            "timestamp": { "type": "string", "format": "date-time" },
            "sensor": { "type": "string" },
            "values": {
                "type": "array",
                "items": { "type": "number" }
            },
            "accuracy": { "type": "integer" }
        }
    })
    .to_string()
}

fn get_output_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "display frame",
        "description": "Values for one screen redraw",
        "type": "object",
        "required": [
            "instance_id", "sequence", "cause", "steps", "steps_text",
            "distance_km", "distance_text", "calories_kcal", "calories_text"
        ],
        "properties": {
            "instance_id": { "type": "string" },
            "sequence": { "type": "integer" },
            "cause": { "type": "string", "enum": ["startup", "sensor_event", "reset"] },
            "steps": { "type": "integer" },
            "steps_text": { "type": "string" },
            "distance_km": { "type": "number" },
            "distance_text": { "type": "string" },
            "calories_kcal": { "type": "number" },
            "calories_text": { "type": "string" },
            "progress_percent": { "type": "integer", "minimum": 0, "maximum": 100 },
            "chart": {
                "type": "object",
                "properties": {
                    "label": { "type": "string" },
                    "description": { "type": "string" },
                    "kind": { "type": "string", "enum": ["line", "bar"] },
                    "points": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "x": { "type": "integer" },
                                "y": { "type": "integer" },
                                "label": { "type": "string" }
                            }
                        }
                    }
                }
            }
        }
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum FitrackCliError {
    Io(io::Error),
    Tracker(fitness_tracker::TrackerError),
    Json(serde_json::Error),
    NoEvents,
    NoFrames,
    MissingState(String),
    ValidationFailed(usize),
    DoctorFailed,
    ParseError(String),
}

impl From<io::Error> for FitrackCliError {
    fn from(e: io::Error) -> Self {
        FitrackCliError::Io(e)
    }
}

impl From<fitness_tracker::TrackerError> for FitrackCliError {
    fn from(e: fitness_tracker::TrackerError) -> Self {
        FitrackCliError::Tracker(e)
    }
}

impl From<serde_json::Error> for FitrackCliError {
    fn from(e: serde_json::Error) -> Self {
        FitrackCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<FitrackCliError> for CliError {
    fn from(e: FitrackCliError) -> Self {
        match e {
            FitrackCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            FitrackCliError::Tracker(e) => CliError {
                code: "TRACKER_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'fitrack doctor' to check config and state files".to_string()),
            },
            FitrackCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            FitrackCliError::NoEvents => CliError {
                code: "NO_EVENTS".to_string(),
                message: "No events found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            FitrackCliError::NoFrames => CliError {
                code: "NO_FRAMES".to_string(),
                message: "No step counter events were handled".to_string(),
                hint: Some("Check that the input contains step_counter events and a sensor is available".to_string()),
            },
            FitrackCliError::MissingState(path) => CliError {
                code: "MISSING_STATE".to_string(),
                message: format!("State file not found: {}", path),
                hint: Some("Run 'fitrack replay --state <file>' or 'fitrack reset' to create one".to_string()),
            },
            FitrackCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} events failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            FitrackCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
            FitrackCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some(format!("Ensure input matches {} schema", SCHEMA_VERSION)),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct StatusReport {
    total_steps: i64,
    previous_total_steps: i64,
    current_steps: u64,
    distance_km: f64,
    calories_kcal: f64,
    progress_percent: u8,
    daily_goal: u64,
}

#[derive(serde::Serialize)]
struct ValidationReport {
    total_events: usize,
    step_events: usize,
    valid_events: usize,
    invalid_events: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    event_id: Option<String>,
    error: String,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
