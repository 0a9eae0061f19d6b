use clap::{Parser, Subcommand};
use photodeck::collect::{TraversalPolicy, collect};
use photodeck::compose::PlacementPolicy;
use photodeck::config::{self, DeckConfig};
use photodeck::imaging::Quality;
use photodeck::output;
use photodeck::patch::{self, TransitionKind};
use photodeck::pipeline::{self, BuildOptions, TransitionOptions};
use photodeck::types::Rgb;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Transition flags shared by `build` and `transitions`.
#[derive(clap::Args, Clone, Default)]
struct TransitionArgs {
    /// Transition effect
    #[arg(long, value_enum)]
    transition: Option<TransitionKind>,

    /// Seconds each slide stays up before advancing
    #[arg(long, value_name = "SECONDS")]
    transition_duration: Option<f64>,
}

impl TransitionArgs {
    fn requested(&self) -> bool {
        self.transition.is_some() || self.transition_duration.is_some()
    }

    /// Apply flags on top of the loaded config.
    fn apply(&self, config: &mut DeckConfig) -> Result<(), config::ConfigError> {
        if let Some(kind) = self.transition {
            config.transitions.kind = kind;
        }
        if let Some(duration) = self.transition_duration {
            config.transitions.duration = duration;
        }
        config.validate()
    }
}

#[derive(clap::Args, Clone, Default)]
struct BuildArgs {
    /// How pictures sit on their slides
    #[arg(long, value_enum)]
    placement: Option<PlacementPolicy>,

    /// How nested folders are ordered
    #[arg(long, value_enum)]
    traversal: Option<TraversalPolicy>,

    #[command(flatten)]
    transitions: TransitionArgs,

    /// Skip the transition pass even if the config enables it
    #[arg(long, conflicts_with_all = ["transition", "transition_duration"])]
    no_transitions: bool,
}

fn version_string() -> &'static str {
    let on_tag = env!("PHOTODECK_ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("PHOTODECK_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "photodeck")]
#[command(about = "Turn a folder of photos into a slide deck")]
#[command(long_about = "\
Turn a folder of photos into a slide deck

Every png, jpg, jpeg, bmp and gif under the input directory becomes one slide,
in natural order (2.jpg before 10.jpg), upright according to its EXIF
orientation.

  photos/
  ├── photodeck.toml          # Optional settings (see gen-config)
  ├── A/
  │   ├── 1.jpg               # slide 1
  │   └── 2.jpg               # slide 2
  └── B/
      └── 1.jpg               # slide 3

Running with no command builds Photos_Presentation.pptx in the input
directory. With --transition-duration a second copy,
Photos_Presentation_with_transitions.pptx, auto-advances between slides.

Run 'photodeck gen-config' to generate a documented photodeck.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Directory to collect images from
    #[arg(long, default_value = ".", global = true)]
    input_dir: PathBuf,

    /// Output deck path
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Config file (default: photodeck.toml in the input directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Collect images and write the deck (default)
    Build(BuildArgs),
    /// Print the ordered image list without building anything
    List {
        /// Print JSON instead of numbered lines
        #[arg(long)]
        json: bool,

        /// How nested folders are ordered
        #[arg(long, value_enum)]
        traversal: Option<TraversalPolicy>,
    },
    /// Write a copy of an existing deck with slide transitions
    Transitions {
        /// Deck to read; it is never modified
        deck: PathBuf,

        #[command(flatten)]
        transitions: TransitionArgs,
    },
    /// Print a stock photodeck.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::print_error_chain(err.as_ref());
            ExitCode::FAILURE
        }
    }
}

fn run(mut cli: Cli) -> Result<(), Box<dyn Error>> {
    // No subcommand means a plain build.
    let command = cli
        .command
        .take()
        .unwrap_or_else(|| Command::Build(BuildArgs::default()));

    match command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::List { json, traversal } => {
            let config = load_config(&cli)?;
            let policy = traversal.unwrap_or(config.collect.traversal);
            let entries = collect(&cli.input_dir, policy)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                output::print_image_list(&entries);
            }
        }
        Command::Transitions { deck, transitions } => {
            let mut config = load_config(&cli)?;
            transitions.apply(&mut config)?;
            let target = cli
                .output
                .clone()
                .unwrap_or_else(|| patch::default_output(&deck));
            let report = patch::add_transitions(&deck, &target, &config.transitions.spec())?;
            output::print_patch_report(&report);
        }
        Command::Build(args) => {
            let mut config = load_config(&cli)?;
            args.transitions.apply(&mut config)?;
            init_thread_pool(&config.processing);

            let options = build_options(&cli, &args, &config);
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_build_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = pipeline::build(&options, Some(tx));
            if printer.join().is_err() {
                log::warn!("progress printer panicked");
            }
            output::print_build_summary(&result?);
        }
    }

    Ok(())
}

/// `--config` wins; otherwise `photodeck.toml` in the input directory.
fn load_config(cli: &Cli) -> Result<DeckConfig, config::ConfigError> {
    match &cli.config {
        Some(path) => config::load_config_file(path),
        None => config::load_config(&cli.input_dir),
    }
}

/// Merge CLI flags over the resolved config.
fn build_options(cli: &Cli, args: &BuildArgs, config: &DeckConfig) -> BuildOptions {
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| cli.input_dir.join(&config.output.deck));

    let enabled =
        !args.no_transitions && (config.transitions.enabled || args.transitions.requested());
    let transitions = enabled.then(|| TransitionOptions {
        spec: config.transitions.spec(),
        output: transition_output(cli, &output, config),
    });

    BuildOptions {
        input_dir: cli.input_dir.clone(),
        output,
        traversal: args.traversal.unwrap_or(config.collect.traversal),
        geometry: config.slides.geometry(),
        placement: args.placement.unwrap_or(config.slides.placement),
        fill: config.slides.fill_color().unwrap_or(Rgb::BLACK),
        quality: Quality::new(config.slides.quality),
        transitions,
    }
}

/// With an explicit `--output`, the patched copy sits next to it.
fn transition_output(cli: &Cli, deck: &Path, config: &DeckConfig) -> PathBuf {
    match cli.output {
        Some(_) => patch::default_output(deck),
        None => cli.input_dir.join(&config.output.transition_deck),
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
