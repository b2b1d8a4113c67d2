//! ChronoAtlas CLI - Command-line interface
//!
//! This binary provides a command-line interface to the ChronoAtlas
//! library: one resolution per invocation, result printed as JSON.

use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};

use chronoatlas::config::Settings;
use chronoatlas::coord::Coordinate;
use chronoatlas::logging::{default_log_dir, default_log_file, init_logging};
use chronoatlas::profile::ParityProfile;
use chronoatlas::resolution::{parse_local_datetime, ResolutionRequest};
use chronoatlas::service::{ResolveError, ResolverService};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProfileArg {
    /// Full pipeline: boundary index, all patches (default)
    StrictHistory,
    /// Mirror the astronomical reference tool: no patches, earlier
    /// instant on folds
    AstroCompat,
    /// Announced future convention changes only
    FutureCompat,
    /// Trust an explicit --offset-seconds or --zone verbatim
    AsEntered,
}

impl From<ProfileArg> for ParityProfile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::StrictHistory => ParityProfile::StrictHistory,
            ProfileArg::AstroCompat => ParityProfile::AstroCompat,
            ProfileArg::FutureCompat => ParityProfile::FutureCompat,
            ProfileArg::AsEntered => ParityProfile::AsEntered,
        }
    }
}

#[derive(Parser)]
#[command(name = "chronoatlas")]
#[command(about = "Resolve a historical local time to UTC", long_about = None)]
struct Args {
    /// Latitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,

    /// Longitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    lon: f64,

    /// Local civil datetime, e.g. 1943-06-15T14:30:00
    #[arg(long)]
    datetime: String,

    /// Parity profile to resolve under
    #[arg(long, value_enum, default_value = "strict-history")]
    profile: ProfileArg,

    /// Explicit UTC offset in seconds (honored by --profile as-entered)
    #[arg(long, allow_hyphen_values = true)]
    offset_seconds: Option<i32>,

    /// Explicit IANA zone id (honored by --profile as-entered)
    #[arg(long)]
    zone: Option<String>,

    /// Config file path (default: ~/.chronoatlas/config.ini)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    let _logging = match init_logging(default_log_dir(), default_log_file()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error initializing logging: {}", e);
            process::exit(1);
        }
    };

    let mut settings = match &args.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .unwrap_or_else(|e| {
        eprintln!("Error loading configuration: {}", e);
        process::exit(1);
    });
    settings.apply_env_overrides();

    // Validate inputs before touching the datasets
    let coordinate = match Coordinate::new(args.lat, args.lon) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };
    let local = match parse_local_datetime(&args.datetime) {
        Ok(dt) => dt,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    let service = match ResolverService::new(&settings) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error starting resolver: {}", e);
            process::exit(1);
        }
    };

    tracing::info!(
        lat = args.lat,
        lon = args.lon,
        datetime = %args.datetime,
        "Resolving local time"
    );

    let mut request = ResolutionRequest::new(local, coordinate, args.profile.into());
    if let Some(offset) = args.offset_seconds {
        request = request.with_entered_offset(offset);
    }
    if let Some(zone) = args.zone {
        request = request.with_entered_zone(zone);
    }

    match service.resolve(&request) {
        Ok(result) => match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing result: {}", e);
                process::exit(1);
            }
        },
        Err(ResolveError::Input(e)) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
        Err(e) => {
            eprintln!("Error resolving: {}", e);
            process::exit(1);
        }
    }
}
