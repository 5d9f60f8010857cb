use clap::{crate_version, App, AppSettings, Arg, ArgMatches, SubCommand};
use squish::config::{self, Config};
use squish::minify::{self, minify, ExistingCache};
use squish::report::Report;
use squish::restore::restore;
use squish::status::status;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn main() {
    let matches = app().get_matches();
    // `SubcommandRequiredElseHelp` has already exited if there's no subcommand.
    if let (name, Some(sub)) = matches.subcommand() {
        init_logging(sub.occurrences_of("verbose").max(matches.occurrences_of("verbose")));

        match run(name, &matches, sub) {
            Ok(true) => {}
            Ok(false) => std::process::exit(1),
            Err(e) => {
                eprintln!("squish: {}", e);
                std::process::exit(1);
            }
        }
    }
}

fn app<'a, 'b>() -> App<'a, 'b> {
    let dirs = || {
        Arg::with_name("DIR")
            .multiple(true)
            .help("Target directories (defaults to `directories` from squish.yaml)")
    };

    App::new("squish")
        .version(crate_version!())
        .about("Minifies a site's template directories for deployment and restores them afterwards")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .multiple(true)
                .global(true)
                .help("Log more (-v for info, -vv for debug)"),
        )
        .arg(
            Arg::with_name("config")
                .long("config")
                .value_name("FILE")
                .takes_value(true)
                .global(true)
                .help("Project file to use instead of searching for squish.yaml"),
        )
        .arg(
            Arg::with_name("cache-dir")
                .long("cache-dir")
                .value_name("NAME")
                .takes_value(true)
                .global(true)
                .help("Name of the cache folder inside each target directory"),
        )
        .subcommand(
            SubCommand::with_name("minify")
                .about("Backs up and strips newlines and tabs from every file in each directory")
                .arg(dirs())
                .arg(
                    Arg::with_name("dry-run")
                        .long("dry-run")
                        .help("Report what would change without writing anything"),
                )
                .arg(
                    Arg::with_name("refuse-existing-cache")
                        .long("refuse-existing-cache")
                        .help("Fail instead of minifying a directory that already has a cache folder"),
                ),
        )
        .subcommand(
            SubCommand::with_name("restore")
                .about("Copies the backed-up originals back and deletes the cache folder")
                .arg(dirs()),
        )
        .subcommand(
            SubCommand::with_name("status")
                .about("Shows whether each directory is minified and which files are backed up")
                .arg(dirs()),
        )
}

/// The log filter used when `RUST_LOG` isn't set. Warnings are always shown
/// since per-file failures are logged at that level.
fn default_filter(verbosity: u64) -> &'static str {
    match verbosity {
        0 => "squish=warn",
        1 => "squish=info",
        _ => "squish=debug",
    }
}

fn init_logging(verbosity: u64) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Global args are propagated down to the subcommand, but fall back to the
/// top-level matches in case they were given before the subcommand name.
fn global_value<'a>(matches: &'a ArgMatches, sub: &'a ArgMatches, name: &str) -> Option<&'a str> {
    sub.value_of(name).or_else(|| matches.value_of(name))
}

fn load_config(matches: &ArgMatches, sub: &ArgMatches) -> Result<Config, config::Error> {
    let mut config = match global_value(matches, sub, "config") {
        Some(path) => Config::from_project_file(Path::new(path))?,
        None => Config::from_directory(&std::env::current_dir().map_err(|err| {
            config::Error::Open {
                path: PathBuf::from("."),
                err,
            }
        })?)?,
    };
    if let Some(name) = global_value(matches, sub, "cache-dir") {
        squish::cache::validate_name(name)?;
        config.cache_directory = name.to_owned();
    }
    Ok(config)
}

fn directories(sub: &ArgMatches, config: &Config) -> Result<Vec<PathBuf>, String> {
    match sub.values_of("DIR") {
        Some(values) => Ok(values.map(PathBuf::from).collect()),
        None if !config.directories.is_empty() => Ok(config.directories.clone()),
        None => Err(format!(
            "no directories given and none configured in {}",
            config::PROJECT_FILE
        )),
    }
}

/// Runs a subcommand over every directory, reporting each as it goes. Returns
/// `Ok(false)` if any directory or file failed.
fn run(
    name: &str,
    matches: &ArgMatches,
    sub: &ArgMatches,
) -> Result<bool, Box<dyn std::error::Error>> {
    let config = load_config(matches, sub)?;
    let dirs = directories(sub, &config)?;

    let mut ok = true;
    for dir in &dirs {
        let result: Result<bool, Box<dyn std::error::Error>> = match name {
            "minify" => {
                let options = minify::Options {
                    cache_name: config.cache_directory.clone(),
                    existing_cache: if sub.is_present("refuse-existing-cache") {
                        ExistingCache::Refuse
                    } else {
                        config.existing_cache
                    },
                    dry_run: sub.is_present("dry-run"),
                };
                minify(dir, &options)
                    .map(|report| print_report("minified", &report))
                    .map_err(Into::into)
            }
            "restore" => restore(dir, &config.cache_directory)
                .map(|report| print_report("restored", &report))
                .map_err(Into::into),
            "status" => status(dir, &config.cache_directory)
                .map(|status| {
                    if status.minified {
                        println!(
                            "{}: minified ({} backed up, {} not backed up)",
                            dir.display(),
                            status.cached.len(),
                            status.unbacked.len()
                        );
                        for name in &status.unbacked {
                            println!("  not backed up: {}", name.to_string_lossy());
                        }
                    } else {
                        println!("{}: not minified", dir.display());
                    }
                    true
                })
                .map_err(Into::into),
            _ => Err(format!("unknown command `{}`", name).into()),
        };

        match result {
            Ok(success) => ok &= success,
            Err(e) => {
                eprintln!("squish: {}: {}", dir.display(), e);
                ok = false;
            }
        }
    }
    Ok(ok)
}

fn print_report(verb: &str, report: &Report) -> bool {
    let prefix = if report.dry_run { "would have " } else { "" };
    let saved = report.bytes_saved();
    if saved > 0 {
        println!(
            "{}: {}{} {} files ({} bytes saved)",
            report.directory.display(),
            prefix,
            verb,
            report.entries.len(),
            saved
        );
    } else {
        println!(
            "{}: {}{} {} files",
            report.directory.display(),
            prefix,
            verb,
            report.entries.len()
        );
    }
    for failure in &report.failures {
        eprintln!("squish: {}", failure);
    }
    if !report.is_success() && verb == "restored" {
        eprintln!(
            "squish: {}: cache folder kept so the restore can be retried",
            report.directory.display()
        );
    }
    report.is_success()
}
