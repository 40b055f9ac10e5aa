use anyhow::Result;
use clap::{crate_version, App, Arg, ArgMatches};
use mdsite::build::build_site;
use mdsite::config::{Config, ConfigError, Settings};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Exit status for configuration problems.
const EXIT_CONFIG: i32 = 2;

/// Exit status for build failures.
const EXIT_BUILD: i32 = 1;

fn main() {
    let matches = App::new("mdsite")
        .version(crate_version!())
        .about("Builds a static HTML site from a folder of markdown documents")
        .arg(
            Arg::with_name("project")
                .index(1)
                .value_name("PROJECT_DIR")
                .help("Directory to search (with its parents) for mdsite.yaml")
                .default_value("."),
        )
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("FILE")
                .help("Path to the project file, instead of searching for one")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("input")
                .short("i")
                .long("input")
                .value_name("DIR")
                .help("Overrides InputFolder")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .value_name("DIR")
                .help("Overrides OutputFolder")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("default-document")
                .short("d")
                .long("default-document")
                .value_name("NAME")
                .help("Overrides DefaultDocumentName")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("template")
                .short("t")
                .long("template")
                .value_name("DIR")
                .help("Overrides TemplateFolder")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .multiple(true)
                .help("Also logs every step of the build (pages are logged by default)"),
        )
        .get_matches();

    init_logging(matches.occurrences_of("verbose"));

    let config = match load_config(&matches) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(err) = run(&config) {
        eprintln!("Error: {:#}", err);
        std::process::exit(EXIT_BUILD);
    }
}

fn run(config: &Config) -> Result<()> {
    let report = build_site(config)?;
    println!(
        "Built {} page(s) into {} ({} stylesheet cop{})",
        report.pages,
        config.output_directory.display(),
        report.stylesheets,
        if report.stylesheets == 1 { "y" } else { "ies" },
    );
    Ok(())
}

// RUST_LOG takes precedence; otherwise info, or debug with -v.
fn init_logging(verbosity: u64) {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(_) => EnvFilter::from_default_env(),
        Err(_) => EnvFilter::new(log_level(verbosity)),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn log_level(verbosity: u64) -> &'static str {
    match verbosity {
        0 => "info",
        _ => "debug",
    }
}

fn load_config(matches: &ArgMatches) -> Result<Config, ConfigError> {
    // Folders given on the command line are relative to where we were run,
    // not to the project file.
    let cwd = std::env::current_dir().unwrap_or_default();
    let folder = |name: &str| matches.value_of(name).map(|path| cwd.join(path));
    let overrides = Settings {
        input_folder: folder("input"),
        output_folder: folder("output"),
        default_document_name: matches.value_of("default-document").map(str::to_owned),
        template_folder: folder("template"),
    };

    match matches.value_of("config") {
        Some(path) => Config::from_project_file(Path::new(path), overrides),
        None => Config::from_directory(
            Path::new(matches.value_of("project").unwrap_or(".")),
            overrides,
        ),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_log_level_defaults_to_info() {
        assert_eq!(log_level(0), "info");
        assert_eq!(log_level(1), "debug");
        assert_eq!(log_level(2), "debug");
    }
}
