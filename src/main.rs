// Copyright (C) 2018 Stephane Raux. Distributed under the MIT license.

use clap::{App, Arg};
use geolocate::Locator;
use std::error::Error;
use std::fmt::{Display, self};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

const APP_NAME: &str = env!("CARGO_PKG_NAME");
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
const APP_AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

fn run() -> Result<(), AppError> {
    let matches = App::new(APP_NAME)
        .version(APP_VERSION)
        .author(APP_AUTHORS)
        .about("Locates a device from nearby cell towers and WiFi networks")
        .arg(
            Arg::with_name("SERVICE")
                .short("s")
                .long("service")
                .takes_value(true)
                .default_value("mozilla")
                .help("mozilla, google, yandex or the URL of a compatible \
                    service")
        )
        .arg(
            Arg::with_name("KEY")
                .short("k")
                .long("key")
                .takes_value(true)
                .help("API key (default: \"test\" for mozilla, none otherwise)")
        )
        .arg(
            Arg::with_name("CONFIG")
                .short("c")
                .long("config")
                .takes_value(true)
                .help("Path to configuration file")
        )
        .arg(
            Arg::with_name("REQUEST")
                .index(1)
                .help("Path to JSON request (default: standard input)")
        )
        .get_matches();
    let config = match matches.value_of("CONFIG") {
        Some(path) => {
            let file = File::open(Path::new(path))
                .map_err(AppError::FailedToOpenConfigFile)?;
            geolocate::Config::from_config(file)
                .map_err(AppError::BadConfigFile)?
        }
        None => geolocate::Config::default(),
    };
    let service = match matches.value_of("SERVICE").unwrap_or("mozilla") {
        "mozilla" => geolocate::MOZILLA,
        "google" => geolocate::GOOGLE,
        "yandex" => geolocate::YANDEX,
        url => url,
    };
    let default_key = if service == geolocate::MOZILLA {"test"} else {""};
    let key = matches.value_of("KEY").unwrap_or(default_key);
    let request = read_request(matches.value_of("REQUEST"))?;
    let locator = geolocate::with_config(service, key, config)
        .map_err(AppError::LocatorError)?;
    tracing::info!(service = locator.service(), "locating");
    let response = locator.get(&request).map_err(AppError::LocatorError)?;
    let out = serde_json::to_string_pretty(&response)
        .map_err(AppError::BadResponse)?;
    println!("{}", out);
    Ok(())
}

fn read_request(path: Option<&str>) -> Result<geolocate::Request, AppError> {
    let mut data = String::new();
    match path {
        Some(path) if path != "-" => {
            File::open(Path::new(path))
                .and_then(|mut f| f.read_to_string(&mut data))
                .map_err(AppError::FailedToReadRequest)?;
        }
        _ => {
            io::stdin().read_to_string(&mut data)
                .map_err(AppError::FailedToReadRequest)?;
        }
    }
    serde_json::from_str(&data).map_err(AppError::BadRequestFile)
}

fn main() {
    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
    let code = if let Err(e) = run() {
        print_error(e);
        1
    } else {
        0
    };
    std::process::exit(code)
}

fn print_error(e: AppError) {
    eprintln!("Error: {}", e);
    let mut e: &dyn Error = &e;
    while let Some(cause) = e.source() {
        eprintln!("Because: {}", cause);
        e = cause;
    }
}

#[derive(Debug)]
enum AppError {
    BadConfigFile(serde_json::Error),
    BadRequestFile(serde_json::Error),
    BadResponse(serde_json::Error),
    FailedToOpenConfigFile(io::Error),
    FailedToReadRequest(io::Error),
    LocatorError(geolocate::Error),
}

impl Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::BadConfigFile(_) => f.write_str("Bad configuration file"),
            AppError::BadRequestFile(_) => f.write_str("Bad request file"),
            AppError::BadResponse(_) => f.write_str("Cannot print response"),
            AppError::FailedToOpenConfigFile(_) =>
                f.write_str("Failed to open configuration file"),
            AppError::FailedToReadRequest(_) =>
                f.write_str("Failed to read request"),
            AppError::LocatorError(_) => f.write_str("Geolocation failed"),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AppError::BadConfigFile(e) => Some(e),
            AppError::BadRequestFile(e) => Some(e),
            AppError::BadResponse(e) => Some(e),
            AppError::FailedToOpenConfigFile(e) => Some(e),
            AppError::FailedToReadRequest(e) => Some(e),
            AppError::LocatorError(e) => Some(e),
        }
    }
}
