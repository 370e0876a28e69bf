use std::env;
use std::process;

use env_logger::Env;
use log::error;

use rpsensors::config::{SensorConfig, USAGE};
use rpsensors::report::ErrorReport;

fn fail(message: String) -> ! {
    error!("{}", message);
    let report = ErrorReport { error: message };
    match serde_json::to_string(&report) {
        Ok(json) => eprintln!("{}", json),
        Err(_) => eprintln!("{}", report.error),
    }
    process::exit(1)
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let args = env::args().skip(1).collect::<Vec<_>>();
    let args = args.iter().map(|s| &**s).collect::<Vec<_>>();

    match &args[..] {
        [] | ["-h"] | ["--help"] => {
            println!("{}", USAGE);
            return;
        }
        _ => {}
    }

    let report = match SensorConfig::from_args(&args).and_then(rpsensors::read) {
        Ok(report) => report,
        Err(e) => fail(e.to_string()),
    };

    match report.to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => fail(e.to_string()),
    }
}
