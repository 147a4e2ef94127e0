//! dynkit demo host.
//!
//! Validates a JSON configuration, discovers plugin commands and runs them
//! with injected dependencies.
//!
//! # Usage
//!
//! ```bash
//! dynkit-demo [--format pretty|compact|json] [config.json]
//! ```
//!
//! Log filtering is read from `DYNKIT_LOG` (also from a `.env` file), e.g.
//! `DYNKIT_LOG=dynkit_loader=trace,info`.

use std::path::PathBuf;

use example::logging::{TracingConfig, TracingFormat};

#[expect(clippy::print_stdout, reason = "command output")]
#[expect(clippy::print_stderr, reason = "usage and fatal errors")]
fn main() {
    let _ = dotenvy::dotenv();

    let mut format = TracingFormat::default();
    let mut path: Option<PathBuf> = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--format" => match args.next().map(|value| value.parse::<TracingFormat>()) {
                Some(Ok(parsed)) => format = parsed,
                Some(Err(e)) => {
                    eprintln!("Error: {e}");
                    std::process::exit(2);
                }
                None => {
                    eprintln!("Usage: dynkit-demo [--format pretty|compact|json] [config.json]");
                    std::process::exit(2);
                }
            },
            _ => path = Some(PathBuf::from(&arg)),
        }
    }

    TracingConfig::from_env().with_format(format).init();

    let result = example::read_config(path.as_deref()).and_then(|text| example::run(&text));
    match result {
        Ok(output) => {
            println!("{:#}", output.config);
            for (command, result) in &output.results {
                println!("[{command}] {result}");
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
