use rdeps_cli::{cli, run_resolve};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));

    match matches.subcommand() {
        Some(("resolve", args)) => {
            let json = run_resolve(args)?;
            println!("{json}");
        }
        _ => unreachable!("clap requires a subcommand"),
    }
    Ok(())
}

// Logs go to stderr; stdout carries only the JSON result.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
