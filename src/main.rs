use ecr_image_runner::cli::{Args, Runner};
use ecr_image_runner::output::OutputManager;
use ecr_image_runner::telemetry;

#[tokio::main]
async fn main() {
    let args = Args::parse_args().from_env();

    let output = if args.quiet {
        OutputManager::new_quiet()
    } else {
        OutputManager::new(args.verbose)
    };

    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => {
            output.error(&format!("An error occurred: {}", e));
            Args::print_examples();
            std::process::exit(1);
        }
    };

    let mut telemetry = match telemetry::open_sink(&config).await {
        Ok(sink) => sink,
        Err(e) => {
            output.error(&format!("An error occurred: {}", e));
            std::process::exit(1);
        }
    };

    let runner = Runner::new(config, output);
    if runner.run(telemetry.as_mut()).await.is_err() {
        // Details were already printed; the session is closed by the runner
        std::process::exit(1);
    }
}
