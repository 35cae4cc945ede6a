use byzantine_om::config::SimulationConfig;
use byzantine_om::logger::{init_logger, LogFormat};
use byzantine_om::simulation::{
    compare_runners, print_outcome, print_runner_comparison, runner_for, AgreementRunner,
    ConcurrentRunner, SequentialRunner,
};
use std::env;
use std::error::Error;
use std::sync::Arc;

const USAGE: &str = "Usage: byzantine-om [--json] [--concurrent] [--compare] [--detailed-log]

Configuration is read from the environment (or .env):
  OM_GENERALS      total generals, commander included   (default 7)
  OM_TOLERANCE     traitors tolerated, m                 (default 2)
  OM_TRAITORS      comma separated traitor ids           (default 5,6)
  OM_ORDER         attack | retreat                      (default attack)
  OM_STRATEGY      parity | always-flip | honest | constant-<order>
  OM_FAULT_POLICY  strict | lenient                      (default strict)
  OM_CONCURRENT    true | false                          (default false)";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("{}", USAGE);
        return Ok(());
    }
    let as_json = args.contains(&"--json".to_string());
    let compare = args.contains(&"--compare".to_string());
    let detailed = args.contains(&"--detailed-log".to_string());

    init_logger(if detailed {
        LogFormat::Detailed
    } else {
        LogFormat::Compact
    });

    let mut config = SimulationConfig::from_env()?;
    if args.contains(&"--concurrent".to_string()) {
        config = config.with_concurrency(true);
    }

    if compare {
        let runners: Vec<Arc<dyn AgreementRunner>> =
            vec![Arc::new(SequentialRunner), Arc::new(ConcurrentRunner)];
        let mut outcomes = Vec::new();
        for result in compare_runners(&config, runners).await {
            outcomes.push(result?);
        }
        if as_json {
            println!("{}", serde_json::to_string_pretty(&outcomes)?);
        } else {
            print_runner_comparison(&outcomes);
        }
        return Ok(());
    }

    let outcome = runner_for(&config).run(&config).await?;
    if as_json {
        println!("{}", outcome.to_json()?);
    } else {
        print_outcome(&outcome);
    }

    Ok(())
}
