use clap::Parser;
use twentyone_drivers::parse_config_from_file;

mod game;
mod shoe;

const DEFAULT_CONFIG_PATH: &str = "~/.twentyone.yml";

#[derive(Debug, Parser)]
#[command(author, about, long_about = None)]
struct CommandLineArgs {
    /// The path of the config file
    #[arg(short, long, default_value_t = String::from(DEFAULT_CONFIG_PATH))]
    config: String,
}

fn main() {
    env_logger::init();

    let mut args = CommandLineArgs::parse();
    if args.config == DEFAULT_CONFIG_PATH {
        let home_dir = home::home_dir().expect("Cannot find home directory");
        let config_file_path = home_dir.join(".twentyone.yml");
        if !config_file_path.exists() {
            panic!("Config file not exists");
        }
        if config_file_path.is_dir() {
            panic!("This should be a path rather than a directory");
        }
        args.config = String::from(config_file_path.to_str().expect("Invalid config path"));
    }
    let args = args;

    let config = parse_config_from_file(&args.config);
    let rule: twentyone::Rule = match config.rule.clone().try_into() {
        Ok(rule) => rule,
        Err(err) => panic!("Invalid rule in config: {}", err),
    };

    match game::simulate_rounds(&rule, &config.ev_simulator) {
        Ok(final_bankroll) => {
            println!(
                "Started with {:.2}, finished with {:.2}",
                config.ev_simulator.initial_bankroll, final_bankroll
            );
        }
        Err(err) => panic!("Simulation failed: {}", err),
    }
}
