use someutils::cli::{dispatch, exit_code};
use someutils::pipes::with_std_pipes;
use someutils::Registry;
use std::env;

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    let registry = Registry::new();
    let result = with_std_pipes(|pipes| dispatch(&registry, &args, pipes));
    std::process::exit(exit_code(result));
}
