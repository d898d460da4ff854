use someutils::cli::run_util;
use someutils::handler::mv::Mv;
use std::env;

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();
    std::process::exit(run_util::<Mv>(&args));
}
