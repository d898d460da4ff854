use someutils::cli::run_util;
use someutils::handler::zip::Zip;
use std::env;

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();
    std::process::exit(run_util::<Zip>(&args));
}
