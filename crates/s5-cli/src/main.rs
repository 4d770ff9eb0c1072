fn main() {
    s5_cli::init_logging();
    std::process::exit(s5_cli::run_from_env());
}
