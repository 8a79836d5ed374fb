use docfilter_cli::core::CoreApp;

fn main() {
    if let Err(e) = CoreApp::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
