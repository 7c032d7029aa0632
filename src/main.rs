fn main() {
    if let Err(e) = opphub::cli::run() {
        eprintln!("{:#}", e); // pretty anyhow chain
        std::process::exit(1);
    }
}
