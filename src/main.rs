fn main() {
    if let Err(e) = gemchat::cli::main() {
        eprintln!("❌ {e}");
        std::process::exit(1);
    }
}
