fn main() {
    if let Err(err) = dep2svg::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
