fn main() {
    if let Err(err) = cnpj_report::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
