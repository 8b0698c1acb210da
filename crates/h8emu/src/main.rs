fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|arg| arg == "-h" || arg == "--help") {
        println!("{}", h8emu::USAGE);
        return;
    }

    let options = match h8emu::parse_args(args) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{err}\n\n{}", h8emu::USAGE);
            std::process::exit(2);
        }
    };

    if let Err(err) = h8emu::run(&options) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
