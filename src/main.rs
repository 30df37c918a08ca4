fn main() {
    #[cfg(feature = "cli")]
    apkdiff::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("apkdiff: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
