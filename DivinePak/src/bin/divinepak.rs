fn main() -> anyhow::Result<()> {
    divinepak::cli::run_cli()
}
