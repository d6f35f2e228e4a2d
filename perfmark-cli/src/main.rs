fn main() -> anyhow::Result<()> {
    perfmark_cli::run()
}
