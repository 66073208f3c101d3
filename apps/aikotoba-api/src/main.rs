use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = aikotoba_api::Args::parse();
	aikotoba_api::run(args).await
}
