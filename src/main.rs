use std::io;

use anyhow::Context;
use clap::Parser;
use qrcode_capture::{app, cli, decoder};

fn main() -> anyhow::Result<()> {
	env_logger::Builder::from_env(
		env_logger::Env::default().default_filter_or("warn")).init();

	let args = cli::Args::parse();
	let stdout = io::stdout();
	let mut out = stdout.lock();
	let config = args.resolve(&mut out)?;

	let mut source = app::frame_source(&config)
		.context("Failed to open frame source")?;
	let decoder = decoder::for_kind(config.decoder);
	app::run(&config, source.as_mut(), decoder.as_ref(), &mut out)
		.context("Failed to record scan outcome")?;
	return Ok(());
}
