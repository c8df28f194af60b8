use clap::Parser;
use news_context_analyzer::config::cli::{Command, ServeArgs};
use news_context_analyzer::config::LogFormat;
use news_context_analyzer::utils::error::{ErrorSeverity, NewsError};
use news_context_analyzer::utils::logger;
use news_context_analyzer::{app, CliConfig};

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    if let Some(Command::ImageRef(args)) = &config.command {
        match args.image_ref() {
            Ok(image) => println!("{}", image),
            Err(e) => fail(&e),
        }
        return;
    }

    if let Err(e) = serve(&config.serve).await {
        tracing::error!(
            "❌ Server stopped with error: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        fail(&e);
    }
}

async fn serve(args: &ServeArgs) -> news_context_analyzer::Result<()> {
    // The config file may choose the log format, so read it before the subscriber exists.
    let file = args.load_file()?;
    let logs = args.log_settings(file.as_ref());
    match logs.format {
        LogFormat::Compact => logger::init_cli_logger(logs.verbose),
        LogFormat::Json => logger::init_json_logger(logs.verbose),
    }

    tracing::info!("Starting news-context-analyzer {}", env!("CARGO_PKG_VERSION"));

    let settings = args.resolve_settings(file.as_ref())?;
    tracing::debug!("Resolved settings: {:?}", settings);

    app::run(&settings).await
}

fn fail(e: &NewsError) -> ! {
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
