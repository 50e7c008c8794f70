use clap::Parser;
use csvjson::utils::{logger, validation::Validate};
use csvjson::{CliConfig, ConversionPipeline, ConvertEngine, ConvertError, LocalStorage};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);
    tracing::debug!("CLI config: {:?}", cli);

    let exit_code = match run(&cli).await {
        Ok(destination) => {
            tracing::debug!("Conversion finished, output: {}", destination);
            0
        }
        Err(e) => {
            // 使用者訊息由 eprintln 輸出，日誌只保留細節
            tracing::debug!("Conversion failed: {:?} (Category: {:?})", e, e.category());

            eprintln!("error: {}", e.user_friendly_message());
            eprintln!("hint: {}", e.recovery_suggestion());
            e.exit_code()
        }
    };

    std::process::exit(exit_code);
}

async fn run(cli: &CliConfig) -> Result<String, ConvertError> {
    let config = cli.resolve()?;
    config.validate()?;

    let pipeline = ConversionPipeline::new(LocalStorage::default(), config)?;
    ConvertEngine::new(pipeline).run().await
}
