use bill_impact::core::store::AnalysisStore;
use bill_impact::utils::{logger, validation::Validate};
use bill_impact::{
    AppConfig, BillPipeline, BillsApiClient, CliConfig, EtlEngine, GeminiAnalyser, ImpactError,
    LocalStorage,
};
use clap::Parser;

fn exit_with(e: &ImpactError) -> ! {
    tracing::error!("❌ {}", e);
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    match std::env::var("BILL_IMPACT_LOG_FORMAT").as_deref() {
        Ok("json") => logger::init_json_logger(),
        _ => logger::init_cli_logger(),
    }

    let mut config = AppConfig::from_env().unwrap_or_else(|e| exit_with(&e));
    config.apply_cli(&cli);
    tracing::debug!("Resolved config: limit={}, output={}", config.limit, config.output_path);

    // 驗證配置（在任何網路請求之前）
    if let Err(e) = config.validate() {
        exit_with(&e);
    }
    let gemini = config.gemini_settings().unwrap_or_else(|e| exit_with(&e));

    let (root, file_name) = config.storage_location();
    let store = AnalysisStore::new(LocalStorage::new(root), file_name);
    let source = BillsApiClient::new(&config.bills_api_base);
    let analyser = GeminiAnalyser::new(gemini).unwrap_or_else(|e| exit_with(&e));
    let pipeline = BillPipeline::new(source, analyser, store, config);

    let engine = EtlEngine::new(pipeline);
    let report = engine.run().await?;

    tracing::info!("📁 Output: {}", report.output_path);
    println!(
        "✅ Processed {} new bills. Total: {}",
        report.new_records, report.total_records
    );
    println!("📁 Output saved to: {}", report.output_path);

    Ok(())
}
