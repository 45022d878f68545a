use enginedoctor_core::DiagnosticParams;
use enginedoctor_server::ServerConfig;

pub fn run(host: &str, port: u16, params: DiagnosticParams, max_samples: usize) {
    let base = format!("http://{host}:{port}");

    println!("🔧 Engine Doctor Server v{}", enginedoctor_core::VERSION);
    println!("   {base}");
    println!(
        "   {} chunks, WARNING > {}, CRITICAL > {}",
        params.chunk_count, params.thresholds.warning, params.thresholds.critical
    );
    println!();
    println!("   Endpoints:");
    println!("     GET  /                  API index (try: curl {base})");
    println!("     POST /api/v1/diagnose   Score interleaved samples");
    println!("     GET  /health            Health check");
    println!();
    println!("   Body for /api/v1/diagnose:");
    println!("     samples=[...]           Interleaved samples in [-1, 1] (max {max_samples})");
    println!("     channels=N              Interleaved channel count (default: 1)");
    println!("     sample_rate=Hz          Default: {}", enginedoctor_server::DEFAULT_SAMPLE_RATE);
    println!("     detailed=true           Include per-chunk scores");
    println!("     preview=true            Include a decimated waveform");
    println!();
    println!("   Example:");
    println!(
        "     curl -X POST {base}/api/v1/diagnose -H 'content-type: application/json' \\"
    );
    println!("          -d '{{\"samples\": [0.0, 0.5, 1.0, 0.5], \"sample_rate\": 8000}}'");
    println!();

    let config = ServerConfig {
        params,
        max_samples,
    };
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start async runtime: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = rt.block_on(enginedoctor_server::run_server(config, host, port)) {
        eprintln!("Server error: {e}");
        std::process::exit(1);
    }
}
