//! quantbench command line.
//!
//! Usage:
//!   quantbench generate-data --size 10000 --output data/dataset.json
//!   quantbench generate-queries --num-queries 20 --output data/queries.json
//!   quantbench upload --collection test --dataset data/dataset.json
//!   quantbench create-quantized --dataset data/dataset.json --methods scalar binary
//!   quantbench benchmark --collection test --queries data/queries.json --quantization scalar binary
//!   quantbench tune-oversampling --collection test --method binary
//!   quantbench info --collection test

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info};

use quantbench::benchmark::LatencyBenchmark;
use quantbench::collection::CollectionManager;
use quantbench::config::Config;
use quantbench::dataset::{self, QueryFile};
use quantbench::embedding::EmbeddingService;
use quantbench::generate::{self, DomainMix};
use quantbench::metrics;
use quantbench::results::{self, BenchmarkResults, OversamplingReport};
use quantbench::startup::{build_embeddings, build_store, init_logging, resolve_config_path};
use quantbench::sweep;
use quantbench::types::{CollectionKind, QuantizationMethod, DENSE_VECTOR_NAME};
use quantbench::uploader::Uploader;

#[derive(Parser, Debug)]
#[command(
    name = "quantbench",
    version,
    about = "Latency and accuracy benchmarks for quantized vector collections"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file (default: $QBENCH_CONFIG, then ./quantbench.toml)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Errors only
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// Write Prometheus metrics to this file when the command finishes
    #[arg(long, global = true)]
    metrics_output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a synthetic corpus
    GenerateData(GenerateDataArgs),
    /// Generate a synthetic query set
    GenerateQueries(GenerateQueriesArgs),
    /// Upload a corpus into a hybrid collection
    Upload(UploadArgs),
    /// Build one quantized collection per method from a corpus
    CreateQuantized(CreateQuantizedArgs),
    /// Measure baseline and quantized query latency
    Benchmark(BenchmarkArgs),
    /// Sweep oversampling factors for latency and accuracy retention
    TuneOversampling(TuneArgs),
    /// Show a collection's status and point count
    Info(InfoArgs),
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::GenerateData(_) => "generate-data",
            Command::GenerateQueries(_) => "generate-queries",
            Command::Upload(_) => "upload",
            Command::CreateQuantized(_) => "create-quantized",
            Command::Benchmark(_) => "benchmark",
            Command::TuneOversampling(_) => "tune-oversampling",
            Command::Info(_) => "info",
        }
    }
}

#[derive(Args, Debug)]
struct MixArgs {
    /// Tech domain weight
    #[arg(long, default_value_t = 0.25)]
    tech: f64,
    /// Medical domain weight
    #[arg(long, default_value_t = 0.25)]
    medical: f64,
    /// Pharmaceutical domain weight
    #[arg(long, default_value_t = 0.25)]
    pharma: f64,
    /// Health insurance domain weight
    #[arg(long, default_value_t = 0.25)]
    insurance: f64,
}

impl MixArgs {
    fn mix(&self) -> DomainMix {
        DomainMix {
            tech: self.tech,
            medical: self.medical,
            pharmaceutical: self.pharma,
            health_insurance: self.insurance,
        }
    }
}

#[derive(Args, Debug)]
struct GenerateDataArgs {
    #[arg(short = 'n', long, default_value_t = 10_000)]
    size: usize,
    #[arg(short, long, default_value = "data/dataset.json")]
    output: PathBuf,
    #[command(flatten)]
    mix: MixArgs,
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(Args, Debug)]
struct GenerateQueriesArgs {
    #[arg(short = 'n', long, default_value_t = 20)]
    num_queries: usize,
    #[arg(short, long, default_value = "data/queries.json")]
    output: PathBuf,
    #[command(flatten)]
    mix: MixArgs,
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Extra hand-written queries appended after the generated ones
    #[arg(long, num_args = 1..)]
    manual: Vec<String>,
    /// Print the query list
    #[arg(long)]
    display: bool,
}

#[derive(Args, Debug)]
struct UploadArgs {
    #[arg(short, long)]
    collection: String,
    #[arg(short, long)]
    dataset: PathBuf,
    /// Overrides upload.batch_size
    #[arg(short, long)]
    batch_size: Option<usize>,
    /// Retry batches that time out
    #[arg(long)]
    enable_retry: bool,
    /// Drop and recreate the collection if it exists
    #[arg(long)]
    recreate: bool,
}

#[derive(Args, Debug)]
struct CreateQuantizedArgs {
    #[arg(short, long)]
    dataset: PathBuf,
    #[arg(short, long, num_args = 1.., default_values_t = QuantizationMethod::ALL.to_vec())]
    methods: Vec<QuantizationMethod>,
    /// Retry batches that time out
    #[arg(long)]
    enable_retry: bool,
}

#[derive(Args, Debug)]
struct BenchmarkArgs {
    #[arg(short, long)]
    collection: String,
    /// Query file (default: benchmark.test_queries from config)
    #[arg(long)]
    queries: Option<PathBuf>,
    /// Quantization methods to compare against the baseline
    #[arg(long, num_args = 1..)]
    quantization: Vec<QuantizationMethod>,
    /// Also sweep oversampling factors on this method's collection
    #[arg(long)]
    tune: Option<QuantizationMethod>,
    /// Results file (JSON)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct TuneArgs {
    /// Baseline (hybrid) collection
    #[arg(short, long)]
    collection: String,
    #[arg(short, long, default_value_t = QuantizationMethod::Binary)]
    method: QuantizationMethod,
    #[arg(long)]
    queries: Option<PathBuf>,
    /// Overrides benchmark.oversampling_factors
    #[arg(long, num_args = 1..)]
    factors: Vec<f64>,
    /// Report file (JSON)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct InfoArgs {
    #[arg(short, long)]
    collection: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    // Priority: --config > QBENCH_CONFIG > ./quantbench.toml > defaults
    let path = cli.config.clone().or_else(resolve_config_path);
    let mut config = Config::load(path.as_deref())?;
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    config.logging.verbose |= cli.verbose;
    config.logging.quiet |= cli.quiet;
    if cli.json_logs {
        config.logging.format = "json".to_string();
    }

    init_logging(&config.logging);
    metrics::init();

    let command = cli.command.name();
    let start = Instant::now();
    let outcome = tokio::select! {
        r = run(&cli.command, config) => r,
        _ = tokio::signal::ctrl_c() => Err(anyhow::anyhow!("interrupted")),
    };
    let duration_ms = start.elapsed().as_millis() as u64;

    match &outcome {
        Ok(()) => info!(command, duration_ms, "completed"),
        Err(e) => error!(command, duration_ms, error = %e, "failed"),
    }

    if let Some(path) = &cli.metrics_output {
        std::fs::write(path, metrics::render())
            .with_context(|| format!("writing metrics to {}", path.display()))?;
    }

    outcome
}

async fn run(command: &Command, mut config: Config) -> anyhow::Result<()> {
    match command {
        Command::GenerateData(args) => generate_data(args),
        Command::GenerateQueries(args) => generate_queries(args),
        Command::Upload(args) => {
            if let Some(batch_size) = args.batch_size {
                config.upload.batch_size = batch_size;
            }
            config.upload.enable_retry |= args.enable_retry;
            config.validate()?;
            upload(args, &config).await
        }
        Command::CreateQuantized(args) => {
            config.upload.enable_retry |= args.enable_retry;
            create_quantized(args, &config).await
        }
        Command::Benchmark(args) => benchmark(args, &config).await,
        Command::TuneOversampling(args) => {
            if !args.factors.is_empty() {
                config.benchmark.oversampling_factors = args.factors.clone();
                config.validate()?;
            }
            tune_oversampling(args, &config).await
        }
        Command::Info(args) => collection_info(args, &config).await,
    }
}

fn generate_data(args: &GenerateDataArgs) -> anyhow::Result<()> {
    let mix = args.mix.mix();
    info!(size = args.size, output = %args.output.display(), seed = args.seed, "generating corpus");

    let mut rng = StdRng::seed_from_u64(args.seed);
    let items = generate::generate_corpus(args.size, &mix, &mut rng)?;
    dataset::save_corpus(&args.output, &items)?;

    for (domain, count) in mix.allocate(args.size)? {
        info!(domain = domain.as_str(), count, "domain share");
    }
    Ok(())
}

fn generate_queries(args: &GenerateQueriesArgs) -> anyhow::Result<()> {
    let mix = args.mix.mix();
    info!(num_queries = args.num_queries, seed = args.seed, "generating queries");

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut queries = generate::generate_queries(args.num_queries, &mix, &mut rng)?;
    queries.extend(args.manual.iter().cloned());

    let metadata = serde_json::json!({
        "auto_generated": args.num_queries,
        "manual_added": args.manual.len(),
        "domain_mix": mix,
        "seed": args.seed,
    });
    let metadata = match metadata {
        serde_json::Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    let file = QueryFile::new(queries, metadata);
    dataset::save_queries(&args.output, &file)?;

    if args.display {
        for (i, query) in file.queries.iter().enumerate() {
            println!("{:3}. {query}", i + 1);
        }
    }
    Ok(())
}

async fn upload(args: &UploadArgs, config: &Config) -> anyhow::Result<()> {
    let store = build_store(config)?;
    let embeddings = build_embeddings(config)?;
    let manager = CollectionManager::new(
        store.clone(),
        config.collection.clone(),
        config.embedding.vector_size,
    );

    let items = dataset::load_corpus(&args.dataset)?;

    if args.recreate || !manager.exists(&args.collection).await? {
        manager
            .recreate(&args.collection, CollectionKind::Hybrid, None)
            .await?;
    }

    let vectors = embeddings.encode_items(&items)?;
    let uploader = Uploader::new(store, config.upload.clone());
    let uploaded = uploader
        .upload(&args.collection, &items, &vectors, Some(DENSE_VECTOR_NAME))
        .await?;

    info!(collection = %args.collection, points_uploaded = uploaded, "upload finished");
    Ok(())
}

async fn create_quantized(args: &CreateQuantizedArgs, config: &Config) -> anyhow::Result<()> {
    let store = build_store(config)?;
    let embeddings = build_embeddings(config)?;
    let manager = CollectionManager::new(
        store.clone(),
        config.collection.clone(),
        config.embedding.vector_size,
    );
    let uploader = Uploader::new(store, config.upload.clone());

    let items = dataset::load_corpus(&args.dataset)?;
    let vectors = embeddings.encode_items(&items)?;

    for &method in &args.methods {
        let collection = method.collection_name();
        info!(
            method = method.as_str(),
            collection = %collection,
            expected_speedup = method.expected_speedup(),
            expected_compression = method.expected_compression(),
            "creating quantized collection"
        );
        manager
            .recreate(
                &collection,
                CollectionKind::Quantized,
                Some(config.quantization.get(method)),
            )
            .await?;
        uploader.upload(&collection, &items, &vectors, None).await?;
    }
    Ok(())
}

fn load_test_queries(path: Option<&PathBuf>, config: &Config) -> anyhow::Result<Vec<String>> {
    match path {
        Some(p) => Ok(dataset::load_queries(p)?),
        None => {
            info!(count = config.benchmark.test_queries.len(), "using default queries");
            Ok(config.benchmark.test_queries.clone())
        }
    }
}

fn latency_benchmark(config: &Config) -> anyhow::Result<LatencyBenchmark> {
    let store = build_store(config)?;
    let embeddings: Arc<EmbeddingService> = build_embeddings(config)?;
    Ok(LatencyBenchmark::new(
        store,
        embeddings,
        config.benchmark.clone(),
    ))
}

async fn run_sweep(
    bench: &LatencyBenchmark,
    baseline_collection: &str,
    method: QuantizationMethod,
    queries: &[String],
) -> anyhow::Result<OversamplingReport> {
    let collection = method.collection_name();
    let factors = bench.config().oversampling_factors.clone();

    let latency = sweep::tune_oversampling(bench, &collection, queries, &factors).await?;
    let accuracy = sweep::measure_accuracy(
        bench,
        baseline_collection,
        Some(DENSE_VECTOR_NAME),
        &collection,
        queries,
        &factors,
    )
    .await?;

    println!("{}", results::oversampling_summary(&latency, &accuracy));
    Ok(OversamplingReport {
        collection,
        latency,
        accuracy,
    })
}

async fn benchmark(args: &BenchmarkArgs, config: &Config) -> anyhow::Result<()> {
    let queries = load_test_queries(args.queries.as_ref(), config)?;
    let bench = latency_benchmark(config)?;

    let label = "Baseline (No Quantization)";
    let baseline = bench
        .measure_latency(
            &args.collection,
            &queries,
            Some(DENSE_VECTOR_NAME),
            None,
            label,
        )
        .await?;

    let mut results = BenchmarkResults::new(baseline);
    for &method in &args.quantization {
        let result = bench
            .benchmark_quantization(&method.collection_name(), &queries, method.as_str())
            .await?;
        results.quantization.insert(method.as_str().to_string(), result);
    }

    if let Some(method) = args.tune {
        results.oversampling = Some(run_sweep(&bench, &args.collection, method, &queries).await?);
    }

    if let Some(path) = &args.output {
        results.save(path)?;
    }

    if results.quantization.is_empty() {
        println!("{}", baseline.render(label));
    } else {
        println!("{}", results.analysis_summary());
    }
    Ok(())
}

async fn tune_oversampling(args: &TuneArgs, config: &Config) -> anyhow::Result<()> {
    let queries = load_test_queries(args.queries.as_ref(), config)?;
    let bench = latency_benchmark(config)?;

    let report = run_sweep(&bench, &args.collection, args.method, &queries).await?;

    if let Some(path) = &args.output {
        std::fs::write(path, serde_json::to_vec_pretty(&report)?)
            .with_context(|| format!("writing report to {}", path.display()))?;
        info!(path = %path.display(), "oversampling report saved");
    }
    Ok(())
}

async fn collection_info(args: &InfoArgs, config: &Config) -> anyhow::Result<()> {
    let store = build_store(config)?;
    let manager = CollectionManager::new(
        store,
        config.collection.clone(),
        config.embedding.vector_size,
    );
    let info = manager.get_info(&args.collection).await?;
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}
