use std::path::PathBuf;

use aws_exam_prep::ads::TimedAdProvider;
use aws_exam_prep::clock::SystemClock;
use aws_exam_prep::config::load_config;
use aws_exam_prep::quota::QuotaManager;
use aws_exam_prep::results::ResultStore;
use aws_exam_prep::storage::FilePreferences;
use aws_exam_prep::telemetry::init_tracing;
use aws_exam_prep::{App, ExamTrack, QuizError};
use clap::Parser;
use tracing::info;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// TOML config file (falls back to $AWS_EXAM_PREP_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Exam to practise for
    #[arg(short, long, value_enum, default_value_t = ExamTrack::default())]
    exam: ExamTrack,

    /// Directory holding the <exam>.json question banks
    #[arg(long)]
    bank_dir: Option<PathBuf>,

    /// Directory for quota, history and logs
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("Error running quiz: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), QuizError> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(bank_dir) = args.bank_dir {
        config.bank_dir = bank_dir;
    }
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }

    init_tracing(&config.data_dir)?;
    info!(
        target: "app",
        exam = args.exam.bank_id(),
        bank_dir = %config.bank_dir.display(),
        data_dir = %config.data_dir.display(),
        "Starting"
    );

    let quota = QuotaManager::new(
        config.quota.clone(),
        Box::new(FilePreferences::open(config.quota_path())),
        Box::new(SystemClock),
    );
    let results = ResultStore::new(Box::new(FilePreferences::open(config.results_path())));
    let ads = TimedAdProvider::new(config.ad.clone());

    let app = App::new(
        config,
        args.exam,
        Box::new(quota),
        Box::new(results),
        Box::new(ads),
    );
    aws_exam_prep::run(app).await
}
