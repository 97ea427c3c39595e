use clap::Parser;
use jobrec_classifiers::DeviceType;

#[derive(Parser, Debug, Clone)]
#[command(name = "jobrec-server")]
#[command(author, version, about = "Job recommendation classification API", long_about = None)]
pub struct Cli {
    /// Configuration file path (optional; defaults apply when missing)
    #[arg(short, long, env = "JOBREC_CONFIG", default_value = "jobrec.yaml")]
    pub config: String,

    /// Hugging Face repo id or local model directory
    #[arg(short, long, env = "JOBREC_MODEL")]
    pub model: Option<String>,

    /// Inference device: cpu, cuda[:N] or metal[:N]
    #[arg(short, long, env = "JOBREC_DEVICE")]
    pub device: Option<DeviceType>,

    /// Maximum tokens per request; longer input is truncated
    #[arg(long, env = "JOBREC_MAX_LENGTH")]
    pub max_length: Option<usize>,

    /// Listen address
    #[arg(short = 'l', long, env = "JOBREC_LISTEN")]
    pub listen: Option<String>,

    /// Listen port
    #[arg(short = 'P', long, env = "JOBREC_PORT")]
    pub port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long, env = "JOBREC_VERBOSE")]
    pub verbose: bool,
}
