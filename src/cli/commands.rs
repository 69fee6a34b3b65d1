// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the four subcommands: `train`, `evaluate`, `sample`
// and `encode`, and all their configurable flags.
//
// clap's derive macros generate --help text, error messages
// for missing args and the string → number conversions.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand, ValueEnum};

use crate::application::{
    data_source::DataSource,
    train_use_case::TrainConfig,
};
use crate::data::loader::DataFormat;
use crate::infra::checkpoint::EpochSelector;
use crate::ml::backend::BackendKind;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the VAE on a binary (or binarised) dataset
    Train(TrainArgs),

    /// Estimate the ELBO of a dataset under a trained checkpoint
    Evaluate(EvaluateArgs),

    /// Generate new observations from a trained checkpoint
    Sample(SampleArgs),

    /// Write the latent embedding (mu, logsigma) of every observation
    Encode(EncodeArgs),
}

/// Compute backend, mirrors `ml::backend::BackendKind`
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum BackendArg {
    /// NdArray on the CPU
    #[default]
    Cpu,
    /// wgpu (Vulkan, Metal, DX12)
    Wgpu,
}

impl From<BackendArg> for BackendKind {
    fn from(b: BackendArg) -> Self {
        match b {
            BackendArg::Cpu  => BackendKind::Cpu,
            BackendArg::Wgpu => BackendKind::Wgpu,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum FormatArg {
    /// IDX for *ubyte / *.idx* files, CSV otherwise
    #[default]
    Auto,
    Csv,
    Idx,
}

impl From<FormatArg> for DataFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Auto => DataFormat::Auto,
            FormatArg::Csv  => DataFormat::Csv,
            FormatArg::Idx  => DataFormat::Idx,
        }
    }
}

/// Parses `latest`, `best` or an epoch number.
pub fn parse_epoch(s: &str) -> Result<EpochSelector, String> {
    match s {
        "latest" => Ok(EpochSelector::Latest),
        "best"   => Ok(EpochSelector::Best),
        n => n
            .parse::<usize>()
            .ok()
            .filter(|&n| n > 0)
            .map(EpochSelector::Epoch)
            .ok_or_else(|| format!("expected 'latest', 'best' or an epoch number >= 1, got '{n}'")),
    }
}

/// Where to read observations from. Shared by train, evaluate and encode.
#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    /// CSV file (one observation per row) or IDX file (e.g. train-images-idx3-ubyte)
    #[arg(long)]
    pub data: String,

    /// File format
    #[arg(long, value_enum, default_value_t = FormatArg::Auto)]
    pub format: FormatArg,

    /// The CSV file starts with a header row
    #[arg(long)]
    pub has_headers: bool,

    /// Values above this become 1, the rest 0
    #[arg(long, default_value_t = 0.5)]
    pub threshold: f32,

    /// Use only the first N observations
    #[arg(long)]
    pub limit: Option<usize>,
}

impl From<DataArgs> for DataSource {
    fn from(a: DataArgs) -> Self {
        DataSource {
            path:        a.data,
            format:      a.format.into(),
            has_headers: a.has_headers,
            threshold:   a.threshold,
            limit:       a.limit,
        }
    }
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Directory to save checkpoints, config and metrics. Reusing the
    /// directory of an earlier run appends to its metrics.csv and leaves
    /// its model_epoch_N files in place
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Dimension of the latent variable z
    #[arg(long, default_value_t = 2)]
    pub latent_dim: usize,

    /// Hidden width of the encoder and decoder
    #[arg(long, default_value_t = 100)]
    pub hidden_dim: usize,

    /// Observations per mini-batch
    #[arg(long, default_value_t = 128)]
    pub batch_size: usize,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 10)]
    pub epochs: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Share of observations used for training, the rest validates
    #[arg(long, default_value_t = 0.9)]
    pub train_fraction: f64,

    /// Seed for the split, the shuffle and the backend RNG
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

impl TrainArgs {
    /// The application layer never sees clap types.
    pub fn into_config(self, backend: BackendKind) -> TrainConfig {
        TrainConfig {
            data:           self.data.into(),
            checkpoint_dir: self.checkpoint_dir,
            backend,
            input_dim:      0,
            latent_dim:     self.latent_dim,
            hidden_dim:     self.hidden_dim,
            batch_size:     self.batch_size,
            epochs:         self.epochs,
            lr:             self.lr,
            train_fraction: self.train_fraction,
            seed:           self.seed,
        }
    }
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Checkpoint to load: latest, best or an epoch number
    #[arg(long, default_value = "best", value_parser = parse_epoch)]
    pub epoch: EpochSelector,

    #[arg(long, default_value_t = 128)]
    pub batch_size: usize,

    /// Reparametrized draws of z averaged per observation
    #[arg(long, default_value_t = 1)]
    pub mc_samples: usize,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

#[derive(Args, Debug)]
pub struct SampleArgs {
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Checkpoint to load: latest, best or an epoch number
    #[arg(long, default_value = "best", value_parser = parse_epoch)]
    pub epoch: EpochSelector,

    /// How many observations to generate
    #[arg(long, default_value_t = 16)]
    pub num_samples: usize,

    /// CSV file receiving z, theta and x for each sample
    #[arg(long, default_value = "samples.csv")]
    pub output: String,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Checkpoint to load: latest, best or an epoch number
    #[arg(long, default_value = "best", value_parser = parse_epoch)]
    pub epoch: EpochSelector,

    #[arg(long, default_value_t = 128)]
    pub batch_size: usize,

    /// CSV file receiving index, mu and logsigma per observation
    #[arg(long, default_value = "latents.csv")]
    pub output: String,
}
