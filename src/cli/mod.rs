// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with clap.
// All work is delegated to Layer 2 (application).
//
//   1. `train`    — fits the VAE, checkpoints every epoch
//   2. `evaluate` — ELBO of a dataset under a checkpoint
//   3. `sample`   — generates new observations
//   4. `encode`   — latent embeddings of a dataset
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{BackendArg, Commands, EncodeArgs, EvaluateArgs, SampleArgs, TrainArgs};

use crate::ml::backend::BackendKind;

#[derive(Parser, Debug)]
#[command(
    name = "vae-cli",
    version,
    about = "Train a variational autoencoder on binary data, then sample, encode and evaluate."
)]
pub struct Cli {
    /// Compute backend for training and inference
    #[arg(long, value_enum, global = true, default_value_t = BackendArg::Cpu)]
    pub backend: BackendArg,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        let backend = BackendKind::from(self.backend);
        match self.command {
            Commands::Train(args)    => run_train(args, backend),
            Commands::Evaluate(args) => run_evaluate(args, backend),
            Commands::Sample(args)   => run_sample(args, backend),
            Commands::Encode(args)   => run_encode(args, backend),
        }
    }
}

fn run_train(args: TrainArgs, backend: BackendKind) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on '{}'", args.data.data);
    let checkpoint_dir = args.checkpoint_dir.clone();
    let summary = TrainUseCase::new(args.into_config(backend)).execute()?;

    println!(
        "Training complete. Final train loss {:.4}, best validation ELBO {:.4} at epoch {}/{}. Checkpoints in '{}'.",
        summary.final_train_loss, summary.best_val_elbo, summary.best_epoch, summary.epochs, checkpoint_dir,
    );
    Ok(())
}

fn run_evaluate(args: EvaluateArgs, backend: BackendKind) -> Result<()> {
    use crate::application::evaluate_use_case::{EvaluateRequest, EvaluateUseCase};

    let report = EvaluateUseCase::new(EvaluateRequest {
        data:           args.data.into(),
        checkpoint_dir: args.checkpoint_dir,
        backend,
        epoch:          args.epoch,
        batch_size:     args.batch_size,
        mc_samples:     args.mc_samples,
        seed:           args.seed,
    })
    .execute()?;

    println!("\n{report}");
    Ok(())
}

fn run_sample(args: SampleArgs, backend: BackendKind) -> Result<()> {
    use crate::application::sample_use_case::{SampleRequest, SampleUseCase};

    let output = args.output.clone();
    let written = SampleUseCase::new(SampleRequest {
        checkpoint_dir: args.checkpoint_dir,
        backend,
        epoch:          args.epoch,
        num_samples:    args.num_samples,
        output:         args.output,
        seed:           args.seed,
    })
    .execute()?;

    println!("Wrote {written} samples to '{output}'.");
    Ok(())
}

fn run_encode(args: EncodeArgs, backend: BackendKind) -> Result<()> {
    use crate::application::encode_use_case::{EncodeRequest, EncodeUseCase};

    let output = args.output.clone();
    let written = EncodeUseCase::new(EncodeRequest {
        data:           args.data.into(),
        checkpoint_dir: args.checkpoint_dir,
        backend,
        epoch:          args.epoch,
        batch_size:     args.batch_size,
        output:         args.output,
    })
    .execute()?;

    println!("Wrote {written} latent codes to '{output}'.");
    Ok(())
}
