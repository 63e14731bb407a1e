use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tensorgrad::train::Trainer;
use tensorgrad::{power, relu, render_tree, Node, TrainConfig};

/// Scalar and tensor autodiff demos
#[derive(Parser, Debug)]
#[command(name = "tensorgrad")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Differentiate relu(((a * b) + c) * f)^-1 and print the graph
    Expr,

    /// Train a small MLP on a four-sample dataset
    Train(TrainArgs),
}

#[derive(Args, Debug)]
struct TrainArgs {
    /// JSON training configuration
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    learning_rate: Option<f64>,

    #[arg(long)]
    epochs: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Command::Expr => run_expr(),
        Command::Train(args) => run_train(args),
    }
}

fn run_expr() -> anyhow::Result<()> {
    let a = Node::scalar(2.0);
    let b = Node::scalar(-3.0);
    let c = Node::scalar(10.0);
    let e = &a * &b;
    let d = &e + &c;
    let f = Node::scalar(2.0);
    let l = &d * &f;
    let result = relu(&power(&l, -1.0));

    result.backward()?;
    print!("{}", render_tree(&result)?);
    Ok(())
}

fn run_train(args: TrainArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            TrainConfig::from_json(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => TrainConfig::default(),
    };
    if let Some(lr) = args.learning_rate {
        config.learning_rate = lr;
    }
    if let Some(epochs) = args.epochs {
        config.max_epochs = epochs;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let inputs = vec![
        vec![2.0, 3.0, -1.0],
        vec![3.0, -1.0, 0.5],
        vec![0.5, 1.0, 1.0],
        vec![1.0, 1.0, -1.0],
    ];
    let targets = [1.0, -1.0, -1.0, 1.0];

    let trainer = Trainer::new(config)?;
    log::info!(
        "training layers {:?} for up to {} epochs",
        trainer.config().layers,
        trainer.config().max_epochs
    );
    let mut mlp = trainer.build_model()?;
    let report = trainer.fit(&mut mlp, &inputs, &targets)?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    for (x, y) in inputs.iter().zip(targets) {
        let prediction = mlp.predict(x)?;
        println!("{x:?} -> {prediction:?} (target {y})");
    }
    Ok(())
}
