use multichannel_trainer::config::load_config;
use multichannel_trainer::model::LinearModel;
use multichannel_trainer::optimizers::Sgd;
use multichannel_trainer::source::CompositeSource;
use multichannel_trainer::trainer::Trainer;
use multichannel_trainer::utils::SimpleRng;
use std::io::BufRead;
use std::process;
use std::time::Instant;

// Multi-channel linear regression trained with minibatch SGD.
// Map files and the CTF target file are listed in the JSON config.
const CONFIG_PATH: &str = "config/train_multichannel.json";
const RNG_SEED: u64 = 1;

fn main() {
    let program_start = Instant::now();

    println!("Loading configuration from {}...", CONFIG_PATH);
    let config = load_config(CONFIG_PATH).unwrap_or_else(|err| {
        eprintln!("Could not load configuration: {}", err);
        process::exit(1);
    });

    println!("Building minibatch source...");
    let load_start = Instant::now();
    let mut source = CompositeSource::from_config(&config).unwrap_or_else(|err| {
        eprintln!("Could not build minibatch source: {}", err);
        process::exit(1);
    });
    println!(
        "Loaded {} examples across {} channels in {:.2} seconds",
        source.example_count(),
        config.channels.len(),
        load_start.elapsed().as_secs_f64()
    );

    println!("Initializing linear model...");
    let mut rng = SimpleRng::new(RNG_SEED);
    let model = LinearModel::new(
        config.channel_height,
        config.channel_width,
        config.channels.len(),
        config.output_size,
        &mut rng,
    );
    let channel_names = config
        .channels
        .iter()
        .map(|channel| channel.name.clone())
        .collect();
    let mut trainer = Trainer::new(
        model,
        Box::new(Sgd::new(config.learning_rate)),
        channel_names,
    );

    println!("Training...");
    let train_start = Instant::now();
    let summary = trainer
        .run(
            &mut source,
            config.minibatch_size,
            config.log_interval_sweeps,
        )
        .unwrap_or_else(|err| {
            eprintln!("Training failed: {}", err);
            process::exit(1);
        });
    println!(
        "Trained on {} minibatches over {} sweeps in {:.2} seconds",
        summary.minibatches,
        summary.sweeps,
        train_start.elapsed().as_secs_f64()
    );
    println!(
        "Final minibatch loss: {}",
        trainer.previous_minibatch_loss_average()
    );
    println!(
        "Total program time: {:.2} seconds",
        program_start.elapsed().as_secs_f64()
    );

    // Keep the terminal open until the user acknowledges the run.
    println!("Press Enter to exit.");
    let mut line = String::new();
    let _ = std::io::stdin().lock().read_line(&mut line);
}
