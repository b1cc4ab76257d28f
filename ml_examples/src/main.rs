// ml_examples/src/main.rs
//
// Collision-prediction demo: train a [24 -> 12 ReLU -> 1 Sigmoid] network on
// the wall-following sensor dataset (or synthetic readings when the CSV is
// absent), then report per-sample predictions and binary metrics.
use anyhow::Result;
use ffnet::{
    evaluate_binary, load_sensor_data, split, synthetic_readings, Activation, Layer, Network,
    SensorSet, SensorSplit,
};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

const SENSOR_CSV: &str = "sensor_readings_24.csv";
const INPUT_SIZE: usize = 24;
const LEARNING_RATE: f64 = 0.029;
const EPOCHS: usize = 1300;
const BATCH_SIZE: usize = 8;
const TRAIN_FRACTION: f64 = 0.8;

struct Options {
    data_path: String,
    load_model: Option<String>,
    save_model: Option<String>,
}

fn parse_args() -> Options {
    let mut opts = Options {
        data_path: SENSOR_CSV.to_string(),
        load_model: None,
        save_model: None,
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--load" => opts.load_model = args.next(),
            "--save" => opts.save_model = args.next(),
            other => opts.data_path = other.to_string(),
        }
    }
    opts
}

fn load_or_synthesize(path: &str, rng: &mut StdRng) -> Result<SensorSplit> {
    match load_sensor_data(path) {
        Ok(data) => Ok(split(&data, TRAIN_FRACTION, rng)?),
        Err(err) => {
            warn!("{path}: {err}; falling back to synthetic readings");
            let (features, labels) = synthetic_readings(200, INPUT_SIZE, rng);
            let data = SensorSet {
                ids: (0..features.len()).collect(),
                features,
                labels,
            };
            Ok(split(&data, TRAIN_FRACTION, rng)?)
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let opts = parse_args();
    let mut rng = StdRng::seed_from_u64(0xf0f0);

    let SensorSplit { train, test } = load_or_synthesize(&opts.data_path, &mut rng)?;
    info!("train: {} samples, test: {} samples", train.len(), test.len());

    let layers = vec![
        Layer::new(0, INPUT_SIZE, Activation::None)?,
        Layer::new(1, 12, Activation::ReLU)?,
        Layer::new(2, 1, Activation::Sigmoid)?,
    ];
    let mut network = Network::with_rng(layers, &mut rng)?;
    info!("{network}");

    match &opts.load_model {
        Some(path) => {
            info!("loading model from {path}");
            network.load(path)?;
        }
        None => {
            let summary = network.train(
                &train.features,
                &train.labels,
                LEARNING_RATE,
                EPOCHS,
                BATCH_SIZE,
                true,
            )?;
            info!(
                "trained {} epochs, final BCE {:.6}, {} ms",
                summary.epochs,
                summary.final_bce,
                summary.elapsed.as_millis()
            );
        }
    }

    println!("------------------- Predictions --------------------");
    for i in 0..test.len() {
        let prediction = network.predict(&test.features[i])?;
        println!(
            "row {:>5} | prediction: {:.4} | actual: {}",
            test.ids[i], prediction[0], test.labels[i][0]
        );
    }

    let matrix = evaluate_binary(&mut network, &test.features, &test.labels)?;
    println!("------------------- Metrics ------------------------");
    println!("{matrix}");

    if let Some(path) = &opts.save_model {
        network.save(path)?;
        info!("model saved to {path}");
    }

    Ok(())
}
