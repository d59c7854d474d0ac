use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;

use densenet::{BiasUpdate, DenseMatrix, LayerSpec, Network, Sigmoid, Swish, TrainConfig};

fn main() -> densenet::Result<()> {
    tracing_subscriber::fmt::init();

    let x = DenseMatrix::from_rows(&[[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]])?;
    let y = DenseMatrix::from_rows(&[[0.0], [1.0], [1.0], [0.0]])?;

    let mut rng = StdRng::seed_from_u64(2);
    let mut net = Network::from_specs_using(
        &[LayerSpec::new(2, 8, Swish::new()), LayerSpec::new(8, 1, Sigmoid)],
        &mut rng,
    )?;

    let config = TrainConfig::default()
        .with_epochs(2000)
        .with_learning_rate(0.5)
        .with_batch_size(4)
        .with_bias_update(BiasUpdate::BatchSum);

    println!("loss before training: {:.4}", net.loss(&x, &y)?);
    let t0 = Instant::now();
    net.fit_with(&x, &y, &config)?;
    println!("trained {} epochs in {:?}", config.epochs + 1, t0.elapsed());
    println!("loss after training: {:.4}", net.loss(&x, &y)?);

    let yh = net.predict(&x)?;
    for (input, output) in x.to_rows().iter().zip(yh.to_rows()) {
        println!("{input:?} -> {:.3}", output[0]);
    }
    Ok(())
}
