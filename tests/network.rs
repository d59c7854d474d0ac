//! End-to-end behavior of `Network`: wiring, training, and update semantics.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use densenet::*;

#[test]
fn linear_forward_wiring() {
    let weights = DenseMatrix::from_rows(&[[1.0], [1.0]]).unwrap();
    let layer = DenseLayer::from_parts(weights, vec![0.0], Linear).unwrap();
    let net = Network::new(vec![layer]);
    let x = DenseMatrix::from_rows(&[[1.0, 2.0]]).unwrap();
    assert_eq!(net.predict(&x).unwrap().to_rows(), vec![vec![3.0]]);
}

#[test]
fn mismatched_input_aborts_predict() {
    let net = Network::from_specs(&[LayerSpec::new(3, 2, Relu), LayerSpec::new(2, 1, Linear)])
        .unwrap();
    let x = DenseMatrix::from_rows(&[[1.0, 2.0]]).unwrap();
    assert!(matches!(
        net.predict(&x),
        Err(Error::ShapeMismatch { op: "matmul", .. })
    ));
}

#[test]
fn unchained_layers_fail_when_run() {
    let net = Network::new(vec![
        DenseLayer::new(2, 3, Relu).unwrap(),
        DenseLayer::new(2, 1, Linear).unwrap(),
    ]);
    let x = DenseMatrix::from_rows(&[[1.0, 2.0]]).unwrap();
    assert!(matches!(net.predict(&x), Err(Error::ShapeMismatch { .. })));
}

/// `y = 2a - b + 0.5`, with a constant third input so the last row of the
/// weight gradient is exactly the bias gradient.
fn linear_data() -> (DenseMatrix, DenseMatrix) {
    let mut rng = StdRng::seed_from_u64(5);
    let mut xs = vec![];
    let mut ys = vec![];
    for _ in 0..8 {
        let a: f64 = rng.gen_range(-1.0..1.0);
        let b: f64 = rng.gen_range(-1.0..1.0);
        xs.push(vec![a, b, 1.0]);
        ys.push(vec![2.0 * a - b + 0.5]);
    }
    (
        DenseMatrix::from_rows(&xs).unwrap(),
        DenseMatrix::from_rows(&ys).unwrap(),
    )
}

#[test]
fn training_reduces_loss() {
    let (x, y) = linear_data();
    let mut rng = StdRng::seed_from_u64(11);
    let mut net = Network::from_specs_using(&[LayerSpec::new(3, 1, Linear)], &mut rng).unwrap();

    let before = net.loss(&x, &y).unwrap();
    net.fit(&x, &y, 50, 0.01, 64).unwrap();
    let after = net.loss(&x, &y).unwrap();
    assert!(after < before, "loss went from {before} to {after}");
}

/// Two clusters on either side of the line `a + b = 0`.
fn two_class_data(n: usize) -> (DenseMatrix, DenseMatrix) {
    let mut rng = StdRng::seed_from_u64(3);
    let mut xs = vec![];
    let mut ys = vec![];
    for i in 0..n {
        let label = (i % 2) as f64;
        let center = if label == 1.0 { 0.5 } else { -0.5 };
        xs.push(vec![
            center + rng.gen_range(-0.3..0.3),
            center + rng.gen_range(-0.3..0.3),
        ]);
        ys.push(vec![label]);
    }
    (
        DenseMatrix::from_rows(&xs).unwrap(),
        DenseMatrix::from_rows(&ys).unwrap(),
    )
}

#[test]
fn hidden_layer_training_reduces_loss() {
    let (x, y) = two_class_data(20);
    let mut rng = StdRng::seed_from_u64(1);
    let mut net = Network::from_specs_using(
        &[LayerSpec::new(2, 4, Sigmoid), LayerSpec::new(4, 1, Linear)],
        &mut rng,
    )
    .unwrap();

    let config = TrainConfig::default()
        .with_epochs(200)
        .with_learning_rate(0.001)
        .with_bias_update(BiasUpdate::BatchSum);
    let before = net.loss(&x, &y).unwrap();
    net.fit_with(&x, &y, &config).unwrap();
    let after = net.loss(&x, &y).unwrap();
    assert!(after < before, "loss went from {before} to {after}");
}

#[test]
fn mini_batches_update_per_batch() {
    // Zero epochs still means one pass, and a pass over 5 rows in batches
    // of 2 makes three updates. Replaying them by hand must agree.
    let (x, y) = linear_data();
    let x = x.split_rows(5).unwrap().remove(0);
    let y = y.split_rows(5).unwrap().remove(0);
    let mut rng = StdRng::seed_from_u64(9);
    let net = Network::from_specs_using(&[LayerSpec::new(3, 1, Swish::new())], &mut rng).unwrap();

    let mut fitted = net.clone();
    fitted.fit(&x, &y, 0, 0.05, 2).unwrap();

    let mut manual = net.clone();
    let batches = x.split_rows(2).unwrap().into_iter().zip(y.split_rows(2).unwrap());
    for (xb, yb) in batches {
        manual
            .train_batch(&xb, &yb, 0.05, BiasUpdate::LastGradientRow)
            .unwrap();
    }
    assert_eq!(fitted.layers()[0].weights(), manual.layers()[0].weights());
    assert_eq!(fitted.layers()[0].bias(), manual.layers()[0].bias());
    assert_ne!(fitted.layers()[0].weights(), net.layers()[0].weights());
}

fn perturbed(m: &DenseMatrix, i: usize, delta: f64) -> DenseMatrix {
    let mut data = m.to_vec();
    data[i] += delta;
    DenseMatrix::new(data, m.shape()).unwrap()
}

fn replace_layer(net: &Network, index: usize, weights: DenseMatrix, bias: Vec<f64>) -> Network {
    let mut layers = net.layers().to_vec();
    let activation = layers[index].activation();
    layers[index] = DenseLayer::from_parts(weights, bias, activation).unwrap();
    Network::new(layers)
}

/// Every layer's update must be the gradient of the loss at the parameters
/// the batch started with, which only holds if no layer is updated before
/// the layers below it have used its weights.
#[test]
fn batch_update_is_the_loss_gradient() {
    let mut rng = StdRng::seed_from_u64(23);
    let net = Network::from_specs_using(
        &[
            LayerSpec::new(3, 4, Swish::new()),
            LayerSpec::new(4, 3, Relu),
            LayerSpec::new(3, 2, Sigmoid),
        ],
        &mut rng,
    )
    .unwrap();
    let x = DenseMatrix::random_using(MatrixShape::new(5, 3).unwrap(), -1.0, 1.0, &mut rng);
    let y = DenseMatrix::random_using(MatrixShape::new(5, 2).unwrap(), 0.0, 1.0, &mut rng);

    let mut trained = net.clone();
    trained.train_batch(&x, &y, 1.0, BiasUpdate::BatchSum).unwrap();

    let h = 1e-6;
    let check = |claimed: f64, plus: Network, minus: Network, what: &str| {
        let measured =
            (plus.loss(&x, &y).unwrap() - minus.loss(&x, &y).unwrap()) / (2.0 * h);
        let error = (claimed - measured).abs() / measured.abs().max(0.01);
        assert!(
            error <= 1e-4,
            "{what}: computed derivative = {claimed}, measured = {measured}"
        );
    };

    for (l, (old, new)) in net.layers().iter().zip(trained.layers()).enumerate() {
        let dw = old.weights().subtract(new.weights()).unwrap().to_vec();
        for (i, &claimed) in dw.iter().enumerate() {
            check(
                claimed,
                replace_layer(&net, l, perturbed(old.weights(), i, h), old.bias().to_vec()),
                replace_layer(&net, l, perturbed(old.weights(), i, -h), old.bias().to_vec()),
                &format!("layer {l} weight {i}"),
            );
        }
        for i in 0..old.bias().len() {
            let claimed = old.bias()[i] - new.bias()[i];
            let mut plus = old.bias().to_vec();
            plus[i] += h;
            let mut minus = old.bias().to_vec();
            minus[i] -= h;
            check(
                claimed,
                replace_layer(&net, l, old.weights().clone(), plus),
                replace_layer(&net, l, old.weights().clone(), minus),
                &format!("layer {l} bias {i}"),
            );
        }
    }
}

#[test]
fn failed_batch_commits_nothing() {
    let mut rng = StdRng::seed_from_u64(4);
    let mut net = Network::from_specs_using(
        &[LayerSpec::new(2, 3, Relu), LayerSpec::new(3, 1, Linear)],
        &mut rng,
    )
    .unwrap();
    let before = net.clone();
    let x = DenseMatrix::from_rows(&[[1.0, 2.0]]).unwrap();
    let y = DenseMatrix::from_rows(&[[1.0, 2.0]]).unwrap();

    assert!(net.train_batch(&x, &y, 0.1, BiasUpdate::default()).is_err());
    for (a, b) in net.layers().iter().zip(before.layers()) {
        assert_eq!(a.weights(), b.weights());
        assert_eq!(a.bias(), b.bias());
    }
}

#[test]
fn load_pretrained_layers() {
    let mut net = Network::from_specs(&[LayerSpec::new(2, 2, Relu), LayerSpec::new(2, 1, Linear)])
        .unwrap();
    let records = [
        r#"{"weights": [[1.0, 0.0], [0.0, 1.0]], "bias": [[0.0, -1.0]]}"#,
        r#"{"weights": [[1.0], [2.0]], "bias": [[0.5]]}"#,
    ];
    for (layer, record) in net.layers_mut().iter_mut().zip(records) {
        layer.load(&LayerParams::from_json(record).unwrap()).unwrap();
    }
    let x = DenseMatrix::from_rows(&[[3.0, 0.5], [1.0, 4.0]]).unwrap();
    // Hidden: relu([3, -0.5]) = [3, 0] and relu([1, 3]) = [1, 3].
    assert_eq!(net.predict(&x).unwrap().to_vec(), vec![3.5, 7.5]);
}
