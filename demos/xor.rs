use escalator_net::{ActivationFunction, Engine, NetworkOptions, Parameter};

fn main() -> escalator_net::Result<()> {
    let engine = Engine::new();
    let net = engine.create_with(
        &[2, 3, 1],
        ActivationFunction::Sigmoid,
        NetworkOptions::new().seed(42),
    )?;

    engine.set_hyperparameter(net, Parameter::LearningRate, 0.5)?;
    engine.set_hyperparameter(net, Parameter::IterationMax, 10_000.0)?;
    engine.set_hyperparameter_named(net, "convergence_threshold", 1e-5)?;

    // Rows can be added one at a time...
    engine.add_example(net, &[0.0, 0.0], &[0.0])?;
    engine.add_example(net, &[0.0, 1.0], &[1.0])?;
    // ...or as one flat row-major batch.
    engine.add_examples(net, 2, &[1.0, 0.0, 1.0, 1.0], &[1.0, 0.0])?;

    let report = engine.train(net)?;
    println!("{report:?}");

    for input in [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]] {
        let output = engine.predict_one(net, &input)?;
        println!("Input: {:?} -> Output: {:.4}", input, output[0]);
    }

    println!("{}", engine.get_state(net)?);
    engine.delete(net)?;
    Ok(())
}
