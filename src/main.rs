use std::{env, fs::read_to_string};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;
use contextual_neurons::{
    neuron::{
        contextual_modulation::{
            Channel, ContextualModulationNeuron, ContextualModulationParameters, ContextualModulationState,
        },
        Recordables, SpikeHistory,
    },
    recording::DataLogger,
    rng::RngManager,
    simulation::{NeuronRun, SimulationClock, SpikeEvent, Time},
    status::Status,
};


#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct SimulationParameters {
    /// Resolution (ms)
    resolution: f64,
    /// Minimum delay (steps)
    min_delay: i64,
    /// Maximum delay (steps)
    max_delay: i64,
    /// Steps to simulate
    steps: i64,
    seed: u64,
    /// Sampling interval (steps)
    record_interval: i64,
    record_from: Vec<String>,
    output: String,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        SimulationParameters {
            resolution: 0.1,
            min_delay: 10,
            max_delay: 20,
            steps: 1000,
            seed: 0,
            record_interval: 1,
            record_from: Vec::new(),
            output: String::from("contextual_neuron.csv"),
        }
    }
}

fn default_multiplicity() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
struct InputSpike {
    channel: Channel,
    /// Emission time (ms)
    time: f64,
    /// Delay (ms)
    delay: f64,
    weight: f64,
    #[serde(default = "default_multiplicity")]
    multiplicity: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RunConfig {
    simulation: SimulationParameters,
    neuron: Status,
    input: Vec<InputSpike>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        bail!("Requires .toml argument file");
    }

    let toml_content = read_to_string(&args[1])
        .with_context(|| format!("Cannot read file {}", args[1]))?;
    let config: RunConfig = toml::from_str(&toml_content).context("Cannot read config")?;
    let sim_params = config.simulation;

    let clock = SimulationClock::new(sim_params.resolution, sim_params.min_delay, sim_params.max_delay)?;
    let rngs = RngManager::new(sim_params.seed, 1)?;

    let record_from = if sim_params.record_from.is_empty() {
        ContextualModulationState::recordable_names().into_iter().map(String::from).collect()
    } else {
        sim_params.record_from.clone()
    };

    let mut neuron = ContextualModulationNeuron::new(
        ContextualModulationParameters::default(),
        ContextualModulationState::default(),
        SpikeHistory::default(),
        DataLogger::<ContextualModulationState>::new(record_from.clone(), sim_params.record_interval),
    );
    neuron.set_status(&config.neuron)?;
    info!("neuron: {}", neuron.get_status().to_json()?);

    let mut run = NeuronRun::new(neuron, clock.clone());
    run.prepare(&rngs)?;

    for spike in config.input.iter() {
        let mut event = SpikeEvent::new(
            Time::from_ms(spike.time, clock.get_resolution())?,
            clock.ms_to_steps(spike.delay)?,
            spike.weight,
            spike.channel.receptor_type(),
        );
        event.multiplicity = spike.multiplicity;

        run.schedule(event)?;
    }
    info!("scheduled {} input spikes", config.input.len());

    let spikes = run.simulate(sim_params.steps)?;
    info!(
        "spike times (ms): {:?}",
        spikes.iter()
            .map(|step| Time::step(*step).get_ms(clock.get_resolution()))
            .collect::<Vec<f64>>()
    );

    let mut writer = csv::Writer::from_path(&sim_params.output)
        .with_context(|| format!("Cannot write to {}", sim_params.output))?;

    let mut header = vec![String::from("step"), String::from("time")];
    header.extend(record_from);
    writer.write_record(&header)?;

    for sample in run.node.handle_data_logging_request() {
        let mut row = vec![
            sample.step.to_string(),
            Time::step(sample.step).get_ms(clock.get_resolution()).to_string(),
        ];
        row.extend(sample.values.iter().map(|value| value.to_string()));

        writer.write_record(&row)?;
    }
    writer.flush()?;

    info!("wrote samples to {}", sim_params.output);

    Ok(())
}
