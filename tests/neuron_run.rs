#[cfg(test)]
mod tests {
    use rand::rngs::mock::StepRng;
    use contextual_neurons::{
        error::{BufferError, ContextualNeuronError, EventError, SimulationError},
        neuron::{
            contextual_modulation::{
                ContextualModulationNeuron, CONTEXTUAL_FIELD_RECEPTOR, RECEPTIVE_FIELD_RECEPTOR,
            },
            Node, SpikeArchive, SpikeSink,
        },
        rng::RngManager,
        simulation::{NeuronRun, SimulationClock, SpikeEvent, Time},
    };


    // refuses events with negative weights while `refuse_negative` is set
    #[derive(Debug, Clone, Default)]
    struct SelectiveNode {
        refuse_negative: bool,
        received: Vec<f64>,
    }

    impl Node for SelectiveNode {
        fn init_buffers(&mut self, _: &SimulationClock) {}

        fn calibrate(&mut self, _: &RngManager) -> Result<(), ContextualNeuronError> {
            Ok(())
        }

        fn handles_test_event(&self, _: i64) -> Result<(), EventError> {
            Ok(())
        }

        fn handle(&mut self, event: &SpikeEvent, _: &SimulationClock) -> Result<(), ContextualNeuronError> {
            if self.refuse_negative && event.weight < 0. {
                return Err(BufferError::OffsetOutsideHorizon { offset: 0, size: 0 }.into());
            }

            self.received.push(event.weight);

            Ok(())
        }

        fn update<S: SpikeSink>(
            &mut self,
            _: Time,
            _: i64,
            _: i64,
            _: &mut S,
        ) -> Result<(), ContextualNeuronError> {
            Ok(())
        }
    }

    fn run_with(rng: StepRng, min_delay: i64, max_delay: i64) -> Result<NeuronRun<ContextualModulationNeuron>, ContextualNeuronError> {
        let mut run = NeuronRun::new(
            ContextualModulationNeuron::default_impl(),
            SimulationClock::new(0.1, min_delay, max_delay)?,
        );
        run.prepare(&RngManager::from_generators(vec![rng])?)?;

        Ok(run)
    }

    #[test]
    pub fn test_simulate_requires_preparation() -> Result<(), ContextualNeuronError> {
        let mut run = NeuronRun::new(
            ContextualModulationNeuron::default_impl(),
            SimulationClock::new(0.1, 10, 10)?,
        );

        assert!(matches!(
            run.simulate(10),
            Err(ContextualNeuronError::SimulationRelatedError(SimulationError::NotPrepared)),
        ));

        Ok(())
    }

    #[test]
    pub fn test_one_spike_per_window() -> Result<(), ContextualNeuronError> {
        let mut run = run_with(StepRng::new(0, 0), 10, 10)?;

        // the last batch starts at a slice origin and may fire on its own last step
        assert_eq!(run.simulate(25)?, vec![10, 20, 25]);
        assert_eq!(run.current_step(), 25);

        // resuming inside the slice never fires
        assert!(run.simulate(5)?.is_empty());
        assert_eq!(run.current_step(), 30);

        assert_eq!(run.simulate(10)?, vec![40]);
        assert_eq!(run.get_spike_steps(), &[10, 20, 25, 40]);
        assert_eq!(run.node.get_archive().history, vec![10, 20, 25, 40]);
        assert_eq!(run.node.get_archive().get_last_spike_step(), Some(40));

        Ok(())
    }

    #[test]
    pub fn test_rejected_schedules() -> Result<(), ContextualNeuronError> {
        let mut run = run_with(StepRng::new(u64::MAX, 0), 10, 10)?;
        run.simulate(25)?;

        assert!(matches!(
            run.schedule(SpikeEvent::new(Time::step(20), 3, 1., RECEPTIVE_FIELD_RECEPTOR)),
            Err(ContextualNeuronError::EventRelatedError(EventError::DeliveryInPast(2))),
        ));
        assert!(matches!(
            run.schedule(SpikeEvent::new(Time::step(25), 0, 1., RECEPTIVE_FIELD_RECEPTOR)),
            Err(ContextualNeuronError::EventRelatedError(EventError::NonPositiveDelay(0))),
        ));
        assert!(matches!(
            run.schedule(SpikeEvent::new(Time::step(25), 1, 1., 7)),
            Err(ContextualNeuronError::EventRelatedError(EventError::UnknownReceptorType(7))),
        ));

        Ok(())
    }

    #[test]
    pub fn test_mid_slice_schedule_is_delivered() -> Result<(), ContextualNeuronError> {
        let mut run = run_with(StepRng::new(u64::MAX, 0), 10, 10)?;
        run.simulate(25)?;
        run.node.handle_data_logging_request();

        // delivered at 26, inside the current slice
        run.schedule(SpikeEvent::new(Time::step(25), 2, 1.5, CONTEXTUAL_FIELD_RECEPTOR))?;
        run.simulate(5)?;

        let samples = run.node.handle_data_logging_request();
        let contextual_fields: Vec<f64> = samples.iter().map(|sample| sample.values[1]).collect();

        assert_eq!(contextual_fields, vec![0., 1.5, 0., 0., 0.]);

        Ok(())
    }

    #[test]
    pub fn test_events_beyond_horizon_wait() -> Result<(), ContextualNeuronError> {
        let mut run = run_with(StepRng::new(u64::MAX, 0), 10, 20)?;

        // delivered at 49, outside the horizon of the first two slices
        run.schedule(SpikeEvent::new(Time::step(0), 50, 2., RECEPTIVE_FIELD_RECEPTOR))?;
        run.simulate(50)?;

        let samples = run.node.handle_data_logging_request();
        let receptive_fields: Vec<f64> = samples.iter().map(|sample| sample.values[0]).collect();

        assert_eq!(receptive_fields.len(), 50);
        assert_eq!(receptive_fields[49], 2.);
        assert!(receptive_fields[..49].iter().all(|value| *value == 0.));

        Ok(())
    }

    #[test]
    pub fn test_same_seed_same_spikes() -> Result<(), ContextualNeuronError> {
        let mut spike_trains = Vec::new();

        for _ in 0..2 {
            let mut run = NeuronRun::new(
                ContextualModulationNeuron::default_impl(),
                SimulationClock::new(0.1, 5, 10)?,
            );
            run.prepare(&RngManager::new(2017, 1)?)?;

            for stamp in (0..200).step_by(3) {
                run.schedule(SpikeEvent::new(Time::step(stamp), 4, 0.8, RECEPTIVE_FIELD_RECEPTOR))?;
                run.schedule(SpikeEvent::new(Time::step(stamp), 2, -0.3, CONTEXTUAL_FIELD_RECEPTOR))?;
            }

            run.simulate(120)?;
            run.simulate(80)?;

            spike_trains.push(run.get_spike_steps().to_vec());
        }

        assert_eq!(spike_trains[0], spike_trains[1]);
        assert!(spike_trains[0].len() <= 40);

        Ok(())
    }

    #[test]
    pub fn test_failed_delivery_keeps_remaining_events() -> Result<(), ContextualNeuronError> {
        let mut run = NeuronRun::new(
            SelectiveNode { refuse_negative: true, received: Vec::new() },
            SimulationClock::new(0.1, 5, 5)?,
        );
        run.prepare(&RngManager::new(0, 1)?)?;

        for weight in [1., -1., 2.] {
            run.schedule(SpikeEvent::new(Time::step(0), 1, weight, RECEPTIVE_FIELD_RECEPTOR))?;
        }

        assert!(matches!(
            run.simulate(1),
            Err(ContextualNeuronError::BufferRelatedError(BufferError::OffsetOutsideHorizon { .. })),
        ));
        assert_eq!(run.node.received, vec![1.]);
        assert_eq!(run.num_pending(), 2);
        assert_eq!(run.current_step(), 0);

        run.node.refuse_negative = false;
        run.simulate(1)?;

        assert_eq!(run.node.received, vec![1., -1., 2.]);
        assert_eq!(run.num_pending(), 0);
        assert_eq!(run.current_step(), 1);

        Ok(())
    }
}
