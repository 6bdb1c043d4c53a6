use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::activation::activation::ActivationFunction;
use crate::engine::handle::NetworkHandle;
use crate::error::{EngineError, Result};
use crate::network::network::{Network, NetworkOptions};
use crate::network::state::NetworkState;
use crate::params::hyper_parameters::Parameter;
use crate::train::report::TrainReport;

// `None` once deleted: a caller that resolved the handle before `delete`
// finds the slot empty when it gets the lock.
type SharedNetwork = Arc<RwLock<Option<Network>>>;

/// Owns every network and hands out `NetworkHandle`s to reach them.
///
/// Each network sits behind its own `RwLock`: `set_hyperparameter`,
/// `add_examples`, `train` and `delete` take the write side, `predict_*`,
/// `get_state` and `hyperparameter` the read side. Predictions on one network
/// may run in parallel; none can overlap a training run on it, and `delete`
/// waits for an in-flight training run before releasing the network.
#[derive(Debug, Default)]
pub struct Engine {
    networks: RwLock<HashMap<NetworkHandle, SharedNetwork>>,
    next_id: AtomicU64,
}

impl Engine {
    pub fn new() -> Engine {
        Engine::default()
    }

    /// Creates a network with default hyperparameters and an OS-seeded
    /// initialisation.
    pub fn create(&self, layer_sizes: &[usize], activation: ActivationFunction) -> Result<NetworkHandle> {
        self.create_with(layer_sizes, activation, NetworkOptions::default())
    }

    pub fn create_with(
        &self,
        layer_sizes: &[usize],
        activation: ActivationFunction,
        options: NetworkOptions,
    ) -> Result<NetworkHandle> {
        let network = Network::with_options(layer_sizes, activation, options)?;
        let handle = NetworkHandle::new(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);

        write_lock(&self.networks).insert(handle, Arc::new(RwLock::new(Some(network))));
        debug!(%handle, ?layer_sizes, %activation, "network created");
        Ok(handle)
    }

    /// Releases the network once no other call holds it. Deleting twice
    /// fails with `InvalidHandle`.
    pub fn delete(&self, handle: NetworkHandle) -> Result<()> {
        let shared = write_lock(&self.networks)
            .remove(&handle)
            .ok_or(EngineError::InvalidHandle(handle))?;
        let released = write_lock(&shared).take();
        drop(released);
        debug!(%handle, "network deleted");
        Ok(())
    }

    pub fn contains(&self, handle: NetworkHandle) -> bool {
        read_lock(&self.networks).contains_key(&handle)
    }

    /// Number of live networks.
    pub fn len(&self) -> usize {
        read_lock(&self.networks).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn set_hyperparameter(&self, handle: NetworkHandle, key: Parameter, value: f64) -> Result<()> {
        self.with_write(handle, |network| network.set_hyperparameter(key, value))?
    }

    /// `set_hyperparameter` with the key given by its symbolic name.
    pub fn set_hyperparameter_named(&self, handle: NetworkHandle, key: &str, value: f64) -> Result<()> {
        self.with_write(handle, |network| network.set_hyperparameter_named(key, value))?
    }

    pub fn hyperparameter(&self, handle: NetworkHandle, key: Parameter) -> Result<f64> {
        self.with_read(handle, |network| network.hyperparameter(key))
    }

    pub fn add_examples(
        &self,
        handle: NetworkHandle,
        count: usize,
        inputs: &[f64],
        outputs: &[f64],
    ) -> Result<()> {
        self.with_write(handle, |network| network.add_examples(count, inputs, outputs))?
    }

    pub fn add_example(&self, handle: NetworkHandle, input: &[f64], output: &[f64]) -> Result<()> {
        self.add_examples(handle, 1, input, output)
    }

    /// Trains on every example added so far; see `Network::train`.
    pub fn train(&self, handle: NetworkHandle) -> Result<TrainReport> {
        let report = self.with_write(handle, Network::train)?;
        debug!(
            %handle,
            iterations = report.iterations,
            loss = report.final_loss,
            reason = ?report.stop_reason,
            "train returned"
        );
        Ok(report)
    }

    pub fn predict_one(&self, handle: NetworkHandle, input: &[f64]) -> Result<Vec<f64>> {
        self.with_read(handle, |network| network.predict_one(input))?
    }

    pub fn predict_batch(&self, handle: NetworkHandle, count: usize, inputs: &[f64]) -> Result<Vec<f64>> {
        self.with_read(handle, |network| network.predict_batch(count, inputs))?
    }

    pub fn get_state(&self, handle: NetworkHandle) -> Result<NetworkState> {
        self.with_read(handle, Network::state)
    }

    /// Looks the handle up, holding the registry lock only for the lookup.
    fn resolve(&self, handle: NetworkHandle) -> Result<SharedNetwork> {
        read_lock(&self.networks)
            .get(&handle)
            .cloned()
            .ok_or(EngineError::InvalidHandle(handle))
    }

    fn with_read<T>(&self, handle: NetworkHandle, f: impl FnOnce(&Network) -> T) -> Result<T> {
        let shared = self.resolve(handle)?;
        let guard = read_lock(&shared);
        guard.as_ref().map(f).ok_or(EngineError::InvalidHandle(handle))
    }

    fn with_write<T>(&self, handle: NetworkHandle, f: impl FnOnce(&mut Network) -> T) -> Result<T> {
        let shared = self.resolve(handle)?;
        let mut guard = write_lock(&shared);
        guard.as_mut().map(f).ok_or(EngineError::InvalidHandle(handle))
    }
}

// Every mutation validates its input before writing, so a poisoned lock still
// guards a usable network.
fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
