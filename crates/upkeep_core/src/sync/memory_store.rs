use crate::error::AppError;
use crate::sync::{ChangeFeed, ChangeNotifier, KeyValueStore, change_channel};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct CloudState {
    entries: HashMap<String, Vec<u8>>,
    subscribers: Vec<(usize, ChangeNotifier)>,
    next_device: usize,
}

/// In-process stand-in for a cloud key-value service. Each attached
/// [`MemoryStore`] behaves like one device.
#[derive(Debug, Clone, Default)]
pub struct SharedCloud {
    state: Arc<Mutex<CloudState>>,
}

impl SharedCloud {
    fn lock(&self) -> Result<MutexGuard<'_, CloudState>, AppError> {
        self.state
            .lock()
            .map_err(|_| AppError::io("cloud store lock poisoned"))
    }
}

#[derive(Debug)]
pub struct MemoryStore {
    cloud: SharedCloud,
    device: usize,
}

impl MemoryStore {
    pub fn attach(cloud: &SharedCloud) -> Self {
        let device = match cloud.lock() {
            Ok(mut state) => {
                state.next_device += 1;
                state.next_device
            }
            Err(_) => 0,
        };
        Self {
            cloud: cloud.clone(),
            device,
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn set(&mut self, key: &str, value: Vec<u8>) -> Result<(), AppError> {
        let mut state = self.cloud.lock()?;
        state.entries.insert(key.to_string(), value);

        let device = self.device;
        state
            .subscribers
            .retain(|(owner, notifier)| *owner == device || notifier.notify());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AppError> {
        Ok(self.cloud.lock()?.entries.get(key).cloned())
    }

    fn synchronize(&mut self) -> Result<(), AppError> {
        self.cloud.lock().map(|_| ())
    }

    fn subscribe(&mut self) -> ChangeFeed {
        let (notifier, feed) = change_channel();
        if let Ok(mut state) = self.cloud.lock() {
            state.subscribers.push((self.device, notifier));
        }
        feed
    }
}
