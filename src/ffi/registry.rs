use crate::error::ContractViolation;
use crate::reply::ReplyHandle;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Key of a deferred reply on the C side, zero means "no reply"
///
/// Upper 32 bits: generation of the slot, lower 32 bits: slot index.
pub type RedisShimReply = u64;

/// Value marking the absence of a deferred reply
pub const NO_REPLY: RedisShimReply = 0;

struct Slot {
    generation: u32,
    reply: Option<ReplyHandle>,
}

/// Live deferred replies, addressed by generational keys
///
/// A slot is reused after release, but with a new generation. So keys of released replies never
/// reach a newer reply stored in the same slot.
pub(crate) struct Registry {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl Registry {
    pub const fn new() -> Self {
        Registry {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Stores the handle and returns its key
    pub fn insert(&mut self, handle: ReplyHandle) -> RedisShimReply {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot {
                    generation: 1,
                    reply: None,
                });
                (self.slots.len() - 1) as u32
            }
        };

        let slot = &mut self.slots[index as usize];
        slot.reply = Some(handle);
        key(slot.generation, index)
    }

    /// Borrows the reply of the given key
    pub fn get(&self, key: RedisShimReply) -> Result<&ReplyHandle, ContractViolation> {
        let (generation, index) = split(key);
        self.slots
            .get(index as usize)
            .filter(|slot| slot.generation == generation)
            .and_then(|slot| slot.reply.as_ref())
            .ok_or(ContractViolation::StaleHandle)
    }

    /// Removes the reply, the key is stale afterwards
    pub fn remove(&mut self, key: RedisShimReply) -> Result<ReplyHandle, ContractViolation> {
        let (generation, index) = split(key);
        let slot = self
            .slots
            .get_mut(index as usize)
            .filter(|slot| slot.generation == generation && slot.reply.is_some())
            .ok_or(ContractViolation::StaleHandle)?;

        let handle = slot.reply.take().ok_or(ContractViolation::StaleHandle)?;
        slot.generation = match slot.generation.wrapping_add(1) {
            0 => 1,
            generation => generation,
        };
        self.free.push(index);

        Ok(handle)
    }

    /// Number of live replies
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}

static REGISTRY: Mutex<Registry> = Mutex::new(Registry::new());

/// Process wide registry. A poisoned lock is recovered, as every operation leaves the registry consistent.
pub(crate) fn registry() -> MutexGuard<'static, Registry> {
    REGISTRY.lock().unwrap_or_else(PoisonError::into_inner)
}

fn key(generation: u32, index: u32) -> RedisShimReply {
    (u64::from(generation) << 32) | u64::from(index)
}

fn split(key: RedisShimReply) -> (u32, u32) {
    ((key >> 32) as u32, key as u32)
}
